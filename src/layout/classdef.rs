use crate::subset::{GlyphFilter, GlyphMap};
use crate::types::*;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Eq, Clone, Default)]
/// A class definition table.
///
/// Glyphs which do not appear in the table implicitly belong to class 0.
pub struct ClassDef {
    /// A mapping of glyph IDs to their classes
    pub classes: BTreeMap<GlyphID, uint16>,
}

impl ClassDef {
    /// Returns the class of a glyph
    pub fn get(&self, glyph: GlyphID) -> uint16 {
        self.classes.get(&glyph).copied().unwrap_or(0)
    }

    /// Returns the ascending list of classes used by any of `glyphs`.
    ///
    /// Class 0 is included if any of the glyphs is unlisted.
    pub fn intersect(&self, glyphs: &BTreeSet<GlyphID>) -> Vec<uint16> {
        let unlisted = glyphs.iter().any(|g| !self.classes.contains_key(g));
        unlisted
            .then(|| 0)
            .into_iter()
            .chain(
                self.classes
                    .iter()
                    .filter(|(g, _)| glyphs.contains(g))
                    .map(|(_, &v)| v),
            )
            .sorted()
            .dedup()
            .collect()
    }

    /// Returns the members of `glyphs` which belong to class `klass`.
    pub fn intersect_class(&self, glyphs: &BTreeSet<GlyphID>, klass: uint16) -> BTreeSet<GlyphID> {
        if klass == 0 {
            return glyphs
                .iter()
                .filter(|g| !self.classes.contains_key(g))
                .copied()
                .collect();
        }
        self.classes
            .iter()
            .filter(|(g, &v)| v == klass && glyphs.contains(g))
            .map(|(&g, _)| g)
            .collect()
    }

    /// Returns true if any member of `glyphs` belongs to class `klass`.
    pub fn intersects_class(&self, glyphs: &BTreeSet<GlyphID>, klass: uint16) -> bool {
        if klass == 0 {
            return glyphs.iter().any(|g| !self.classes.contains_key(g));
        }
        self.classes
            .iter()
            .any(|(g, &v)| v == klass && glyphs.contains(g))
    }

    /// Subsets the class definition to `glyphs` (in the old numbering),
    /// renumbering glyphs through `map` and classes densely.
    ///
    /// Returns the list of surviving old classes; the new number of a class
    /// is its position in this list. When `use_class0` is false, class 0
    /// always survives as class 0, so that glyphs absent from the table keep
    /// meaning "unlisted". When it is true and every glyph is listed, class 0
    /// is optimised out and the lowest surviving class takes its number.
    pub fn subset(
        &mut self,
        glyphs: &BTreeSet<GlyphID>,
        map: &GlyphMap,
        use_class0: bool,
    ) -> Vec<uint16> {
        self.classes.retain(|g, _| glyphs.contains(g));
        let need_class0 = !use_class0 || glyphs.iter().any(|g| !self.classes.contains_key(g));
        let class_map: Vec<uint16> = need_class0
            .then(|| 0)
            .into_iter()
            .chain(self.classes.values().copied())
            .sorted()
            .dedup()
            .collect();
        self.classes = self
            .classes
            .iter()
            .filter_map(|(&g, v)| {
                let new_class = class_map.iter().position(|c| c == v)? as uint16;
                Some((map.get(g)?, new_class))
            })
            .collect();
        class_map
    }

    /// Drops unretained glyphs and renumbers the rest, leaving class values alone.
    pub fn filter(&mut self, filter: &GlyphFilter) {
        self.classes = self
            .classes
            .iter()
            .filter(|(g, _)| filter.contains(**g))
            .map(|(&g, &v)| (filter.remap(g), v))
            .collect();
    }

    /// Returns true if every glyph is in class 0.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Position of an old class value in a class map returned by [`ClassDef::subset`].
pub(crate) fn class_index(class_map: &[uint16], klass: uint16) -> Option<uint16> {
    class_map
        .iter()
        .position(|&c| c == klass)
        .map(|i| i as uint16)
}
