use crate::layout::common::LayoutSubtable;
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Clone, Default)]
/// An alternate substitution (one-from-many) subtable.
pub struct AlternateSubst {
    /// The mapping of input glyph IDs to array of possible glyph IDs.
    pub mapping: BTreeMap<GlyphID, Vec<GlyphID>>,
}

impl LayoutSubtable for AlternateSubst {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        self.mapping = self
            .mapping
            .iter()
            .filter(|(&k, _)| filter.contains(k))
            .filter_map(|(&k, alternates)| {
                let kept: Vec<GlyphID> = alternates
                    .iter()
                    .filter(|&&g| filter.contains(g))
                    .map(|&g| filter.remap(g))
                    .collect();
                (!kept.is_empty()).then(|| (filter.remap(k), kept))
            })
            .collect();
        !self.mapping.is_empty()
    }
}

impl SubstitutionClosure for AlternateSubst {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        for (_, alternates) in self.mapping.iter().filter(|(k, _)| cur_glyphs.contains(k)) {
            closure.glyphs.extend(alternates.iter().copied());
        }
    }
}
