use crate::layout::common::LayoutSubtable;
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Clone, Default)]
/// A single substitution subtable.
pub struct SingleSubst {
    /// The mapping of input glyph IDs to replacement glyph IDs.
    pub mapping: BTreeMap<GlyphID, GlyphID>,
}

impl LayoutSubtable for SingleSubst {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        self.mapping = self
            .mapping
            .iter()
            .filter(|(&k, &v)| filter.contains(k) && filter.contains(v))
            .map(|(&k, &v)| (filter.remap(k), filter.remap(v)))
            .collect();
        !self.mapping.is_empty()
    }
}

impl SubstitutionClosure for SingleSubst {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        closure.glyphs.extend(
            self.mapping
                .iter()
                .filter(|(k, _)| cur_glyphs.contains(k))
                .map(|(_, &v)| v),
        );
    }
}
