use crate::layout::common::LayoutSubtable;
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Clone, Default)]
/// A multiple substitution (one-to-many) subtable.
pub struct MultipleSubst {
    /// The mapping of input glyph IDs to sequence of replacement glyph IDs.
    pub mapping: BTreeMap<GlyphID, Vec<GlyphID>>,
}

impl LayoutSubtable for MultipleSubst {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        // Drop rules generating glyphs we don't want
        self.mapping = self
            .mapping
            .iter()
            .filter(|(&k, seq)| filter.contains(k) && filter.contains_all(seq))
            .map(|(&k, seq)| (filter.remap(k), filter.remap_all(seq)))
            .collect();
        !self.mapping.is_empty()
    }
}

impl SubstitutionClosure for MultipleSubst {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        for (_, seq) in self.mapping.iter().filter(|(k, _)| cur_glyphs.contains(k)) {
            closure.glyphs.extend(seq.iter().copied());
        }
    }
}
