use crate::layout::common::LayoutSubtable;
use crate::layout::coverage::{select, Coverage};
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::BTreeSet;

#[derive(Debug, PartialEq, Clone, Default)]
/// A reverse chaining contextual single substitution subtable.
pub struct ReverseChainSingleSubst {
    /// The glyphs to be replaced.
    pub coverage: Coverage,
    /// One replacement per covered glyph.
    pub substitutes: Vec<GlyphID>,
    /// Coverages of the glyphs before the replaced glyph, nearest first.
    pub backtrack: Vec<Coverage>,
    /// Coverages of the glyphs after the replaced glyph.
    pub lookahead: Vec<Coverage>,
}

impl LayoutSubtable for ReverseChainSingleSubst {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        let indices = self.coverage.subset(filter);
        let substitutes = select(&self.substitutes, &indices);
        // Now drop rules generating glyphs we don't want
        let kept: Vec<usize> = substitutes
            .iter()
            .enumerate()
            .filter(|(_, &g)| filter.contains(g))
            .map(|(i, _)| i)
            .collect();
        self.substitutes = filter.remap_all(&select(&substitutes, &kept));
        self.coverage.remap(&kept);

        let mut context_matches = true;
        for coverage in self.backtrack.iter_mut().chain(self.lookahead.iter_mut()) {
            if coverage.subset(filter).is_empty() {
                context_matches = false;
            }
        }
        !self.substitutes.is_empty() && context_matches
    }
}

impl SubstitutionClosure for ReverseChainSingleSubst {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        let indices = self.coverage.intersect(cur_glyphs);
        if indices.is_empty()
            || !self
                .backtrack
                .iter()
                .chain(self.lookahead.iter())
                .all(|c| c.intersects(&closure.glyphs))
        {
            return;
        }
        let new_glyphs = select(&self.substitutes, &indices);
        closure.glyphs.extend(new_glyphs);
    }
}
