use crate::layout::common::LayoutSubtable;
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Clone, Default)]
/// A ligature substitution (many-to-one) subtable.
pub struct LigatureSubst {
    /// The mapping of sequences of input glyphs IDs to replacement glyph IDs.
    pub mapping: BTreeMap<Vec<GlyphID>, GlyphID>,
}

impl LayoutSubtable for LigatureSubst {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        self.mapping = self
            .mapping
            .iter()
            .filter(|(seq, &lig)| filter.contains_all(seq) && filter.contains(lig))
            .map(|(seq, &lig)| (filter.remap_all(seq), filter.remap(lig)))
            .collect();
        !self.mapping.is_empty()
    }
}

impl SubstitutionClosure for LigatureSubst {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        let new_glyphs: Vec<GlyphID> = self
            .mapping
            .iter()
            .filter(|(seq, _)| match seq.split_first() {
                Some((first, components)) => {
                    cur_glyphs.contains(first)
                        && components.iter().all(|c| closure.glyphs.contains(c))
                }
                None => false,
            })
            .map(|(_, &lig)| lig)
            .collect();
        closure.glyphs.extend(new_glyphs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ligature_subset() {
        let mut subst = LigatureSubst {
            mapping: btreemap!(vec![1, 2] => 5, vec![1, 3] => 6),
        };
        let retained = btreeset!(0, 1, 2, 3, 5);
        let map = GlyphMap::compact(&retained);
        assert!(subst.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(subst.mapping, btreemap!(vec![1, 2] => 4));
    }
}
