use crate::layout::anchor::Anchor;
use crate::layout::common::LayoutSubtable;
use crate::subset::{GlyphFilter, Options};
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, PartialEq, Clone, Default)]
/// A cursive attachment subtable.
pub struct CursivePos {
    /// The mapping of glyph IDs to entry and exit anchors.
    pub mapping: BTreeMap<GlyphID, (Option<Anchor>, Option<Anchor>)>,
}

impl LayoutSubtable for CursivePos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        self.mapping = std::mem::take(&mut self.mapping)
            .into_iter()
            .filter(|(g, _)| filter.contains(*g))
            .map(|(g, anchors)| (filter.remap(g), anchors))
            .collect();
        !self.mapping.is_empty()
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            for (entry, exit) in self.mapping.values_mut() {
                entry.iter_mut().chain(exit.iter_mut()).for_each(Anchor::prune_hints);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursive_subset() {
        let mut pos = CursivePos {
            mapping: btreemap!(
                3 => (Some(Anchor::new(0, 0)), None),
                5 => (None, Some(Anchor::new(500, 0)))
            ),
        };
        let retained = btreeset!(0, 5);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(
            pos.mapping,
            btreemap!(1 => (None, Some(Anchor::new(500, 0))))
        );
    }
}
