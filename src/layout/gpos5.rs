use crate::layout::anchor::Anchor;
use crate::layout::common::LayoutSubtable;
use crate::layout::gpos4::{
    prune_mark_classes, prune_mark_hints, remap_class_anchors, subset_map, ClassAnchors, MarkArray,
};
use crate::subset::{GlyphFilter, Options};
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, PartialEq, Clone, Default)]
/// A mark-to-ligature attachment subtable.
pub struct MarkLigPos {
    /// The mark glyphs.
    pub marks: MarkArray,
    /// The ligature glyphs, with the anchors of each of their components.
    pub ligatures: BTreeMap<GlyphID, Vec<ClassAnchors>>,
}

impl LayoutSubtable for MarkLigPos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        subset_map(&mut self.marks, filter);
        subset_map(&mut self.ligatures, filter);
        let class_indices = prune_mark_classes(&mut self.marks);
        for anchors in self.ligatures.values_mut().flatten() {
            remap_class_anchors(anchors, &class_indices);
        }
        !class_indices.is_empty() && !self.ligatures.is_empty()
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            prune_mark_hints(&mut self.marks);
            self.ligatures
                .values_mut()
                .flatten()
                .flat_map(|a| a.values_mut())
                .for_each(Anchor::prune_hints);
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
    fn test_mark_lig_subset() {
        let mut pos = MarkLigPos {
            marks: btreemap!(
                7 => (1, Anchor::new(0, 500)),
                8 => (2, Anchor::new(0, -20))
            ),
            ligatures: btreemap!(
                4 => vec![
                    btreemap!(1 => Anchor::new(100, 600), 2 => Anchor::new(100, 0)),
                    btreemap!(1 => Anchor::new(400, 600))
                ]
            ),
        };
        let retained = btreeset!(0, 4, 7);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(pos.marks, btreemap!(2 => (0, Anchor::new(0, 500))));
        assert_eq!(
            pos.ligatures,
            btreemap!(
                1 => vec![
                    btreemap!(0 => Anchor::new(100, 600)),
                    btreemap!(0 => Anchor::new(400, 600))
                ]
            )
        );
    }
}
