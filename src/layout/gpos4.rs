use crate::layout::anchor::Anchor;
use crate::layout::common::LayoutSubtable;
use crate::subset::{GlyphFilter, Options};
use crate::types::*;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Mark glyphs with their class and attachment anchor.
pub type MarkArray = BTreeMap<GlyphID, (uint16, Anchor)>;

/// Anchors of a base-like glyph, keyed by mark class.
pub type ClassAnchors = BTreeMap<uint16, Anchor>;

#[derive(Debug, PartialEq, Clone, Default)]
/// A mark-to-base attachment subtable.
pub struct MarkBasePos {
    /// The mark glyphs.
    pub marks: MarkArray,
    /// The base glyphs, and where marks of each class attach to them.
    pub bases: BTreeMap<GlyphID, ClassAnchors>,
}

pub(crate) fn subset_map<V>(map: &mut BTreeMap<GlyphID, V>, filter: &GlyphFilter) {
    *map = std::mem::take(map)
        .into_iter()
        .filter(|(g, _)| filter.contains(*g))
        .map(|(g, v)| (filter.remap(g), v))
        .collect();
}

/// Renumbers mark classes densely over the classes still in use, returning
/// the old classes in their new order.
pub(crate) fn prune_mark_classes(marks: &mut MarkArray) -> Vec<uint16> {
    let class_indices: Vec<uint16> = marks.values().map(|(c, _)| *c).sorted().dedup().collect();
    for (class, _) in marks.values_mut() {
        let old = *class;
        *class = class_indices
            .iter()
            .position(|&c| c == old)
            .unwrap_or_default() as uint16;
    }
    class_indices
}

/// Keeps the anchors of the surviving classes under their new numbers.
pub(crate) fn remap_class_anchors(anchors: &mut ClassAnchors, class_indices: &[uint16]) {
    *anchors = std::mem::take(anchors)
        .into_iter()
        .filter_map(|(class, anchor)| {
            let new = class_indices.iter().position(|&c| c == class)?;
            Some((new as uint16, anchor))
        })
        .collect();
}

pub(crate) fn prune_mark_hints(marks: &mut MarkArray) {
    for (_, anchor) in marks.values_mut() {
        anchor.prune_hints();
    }
}

impl LayoutSubtable for MarkBasePos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        subset_map(&mut self.marks, filter);
        subset_map(&mut self.bases, filter);
        // Prune empty classes
        let class_indices = prune_mark_classes(&mut self.marks);
        for anchors in self.bases.values_mut() {
            remap_class_anchors(anchors, &class_indices);
        }
        !class_indices.is_empty() && !self.bases.is_empty()
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            prune_mark_hints(&mut self.marks);
            self.bases
                .values_mut()
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
    fn test_mark_base_prunes_classes() {
        let mut pos = MarkBasePos {
            marks: btreemap!(
                10 => (0, Anchor::new(0, 500)),
                11 => (1, Anchor::new(0, -20))
            ),
            bases: btreemap!(
                1 => btreemap!(0 => Anchor::new(250, 600), 1 => Anchor::new(250, 0)),
                2 => btreemap!(0 => Anchor::new(300, 700), 1 => Anchor::new(300, 0))
            ),
        };
        let retained = btreeset!(0, 2, 11);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(pos.marks, btreemap!(2 => (0, Anchor::new(0, -20))));
        assert_eq!(
            pos.bases,
            btreemap!(1 => btreemap!(0 => Anchor::new(300, 0)))
        );
    }

    #[test]
    fn test_mark_base_without_marks() {
        let mut pos = MarkBasePos {
            marks: btreemap!(10 => (0, Anchor::new(0, 500))),
            bases: btreemap!(1 => btreemap!(0 => Anchor::new(250, 600))),
        };
        let retained = btreeset!(0, 1);
        let map = GlyphMap::compact(&retained);
        assert!(!pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
    }
}
