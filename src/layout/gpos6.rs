use crate::layout::anchor::Anchor;
use crate::layout::common::LayoutSubtable;
use crate::layout::gpos4::{
    prune_mark_classes, prune_mark_hints, remap_class_anchors, subset_map, ClassAnchors, MarkArray,
};
use crate::subset::{GlyphFilter, Options};
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, PartialEq, Clone, Default)]
/// A mark-to-mark attachment subtable.
pub struct MarkMarkPos {
    /// The attaching marks.
    pub marks: MarkArray,
    /// The marks being attached to, and their anchors per class.
    pub base_marks: BTreeMap<GlyphID, ClassAnchors>,
}

impl LayoutSubtable for MarkMarkPos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        subset_map(&mut self.marks, filter);
        subset_map(&mut self.base_marks, filter);
        let class_indices = prune_mark_classes(&mut self.marks);
        for anchors in self.base_marks.values_mut() {
            remap_class_anchors(anchors, &class_indices);
        }
        !class_indices.is_empty() && !self.base_marks.is_empty()
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            prune_mark_hints(&mut self.marks);
            self.base_marks
                .values_mut()
                .flat_map(|a| a.values_mut())
                .for_each(Anchor::prune_hints);
        }
        true
    }
}
