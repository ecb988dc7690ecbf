use crate::layout::common::LayoutSubtable;
use crate::layout::valuerecord::ValueRecord;
use crate::subset::{GlyphFilter, Options};
use crate::types::*;
use std::collections::BTreeMap;

/* This struct is the user-facing representation of single-pos. A mapping of
GID -> valuerecord is a friendly way to represent what's going on; both
binary formats collapse into it. */
#[derive(Debug, PartialEq, Clone, Default)]
/// A single positioning subtable.
pub struct SinglePos {
    /// The mapping of input glyph IDs to value records.
    pub mapping: BTreeMap<GlyphID, ValueRecord>,
}

impl SinglePos {
    /// Whether every glyph gets the same value, so format 1 can be used.
    pub fn is_uniform(&self) -> bool {
        let mut values = self.mapping.values();
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }
}

impl LayoutSubtable for SinglePos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        self.mapping = std::mem::take(&mut self.mapping)
            .into_iter()
            .filter(|(g, _)| filter.contains(*g))
            .map(|(g, v)| (filter.remap(g), v))
            .collect();
        !self.mapping.is_empty()
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            self.mapping.values_mut().for_each(|v| v.prune_hints());
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
    fn test_single_pos_subset() {
        let value = |x| ValueRecord {
            xAdvance: Some(x),
            ..Default::default()
        };
        let mut pos = SinglePos {
            mapping: btreemap!(1 => value(10), 3 => value(10), 4 => value(20)),
        };
        assert!(!pos.is_uniform());
        let retained = btreeset!(0, 1, 3);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(pos.mapping, btreemap!(1 => value(10), 2 => value(10)));
        assert!(pos.is_uniform());
    }
}
