use crate::subset::{Checkpoint, ClosureContext, Options, SubsetTable};
use crate::types::*;
use std::collections::BTreeMap;

/// The 'kern' OpenType tag.
pub const TAG: Tag = crate::tag!("kern");

/// A subtable of the legacy kerning table
#[derive(Debug, PartialEq, Clone)]
pub enum KernSubtable {
    /// An ordered list of kerning pairs
    Format0 {
        /// Coverage bits, carried through untouched
        coverage: uint16,
        /// Kerning values keyed by (left, right) glyph
        pairs: BTreeMap<(GlyphID, GlyphID), int16>,
    },
    /// Any other format. These cannot be subset and are removed.
    Unknown {
        /// Subtable format
        format: uint16,
        /// Raw subtable data
        data: Vec<u8>,
    },
}

/// The legacy kerning table
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct kern {
    /// The kerning subtables
    pub subtables: Vec<KernSubtable>,
}

impl SubsetTable for kern {
    fn prune_pre_subset(&mut self, _options: &Options) -> bool {
        self.subtables.retain(|st| match st {
            KernSubtable::Format0 { .. } => true,
            KernSubtable::Unknown { format, .. } => {
                log::info!("Dropping kern subtable of unknown format {}", format);
                false
            }
        });
        !self.subtables.is_empty()
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let filter = ctx.filter(Checkpoint::Gsub);
        for st in self.subtables.iter_mut() {
            if let KernSubtable::Format0 { pairs, .. } = st {
                *pairs = std::mem::take(pairs)
                    .into_iter()
                    .filter(|((l, r), _)| filter.contains(*l) && filter.contains(*r))
                    .map(|((l, r), v)| ((filter.remap(l), filter.remap(r)), v))
                    .collect();
            }
        }
        self.subtables.retain(|st| match st {
            KernSubtable::Format0 { pairs, .. } => !pairs.is_empty(),
            KernSubtable::Unknown { .. } => false,
        });
        !self.subtables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    fn subset(table: &mut kern, glyphs: std::collections::BTreeSet<GlyphID>) -> bool {
        let mut ctx = ClosureContext::new(btreeset!(), glyphs);
        ctx.checkpoint(Checkpoint::Gsub);
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        table.subset_glyphs(&ctx)
    }

    #[test]
    fn test_kern_subset() {
        let mut table = kern {
            subtables: vec![
                KernSubtable::Format0 {
                    coverage: 1,
                    pairs: btreemap!((1, 2) => -40, (2, 3) => -10, (3, 1) => 15),
                },
                KernSubtable::Unknown {
                    format: 2,
                    data: vec![0, 1, 2],
                },
            ],
        };
        assert!(table.prune_pre_subset(&Options::default()));
        assert_eq!(table.subtables.len(), 1);
        assert!(subset(&mut table, btreeset!(0, 1, 3)));
        assert_eq!(
            table.subtables,
            vec![KernSubtable::Format0 {
                coverage: 1,
                pairs: btreemap!((2, 1) => 15),
            }]
        );
        assert!(!subset(&mut table, btreeset!(0, 1)));
    }
}
