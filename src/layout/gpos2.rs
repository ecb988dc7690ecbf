use crate::layout::classdef::ClassDef;
use crate::layout::common::LayoutSubtable;
use crate::layout::coverage::{select, Coverage};
use crate::layout::valuerecord::ValueRecord;
use crate::subset::{GlyphFilter, Options};
use crate::types::*;

#[derive(Debug, PartialEq, Clone)]
#[allow(missing_docs, non_snake_case, non_camel_case_types)]
pub struct PairValueRecord {
    pub secondGlyph: GlyphID,
    pub valueRecord1: ValueRecord,
    pub valueRecord2: ValueRecord,
}

#[derive(Debug, PartialEq, Clone, Default)]
#[allow(missing_docs, non_snake_case, non_camel_case_types)]
pub struct Class2Record {
    pub valueRecord1: ValueRecord,
    pub valueRecord2: ValueRecord,
}

impl Class2Record {
    fn prune_hints(&mut self) {
        self.valueRecord1.prune_hints();
        self.valueRecord2.prune_hints();
    }
}

/// A pair adjustment positioning subtable.
#[derive(Debug, PartialEq, Clone)]
pub enum PairPos {
    /// Adjustments for pairs of individual glyphs
    Format1 {
        /// The first glyphs of the pairs
        coverage: Coverage,
        /// For each covered glyph, the pairs it starts
        pair_sets: Vec<Vec<PairValueRecord>>,
    },
    /// Adjustments for pairs of glyph classes
    Format2 {
        /// The first glyphs of the pairs
        coverage: Coverage,
        /// Classes of the first glyph
        classdef1: ClassDef,
        /// Classes of the second glyph
        classdef2: ClassDef,
        /// Indexed by first class, then second class
        class1_records: Vec<Vec<Class2Record>>,
    },
}

impl LayoutSubtable for PairPos {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        match self {
            PairPos::Format1 {
                coverage,
                pair_sets,
            } => {
                let indices = coverage.subset(filter);
                let old = std::mem::take(pair_sets);
                let mut kept = vec![];
                for (pos, &i) in indices.iter().enumerate() {
                    let pairs: Vec<PairValueRecord> = old
                        .get(i)
                        .into_iter()
                        .flatten()
                        .filter(|p| filter.contains(p.secondGlyph))
                        .map(|p| PairValueRecord {
                            secondGlyph: filter.remap(p.secondGlyph),
                            ..p.clone()
                        })
                        .collect();
                    // Remove empty pairsets
                    if !pairs.is_empty() {
                        kept.push(pos);
                        pair_sets.push(pairs);
                    }
                }
                coverage.remap(&kept);
                !pair_sets.is_empty()
            }
            PairPos::Format2 {
                coverage,
                classdef1,
                classdef2,
                class1_records,
            } => {
                let first_glyphs = coverage.intersect_glyphs(filter.retained);
                let class1_map = classdef1.subset(&first_glyphs, filter.map, true);
                // Unlisted second glyphs always mean class 0, so it is never reused.
                let class2_map = classdef2.subset(filter.retained, filter.map, false);
                if coverage.subset(filter).is_empty() {
                    return false;
                }
                let class1_indices: Vec<usize> = class1_map.iter().map(|&c| c as usize).collect();
                let class2_indices: Vec<usize> = class2_map.iter().map(|&c| c as usize).collect();
                *class1_records = select(class1_records, &class1_indices)
                    .iter()
                    .map(|class2_records| select(class2_records, &class2_indices))
                    .collect();
                // If only class2 0 is left, there is nothing to adjust.
                !class1_records.is_empty() && class2_map.len() > 1
            }
        }
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        if !options.hinting {
            match self {
                PairPos::Format1 { pair_sets, .. } => {
                    for pair in pair_sets.iter_mut().flatten() {
                        pair.valueRecord1.prune_hints();
                        pair.valueRecord2.prune_hints();
                    }
                }
                PairPos::Format2 { class1_records, .. } => {
                    class1_records
                        .iter_mut()
                        .flatten()
                        .for_each(Class2Record::prune_hints);
                }
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

    fn kern(x: int16) -> Class2Record {
        Class2Record {
            valueRecord1: ValueRecord {
                xAdvance: Some(x),
                ..Default::default()
            },
            valueRecord2: ValueRecord::new(),
        }
    }

    fn class_pairs() -> PairPos {
        // First glyphs 1, 2 in class 1; second glyphs 5 in class 1, 6 in class 2
        PairPos::Format2 {
            coverage: Coverage::new(vec![1, 2]),
            classdef1: ClassDef {
                classes: btreemap!(1 => 1, 2 => 1),
            },
            classdef2: ClassDef {
                classes: btreemap!(5 => 1, 6 => 2),
            },
            class1_records: vec![
                vec![kern(0), kern(0), kern(0)],
                vec![kern(0), kern(-10), kern(-20)],
            ],
        }
    }

    #[test]
    fn test_pair_pos_format1() {
        let pair = |g, x| PairValueRecord {
            secondGlyph: g,
            valueRecord1: kern(x).valueRecord1,
            valueRecord2: ValueRecord::new(),
        };
        let mut pos = PairPos::Format1 {
            coverage: Coverage::new(vec![1, 2, 3]),
            pair_sets: vec![
                vec![pair(4, -10), pair(5, -20)],
                vec![pair(5, -30)],
                vec![pair(4, -40)],
            ],
        };
        let retained = btreeset!(0, 1, 2, 3, 4);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(
            pos,
            PairPos::Format1 {
                coverage: Coverage::new(vec![1, 3]),
                pair_sets: vec![vec![pair(4, -10)], vec![pair(4, -40)]],
            }
        );
    }

    #[test]
    fn test_pair_pos_format2_subset() {
        let mut pos = class_pairs();
        let retained = btreeset!(0, 2, 6);
        let map = GlyphMap::compact(&retained);
        assert!(pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        assert_eq!(
            pos,
            PairPos::Format2 {
                coverage: Coverage::new(vec![1]),
                classdef1: ClassDef {
                    classes: btreemap!(1 => 0),
                },
                classdef2: ClassDef {
                    classes: btreemap!(2 => 1),
                },
                class1_records: vec![vec![kern(0), kern(-20)]],
            }
        );
    }

    #[test]
    fn test_pair_pos_format2_drops_without_second_classes() {
        let mut pos = class_pairs();
        let retained = btreeset!(0, 1, 2);
        let map = GlyphMap::compact(&retained);
        assert!(!pos.subset_glyphs(&GlyphFilter::new(&retained, &map)));
    }
}
