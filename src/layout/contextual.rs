use crate::layout::classdef::{class_index, ClassDef};
use crate::layout::common::LayoutSubtable;
use crate::layout::coverage::Coverage;
use crate::subset::GlyphFilter;
use crate::tables::GSUB::{SubstClosure, SubstitutionClosure};
use crate::types::*;
use std::collections::BTreeSet;

/// A lookup to apply at a given position of a matched sequence.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SequenceLookupRecord {
    /// Index of the input glyph at which to apply the lookup
    pub sequence_index: uint16,
    /// Index into the lookup list
    pub lookup_index: uint16,
}

/// Which part of a context rule a value belongs to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RulePart {
    Backtrack,
    Input,
    Lookahead,
}

/// A rule in a glyph-based or class-based context subtable.
///
/// `input` does not include the first glyph (or class) of the sequence;
/// that is given by the rule set the rule lives in. Rules of non-chained
/// subtables have empty `backtrack` and `lookahead`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ContextRule<T> {
    pub backtrack: Vec<T>,
    pub input: Vec<T>,
    pub lookahead: Vec<T>,
    pub lookup_records: Vec<SequenceLookupRecord>,
}

impl<T: Copy> ContextRule<T> {
    fn parts(&self) -> impl Iterator<Item = (RulePart, T)> + '_ {
        self.backtrack
            .iter()
            .map(|&v| (RulePart::Backtrack, v))
            .chain(self.input.iter().map(|&v| (RulePart::Input, v)))
            .chain(self.lookahead.iter().map(|&v| (RulePart::Lookahead, v)))
    }

    /// Rewrites every glyph or class of the rule; `None` if any value has no
    /// replacement.
    pub fn remap<F>(&self, mut f: F) -> Option<ContextRule<T>>
    where
        F: FnMut(RulePart, T) -> Option<T>,
    {
        let mut map = |part: RulePart, values: &[T]| -> Option<Vec<T>> {
            values.iter().map(|&v| f(part, v)).collect()
        };
        Some(ContextRule {
            backtrack: map(RulePart::Backtrack, &self.backtrack)?,
            input: map(RulePart::Input, &self.input)?,
            lookahead: map(RulePart::Lookahead, &self.lookahead)?,
            lookup_records: self.lookup_records.clone(),
        })
    }
}

/// A contextual or chained contextual subtable, in any of its three formats.
#[derive(Debug, PartialEq, Clone)]
pub enum SequenceContext {
    /// Glyph-based rules, one rule set per covered first glyph.
    Format1 {
        coverage: Coverage,
        rule_sets: Vec<Option<Vec<ContextRule<GlyphID>>>>,
    },
    /// Class-based rules, one rule set per input class of the first glyph.
    Format2 {
        coverage: Coverage,
        backtrack_classdef: ClassDef,
        input_classdef: ClassDef,
        lookahead_classdef: ClassDef,
        rule_sets: Vec<Option<Vec<ContextRule<uint16>>>>,
    },
    /// A single rule, with one coverage per position.
    Format3 {
        backtrack: Vec<Coverage>,
        input: Vec<Coverage>,
        lookahead: Vec<Coverage>,
        lookup_records: Vec<SequenceLookupRecord>,
    },
}

/// Tests whether every position of a rule can still match a glyph set.
trait RuleMatcher<T> {
    fn intersects(&self, glyphs: &BTreeSet<GlyphID>, rule: &ContextRule<T>) -> bool;
}

/// Matching for glyph-based rules.
struct GlyphMatcher;

impl RuleMatcher<GlyphID> for GlyphMatcher {
    fn intersects(&self, glyphs: &BTreeSet<GlyphID>, rule: &ContextRule<GlyphID>) -> bool {
        rule.parts().all(|(_, g)| glyphs.contains(&g))
    }
}

/// Matching for class-based rules: a view of the three class definitions of
/// a format 2 subtable.
struct ClassContext<'a> {
    backtrack: &'a ClassDef,
    input: &'a ClassDef,
    lookahead: &'a ClassDef,
}

impl<'a> ClassContext<'a> {
    fn classdef(&self, part: RulePart) -> &'a ClassDef {
        match part {
            RulePart::Backtrack => self.backtrack,
            RulePart::Input => self.input,
            RulePart::Lookahead => self.lookahead,
        }
    }
}

impl RuleMatcher<uint16> for ClassContext<'_> {
    fn intersects(&self, glyphs: &BTreeSet<GlyphID>, rule: &ContextRule<uint16>) -> bool {
        rule.parts()
            .all(|(part, klass)| self.classdef(part).intersects_class(glyphs, klass))
    }
}

fn subset_records(records: &mut Vec<SequenceLookupRecord>, lookup_indices: &[usize]) {
    *records = records
        .iter()
        .filter_map(|r| {
            let new = lookup_indices
                .iter()
                .position(|&l| l == r.lookup_index as usize)?;
            Some(SequenceLookupRecord {
                sequence_index: r.sequence_index,
                lookup_index: new as uint16,
            })
        })
        .collect();
}

/// Runs the nested lookups of a matched rule over the glyphs which may
/// occupy each position.
///
/// Once a lookup which can change the sequence length has run, the glyph at
/// any later position is unknown, so those lookups see the whole set.
fn fire_records<F>(
    closure: &mut SubstClosure,
    records: &[SequenceLookupRecord],
    input_len: usize,
    mut pos_glyphs: F,
) where
    F: FnMut(&BTreeSet<GlyphID>, usize) -> BTreeSet<GlyphID>,
{
    let mut chaos: BTreeSet<usize> = BTreeSet::new();
    for record in records {
        let seqi = record.sequence_index as usize;
        let glyphs = if chaos.contains(&seqi) {
            None
        } else {
            Some(pos_glyphs(&closure.glyphs, seqi))
        };
        let lookup_index = record.lookup_index as usize;
        chaos.insert(seqi);
        if closure.may_have_non_1to1(lookup_index) {
            chaos.extend(seqi..input_len + 2);
        }
        closure.closure_lookup(lookup_index, glyphs);
    }
}

impl SequenceContext {
    /// The coverage of the first input glyph.
    pub fn coverage(&self) -> Option<&Coverage> {
        match self {
            SequenceContext::Format1 { coverage, .. } => Some(coverage),
            SequenceContext::Format2 { coverage, .. } => Some(coverage),
            SequenceContext::Format3 { input, .. } => input.first(),
        }
    }
}

impl SubstitutionClosure for SequenceContext {
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>) {
        match self {
            SequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                for (i, &first) in coverage.glyphs.iter().enumerate() {
                    if !cur_glyphs.contains(&first) {
                        continue;
                    }
                    let rules = match rule_sets.get(i) {
                        Some(Some(rules)) => rules,
                        _ => continue,
                    };
                    for rule in rules {
                        if !GlyphMatcher.intersects(&closure.glyphs, rule) {
                            continue;
                        }
                        fire_records(
                            closure,
                            &rule.lookup_records,
                            rule.input.len(),
                            |_, seqi| {
                                let glyph = if seqi == 0 {
                                    Some(first)
                                } else {
                                    rule.input.get(seqi - 1).copied()
                                };
                                glyph.into_iter().collect()
                            },
                        );
                    }
                }
            }
            SequenceContext::Format2 {
                coverage,
                backtrack_classdef,
                input_classdef,
                lookahead_classdef,
                rule_sets,
            } => {
                let cur = coverage.intersect_glyphs(cur_glyphs);
                if cur.is_empty() {
                    return;
                }
                let matcher = ClassContext {
                    backtrack: backtrack_classdef,
                    input: input_classdef,
                    lookahead: lookahead_classdef,
                };
                for klass in input_classdef.intersect(&cur) {
                    let rules = match rule_sets.get(klass as usize) {
                        Some(Some(rules)) => rules,
                        _ => continue,
                    };
                    for rule in rules {
                        if !matcher.intersects(&closure.glyphs, rule) {
                            continue;
                        }
                        fire_records(
                            closure,
                            &rule.lookup_records,
                            rule.input.len(),
                            |glyphs, seqi| {
                                if seqi == 0 {
                                    input_classdef.intersect_class(&cur, klass)
                                } else {
                                    rule.input
                                        .get(seqi - 1)
                                        .map(|&k| input_classdef.intersect_class(glyphs, k))
                                        .unwrap_or_default()
                                }
                            },
                        );
                    }
                }
            }
            SequenceContext::Format3 {
                backtrack,
                input,
                lookahead,
                lookup_records,
            } => {
                let cur = match input.first() {
                    Some(first) => first.intersect_glyphs(cur_glyphs),
                    None => return,
                };
                if cur.is_empty() {
                    return;
                }
                if !backtrack
                    .iter()
                    .chain(input.iter())
                    .chain(lookahead.iter())
                    .all(|c| c.intersects(&closure.glyphs))
                {
                    return;
                }
                fire_records(closure, lookup_records, input.len(), |glyphs, seqi| {
                    if seqi == 0 {
                        cur.clone()
                    } else {
                        input
                            .get(seqi)
                            .map(|c| c.intersect_glyphs(glyphs))
                            .unwrap_or_default()
                    }
                });
            }
        }
    }
}

impl LayoutSubtable for SequenceContext {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        match self {
            SequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                let indices = coverage.subset(filter);
                let old = std::mem::take(rule_sets);
                // Rule sets left with no rules are dropped along with their
                // coverage entry, so the two stay parallel.
                let mut kept = vec![];
                for (pos, &i) in indices.iter().enumerate() {
                    let rules: Vec<ContextRule<GlyphID>> = old
                        .get(i)
                        .and_then(|r| r.as_ref())
                        .map(|rules| {
                            rules
                                .iter()
                                .filter_map(|r| {
                                    r.remap(|_, g| filter.contains(g).then(|| filter.remap(g)))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    if !rules.is_empty() {
                        kept.push(pos);
                        rule_sets.push(Some(rules));
                    }
                }
                coverage.remap(&kept);
                !coverage.is_empty()
            }
            SequenceContext::Format2 {
                coverage,
                backtrack_classdef,
                input_classdef,
                lookahead_classdef,
                rule_sets,
            } => {
                if coverage.subset(filter).is_empty() {
                    return false;
                }
                let backtrack_map = backtrack_classdef.subset(filter.retained, filter.map, true);
                let input_map = input_classdef.subset(filter.retained, filter.map, true);
                let lookahead_map = lookahead_classdef.subset(filter.retained, filter.map, true);

                let covered: BTreeSet<GlyphID> = coverage.glyphs.iter().copied().collect();
                let reachable = input_classdef.intersect(&covered);
                let old = std::mem::take(rule_sets);
                *rule_sets = input_map
                    .iter()
                    .enumerate()
                    .map(|(new_class, &old_class)| {
                        if !reachable.contains(&(new_class as uint16)) {
                            return None;
                        }
                        let rules: Vec<ContextRule<uint16>> = old
                            .get(old_class as usize)?
                            .as_ref()?
                            .iter()
                            .filter_map(|r| {
                                r.remap(|part, klass| {
                                    let map = match part {
                                        RulePart::Backtrack => &backtrack_map,
                                        RulePart::Input => &input_map,
                                        RulePart::Lookahead => &lookahead_map,
                                    };
                                    class_index(map, klass)
                                })
                            })
                            .collect();
                        (!rules.is_empty()).then(|| rules)
                    })
                    .collect();
                while let Some(None) = rule_sets.last() {
                    rule_sets.pop();
                }
                !rule_sets.is_empty()
            }
            SequenceContext::Format3 {
                backtrack,
                input,
                lookahead,
                ..
            } => {
                let mut all_match = !input.is_empty();
                for coverage in backtrack
                    .iter_mut()
                    .chain(input.iter_mut())
                    .chain(lookahead.iter_mut())
                {
                    if coverage.subset(filter).is_empty() {
                        all_match = false;
                    }
                }
                all_match
            }
        }
    }

    fn subset_lookups(&mut self, lookup_indices: &[usize]) {
        match self {
            SequenceContext::Format1 { rule_sets, .. } => {
                for rule in rule_sets.iter_mut().flatten().flatten() {
                    subset_records(&mut rule.lookup_records, lookup_indices)
                }
            }
            SequenceContext::Format2 { rule_sets, .. } => {
                for rule in rule_sets.iter_mut().flatten().flatten() {
                    subset_records(&mut rule.lookup_records, lookup_indices)
                }
            }
            SequenceContext::Format3 { lookup_records, .. } => {
                subset_records(lookup_records, lookup_indices)
            }
        }
    }

    fn collect_lookups(&self) -> Vec<usize> {
        let records: Vec<&SequenceLookupRecord> = match self {
            SequenceContext::Format1 { rule_sets, .. } => rule_sets
                .iter()
                .flatten()
                .flatten()
                .flat_map(|r| r.lookup_records.iter())
                .collect(),
            SequenceContext::Format2 { rule_sets, .. } => rule_sets
                .iter()
                .flatten()
                .flatten()
                .flat_map(|r| r.lookup_records.iter())
                .collect(),
            SequenceContext::Format3 { lookup_records, .. } => lookup_records.iter().collect(),
        };
        let mut lookups: Vec<usize> = records.iter().map(|r| r.lookup_index as usize).collect();
        lookups.sort_unstable();
        lookups.dedup();
        lookups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btreemap;
    use crate::btreeset;
    use crate::subset::GlyphMap;
    use pretty_assertions::assert_eq;

    fn record(sequence_index: uint16, lookup_index: uint16) -> SequenceLookupRecord {
        SequenceLookupRecord {
            sequence_index,
            lookup_index,
        }
    }

    #[test]
    fn test_format1_drops_empty_rule_sets_with_coverage() {
        let mut ctx = SequenceContext::Format1 {
            coverage: Coverage::new(vec![1, 2, 3]),
            rule_sets: vec![
                Some(vec![ContextRule {
                    input: vec![5],
                    lookup_records: vec![record(0, 0)],
                    ..Default::default()
                }]),
                Some(vec![ContextRule {
                    input: vec![4],
                    lookup_records: vec![record(0, 1)],
                    ..Default::default()
                }]),
                Some(vec![ContextRule {
                    input: vec![4],
                    lookup_records: vec![record(1, 0)],
                    ..Default::default()
                }]),
            ],
        };
        let retained = btreeset!(0, 1, 3, 4);
        let map = GlyphMap::compact(&retained);
        assert!(ctx.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        // Glyph 1's only rule needed glyph 5, so glyph 1 goes from the coverage too
        assert_eq!(
            ctx,
            SequenceContext::Format1 {
                coverage: Coverage::new(vec![2]),
                rule_sets: vec![Some(vec![ContextRule {
                    input: vec![3],
                    lookup_records: vec![record(1, 0)],
                    ..Default::default()
                }])],
            }
        );
    }

    #[test]
    fn test_format2_subset() {
        let mut ctx = SequenceContext::Format2 {
            coverage: Coverage::new(vec![1, 2]),
            backtrack_classdef: ClassDef::default(),
            input_classdef: ClassDef {
                classes: btreemap!(1 => 1, 2 => 2, 3 => 3, 4 => 3),
            },
            lookahead_classdef: ClassDef::default(),
            rule_sets: vec![
                None,
                Some(vec![ContextRule {
                    input: vec![3],
                    lookup_records: vec![record(0, 0)],
                    ..Default::default()
                }]),
                Some(vec![
                    ContextRule {
                        input: vec![1],
                        lookup_records: vec![record(0, 0)],
                        ..Default::default()
                    },
                    ContextRule {
                        input: vec![3],
                        lookup_records: vec![record(1, 0)],
                        ..Default::default()
                    },
                ]),
            ],
        };
        let retained = btreeset!(0, 2, 4);
        let map = GlyphMap::compact(&retained);
        assert!(ctx.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        match ctx {
            SequenceContext::Format2 {
                coverage,
                input_classdef,
                rule_sets,
                ..
            } => {
                assert_eq!(coverage.glyphs, vec![1]);
                // Old class 2 becomes 1, old class 3 becomes 2
                assert_eq!(input_classdef.classes, btreemap!(1 => 1, 2 => 2));
                // Class 1 is gone, and so is the rule which needed it
                assert_eq!(
                    rule_sets,
                    vec![
                        None,
                        Some(vec![ContextRule {
                            input: vec![2],
                            lookup_records: vec![record(1, 0)],
                            ..Default::default()
                        }])
                    ]
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_format3_subsets_every_coverage() {
        let mut ctx = SequenceContext::Format3 {
            backtrack: vec![Coverage::new(vec![7])],
            input: vec![Coverage::new(vec![1, 2]), Coverage::new(vec![3])],
            lookahead: vec![],
            lookup_records: vec![record(0, 2)],
        };
        let retained = btreeset!(0, 1, 2, 3);
        let map = GlyphMap::compact(&retained);
        assert!(!ctx.subset_glyphs(&GlyphFilter::new(&retained, &map)));
        if let SequenceContext::Format3 { input, .. } = &ctx {
            assert_eq!(input[1].glyphs, vec![3]);
        }
    }

    #[test]
    fn test_subset_lookups() {
        let mut ctx = SequenceContext::Format3 {
            backtrack: vec![],
            input: vec![Coverage::new(vec![1]), Coverage::new(vec![2])],
            lookahead: vec![],
            lookup_records: vec![record(0, 2), record(1, 5), record(1, 3)],
        };
        assert_eq!(ctx.collect_lookups(), vec![2, 3, 5]);
        ctx.subset_lookups(&[1, 3, 5]);
        if let SequenceContext::Format3 { lookup_records, .. } = &ctx {
            assert_eq!(lookup_records, &vec![record(1, 2), record(1, 1)]);
        }
    }
}
