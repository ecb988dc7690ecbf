use crate::error::Result;
use crate::layout::common::{
    collect_subtable_lookups, prune_post_subtables, prune_pre_subtables, subset_subtable_lookups,
    subset_subtables, Lookup, LookupRule, GPOSGSUB,
};
use crate::layout::contextual::SequenceContext;
use crate::layout::gsub1::SingleSubst;
use crate::layout::gsub2::MultipleSubst;
use crate::layout::gsub3::AlternateSubst;
use crate::layout::gsub4::LigatureSubst;
use crate::layout::gsub8::ReverseChainSingleSubst;
use crate::subset::{Checkpoint, ClosureContext, GlyphFilter, Options, SubsetTable};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// The 'GSUB' OpenType tag.
pub const TAG: Tag = crate::tag!("GSUB");

/// How deeply contextual lookups may invoke each other during closure.
pub const MAX_NESTING_LEVEL: usize = 64;

/// A container which represents a generic substitution rule
///
/// Each rule is expressed as a vector of subtables.
#[derive(Debug, PartialEq, Clone)]
pub enum Substitution {
    /// Contains a single substitution rule.
    Single(Vec<SingleSubst>),
    /// Contains a multiple substitution rule.
    Multiple(Vec<MultipleSubst>),
    /// Contains an alternate substitution rule.
    Alternate(Vec<AlternateSubst>),
    /// Contains an ligature substitution rule.
    Ligature(Vec<LigatureSubst>),
    /// Contains a contextual substitution rule.
    Contextual(Vec<SequenceContext>),
    /// Contains a chained contextual substitution rule.
    ChainedContextual(Vec<SequenceContext>),
    /// Contains a reverse chaining single substitution rule.
    ReverseChainContextual(Vec<ReverseChainSingleSubst>),
}

macro_rules! each_subtable_list {
    ($rule:expr, $v:ident => $body:expr) => {
        match $rule {
            Substitution::Single($v) => $body,
            Substitution::Multiple($v) => $body,
            Substitution::Alternate($v) => $body,
            Substitution::Ligature($v) => $body,
            Substitution::Contextual($v) => $body,
            Substitution::ChainedContextual($v) => $body,
            Substitution::ReverseChainContextual($v) => $body,
        }
    };
}

impl Substitution {
    /// True if this rule can replace a glyph with something other than a
    /// single glyph, changing the length of the glyph sequence.
    pub fn may_have_non_1to1(&self) -> bool {
        !matches!(
            self,
            Substitution::Single(_)
                | Substitution::Alternate(_)
                | Substitution::ReverseChainContextual(_)
        )
    }
}

impl LookupRule for Substitution {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        each_subtable_list!(self, v => subset_subtables(v, filter))
    }

    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        each_subtable_list!(self, v => prune_pre_subtables(v, options))
    }

    fn prune_post_subset(&mut self, options: &Options) -> bool {
        each_subtable_list!(self, v => prune_post_subtables(v, options))
    }

    fn subset_lookups(&mut self, lookup_indices: &[usize]) {
        each_subtable_list!(self, v => subset_subtable_lookups(v, lookup_indices))
    }

    fn collect_lookups(&self) -> Vec<usize> {
        each_subtable_list!(self, v => collect_subtable_lookups(v))
    }
}

impl Lookup<Substitution> {
    /// Returns the GSUB lookup type for this subtable
    pub fn lookup_type(&self) -> u16 {
        match &self.rule {
            Substitution::Single(_) => 1,
            Substitution::Multiple(_) => 2,
            Substitution::Alternate(_) => 3,
            Substitution::Ligature(_) => 4,
            Substitution::Contextual(_) => 5,
            Substitution::ChainedContextual(_) => 6,
            Substitution::ReverseChainContextual(_) => 8,
        }
    }
}

/// A substitution subtable which can grow the glyph set.
pub trait SubstitutionClosure {
    /// Adds every glyph this subtable could produce when applied to
    /// `cur_glyphs`, given that any glyph in `closure.glyphs` may be present.
    fn closure_glyphs(&self, closure: &mut SubstClosure, cur_glyphs: &BTreeSet<GlyphID>);
}

/// The state of one GSUB closure walk.
#[derive(Debug)]
pub struct SubstClosure<'a> {
    /// The glyphs known to be reachable so far.
    pub glyphs: BTreeSet<GlyphID>,
    lookups: &'a [Lookup<Substitution>],
    // For each lookup, the set size when last visited and the glyphs it has
    // already been run over at that size.
    done: BTreeMap<usize, (usize, BTreeSet<GlyphID>)>,
    depth: usize,
}

impl<'a> SubstClosure<'a> {
    pub fn new(lookups: &'a [Lookup<Substitution>], glyphs: BTreeSet<GlyphID>) -> Self {
        SubstClosure {
            glyphs,
            lookups,
            done: BTreeMap::new(),
            depth: 0,
        }
    }

    /// Whether the lookup at `index` can change the sequence length.
    pub fn may_have_non_1to1(&self, index: usize) -> bool {
        self.lookups
            .get(index)
            .map_or(false, |l| l.rule.may_have_non_1to1())
    }

    /// Applies the lookup at `index` to `cur_glyphs`, or to the whole
    /// reachable set if `None`.
    pub fn closure_lookup(&mut self, index: usize, cur_glyphs: Option<BTreeSet<GlyphID>>) {
        let lookups = self.lookups;
        let lookup = match lookups.get(index) {
            Some(lookup) => lookup,
            None => return,
        };
        if self.depth >= MAX_NESTING_LEVEL {
            log::warn!("Lookup {} nested too deeply; not following it", index);
            return;
        }
        let cur_glyphs = cur_glyphs.unwrap_or_else(|| self.glyphs.clone());
        let count = self.glyphs.len();
        let (seen_count, covered) = self.done.entry(index).or_default();
        if *seen_count != count {
            *seen_count = count;
            covered.clear();
        }
        if cur_glyphs.is_subset(covered) {
            return;
        }
        covered.extend(cur_glyphs.iter().copied());

        self.depth += 1;
        each_subtable_list!(&lookup.rule, v => {
            for subtable in v.iter() {
                subtable.closure_glyphs(self, &cur_glyphs)
            }
        });
        self.depth -= 1;
    }
}

#[allow(clippy::upper_case_acronyms)]
/// The Glyph Substitution table
pub type GSUB = GPOSGSUB<Substitution>;

impl SubsetTable for GSUB {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        GPOSGSUB::prune_pre_subset(self, options)
    }

    /// Replays every lookup reachable from a script until no new glyph appears.
    fn closure_glyphs(&self, ctx: &mut ClosureContext) {
        let feature_indices = self.scripts.collect_features();
        let lookup_indices = self.features.collect_lookups(&feature_indices);
        let mut closure = SubstClosure::new(&self.lookups, std::mem::take(&mut ctx.glyphs));
        loop {
            let before = closure.glyphs.len();
            for &index in &lookup_indices {
                closure.closure_lookup(index, None);
            }
            if closure.glyphs.len() == before {
                break;
            }
        }
        ctx.glyphs = closure.glyphs;
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        GPOSGSUB::subset_glyphs(self, &ctx.filter(Checkpoint::Gsub))
    }

    fn prune_post_subset(&mut self, options: &Options) -> Result<bool> {
        Ok(GPOSGSUB::prune_post_subset(self, options))
    }

    fn validate(&self) -> Result<()> {
        self.check_indices(TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::common::{FeatureList, LanguageSystem, LookupFlags, Script, ScriptList};
    use crate::layout::contextual::{ContextRule, SequenceLookupRecord};
    use crate::layout::coverage::Coverage;
    use crate::{btreemap, btreeset, tag};
    use pretty_assertions::assert_eq;

    fn lookup(rule: Substitution) -> Lookup<Substitution> {
        Lookup {
            flags: LookupFlags::empty(),
            mark_filtering_set: None,
            rule,
        }
    }

    fn gsub(lookups: Vec<Lookup<Substitution>>, features: Vec<(Tag, Vec<usize>)>) -> GSUB {
        let feature_indices = (0..features.len()).collect();
        GSUB {
            lookups,
            scripts: ScriptList {
                scripts: btreemap!(tag!("DFLT") => Script {
                    default_language_system: Some(LanguageSystem {
                        required_feature: None,
                        feature_indices,
                    }),
                    language_systems: BTreeMap::new(),
                }),
            },
            features: FeatureList::new(
                features
                    .into_iter()
                    .map(|(tag, lookups)| (tag, lookups, None))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_closure_follows_single_substitution() {
        let table = gsub(
            vec![lookup(Substitution::Single(vec![SingleSubst {
                mapping: btreemap!(1 => 2),
            }]))],
            vec![(tag!("ccmp"), vec![0])],
        );
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 1));
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(0, 1, 2));
    }

    #[test]
    fn test_closure_ignores_unreachable_lookups() {
        let table = gsub(
            vec![
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(1 => 2),
                }])),
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(1 => 3),
                }])),
            ],
            vec![(tag!("ccmp"), vec![0])],
        );
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(1));
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(1, 2));
    }

    #[test]
    fn test_closure_through_chained_context() {
        // In the context "1 2", lookup 1 turns 2 into 4, which then forms
        // a ligature with 1 through lookup 2.
        let table = gsub(
            vec![
                lookup(Substitution::ChainedContextual(vec![SequenceContext::Format3 {
                    backtrack: vec![Coverage::new(vec![1])],
                    input: vec![Coverage::new(vec![2])],
                    lookahead: vec![],
                    lookup_records: vec![SequenceLookupRecord {
                        sequence_index: 0,
                        lookup_index: 1,
                    }],
                }])),
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(2 => 4, 3 => 5),
                }])),
                lookup(Substitution::Ligature(vec![LigatureSubst {
                    mapping: btreemap!(vec![1, 4] => 6, vec![1, 5] => 7),
                }])),
            ],
            vec![(tag!("calt"), vec![0]), (tag!("liga"), vec![2])],
        );
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(1, 2, 3));
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(1, 2, 3, 4, 6));
    }

    #[test]
    fn test_closure_glyph_context_rule_positions() {
        let table = gsub(
            vec![
                lookup(Substitution::Contextual(vec![SequenceContext::Format1 {
                    coverage: Coverage::new(vec![1]),
                    rule_sets: vec![Some(vec![ContextRule {
                        input: vec![2],
                        lookup_records: vec![SequenceLookupRecord {
                            sequence_index: 1,
                            lookup_index: 1,
                        }],
                        ..Default::default()
                    }])],
                }])),
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(1 => 8, 2 => 9),
                }])),
            ],
            vec![(tag!("calt"), vec![0])],
        );
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(1, 2));
        table.closure_glyphs(&mut ctx);
        // Only the second position is substituted
        assert_eq!(ctx.glyphs, btreeset!(1, 2, 9));
    }

    #[test]
    fn test_subset_drops_dead_lookups_and_renumbers() {
        let mut table = gsub(
            vec![
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(5 => 6),
                }])),
                lookup(Substitution::Single(vec![SingleSubst {
                    mapping: btreemap!(1 => 2),
                }])),
            ],
            vec![(tag!("smcp"), vec![0]), (tag!("c2sc"), vec![1])],
        );
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 1));
        table.closure_glyphs(&mut ctx);
        ctx.checkpoint(Checkpoint::Gsub);
        ctx.set_glyph_map(crate::subset::GlyphMap::compact(&ctx.glyphs));
        assert!(SubsetTable::subset_glyphs(&mut table, &ctx));
        assert_eq!(table.lookups.len(), 1);
        assert_eq!(
            table.lookups[0].rule,
            Substitution::Single(vec![SingleSubst {
                mapping: btreemap!(1 => 2),
            }])
        );
        assert_eq!(table.features.len(), 1);
        assert_eq!(table.features.0[0].tag, tag!("c2sc"));
        assert_eq!(table.features.0[0].lookup_indices, vec![0]);
        assert_eq!(
            table.scripts.scripts[&tag!("DFLT")]
                .default_language_system
                .as_ref()
                .map(|ls| ls.feature_indices.clone()),
            Some(vec![0])
        );
        assert!(table.validate().is_ok());
    }
}
