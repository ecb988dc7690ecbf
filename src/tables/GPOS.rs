use crate::error::Result;
use crate::layout::common::{
    collect_subtable_lookups, prune_post_subtables, prune_pre_subtables, subset_subtable_lookups,
    subset_subtables, Lookup, LookupRule, GPOSGSUB,
};
use crate::layout::contextual::SequenceContext;
use crate::layout::gpos1::SinglePos;
use crate::layout::gpos2::PairPos;
use crate::layout::gpos3::CursivePos;
use crate::layout::gpos4::MarkBasePos;
use crate::layout::gpos5::MarkLigPos;
use crate::layout::gpos6::MarkMarkPos;
use crate::subset::{Checkpoint, ClosureContext, GlyphFilter, Options, SubsetTable};
use crate::types::*;

/// The 'GPOS' OpenType tag.
pub const TAG: Tag = crate::tag!("GPOS");

/// A container which represents a generic positioning rule
///
/// Each rule is expressed as a vector of subtables.
#[derive(Debug, PartialEq, Clone)]
pub enum Positioning {
    /// Contains a single positioning rule.
    Single(Vec<SinglePos>),
    /// Contains a pair positioning rule.
    Pair(Vec<PairPos>),
    /// Contains a cursive positioning rule.
    Cursive(Vec<CursivePos>),
    /// Contains a mark-to-base positioning rule.
    MarkToBase(Vec<MarkBasePos>),
    /// Contains a mark-to-ligature positioning rule.
    MarkToLig(Vec<MarkLigPos>),
    /// Contains a mark-to-mark positioning rule.
    MarkToMark(Vec<MarkMarkPos>),
    /// Contains a contextual positioning rule.
    Contextual(Vec<SequenceContext>),
    /// Contains a chained contextual positioning rule.
    ChainedContextual(Vec<SequenceContext>),
}

macro_rules! each_subtable_list {
    ($rule:expr, $v:ident => $body:expr) => {
        match $rule {
            Positioning::Single($v) => $body,
            Positioning::Pair($v) => $body,
            Positioning::Cursive($v) => $body,
            Positioning::MarkToBase($v) => $body,
            Positioning::MarkToLig($v) => $body,
            Positioning::MarkToMark($v) => $body,
            Positioning::Contextual($v) => $body,
            Positioning::ChainedContextual($v) => $body,
        }
    };
}

impl LookupRule for Positioning {
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

impl Lookup<Positioning> {
    /// Returns the GPOS lookup type for this subtable
    pub fn lookup_type(&self) -> u16 {
        match &self.rule {
            Positioning::Single(_) => 1,
            Positioning::Pair(_) => 2,
            Positioning::Cursive(_) => 3,
            Positioning::MarkToBase(_) => 4,
            Positioning::MarkToLig(_) => 5,
            Positioning::MarkToMark(_) => 6,
            Positioning::Contextual(_) => 7,
            Positioning::ChainedContextual(_) => 8,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
/// The Glyph Positioning table
pub type GPOS = GPOSGSUB<Positioning>;

impl SubsetTable for GPOS {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        GPOSGSUB::prune_pre_subset(self, options)
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
    use crate::layout::classdef::ClassDef;
    use crate::layout::common::{
        FeatureList, FeatureParams, LanguageSystem, LookupFlags, Script, ScriptList,
    };
    use crate::layout::coverage::Coverage;
    use crate::layout::gpos2::Class2Record;
    use crate::layout::valuerecord::ValueRecord;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset, tag};
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, BTreeSet};

    fn kern_table() -> GPOS {
        let kern = |x| Class2Record {
            valueRecord1: ValueRecord {
                xAdvance: Some(x),
                ..Default::default()
            },
            valueRecord2: ValueRecord::new(),
        };
        GPOS {
            lookups: vec![Lookup {
                flags: LookupFlags::IGNORE_MARKS,
                mark_filtering_set: None,
                rule: Positioning::Pair(vec![PairPos::Format2 {
                    coverage: Coverage::new(vec![1]),
                    classdef1: ClassDef {
                        classes: btreemap!(1 => 1),
                    },
                    classdef2: ClassDef {
                        classes: btreemap!(2 => 1),
                    },
                    class1_records: vec![vec![kern(0), kern(0)], vec![kern(0), kern(-50)]],
                }]),
            }],
            scripts: ScriptList {
                scripts: btreemap!(tag!("latn") => Script {
                    default_language_system: Some(LanguageSystem {
                        required_feature: None,
                        feature_indices: vec![0],
                    }),
                    language_systems: btreemap!(tag!("TRK ") => LanguageSystem {
                        required_feature: None,
                        feature_indices: vec![0],
                    }),
                }),
            },
            features: FeatureList::new(vec![(tag!("kern"), vec![0], None)]),
        }
    }

    fn subset(table: &mut GPOS, glyphs: BTreeSet<GlyphID>) -> bool {
        let mut ctx = ClosureContext::new(btreeset!(), glyphs);
        ctx.checkpoint(Checkpoint::Gsub);
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        SubsetTable::subset_glyphs(table, &ctx)
    }

    #[test]
    fn test_pair_lookup_survives() {
        let mut table = kern_table();
        assert!(subset(&mut table, btreeset!(0, 1, 2)));
        assert_eq!(table.lookups.len(), 1);
        assert!(SubsetTable::prune_post_subset(&mut table, &Options::default()).unwrap());
        // The Turkish language system is identical to the default one
        assert_eq!(
            table.scripts.scripts[&tag!("latn")].language_systems,
            BTreeMap::new()
        );
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_dead_pair_lookup_is_dropped() {
        let mut table = kern_table();
        assert!(subset(&mut table, btreeset!(0, 1)));
        assert!(table.lookups.is_empty());
        assert!(SubsetTable::prune_post_subset(&mut table, &Options::default()).unwrap());
        assert!(table.features.is_empty());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_feature_with_params_outlives_lookups() {
        let mut table = kern_table();
        table.features = FeatureList::new(vec![
            (tag!("kern"), vec![0], None),
            (
                tag!("size"),
                vec![],
                Some(FeatureParams::Size {
                    design_size: 100,
                    subfamily_identifier: 0,
                    subfamily_name_id: 0,
                    range_start: 0,
                    range_end: 0,
                }),
            ),
        ]);
        let script = table.scripts.scripts.get_mut(&tag!("latn")).unwrap();
        for ls in script
            .language_systems
            .values_mut()
            .chain(script.default_language_system.iter_mut())
        {
            ls.feature_indices = vec![0, 1];
        }
        assert!(subset(&mut table, btreeset!(0, 1)));
        assert!(table.lookups.is_empty());
        assert!(SubsetTable::prune_post_subset(&mut table, &Options::default()).unwrap());
        assert_eq!(
            table.features.iter().map(|f| f.tag).collect::<Vec<_>>(),
            vec![tag!("size")]
        );
        assert_eq!(
            table.scripts.scripts[&tag!("latn")]
                .default_language_system
                .as_ref()
                .map(|ls| ls.feature_indices.clone()),
            Some(vec![0])
        );
        assert!(table.validate().is_ok());
    }
}
