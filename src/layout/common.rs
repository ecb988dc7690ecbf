use crate::error::{Result, SubsetError};
use crate::subset::{GlyphFilter, Options, Selection};
use crate::types::*;
use bitflags::bitflags;
use itertools::Itertools;

use std::collections::BTreeMap; // For predictable ordering
use std::fmt::Debug;

bitflags! {
    /// Lookup qualifiers
    pub struct LookupFlags: u16 {
        /// Position the last glyph of a cursive positioning sequence on the baseline
        const RIGHT_TO_LEFT = 0x0001;
        /// Skip over base glyphs
        const IGNORE_BASE_GLYPHS = 0x0002;
        /// Skip over ligatures
        const IGNORE_LIGATURES = 0x0004;
        /// Skip over all combining marks
        const IGNORE_MARKS = 0x0008;
        /// Indicates that the lookup table structure is followed by a MarkFilteringSet field.
        const USE_MARK_FILTERING_SET = 0x0010;
        /// Mask off the high bits to reveal a mark class defined in the GDEF table
        const MARK_ATTACHMENT_TYPE_MASK = 0xFF00;
    }
}

impl Default for LookupFlags {
    fn default() -> Self {
        LookupFlags::empty()
    }
}

/// A script list
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ScriptList {
    /// A mapping between script tags and `Script` tables.
    pub scripts: BTreeMap<Tag, Script>,
}

/// A Script table, containing information about language systems for a certain script.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Script {
    /// Optionally, a default language system to be used when no specific
    /// language is selected.
    pub default_language_system: Option<LanguageSystem>,
    /// A mapping between language tags and `LanguageSystem` records.
    pub language_systems: BTreeMap<Tag, LanguageSystem>,
}

/// A LanguageSystem table, selecting which features should be applied in the
/// current script/language combination.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct LanguageSystem {
    /// Each language system can define a required feature which must be processed
    /// for this script/language combination.
    pub required_feature: Option<usize>,
    /// A list of indices into the feature table to be processed for this
    /// script language combination.
    pub feature_indices: Vec<usize>,
}

/// Parameters attached to some features.
#[derive(Debug, PartialEq, Eq, Clone)]
#[allow(missing_docs)]
pub enum FeatureParams {
    /// Parameters of the `size` feature
    Size {
        design_size: uint16,
        subfamily_identifier: uint16,
        subfamily_name_id: uint16,
        range_start: uint16,
        range_end: uint16,
    },
    /// Parameters of the `ss01`-`ss20` features
    StylisticSet { version: uint16, ui_name_id: uint16 },
    /// Parameters of the `cv01`-`cv99` features
    CharacterVariant {
        ui_label_name_id: uint16,
        tooltip_text_name_id: uint16,
        sample_text_name_id: uint16,
        num_named_parameters: uint16,
        first_param_ui_label_name_id: uint16,
        characters: Vec<uint32>,
    },
}

/// A feature record: a tag, the lookups it switches on, and optional parameters.
#[derive(Debug, PartialEq, Clone)]
pub struct Feature {
    pub tag: Tag,
    pub lookup_indices: Vec<usize>,
    pub params: Option<FeatureParams>,
}

/// The feature list of a GSUB or GPOS table.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FeatureList(pub Vec<Feature>);

impl FeatureList {
    /// Builds a feature list from (tag, lookup indices, parameters) triples
    pub fn new(features: Vec<(Tag, Vec<usize>, Option<FeatureParams>)>) -> Self {
        FeatureList(
            features
                .into_iter()
                .map(|(tag, lookup_indices, params)| Feature {
                    tag,
                    lookup_indices,
                    params,
                })
                .collect(),
        )
    }

    /// Iterates over the features in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.0.iter()
    }

    /// The number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The feature at a feature index.
    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.0.get(index)
    }
}

/// A general lookup rule, of whatever type
#[derive(Debug, PartialEq, Clone)]
pub struct Lookup<T> {
    /// Lookup flags
    pub flags: LookupFlags,
    /// The mark filtering set index in the `GDEF` table.
    pub mark_filtering_set: Option<uint16>,
    /// The concrete rule (set of subtables)
    pub rule: T,
}

#[derive(Debug, PartialEq, Clone)]
#[allow(clippy::upper_case_acronyms)]
/// The shared structure of the glyph positioning and substitution tables
pub struct GPOSGSUB<T> {
    /// A list of lookups
    pub lookups: Vec<Lookup<T>>,
    /// A mapping between script tags and `Script` tables.
    pub scripts: ScriptList,
    /// The association between feature tags and the list of indices into the
    /// lookup table used to process this feature, together with any feature parameters.
    pub features: FeatureList,
}

impl<T> Default for GPOSGSUB<T> {
    fn default() -> Self {
        Self {
            lookups: Default::default(),
            scripts: Default::default(),
            features: Default::default(),
        }
    }
}

/// The subsetting operations every lookup subtable supports.
pub trait LayoutSubtable {
    /// Drops data referring to unretained glyphs and renumbers the rest.
    /// Returns false if nothing useful remains.
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool;

    fn prune_pre_subset(&mut self, _options: &Options) -> bool {
        true
    }

    fn prune_post_subset(&mut self, _options: &Options) -> bool {
        true
    }

    /// Renumbers nested lookup references; `lookup_indices` lists the old
    /// indices of the surviving lookups in their new order.
    fn subset_lookups(&mut self, _lookup_indices: &[usize]) {}

    /// The lookups this subtable invokes.
    fn collect_lookups(&self) -> Vec<usize> {
        vec![]
    }
}

/// The operations on a whole lookup rule (a list of subtables of one type).
pub trait LookupRule {
    fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool;
    fn prune_pre_subset(&mut self, options: &Options) -> bool;
    fn prune_post_subset(&mut self, options: &Options) -> bool;
    fn subset_lookups(&mut self, lookup_indices: &[usize]);
    fn collect_lookups(&self) -> Vec<usize>;
}

pub(crate) fn subset_subtables<S: LayoutSubtable>(
    subtables: &mut Vec<S>,
    filter: &GlyphFilter,
) -> bool {
    subtables.retain_mut(|st| st.subset_glyphs(filter));
    !subtables.is_empty()
}

pub(crate) fn prune_pre_subtables<S: LayoutSubtable>(
    subtables: &mut Vec<S>,
    options: &Options,
) -> bool {
    subtables
        .iter_mut()
        .fold(false, |ret, st| st.prune_pre_subset(options) || ret)
}

pub(crate) fn prune_post_subtables<S: LayoutSubtable>(
    subtables: &mut Vec<S>,
    options: &Options,
) -> bool {
    subtables
        .iter_mut()
        .fold(false, |ret, st| st.prune_post_subset(options) || ret)
}

pub(crate) fn subset_subtable_lookups<S: LayoutSubtable>(
    subtables: &mut Vec<S>,
    lookup_indices: &[usize],
) {
    for st in subtables.iter_mut() {
        st.subset_lookups(lookup_indices)
    }
}

pub(crate) fn collect_subtable_lookups<S: LayoutSubtable>(subtables: &[S]) -> Vec<usize> {
    subtables
        .iter()
        .flat_map(|st| st.collect_lookups())
        .sorted()
        .dedup()
        .collect()
}

impl LanguageSystem {
    /// Remaps feature indices; returns false if the language system is left empty.
    fn subset_features(&mut self, feature_indices: &[usize]) -> bool {
        self.required_feature = self
            .required_feature
            .and_then(|f| feature_indices.iter().position(|&x| x == f));
        self.feature_indices = self
            .feature_indices
            .iter()
            .filter_map(|f| feature_indices.iter().position(|x| x == f))
            .collect();
        !self.feature_indices.is_empty() || self.required_feature.is_some()
    }

    fn collect_features(&self) -> Vec<usize> {
        self.feature_indices
            .iter()
            .chain(self.required_feature.iter())
            .copied()
            .sorted()
            .dedup()
            .collect()
    }
}

impl Script {
    fn subset_features(&mut self, feature_indices: &[usize]) -> bool {
        if let Some(dflt) = self.default_language_system.as_mut() {
            if !dflt.subset_features(feature_indices) {
                self.default_language_system = None;
            }
        }
        self.language_systems
            .retain(|_, ls| ls.subset_features(feature_indices));
        !self.language_systems.is_empty() || self.default_language_system.is_some()
    }

    fn collect_features(&self) -> Vec<usize> {
        self.language_systems
            .values()
            .chain(self.default_language_system.iter())
            .flat_map(|ls| ls.collect_features())
            .sorted()
            .dedup()
            .collect()
    }
}

impl ScriptList {
    /// Remaps feature indices, dropping scripts which are left empty.
    pub fn subset_features(&mut self, feature_indices: &[usize]) -> bool {
        self.scripts
            .retain(|_, s| s.subset_features(feature_indices));
        !self.scripts.is_empty()
    }

    /// All feature indices referenced by any language system.
    pub fn collect_features(&self) -> Vec<usize> {
        self.scripts
            .values()
            .flat_map(|s| s.collect_features())
            .sorted()
            .dedup()
            .collect()
    }
}

impl Feature {
    /// Remaps lookup indices; returns false if the feature is left with
    /// neither lookups nor parameters.
    fn subset_lookups(&mut self, lookup_indices: &[usize]) -> bool {
        self.lookup_indices = self
            .lookup_indices
            .iter()
            .filter_map(|l| lookup_indices.iter().position(|x| x == l))
            .collect();
        !self.lookup_indices.is_empty() || self.params.is_some()
    }
}

impl FeatureList {
    /// Remaps lookup indices; returns the indices of the features kept.
    fn subset_lookups(&mut self, lookup_indices: &[usize]) -> Vec<usize> {
        // Never drop 'pref', even if empty: HarfBuzz picks the Khmer shaper
        // by its presence.
        let feature_indices: Vec<usize> = self
            .0
            .iter_mut()
            .enumerate()
            .filter_map(|(i, f)| {
                let keep = f.subset_lookups(lookup_indices) || f.tag == crate::tag!("pref");
                keep.then(|| i)
            })
            .collect();
        self.subset_features(&feature_indices);
        feature_indices
    }

    /// The lookups used by the given features.
    pub fn collect_lookups(&self, feature_indices: &[usize]) -> Vec<usize> {
        feature_indices
            .iter()
            .filter_map(|&i| self.0.get(i))
            .flat_map(|f| f.lookup_indices.iter().copied())
            .sorted()
            .dedup()
            .collect()
    }

    /// Keeps only the features at the given indices, in that order.
    pub fn subset_features(&mut self, feature_indices: &[usize]) -> bool {
        let old = std::mem::take(&mut self.0);
        self.0 = feature_indices
            .iter()
            .filter_map(|&i| old.get(i))
            .cloned()
            .collect();
        !self.0.is_empty()
    }
}

impl<T: LookupRule + Clone> GPOSGSUB<T> {
    /// Subsets every lookup, then drops the lookups left empty along with
    /// anything that referred only to them.
    pub fn subset_glyphs(&mut self, filter: &GlyphFilter) -> bool {
        let lookup_indices: Vec<usize> = self
            .lookups
            .iter_mut()
            .enumerate()
            .filter_map(|(i, l)| l.rule.subset_glyphs(filter).then(|| i))
            .collect();
        self.subset_lookups(&lookup_indices);
        self.prune_lookups();
        true
    }

    /// Retains the specified lookups, then removes empty features, language
    /// systems, and scripts.
    pub fn subset_lookups(&mut self, lookup_indices: &[usize]) {
        let count = self.lookups.len();
        let lookup_indices: Vec<usize> = lookup_indices
            .iter()
            .copied()
            .filter(|&i| i < count)
            .collect();
        let old = std::mem::take(&mut self.lookups);
        self.lookups = lookup_indices.iter().map(|&i| old[i].clone()).collect();
        for lookup in self.lookups.iter_mut() {
            lookup.rule.subset_lookups(&lookup_indices);
        }
        let feature_indices = self.features.subset_lookups(&lookup_indices);
        self.scripts.subset_features(&feature_indices);
    }

    /// Expands a set of lookups with the lookups they invoke, transitively.
    pub fn closure_lookups(&self, lookup_indices: &[usize]) -> Vec<usize> {
        let count = self.lookups.len();
        let mut all: Vec<usize> = lookup_indices.iter().copied().sorted().dedup().collect();
        let mut recurse = all.clone();
        loop {
            let nested: Vec<usize> = recurse
                .iter()
                .filter(|&&i| i < count)
                .flat_map(|&i| self.lookups[i].rule.collect_lookups())
                .filter(|l| *l < count && !all.contains(l))
                .sorted()
                .dedup()
                .collect();
            if nested.is_empty() {
                return all.into_iter().sorted().collect();
            }
            all.extend(nested.iter().copied());
            recurse = nested;
        }
    }

    /// Removes lookups not reachable from any script.
    pub fn prune_lookups(&mut self) {
        let feature_indices = self.scripts.collect_features();
        let lookup_indices = self.features.collect_lookups(&feature_indices);
        let lookup_indices = self.closure_lookups(&lookup_indices);
        self.subset_lookups(&lookup_indices);
    }

    /// Keeps only features whose tag is selected.
    pub fn subset_feature_tags(&mut self, feature_tags: &Selection<Tag>) {
        let feature_indices: Vec<usize> = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| feature_tags.contains(&f.tag))
            .map(|(i, _)| i)
            .collect();
        self.features.subset_features(&feature_indices);
        self.scripts.subset_features(&feature_indices);
    }

    /// Removes features not referenced by any language system.
    pub fn prune_features(&mut self) {
        let feature_indices = self.scripts.collect_features();
        self.features.subset_features(&feature_indices);
        self.scripts.subset_features(&feature_indices);
    }

    pub fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if !options.layout_features.is_all() {
            self.subset_feature_tags(&options.layout_features);
        }
        self.prune_lookups();
        for lookup in self.lookups.iter_mut() {
            lookup.rule.prune_pre_subset(options);
        }
        true
    }

    /// Removes language systems which switch on exactly the same features
    /// as their script's default language system.
    pub fn remove_redundant_langsys(&mut self) {
        let features = &self.features;
        let same = |a: usize, b: usize| features.get(a).is_some() && features.get(a) == features.get(b);
        for script in self.scripts.scripts.values_mut() {
            let dflt = match &script.default_language_system {
                Some(d) => d.clone(),
                None => continue,
            };
            script.language_systems.retain(|_, ls| {
                if ls.feature_indices.len() != dflt.feature_indices.len() {
                    return true;
                }
                let required_equal = match (dflt.required_feature, ls.required_feature) {
                    (None, None) => true,
                    (Some(a), Some(b)) => same(a, b),
                    _ => false,
                };
                let redundant = required_equal
                    && dflt
                        .feature_indices
                        .iter()
                        .zip(ls.feature_indices.iter())
                        .all(|(&a, &b)| same(a, b));
                !redundant
            });
        }
    }

    /// Prunes hinting data from every lookup, then merges redundant
    /// language systems and drops unreferenced features. Features which
    /// outlived their lookups because they carry parameters are kept.
    pub fn prune_post_subset(&mut self, options: &Options) -> bool {
        for lookup in self.lookups.iter_mut() {
            lookup.rule.prune_post_subset(options);
        }
        self.remove_redundant_langsys();
        self.prune_features();
        true
    }

    /// Checks that every feature, language system and nested lookup
    /// reference is in range.
    pub fn check_indices(&self, table: Tag) -> Result<()> {
        let violation = |msg: String| SubsetError::InvariantViolation {
            table: table.to_string(),
            msg,
        };
        let lookup_count = self.lookups.len();
        for feature in self.features.iter() {
            if let Some(bad) = feature.lookup_indices.iter().find(|&&l| l >= lookup_count) {
                return Err(violation(format!(
                    "feature '{}' refers to lookup {} of {}",
                    feature.tag, bad, lookup_count
                )));
            }
        }
        for (i, lookup) in self.lookups.iter().enumerate() {
            if let Some(bad) = lookup.rule.collect_lookups().iter().find(|&&l| l >= lookup_count) {
                return Err(violation(format!(
                    "lookup {} invokes lookup {} of {}",
                    i, bad, lookup_count
                )));
            }
        }
        let feature_count = self.features.len();
        for (tag, script) in self.scripts.scripts.iter() {
            let langsyses = script
                .language_systems
                .values()
                .chain(script.default_language_system.iter());
            for ls in langsyses {
                if let Some(bad) = ls.collect_features().iter().find(|&&f| f >= feature_count) {
                    return Err(violation(format!(
                        "script '{}' refers to feature {} of {}",
                        tag, bad, feature_count
                    )));
                }
            }
        }
        Ok(())
    }
}
