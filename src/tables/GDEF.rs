use crate::error::Result;
use crate::layout::valuerecord::Device;
use crate::subset::{Checkpoint, ClosureContext, GlyphFilter, Options, SubsetTable};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// The 'GDEF' OpenType tag.
pub const TAG: Tag = crate::tag!("GDEF");

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
/// A caret value in a GDEF table
pub enum CaretValue {
    /// A format 1 caret value
    Format1 {
        /// X or Y value, in design units
        coordinate: int16,
    },
    /// A format 2 caret value
    Format2 {
        /// Contour point index on glyph
        pointIndex: uint16,
    },
    /// A format 3 caret value
    Format3 {
        /// X or Y value, in design units
        coordinate: int16,
        ///  Device table (non-variable font) / Variation Index table (variable font) for X or Y value
        device: Device,
    },
}

impl CaretValue {
    fn prune_hints(&mut self) {
        if let CaretValue::Format3 { coordinate, device } = self {
            if device.is_hinting() {
                *self = CaretValue::Format1 {
                    coordinate: *coordinate,
                };
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
/// A glyph class definition in the GDEF table
pub enum GlyphClass {
    /// Base glyph (single character, spacing glyph)
    BaseGlyph = 1,
    /// Ligature glyph (multiple character, spacing glyph)
    LigatureGlyph,
    /// Mark glyph (non-spacing combining glyph)
    MarkGlyph,
    /// Component glyph (part of single character, spacing glyph)
    ComponentGlyph,
}

impl From<u16> for GlyphClass {
    fn from(gc: u16) -> Self {
        match gc {
            2 => GlyphClass::LigatureGlyph,
            3 => GlyphClass::MarkGlyph,
            4 => GlyphClass::ComponentGlyph,
            _ => GlyphClass::BaseGlyph,
        }
    }
}

/// A GDEF (Glyph Definition) table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GDEF {
    /// Glyph class definitions
    pub glyph_class: BTreeMap<GlyphID, GlyphClass>,
    /// Attachment point list
    pub attachment_point_list: BTreeMap<GlyphID, Vec<uint16>>,
    /// Ligature caret list
    pub ligature_caret_list: BTreeMap<GlyphID, Vec<CaretValue>>,
    /// Mark attachment class list
    pub mark_attachment_class: BTreeMap<GlyphID, uint16>,
    /// Mark glyph sets, referenced by index from lookups' mark filtering sets
    pub mark_glyph_sets: Option<Vec<BTreeSet<GlyphID>>>,
    /// Item variation store, carried through untouched
    pub item_variation_store: Option<Vec<u8>>,
}

fn subset_glyph_map<V>(map: &mut BTreeMap<GlyphID, V>, filter: &GlyphFilter) {
    *map = std::mem::take(map)
        .into_iter()
        .filter(|(g, _)| filter.contains(*g))
        .map(|(g, v)| (filter.remap(g), v))
        .collect();
}

impl GDEF {
    /// The minor version needed to hold the data present.
    pub fn minor_version(&self) -> uint16 {
        if self.item_variation_store.is_some() {
            3
        } else if self.mark_glyph_sets.is_some() {
            2
        } else {
            0
        }
    }
}

impl SubsetTable for GDEF {
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let filter = ctx.filter(Checkpoint::Gsub);
        subset_glyph_map(&mut self.ligature_caret_list, &filter);
        subset_glyph_map(&mut self.attachment_point_list, &filter);
        subset_glyph_map(&mut self.mark_attachment_class, &filter);
        subset_glyph_map(&mut self.glyph_class, &filter);
        // Sets are subset in place but never removed: lookups refer to them
        // by index through their mark filtering set.
        if let Some(sets) = self.mark_glyph_sets.as_mut() {
            for set in sets.iter_mut() {
                *set = set
                    .iter()
                    .filter(|&&g| filter.contains(g))
                    .map(|&g| filter.remap(g))
                    .collect();
            }
        }
        true
    }

    fn prune_post_subset(&mut self, options: &Options) -> Result<bool> {
        if !options.hinting {
            self.ligature_caret_list
                .values_mut()
                .flatten()
                .for_each(CaretValue::prune_hints);
        }
        if self
            .mark_glyph_sets
            .as_ref()
            .map_or(false, |sets| sets.is_empty())
        {
            self.mark_glyph_sets = None;
        }
        Ok(!self.ligature_caret_list.is_empty()
            || !self.mark_attachment_class.is_empty()
            || !self.glyph_class.is_empty()
            || !self.attachment_point_list.is_empty()
            || self.mark_glyph_sets.is_some()
            || self.item_variation_store.is_some())
    }
}
