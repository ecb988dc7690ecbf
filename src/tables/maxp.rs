use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;

/// The 'maxp' OpenType tag.
pub const TAG: Tag = crate::tag!("maxp");

/// A maxp version 0.5 table, used by CFF fonts
#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct maxp05 {
    /// The number of glyphs in the font.
    pub numGlyphs: uint16,
}

/// A maxp version 1.0 table, used by TrueType fonts
#[allow(non_snake_case, non_camel_case_types, missing_docs)]
#[derive(Debug, PartialEq, Clone)]
pub struct maxp10 {
    pub numGlyphs: uint16,
    pub maxPoints: uint16,
    pub maxContours: uint16,
    pub maxCompositePoints: uint16,
    pub maxCompositeContours: uint16,
    pub maxZones: uint16,
    pub maxTwilightPoints: uint16,
    pub maxStorage: uint16,
    pub maxFunctionDefs: uint16,
    pub maxInstructionDefs: uint16,
    pub maxStackElements: uint16,
    pub maxSizeOfInstructions: uint16,
    pub maxComponentElements: uint16,
    pub maxComponentDepth: uint16,
}

/// The two versions of the maxp table
#[derive(Debug, PartialEq, Clone)]
pub enum MaxpVariant {
    /// Version 0.5
    Maxp05(maxp05),
    /// Version 1.0
    Maxp10(maxp10),
}

/// A maxp table, regardless of version.
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct maxp {
    /// Either a maxp 0.5 table or a maxp 1.0 table
    pub table: MaxpVariant,
}

impl maxp {
    /// Creates a new `maxp` table with version=0.5, given a number of glyphs
    pub fn new05(num_glyphs: u16) -> maxp {
        maxp {
            table: MaxpVariant::Maxp05(maxp05 {
                numGlyphs: num_glyphs,
            }),
        }
    }

    /// Returns the number of glyphs from the subtable variant.
    pub fn num_glyphs(&self) -> u16 {
        match &self.table {
            MaxpVariant::Maxp05(s) => s.numGlyphs,
            MaxpVariant::Maxp10(s) => s.numGlyphs,
        }
    }

    /// Sets the number of glyphs in the subtable variant.
    pub fn set_num_glyphs(&mut self, num: u16) {
        match &mut self.table {
            MaxpVariant::Maxp05(s) => s.numGlyphs = num,
            MaxpVariant::Maxp10(s) => s.numGlyphs = num,
        }
    }
}

impl SubsetTable for maxp {
    /// Without hinting, the TrueType interpreter limits can drop to their minimum.
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if let (false, MaxpVariant::Maxp10(t)) = (options.hinting, &mut self.table) {
            t.maxZones = 1;
            t.maxTwilightPoints = 0;
            t.maxStorage = 0;
            t.maxFunctionDefs = 0;
            t.maxInstructionDefs = 0;
            t.maxStackElements = 0;
            t.maxSizeOfInstructions = 0;
        }
        true
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        self.set_num_glyphs(ctx.glyph_map().num_glyphs() as u16);
        true
    }
}
