use crate::table_store::TableSet;
use crate::types::*;
use std::collections::BTreeMap;

/// The kind of outlines a font carries, as recorded in its header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SfntVersion {
    TrueType = 0x00010000,
    OpenType = 0x4F54544F,
}

/// An in-memory OpenType font: its tables plus the glyph order.
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Font {
    pub sfntVersion: SfntVersion,
    pub tables: TableSet,
    glyph_order: Vec<String>,
    reverse_glyph_order: BTreeMap<String, GlyphID>,
}

impl Font {
    #[allow(non_snake_case)]
    pub fn new(sfntVersion: SfntVersion) -> Self {
        Self {
            sfntVersion,
            tables: TableSet::default(),
            glyph_order: vec![],
            reverse_glyph_order: BTreeMap::new(),
        }
    }

    /// The glyph names, by glyph ID.
    pub fn glyph_order(&self) -> &[String] {
        &self.glyph_order
    }

    /// Replaces the glyph order.
    ///
    /// Names must be unique; a repeated name is only found by `glyph_id`
    /// at its first position.
    pub fn set_glyph_order(&mut self, names: Vec<String>) {
        self.reverse_glyph_order.clear();
        for (gid, name) in names.iter().enumerate() {
            if self.reverse_glyph_order.contains_key(name) {
                log::warn!("Duplicate glyph name '{}' at gid {}", name, gid);
                continue;
            }
            self.reverse_glyph_order.insert(name.clone(), gid as GlyphID);
        }
        self.glyph_order = names;
    }

    pub fn glyph_id(&self, name: &str) -> Option<GlyphID> {
        self.reverse_glyph_order.get(name).copied()
    }

    pub fn glyph_name(&self, gid: GlyphID) -> Option<&str> {
        self.glyph_order.get(gid as usize).map(|s| s.as_str())
    }

    /// The number of glyphs, taken from the glyph order, or from `maxp`
    /// when no glyph order has been set.
    pub fn num_glyphs(&self) -> usize {
        if !self.glyph_order.is_empty() {
            return self.glyph_order.len();
        }
        self.tables
            .maxp()
            .map_or(0, |maxp| maxp.num_glyphs() as usize)
    }

    /// True if the outlines live in a `glyf` table.
    pub fn is_truetype(&self) -> bool {
        self.tables.contains(crate::tables::glyf::TAG)
    }
}
