use crate::subset::{ClosureContext, SubsetTable};
use crate::types::*;
use std::collections::BTreeMap;

/// The 'hdmx' OpenType tag.
pub const TAG: Tag = crate::tag!("hdmx");

/// A device record: the maximum width and per-glyph widths at one size.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DeviceRecord {
    /// Maximum of the widths below
    pub max_width: u8,
    /// Advance width of each glyph at this ppem, in pixels
    pub widths: Vec<u8>,
}

/// The horizontal device metrics table
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_camel_case_types)]
pub struct hdmx {
    /// Device records keyed by pixel size
    pub records: BTreeMap<u8, DeviceRecord>,
}

impl SubsetTable for hdmx {
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let old_gids = ctx.glyph_map().old_gids();
        for record in self.records.values_mut() {
            record.widths = old_gids
                .iter()
                .map(|g| g.and_then(|g| record.widths.get(g as usize)).copied().unwrap_or(0))
                .collect();
            record.max_width = record.widths.iter().copied().max().unwrap_or(0);
        }
        !self.records.is_empty()
    }
}
