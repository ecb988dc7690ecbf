use crate::subset::{ClosureContext, SubsetTable};
use crate::types::*;

/// The 'hmtx' OpenType tag.
pub const TAG: Tag = crate::tag!("hmtx");

/// The 'vmtx' OpenType tag.
pub const VMTX_TAG: Tag = crate::tag!("vmtx");

#[derive(Debug, PartialEq, Clone, Copy, Default)]
#[allow(non_snake_case)]
/// A metric record: an advance and a side bearing.
pub struct Metric {
    /// Advance width (or height, in a vmtx table)
    pub advanceWidth: u16,
    /// Left (or top) side bearing
    pub lsb: int16,
}

/// The horizontal metrics table
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_camel_case_types)]
pub struct hmtx {
    /// One metric record per glyph
    pub metrics: Vec<Metric>,
}

/// The vertical metrics table
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_camel_case_types)]
pub struct vmtx {
    /// One metric record per glyph
    pub metrics: Vec<Metric>,
}

/// Reorders metrics into the new glyph order. Glyphs kept only to
/// preserve glyph IDs get zero metrics.
fn subset_metrics(metrics: &mut Vec<Metric>, ctx: &ClosureContext) {
    let old = std::mem::take(metrics);
    *metrics = ctx
        .glyph_map()
        .old_gids()
        .into_iter()
        .map(|g| {
            g.and_then(|g| old.get(g as usize))
                .copied()
                .unwrap_or_default()
        })
        .collect();
}

/// Computes the number of long metric records needed: trailing glyphs
/// which share the last advance can omit it.
fn number_of_long_metrics(metrics: &[Metric]) -> uint16 {
    match metrics.last() {
        None => 0,
        Some(last) => {
            let repeated = metrics
                .iter()
                .rev()
                .take_while(|m| m.advanceWidth == last.advanceWidth)
                .count();
            (metrics.len() - repeated + 1) as uint16
        }
    }
}

impl hmtx {
    /// The value `hhea.numberOfHMetrics` should take.
    pub fn number_of_hmetrics(&self) -> uint16 {
        number_of_long_metrics(&self.metrics)
    }
}

impl vmtx {
    /// The value `vhea.numOfLongVerMetrics` should take.
    pub fn number_of_vmetrics(&self) -> uint16 {
        number_of_long_metrics(&self.metrics)
    }
}

impl SubsetTable for hmtx {
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        subset_metrics(&mut self.metrics, ctx);
        true
    }
}

impl SubsetTable for vmtx {
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        subset_metrics(&mut self.metrics, ctx);
        !self.metrics.is_empty()
    }
}
