use crate::error::Result;
use crate::subset::{ClosureContext, Options};

/// The hooks through which the subsetter drives each table.
///
/// A run calls each hook on every table before moving to the next one:
/// first `prune_pre_subset`, then `closure_glyphs` (for the tables which
/// can pull in more glyphs), then `subset_glyphs`, and finally
/// `prune_post_subset` and `validate`. Any hook returning `false` has the
/// table dropped from the font.
pub trait SubsetTable {
    /// Removes data the options rule out, before the glyph set is known.
    fn prune_pre_subset(&mut self, _options: &Options) -> bool {
        true
    }

    /// Adds the glyphs this table makes reachable from `ctx.glyphs`.
    fn closure_glyphs(&self, _ctx: &mut ClosureContext) {}

    /// Keeps only data for retained glyphs, renumbered through the run's
    /// glyph map.
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool;

    /// Tidies up after subsetting.
    fn prune_post_subset(&mut self, _options: &Options) -> Result<bool> {
        Ok(true)
    }

    /// Checks that the table's internal references are consistent.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
