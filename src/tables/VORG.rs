use crate::subset::{ClosureContext, SubsetTable};
use crate::types::*;
use std::collections::BTreeMap;

/// The 'VORG' OpenType tag.
pub const TAG: Tag = crate::tag!("VORG");

/// The vertical origin table, used by CFF fonts
#[allow(non_snake_case)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct VORG {
    /// The vertical origin of glyphs not listed below
    pub defaultVertOriginY: int16,
    /// Glyphs whose vertical origin differs from the default
    pub vertOriginYMetrics: BTreeMap<GlyphID, int16>,
}

impl SubsetTable for VORG {
    /// Never dropped: the default origin still applies to every glyph.
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let map = ctx.glyph_map();
        self.vertOriginYMetrics = std::mem::take(&mut self.vertOriginYMetrics)
            .into_iter()
            .filter_map(|(g, y)| map.get(g).map(|new| (new, y)))
            .collect();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vorg_subset() {
        let mut table = VORG {
            defaultVertOriginY: 880,
            vertOriginYMetrics: btreemap!(2 => 900, 5 => 870),
        };
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 1, 2));
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        assert!(table.subset_glyphs(&ctx));
        assert_eq!(table.vertOriginYMetrics, btreemap!(2 => 900));

        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0));
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        assert!(table.subset_glyphs(&ctx));
        assert!(table.vertOriginYMetrics.is_empty());
    }
}
