use crate::subset::{ClosureContext, SubsetTable};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// The 'COLR' OpenType tag.
pub const TAG: Tag = crate::tag!("COLR");

/// One layer of a color glyph
#[allow(non_snake_case)]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Layer {
    /// The glyph drawn for this layer
    pub glyphID: GlyphID,
    /// Index into the CPAL palette, or 0xFFFF for the text color
    pub paletteIndex: uint16,
}

/// A version 0 color table: base glyphs painted as a stack of layer glyphs.
#[allow(non_snake_case)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct COLR {
    /// Layers for each color base glyph, bottom first
    pub baseGlyphRecords: BTreeMap<GlyphID, Vec<Layer>>,
}

impl SubsetTable for COLR {
    fn closure_glyphs(&self, ctx: &mut ClosureContext) {
        let layers: BTreeSet<GlyphID> = ctx
            .glyphs
            .iter()
            .filter_map(|g| self.baseGlyphRecords.get(g))
            .flatten()
            .map(|l| l.glyphID)
            .collect();
        ctx.glyphs.extend(layers);
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let map = ctx.glyph_map();
        self.baseGlyphRecords = std::mem::take(&mut self.baseGlyphRecords)
            .into_iter()
            .filter_map(|(base, layers)| {
                let layers = layers
                    .into_iter()
                    .map(|l| {
                        map.get(l.glyphID).map(|g| Layer {
                            glyphID: g,
                            paletteIndex: l.paletteIndex,
                        })
                    })
                    .collect::<Option<Vec<Layer>>>()?;
                Some((map.get(base)?, layers))
            })
            .collect();
        !self.baseGlyphRecords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::GlyphMap;
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    fn layer(glyphID: GlyphID, paletteIndex: uint16) -> Layer {
        Layer {
            glyphID,
            paletteIndex,
        }
    }

    #[test]
    fn test_colr_closure_and_subset() {
        let mut table = COLR {
            baseGlyphRecords: btreemap!(
                2 => vec![layer(5, 0), layer(6, 1)],
                3 => vec![layer(7, 0)]
            ),
        };
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 2));
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(0, 2, 5, 6));
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        assert!(table.subset_glyphs(&ctx));
        assert_eq!(
            table.baseGlyphRecords,
            btreemap!(1 => vec![layer(2, 0), layer(3, 1)])
        );
    }
}
