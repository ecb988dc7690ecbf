use crate::error::{Result, SubsetError};
use crate::font::Font;
use crate::subset::{Checkpoint, ClosureContext, GlyphMap, Options, SubsetTable};
use crate::table_store::Table;
use crate::tables;
use crate::types::*;
use std::collections::BTreeSet;

fn retain_real_glyphs(ctx: &mut ClosureContext, num_glyphs: usize) {
    ctx.glyphs.retain(|&g| (g as usize) < num_glyphs);
}

/// Grows the requested glyphs into the full set the subset font needs, and
/// decides how the survivors are renumbered.
pub fn compute_closure(
    font: &Font,
    options: &Options,
    unicodes: BTreeSet<u32>,
    glyphs: BTreeSet<GlyphID>,
) -> Result<ClosureContext> {
    let num_glyphs = font.num_glyphs();
    let mut ctx = ClosureContext::new(unicodes, glyphs);

    if let Some(cmap) = font.tables.cmap() {
        cmap.closure_glyphs(&mut ctx);
    } else {
        ctx.unicodes_missing = ctx.unicodes_requested.clone();
    }
    retain_real_glyphs(&mut ctx, num_glyphs);
    ctx.checkpoint(Checkpoint::Cmap);

    if !ctx.unicodes_missing.is_empty() {
        let missing: Vec<u32> = ctx.unicodes_missing.iter().copied().collect();
        if options.ignore_missing_unicodes {
            log::warn!("Ignoring unmapped codepoints: {:04X?}", missing);
        } else {
            log::error!("No glyphs for codepoints: {:04X?}", missing);
            return Err(SubsetError::MissingUnicodes(missing));
        }
    }

    let truetype = font.is_truetype();
    if options.notdef_glyph {
        if truetype {
            ctx.glyphs.insert(0);
            log::info!("Added gid0 to subset");
        } else {
            let notdef = font.glyph_id(".notdef").or_else(|| {
                font.tables
                    .CFF()
                    .and_then(|cff| cff.fonts.first())
                    .and_then(|f| f.glyph_id(".notdef"))
            });
            match notdef {
                Some(gid) => {
                    ctx.glyphs.insert(gid);
                    log::info!("Added .notdef to subset");
                }
                None => log::warn!("Font has no .notdef glyph"),
            }
        }
    }
    if options.recommended_glyphs && truetype {
        ctx.glyphs.extend((0..num_glyphs.min(4)).map(|g| g as GlyphID));
        log::info!("Added first four glyphs to subset");
    }

    if let Some(gsub) = font.tables.GSUB() {
        log::info!("Closing glyph list over 'GSUB': {} glyphs before", ctx.glyphs.len());
        gsub.closure_glyphs(&mut ctx);
        retain_real_glyphs(&mut ctx, num_glyphs);
        log::info!("Closed glyph list over 'GSUB': {} glyphs after", ctx.glyphs.len());
        log::debug!("Glyphs: {:?}", ctx.glyphs);
    }
    ctx.checkpoint(Checkpoint::Gsub);

    // Color layers may be composites and composites may be seac accents, so
    // the outline tables are closed over together.
    let outline_tables: Vec<&dyn SubsetTable> = vec![
        font.tables.get(tables::COLR::TAG),
        font.tables.get(tables::glyf::TAG),
        font.tables.get(tables::CFF::TAG),
    ]
    .into_iter()
    .flatten()
    .filter_map(Table::as_subset)
    .collect();
    if !outline_tables.is_empty() {
        log::info!("Closing glyph list over outlines: {} glyphs before", ctx.glyphs.len());
        loop {
            let before = ctx.glyphs.len();
            for table in &outline_tables {
                table.closure_glyphs(&mut ctx);
            }
            retain_real_glyphs(&mut ctx, num_glyphs);
            if ctx.glyphs.len() == before {
                break;
            }
        }
        log::info!("Closed glyph list over outlines: {} glyphs after", ctx.glyphs.len());
        log::debug!("Glyphs: {:?}", ctx.glyphs);
    }
    ctx.checkpoint(Checkpoint::Glyf);

    let map = if options.retain_gids {
        GlyphMap::retaining_gids(&ctx.glyphs)
    } else {
        GlyphMap::compact(&ctx.glyphs)
    };
    log::info!("Retaining {} glyphs", map.num_glyphs());
    ctx.set_glyph_map(map);
    Ok(ctx)
}
