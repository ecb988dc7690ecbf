//! The subsetting pipeline.
mod closure;
mod context;
mod options;
mod protocol;
mod request;

pub use closure::compute_closure;
pub use context::{Checkpoint, ClosureContext, GlyphFilter, GlyphMap};
pub use options::{
    default_layout_features, Flavor, Options, Selection, DROP_TABLES_DEFAULT,
    HINTING_TABLES_DEFAULT, LAYOUT_FEATURES_GROUPS, NO_SUBSET_TABLES_DEFAULT,
};
pub use protocol::SubsetTable;
pub use request::Request;

use crate::error::{Result, SubsetError};
use crate::font::Font;
use crate::types::*;
use std::collections::BTreeSet;

/// Reduces fonts to a requested set of glyphs and codepoints.
///
/// ```ignore
/// let mut subsetter = Subsetter::new(Options::default());
/// subsetter.populate(&request);
/// subsetter.subset(&mut font)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Subsetter {
    options: Options,
    unicodes_requested: BTreeSet<u32>,
    glyphs_requested: Vec<String>,
}

impl Subsetter {
    pub fn new(options: Options) -> Self {
        Subsetter {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Adds to what this subsetter will keep.
    pub fn populate(&mut self, request: &Request) {
        self.unicodes_requested.extend(request.codepoints());
        self.glyphs_requested.extend(request.glyphs.iter().cloned());
    }

    /// Subsets `font` in place.
    ///
    /// On error the font may have been partly modified and should be
    /// discarded.
    pub fn subset(&self, font: &mut Font) -> Result<()> {
        let glyphs = self.resolve_glyphs(font)?;
        self.prune_pre_subset(font);
        let ctx = compute_closure(font, &self.options, self.unicodes_requested.clone(), glyphs)?;
        self.subset_glyphs(font, &ctx);
        self.prune_post_subset(font)?;
        self.recalc(font);
        Ok(())
    }

    fn resolve_glyphs(&self, font: &Font) -> Result<BTreeSet<GlyphID>> {
        let mut glyphs = BTreeSet::new();
        let mut missing = vec![];
        for name in &self.glyphs_requested {
            match font.glyph_id(name) {
                Some(gid) => {
                    glyphs.insert(gid);
                }
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            if self.options.ignore_missing_glyphs {
                log::warn!("Ignoring glyphs not in font: {:?}", missing);
            } else {
                log::error!("Glyphs not in font: {:?}", missing);
                return Err(SubsetError::MissingGlyphs(missing));
            }
        }
        Ok(glyphs)
    }

    fn prune_pre_subset(&self, font: &mut Font) {
        let options = &self.options;
        for tag in font.tables.keys() {
            if options.drop_tables.contains(&tag)
                || (!options.hinting && options.hinting_tables.contains(&tag))
            {
                log::info!("{} dropped", tag);
                font.tables.remove(tag);
                continue;
            }
            let retain = match font.tables.get_mut(tag).and_then(|t| t.as_subset_mut()) {
                Some(table) => table.prune_pre_subset(options),
                None => continue,
            };
            if retain {
                log::info!("{} pruned", tag);
            } else {
                log::info!("{} pruned to empty; dropped", tag);
                font.tables.remove(tag);
            }
        }
    }

    fn subset_glyphs(&self, font: &mut Font, ctx: &ClosureContext) {
        for tag in font.tables.keys() {
            if self.options.no_subset_tables.contains(&tag) {
                log::debug!("{} left untouched", tag);
                continue;
            }
            let retain = match font.tables.get_mut(tag).and_then(|t| t.as_subset_mut()) {
                Some(table) => table.subset_glyphs(ctx),
                None => {
                    log::info!("{} missing subsetting; dropped", tag);
                    font.tables.remove(tag);
                    continue;
                }
            };
            if retain {
                log::info!("{} subsetted", tag);
            } else {
                log::info!("{} subsetted to empty; dropped", tag);
                font.tables.remove(tag);
            }
        }

        let old_order = font.glyph_order().to_vec();
        let new_order = ctx
            .glyph_map()
            .old_gids()
            .into_iter()
            .enumerate()
            .map(|(new, old)| {
                old_order
                    .get(old.map_or(new, |g| g as usize))
                    .cloned()
                    .unwrap_or_else(|| format!("glyph{:05}", new))
            })
            .collect();
        font.set_glyph_order(new_order);
        let num_glyphs = ctx.glyph_map().num_glyphs() as uint16;
        if let Some(maxp) = font.tables.maxp_mut() {
            maxp.set_num_glyphs(num_glyphs);
        }
    }

    fn prune_post_subset(&self, font: &mut Font) -> Result<()> {
        for tag in font.tables.keys() {
            let retain = match font.tables.get_mut(tag).and_then(|t| t.as_subset_mut()) {
                Some(table) => table.prune_post_subset(&self.options)?,
                None => continue,
            };
            if retain {
                log::info!("{} pruned", tag);
            } else {
                log::info!("{} pruned to empty; dropped", tag);
                font.tables.remove(tag);
            }
        }
        for (_, table) in font.tables.iter() {
            if let Some(table) = table.as_subset() {
                table.validate()?;
            }
        }
        Ok(())
    }

    fn recalc(&self, font: &mut Font) {
        if self.options.recalc_bounds {
            if let Some(bounds) = font.tables.glyf_mut().map(|glyf| glyf.recalc_bounds()) {
                if let Some(head) = font.tables.head_mut() {
                    head.set_bounds(bounds.unwrap_or(kurbo::Rect::ZERO));
                }
            }
        }
        if self.options.recalc_timestamp {
            if let Some(head) = font.tables.head_mut() {
                head.touch();
            }
        }
    }
}
