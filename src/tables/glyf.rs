use crate::error::Result;
use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;
use std::collections::BTreeSet;

mod component;
mod glyph;
mod point;

pub use component::{Component, ComponentFlags};
pub use glyph::Glyph;
pub use point::Point;

/// The 'glyf' OpenType tag.
pub const TAG: Tag = crate::tag!("glyf");

/// The glyf table
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_camel_case_types)]
pub struct glyf {
    /// A list of glyph objects in the font, indexed by glyph ID
    pub glyphs: Vec<Glyph>,
}

impl glyf {
    /// Recomputes every glyph's bounding box, returning the font's overall
    /// bounds, or `None` if all glyphs are empty.
    pub fn recalc_bounds(&mut self) -> Option<kurbo::Rect> {
        let bounds: Vec<Option<kurbo::Rect>> = self
            .glyphs
            .iter()
            .map(|g| g.compute_bounds(&self.glyphs))
            .collect();
        let mut total: Option<kurbo::Rect> = None;
        for (glyph, rect) in self.glyphs.iter_mut().zip(bounds) {
            match rect {
                Some(r) => {
                    glyph.set_bounds_rect(r);
                    total = Some(total.map_or(r, |t| t.union(r)));
                }
                None => glyph.set_bounds_rect(kurbo::Rect::ZERO),
            }
        }
        total
    }
}

impl SubsetTable for glyf {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if options.notdef_glyph && !options.notdef_outline {
            if let Some(notdef) = self.glyphs.get_mut(0) {
                *notdef = Glyph::empty();
            }
        }
        true
    }

    /// Adds the components of retained composites, transitively.
    fn closure_glyphs(&self, ctx: &mut ClosureContext) {
        let mut decompose: BTreeSet<GlyphID> = ctx.glyphs.clone();
        while !decompose.is_empty() {
            let components: BTreeSet<GlyphID> = decompose
                .iter()
                .filter_map(|&g| self.glyphs.get(g as usize))
                .flat_map(|g| g.component_ids())
                .filter(|c| !ctx.glyphs.contains(c))
                .collect();
            ctx.glyphs.extend(components.iter().copied());
            decompose = components;
        }
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let map = ctx.glyph_map();
        let old = std::mem::take(&mut self.glyphs);
        self.glyphs = map
            .old_gids()
            .into_iter()
            .map(|old_gid| {
                let mut glyph = old_gid
                    .and_then(|g| old.get(g as usize))
                    .cloned()
                    .unwrap_or_else(Glyph::empty);
                for component in glyph.components.iter_mut() {
                    component.remap(map);
                }
                glyph
            })
            .collect();
        true
    }

    fn prune_post_subset(&mut self, options: &Options) -> Result<bool> {
        if !options.hinting {
            self.glyphs.iter_mut().for_each(Glyph::remove_hinting);
        }
        Ok(true)
    }
}
