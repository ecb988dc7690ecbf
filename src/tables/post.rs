use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;

/// The 'post' OpenType tag.
pub const TAG: Tag = crate::tag!("post");

/// The PostScript table
#[allow(non_snake_case, non_camel_case_types)]
#[derive(Debug, PartialEq, Clone)]
pub struct post {
    /// Table version: 1.0, 2.0, 2.5 or 3.0
    pub version: f32,
    /// Italic angle in counter-clockwise degrees from the vertical
    pub italicAngle: f32,
    /// Suggested distance of the top of the underline from the baseline
    pub underlinePosition: int16,
    /// Suggested values for the underline thickness
    pub underlineThickness: int16,
    /// Set to 0 if the font is proportionally spaced
    pub isFixedPitch: uint32,
    /// Minimum memory usage when a font is downloaded as a Type 42 font
    pub minMemType42: uint32,
    /// Maximum memory usage when a font is downloaded as a Type 42 font
    pub maxMemType42: uint32,
    /// Minimum memory usage when a font is downloaded as a Type 1 font
    pub minMemType1: uint32,
    /// Maximum memory usage when a font is downloaded as a Type 1 font
    pub maxMemType1: uint32,
    /// Glyph names, indexed by glyph ID. Only present in version 2.0 tables.
    pub glyphnames: Option<Vec<String>>,
}

impl SubsetTable for post {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if !options.glyph_names {
            self.version = 3.0;
            self.glyphnames = None;
        }
        true
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        if let Some(names) = self.glyphnames.as_mut() {
            let old = std::mem::take(names);
            *names = ctx
                .glyph_map()
                .old_gids()
                .into_iter()
                .enumerate()
                .map(|(new, g)| {
                    old.get(g.map_or(new, |g| g as usize))
                        .cloned()
                        .unwrap_or_else(|| format!("glyph{:05}", new))
                })
                .collect();
        }
        true
    }
}
