use crate::error::{Result, SubsetError};
use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

pub mod charstring;
mod dehint;
mod encoding;

pub use charstring::{CharString, Token};
pub use encoding::standard_encoding_name;

use charstring::Subrs;

/// The 'CFF ' OpenType tag.
pub const TAG: Tag = crate::tag!("CFF ");

/// Private DICT operators carrying values (other than widths and subroutines).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivateOperator {
    BlueValues,
    OtherBlues,
    FamilyBlues,
    FamilyOtherBlues,
    BlueScale,
    BlueShift,
    BlueFuzz,
    StdHW,
    StdVW,
    StemSnapH,
    StemSnapV,
    ForceBold,
    LanguageGroup,
    ExpansionFactor,
    InitialRandomSeed,
}

impl PrivateOperator {
    /// Returns true for the font-wide hinting values.
    pub fn is_hinting(&self) -> bool {
        !matches!(
            self,
            PrivateOperator::LanguageGroup
                | PrivateOperator::ExpansionFactor
                | PrivateOperator::InitialRandomSeed
        )
    }
}

/// A Private DICT
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrivateDict {
    /// Operator values
    pub values: BTreeMap<PrivateOperator, Vec<f64>>,
    /// Width of glyphs whose charstring carries no width operand
    pub default_width_x: f64,
    /// Base added to width operands
    pub nominal_width_x: f64,
    /// Local subroutines
    pub subrs: Vec<CharString>,
}

/// A Font DICT of a CID-keyed font
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontDict {
    /// The FontName entry, if any
    pub font_name: Option<String>,
    /// The dictionary's Private DICT
    pub private: PrivateDict,
}

/// One font of a CFF FontSet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CffFont {
    /// Name from the Name INDEX
    pub name: String,
    /// Glyph names (or `cidNNNNN` for CID-keyed fonts), by glyph ID
    pub charset: Vec<String>,
    /// Charstrings, by glyph ID
    pub charstrings: Vec<CharString>,
    /// The Private DICT of a name-keyed font
    pub private: PrivateDict,
    /// Font DICTs of a CID-keyed font
    pub fd_array: Vec<FontDict>,
    /// For CID-keyed fonts, the Font DICT index of each glyph
    pub fd_select: Option<Vec<u8>>,
}

impl CffFont {
    /// Returns true for CID-keyed fonts.
    pub fn is_cid(&self) -> bool {
        self.fd_select.is_some()
    }

    /// Looks a glyph up by its charset name.
    pub fn glyph_id(&self, name: &str) -> Option<GlyphID> {
        self.charset
            .iter()
            .position(|n| n == name)
            .map(|g| g as GlyphID)
    }

    /// Which Private DICT applies to a glyph: `None` for the top-level one,
    /// or a Font DICT index.
    pub(crate) fn private_key(&self, gid: usize) -> Option<usize> {
        self.fd_select
            .as_ref()
            .map(|sel| sel.get(gid).copied().unwrap_or(0) as usize)
    }

    pub(crate) fn private_dict(&self, key: Option<usize>) -> Result<&PrivateDict> {
        match key {
            None => Ok(&self.private),
            Some(fd) => self
                .fd_array
                .get(fd)
                .map(|d| &d.private)
                .ok_or_else(|| missing_font_dict(fd)),
        }
    }

    pub(crate) fn private_dict_mut(&mut self, key: Option<usize>) -> Result<&mut PrivateDict> {
        match key {
            None => Ok(&mut self.private),
            Some(fd) => self
                .fd_array
                .get_mut(fd)
                .map(|d| &mut d.private)
                .ok_or_else(|| missing_font_dict(fd)),
        }
    }

    /// Every Private DICT key in use.
    pub(crate) fn private_keys(&self) -> Vec<Option<usize>> {
        if self.is_cid() {
            (0..self.fd_array.len()).map(Some).collect()
        } else {
            vec![None]
        }
    }

    fn subrs<'a>(&'a self, gid: usize, global: &'a [CharString]) -> Result<Subrs<'a>> {
        Ok(Subrs {
            global,
            local: &self.private_dict(self.private_key(gid))?.subrs,
        })
    }

    /// The raw width operand of a glyph, relative to `nominalWidthX`.
    pub fn width_operand(&self, gid: usize, global: &[CharString]) -> Result<Option<f64>> {
        match self.charstrings.get(gid) {
            Some(cs) => charstring::width_operand(cs, self.subrs(gid, global)?),
            None => Ok(None),
        }
    }

    /// The glyphs a glyph's `seac`-style `endchar` pulls in.
    pub fn seac_glyphs(&self, gid: usize, global: &[CharString]) -> Result<Vec<GlyphID>> {
        let cs = match self.charstrings.get(gid) {
            Some(cs) => cs,
            None => return Ok(vec![]),
        };
        Ok(
            match charstring::seac_components(cs, self.subrs(gid, global)?)? {
                Some((base, accent)) => [base, accent]
                    .iter()
                    .filter_map(|&code| standard_encoding_name(code))
                    .filter_map(|name| self.glyph_id(name))
                    .collect(),
                None => vec![],
            },
        )
    }

    /// Drops Font DICTs no retained glyph selects, renumbering FDSelect.
    fn prune_font_dicts(&mut self) {
        let sel = match self.fd_select.as_mut() {
            Some(sel) => sel,
            None => return,
        };
        let used: Vec<u8> = sel.iter().copied().collect::<BTreeSet<u8>>().into_iter().collect();
        for fd in sel.iter_mut() {
            let old = *fd;
            *fd = used.iter().position(|&u| u == old).unwrap_or(0) as u8;
        }
        let old = std::mem::take(&mut self.fd_array);
        self.fd_array = used
            .iter()
            .filter_map(|&i| old.get(i as usize).cloned())
            .collect();
        log::debug!("Keeping font dicts {:?}", used);
    }

    fn clear_hint_values(&mut self) {
        for key in self.private_keys() {
            if let Ok(private) = self.private_dict_mut(key) {
                private.values.retain(|k, _| !k.is_hinting());
            }
        }
    }
}

fn missing_font_dict(fd: usize) -> SubsetError {
    SubsetError::InvariantViolation {
        table: TAG.to_string(),
        msg: format!("FDSelect refers to missing font dict {}", fd),
    }
}

/// A Compact Font Format table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CFF {
    /// The fonts of the FontSet. OpenType fonts carry exactly one.
    pub fonts: Vec<CffFont>,
    /// Global subroutines, shared by every font
    pub global_subrs: Vec<CharString>,
}

impl SubsetTable for CFF {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if self.fonts.len() > 1 {
            log::info!("Keeping only the first of {} CFF fonts", self.fonts.len());
            self.fonts.truncate(1);
        }
        if options.notdef_glyph && !options.notdef_outline {
            let global = &self.global_subrs;
            for font in self.fonts.iter_mut() {
                let gid = match font.glyph_id(".notdef") {
                    Some(gid) => gid as usize,
                    None => continue,
                };
                let width = font.width_operand(gid, global).unwrap_or_else(|e| {
                    log::warn!("Could not read the .notdef width: {}", e);
                    None
                });
                if let Some(cs) = font.charstrings.get_mut(gid) {
                    *cs = CharString::empty(width);
                }
            }
        }
        !self.fonts.is_empty()
    }

    /// Adds the base and accent glyphs of `seac` composites, transitively.
    fn closure_glyphs(&self, ctx: &mut ClosureContext) {
        let font = match self.fonts.first() {
            Some(font) => font,
            None => return,
        };
        let mut decompose: BTreeSet<GlyphID> = ctx.glyphs.clone();
        while !decompose.is_empty() {
            let mut components = BTreeSet::new();
            for &g in &decompose {
                match font.seac_glyphs(g as usize, &self.global_subrs) {
                    Ok(found) => components.extend(found),
                    Err(e) => log::warn!("Glyph {}: {}", g, e),
                }
            }
            components.retain(|g| !ctx.glyphs.contains(g));
            ctx.glyphs.extend(components.iter().copied());
            decompose = components;
        }
    }

    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let old_gids = ctx.glyph_map().old_gids();
        for font in self.fonts.iter_mut() {
            let charstrings = std::mem::take(&mut font.charstrings);
            let charset = std::mem::take(&mut font.charset);
            font.charstrings = old_gids
                .iter()
                .map(|g| {
                    g.and_then(|g| charstrings.get(g as usize))
                        .cloned()
                        .unwrap_or_else(|| CharString::empty(None))
                })
                .collect();
            font.charset = old_gids
                .iter()
                .enumerate()
                .map(|(new, g)| {
                    charset
                        .get(g.map_or(new, |g| g as usize))
                        .cloned()
                        .unwrap_or_else(|| format!("glyph{:05}", new))
                })
                .collect();
            if let Some(sel) = font.fd_select.as_mut() {
                let old = std::mem::take(sel);
                *sel = old_gids
                    .iter()
                    .map(|g| g.and_then(|g| old.get(g as usize)).copied().unwrap_or(0))
                    .collect();
            }
        }
        true
    }

    fn prune_post_subset(&mut self, options: &Options) -> Result<bool> {
        let global = &mut self.global_subrs;
        for font in self.fonts.iter_mut() {
            font.prune_font_dicts();
            if !options.hinting {
                dehint::drop_hints(font, global)?;
                font.clear_hint_values();
            }
            dehint::compact_subroutines(font, global)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::charstring::op;
    use super::*;
    use crate::btreeset;
    use crate::subset::{Checkpoint, GlyphMap};
    use pretty_assertions::assert_eq;

    fn ops(program: &[i32]) -> CharString {
        // Positive numbers are operands, negative ones operators.
        CharString {
            program: program
                .iter()
                .map(|&t| {
                    if t < 0 {
                        Token::Operator(-t as u16)
                    } else {
                        Token::Int(t)
                    }
                })
                .collect(),
        }
    }

    fn font() -> CFF {
        CFF {
            fonts: vec![CffFont {
                name: "Test".to_string(),
                charset: vec![".notdef", "A", "acute", "Aacute", "B"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                charstrings: vec![
                    ops(&[100, 0, 0, -(op::RMOVETO as i32), 50, -(op::HLINETO as i32), -14]),
                    ops(&[10, -(op::HMOVETO as i32), 20, -(op::HLINETO as i32), -14]),
                    ops(&[30, -(op::HMOVETO as i32), 40, -(op::HLINETO as i32), -14]),
                    ops(&[0, 0, 65, 194, -14]),
                    ops(&[5, -(op::HMOVETO as i32), 6, -(op::HLINETO as i32), -14]),
                ],
                private: PrivateDict {
                    default_width_x: 500.0,
                    nominal_width_x: 400.0,
                    values: crate::btreemap!(
                        PrivateOperator::BlueValues => vec![-10.0, 0.0, 700.0, 710.0],
                        PrivateOperator::LanguageGroup => vec![1.0]
                    ),
                    ..Default::default()
                },
                ..Default::default()
            }],
            global_subrs: vec![],
        }
    }

    #[test]
    fn test_notdef_keeps_width() {
        let mut table = font();
        assert!(table.prune_pre_subset(&Options::default()));
        assert_eq!(
            table.fonts[0].charstrings[0],
            CharString::empty(Some(100.0))
        );
    }

    #[test]
    fn test_seac_closure_and_subset() {
        let mut table = font();
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 3));
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(0, 1, 2, 3));
        ctx.checkpoint(Checkpoint::Glyf);
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        assert!(table.subset_glyphs(&ctx));
        assert_eq!(table.fonts[0].charset, vec![".notdef", "A", "acute", "Aacute"]);
        assert_eq!(table.fonts[0].charstrings.len(), 4);
    }

    #[test]
    fn test_dehinting_clears_private_hints() {
        let mut table = font();
        let options = Options {
            hinting: false,
            ..Default::default()
        };
        assert!(table.prune_post_subset(&options).unwrap());
        assert_eq!(
            table.fonts[0].private.values.keys().collect::<Vec<_>>(),
            vec![&PrivateOperator::LanguageGroup]
        );
    }

    #[test]
    fn test_unused_font_dicts_dropped() {
        let mut table = font();
        let cff = &mut table.fonts[0];
        cff.fd_array = vec![
            FontDict {
                font_name: Some("Zero".to_string()),
                ..Default::default()
            },
            FontDict {
                font_name: Some("One".to_string()),
                ..Default::default()
            },
            FontDict {
                font_name: Some("Two".to_string()),
                ..Default::default()
            },
        ];
        cff.fd_select = Some(vec![0, 2, 2, 0, 1]);
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(0, 1));
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        table.subset_glyphs(&ctx);
        assert!(table.prune_post_subset(&Options::default()).unwrap());
        let cff = &table.fonts[0];
        assert_eq!(cff.fd_select, Some(vec![0, 1]));
        assert_eq!(
            cff.fd_array
                .iter()
                .map(|fd| fd.font_name.clone().unwrap_or_default())
                .collect::<Vec<_>>(),
            vec!["Zero", "Two"]
        );
    }
}
