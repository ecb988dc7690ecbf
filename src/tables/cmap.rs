use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;
use std::collections::BTreeMap;

/// The 'cmap' OpenType tag.
pub const TAG: Tag = crate::tag!("cmap");

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(non_snake_case)]
/// A cmap subtable.
///
/// A cmap table can contain multiple mappings of characters
/// to glyphs, both because of differences in mapping based on platform,
/// encoding and language, but also because the mapping may best be expressed
/// by splitting it up into subtables in different formats. This struct
/// represents a mapping in a given format at a relatively high, format-independent
/// level.
pub struct CmapSubtable {
    /// The binary format of this subtable. Generally speaking, you
    /// want format 4 or 6 for mappings within the BMP, 12 for higher Unicode
    /// planes, and 14 for Unicode Variation Sequences.
    pub format: uint16,
    /// The platform ID: Unicode = 0, Macintosh = 1, Windows = 3.
    pub platformID: uint16,
    /// The encoding ID; interpretation varies dependent on platform.
    pub encodingID: uint16,
    /// The language ID; interpretation varies dependent on platform and encoding.
    pub languageID: uint16,
    /// A mapping between Unicode codepoints and glyph IDs.
    pub mapping: BTreeMap<uint32, uint16>,
    /// A mapping of Unicode codepoints + variation selectors to glyph IDs.
    /// `None` marks a default variation sequence, which uses the glyph of
    /// the codepoint's ordinary mapping.
    pub uvs_mapping: Option<BTreeMap<(uint32, uint32), Option<uint16>>>,
}

impl CmapSubtable {
    /// Returns true if this subtable contains a mapping targetted at the
    /// Unicode platform or a Unicode encoding of the Windows platform.
    pub fn is_unicode(&self) -> bool {
        self.platformID == 0
            || (self.platformID == 3
                && (self.encodingID == 0 || self.encodingID == 1 || self.encodingID == 10))
    }
    /// Returns true if this subtable contains a mapping targetted at the
    /// Windows Symbol encoding.
    pub fn is_symbol(&self) -> bool {
        self.platformID == 3 && self.encodingID == 0
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[allow(non_camel_case_types)]
/// cmap table. The cmap table is a collection of subtables, as described above.
pub struct cmap {
    /// The list of subtables
    pub subtables: Vec<CmapSubtable>,
}

impl cmap {
    /// Tries to find a mapping targetted at the the given platform and
    /// encoding. Returns a `Some<map>` if one is found, or `None` otherwise.
    pub fn get_mapping(
        &self,
        platform_id: u16,
        encoding_id: u16,
    ) -> Option<&BTreeMap<uint32, uint16>> {
        self.subtables
            .iter()
            .find(|st| st.platformID == platform_id && st.encodingID == encoding_id)
            .map(|st| &st.mapping)
    }

    /// The glyph a codepoint maps to in any Unicode subtable.
    pub fn map_unicode(&self, codepoint: uint32) -> Option<GlyphID> {
        self.subtables
            .iter()
            .filter(|st| st.is_unicode())
            .find_map(|st| st.mapping.get(&codepoint).copied())
    }
}

impl SubsetTable for cmap {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        if !options.legacy_cmap {
            // Drop non-Unicode / non-Symbol cmaps
            self.subtables.retain(|st| st.is_unicode() || st.is_symbol());
        }
        if !options.symbol_cmap {
            self.subtables.retain(|st| !st.is_symbol());
        }
        // Byte encoding tables cannot describe a reduced glyph set usefully
        self.subtables.retain(|st| st.format != 0);
        true
    }

    fn closure_glyphs(&self, ctx: &mut ClosureContext) {
        let unicode_tables = self.subtables.iter().filter(|st| st.is_unicode());
        let requested = &ctx.unicodes_requested;
        for st in unicode_tables.clone() {
            match &st.uvs_mapping {
                Some(uvs) if st.format == 14 => {
                    ctx.glyphs.extend(
                        uvs.iter()
                            .filter(|((u, _), _)| requested.contains(u))
                            .filter_map(|(_, g)| *g),
                    );
                }
                _ => {
                    ctx.glyphs.extend(
                        requested
                            .iter()
                            .filter_map(|u| st.mapping.get(u).copied()),
                    );
                }
            }
        }
        let mut missing = requested.clone();
        for st in unicode_tables {
            missing.retain(|u| !st.mapping.contains_key(u));
        }
        ctx.unicodes_missing = missing;
    }

    /// Keeps mappings for what was asked for, ignoring glyphs which only
    /// arrived through the closure.
    fn subset_glyphs(&mut self, ctx: &ClosureContext) -> bool {
        let map = ctx.glyph_map();
        let wanted = |u: &uint32, g: &uint16| {
            ctx.glyphs_requested.contains(g) || ctx.unicodes_requested.contains(u)
        };
        // Bare BMP-only format 12 subtables duplicating a format 4 one are
        // dropped afterwards, keyed by (platform, encoding, language).
        let mut bmp_tables: BTreeMap<(uint16, uint16, uint16), BTreeMap<uint32, uint16>> =
            BTreeMap::new();
        for st in self.subtables.iter_mut() {
            if st.format == 14 {
                if let Some(uvs) = st.uvs_mapping.as_mut() {
                    *uvs = std::mem::take(uvs)
                        .into_iter()
                        .filter(|((u, _), g)| {
                            ctx.unicodes_requested.contains(u)
                                || g.map_or(false, |g| ctx.glyphs_requested.contains(&g))
                        })
                        .filter_map(|(k, g)| match g {
                            Some(g) => map.get(g).map(|new| (k, Some(new))),
                            None => Some((k, None)),
                        })
                        .collect();
                }
                continue;
            }
            let unicode = st.is_unicode();
            st.mapping = std::mem::take(&mut st.mapping)
                .into_iter()
                .filter(|(u, g)| {
                    if unicode {
                        wanted(u, g)
                    } else {
                        ctx.glyphs_requested.contains(g)
                    }
                })
                .filter_map(|(u, g)| map.get(g).map(|new| (u, new)))
                .collect();
            if (st.platformID, st.encodingID) == (0, 3) || (st.platformID, st.encodingID) == (3, 1)
            {
                bmp_tables.insert(
                    (st.platformID, st.encodingID, st.languageID),
                    st.mapping.clone(),
                );
            }
        }
        self.subtables.retain(|st| {
            if st.format == 14 {
                return st.uvs_mapping.as_ref().map_or(false, |m| !m.is_empty());
            }
            if st.format == 12
                && !st.mapping.is_empty()
                && st.mapping.keys().all(|&u| u < 0x10000)
            {
                let bmp_key = match (st.platformID, st.encodingID) {
                    (0, 4) => Some((0, 3, st.languageID)),
                    (3, 10) => Some((3, 1, st.languageID)),
                    _ => None,
                };
                if let Some(key) = bmp_key {
                    if bmp_tables.get(&key) == Some(&st.mapping) {
                        log::debug!(
                            "Dropping redundant format 12 cmap ({}, {})",
                            st.platformID,
                            st.encodingID
                        );
                        return false;
                    }
                }
            }
            !st.mapping.is_empty()
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::{Checkpoint, GlyphMap};
    use crate::{btreemap, btreeset};
    use pretty_assertions::assert_eq;

    fn subtable(format: uint16, platform: uint16, encoding: uint16) -> CmapSubtable {
        CmapSubtable {
            format,
            platformID: platform,
            encodingID: encoding,
            languageID: 0,
            mapping: btreemap!(0x41 => 1, 0x42 => 2, 0x43 => 3),
            uvs_mapping: None,
        }
    }

    fn font_cmap() -> cmap {
        cmap {
            subtables: vec![
                subtable(4, 0, 3),
                subtable(0, 1, 0),
                subtable(4, 3, 1),
                subtable(12, 3, 10),
                CmapSubtable {
                    format: 14,
                    platformID: 0,
                    encodingID: 5,
                    languageID: 0,
                    mapping: BTreeMap::new(),
                    uvs_mapping: Some(btreemap!(
                        (0x41, 0xFE00) => Some(4),
                        (0x43, 0xFE00) => None
                    )),
                },
            ],
        }
    }

    #[test]
    fn test_cmap_prune_pre_subset() {
        let mut table = font_cmap();
        assert!(table.prune_pre_subset(&Options::default()));
        assert_eq!(table.subtables.len(), 4);
        assert!(table.subtables.iter().all(|st| st.platformID != 1));
    }

    #[test]
    fn test_cmap_closure() {
        let table = font_cmap();
        let mut ctx = ClosureContext::new(btreeset!(0x41, 0x44), btreeset!());
        table.closure_glyphs(&mut ctx);
        assert_eq!(ctx.glyphs, btreeset!(1, 4));
        assert_eq!(ctx.unicodes_missing, btreeset!(0x44));
    }

    #[test]
    fn test_cmap_subset() {
        let mut table = font_cmap();
        table.prune_pre_subset(&Options::default());
        // A legacy subtable mapping nothing requested
        table.subtables.push(CmapSubtable {
            format: 6,
            platformID: 1,
            encodingID: 0,
            languageID: 0,
            mapping: btreemap!(0x5A => 5),
            uvs_mapping: None,
        });
        let mut ctx = ClosureContext::new(btreeset!(0x41), btreeset!(3));
        table.closure_glyphs(&mut ctx);
        ctx.glyphs.insert(0);
        ctx.checkpoint(Checkpoint::Cmap);
        ctx.set_glyph_map(GlyphMap::compact(&ctx.glyphs));
        assert!(table.subset_glyphs(&ctx));
        // glyphs 0, 1, 3, 4 become 0, 1, 2, 3
        assert_eq!(table.subtables[0].mapping, btreemap!(0x41 => 1, 0x43 => 2));
        // The format 12 subtable only repeats the BMP table, and the
        // emptied legacy subtable is gone
        assert_eq!(table.subtables.len(), 3);
        assert!(table.subtables.iter().all(|st| st.platformID != 1));
        assert_eq!(
            table.subtables[2].uvs_mapping,
            Some(btreemap!((0x41, 0xFE00) => Some(3)))
        );
    }
}
