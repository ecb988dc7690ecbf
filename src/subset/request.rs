//! Turning command-line style tokens into a glyph request.
use crate::error::{Result, SubsetError};
use crate::font::Font;

/// What the caller asked to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Glyph names.
    pub glyphs: Vec<String>,
    /// Unicode codepoints.
    pub unicodes: Vec<u32>,
    /// Text whose characters are mapped through `cmap`.
    pub text: String,
}

impl Request {
    /// Parses request tokens against a font.
    ///
    /// A token is, in order of precedence: `*` for every glyph, the name
    /// of a glyph in the font, `--text=` followed by literal text,
    /// `uniXXXX` or `U+XXXX` for a hex codepoint, or `gidN` or `glyphN`
    /// for a glyph index.
    pub fn parse<S: AsRef<str>>(font: &Font, tokens: &[S]) -> Result<Request> {
        let mut request = Request::default();
        for token in tokens {
            let token = token.as_ref();
            if token == "*" {
                request.glyphs.extend(font.glyph_order().iter().cloned());
            } else if font.glyph_id(token).is_some() {
                request.glyphs.push(token.to_string());
            } else if let Some(text) = token.strip_prefix("--text=") {
                request.text.push_str(text);
            } else if let Some(hex) = token
                .strip_prefix("uni")
                .or_else(|| token.strip_prefix("U+"))
            {
                let codepoint = u32::from_str_radix(hex, 16)
                    .map_err(|_| SubsetError::InvalidGlyphToken(token.to_string()))?;
                request.unicodes.push(codepoint);
            } else if let Some(index) = token
                .strip_prefix("gid")
                .or_else(|| token.strip_prefix("glyph"))
            {
                let name = index
                    .parse::<u16>()
                    .ok()
                    .and_then(|gid| font.glyph_name(gid))
                    .ok_or_else(|| SubsetError::InvalidGlyphToken(token.to_string()))?;
                request.glyphs.push(name.to_string());
            } else {
                return Err(SubsetError::InvalidGlyphToken(token.to_string()));
            }
        }
        log::debug!("Unicodes: {:04X?}", request.unicodes);
        log::debug!("Glyphs: {:?}", request.glyphs);
        Ok(request)
    }

    /// Every requested codepoint, from both `unicodes` and `text`.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.unicodes
            .iter()
            .copied()
            .chain(self.text.chars().map(|c| c as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::SfntVersion;
    use pretty_assertions::assert_eq;

    fn font() -> Font {
        let mut font = Font::new(SfntVersion::TrueType);
        font.set_glyph_order(
            [".notdef", "A", "B", "uni0410"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        font
    }

    #[test]
    fn test_parse_tokens() {
        let request = Request::parse(
            &font(),
            &["B", "uni0041", "U+1F600", "gid1", "glyph3", "--text=hé", "uni0410"],
        )
        .unwrap();
        assert_eq!(request.glyphs, vec!["B", "A", "uni0410", "uni0410"]);
        assert_eq!(request.unicodes, vec![0x41, 0x1F600]);
        assert_eq!(
            request.codepoints().collect::<Vec<_>>(),
            vec![0x41, 0x1F600, 0x68, 0xE9]
        );
    }

    #[test]
    fn test_star_takes_everything() {
        let request = Request::parse(&font(), &["*"]).unwrap();
        assert_eq!(request.glyphs.len(), 4);
    }

    #[test]
    fn test_invalid_tokens() {
        for token in &["C", "unizz", "gid9", "glyphx"] {
            assert_eq!(
                Request::parse(&font(), &[token]),
                Err(SubsetError::InvalidGlyphToken(token.to_string()))
            );
        }
    }
}
