//! Subsetter configuration.
use crate::error::{Result, SubsetError};
use crate::tag;
use crate::types::*;
use itertools::Itertools;

/// Tables dropped unless asked for.
pub const DROP_TABLES_DEFAULT: [Tag; 19] = [
    tag!("BASE"),
    tag!("JSTF"),
    tag!("DSIG"),
    tag!("EBDT"),
    tag!("EBLC"),
    tag!("EBSC"),
    tag!("SVG "),
    tag!("PCLT"),
    tag!("LTSH"),
    // Graphite
    tag!("Feat"),
    tag!("Glat"),
    tag!("Gloc"),
    tag!("Silf"),
    tag!("Sill"),
    // Color
    tag!("CBLC"),
    tag!("CBDT"),
    tag!("sbix"),
    tag!("COLR"),
    tag!("CPAL"),
];

/// Tables which are carried over untouched.
pub const NO_SUBSET_TABLES_DEFAULT: [Tag; 11] = [
    tag!("gasp"),
    tag!("head"),
    tag!("hhea"),
    tag!("maxp"),
    tag!("vhea"),
    tag!("OS/2"),
    tag!("loca"),
    tag!("name"),
    tag!("cvt "),
    tag!("fpgm"),
    tag!("prep"),
];

/// Tables which only carry hinting, dropped along with hints.
pub const HINTING_TABLES_DEFAULT: [Tag; 5] = [
    tag!("cvt "),
    tag!("fpgm"),
    tag!("prep"),
    tag!("hdmx"),
    tag!("VDMX"),
];

/// Layout features kept by default, grouped by the shaper which uses them.
pub const LAYOUT_FEATURES_GROUPS: [(&str, &[&str]); 9] = [
    ("common", &["ccmp", "liga", "locl", "mark", "mkmk", "rlig"]),
    ("horizontal", &["calt", "clig", "curs", "kern", "rclt"]),
    ("vertical", &["valt", "vert", "vkrn", "vpal", "vrt2"]),
    ("ltr", &["ltra", "ltrm"]),
    ("rtl", &["rtla", "rtlm"]),
    (
        "arabic",
        &[
            "init", "medi", "fina", "isol", "med2", "fin2", "fin3", "cswh", "mset",
        ],
    ),
    ("hangul", &["ljmo", "vjmo", "tjmo"]),
    ("tibetan", &["abvs", "blws", "abvm", "blwm"]),
    (
        "indic",
        &[
            "nukt", "akhn", "rphf", "rkrf", "pref", "blwf", "half", "abvf", "pstf", "cfar", "vatu",
            "cjct", "init", "pres", "abvs", "blws", "psts", "haln", "dist", "abvm", "blwm",
        ],
    ),
];

/// Either every item, or an explicit list.
///
/// On the command line `*` anywhere in a list selects everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    pub fn contains(&self, item: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => items.contains(item),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    fn add(&mut self, more: Selection<T>) {
        match (self, more) {
            (Selection::All, _) => {}
            (this, Selection::All) => *this = Selection::All,
            (Selection::Only(items), Selection::Only(more)) => {
                for item in more {
                    if !items.contains(&item) {
                        items.push(item)
                    }
                }
            }
        }
    }

    fn remove(&mut self, less: Selection<T>) {
        match (self, less) {
            (this, Selection::All) => *this = Selection::Only(vec![]),
            (Selection::All, Selection::Only(_)) => {
                log::warn!("Cannot remove items from a '*' selection; ignoring");
            }
            (Selection::Only(items), Selection::Only(less)) => {
                items.retain(|i| !less.contains(i));
            }
        }
    }
}

/// The container flavor the caller should write the result as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Raw,
    Woff,
    Woff2,
}

/// Options controlling what the subsetter keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Tables to drop outright.
    pub drop_tables: Vec<Tag>,
    /// Tables to keep without subsetting.
    pub no_subset_tables: Vec<Tag>,
    /// Tables to drop when hinting is not kept.
    pub hinting_tables: Vec<Tag>,
    /// Layout features to keep.
    pub layout_features: Selection<Tag>,
    /// Keep TrueType instructions and CFF hints.
    pub hinting: bool,
    /// Keep PostScript glyph names.
    pub glyph_names: bool,
    /// Keep non-Unicode cmap subtables.
    pub legacy_cmap: bool,
    /// Keep symbol cmap subtables.
    pub symbol_cmap: bool,
    /// Name IDs to keep in the `name` table. Family and Style by default.
    pub name_ids: Selection<uint16>,
    /// Keep non-Unicode name records.
    pub name_legacy: bool,
    /// Language IDs to keep in the `name` table. English by default.
    pub name_languages: Selection<uint16>,
    /// Keep gid0 for TrueType, `.notdef` for CFF.
    pub notdef_glyph: bool,
    /// Keep the outline of the notdef glyph.
    pub notdef_outline: bool,
    /// Keep gid1, gid2 and gid3 for TrueType.
    pub recommended_glyphs: bool,
    /// Keep original glyph IDs, leaving empty glyphs in the gaps.
    pub retain_gids: bool,
    /// Skip, rather than fail on, requested glyphs missing from the font.
    pub ignore_missing_glyphs: bool,
    /// Skip, rather than fail on, requested codepoints the font does not map.
    pub ignore_missing_unicodes: bool,
    /// Recalculate font bounding boxes.
    pub recalc_bounds: bool,
    /// Recalculate the font modified timestamp.
    pub recalc_timestamp: bool,
    /// Order tables as recommended when writing.
    pub canonical_order: bool,
    pub flavor: Flavor,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            drop_tables: DROP_TABLES_DEFAULT.to_vec(),
            no_subset_tables: NO_SUBSET_TABLES_DEFAULT.to_vec(),
            hinting_tables: HINTING_TABLES_DEFAULT.to_vec(),
            layout_features: Selection::Only(default_layout_features()),
            hinting: true,
            glyph_names: false,
            legacy_cmap: false,
            symbol_cmap: false,
            name_ids: Selection::Only(vec![1, 2]),
            name_legacy: false,
            name_languages: Selection::Only(vec![0x0409]),
            notdef_glyph: true,
            notdef_outline: false,
            recommended_glyphs: false,
            retain_gids: false,
            ignore_missing_glyphs: false,
            ignore_missing_unicodes: false,
            recalc_bounds: false,
            recalc_timestamp: false,
            canonical_order: false,
            flavor: Flavor::Raw,
        }
    }
}

/// The union of all shaper feature groups, sorted.
pub fn default_layout_features() -> Vec<Tag> {
    LAYOUT_FEATURES_GROUPS
        .iter()
        .flat_map(|(_, features)| features.iter())
        .map(|f| Tag::new(f))
        .sorted()
        .dedup()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListOp {
    Set,
    Add,
    Remove,
}

enum OptionValue {
    Flag(bool),
    Text(ListOp, String),
}

fn parse_bool(option: &str, value: &OptionValue) -> Result<bool> {
    match value {
        OptionValue::Flag(b) => Ok(*b),
        OptionValue::Text(ListOp::Set, v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "" | "0" | "false" | "no" => Ok(false),
            _ => Err(invalid(option, v)),
        },
        OptionValue::Text(_, v) => Err(invalid(option, v)),
    }
}

fn invalid(option: &str, value: &str) -> SubsetError {
    SubsetError::InvalidOptionValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn parse_int(option: &str, s: &str) -> Result<uint16> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        uint16::from_str_radix(hex, 16)
    } else {
        s.parse::<uint16>()
    };
    parsed.map_err(|_| invalid(option, s))
}

fn parse_selection<T>(
    option: &str,
    value: &str,
    item: impl Fn(&str, &str) -> Result<T>,
) -> Result<Selection<T>> {
    let items: Vec<&str> = value.split(',').filter(|s| !s.is_empty()).collect();
    if items.contains(&"*") {
        return Ok(Selection::All);
    }
    Ok(Selection::Only(
        items
            .into_iter()
            .map(|s| item(option, s))
            .collect::<Result<Vec<T>>>()?,
    ))
}

fn apply_selection<T: PartialEq>(
    target: &mut Selection<T>,
    option: &str,
    value: &OptionValue,
    item: impl Fn(&str, &str) -> Result<T>,
) -> Result<()> {
    match value {
        OptionValue::Flag(_) => Err(invalid(option, "")),
        OptionValue::Text(op, v) => {
            let parsed = parse_selection(option, v, item)?;
            match op {
                ListOp::Set => *target = parsed,
                ListOp::Add => target.add(parsed),
                ListOp::Remove => target.remove(parsed),
            }
            Ok(())
        }
    }
}

fn apply_tags(target: &mut Vec<Tag>, option: &str, value: &OptionValue) -> Result<()> {
    let mut selection = Selection::Only(std::mem::take(target));
    let result = apply_selection(&mut selection, option, value, |_, s| Tag::parse(s));
    *target = match selection {
        Selection::Only(tags) => tags,
        Selection::All => return Err(invalid(option, "*")),
    };
    result
}

impl Options {
    /// Parse `--option` style arguments into this set of options.
    ///
    /// Accepts `--opt`, `--no-opt`, `--opt=value`, `--opt+=value` and
    /// `--opt-=value`; dashes in option names are read as underscores.
    /// Arguments which do not start with `--`, and options named in
    /// `pass_through`, are returned untouched for the caller to handle.
    pub fn parse_opts<S: AsRef<str>>(
        &mut self,
        argv: &[S],
        pass_through: &[&str],
    ) -> Result<Vec<String>> {
        let mut rest = vec![];
        for arg in argv {
            let arg = arg.as_ref();
            let body = match arg.strip_prefix("--") {
                Some(body) => body,
                None => {
                    rest.push(arg.to_string());
                    continue;
                }
            };
            let (key, value) = match body.find('=') {
                None => match body.strip_prefix("no-") {
                    Some(k) => (k.to_string(), OptionValue::Flag(false)),
                    None => (body.to_string(), OptionValue::Flag(true)),
                },
                Some(i) => {
                    let (mut k, v) = (&body[..i], body[i + 1..].to_string());
                    let op = if let Some(stripped) = k.strip_suffix('+') {
                        k = stripped;
                        ListOp::Add
                    } else if let Some(stripped) = k.strip_suffix('-') {
                        k = stripped;
                        ListOp::Remove
                    } else {
                        ListOp::Set
                    };
                    (k.to_string(), OptionValue::Text(op, v))
                }
            };
            let key = key.replace('-', "_");
            if pass_through.contains(&key.as_str()) {
                rest.push(arg.to_string());
                continue;
            }
            self.set(&key, &value)?;
        }
        Ok(rest)
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<()> {
        match key {
            "drop_tables" => apply_tags(&mut self.drop_tables, key, value)?,
            "no_subset_tables" => apply_tags(&mut self.no_subset_tables, key, value)?,
            "hinting_tables" => apply_tags(&mut self.hinting_tables, key, value)?,
            "layout_features" => {
                apply_selection(&mut self.layout_features, key, value, |_, s| Tag::parse(s))?
            }
            "name_IDs" | "name_ids" => apply_selection(&mut self.name_ids, key, value, parse_int)?,
            "name_languages" => apply_selection(&mut self.name_languages, key, value, parse_int)?,
            "hinting" => self.hinting = parse_bool(key, value)?,
            "glyph_names" => self.glyph_names = parse_bool(key, value)?,
            "legacy_cmap" => self.legacy_cmap = parse_bool(key, value)?,
            "symbol_cmap" => self.symbol_cmap = parse_bool(key, value)?,
            "name_legacy" => self.name_legacy = parse_bool(key, value)?,
            "notdef_glyph" => self.notdef_glyph = parse_bool(key, value)?,
            "notdef_outline" => self.notdef_outline = parse_bool(key, value)?,
            "recommended_glyphs" => self.recommended_glyphs = parse_bool(key, value)?,
            "retain_gids" => self.retain_gids = parse_bool(key, value)?,
            "ignore_missing_glyphs" => self.ignore_missing_glyphs = parse_bool(key, value)?,
            "ignore_missing_unicodes" => self.ignore_missing_unicodes = parse_bool(key, value)?,
            "recalc_bounds" => self.recalc_bounds = parse_bool(key, value)?,
            "recalc_timestamp" => self.recalc_timestamp = parse_bool(key, value)?,
            "canonical_order" => self.canonical_order = parse_bool(key, value)?,
            "flavor" => {
                self.flavor = match value {
                    OptionValue::Flag(false) => Flavor::Raw,
                    OptionValue::Text(ListOp::Set, v) => match v.as_str() {
                        "" | "none" | "raw" => Flavor::Raw,
                        "woff" => Flavor::Woff,
                        "woff2" => Flavor::Woff2,
                        _ => return Err(invalid(key, v)),
                    },
                    _ => return Err(invalid(key, "")),
                }
            }
            _ => return Err(SubsetError::UnknownOption(key.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.hinting);
        assert!(options.drop_tables.contains(&tag!("DSIG")));
        assert!(options.layout_features.contains(&tag!("liga")));
        assert!(!options.layout_features.contains(&tag!("smcp")));
        assert!(options.name_ids.contains(&1));
        let features = default_layout_features();
        assert_eq!(features.iter().filter(|t| **t == tag!("init")).count(), 1);
    }

    #[test]
    fn test_parse_opts() {
        let mut options = Options::default();
        let rest = options
            .parse_opts(
                &[
                    "font.ttf",
                    "--no-hinting",
                    "--layout-features=liga,kern",
                    "--layout-features+=smcp",
                    "--layout-features-=kern",
                    "--name-IDs=*",
                    "--name-languages=0x0409,1033",
                    "--drop-tables+=cvt",
                    "--flavor=woff2",
                    "--text=abc",
                    "uni0041",
                ],
                &["text"],
            )
            .unwrap();
        assert_eq!(rest, vec!["font.ttf", "--text=abc", "uni0041"]);
        assert!(!options.hinting);
        assert_eq!(
            options.layout_features,
            Selection::Only(vec![tag!("liga"), tag!("smcp")])
        );
        assert_eq!(options.name_ids, Selection::All);
        assert_eq!(options.name_languages, Selection::Only(vec![0x0409, 1033]));
        assert!(options.drop_tables.contains(&tag!("cvt ")));
        assert_eq!(options.flavor, Flavor::Woff2);
    }

    #[test]
    fn test_parse_opts_errors() {
        let mut options = Options::default();
        assert_eq!(
            options.parse_opts(&["--frobnicate"], &[]),
            Err(SubsetError::UnknownOption("frobnicate".to_string()))
        );
        assert!(options.parse_opts(&["--hinting+=1"], &[]).is_err());
        assert!(options.parse_opts(&["--name-IDs=banana"], &[]).is_err());
        assert!(options.parse_opts(&["--flavor=zip"], &[]).is_err());
    }

    #[test]
    fn test_all_features() {
        let mut options = Options::default();
        options.parse_opts(&["--layout-features=*"], &[]).unwrap();
        assert!(options.layout_features.contains(&tag!("smcp")));
        options.parse_opts(&["--layout-features="], &[]).unwrap();
        assert_eq!(options.layout_features, Selection::Only(vec![]));
    }
}
