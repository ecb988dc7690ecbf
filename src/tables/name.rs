use crate::subset::{ClosureContext, Options, SubsetTable};
use crate::types::*;

/// The 'name' OpenType tag.
pub const TAG: Tag = crate::tag!("name");

/// A single name record
#[allow(non_snake_case)]
#[derive(Debug, PartialEq, Clone)]
pub struct NameRecord {
    /// Platform ID (0=Unicode, 1=Macintosh, 3=Windows)
    pub platformID: uint16,
    /// Identifier for encoding of string content. Platform-specific.
    pub encodingID: uint16,
    /// Identifier for language of string content. Platform-specific.
    pub languageID: uint16,
    /// The numeric identifier representing the type of data.
    pub nameID: uint16,
    /// The actual content
    pub string: String,
}

impl NameRecord {
    /// Create a new name record for the Windows platform in Unicode encoding
    /// (3,1,0x409)
    pub fn windows_unicode<T, U>(n: T, s: U) -> NameRecord
    where
        T: Into<u16>,
        U: Into<String>,
    {
        NameRecord {
            platformID: 3,
            encodingID: 1,
            languageID: 0x409,
            nameID: n.into(),
            string: s.into(),
        }
    }

    /// Returns true if the record is stored in a Unicode encoding.
    pub fn is_unicode(&self) -> bool {
        self.platformID == 0
            || (self.platformID == 3 && [0, 1, 10].contains(&self.encodingID))
    }
}

/// Represents a font's name (Naming) table
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct name {
    /// The name records
    pub records: Vec<NameRecord>,
}

impl name {
    /// Returns the first Windows Unicode string for a given name ID
    pub fn get(&self, name_id: uint16) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.nameID == name_id && r.is_unicode())
            .map(|r| r.string.as_str())
    }
}

impl SubsetTable for name {
    fn prune_pre_subset(&mut self, options: &Options) -> bool {
        self.records.retain(|r| {
            options.name_ids.contains(&r.nameID)
                && (options.name_legacy || r.is_unicode())
                && options.name_languages.contains(&r.languageID)
        });
        // Required table
        true
    }

    /// Names do not refer to glyphs.
    fn subset_glyphs(&mut self, _ctx: &ClosureContext) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subset::Selection;
    use pretty_assertions::assert_eq;

    fn table() -> name {
        name {
            records: vec![
                NameRecord::windows_unicode(1u16, "Test Sans"),
                NameRecord::windows_unicode(2u16, "Regular"),
                NameRecord::windows_unicode(5u16, "Version 1.000"),
                NameRecord {
                    platformID: 1,
                    encodingID: 0,
                    languageID: 0,
                    nameID: 1,
                    string: "Test Sans".to_string(),
                },
                NameRecord {
                    languageID: 0x0407,
                    ..NameRecord::windows_unicode(2u16, "Standard")
                },
            ],
        }
    }

    #[test]
    fn test_name_default_pruning() {
        let mut table = table();
        assert!(table.prune_pre_subset(&Options::default()));
        assert_eq!(
            table.records,
            vec![
                NameRecord::windows_unicode(1u16, "Test Sans"),
                NameRecord::windows_unicode(2u16, "Regular"),
            ]
        );
    }

    #[test]
    fn test_name_keep_everything() {
        let mut table = table();
        let options = Options {
            name_ids: Selection::All,
            name_legacy: true,
            name_languages: Selection::All,
            ..Default::default()
        };
        table.prune_pre_subset(&options);
        assert_eq!(table.records.len(), 5);
        assert_eq!(table.get(5), Some("Version 1.000"));
    }
}
