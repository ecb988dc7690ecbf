use crate::subset::SubsetTable;
use crate::tables;
use crate::types::Tag;
use std::collections::BTreeMap;

/// A decoded OpenType table.
///
/// Tables the subsetter understands are held in their typed form; anything
/// else is carried as the raw bytes the container codec handed us.
#[derive(Debug, Clone, PartialEq)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum Table {
    cmap(tables::cmap::cmap),
    GSUB(tables::GSUB::GSUB),
    GPOS(tables::GPOS::GPOS),
    GDEF(tables::GDEF::GDEF),
    glyf(tables::glyf::glyf),
    CFF(tables::CFF::CFF),
    hmtx(tables::hmtx::hmtx),
    vmtx(tables::hmtx::vmtx),
    hdmx(tables::hdmx::hdmx),
    kern(tables::kern::kern),
    post(tables::post::post),
    name(tables::name::name),
    VORG(tables::VORG::VORG),
    maxp(tables::maxp::maxp),
    head(tables::head::head),
    COLR(tables::COLR::COLR),
    Unknown(Vec<u8>),
}

impl Table {
    /// The subsetting hooks of this table, or `None` if it has none.
    pub fn as_subset(&self) -> Option<&dyn SubsetTable> {
        Some(match self {
            Table::cmap(t) => t,
            Table::GSUB(t) => t,
            Table::GPOS(t) => t,
            Table::GDEF(t) => t,
            Table::glyf(t) => t,
            Table::CFF(t) => t,
            Table::hmtx(t) => t,
            Table::vmtx(t) => t,
            Table::hdmx(t) => t,
            Table::kern(t) => t,
            Table::post(t) => t,
            Table::name(t) => t,
            Table::VORG(t) => t,
            Table::maxp(t) => t,
            Table::COLR(t) => t,
            Table::head(_) | Table::Unknown(_) => return None,
        })
    }

    /// Mutable access to the subsetting hooks of this table.
    pub fn as_subset_mut(&mut self) -> Option<&mut dyn SubsetTable> {
        Some(match self {
            Table::cmap(t) => t,
            Table::GSUB(t) => t,
            Table::GPOS(t) => t,
            Table::GDEF(t) => t,
            Table::glyf(t) => t,
            Table::CFF(t) => t,
            Table::hmtx(t) => t,
            Table::vmtx(t) => t,
            Table::hdmx(t) => t,
            Table::kern(t) => t,
            Table::post(t) => t,
            Table::name(t) => t,
            Table::VORG(t) => t,
            Table::maxp(t) => t,
            Table::COLR(t) => t,
            Table::head(_) | Table::Unknown(_) => return None,
        })
    }
}

/// The set of tables in a font, keyed by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    tables: BTreeMap<Tag, Table>,
}

impl TableSet {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns `true` if the provided tag is a table in this `TableSet`.
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// The tags of every table, in tag order.
    pub fn keys(&self) -> Vec<Tag> {
        self.tables.keys().copied().collect()
    }

    pub fn get(&self, tag: Tag) -> Option<&Table> {
        self.tables.get(&tag)
    }

    pub fn get_mut(&mut self, tag: Tag) -> Option<&mut Table> {
        self.tables.get_mut(&tag)
    }

    /// Adds a table, replacing any table with the same tag.
    pub fn insert(&mut self, tag: Tag, table: Table) {
        self.tables.insert(tag, table);
    }

    /// Adds a table the subsetter does not decode.
    pub fn insert_raw(&mut self, tag: Tag, data: Vec<u8>) {
        self.insert(tag, Table::Unknown(data));
    }

    pub fn remove(&mut self, tag: Tag) -> Option<Table> {
        self.tables.remove(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &Table)> {
        self.tables.iter()
    }
}

macro_rules! table_boilerplate {
    ($table:ty, $enum:ident, $enum_mut:ident, $tag:expr) => {
        impl From<$table> for Table {
            fn from(src: $table) -> Table {
                Table::$enum(src)
            }
        }

        impl TableSet {
            /// Get this table, if it exists.
            #[allow(non_snake_case)]
            pub fn $enum(&self) -> Option<&$table> {
                match self.tables.get(&$tag) {
                    Some(Table::$enum(t)) => Some(t),
                    _ => None,
                }
            }

            /// Get this table mutably, if it exists.
            #[allow(non_snake_case)]
            pub fn $enum_mut(&mut self) -> Option<&mut $table> {
                match self.tables.get_mut(&$tag) {
                    Some(Table::$enum(t)) => Some(t),
                    _ => None,
                }
            }
        }
    };
}

table_boilerplate!(tables::cmap::cmap, cmap, cmap_mut, tables::cmap::TAG);
table_boilerplate!(tables::GSUB::GSUB, GSUB, GSUB_mut, tables::GSUB::TAG);
table_boilerplate!(tables::GPOS::GPOS, GPOS, GPOS_mut, tables::GPOS::TAG);
table_boilerplate!(tables::GDEF::GDEF, GDEF, GDEF_mut, tables::GDEF::TAG);
table_boilerplate!(tables::glyf::glyf, glyf, glyf_mut, tables::glyf::TAG);
table_boilerplate!(tables::CFF::CFF, CFF, CFF_mut, tables::CFF::TAG);
table_boilerplate!(tables::hmtx::hmtx, hmtx, hmtx_mut, tables::hmtx::TAG);
table_boilerplate!(tables::hmtx::vmtx, vmtx, vmtx_mut, tables::hmtx::VMTX_TAG);
table_boilerplate!(tables::hdmx::hdmx, hdmx, hdmx_mut, tables::hdmx::TAG);
table_boilerplate!(tables::kern::kern, kern, kern_mut, tables::kern::TAG);
table_boilerplate!(tables::post::post, post, post_mut, tables::post::TAG);
table_boilerplate!(tables::name::name, name, name_mut, tables::name::TAG);
table_boilerplate!(tables::VORG::VORG, VORG, VORG_mut, tables::VORG::TAG);
table_boilerplate!(tables::maxp::maxp, maxp, maxp_mut, tables::maxp::TAG);
table_boilerplate!(tables::head::head, head, head_mut, tables::head::TAG);
table_boilerplate!(tables::COLR::COLR, COLR, COLR_mut, tables::COLR::TAG);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typed_access() {
        let mut set = TableSet::default();
        set.insert(tables::maxp::TAG, tables::maxp::maxp::new05(10).into());
        set.insert_raw(tag!("OS/2"), vec![0, 4]);
        assert_eq!(set.maxp().map(|m| m.num_glyphs()), Some(10));
        assert!(set.cmap().is_none());
        if let Some(maxp) = set.maxp_mut() {
            maxp.set_num_glyphs(3);
        }
        assert_eq!(set.maxp().map(|m| m.num_glyphs()), Some(3));
        assert!(set.get(tag!("OS/2")).map_or(false, |t| t.as_subset().is_none()));
        assert_eq!(set.keys(), vec![tag!("OS/2"), tag!("maxp")]);
    }
}
