//! Subsetting for decoded OpenType fonts.
//!
//! This crate works on fonts which have already been read into memory as
//! typed tables (see [`Font`] and [`table_store::Table`]). Given a set of
//! codepoints and glyphs to keep, a [`Subsetter`] finds every glyph those can
//! reach through `cmap`, `GSUB`, composite outlines, color layers and CFF
//! accents, then rewrites each table to refer only to the survivors.
//!
//! ```ignore
//! use fonttools_subset::{Options, Request, Subsetter};
//!
//! let request = Request::parse(&font, &["--text=Hello", "uni00E9"])?;
//! let mut subsetter = Subsetter::new(Options::default());
//! subsetter.populate(&request);
//! subsetter.subset(&mut font)?;
//! ```

mod error;
/// The in-memory font
pub mod font;
/// OpenType Layout common tables and lookup subtables
pub mod layout;
/// The subsetting pipeline and its options
pub mod subset;
/// The set of tables in a font
pub mod table_store;
/// Individual OpenType tables
pub mod tables;
/// Basic OpenType types
pub mod types;

pub use crate::error::{Result, SubsetError};
pub use crate::font::{Font, SfntVersion};
pub use crate::subset::{Options, Request, Subsetter};
pub use crate::table_store::{Table, TableSet};
pub use crate::types::{GlyphID, Tag};
