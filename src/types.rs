//! Basic OpenType scalar types and tags.
#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::error::{Result, SubsetError};

pub type uint16 = u16;
pub type int16 = i16;
pub type uint32 = u32;
pub type int32 = i32;
/// A glyph index. Tables refer to glyphs by this number, not by name.
pub type GlyphID = u16;

/// A four-byte OpenType tag, such as a table tag or a feature tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Build a tag from a four character string at compile time.
    ///
    /// Shorter strings are padded with spaces.
    pub const fn new(s: &str) -> Tag {
        let bytes = s.as_bytes();
        let mut out = [b' '; 4];
        let mut i = 0;
        while i < 4 && i < bytes.len() {
            out[i] = bytes[i];
            i += 1;
        }
        Tag(out)
    }

    /// Build a tag from raw bytes.
    pub fn from_raw(data: [u8; 4]) -> Tag {
        Tag(data)
    }

    /// Parse a tag from a string, padding with spaces; fails on over-long
    /// or non-ASCII input.
    pub fn parse(s: &str) -> Result<Tag> {
        if s.is_empty() || s.len() > 4 || !s.is_ascii() {
            return Err(SubsetError::InvalidTag(s.to_string()));
        }
        Ok(Tag::new(s))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl Deref for Tag {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<[u8; 4]> for Tag {
    fn borrow(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        *self == Tag::new(other)
    }
}

/// Create a [`Tag`] from a string literal.
#[macro_export]
macro_rules! tag {
    ($e: expr) => {
        $crate::types::Tag::new($e)
    };
}

/// Create a `BTreeMap` from a list of key/value pairs.
#[macro_export]
macro_rules! btreemap {
    ($($k:expr => $v:expr),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut map = std::collections::BTreeMap::new();
            $(map.insert($k, $v);)*
            map
        }
    };
}

/// Create a `BTreeSet` from a list of values.
#[macro_export]
macro_rules! btreeset {
    ($($v:expr),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut set = std::collections::BTreeSet::new();
            $(set.insert($v);)*
            set
        }
    };
}
