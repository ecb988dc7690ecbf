use crate::types::*;
use chrono::NaiveDateTime;

/// The 'head' OpenType tag.
pub const TAG: Tag = crate::tag!("head");

/// The font header table
#[allow(non_snake_case, non_camel_case_types, missing_docs)]
#[derive(Debug, PartialEq, Clone)]
pub struct head {
    pub majorVersion: uint16,
    pub minorVersion: uint16,
    pub fontRevision: f32,
    pub checksumAdjustment: uint32,
    pub magicNumber: uint32,
    pub flags: uint16,
    pub unitsPerEm: uint16,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub xMin: int16,
    pub yMin: int16,
    pub xMax: int16,
    pub yMax: int16,
    pub macStyle: uint16,
    pub lowestRecPPEM: uint16,
    pub fontDirectionHint: int16,
    pub indexToLocFormat: int16,
    pub glyphDataFormat: int16,
}

impl head {
    /// Sets the font bounding box from a `kurbo::Rect`.
    pub fn set_bounds(&mut self, r: kurbo::Rect) {
        self.xMin = r.min_x().floor() as i16;
        self.xMax = r.max_x().ceil() as i16;
        self.yMin = r.min_y().floor() as i16;
        self.yMax = r.max_y().ceil() as i16;
    }

    /// Sets the modification time to now.
    pub fn touch(&mut self) {
        self.modified = chrono::Utc::now().naive_utc();
    }
}
