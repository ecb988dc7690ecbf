use crate::types::*;

/// A point of a simple glyph's contour
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Point {
    pub x: int16,
    pub y: int16,
    pub on_curve: bool,
}

impl Point {
    pub fn new(x: int16, y: int16, on_curve: bool) -> Point {
        Point { x, y, on_curve }
    }

    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x.into(), self.y.into())
    }
}
