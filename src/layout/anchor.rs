use crate::layout::valuerecord::{prune_device_hints, Device};
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs, non_snake_case, non_camel_case_types)]
/// An anchor point on a glyph, for attachment positioning.
pub struct Anchor {
    pub xCoordinate: int16,
    pub yCoordinate: int16,
    /// Index of a contour point the anchor snaps to when hinting
    pub anchorPoint: Option<uint16>,
    pub xDevice: Option<Device>,
    pub yDevice: Option<Device>,
}

impl Anchor {
    pub fn new(x: int16, y: int16) -> Anchor {
        Anchor {
            xCoordinate: x,
            yCoordinate: y,
            ..Default::default()
        }
    }

    /// The binary format this anchor would be written in.
    pub fn format(&self) -> uint16 {
        if self.xDevice.is_some() || self.yDevice.is_some() {
            3
        } else if self.anchorPoint.is_some() {
            2
        } else {
            1
        }
    }

    /// Drops the contour point and hinting device tables.
    pub fn prune_hints(&mut self) {
        self.anchorPoint = None;
        prune_device_hints(&mut self.xDevice);
        prune_device_hints(&mut self.yDevice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anchor_prune_hints() {
        let mut anchor = Anchor {
            anchorPoint: Some(12),
            ..Anchor::new(100, 200)
        };
        assert_eq!(anchor.format(), 2);
        anchor.prune_hints();
        assert_eq!(anchor, Anchor::new(100, 200));
        assert_eq!(anchor.format(), 1);
    }
}
