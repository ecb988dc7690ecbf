use crate::types::*;
use bitflags::bitflags;
use kurbo::Affine;

bitflags! {
    /// Component flags which survive decoding. Flags describing the
    /// encoding of arguments and transforms are derived by the codec.
    pub struct ComponentFlags: u16 {
        const ROUND_XY_TO_GRID = 0x0004;
        /// Instructions follow the last component.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// The composite takes its advance and side bearing from this component.
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

impl Default for ComponentFlags {
    fn default() -> Self {
        ComponentFlags::empty()
    }
}

/// A reference from a composite glyph to another glyph.
#[derive(Debug, PartialEq, Clone)]
pub struct Component {
    pub glyph_index: GlyphID,
    pub transformation: Affine,
    /// Positioning by (parent point, child point) numbers instead of an
    /// offset. The offset in `transformation` is then zero.
    pub match_points: Option<(uint16, uint16)>,
    pub flags: ComponentFlags,
}

impl Component {
    /// A component placing `glyph_index` at an offset.
    pub fn new(glyph_index: GlyphID, dx: f64, dy: f64) -> Component {
        Component {
            glyph_index,
            transformation: Affine::translate((dx, dy)),
            match_points: None,
            flags: ComponentFlags::empty(),
        }
    }

    /// Points this component at the renumbered glyph. Components whose
    /// glyph was not kept point at glyph 0.
    pub(crate) fn remap(&mut self, map: &crate::subset::GlyphMap) {
        self.glyph_index = map.get(self.glyph_index).unwrap_or(0);
    }

    pub(crate) fn remove_hinting(&mut self) {
        self.flags.remove(ComponentFlags::WE_HAVE_INSTRUCTIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btreeset;
    use crate::subset::GlyphMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remap_and_dehint() {
        let map = GlyphMap::compact(&btreeset!(0, 3, 7));
        let mut component = Component::new(7, 10.0, 0.0);
        component.flags = ComponentFlags::WE_HAVE_INSTRUCTIONS | ComponentFlags::USE_MY_METRICS;
        component.remap(&map);
        component.remove_hinting();
        assert_eq!(component.glyph_index, 2);
        assert_eq!(component.flags, ComponentFlags::USE_MY_METRICS);

        let mut dangling = Component::new(5, 0.0, 0.0);
        dangling.remap(&map);
        assert_eq!(dangling.glyph_index, 0);
    }
}
