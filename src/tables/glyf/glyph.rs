use super::component::Component;
use super::point::Point;
use crate::types::*;

#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_snake_case)]
/// A higher-level representation of a TrueType outline glyph.
pub struct Glyph {
    /// The minimum X coordinate of points (including transformed component points) within this glyph
    pub xMin: int16,
    /// The maximum X coordinate of points (including transformed component points) within this glyph
    pub xMax: int16,
    /// The minimum Y coordinate of points (including transformed component points) within this glyph
    pub yMin: int16,
    /// The maximum Y coordinate of points (including transformed component points) within this glyph
    pub yMax: int16,
    /// A list of contours, each contour represented as a list of `Point` objects.
    pub contours: Vec<Vec<Point>>,
    /// Truetype instructions (binary)
    pub instructions: Vec<u8>,
    /// A vector of components
    pub components: Vec<Component>,
    /// A flag used in the low-level glyph representation to determine if this
    /// glyph has overlaps. This *appears* to be unused in OpenType implementations.
    pub overlap: bool,
}

/// Composite glyphs nested deeper than this are treated as empty when
/// computing bounds.
const MAX_COMPONENT_DEPTH: usize = 64;

impl Glyph {
    /// A glyph with no outline.
    pub fn empty() -> Glyph {
        Glyph::default()
    }

    /// Returns true if this glyph has any components
    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    /// Returns true if this glyph has neither components nor contours
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.contours.is_empty()
    }

    /// The glyph IDs of this glyph's components.
    pub fn component_ids(&self) -> impl Iterator<Item = GlyphID> + '_ {
        self.components.iter().map(|c| c.glyph_index)
    }

    /// Returns a bounding box rectangle for this glyph as a `kurbo::Rect`.
    pub fn bounds_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.xMin.into(),
            self.yMin.into(),
            self.xMax.into(),
            self.yMax.into(),
        )
    }

    /// Sets the bounding box rectangle for this glyph from a `kurbo::Rect`.
    pub fn set_bounds_rect(&mut self, r: kurbo::Rect) {
        self.xMin = r.min_x().floor() as i16;
        self.xMax = r.max_x().ceil() as i16;
        self.yMin = r.min_y().floor() as i16;
        self.yMax = r.max_y().ceil() as i16;
    }

    /// Drops the TrueType instructions.
    pub fn remove_hinting(&mut self) {
        self.instructions.clear();
        self.components.iter_mut().for_each(Component::remove_hinting);
    }

    /// Computes the bounds of the outline from its points, following
    /// components through `glyphs`. Returns `None` for an empty glyph.
    pub fn compute_bounds(&self, glyphs: &[Glyph]) -> Option<kurbo::Rect> {
        self.compute_bounds_at_depth(glyphs, 0)
    }

    fn compute_bounds_at_depth(&self, glyphs: &[Glyph], depth: usize) -> Option<kurbo::Rect> {
        if depth > MAX_COMPONENT_DEPTH {
            log::warn!("Component nesting too deep while computing bounds");
            return None;
        }
        let mut points = self.contours.iter().flatten().map(|p| p.to_kurbo());
        let mut bounds = points
            .next()
            .map(|first| points.fold(kurbo::Rect::from_points(first, first), |r, p| r.union_pt(p)));
        for component in &self.components {
            let other = match glyphs.get(component.glyph_index as usize) {
                Some(g) => g,
                None => {
                    log::error!("Component not found for ID={:?}", component.glyph_index);
                    continue;
                }
            };
            let rect = match other.compute_bounds_at_depth(glyphs, depth + 1) {
                Some(r) => r,
                None => continue,
            };
            let t = component.transformation;
            let corners = [
                t * kurbo::Point::new(rect.x0, rect.y0),
                t * kurbo::Point::new(rect.x1, rect.y0),
                t * kurbo::Point::new(rect.x0, rect.y1),
                t * kurbo::Point::new(rect.x1, rect.y1),
            ];
            let transformed = corners[1..]
                .iter()
                .fold(kurbo::Rect::from_points(corners[0], corners[0]), |r, &p| {
                    r.union_pt(p)
                });
            bounds = Some(match bounds {
                Some(b) => b.union(transformed),
                None => transformed,
            });
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_composite_bounds() {
        let square = Glyph {
            contours: vec![vec![
                Point::new(0, 0, true),
                Point::new(100, 0, true),
                Point::new(100, 100, true),
                Point::new(0, 100, true),
            ]],
            ..Default::default()
        };
        let composite = Glyph {
            components: vec![Component::new(0, 50.0, -20.0)],
            ..Default::default()
        };
        let glyphs = vec![square, composite];
        assert_eq!(
            glyphs[1].compute_bounds(&glyphs),
            Some(kurbo::Rect::new(50.0, -20.0, 150.0, 80.0))
        );
        assert_eq!(Glyph::empty().compute_bounds(&glyphs), None);
    }
}
