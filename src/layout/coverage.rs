use crate::subset::GlyphFilter;
use crate::types::*;
use std::collections::BTreeSet;

#[derive(Debug, PartialEq, Eq, Clone, Default)]
/// A coverage table.
///
/// OpenType lookups store information about which glyphs are affected by the
/// lookup, as a way to optimize the shaper's operation. Many subtables carry
/// an array parallel to the coverage (one record per covered glyph), so
/// subsetting a coverage reports which positions survived, and the caller
/// filters its own array with the same positions.
pub struct Coverage {
    /// The glyphs (usually the first glyph in a sequence) affected by this lookup.
    pub glyphs: Vec<GlyphID>,
}

impl Coverage {
    /// Creates a coverage table, sorting and deduplicating the glyphs.
    pub fn new<I: IntoIterator<Item = GlyphID>>(glyphs: I) -> Coverage {
        let set: BTreeSet<GlyphID> = glyphs.into_iter().collect();
        Coverage {
            glyphs: set.into_iter().collect(),
        }
    }

    /// Returns the ascending list of coverage indices whose glyph is in `glyphs`.
    pub fn intersect(&self, glyphs: &BTreeSet<GlyphID>) -> Vec<usize> {
        self.glyphs
            .iter()
            .enumerate()
            .filter(|(_, g)| glyphs.contains(g))
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns the set of covered glyphs which are also in `glyphs`.
    pub fn intersect_glyphs(&self, glyphs: &BTreeSet<GlyphID>) -> BTreeSet<GlyphID> {
        self.glyphs
            .iter()
            .filter(|g| glyphs.contains(g))
            .copied()
            .collect()
    }

    /// Returns true if any covered glyph is in `glyphs`.
    pub fn intersects(&self, glyphs: &BTreeSet<GlyphID>) -> bool {
        self.glyphs.iter().any(|g| glyphs.contains(g))
    }

    /// Drops glyphs which are not retained and renumbers the rest.
    ///
    /// Returns the (old) coverage indices which survived, in ascending order.
    pub fn subset(&mut self, filter: &GlyphFilter) -> Vec<usize> {
        let indices = self.intersect(filter.retained);
        self.glyphs = indices
            .iter()
            .map(|&i| filter.remap(self.glyphs[i]))
            .collect();
        indices
    }

    /// Keeps only the coverage entries at the given positions.
    pub fn remap(&mut self, indices: &[usize]) {
        self.glyphs = indices
            .iter()
            .filter_map(|&i| self.glyphs.get(i))
            .copied()
            .collect();
    }

    /// The number of covered glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if no glyph is covered.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Keep the elements of a coverage-parallel array at the given positions.
pub(crate) fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices
        .iter()
        .filter_map(|&i| items.get(i))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btreeset;
    use crate::subset::GlyphMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coverage_subset_keeps_alignment() {
        let retained = btreeset!(0, 3, 7, 9);
        let map = GlyphMap::compact(&retained);
        let filter = GlyphFilter::new(&retained, &map);

        let mut coverage = Coverage::new(vec![9, 2, 3, 5, 7]);
        let values = vec!['a', 'b', 'c', 'd', 'e'];
        let indices = coverage.subset(&filter);
        assert_eq!(indices, vec![1, 3, 4]);
        assert_eq!(coverage.glyphs, vec![1, 2, 3]);
        assert_eq!(select(&values, &indices), vec!['b', 'd', 'e']);
    }

    #[test]
    fn test_coverage_remap() {
        let mut coverage = Coverage::new(vec![1, 2, 3, 4]);
        coverage.remap(&[0, 2]);
        assert_eq!(coverage.glyphs, vec![1, 3]);
    }
}
