use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// The stages of the closure at which the retained glyph set is recorded.
///
/// Tables subset against the set which was current when the data they
/// describe had been fully explored: `cmap` against the directly requested
/// glyphs, the layout tables against the set closed over `GSUB`, and the
/// outline tables against everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Checkpoint {
    Cmap,
    Gsub,
    Glyf,
}

/// The old-to-new glyph ID mapping for one subsetting run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphMap {
    mapping: BTreeMap<GlyphID, GlyphID>,
    num_glyphs: usize,
}

impl GlyphMap {
    /// Numbers the retained glyphs densely, preserving their order.
    pub fn compact(retained: &BTreeSet<GlyphID>) -> GlyphMap {
        GlyphMap {
            mapping: retained
                .iter()
                .enumerate()
                .map(|(new, &old)| (old, new as GlyphID))
                .collect(),
            num_glyphs: retained.len(),
        }
    }

    /// Keeps every retained glyph at its original ID.
    pub fn retaining_gids(retained: &BTreeSet<GlyphID>) -> GlyphMap {
        GlyphMap {
            mapping: retained.iter().map(|&g| (g, g)).collect(),
            num_glyphs: retained.iter().next_back().map_or(0, |&g| g as usize + 1),
        }
    }

    /// The new ID of an old glyph, if it was retained.
    pub fn get(&self, old: GlyphID) -> Option<GlyphID> {
        self.mapping.get(&old).copied()
    }

    /// The number of glyphs in the subset font, including any gaps.
    pub fn num_glyphs(&self) -> usize {
        self.num_glyphs
    }

    /// For each new glyph ID, the old glyph it came from; `None` for gaps.
    pub fn old_gids(&self) -> Vec<Option<GlyphID>> {
        let mut out = vec![None; self.num_glyphs];
        for (&old, &new) in &self.mapping {
            out[new as usize] = Some(old);
        }
        out
    }

    /// Iterates over (old, new) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphID, GlyphID)> + '_ {
        self.mapping.iter().map(|(&o, &n)| (o, n))
    }
}

/// What `subset_glyphs` implementations see: the glyphs a table should keep
/// (in the old numbering) and how to renumber them.
#[derive(Debug, Clone, Copy)]
pub struct GlyphFilter<'a> {
    pub retained: &'a BTreeSet<GlyphID>,
    pub map: &'a GlyphMap,
}

impl<'a> GlyphFilter<'a> {
    pub fn new(retained: &'a BTreeSet<GlyphID>, map: &'a GlyphMap) -> Self {
        GlyphFilter { retained, map }
    }

    pub fn contains(&self, glyph: GlyphID) -> bool {
        self.retained.contains(&glyph)
    }

    pub fn contains_all(&self, glyphs: &[GlyphID]) -> bool {
        glyphs.iter().all(|g| self.retained.contains(g))
    }

    /// Renumbers a retained glyph. Glyphs outside the map fall back to notdef.
    pub fn remap(&self, glyph: GlyphID) -> GlyphID {
        self.map.get(glyph).unwrap_or(0)
    }

    pub fn remap_all(&self, glyphs: &[GlyphID]) -> Vec<GlyphID> {
        glyphs.iter().map(|&g| self.remap(g)).collect()
    }
}

/// State shared between tables for a single subsetting run.
#[derive(Debug, Clone, Default)]
pub struct ClosureContext {
    /// Codepoints asked for by the caller.
    pub unicodes_requested: BTreeSet<u32>,
    /// Glyphs asked for by the caller.
    pub glyphs_requested: BTreeSet<GlyphID>,
    /// The working set, grown by each table's closure step.
    pub glyphs: BTreeSet<GlyphID>,
    /// Codepoints with no default mapping in any Unicode cmap.
    pub unicodes_missing: BTreeSet<u32>,
    checkpoints: Vec<(Checkpoint, BTreeSet<GlyphID>)>,
    glyph_map: GlyphMap,
}

impl ClosureContext {
    pub fn new(unicodes: BTreeSet<u32>, glyphs: BTreeSet<GlyphID>) -> Self {
        ClosureContext {
            unicodes_requested: unicodes,
            glyphs: glyphs.clone(),
            glyphs_requested: glyphs,
            ..Default::default()
        }
    }

    /// Records the current working set under a checkpoint.
    pub fn checkpoint(&mut self, checkpoint: Checkpoint) {
        self.checkpoints.retain(|(c, _)| *c != checkpoint);
        self.checkpoints.push((checkpoint, self.glyphs.clone()));
    }

    /// The glyph set recorded at a checkpoint, or the latest earlier one if
    /// that stage did not run.
    pub fn glyphs_at(&self, checkpoint: Checkpoint) -> &BTreeSet<GlyphID> {
        self.checkpoints
            .iter()
            .filter(|(c, _)| *c <= checkpoint)
            .max_by_key(|(c, _)| *c)
            .map(|(_, glyphs)| glyphs)
            .unwrap_or(&self.glyphs)
    }

    /// The final retained set.
    pub fn glyphs_all(&self) -> &BTreeSet<GlyphID> {
        &self.glyphs
    }

    pub(crate) fn set_glyph_map(&mut self, map: GlyphMap) {
        self.glyph_map = map;
    }

    /// The glyph map; empty until the closure phase has finished.
    pub fn glyph_map(&self) -> &GlyphMap {
        &self.glyph_map
    }

    /// A filter over the glyphs recorded at `checkpoint`.
    pub fn filter(&self, checkpoint: Checkpoint) -> GlyphFilter<'_> {
        GlyphFilter::new(self.glyphs_at(checkpoint), self.glyph_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btreeset;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glyph_maps() {
        let retained = btreeset!(0, 2, 5);
        let compact = GlyphMap::compact(&retained);
        assert_eq!(compact.num_glyphs(), 3);
        assert_eq!(compact.get(5), Some(2));
        assert_eq!(compact.get(3), None);
        assert_eq!(compact.old_gids(), vec![Some(0), Some(2), Some(5)]);

        let kept = GlyphMap::retaining_gids(&retained);
        assert_eq!(kept.num_glyphs(), 6);
        assert_eq!(kept.get(5), Some(5));
        assert_eq!(
            kept.old_gids(),
            vec![Some(0), None, Some(2), None, None, Some(5)]
        );
    }

    #[test]
    fn test_checkpoints() {
        let mut ctx = ClosureContext::new(btreeset!(), btreeset!(1));
        ctx.checkpoint(Checkpoint::Cmap);
        ctx.glyphs.insert(2);
        ctx.checkpoint(Checkpoint::Gsub);
        ctx.glyphs.insert(3);
        assert_eq!(ctx.glyphs_at(Checkpoint::Cmap), &btreeset!(1));
        assert_eq!(ctx.glyphs_at(Checkpoint::Gsub), &btreeset!(1, 2));
        // No glyf stage has run yet, so the gsub set is the latest
        assert_eq!(ctx.glyphs_at(Checkpoint::Glyf), &btreeset!(1, 2));
        assert_eq!(ctx.glyphs_all(), &btreeset!(1, 2, 3));
    }
}
