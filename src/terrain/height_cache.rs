//! Memoized midpoint heights shared across neighbouring triangles.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroU32;

use glam::DVec2;
use rand::Rng;

use crate::geometry::planar_key;
use crate::noise::DisplacementModel;

/// Height assigned to every planar midpoint during one generation run.
///
/// Two triangles sharing an edge ask for the same midpoint; whichever asks
/// first fixes the height and every later lookup returns it unchanged, so the
/// surface stays watertight. Keys are canonicalized to the 1e-4 grid.
///
/// A cache belongs to exactly one run. Reusing it across runs would leak
/// heights from an earlier configuration or seed.
#[derive(Debug, Default)]
pub struct HeightCache {
    heights: HashMap<(i64, i64), f64>,
    hits: u64,
    misses: u64,
}

impl HeightCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache sized for `capacity` midpoints.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heights: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the height at `point`, displacing and storing it on first use.
    ///
    /// On a repeat lookup `base_height` and `depth` are ignored and no random
    /// number is consumed.
    pub fn height_at<R: Rng + ?Sized>(
        &mut self,
        point: DVec2,
        base_height: f64,
        depth: NonZeroU32,
        model: &DisplacementModel,
        rng: &mut R,
    ) -> f64 {
        match self.heights.entry(planar_key(point)) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                *entry.get()
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                *entry.insert(base_height + model.sample(depth, rng))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Lookups answered from a stored height.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that created a new height.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
