//! Depth-scaled random displacement for midpoint subdivision.

use std::num::NonZeroU32;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Produces the vertical offset applied to a new midpoint.
///
/// At subdivision depth `d` the offset is uniform in
/// `[-factor / d, +factor / d]`, where `d` is the number of subdivision levels
/// still to run (it counts down to 1 on the last split).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplacementModel {
    /// Offset amplitude at depth 1.
    pub factor: f64,
}

impl DisplacementModel {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// Largest absolute offset produced at `depth`.
    pub fn amplitude(&self, depth: NonZeroU32) -> f64 {
        self.factor / f64::from(depth.get())
    }

    /// Draws one offset at `depth` from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, depth: NonZeroU32, rng: &mut R) -> f64 {
        let unit: f64 = rng.random();
        (unit * 2.0 - 1.0) * self.amplitude(depth)
    }
}

/// Draws an undisplaced corner height in `[0, 1)`.
pub fn corner_height<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random()
}
