//! Randomness for terrain synthesis.
//!
//! All draws go through a caller-owned `rand::Rng`, so a seeded
//! `ChaCha8Rng` makes a whole run reproducible.

mod displacement;

pub use displacement::{DisplacementModel, corner_height};
