//! Triangle primitive used by the subdivision engine.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// An ordered triple of terrain points.
///
/// `z` holds elevation; `x`/`y` are the planar footprint coordinates.
/// Equality is positional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p1: DVec3,
    pub p2: DVec3,
    pub p3: DVec3,
}

impl Triangle {
    /// Creates a triangle from three points.
    pub const fn new(p1: DVec3, p2: DVec3, p3: DVec3) -> Self {
        Self { p1, p2, p3 }
    }

    /// Returns the vertices in winding order.
    pub fn vertices(&self) -> [DVec3; 3] {
        [self.p1, self.p2, self.p3]
    }

    /// Mean elevation of the three vertices.
    pub fn average_height(&self) -> f64 {
        (self.p1.z + self.p2.z + self.p3.z) / 3.0
    }
}

/// Planar midpoint of an edge, `((x1 + x2) / 2, (y1 + y2) / 2)`.
///
/// Addition is commutative in IEEE arithmetic, so both orientations of a shared
/// edge produce bit-identical coordinates.
pub fn planar_midpoint(a: DVec3, b: DVec3) -> DVec2 {
    DVec2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
