//! Position and orientation in shared world coordinates

use super::physics::LocalDelta;

/// Wraps an orientation in degrees into (-180, 180].
///
/// Exact modular reduction: repeated small rotations never stick at a bound.
pub fn normalize_orientation(degrees: f64) -> f64 {
    let wrapped = 180.0 - (180.0 - degrees).rem_euclid(360.0);
    // rem_euclid may round up to exactly 360.0
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Rotates `(x, y)` about the origin by `degrees`
pub fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (cos * x + sin * y, cos * y - sin * x)
}

/// Where a ship is and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldState {
    pub x: f64,
    pub y: f64,
    /// Degrees in (-180, 180]
    pub orientation: f64,
}

impl WorldState {
    pub fn new(x: f64, y: f64, orientation: f64) -> Self {
        Self {
            x,
            y,
            orientation: normalize_orientation(orientation),
        }
    }

    /// Applies a delta computed in this state's local frame
    pub fn apply_delta(&self, delta: &LocalDelta) -> Self {
        let (dx, dy) = rotate(delta.dx, delta.dy, -self.orientation);
        Self {
            x: self.x + dx,
            y: self.y + dy,
            orientation: normalize_orientation(self.orientation + delta.d_rotation),
        }
    }
}
