//! Camera that trails the local ship

use crate::game::{normalize_orientation, WorldState, MOVE_SPEED, ROTATION_SPEED};

/// Fraction of the remaining distance covered per frame
pub const FOLLOW_FACTOR: f64 = MOVE_SPEED / 10000.0;
/// Fraction of the remaining rotation covered per frame
pub const TURN_FACTOR: f64 = ROTATION_SPEED / 5000.0;

pub fn lerp(from: f64, to: f64, percent: f64) -> f64 {
    from * (1.0 - percent) + to * percent
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    /// Degrees in (-180, 180]
    pub rotation: f64,
}

impl Camera {
    /// Moves one frame's worth towards `target`, turning the short way round
    pub fn follow(&mut self, target: &WorldState) {
        self.x = lerp(self.x, target.x, FOLLOW_FACTOR);
        self.y = lerp(self.y, target.y, FOLLOW_FACTOR);

        let turn = normalize_orientation(target.orientation - self.rotation);
        self.rotation = normalize_orientation(self.rotation + lerp(0.0, turn, TURN_FACTOR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_on_target() {
        let mut camera = Camera::default();
        let target = WorldState::new(500.0, -200.0, 45.0);
        for _ in 0..500 {
            camera.follow(&target);
        }
        assert!((camera.x - 500.0).abs() < 1e-3);
        assert!((camera.y + 200.0).abs() < 1e-3);
        assert!((camera.rotation - 45.0).abs() < 1e-3);
    }

    #[test]
    fn turns_across_the_seam() {
        let mut camera = Camera {
            rotation: 170.0,
            ..Camera::default()
        };
        camera.follow(&WorldState::new(0.0, 0.0, -170.0));
        // Short way round is +20 degrees, through 180
        assert!(camera.rotation > 170.0 || camera.rotation < -170.0);
    }
}
