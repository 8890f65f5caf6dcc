//! Ship kinematics: held commands to velocities, velocities to displacement

use super::command::Command;
use super::input::InputState;

/// Forward/backward speed in world units per second
pub const MOVE_SPEED: f64 = 1000.0;
/// Rotation speed in degrees per second
pub const ROTATION_SPEED: f64 = 180.0;

/// Instantaneous motion of a ship in its own frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocities {
    /// Forward/backward speed. Forward is negative.
    pub medial: f64,
    /// Strafing speed, always zero
    pub lateral: f64,
    /// Degrees per second, clockwise positive
    pub angular: f64,
}

impl Velocities {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            medial: -input.factor(Command::MoveForward) * MOVE_SPEED
                + input.factor(Command::MoveBackward) * MOVE_SPEED,
            lateral: 0.0,
            angular: input.factor(Command::RotateCw) * ROTATION_SPEED
                - input.factor(Command::RotateCcw) * ROTATION_SPEED,
        }
    }
}

/// Displacement and rotation in the mover's frame at the start of an interval
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalDelta {
    pub dx: f64,
    pub dy: f64,
    /// Degrees, not normalized
    pub d_rotation: f64,
}

impl LocalDelta {
    pub const IDENTITY: LocalDelta = LocalDelta {
        dx: 0.0,
        dy: 0.0,
        d_rotation: 0.0,
    };

    /// Integrates constant velocities over `elapsed_secs`.
    ///
    /// With rotation the ship follows a circular arc and the displacement is
    /// the exact chord of that arc, not an Euler step.
    pub fn integrate(elapsed_secs: f64, velocities: &Velocities) -> Self {
        if elapsed_secs == 0.0 {
            return Self::IDENTITY;
        }

        let d_rotation = velocities.angular * elapsed_secs;

        if velocities.angular == 0.0 {
            return Self {
                dx: 0.0,
                dy: velocities.medial * elapsed_secs,
                d_rotation,
            };
        }

        let angular_rad = velocities.angular.to_radians();
        let d_rotation_rad = d_rotation.to_radians();

        Self {
            dx: -velocities.medial * (1.0 - d_rotation_rad.cos()) / angular_rad,
            dy: velocities.medial * d_rotation_rad.sin() / angular_rad,
            d_rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn held(commands: &[Command]) -> InputState {
        commands
            .iter()
            .fold(InputState::IDLE, |state, &c| state.with(c, true))
    }

    #[test]
    fn forward_is_negative_medial() {
        let v = Velocities::from_input(&held(&[Command::MoveForward]));
        assert_eq!(v.medial, -MOVE_SPEED);
        assert_eq!(v.angular, 0.0);

        let v = Velocities::from_input(&held(&[Command::MoveBackward]));
        assert_eq!(v.medial, MOVE_SPEED);
    }

    #[test]
    fn opposing_commands_cancel() {
        let v = Velocities::from_input(&held(&[
            Command::MoveForward,
            Command::MoveBackward,
            Command::RotateCw,
            Command::RotateCcw,
        ]));
        assert_eq!(v, Velocities::default());
    }

    #[test]
    fn strafing_never_moves() {
        let v = Velocities::from_input(&held(&[Command::MoveLeft, Command::MoveRight]));
        assert_eq!(v, Velocities::default());
        let v = Velocities::from_input(&held(&[Command::MoveLeft]));
        assert_eq!(v.lateral, 0.0);
    }

    #[test]
    fn clockwise_is_positive() {
        let v = Velocities::from_input(&held(&[Command::RotateCw]));
        assert_eq!(v.angular, ROTATION_SPEED);
        let v = Velocities::from_input(&held(&[Command::RotateCcw]));
        assert_eq!(v.angular, -ROTATION_SPEED);
    }

    #[test]
    fn zero_elapsed_is_identity() {
        let v = Velocities::from_input(&held(&[Command::MoveForward, Command::RotateCw]));
        assert_eq!(LocalDelta::integrate(0.0, &v), LocalDelta::IDENTITY);
    }

    #[test]
    fn straight_line_without_rotation() {
        let v = Velocities::from_input(&held(&[Command::MoveForward]));
        let delta = LocalDelta::integrate(1.5, &v);
        assert_eq!(delta.dx, 0.0);
        assert_eq!(delta.dy, -1500.0);
        assert_eq!(delta.d_rotation, 0.0);
    }

    #[test]
    fn quarter_turn_follows_the_arc() {
        // Quarter circle of radius MOVE_SPEED / angular_rad
        let v = Velocities::from_input(&held(&[Command::MoveForward, Command::RotateCw]));
        let delta = LocalDelta::integrate(0.5, &v);
        let radius = MOVE_SPEED / ROTATION_SPEED.to_radians();

        assert!((delta.d_rotation - 90.0).abs() < EPS);
        assert!((delta.dy + radius).abs() < EPS);
        assert!((delta.dx - radius).abs() < EPS);
    }

    #[test]
    fn rotation_in_place() {
        let v = Velocities::from_input(&held(&[Command::RotateCcw]));
        let delta = LocalDelta::integrate(0.25, &v);
        assert_eq!(delta.d_rotation, -45.0);
        assert_eq!(delta.dx, 0.0);
        assert_eq!(delta.dy, 0.0);
    }
}
