//! Random spawn points and ship colors

use rand::Rng;

use crate::game::Timestamp;
use crate::ws::protocol::{InitialRecord, PeerId};

/// Spawn coordinates are drawn from 0..=SPAWN_EXTENT on both axes
pub const SPAWN_EXTENT: i32 = 200;

/// Where and how a new ship appears
#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub color: String,
}

impl Spawn {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0..=SPAWN_EXTENT) as f64,
            y: rng.gen_range(0..=SPAWN_EXTENT) as f64,
            rotation: 0.0,
            color: bright_color(rng),
        }
    }

    /// Spawn announcement; `id` is `None` for the spawning peer itself
    pub fn initial(&self, time: Timestamp, id: Option<PeerId>) -> InitialRecord {
        InitialRecord {
            time,
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            color: self.color.clone(),
            id,
        }
    }
}

/// Fully saturated color with a random hue
pub fn bright_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("hsl({}, 100%, 50%)", rng.gen_range(0..360))
}
