//! Arcade Engine - real-time mini-game simulations
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, movement, collisions, scoring)
//! - `game`: Per-frame scheduler that drives the sim and hands frames to a renderer
//! - `renderer`: Renderer capability the game drives (text renderer for native)
//! - `platform`: Input normalization and clocks
//! - `highscores`: Leaderboard sink for final score records
//! - `settings`: Tunable, clamped configuration

pub mod error;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{EngineError, Result};
pub use game::{Game, LoadState};
pub use highscores::{HighScores, ScoreRecord, ScoreSink};
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Default cap on a single frame delta (seconds), protects against tab backgrounding
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player sits on the depth plane z = 0
    pub const PLAYER_DEPTH: f32 = 0.0;
    /// Entities are created on this depth plane
    pub const SPAWN_DEPTH: f32 = 60.0;
    /// Entities behind the player past this depth are retired
    pub const RETIRE_DEPTH: f32 = -4.0;

    /// Lane spacing for lane-based variants (world units)
    pub const LANE_WIDTH: f32 = 2.0;
    /// Default lane count
    pub const DEFAULT_LANES: u8 = 3;

    /// Jump impulse (units/s) and gravity (units/s²) for runner variants
    pub const JUMP_VELOCITY: f32 = 9.0;
    pub const GRAVITY: f32 = 24.0;

    /// Player health pool for the extended runner
    pub const MAX_HEALTH: u8 = 3;
    /// Invincibility window after taking damage (seconds)
    pub const INVINCIBILITY_SECS: f32 = 2.0;
    /// Power-up effect duration (seconds)
    pub const POWERUP_SECS: f32 = 5.0;
    /// Observed concurrent collectible cap
    pub const COLLECTIBLE_CAP: usize = 8;

    /// Speed boost multiplier on approach speed
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    /// Magnet reach along depth, and lateral pull (units/s)
    pub const MAGNET_RANGE: f32 = 12.0;
    pub const MAGNET_PULL: f32 = 10.0;

    /// Shooter projectile speed (units/s), radius and fire cooldown (seconds)
    pub const PROJECTILE_SPEED: f32 = 45.0;
    pub const PROJECTILE_RADIUS: f32 = 0.3;
    pub const FIRE_COOLDOWN: f32 = 0.25;
}

/// World x coordinate of a lane center, lanes symmetric around x = 0
#[inline]
pub fn lane_to_x(lane: u8, lanes: u8) -> f32 {
    let center = (lanes.max(1) as f32 - 1.0) / 2.0;
    (lane as f32 - center) * consts::LANE_WIDTH
}

/// True if every component is finite
#[inline]
pub fn is_finite_vec(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_to_x_symmetric() {
        assert_eq!(lane_to_x(1, 3), 0.0);
        assert_eq!(lane_to_x(0, 3), -consts::LANE_WIDTH);
        assert_eq!(lane_to_x(2, 3), consts::LANE_WIDTH);
        assert_eq!(lane_to_x(0, 2), -consts::LANE_WIDTH / 2.0);
    }
}
