//! Game variants and their data-driven rule tables
//!
//! The four arcade games share one simulation core. Everything that differs
//! between them (geometry, spawn tables, obstacle handling, scoring sources)
//! is captured in [`VariantRules`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::{Bounds, CollectibleKind, ObstacleKind, PowerUpKind};
use crate::consts::*;
use crate::error::EngineError;
use crate::settings::Settings;

/// Which arcade game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Lane dodger, first hit ends the run
    Runner,
    /// Enemies fall toward the player, projectiles destroy them
    Shooter,
    /// Gather crystals in a bounded arena
    Collector,
    /// Lane runner with health, invincibility and power-ups
    LaneRunner,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Runner,
        Variant::Shooter,
        Variant::Collector,
        Variant::LaneRunner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Runner => "runner",
            Variant::Shooter => "shooter",
            Variant::Collector => "collector",
            Variant::LaneRunner => "lane-runner",
        }
    }

    /// Additive multiplier bonus applied at game end
    pub fn bonus(&self) -> f64 {
        match self {
            Variant::Collector => 0.2,
            _ => 0.1,
        }
    }

    /// Base rule table for this variant
    pub fn rules(&self) -> VariantRules {
        match self {
            Variant::Runner => VariantRules {
                variant: *self,
                movement: MovementStyle::Lanes { lanes: DEFAULT_LANES },
                obstacle_rule: ObstacleRule::EndSession,
                breach_ends_run: false,
                max_health: 1,
                obstacles: &[ObstacleKind::Barrier, ObstacleKind::LaserWall, ObstacleKind::Crate],
                power_ups: &[],
                collectibles: &[],
                obstacle_interval: Some(1.4),
                power_up_interval: None,
                collectible_interval: None,
                collectible_cap: COLLECTIBLE_CAP,
                spawn_depth: SPAWN_DEPTH,
                retire_depth: RETIRE_DEPTH,
                approach_rate: 20.0,
                speed_accel: 0.1,
                distance_points: 0.5,
                kill_points: 0,
                fires: false,
                jumps: true,
                player_speed: 0.0,
                player_bounds: Bounds::aabb(0.4, 0.5, 0.4),
                invincibility_secs: INVINCIBILITY_SECS,
                power_up_secs: POWERUP_SECS,
            },
            Variant::Shooter => VariantRules {
                variant: *self,
                movement: MovementStyle::Arena {
                    half_width: 8.0,
                    near: PLAYER_DEPTH,
                    far: PLAYER_DEPTH,
                },
                obstacle_rule: ObstacleRule::EndSession,
                breach_ends_run: true,
                max_health: 1,
                obstacles: &[ObstacleKind::Drone, ObstacleKind::Drone, ObstacleKind::Asteroid],
                power_ups: &[],
                collectibles: &[],
                obstacle_interval: Some(1.0),
                power_up_interval: None,
                collectible_interval: None,
                collectible_cap: COLLECTIBLE_CAP,
                spawn_depth: 40.0,
                retire_depth: RETIRE_DEPTH,
                approach_rate: 8.0,
                speed_accel: 0.05,
                distance_points: 0.0,
                kill_points: 100,
                fires: true,
                jumps: false,
                player_speed: 12.0,
                player_bounds: Bounds::Sphere { radius: 0.7 },
                invincibility_secs: INVINCIBILITY_SECS,
                power_up_secs: POWERUP_SECS,
            },
            Variant::Collector => VariantRules {
                variant: *self,
                movement: MovementStyle::Arena {
                    half_width: 10.0,
                    near: -9.0,
                    far: 9.0,
                },
                obstacle_rule: ObstacleRule::Ignore,
                breach_ends_run: false,
                max_health: 1,
                obstacles: &[],
                power_ups: &[],
                collectibles: &[CollectibleKind::Crystal],
                obstacle_interval: None,
                power_up_interval: None,
                collectible_interval: Some(0.5),
                collectible_cap: COLLECTIBLE_CAP,
                spawn_depth: 10.0,
                retire_depth: -10.0,
                approach_rate: 1.5,
                speed_accel: 0.02,
                distance_points: 0.0,
                kill_points: 0,
                fires: false,
                jumps: false,
                player_speed: 8.0,
                player_bounds: Bounds::Sphere { radius: 0.7 },
                invincibility_secs: INVINCIBILITY_SECS,
                power_up_secs: POWERUP_SECS,
            },
            Variant::LaneRunner => VariantRules {
                variant: *self,
                movement: MovementStyle::Lanes { lanes: DEFAULT_LANES },
                obstacle_rule: ObstacleRule::Damage {
                    while_invincible: InvincibleContact::GhostThrough,
                },
                breach_ends_run: false,
                max_health: MAX_HEALTH,
                obstacles: &[ObstacleKind::Barrier, ObstacleKind::LaserWall, ObstacleKind::Crate],
                power_ups: &[PowerUpKind::SpeedBoost, PowerUpKind::Shield, PowerUpKind::Magnet],
                collectibles: &[
                    CollectibleKind::Coin,
                    CollectibleKind::Coin,
                    CollectibleKind::Coin,
                    CollectibleKind::Gem,
                ],
                obstacle_interval: Some(1.2),
                power_up_interval: Some(8.0),
                collectible_interval: Some(0.6),
                collectible_cap: COLLECTIBLE_CAP,
                spawn_depth: SPAWN_DEPTH,
                retire_depth: RETIRE_DEPTH,
                approach_rate: 20.0,
                speed_accel: 0.1,
                distance_points: 0.5,
                kill_points: 0,
                fires: false,
                jumps: true,
                player_speed: 0.0,
                player_bounds: Bounds::aabb(0.4, 0.5, 0.4),
                invincibility_secs: INVINCIBILITY_SECS,
                power_up_secs: POWERUP_SECS,
            },
        }
    }

    /// Rule table with user settings applied (settings are clamped first)
    pub fn tuned_rules(&self, settings: &Settings) -> VariantRules {
        let settings = settings.sanitized();
        let mut rules = self.rules();
        if let MovementStyle::Lanes { lanes } = &mut rules.movement {
            *lanes = settings.lanes;
        }
        if rules.has_health_pool() {
            rules.max_health = settings.max_health;
        }
        rules.collectible_cap = rules.collectible_cap.min(settings.collectible_cap);
        rules.speed_accel *= settings.difficulty;
        rules.invincibility_secs = settings.invincibility_secs;
        rules.power_up_secs = settings.powerup_secs;
        rules
    }
}

impl FromStr for Variant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "runner" => Ok(Variant::Runner),
            "shooter" => Ok(Variant::Shooter),
            "collector" => Ok(Variant::Collector),
            "lane-runner" | "lane_runner" | "lanerunner" => Ok(Variant::LaneRunner),
            _ => Err(EngineError::UnknownVariant(s.to_string())),
        }
    }
}

/// How the player and entities are laid out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementStyle {
    /// Discrete lanes, free vertical movement (jump)
    Lanes { lanes: u8 },
    /// Continuous x in [-half_width, half_width], player depth in [near, far]
    Arena { half_width: f32, near: f32, far: f32 },
}

/// What touching an obstacle while invincible does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvincibleContact {
    /// No effect, obstacle stays live
    GhostThrough,
    /// No effect, obstacle is removed
    Consume,
}

/// What touching an obstacle does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleRule {
    /// First contact ends the session
    EndSession,
    /// Contact costs one health and opens the invincibility window
    Damage { while_invincible: InvincibleContact },
    /// Variant has no obstacles
    Ignore,
}

/// Per-variant rule table
#[derive(Debug, Clone)]
pub struct VariantRules {
    pub variant: Variant,
    pub movement: MovementStyle,
    pub obstacle_rule: ObstacleRule,
    /// An obstacle crossing the player's depth plane ends the run
    pub breach_ends_run: bool,
    pub max_health: u8,
    /// Spawn tables; subtypes are drawn uniformly, repeats act as weights
    pub obstacles: &'static [ObstacleKind],
    pub power_ups: &'static [PowerUpKind],
    pub collectibles: &'static [CollectibleKind],
    /// Obstacle base interval (seconds at speed 1.0), divided by current speed
    pub obstacle_interval: Option<f32>,
    /// Fixed wall-clock intervals
    pub power_up_interval: Option<f32>,
    pub collectible_interval: Option<f32>,
    pub collectible_cap: usize,
    pub spawn_depth: f32,
    pub retire_depth: f32,
    /// Approach velocity at speed 1.0 (units/s)
    pub approach_rate: f32,
    /// Speed gained per second of play
    pub speed_accel: f32,
    /// Points per world unit travelled
    pub distance_points: f32,
    /// Points per enemy destroyed by a projectile
    pub kill_points: u32,
    pub fires: bool,
    pub jumps: bool,
    /// Continuous movement speed (units/s)
    pub player_speed: f32,
    pub player_bounds: Bounds,
    pub invincibility_secs: f32,
    pub power_up_secs: f32,
}

impl VariantRules {
    pub fn lanes(&self) -> Option<u8> {
        match self.movement {
            MovementStyle::Lanes { lanes } => Some(lanes),
            MovementStyle::Arena { .. } => None,
        }
    }

    pub fn has_health_pool(&self) -> bool {
        matches!(self.obstacle_rule, ObstacleRule::Damage { .. })
    }

    /// Spawn interval for the obstacle class at the given speed
    pub fn obstacle_interval_at(&self, speed: f32) -> Option<f32> {
        self.obstacle_interval.map(|base| base / speed.max(f32::EPSILON))
    }
}
