//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (spawn order, by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod movement;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod variant;

pub use collision::{CollisionOutcome, Effect, check_collisions, overlaps, overlaps_swept};
pub use entity::{
    ActiveEffects, Bounds, CollectibleKind, Entity, EntityClass, EntityId, EntityKind,
    ObstacleKind, Player, PowerUpKind, Projectile,
};
pub use movement::{Retirement, advance, retire};
pub use scoring::{ScoringResult, SessionStats, final_score, multiplier};
pub use spawner::{SpawnPlan, SpawnRequest, Spawner};
pub use state::{BASE_SPEED, GameStatus, Session};
pub use tick::{TickInput, TickReport, tick};
pub use variant::{InvincibleContact, MovementStyle, ObstacleRule, Variant, VariantRules};
