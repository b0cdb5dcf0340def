//! Entity and player records
//!
//! Passive data only. Spawning, movement and collision live in their own
//! modules and mutate these records during a tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::is_finite_vec;

/// Stable per-session entity identifier; ids grow with spawn order
pub type EntityId = u32;

/// Obstacle variants (runner walls and shooter enemies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low hurdle, can be jumped
    Barrier,
    /// Full-height wall, must change lane
    LaserWall,
    Crate,
    /// Shooter enemy
    Drone,
    /// Shooter enemy, larger
    Asteroid,
}

/// Timed power-up variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
    Magnet,
}

/// Score pickup variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Gem,
    Crystal,
}

impl CollectibleKind {
    /// Points granted on pickup
    pub fn value(&self) -> u32 {
        match self {
            CollectibleKind::Coin => 10,
            CollectibleKind::Gem => 50,
            CollectibleKind::Crystal => 10,
        }
    }
}

/// Coarse entity class, used to pick spawn timers and caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityClass {
    Obstacle,
    PowerUp,
    Collectible,
}

/// Tagged entity kind; the payload is the behavioral subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    PowerUp(PowerUpKind),
    Collectible { kind: CollectibleKind, value: u32 },
}

impl EntityKind {
    pub fn collectible(kind: CollectibleKind) -> Self {
        EntityKind::Collectible {
            kind,
            value: kind.value(),
        }
    }

    pub fn class(&self) -> EntityClass {
        match self {
            EntityKind::Obstacle(_) => EntityClass::Obstacle,
            EntityKind::PowerUp(_) => EntityClass::PowerUp,
            EntityKind::Collectible { .. } => EntityClass::Collectible,
        }
    }

    /// Snake-case subtype name, as reported to renderers and logs
    pub fn subtype_name(&self) -> &'static str {
        match self {
            EntityKind::Obstacle(ObstacleKind::Barrier) => "barrier",
            EntityKind::Obstacle(ObstacleKind::LaserWall) => "laser_wall",
            EntityKind::Obstacle(ObstacleKind::Crate) => "crate",
            EntityKind::Obstacle(ObstacleKind::Drone) => "drone",
            EntityKind::Obstacle(ObstacleKind::Asteroid) => "asteroid",
            EntityKind::PowerUp(PowerUpKind::SpeedBoost) => "speed_boost",
            EntityKind::PowerUp(PowerUpKind::Shield) => "shield",
            EntityKind::PowerUp(PowerUpKind::Magnet) => "magnet",
            EntityKind::Collectible { kind: CollectibleKind::Coin, .. } => "coin",
            EntityKind::Collectible { kind: CollectibleKind::Gem, .. } => "gem",
            EntityKind::Collectible { kind: CollectibleKind::Crystal, .. } => "crystal",
        }
    }

    /// Collision volume for this subtype
    pub fn bounds(&self) -> Bounds {
        match self {
            EntityKind::Obstacle(ObstacleKind::Barrier) => Bounds::aabb(0.8, 0.4, 0.5),
            EntityKind::Obstacle(ObstacleKind::LaserWall) => Bounds::aabb(0.9, 1.5, 0.2),
            EntityKind::Obstacle(ObstacleKind::Crate) => Bounds::aabb(0.7, 0.7, 0.5),
            EntityKind::Obstacle(ObstacleKind::Drone) => Bounds::Sphere { radius: 0.6 },
            EntityKind::Obstacle(ObstacleKind::Asteroid) => Bounds::Sphere { radius: 0.9 },
            EntityKind::PowerUp(_) => Bounds::Sphere { radius: 0.5 },
            EntityKind::Collectible { kind: CollectibleKind::Coin, .. } => {
                Bounds::Sphere { radius: 0.4 }
            }
            EntityKind::Collectible { kind: CollectibleKind::Gem, .. } => {
                Bounds::Sphere { radius: 0.5 }
            }
            EntityKind::Collectible { kind: CollectibleKind::Crystal, .. } => {
                Bounds::Sphere { radius: 0.6 }
            }
        }
    }

    /// Height of the entity center above the ground plane in lane variants
    pub fn rest_height(&self) -> f32 {
        match self.bounds() {
            Bounds::Box { half } if self.class() == EntityClass::Obstacle => half.y,
            _ => 0.8,
        }
    }

    /// Pickups spin and bob; obstacles are static
    pub fn is_animated(&self) -> bool {
        self.class() != EntityClass::Obstacle
    }
}

/// Collision volume, centered on the owner's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// Axis-aligned box given by half extents
    Box { half: Vec3 },
    Sphere { radius: f32 },
}

impl Bounds {
    pub fn aabb(hx: f32, hy: f32, hz: f32) -> Self {
        Bounds::Box {
            half: Vec3::new(hx, hy, hz),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Bounds::Box { half } => is_finite_vec(*half),
            Bounds::Sphere { radius } => radius.is_finite(),
        }
    }

    /// Half extent along the depth axis
    pub fn depth_extent(&self) -> f32 {
        match self {
            Bounds::Box { half } => half.z,
            Bounds::Sphere { radius } => *radius,
        }
    }
}

/// A simulated obstacle, power-up or collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Lane index for lane variants, None for continuous variants
    pub lane: Option<u8>,
    /// Collision position (x lateral, y vertical, z depth)
    pub pos: Vec3,
    pub bounds: Bounds,
    /// Session time at spawn
    pub spawned_at: f32,
    /// Cosmetic rotation (radians)
    #[serde(default)]
    pub spin: f32,
    /// Cosmetic vertical offset, never read by collision
    #[serde(default)]
    pub bob: f32,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, lane: Option<u8>, pos: Vec3, spawned_at: f32) -> Self {
        Self {
            id,
            kind,
            lane,
            pos,
            bounds: kind.bounds(),
            spawned_at,
            spin: 0.0,
            bob: 0.0,
        }
    }

    pub fn class(&self) -> EntityClass {
        self.kind.class()
    }

    /// Position the renderer should draw at (collision position plus bob)
    pub fn render_pos(&self) -> Vec3 {
        self.pos + Vec3::Y * self.bob
    }

    /// Finite position and bounds
    pub fn is_well_formed(&self) -> bool {
        is_finite_vec(self.pos) && self.bounds.is_finite()
    }
}

/// Shooter projectile, travels away from the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec3,
    pub radius: f32,
}

/// Active power-up effects, stored as expiry timestamps on the session clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub speed_boost_until: Option<f32>,
    pub shield_until: Option<f32>,
    pub magnet_until: Option<f32>,
}

impl ActiveEffects {
    fn slot(&mut self, kind: PowerUpKind) -> &mut Option<f32> {
        match kind {
            PowerUpKind::SpeedBoost => &mut self.speed_boost_until,
            PowerUpKind::Shield => &mut self.shield_until,
            PowerUpKind::Magnet => &mut self.magnet_until,
        }
    }

    /// Start or refresh an effect; a refresh never shortens the remaining time
    pub fn activate(&mut self, kind: PowerUpKind, now: f32, duration: f32) {
        let expires = now + duration.max(0.0);
        let slot = self.slot(kind);
        *slot = Some(slot.map_or(expires, |t| t.max(expires)));
    }

    pub fn is_active(&self, kind: PowerUpKind, now: f32) -> bool {
        let until = match kind {
            PowerUpKind::SpeedBoost => self.speed_boost_until,
            PowerUpKind::Shield => self.shield_until,
            PowerUpKind::Magnet => self.magnet_until,
        };
        until.is_some_and(|t| t > now)
    }

    /// Drop every effect whose expiry is at or before `now`; returns the expired kinds
    pub fn expire(&mut self, now: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in [PowerUpKind::SpeedBoost, PowerUpKind::Shield, PowerUpKind::Magnet] {
            let slot = self.slot(kind);
            if slot.is_some_and(|t| t <= now) {
                *slot = None;
                expired.push(kind);
            }
        }
        expired
    }

    pub fn is_empty(&self) -> bool {
        self.speed_boost_until.is_none() && self.shield_until.is_none() && self.magnet_until.is_none()
    }
}

/// The player (one per session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Lane index for lane variants
    pub lane: Option<u8>,
    pub pos: Vec3,
    /// Vertical velocity while airborne (runner variants)
    pub vel_y: f32,
    pub bounds: Bounds,
    pub health: u8,
    /// Damage immunity expiry on the session clock
    pub invincible_until: Option<f32>,
    pub effects: ActiveEffects,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
}

impl Player {
    pub fn new(lane: Option<u8>, pos: Vec3, bounds: Bounds, health: u8) -> Self {
        Self {
            lane,
            pos,
            vel_y: 0.0,
            bounds,
            health,
            invincible_until: None,
            effects: ActiveEffects::default(),
            fire_cooldown: 0.0,
        }
    }

    /// Immune to obstacle damage (post-hit window or shield)
    pub fn is_invincible(&self, now: f32) -> bool {
        self.invincible_until.is_some_and(|t| t > now)
            || self.effects.is_active(PowerUpKind::Shield, now)
    }

    pub fn is_grounded(&self, ground: f32) -> bool {
        self.pos.y <= ground && self.vel_y <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_refresh_never_shortens() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::Magnet, 0.0, 5.0);
        effects.activate(PowerUpKind::Magnet, 1.0, 2.0);
        assert_eq!(effects.magnet_until, Some(5.0));
        effects.activate(PowerUpKind::Magnet, 4.0, 5.0);
        assert_eq!(effects.magnet_until, Some(9.0));
    }

    #[test]
    fn test_effect_expiry_is_inclusive() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::Shield, 0.0, 2.0);
        effects.activate(PowerUpKind::SpeedBoost, 0.0, 3.0);
        assert!(effects.is_active(PowerUpKind::Shield, 1.9));
        assert!(!effects.is_active(PowerUpKind::Shield, 2.0));

        let expired = effects.expire(2.0);
        assert_eq!(expired, vec![PowerUpKind::Shield]);
        assert!(effects.shield_until.is_none());
        assert!(effects.speed_boost_until.is_some());
    }

    #[test]
    fn test_shield_counts_as_invincible() {
        let mut player = Player::new(Some(1), Vec3::ZERO, Bounds::aabb(0.4, 0.5, 0.4), 3);
        assert!(!player.is_invincible(0.0));
        player.effects.activate(PowerUpKind::Shield, 0.0, 1.0);
        assert!(player.is_invincible(0.5));
        assert!(!player.is_invincible(1.0));
    }

    #[test]
    fn test_bob_does_not_move_collision_position() {
        let mut entity = Entity::new(
            1,
            EntityKind::collectible(CollectibleKind::Gem),
            Some(0),
            Vec3::new(0.0, 0.8, 10.0),
            0.0,
        );
        entity.bob = 0.3;
        assert_eq!(entity.pos.y, 0.8);
        assert!((entity.render_pos().y - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_subtype_names_and_values() {
        assert_eq!(EntityKind::Obstacle(ObstacleKind::LaserWall).subtype_name(), "laser_wall");
        assert_eq!(EntityKind::PowerUp(PowerUpKind::SpeedBoost).subtype_name(), "speed_boost");
        assert_eq!(EntityKind::collectible(CollectibleKind::Coin), EntityKind::Collectible {
            kind: CollectibleKind::Coin,
            value: 10
        });
        assert_eq!(CollectibleKind::Gem.value(), 50);
    }
}
