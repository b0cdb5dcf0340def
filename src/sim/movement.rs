//! Per-tick movement
//!
//! Entities approach the player along the depth axis. Retirement runs after
//! the collide step and rebuilds the live set in one pass (partition), so
//! removing one entity can never cause its neighbour to be skipped.

use glam::Vec3;

use super::entity::{Entity, EntityClass, EntityId, Player, Projectile};
use super::tick::TickInput;
use super::variant::{MovementStyle, VariantRules};
use crate::consts::*;
use crate::lane_to_x;

/// Cosmetic spin rate for pickups (radians/s)
const SPIN_RATE: f32 = 3.0;
/// Cosmetic bob amplitude (units) and angular frequency (radians/s)
const BOB_AMPLITUDE: f32 = 0.15;
const BOB_FREQUENCY: f32 = 4.0;

/// Inputs for one movement pass
#[derive(Debug, Clone, Copy)]
pub struct MoveParams {
    pub speed: f32,
    pub dt: f32,
    /// Session time, drives the cosmetic bob
    pub elapsed: f32,
    /// Approach multiplier from the speed boost power-up
    pub boost: f32,
    /// Player x when the magnet is active
    pub magnet_target: Option<f32>,
}

/// Entities removed by a movement pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retirement {
    pub ids: Vec<EntityId>,
    /// Obstacles that passed the player unconsumed
    pub obstacles_passed: u32,
}

/// Depth every entity travels in one pass
fn approach_step(rules: &VariantRules, params: &MoveParams) -> f32 {
    rules.approach_rate * params.speed * params.boost * params.dt
}

/// Advance every live entity; returns the depth step applied
pub fn advance(entities: &mut [Entity], rules: &VariantRules, params: &MoveParams) -> f32 {
    let step = approach_step(rules, params);

    for entity in entities.iter_mut() {
        entity.pos.z -= step;

        if entity.kind.is_animated() {
            entity.spin = (entity.spin + SPIN_RATE * params.dt) % std::f32::consts::TAU;
            // Phase from spawn time so neighbours don't bob in lockstep
            let age = params.elapsed - entity.spawned_at;
            entity.bob = BOB_AMPLITUDE * (age * BOB_FREQUENCY).sin();
        }

        if let Some(target_x) = params.magnet_target {
            if entity.class() == EntityClass::Collectible
                && (entity.pos.z - PLAYER_DEPTH).abs() < MAGNET_RANGE
            {
                let dx = target_x - entity.pos.x;
                let pull = MAGNET_PULL * params.dt;
                entity.pos.x += dx.clamp(-pull, pull);
            }
        }
    }
    step
}

/// Remove entities past the retirement depth
pub fn retire(entities: &mut Vec<Entity>, rules: &VariantRules) -> Retirement {
    let (live, retired): (Vec<Entity>, Vec<Entity>) = std::mem::take(entities)
        .into_iter()
        .partition(|e| e.pos.z >= rules.retire_depth);
    *entities = live;

    let retirement = Retirement {
        obstacles_passed: retired
            .iter()
            .filter(|e| e.class() == EntityClass::Obstacle)
            .count() as u32,
        ids: retired.iter().map(|e| e.id).collect(),
    };
    if !retirement.ids.is_empty() {
        log::debug!("Retired {:?}", retirement.ids);
    }
    retirement
}

/// Move projectiles away from the player; drop those past `far`
pub fn advance_projectiles(projectiles: &mut Vec<Projectile>, dt: f32, far: f32) {
    for projectile in projectiles.iter_mut() {
        projectile.pos.z += PROJECTILE_SPEED * dt;
    }
    projectiles.retain(|p| p.pos.z <= far);
}

/// Ground height of the player center for the variant
pub fn player_ground(rules: &VariantRules) -> f32 {
    match (rules.movement, rules.player_bounds) {
        (MovementStyle::Lanes { .. }, super::entity::Bounds::Box { half }) => half.y,
        _ => 0.0,
    }
}

/// Starting player position for the variant
pub fn player_start(rules: &VariantRules) -> (Option<u8>, Vec3) {
    match rules.movement {
        MovementStyle::Lanes { lanes } => {
            let lane = lanes.max(1) / 2;
            (
                Some(lane),
                Vec3::new(lane_to_x(lane, lanes), player_ground(rules), PLAYER_DEPTH),
            )
        }
        MovementStyle::Arena { near, far, .. } => {
            let z = PLAYER_DEPTH.clamp(near.min(far), far.max(near));
            (None, Vec3::new(0.0, 0.0, z))
        }
    }
}

/// Apply one tick of player input and vertical physics
pub fn move_player(player: &mut Player, input: &TickInput, rules: &VariantRules, dt: f32) {
    match rules.movement {
        MovementStyle::Lanes { lanes } => {
            let current = player.lane.unwrap_or(0) as i16;
            let max_lane = lanes.max(1) as i16 - 1;
            let lane = (current + input.lane_shift as i16).clamp(0, max_lane) as u8;
            player.lane = Some(lane);
            player.pos.x = lane_to_x(lane, lanes);

            let ground = player_ground(rules);
            if rules.jumps && input.jump && player.is_grounded(ground) {
                player.vel_y = JUMP_VELOCITY;
            }
            if player.pos.y > ground || player.vel_y > 0.0 {
                player.vel_y -= GRAVITY * dt;
                player.pos.y += player.vel_y * dt;
                if player.pos.y <= ground {
                    player.pos.y = ground;
                    player.vel_y = 0.0;
                }
            }
        }
        MovementStyle::Arena {
            half_width,
            near,
            far,
        } => {
            let max_step = rules.player_speed * dt;
            let delta = match input.pointer {
                Some(target) => {
                    let to_target = Vec3::new(target.x - player.pos.x, 0.0, target.y - player.pos.z);
                    to_target.clamp_length_max(max_step)
                }
                None => Vec3::new(input.axis.x, 0.0, input.axis.y).clamp_length_max(1.0) * max_step,
            };
            player.pos.x = (player.pos.x + delta.x).clamp(-half_width, half_width);
            player.pos.z = (player.pos.z + delta.z).clamp(near.min(far), far.max(near));
        }
    }
}
