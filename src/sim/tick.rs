//! Simulation tick
//!
//! One call advances a playing session by `dt` seconds in a fixed order:
//! spawn, move, collide (then retire), score, then the difficulty ramp.
//! Nothing is mutated if the inputs or the live entities are malformed.

use glam::{Vec2, Vec3};

use super::collision::{Effect, check_collisions, projectile_hits, remove_consumed};
use super::entity::{EntityId, PowerUpKind, Projectile};
use super::movement::{MoveParams, advance, advance_projectiles, move_player, retire};
use super::spawner::SpawnContext;
use super::state::Session;
use crate::consts::*;
use crate::error::{EngineError, Result};

/// Player intents for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Net lane change this tick (-1 left, +1 right)
    pub lane_shift: i8,
    /// Jump (runner variants)
    pub jump: bool,
    /// Fire a projectile (shooter)
    pub fire: bool,
    /// Continuous movement axis, x lateral and y toward the far plane
    pub axis: Vec2,
    /// Pointer target in world (x, depth), overrides `axis`
    pub pointer: Option<Vec2>,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Vec<EntityId>,
    pub retired: Vec<EntityId>,
    pub effects: Vec<Effect>,
    /// (projectile, enemy) pairs destroyed this tick
    pub kills: Vec<(EntityId, EntityId)>,
    pub expired: Vec<PowerUpKind>,
    /// The run ended during this tick
    pub ended: bool,
}

/// Advance a playing session by one step; no-op unless `Playing`
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> Result<TickReport> {
    if !session.is_playing() {
        return Ok(TickReport::default());
    }
    if !dt.is_finite() || dt < 0.0 {
        return Err(EngineError::InvalidDelta(dt));
    }
    session.validate()?;

    let mut report = TickReport::default();
    session.ticks += 1;
    session.elapsed += dt;
    let now = session.elapsed;

    // Timed effects expire on the tick, never from a detached callback
    report.expired = session.player.effects.expire(now);
    if session.player.invincible_until.is_some_and(|t| t <= now) {
        session.player.invincible_until = None;
    }

    // --- SPAWN ---
    let ctx = SpawnContext {
        dt,
        elapsed: now,
        speed: session.speed,
        tick: session.ticks,
        live: &session.entities,
    };
    let spawned = session
        .spawner
        .spawn_tick(&ctx, &session.rules, &mut session.rng, &mut session.ids);
    report.spawned = spawned.iter().map(|e| e.id).collect();
    session.entities.extend(spawned);

    // --- MOVE ---
    move_player(&mut session.player, input, &session.rules, dt);
    fire(session, input, dt);

    let boost = if session.player.effects.is_active(PowerUpKind::SpeedBoost, now) {
        SPEED_BOOST_FACTOR
    } else {
        1.0
    };
    let params = MoveParams {
        speed: session.speed,
        dt,
        elapsed: now,
        boost,
        magnet_target: session
            .player
            .effects
            .is_active(PowerUpKind::Magnet, now)
            .then_some(session.player.pos.x),
    };
    let step = advance(&mut session.entities, &session.rules, &params);
    let shot_step = PROJECTILE_SPEED * dt;
    advance_projectiles(&mut session.projectiles, dt, session.rules.spawn_depth);

    // --- COLLIDE ---
    // Every effect is applied as soon as it is found, oldest entity first
    if session.rules.fires {
        report.kills = projectile_hits(&session.projectiles, &session.entities, step + shot_step);
        let shots: Vec<EntityId> = report.kills.iter().map(|(p, _)| *p).collect();
        let enemies: Vec<EntityId> = report.kills.iter().map(|(_, e)| *e).collect();
        session.projectiles.retain(|p| !shots.contains(&p.id));
        remove_consumed(&mut session.entities, &enemies);
        for _ in &report.kills {
            session.score.add_points(session.rules.kill_points);
            session.stats.enemies_destroyed += 1;
        }
    }

    let outcome = check_collisions(&session.player, &session.entities, &session.rules, now, step);
    remove_consumed(&mut session.entities, &outcome.consumed);
    for effect in &outcome.effects {
        apply_effect(session, *effect, now);
    }
    report.effects = outcome.effects;

    let retirement = retire(&mut session.entities, &session.rules);
    session.stats.obstacles_passed += retirement.obstacles_passed;
    report.retired = retirement.ids;

    // --- SCORE ---
    if session.is_playing() {
        session.score.add_distance(step, session.rules.distance_points);

        // Difficulty ramp
        session.speed += session.rules.speed_accel * dt;
    } else {
        report.ended = true;
    }

    Ok(report)
}

/// Apply one contact; a lethal hit ends the run and drops everything after it
fn apply_effect(session: &mut Session, effect: Effect, now: f32) {
    if !session.is_playing() {
        return;
    }
    match effect {
        Effect::Damage => {
            session.stats.hits_taken += 1;
            session.player.health = session.player.health.saturating_sub(1);
            if session.player.health == 0 {
                session.end();
            } else {
                session.player.invincible_until = Some(now + session.rules.invincibility_secs);
                log::debug!("Hit, {} health left", session.player.health);
            }
        }
        Effect::EndSession => {
            session.stats.hits_taken += 1;
            session.player.health = 0;
            session.end();
        }
        Effect::ActivatePowerUp(kind) => {
            session.stats.power_ups_taken += 1;
            session
                .player
                .effects
                .activate(kind, now, session.rules.power_up_secs);
            log::debug!("Power-up {:?} until {:.2}", kind, now + session.rules.power_up_secs);
        }
        Effect::CollectScore(value) => {
            session.score.add_points(value);
            session.stats.items_collected += 1;
        }
    }
}

fn fire(session: &mut Session, input: &TickInput, dt: f32) {
    if !session.rules.fires {
        return;
    }
    session.player.fire_cooldown = (session.player.fire_cooldown - dt).max(0.0);
    if input.fire && session.player.fire_cooldown <= 0.0 {
        let id = session.next_entity_id();
        let origin = session.player.pos + Vec3::Z * session.player.bounds.depth_extent();
        session.projectiles.push(Projectile {
            id,
            pos: origin,
            radius: PROJECTILE_RADIUS,
        });
        session.player.fire_cooldown = FIRE_COOLDOWN;
    }
}
