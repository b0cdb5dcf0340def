//! Collision detection
//!
//! Overlap tests are axis-aligned boxes and spheres only. Detection is pure:
//! it reports effects and the entities they consume, and the tick applies
//! them afterwards in spawn order.
//!
//! Entities move a whole step per tick, so the player test is swept along
//! depth: an entity counts as touching if any point of the span it covered
//! this tick overlaps the player.

use glam::Vec3;

use crate::consts::PLAYER_DEPTH;

use super::entity::{Bounds, Entity, EntityId, EntityKind, Player, PowerUpKind, Projectile};
use super::variant::{InvincibleContact, ObstacleRule, VariantRules};

/// Outcome of a single player/entity contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Lose one health
    Damage,
    /// Run ends immediately (one-hit variants)
    EndSession,
    ActivatePowerUp(PowerUpKind),
    CollectScore(u32),
}

/// Effects for one tick, in spawn order, plus the ids they consumed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    pub effects: Vec<Effect>,
    pub consumed: Vec<EntityId>,
}

/// Strict overlap test between two volumes (touching is not overlapping)
pub fn overlaps(a_pos: Vec3, a: &Bounds, b_pos: Vec3, b: &Bounds) -> bool {
    match (a, b) {
        (Bounds::Box { half: ha }, Bounds::Box { half: hb }) => {
            let d = (a_pos - b_pos).abs();
            let reach = *ha + *hb;
            d.x < reach.x && d.y < reach.y && d.z < reach.z
        }
        (Bounds::Sphere { radius: ra }, Bounds::Sphere { radius: rb }) => {
            let reach = ra + rb;
            a_pos.distance_squared(b_pos) < reach * reach
        }
        (Bounds::Box { half }, Bounds::Sphere { radius }) => {
            sphere_box_overlap(b_pos, *radius, a_pos, *half)
        }
        (Bounds::Sphere { radius }, Bounds::Box { half }) => {
            sphere_box_overlap(a_pos, *radius, b_pos, *half)
        }
    }
}

fn sphere_box_overlap(center: Vec3, radius: f32, box_pos: Vec3, half: Vec3) -> bool {
    let closest = center.clamp(box_pos - half, box_pos + half);
    center.distance_squared(closest) < radius * radius
}

/// Overlap test for an entity that moved `sweep` units toward the player
///
/// The entity covered depths `[z, z + sweep]` this tick; the test uses the
/// point of that span closest to the player.
pub fn overlaps_swept(player_pos: Vec3, player: &Bounds, entity_pos: Vec3, entity: &Bounds, sweep: f32) -> bool {
    let mut closest = entity_pos;
    if sweep > 0.0 {
        closest.z = player_pos.z.clamp(entity_pos.z, entity_pos.z + sweep);
    }
    overlaps(player_pos, player, closest, entity)
}

/// Test the player against every live entity
///
/// Entities must be in spawn order and `sweep` is how far each one moved this
/// tick. Effects unfold in that order: a hit or a shield picked up earlier in
/// the pass makes the player invincible for later obstacles.
pub fn check_collisions(
    player: &Player,
    entities: &[Entity],
    rules: &VariantRules,
    now: f32,
    sweep: f32,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let mut invincible = player.is_invincible(now);

    for entity in entities {
        let is_obstacle = matches!(entity.kind, EntityKind::Obstacle(_));
        // Enemy crossed the player's plane without being shot down
        if is_obstacle && rules.breach_ends_run && entity.pos.z < PLAYER_DEPTH {
            outcome.effects.push(Effect::EndSession);
            outcome.consumed.push(entity.id);
            continue;
        }
        if !overlaps_swept(player.pos, &player.bounds, entity.pos, &entity.bounds, sweep) {
            continue;
        }

        match entity.kind {
            EntityKind::Obstacle(_) => match rules.obstacle_rule {
                ObstacleRule::Ignore => {}
                ObstacleRule::EndSession => {
                    outcome.effects.push(Effect::EndSession);
                    outcome.consumed.push(entity.id);
                }
                ObstacleRule::Damage { while_invincible } => {
                    if !invincible {
                        outcome.effects.push(Effect::Damage);
                        outcome.consumed.push(entity.id);
                        invincible = true;
                    } else if while_invincible == InvincibleContact::Consume {
                        outcome.consumed.push(entity.id);
                    }
                }
            },
            EntityKind::PowerUp(kind) => {
                outcome.effects.push(Effect::ActivatePowerUp(kind));
                outcome.consumed.push(entity.id);
                if kind == PowerUpKind::Shield {
                    invincible = true;
                }
            }
            EntityKind::Collectible { value, .. } => {
                outcome.effects.push(Effect::CollectScore(value));
                outcome.consumed.push(entity.id);
            }
        }
    }

    outcome
}

/// Pair projectiles with the enemies they hit (radius test)
///
/// `closing` is how far each projectile and enemy approached one another along
/// depth this tick; the test uses their closest separation over that span.
/// Each projectile and each enemy is used at most once; enemies are matched
/// in spawn order against the oldest projectile that reaches them.
pub fn projectile_hits(
    projectiles: &[Projectile],
    entities: &[Entity],
    closing: f32,
) -> Vec<(EntityId, EntityId)> {
    let mut hits = Vec::new();
    let mut spent: Vec<EntityId> = Vec::new();

    for enemy in entities.iter().filter(|e| matches!(e.kind, EntityKind::Obstacle(_))) {
        let enemy_radius = match enemy.bounds {
            Bounds::Sphere { radius } => radius,
            Bounds::Box { half } => half.x.max(half.z),
        };
        let hit = projectiles.iter().find(|p| {
            !spent.contains(&p.id) && {
                let reach = p.radius + enemy_radius;
                let end = p.pos.z - enemy.pos.z;
                let start = end - closing.max(0.0);
                let dz = 0.0f32.clamp(start, end);
                let lateral = (p.pos - enemy.pos).truncate().length_squared();
                lateral + dz * dz < reach * reach
            }
        });
        if let Some(projectile) = hit {
            spent.push(projectile.id);
            hits.push((projectile.id, enemy.id));
        }
    }

    hits
}

/// Drop every entity whose id is listed, in one pass
pub fn remove_consumed(entities: &mut Vec<Entity>, consumed: &[EntityId]) {
    if consumed.is_empty() {
        return;
    }
    entities.retain(|e| !consumed.contains(&e.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectibleKind, ObstacleKind};
    use crate::sim::variant::Variant;

    fn lane_player() -> Player {
        Player::new(Some(1), Vec3::new(0.0, 0.5, 0.0), Bounds::aabb(0.4, 0.5, 0.4), 3)
    }

    fn at(id: EntityId, kind: EntityKind, z: f32) -> Entity {
        Entity::new(id, kind, Some(1), Vec3::new(0.0, kind.rest_height(), z), 0.0)
    }

    #[test]
    fn test_box_overlap_is_strict() {
        let a = Bounds::aabb(0.5, 0.5, 0.5);
        assert!(overlaps(Vec3::ZERO, &a, Vec3::new(0.99, 0.0, 0.0), &a));
        assert!(!overlaps(Vec3::ZERO, &a, Vec3::new(1.0, 0.0, 0.0), &a));
        assert!(!overlaps(Vec3::ZERO, &a, Vec3::new(0.5, 2.0, 0.0), &a));
    }

    #[test]
    fn test_sphere_box_overlap_uses_closest_point() {
        let cube = Bounds::aabb(1.0, 1.0, 1.0);
        let ball = Bounds::Sphere { radius: 0.5 };
        assert!(overlaps(Vec3::ZERO, &cube, Vec3::new(1.4, 0.0, 0.0), &ball));
        // Corner gap: distance to corner is sqrt(2)*0.4 > 0.5
        assert!(!overlaps(Vec3::ZERO, &cube, Vec3::new(1.4, 1.4, 0.0), &ball));
        assert!(overlaps(Vec3::new(1.4, 0.0, 0.0), &ball, Vec3::ZERO, &cube));
    }

    #[test]
    fn test_jumping_player_clears_barrier_not_laser_wall() {
        let rules = Variant::Runner.rules();
        let mut player = lane_player();
        player.pos.y = 1.5;
        let barrier = at(1, EntityKind::Obstacle(ObstacleKind::Barrier), 0.0);
        let wall = at(2, EntityKind::Obstacle(ObstacleKind::LaserWall), 0.0);

        assert!(check_collisions(&player, &[barrier], &rules, 0.0, 0.0).effects.is_empty());
        assert_eq!(
            check_collisions(&player, &[wall], &rules, 0.0, 0.0).effects,
            vec![Effect::EndSession]
        );
    }

    #[test]
    fn test_damage_then_ghost_through_in_same_tick() {
        let rules = Variant::LaneRunner.rules();
        let player = lane_player();
        let entities = vec![
            at(1, EntityKind::Obstacle(ObstacleKind::Crate), 0.0),
            at(2, EntityKind::Obstacle(ObstacleKind::Crate), 0.3),
        ];
        let outcome = check_collisions(&player, &entities, &rules, 0.0, 0.0);
        assert_eq!(outcome.effects, vec![Effect::Damage]);
        assert_eq!(outcome.consumed, vec![1]);
    }

    #[test]
    fn test_invincible_player_ghosts_through() {
        let rules = Variant::LaneRunner.rules();
        let mut player = lane_player();
        player.invincible_until = Some(2.0);
        let entities = vec![at(1, EntityKind::Obstacle(ObstacleKind::Crate), 0.0)];

        let outcome = check_collisions(&player, &entities, &rules, 1.0, 0.0);
        assert!(outcome.effects.is_empty());
        assert!(outcome.consumed.is_empty());

        // Window has closed
        let outcome = check_collisions(&player, &entities, &rules, 2.0, 0.0);
        assert_eq!(outcome.effects, vec![Effect::Damage]);
    }

    #[test]
    fn test_consume_while_invincible_rule() {
        let mut rules = Variant::LaneRunner.rules();
        rules.obstacle_rule = ObstacleRule::Damage {
            while_invincible: InvincibleContact::Consume,
        };
        let mut player = lane_player();
        player.invincible_until = Some(2.0);
        let entities = vec![at(1, EntityKind::Obstacle(ObstacleKind::Crate), 0.0)];
        let outcome = check_collisions(&player, &entities, &rules, 1.0, 0.0);
        assert!(outcome.effects.is_empty());
        assert_eq!(outcome.consumed, vec![1]);
    }

    #[test]
    fn test_pickups_consumed_even_when_invincible_in_spawn_order() {
        let rules = Variant::LaneRunner.rules();
        let mut player = lane_player();
        player.invincible_until = Some(10.0);
        let entities = vec![
            at(3, EntityKind::collectible(CollectibleKind::Gem), 0.1),
            at(5, EntityKind::PowerUp(PowerUpKind::Magnet), 0.0),
            at(8, EntityKind::collectible(CollectibleKind::Coin), -0.1),
        ];
        let outcome = check_collisions(&player, &entities, &rules, 0.0, 0.0);
        assert_eq!(
            outcome.effects,
            vec![
                Effect::CollectScore(50),
                Effect::ActivatePowerUp(PowerUpKind::Magnet),
                Effect::CollectScore(10),
            ]
        );
        assert_eq!(outcome.consumed, vec![3, 5, 8]);
    }

    #[test]
    fn test_collector_ignores_obstacles() {
        let rules = Variant::Collector.rules();
        let player = Player::new(None, Vec3::ZERO, rules.player_bounds, 1);
        let entities = vec![Entity::new(
            1,
            EntityKind::Obstacle(ObstacleKind::Asteroid),
            None,
            Vec3::ZERO,
            0.0,
        )];
        assert_eq!(check_collisions(&player, &entities, &rules, 0.0, 0.0), CollisionOutcome::default());
    }

    #[test]
    fn test_projectile_hits_use_each_side_once() {
        let drone = |id, x| {
            Entity::new(id, EntityKind::Obstacle(ObstacleKind::Drone), None, Vec3::new(x, 0.0, 10.0), 0.0)
        };
        let shot = |id, x| Projectile {
            id,
            pos: Vec3::new(x, 0.0, 10.0),
            radius: 0.3,
        };
        let entities = vec![drone(1, 0.0), drone(2, 0.5), drone(3, 5.0)];
        let projectiles = vec![shot(10, 0.2)];
        assert_eq!(projectile_hits(&projectiles, &entities, 0.0), vec![(10, 1)]);

        let projectiles = vec![shot(10, 0.2), shot(11, 0.4)];
        assert_eq!(projectile_hits(&projectiles, &entities, 0.0), vec![(10, 1), (11, 2)]);
    }

    #[test]
    fn test_remove_consumed() {
        let mut entities: Vec<Entity> = (1..=5)
            .map(|id| at(id, EntityKind::collectible(CollectibleKind::Coin), id as f32))
            .collect();
        remove_consumed(&mut entities, &[2, 3, 5]);
        let ids: Vec<_> = entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_shield_earlier_in_spawn_order_protects_same_tick() {
        let rules = Variant::LaneRunner.rules();
        let player = lane_player();
        let entities = vec![
            at(1, EntityKind::PowerUp(PowerUpKind::Shield), 0.1),
            at(2, EntityKind::Obstacle(ObstacleKind::Crate), 0.0),
        ];
        let outcome = check_collisions(&player, &entities, &rules, 0.0, 0.0);
        assert_eq!(outcome.effects, vec![Effect::ActivatePowerUp(PowerUpKind::Shield)]);
        assert_eq!(outcome.consumed, vec![1]);

        // A shield that comes after the crate is too late
        let entities = vec![
            at(1, EntityKind::Obstacle(ObstacleKind::Crate), 0.0),
            at(2, EntityKind::PowerUp(PowerUpKind::Shield), 0.1),
        ];
        let outcome = check_collisions(&player, &entities, &rules, 0.0, 0.0);
        assert_eq!(
            outcome.effects,
            vec![Effect::Damage, Effect::ActivatePowerUp(PowerUpKind::Shield)]
        );
    }

    #[test]
    fn test_swept_contact_catches_fast_walls() {
        let rules = Variant::Runner.rules();
        let player = lane_player();
        // Wall jumped from z = 1.5 to z = -0.9 in one step
        let wall = at(1, EntityKind::Obstacle(ObstacleKind::LaserWall), -0.9);
        assert!(check_collisions(&player, &[wall.clone()], &rules, 0.0, 0.0).effects.is_empty());
        assert_eq!(
            check_collisions(&player, &[wall.clone()], &rules, 0.0, 2.4).effects,
            vec![Effect::EndSession]
        );
        // Still ahead of the player after the step: the span doesn't reach it
        let ahead = at(2, EntityKind::Obstacle(ObstacleKind::LaserWall), 1.0);
        assert!(check_collisions(&player, &[ahead], &rules, 0.0, 2.4).effects.is_empty());
    }

    #[test]
    fn test_shooter_breach_ends_run_anywhere_on_the_plane() {
        let rules = Variant::Shooter.rules();
        let player = Player::new(None, Vec3::ZERO, rules.player_bounds, 1);
        let far_side = Entity::new(
            4,
            EntityKind::Obstacle(ObstacleKind::Drone),
            None,
            Vec3::new(7.0, 0.0, -0.1),
            0.0,
        );
        let outcome = check_collisions(&player, &[far_side], &rules, 0.0, 0.0);
        assert_eq!(outcome.effects, vec![Effect::EndSession]);
        assert_eq!(outcome.consumed, vec![4]);
    }

    #[test]
    fn test_fast_projectile_does_not_skip_enemy() {
        let drone = Entity::new(
            1,
            EntityKind::Obstacle(ObstacleKind::Drone),
            None,
            Vec3::new(0.0, 0.0, 10.0),
            0.0,
        );
        // Shot ended 3 units past the drone after a 4.5 unit step
        let shot = Projectile {
            id: 9,
            pos: Vec3::new(0.0, 0.0, 13.0),
            radius: 0.3,
        };
        assert!(projectile_hits(&[shot.clone()], &[drone.clone()], 0.0).is_empty());
        assert_eq!(projectile_hits(&[shot], &[drone], 4.5), vec![(9, 1)]);
    }
}
