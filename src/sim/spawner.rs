//! Entity spawning
//!
//! Obstacles spawn when their timer exceeds `base_interval / speed`: the
//! interval shrinks as the game speeds up, so obstacles arrive more often per
//! second but no more often per unit of distance. Power-ups and collectibles
//! spawn on fixed wall-clock intervals.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityClass, EntityId, EntityKind};
use super::variant::{MovementStyle, VariantRules};
use crate::lane_to_x;

/// Hands out entity ids in spawn order
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: EntityId,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A fully specified spawn, used by scripted plans
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub kind: EntityKind,
    /// Lane for lane variants (clamped to the lane count)
    pub lane: u8,
    /// Lateral position for arena variants (clamped to the arena)
    pub x: f32,
    /// Spawn depth; None uses the variant's far plane
    pub depth: Option<f32>,
}

impl SpawnRequest {
    pub fn in_lane(kind: EntityKind, lane: u8) -> Self {
        Self {
            kind,
            lane,
            x: 0.0,
            depth: None,
        }
    }

    pub fn at_x(kind: EntityKind, x: f32) -> Self {
        Self {
            kind,
            lane: 0,
            x,
            depth: None,
        }
    }

    pub fn at_depth(mut self, depth: f32) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// Where spawns come from
#[derive(Debug, Clone, Default)]
pub enum SpawnPlan {
    /// Timers and the session RNG
    #[default]
    Random,
    /// Exact spawns keyed by tick index (1-based); no random spawns
    Scripted(VecDeque<(u64, SpawnRequest)>),
}

/// Per-tick spawn inputs
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub dt: f32,
    /// Session time at this tick
    pub elapsed: f32,
    pub speed: f32,
    /// 1-based index of the tick being simulated
    pub tick: u64,
    pub live: &'a [Entity],
}

impl SpawnContext<'_> {
    fn live_count(&self, class: EntityClass) -> usize {
        self.live.iter().filter(|e| e.class() == class).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Spawner {
    obstacle_timer: f32,
    power_up_timer: f32,
    collectible_timer: f32,
    plan: SpawnPlan,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawner that only emits the given (tick, request) pairs
    pub fn scripted(spawns: impl IntoIterator<Item = (u64, SpawnRequest)>) -> Self {
        Self {
            plan: SpawnPlan::Scripted(spawns.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Zero all timers; the plan itself is kept
    pub fn reset_timers(&mut self) {
        self.obstacle_timer = 0.0;
        self.power_up_timer = 0.0;
        self.collectible_timer = 0.0;
    }

    /// Decide whether to emit one entity of `class` this tick
    pub fn maybe_spawn(
        &mut self,
        class: EntityClass,
        ctx: &SpawnContext<'_>,
        rules: &VariantRules,
        rng: &mut Pcg32,
        ids: &mut EntityIds,
    ) -> Option<Entity> {
        let at_cap =
            class == EntityClass::Collectible && ctx.live_count(class) >= rules.collectible_cap;

        let request = match &mut self.plan {
            SpawnPlan::Scripted(queue) => {
                let idx = queue
                    .iter()
                    .position(|(tick, req)| *tick == ctx.tick && req.kind.class() == class)?;
                let (_, request) = queue.remove(idx)?;
                if at_cap {
                    log::debug!("Scripted {} suppressed at cap", request.kind.subtype_name());
                    return None;
                }
                request
            }
            SpawnPlan::Random => {
                let (timer, interval) = match class {
                    EntityClass::Obstacle => (
                        &mut self.obstacle_timer,
                        rules.obstacle_interval_at(ctx.speed)?,
                    ),
                    EntityClass::PowerUp => (&mut self.power_up_timer, rules.power_up_interval?),
                    EntityClass::Collectible => {
                        (&mut self.collectible_timer, rules.collectible_interval?)
                    }
                };
                *timer += ctx.dt.max(0.0);
                if *timer <= interval {
                    return None;
                }
                *timer = 0.0;
                if at_cap {
                    return None;
                }
                random_request(class, rules, rng)?
            }
        };

        let entity = build_entity(&request, rules, ids.next_id(), ctx.elapsed);
        log::debug!(
            "Spawned {} #{} at {:?}",
            entity.kind.subtype_name(),
            entity.id,
            entity.pos
        );
        Some(entity)
    }

    /// Run every class in fixed order (obstacle, power-up, collectible)
    pub fn spawn_tick(
        &mut self,
        ctx: &SpawnContext<'_>,
        rules: &VariantRules,
        rng: &mut Pcg32,
        ids: &mut EntityIds,
    ) -> Vec<Entity> {
        [
            EntityClass::Obstacle,
            EntityClass::PowerUp,
            EntityClass::Collectible,
        ]
        .into_iter()
        .filter_map(|class| self.maybe_spawn(class, ctx, rules, rng, ids))
        .collect()
    }
}

/// Pick subtype and placement uniformly
fn random_request(class: EntityClass, rules: &VariantRules, rng: &mut Pcg32) -> Option<SpawnRequest> {
    let kind = match class {
        EntityClass::Obstacle => {
            pick(rules.obstacles, rng).map(EntityKind::Obstacle)?
        }
        EntityClass::PowerUp => pick(rules.power_ups, rng).map(EntityKind::PowerUp)?,
        EntityClass::Collectible => pick(rules.collectibles, rng).map(EntityKind::collectible)?,
    };

    let request = match rules.movement {
        MovementStyle::Lanes { lanes } => {
            SpawnRequest::in_lane(kind, rng.random_range(0..lanes.max(1)))
        }
        MovementStyle::Arena { half_width, .. } => {
            let x = if half_width > 0.0 {
                rng.random_range(-half_width..=half_width)
            } else {
                0.0
            };
            SpawnRequest::at_x(kind, x)
        }
    };
    Some(request)
}

fn pick<T: Copy>(table: &[T], rng: &mut Pcg32) -> Option<T> {
    if table.is_empty() {
        return None;
    }
    Some(table[rng.random_range(0..table.len())])
}

fn build_entity(request: &SpawnRequest, rules: &VariantRules, id: EntityId, elapsed: f32) -> Entity {
    let depth = request.depth.unwrap_or(rules.spawn_depth);
    match rules.movement {
        MovementStyle::Lanes { lanes } => {
            let lane = request.lane.min(lanes.max(1) - 1);
            let pos = Vec3::new(lane_to_x(lane, lanes), request.kind.rest_height(), depth);
            Entity::new(id, request.kind, Some(lane), pos, elapsed)
        }
        MovementStyle::Arena { half_width, .. } => {
            let x = request.x.clamp(-half_width, half_width);
            Entity::new(id, request.kind, None, Vec3::new(x, 0.0, depth), elapsed)
        }
    }
}
