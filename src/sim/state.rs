//! Session state and lifecycle
//!
//! One `Session` owns everything a play-through mutates: the player, the
//! live entities, the spawner, the RNG and the score. `reset()` rebuilds
//! those fields in place, so nothing from a finished run survives into the
//! next one.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, Player, Projectile};
use super::movement::player_start;
use super::scoring::{ScoreKeeper, ScoringResult, SessionStats};
use super::spawner::{EntityIds, Spawner};
use super::variant::{Variant, VariantRules};
use crate::error::{EngineError, Result};
use crate::settings::Settings;

/// Base speed multiplier at the start of a run
pub const BASE_SPEED: f32 = 1.0;

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Ready to start, nothing simulating
    Waiting,
    /// Active gameplay
    Playing,
    /// Run ended; only `reset()` leaves this state
    GameOver,
}

/// Complete mutable state of one game instance
#[derive(Debug, Clone)]
pub struct Session {
    pub variant: Variant,
    pub rules: VariantRules,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub status: GameStatus,
    pub score: ScoreKeeper,
    /// Difficulty speed multiplier, never decreases within a run
    pub speed: f32,
    /// Simulated seconds since `start()`
    pub elapsed: f32,
    /// Simulated ticks since `start()`
    pub ticks: u64,
    pub player: Player,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    pub projectiles: Vec<Projectile>,
    pub spawner: Spawner,
    pub stats: SessionStats,
    pub(crate) ids: EntityIds,
    /// Pristine spawner, restored on reset (scripted plans are consumed as they run)
    spawner_template: Spawner,
    result: Option<ScoringResult>,
}

impl Session {
    /// Create a session in `Waiting` for the given variant
    pub fn new(variant: Variant, settings: &Settings, seed: u64) -> Self {
        let rules = variant.tuned_rules(settings);
        let player = fresh_player(&rules);
        Self {
            variant,
            rules,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            status: GameStatus::Waiting,
            score: ScoreKeeper::default(),
            speed: BASE_SPEED,
            elapsed: 0.0,
            ticks: 0,
            player,
            entities: Vec::new(),
            projectiles: Vec::new(),
            spawner: Spawner::new(),
            stats: SessionStats::default(),
            ids: EntityIds::default(),
            spawner_template: Spawner::new(),
            result: None,
        }
    }

    /// Replace the spawn plan (e.g. a scripted replay)
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner_template = spawner.clone();
        self.spawner = spawner;
        self
    }

    /// Raw score so far
    pub fn score(&self) -> u64 {
        self.score.raw()
    }

    pub fn health(&self) -> u8 {
        self.player.health
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Final result, present once the run has ended
    pub fn result(&self) -> Option<ScoringResult> {
        self.result
    }

    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// `Waiting -> Playing`
    pub fn start(&mut self) -> Result<()> {
        if self.status != GameStatus::Waiting {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        self.clear_run();
        self.status = GameStatus::Playing;
        log::info!("{} started (seed {})", self.variant.as_str(), self.seed);
        Ok(())
    }

    /// Any state -> `Waiting`, dropping all entities, score, effects and timers
    pub fn reset(&mut self) {
        self.clear_run();
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.status = GameStatus::Waiting;
        log::info!("{} reset", self.variant.as_str());
    }

    /// Pick a new seed for the next run (only while `Waiting`)
    pub fn reseed(&mut self, seed: u64) -> Result<()> {
        if self.status != GameStatus::Waiting {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                action: "reseed",
            });
        }
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        Ok(())
    }

    /// `Playing -> GameOver`; computes the scoring result exactly once
    pub(crate) fn end(&mut self) -> ScoringResult {
        if let Some(result) = self.result {
            return result;
        }
        self.status = GameStatus::GameOver;
        let result = ScoringResult::compute(self.score.raw(), self.variant);
        self.result = Some(result);
        log::info!(
            "{} over: raw {} x{:.3} = {}",
            self.variant.as_str(),
            result.raw_score,
            result.multiplier,
            result.final_score
        );
        result
    }

    /// Error for the first entity with non-finite state
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.entities.iter().find(|e| !e.is_well_formed()) {
            return Err(EngineError::MalformedEntity { id: bad.id });
        }
        Ok(())
    }

    /// Drop malformed entities so the next tick can run; returns how many
    pub fn quarantine_malformed(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.is_well_formed());
        let dropped = before - self.entities.len();
        if dropped > 0 {
            log::warn!("Quarantined {} malformed entities", dropped);
        }
        dropped
    }

    fn clear_run(&mut self) {
        self.score.reset();
        self.speed = BASE_SPEED;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.player = fresh_player(&self.rules);
        self.entities.clear();
        self.projectiles.clear();
        self.spawner = self.spawner_template.clone();
        self.spawner.reset_timers();
        self.stats = SessionStats::default();
        self.ids = EntityIds::default();
        self.result = None;
    }
}

fn fresh_player(rules: &VariantRules) -> Player {
    let (lane, pos) = player_start(rules);
    Player::new(lane, pos, rules.player_bounds, rules.max_health)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::sim::entity::{CollectibleKind, EntityKind, PowerUpKind};

    fn session(variant: Variant) -> Session {
        Session::new(variant, &Settings::default(), 12345)
    }

    #[test]
    fn test_initial_state() {
        let s = session(Variant::LaneRunner);
        assert_eq!(s.status, GameStatus::Waiting);
        assert_eq!(s.score(), 0);
        assert_eq!(s.health(), 3);
        assert_eq!(s.speed, BASE_SPEED);
        assert!(s.entities.is_empty());
    }

    #[test]
    fn test_start_only_from_waiting() {
        let mut s = session(Variant::Runner);
        s.start().unwrap();
        assert!(s.is_playing());
        assert!(matches!(
            s.start(),
            Err(EngineError::InvalidTransition { from: GameStatus::Playing, .. })
        ));

        s.end();
        assert_eq!(s.status, GameStatus::GameOver);
        // GameOver never goes straight back to Playing
        assert!(s.start().is_err());
        assert_eq!(s.status, GameStatus::GameOver);

        s.reset();
        assert_eq!(s.status, GameStatus::Waiting);
        s.start().unwrap();
        assert!(s.is_playing());
    }

    #[test]
    fn test_reset_from_any_state_clears_run() {
        for from in [GameStatus::Waiting, GameStatus::Playing, GameStatus::GameOver] {
            let mut s = session(Variant::LaneRunner);
            if from != GameStatus::Waiting {
                s.start().unwrap();
            }
            s.score.add_points(500);
            s.speed = 3.0;
            s.player.health = 1;
            s.player.invincible_until = Some(100.0);
            s.player.effects.activate(PowerUpKind::Shield, 0.0, 50.0);
            let id = s.next_entity_id();
            s.entities.push(Entity::new(
                id,
                EntityKind::collectible(CollectibleKind::Coin),
                Some(0),
                Vec3::ZERO,
                0.0,
            ));
            if from == GameStatus::GameOver {
                s.end();
            }

            s.reset();
            assert_eq!(s.status, GameStatus::Waiting);
            assert_eq!(s.score(), 0);
            assert_eq!(s.health(), s.rules.max_health);
            assert!(s.entities.is_empty());
            assert_eq!(s.speed, BASE_SPEED);
            assert!(s.player.invincible_until.is_none());
            assert!(s.player.effects.is_empty());
            assert!(s.result().is_none());
        }
    }

    #[test]
    fn test_end_computes_result_once() {
        let mut s = session(Variant::Collector);
        s.start().unwrap();
        s.score.add_points(12_000);
        let first = s.end();
        s.score.add_points(1);
        let second = s.end();
        assert_eq!(first, second);
        assert_eq!(first.final_score, 20_400);
    }

    #[test]
    fn test_reseed_only_while_waiting() {
        let mut s = session(Variant::Shooter);
        s.reseed(99).unwrap();
        assert_eq!(s.seed, 99);
        s.start().unwrap();
        assert!(s.reseed(5).is_err());
        assert_eq!(s.seed, 99);
    }

    #[test]
    fn test_validate_and_quarantine() {
        let mut s = session(Variant::Collector);
        let good = s.next_entity_id();
        let bad = s.next_entity_id();
        let kind = EntityKind::collectible(CollectibleKind::Crystal);
        s.entities.push(Entity::new(good, kind, None, Vec3::ZERO, 0.0));
        s.entities.push(Entity::new(bad, kind, None, Vec3::new(f32::NAN, 0.0, 1.0), 0.0));

        assert!(matches!(s.validate(), Err(EngineError::MalformedEntity { id }) if id == bad));
        assert_eq!(s.quarantine_malformed(), 1);
        assert!(s.validate().is_ok());
        assert_eq!(s.entities.len(), 1);
    }
}
