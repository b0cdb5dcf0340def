//! Score accumulation and the end-of-game multiplier
//!
//! `multiplier = 1.0 + min(raw / 10000, 0.5) + variant_bonus`
//! `final = floor(raw * multiplier)`
//!
//! The final score is computed with integers so that values like
//! 12000 * 1.7 land exactly on 20400 instead of one below it.

use serde::{Deserialize, Serialize};

use super::variant::Variant;

/// Raw score at which the skill term saturates
pub const SKILL_SATURATION: u64 = 5_000;
/// Divisor for the skill term
const SKILL_SCALE: u64 = 10_000;

/// Score multiplier for a raw score
pub fn multiplier(raw_score: u64, variant: Variant) -> f64 {
    1.0 + (raw_score as f64 / SKILL_SCALE as f64).min(0.5) + variant.bonus()
}

/// `floor(raw * multiplier)` in exact arithmetic
pub fn final_score(raw_score: u64, variant: Variant) -> u64 {
    let raw = raw_score as u128;
    let bonus = (variant.bonus() * SKILL_SCALE as f64).round() as u128;
    let skill = raw.min(SKILL_SATURATION as u128);
    let scaled = raw * (SKILL_SCALE as u128 + bonus + skill) / SKILL_SCALE as u128;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Final, immutable result of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub raw_score: u64,
    pub multiplier: f64,
    pub final_score: u64,
}

impl ScoringResult {
    pub fn compute(raw_score: u64, variant: Variant) -> Self {
        Self {
            raw_score,
            multiplier: multiplier(raw_score, variant),
            final_score: final_score(raw_score, variant),
        }
    }
}

/// Per-session counters for the game-over screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub obstacles_passed: u32,
    pub enemies_destroyed: u32,
    pub items_collected: u32,
    pub power_ups_taken: u32,
    pub hits_taken: u32,
}

/// Raw score accumulator
#[derive(Debug, Clone, Default)]
pub struct ScoreKeeper {
    raw: u64,
    /// Fractional distance points not yet credited
    distance_carry: f32,
}

impl ScoreKeeper {
    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn add_points(&mut self, points: u32) {
        self.raw = self.raw.saturating_add(points as u64);
    }

    /// Credit distance travelled at `points_per_unit`, whole points only
    pub fn add_distance(&mut self, distance: f32, points_per_unit: f32) {
        let earned = distance.max(0.0) * points_per_unit.max(0.0);
        if !earned.is_finite() {
            return;
        }
        self.distance_carry += earned;
        let whole = self.distance_carry.floor();
        if whole >= 1.0 {
            self.distance_carry -= whole;
            self.raw = self.raw.saturating_add(whole as u64);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
