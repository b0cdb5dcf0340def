//! Game settings and tuning
//!
//! Persisted separately from the leaderboard. Values outside their valid
//! range are clamped rather than rejected.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; None picks one from the clock at session start
    pub seed: Option<u64>,
    /// Multiplier on the per-variant speed ramp (1.0 = stock)
    pub difficulty: f32,

    // === Player ===
    /// Health pool for variants that have one
    pub max_health: u8,
    /// Invincibility window after a hit (seconds)
    pub invincibility_secs: f32,
    /// Power-up duration (seconds)
    pub powerup_secs: f32,

    // === Loop ===
    /// Cap on a single frame delta (milliseconds)
    pub max_frame_dt_ms: f32,

    // === Spawning ===
    /// Upper bound on concurrent collectibles (variants may cap lower)
    pub collectible_cap: usize,
    /// Lane count for lane variants
    pub lanes: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            difficulty: 1.0,

            max_health: MAX_HEALTH,
            invincibility_secs: INVINCIBILITY_SECS,
            powerup_secs: POWERUP_SECS,

            max_frame_dt_ms: MAX_FRAME_DT * 1000.0,

            collectible_cap: COLLECTIBLE_CAP,
            lanes: DEFAULT_LANES,
        }
    }
}

/// Clamp a float into range, falling back to `default` for NaN
fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value.clamp(min, max)
    }
}

impl Settings {
    /// Copy with every field forced into its valid range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            seed: self.seed,
            difficulty: clamp_or(self.difficulty, 0.1, 5.0, defaults.difficulty),
            max_health: self.max_health.clamp(1, 9),
            invincibility_secs: clamp_or(self.invincibility_secs, 0.0, 10.0, defaults.invincibility_secs),
            powerup_secs: clamp_or(self.powerup_secs, 0.0, 30.0, defaults.powerup_secs),
            max_frame_dt_ms: clamp_or(self.max_frame_dt_ms, 1.0, 250.0, defaults.max_frame_dt_ms),
            collectible_cap: self.collectible_cap.clamp(1, 64),
            lanes: self.lanes.clamp(1, 7),
        }
    }

    /// Frame delta cap in seconds
    pub fn max_frame_dt(&self) -> f32 {
        self.sanitized().max_frame_dt_ms / 1000.0
    }

    /// Parse settings from JSON, clamping whatever was stored
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_engine_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings unreadable: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file; a missing file yields defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_out_of_range() {
        let settings = Settings {
            difficulty: -3.0,
            max_health: 0,
            invincibility_secs: -1.0,
            powerup_secs: f32::NAN,
            max_frame_dt_ms: 10_000.0,
            collectible_cap: 0,
            lanes: 0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(settings.difficulty, 0.1);
        assert_eq!(settings.max_health, 1);
        assert_eq!(settings.invincibility_secs, 0.0);
        assert_eq!(settings.powerup_secs, POWERUP_SECS);
        assert_eq!(settings.max_frame_dt_ms, 250.0);
        assert_eq!(settings.collectible_cap, 1);
        assert_eq!(settings.lanes, 1);
    }

    #[test]
    fn test_defaults_are_already_sane() {
        let settings = Settings::default();
        assert_eq!(settings.sanitized(), settings);
        assert_eq!(settings.collectible_cap, COLLECTIBLE_CAP);
        assert!((settings.max_frame_dt() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_from_json_fills_missing_and_clamps() {
        let settings = Settings::from_json(r#"{ "lanes": 12, "seed": 7 }"#).unwrap();
        assert_eq!(settings.lanes, 7);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.max_health, MAX_HEALTH);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Settings::from_json("not json"),
            Err(crate::EngineError::Serialization(_))
        ));
    }
}
