//! Frame timing and wall-clock helpers

/// Turns host timestamps into clamped simulation deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Seconds since the previous frame, in `[0, max_dt]`
    ///
    /// The first frame after construction or `reset` yields 0. A timestamp
    /// that goes backwards also yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms.is_finite() => ((now_ms - last).max(0.0) / 1000.0) as f32,
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        dt.min(self.max_dt)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Wall-clock milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for runs that don't pin one in settings
pub fn seed_from_clock() -> u64 {
    now_ms() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.delta(1000.0), 0.0);
        assert!((clock.delta(1016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = FrameClock::new(0.1);
        clock.delta(0.0);
        // Tab was backgrounded for five seconds
        assert_eq!(clock.delta(5000.0), 0.1);
        // Time going backwards is treated as no time
        assert_eq!(clock.delta(4000.0), 0.0);
        assert!((clock.delta(4010.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_reset_restarts_baseline() {
        let mut clock = FrameClock::new(0.1);
        clock.delta(0.0);
        clock.reset();
        assert_eq!(clock.delta(50.0), 0.0);
    }

    #[test]
    fn test_non_finite_timestamp_is_ignored() {
        let mut clock = FrameClock::new(0.1);
        clock.delta(100.0);
        assert_eq!(clock.delta(f64::NAN), 0.0);
        assert!((clock.delta(120.0) - 0.02).abs() < 1e-6);
    }
}
