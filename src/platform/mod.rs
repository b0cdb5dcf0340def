//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events, normalized into intents
//! - Listener lifetime (scoped to a session)
//! - Time/ticks

pub mod input;
pub mod time;

pub use input::{InputBinder, InputEvent, InputGuard, InputQueue, InputState, Intent, NoInput};
pub use time::{FrameClock, now_ms, seed_from_clock};
