//! Rendering capability
//!
//! The simulation never draws. Once per frame the game hands a read-only
//! [`RenderFrame`] to whatever [`Renderer`] the host supplied.

pub mod text;

pub use text::TextRenderer;

use crate::error::Result;
use crate::sim::{ActiveEffects, Entity, GameStatus, Player, Projectile, Session, Variant, VariantRules};

/// Read-only snapshot of a session for one frame
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub variant: Variant,
    pub rules: &'a VariantRules,
    pub status: GameStatus,
    pub score: u64,
    pub health: u8,
    pub speed: f32,
    /// Simulated seconds, drives animation
    pub elapsed: f32,
    pub player: &'a Player,
    pub entities: &'a [Entity],
    pub projectiles: &'a [Projectile],
    pub effects: &'a ActiveEffects,
}

impl<'a> RenderFrame<'a> {
    pub fn from_session(session: &'a Session) -> Self {
        Self {
            variant: session.variant,
            rules: &session.rules,
            status: session.status,
            score: session.score(),
            health: session.health(),
            speed: session.speed,
            elapsed: session.elapsed,
            player: &session.player,
            entities: &session.entities,
            projectiles: &session.projectiles,
            effects: &session.player.effects,
        }
    }
}

/// Anything that can present a frame
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()>;
}
