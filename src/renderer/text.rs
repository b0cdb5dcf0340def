//! Top-down ASCII renderer
//!
//! Far plane at the top, player row at the bottom. Used by the native demo
//! and handy in tests.

use std::io::Write;

use super::{RenderFrame, Renderer};
use crate::consts::LANE_WIDTH;
use crate::error::Result;
use crate::sim::{CollectibleKind, EntityKind, MovementStyle, ObstacleKind, PowerUpKind};

pub struct TextRenderer {
    cols: usize,
    rows: usize,
    out: Option<Box<dyn Write>>,
    last: String,
    frames: u64,
}

impl TextRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(3),
            rows: rows.max(3),
            out: None,
            last: String::new(),
            frames: 0,
        }
    }

    /// Also write every frame to `out`
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    /// Most recently rendered frame
    pub fn last_frame(&self) -> &str {
        &self.last
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn draw(&self, frame: &RenderFrame<'_>) -> String {
        let rules = frame.rules;
        let half_width = match rules.movement {
            MovementStyle::Lanes { lanes } => lanes as f32 * LANE_WIDTH * 0.5,
            MovementStyle::Arena { half_width, .. } => half_width,
        };
        let far = rules.spawn_depth;
        let near = rules.retire_depth.min(frame.player.pos.z - 1.0);

        let mut grid = vec![vec!['.'; self.cols]; self.rows];
        let cell = |x: f32, z: f32| -> Option<(usize, usize)> {
            if !x.is_finite() || !z.is_finite() {
                return None;
            }
            let u = ((x + half_width) / (2.0 * half_width)).clamp(0.0, 1.0);
            let v = ((far - z) / (far - near)).clamp(0.0, 1.0);
            let col = (u * (self.cols - 1) as f32).round() as usize;
            let row = (v * (self.rows - 1) as f32).round() as usize;
            Some((row, col))
        };

        for entity in frame.entities {
            if let Some((row, col)) = cell(entity.pos.x, entity.pos.z) {
                grid[row][col] = glyph(&entity.kind);
            }
        }
        for projectile in frame.projectiles {
            if let Some((row, col)) = cell(projectile.pos.x, projectile.pos.z) {
                grid[row][col] = '^';
            }
        }
        if let Some((row, col)) = cell(frame.player.pos.x, frame.player.pos.z) {
            grid[row][col] = '@';
        }

        let mut text = format!(
            "{} {:?} score {} hp {} speed {:.2} t {:.1}s\n",
            frame.variant.as_str(),
            frame.status,
            frame.score,
            frame.health,
            frame.speed,
            frame.elapsed
        );
        for row in grid {
            text.extend(row);
            text.push('\n');
        }
        text
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
        self.last = self.draw(frame);
        self.frames += 1;
        if let Some(out) = self.out.as_mut() {
            out.write_all(self.last.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }
}

fn glyph(kind: &EntityKind) -> char {
    match kind {
        EntityKind::Obstacle(ObstacleKind::Barrier) => '=',
        EntityKind::Obstacle(ObstacleKind::LaserWall) => '|',
        EntityKind::Obstacle(ObstacleKind::Crate) => '#',
        EntityKind::Obstacle(ObstacleKind::Drone) => 'v',
        EntityKind::Obstacle(ObstacleKind::Asteroid) => 'o',
        EntityKind::PowerUp(PowerUpKind::SpeedBoost) => '>',
        EntityKind::PowerUp(PowerUpKind::Shield) => '+',
        EntityKind::PowerUp(PowerUpKind::Magnet) => 'U',
        EntityKind::Collectible { kind, .. } => match kind {
            CollectibleKind::Coin => 'c',
            CollectibleKind::Gem => 'g',
            CollectibleKind::Crystal => '*',
        },
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::settings::Settings;
    use crate::sim::{Entity, Session, Variant};

    #[test]
    fn test_draws_player_and_entities() {
        let mut session = Session::new(Variant::Runner, &Settings::default(), 1);
        let id = session.next_entity_id();
        session.entities.push(Entity::new(
            id,
            EntityKind::Obstacle(ObstacleKind::Crate),
            Some(1),
            Vec3::new(0.0, 0.35, 30.0),
            0.0,
        ));

        let mut renderer = TextRenderer::new(9, 12);
        renderer.render(&RenderFrame::from_session(&session)).unwrap();

        let text = renderer.last_frame();
        assert!(text.starts_with("runner Waiting score 0"));
        assert_eq!(text.lines().count(), 13);
        assert_eq!(text.matches('@').count(), 1);
        assert_eq!(text.matches('#').count(), 1);
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_non_finite_positions_are_skipped() {
        let mut session = Session::new(Variant::Collector, &Settings::default(), 1);
        let id = session.next_entity_id();
        session.entities.push(Entity::new(
            id,
            EntityKind::collectible(CollectibleKind::Crystal),
            None,
            Vec3::new(f32::NAN, 0.0, 1.0),
            0.0,
        ));
        let mut renderer = TextRenderer::new(10, 10);
        renderer.render(&RenderFrame::from_session(&session)).unwrap();
        assert!(!renderer.last_frame().contains('*'));
    }
}
