//! Line-clear celebration: particles, flash, shake and banner
//!
//! Everything here runs off the [`LineClear`] snapshot handed over by the
//! game. Effects never look at the live board, and game state never waits
//! for them.

use crate::board::{BOARD_SIZE, LineClear};
use crate::shapes::BlockColor;
use rand::Rng;
use rand::seq::SliceRandom;
use ratatui::style::Color;
use std::time::Duration;

/// Simulation runs in frames of this length regardless of redraw rate
const FRAME: Duration = Duration::from_micros(1_000_000 / 60);

/// Board cells are drawn two terminal columns wide; particle physics runs in
/// board-cell units, so speeds are scaled down from pixel-ish values
const SPEED_SCALE: f32 = 0.04;
const GRAVITY: f32 = 0.08 * SPEED_SCALE;
const DRAG: f32 = 0.99;

const PARTICLES_PER_CELL: usize = 12;
const PARTICLES_PER_LINE: usize = 20;

const FLASH_DURATION: Duration = Duration::from_millis(300);
const SHAKE_DURATION: Duration = Duration::from_millis(500);
const BANNER_DURATION: Duration = Duration::from_millis(1900);
const HIGHLIGHT_DURATION: Duration = Duration::from_millis(900);
/// Delay between successive cells lighting up
const HIGHLIGHT_STAGGER: Duration = Duration::from_millis(15);

const CLEAR_MESSAGES: [&str; 7] = [
    "✨ Nice!",
    "🔥 Great!",
    "💥 Awesome!",
    "⚡ Sweet!",
    "🌟 Brilliant!",
    "🎯 Perfect!",
    "💎 Amazing!",
];

const COMBO_MESSAGES: [&str; 4] = ["🔥🔥 COMBO!", "💥💥 DOUBLE!", "⚡⚡ MULTI!", "🌟🌟 MEGA!"];

const PARTICLE_COLORS: [Color; 8] = [
    Color::Rgb(255, 214, 0),
    Color::Rgb(255, 87, 34),
    Color::Rgb(233, 30, 99),
    Color::Rgb(0, 230, 118),
    Color::Rgb(41, 121, 255),
    Color::Rgb(255, 255, 255),
    Color::Rgb(255, 145, 0),
    Color::Rgb(170, 0, 255),
];

/// A single spark, positioned in board-cell coordinates
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    vx: f32,
    vy: f32,
    pub life: f32,
    decay: f32,
    size: f32,
    pub color: Color,
}

impl Particle {
    pub fn glyph(&self) -> &'static str {
        if self.size > 7.0 { "●" } else { "■" }
    }

    fn step(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.vx *= DRAG;
        self.life -= self.decay;
    }
}

#[derive(Debug, Clone)]
struct Highlight {
    row: usize,
    col: usize,
    color: BlockColor,
    delay: Duration,
}

#[derive(Debug, Clone)]
struct Banner {
    text: &'static str,
    remaining: Duration,
}

/// Active visual effects
#[derive(Debug, Clone, Default)]
pub struct Effects {
    particles_enabled: bool,
    particles: Vec<Particle>,
    highlights: Vec<Highlight>,
    highlight_elapsed: Duration,
    flash_remaining: Duration,
    shake_remaining: Duration,
    banner: Option<Banner>,
    /// Frame time not yet simulated
    carry: Duration,
}

impl Effects {
    pub fn new(particles_enabled: bool) -> Self {
        Self {
            particles_enabled,
            ..Self::default()
        }
    }

    /// Start the celebration for a line clear
    pub fn trigger<R: Rng + ?Sized>(&mut self, clear: &LineClear, rng: &mut R) {
        let lines = clear.count() as usize;
        if lines == 0 {
            return;
        }

        self.highlights = clear
            .cells
            .iter()
            .enumerate()
            .map(|(i, &(row, col, color))| Highlight {
                row,
                col,
                color,
                delay: HIGHLIGHT_STAGGER * i as u32,
            })
            .collect();
        self.highlight_elapsed = Duration::ZERO;

        if self.particles_enabled {
            for &(row, col, _) in &clear.cells {
                self.spawn_particles(rng, col as f32 + 0.5, row as f32 + 0.5, PARTICLES_PER_CELL);
            }
            let center = BOARD_SIZE as f32 / 2.0;
            self.spawn_particles(rng, center, center, lines * PARTICLES_PER_LINE);
        }

        self.flash_remaining = FLASH_DURATION;
        self.shake_remaining = SHAKE_DURATION;

        let messages: &[&'static str] = if lines > 1 { &COMBO_MESSAGES } else { &CLEAR_MESSAGES };
        self.banner = messages.choose(rng).map(|&text| Banner {
            text,
            remaining: BANNER_DURATION,
        });
    }

    fn spawn_particles<R: Rng + ?Sized>(&mut self, rng: &mut R, x: f32, y: f32, count: usize) {
        for _ in 0..count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(3.0f32..11.0) * SPEED_SCALE;
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed - 4.0 * SPEED_SCALE,
                life: 1.0,
                decay: rng.gen_range(0.005..0.015),
                size: rng.gen_range(4.0..12.0),
                color: PARTICLE_COLORS[rng.gen_range(0..PARTICLE_COLORS.len())],
            });
        }
    }

    /// Advance all effects by `dt`
    pub fn update(&mut self, dt: Duration) {
        self.flash_remaining = self.flash_remaining.saturating_sub(dt);
        self.shake_remaining = self.shake_remaining.saturating_sub(dt);
        if let Some(banner) = &mut self.banner {
            banner.remaining = banner.remaining.saturating_sub(dt);
            if banner.remaining.is_zero() {
                self.banner = None;
            }
        }

        if !self.highlights.is_empty() {
            self.highlight_elapsed += dt;
            if self.highlight_elapsed >= HIGHLIGHT_DURATION {
                self.highlights.clear();
            }
        }

        self.carry += dt;
        while self.carry >= FRAME {
            self.carry -= FRAME;
            for particle in &mut self.particles {
                particle.step();
            }
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_flashing(&self) -> bool {
        !self.flash_remaining.is_zero()
    }

    /// Horizontal jitter (in terminal columns) while the board shakes
    pub fn shake_offset(&self) -> i16 {
        if self.shake_remaining.is_zero() {
            return 0;
        }
        if (self.shake_remaining.as_millis() / 50) % 2 == 0 { 1 } else { -1 }
    }

    pub fn banner(&self) -> Option<&'static str> {
        self.banner.as_ref().map(|b| b.text)
    }

    /// Color of a cell that is lighting up as part of a clear
    pub fn highlight_at(&self, row: usize, col: usize) -> Option<BlockColor> {
        self.highlights
            .iter()
            .find(|h| h.row == row && h.col == col && h.delay <= self.highlight_elapsed)
            .map(|h| h.color)
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
            || !self.highlights.is_empty()
            || self.is_flashing()
            || !self.shake_remaining.is_zero()
            || self.banner.is_some()
    }

    /// Drop everything, e.g. on restart
    pub fn reset(&mut self) {
        *self = Self::new(self.particles_enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn row_clear(row: usize) -> LineClear {
        LineClear {
            rows: vec![row],
            cols: vec![],
            cells: (0..BOARD_SIZE).map(|col| (row, col, BlockColor::Red)).collect(),
        }
    }

    fn double_clear() -> LineClear {
        let mut clear = row_clear(2);
        clear.cols.push(4);
        clear
            .cells
            .extend((0..BOARD_SIZE).filter(|&r| r != 2).map(|r| (r, 4, BlockColor::Blue)));
        clear
    }

    #[test]
    fn test_trigger_spawns_particles() {
        let mut effects = Effects::new(true);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        effects.trigger(&row_clear(3), &mut rng);

        assert_eq!(effects.particles().len(), 8 * PARTICLES_PER_CELL + PARTICLES_PER_LINE);
        assert!(effects.is_flashing());
        assert_ne!(effects.shake_offset(), 0);
        assert!(CLEAR_MESSAGES.contains(&effects.banner().unwrap()));
    }

    #[test]
    fn test_combo_banner() {
        let mut effects = Effects::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        effects.trigger(&double_clear(), &mut rng);

        assert!(effects.particles().is_empty());
        assert!(COMBO_MESSAGES.contains(&effects.banner().unwrap()));
    }

    #[test]
    fn test_empty_clear_does_nothing() {
        let mut effects = Effects::new(true);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        effects.trigger(&LineClear::default(), &mut rng);
        assert!(!effects.is_active());
    }

    #[test]
    fn test_highlights_are_staggered() {
        let mut effects = Effects::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        effects.trigger(&row_clear(0), &mut rng);

        assert_eq!(effects.highlight_at(0, 0), Some(BlockColor::Red));
        assert_eq!(effects.highlight_at(0, 7), None);

        effects.update(Duration::from_millis(200));
        assert_eq!(effects.highlight_at(0, 7), Some(BlockColor::Red));
        assert_eq!(effects.highlight_at(1, 0), None);
    }

    #[test]
    fn test_everything_expires() {
        let mut effects = Effects::new(true);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        effects.trigger(&double_clear(), &mut rng);
        assert!(effects.is_active());

        // Slowest particle decays at 0.005 per frame: 200 frames
        for _ in 0..300 {
            effects.update(FRAME);
        }
        assert!(!effects.is_active());
        assert_eq!(effects.shake_offset(), 0);
        assert_eq!(effects.banner(), None);
    }

    #[test]
    fn test_shake_alone_keeps_effects_active() {
        let mut effects = Effects::new(false);
        effects.shake_remaining = SHAKE_DURATION;
        assert!(effects.is_active());
        assert_ne!(effects.shake_offset(), 0);

        effects.update(SHAKE_DURATION);
        assert!(!effects.is_active());
        assert_eq!(effects.shake_offset(), 0);
    }

    #[test]
    fn test_particle_physics() {
        let mut particle = Particle {
            x: 1.0,
            y: 1.0,
            vx: 0.5,
            vy: 0.0,
            life: 1.0,
            decay: 0.25,
            size: 4.0,
            color: Color::White,
        };
        particle.step();
        assert_eq!(particle.x, 1.5);
        assert_eq!(particle.y, 1.0);
        assert_eq!(particle.life, 0.75);

        // Gravity pulls it down, drag slows it sideways
        particle.step();
        assert!(particle.y > 1.0);
        assert!(particle.x < 2.0);
        assert_eq!(particle.glyph(), "■");
    }
}
