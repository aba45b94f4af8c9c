//! Game tuning.

use std::ops::Range;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Everything that shapes a game, from arena size to the glyphs used when
/// rendering it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgarioConfig {
    /// Number of cells in the circular arena.
    pub arena_size: usize,

    /// Minimum wall-clock time between two simulation steps.
    pub tick_interval: Duration,

    /// Chance that a cell starts out holding food.
    pub food_probability: f64,

    /// Mass gained per food cell eaten, and lost per fire action.
    pub food_mass: f64,

    /// A contacting blob is captured only when its mass is below this
    /// fraction of the other blob's mass.
    pub capture_ratio: f64,

    /// Blobs lighter than this cannot fire or split.
    pub min_action_mass: f64,

    /// Range the first player's starting cell is drawn from.
    pub spawn_offset: Range<u32>,

    /// Range each gap between consecutive starting cells is drawn from.
    pub spawn_gap: Range<u32>,

    /// Distance a fire or split action reaches, before the blob's own
    /// mass is added for fire.
    pub action_offset: f64,

    pub food_glyph: char,
    pub empty_glyph: char,

    /// Fixed RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for AgarioConfig {
    fn default() -> Self {
        Self {
            arena_size: 100,
            tick_interval: Duration::from_millis(1500),
            food_probability: 0.3,
            food_mass: 0.25,
            capture_ratio: 0.8,
            min_action_mass: 2.0,
            spawn_offset: 0..8,
            spawn_gap: 5..10,
            action_offset: 2.0,
            food_glyph: '\u{25E6}',
            empty_glyph: ' ',
            seed: None,
        }
    }
}

impl AgarioConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Rules:
    /// - `arena_size` is at least 1.
    /// - `food_probability` clamped to `0.0..=1.0`.
    /// - `capture_ratio` clamped to `0.0..=1.0`.
    /// - `food_mass` and `action_offset` are non-negative.
    /// - Empty spawn ranges are widened to one value.
    pub fn validated(mut self) -> Self {
        self.arena_size = self.arena_size.max(1);
        self.food_probability = clamp_unit(self.food_probability);
        self.capture_ratio = clamp_unit(self.capture_ratio);
        self.food_mass = self.food_mass.max(0.0);
        self.action_offset = self.action_offset.max(0.0);
        if self.spawn_offset.is_empty() {
            self.spawn_offset = self.spawn_offset.start..self.spawn_offset.start + 1;
        }
        if self.spawn_gap.is_empty() {
            self.spawn_gap = self.spawn_gap.start..self.spawn_gap.start + 1;
        }
        self
    }

    /// Same config with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
