use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{HumanizeConfig, MsRange};

/// Random source for pointer jitter and action timing.
pub struct Humanizer {
    rng: StdRng,
    config: HumanizeConfig,
}

impl Humanizer {
    pub fn new(config: HumanizeConfig) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            config,
        }
    }

    pub fn seeded(config: HumanizeConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &HumanizeConfig {
        &self.config
    }

    /// Offset both axes independently by up to `jitter_radius` pixels.
    pub fn jitter(&mut self, point: (i32, i32)) -> (i32, i32) {
        self.jitter_within(point, self.config.jitter_radius)
    }

    /// Same as [`Humanizer::jitter`] with an explicit radius. Radii beyond
    /// `i32::MAX` saturate, as do the resulting coordinates.
    pub fn jitter_within(&mut self, (x, y): (i32, i32), radius: u32) -> (i32, i32) {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        if r == 0 {
            return (x, y);
        }
        (
            x.saturating_add(self.rng.gen_range(-r..=r)),
            y.saturating_add(self.rng.gen_range(-r..=r)),
        )
    }

    pub fn sample(&mut self, range: MsRange) -> Duration {
        let (lo, hi) = (range.min(), range.max());
        let ms = if lo == hi { lo } else { self.rng.gen_range(lo..=hi) };
        Duration::from_millis(ms)
    }

    pub fn move_duration(&mut self) -> Duration {
        self.sample(self.config.move_ms)
    }

    pub fn pre_click(&mut self) -> Duration {
        self.sample(self.config.pre_click_ms)
    }

    pub fn post_action(&mut self) -> Duration {
        self.sample(self.config.post_action_ms)
    }

    pub fn keystroke(&mut self) -> Duration {
        self.sample(self.config.keystroke_ms)
    }

    pub fn reaction(&mut self) -> Duration {
        self.sample(self.config.reaction_ms)
    }
}
