//! Damage reveal tracking
//!
//! Maps a body's remaining health onto how many crack layers are visible.
//! Stages only ever appear; healing never hides one again.

use serde::{Deserialize, Serialize};

use super::segment::CrackLayer;
use crate::tuning::{CrackProfile, STAGE_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackReveal {
    thresholds: [f32; STAGE_COUNT],
    revealed: u8,
}

impl CrackReveal {
    pub fn new(profile: &CrackProfile) -> Self {
        Self::with_thresholds(profile.reveal_thresholds)
    }

    pub fn with_thresholds(thresholds: [f32; STAGE_COUNT]) -> Self {
        Self {
            thresholds,
            revealed: 0,
        }
    }

    /// Stages (1-based) newly crossed at `health_fraction`, in order
    ///
    /// A stage is only revealed once every earlier stage is.
    pub fn update(&mut self, health_fraction: f32) -> Vec<u8> {
        if health_fraction.is_nan() {
            return Vec::new();
        }
        let health = health_fraction.clamp(0.0, 1.0);

        let mut crossed = Vec::new();
        while (self.revealed as usize) < STAGE_COUNT {
            if health > self.thresholds[self.revealed as usize] {
                break;
            }
            self.revealed += 1;
            crossed.push(self.revealed);
        }
        if !crossed.is_empty() {
            log::trace!("revealed crack stages {crossed:?} at health {health:.2}");
        }
        crossed
    }

    /// Number of stages visible so far
    pub fn revealed(&self) -> u8 {
        self.revealed
    }

    pub fn is_complete(&self) -> bool {
        self.revealed as usize >= STAGE_COUNT
    }

    /// Visible layers, stage 1 first
    pub fn revealed_layers<'a>(&self, layers: &'a [CrackLayer]) -> &'a [CrackLayer] {
        let visible = (self.revealed as usize).min(layers.len());
        &layers[..visible]
    }

    /// Forget all revealed stages, e.g. when a body is recycled
    pub fn reset(&mut self) {
        self.revealed = 0;
    }
}
