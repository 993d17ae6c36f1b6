//! Fragmentation rule sets

use serde::{Deserialize, Serialize};

use super::profile::Span;
use crate::error::{ConfigError, ConfigResult, check_non_negative, check_unit};
use crate::sim::SizeClass;
use crate::sim::rng::CrackRng;

/// Most children a single body may split into
pub const MAX_FRAGMENT_COUNT: u32 = 32;

/// Inclusive integer range, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Uniform integer in [min, max]
    pub fn sample(&self, rng: &mut CrackRng) -> u32 {
        rng.int_inclusive(self.min, self.max)
    }
}

impl From<[u32; 2]> for CountRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<CountRange> for [u32; 2] {
    fn from(range: CountRange) -> Self {
        [range.min, range.max]
    }
}

/// One value per size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTable<T> {
    pub large: T,
    pub medium: T,
    pub small: T,
}

impl<T> SizeTable<T> {
    pub fn get(&self, size: SizeClass) -> &T {
        match size {
            SizeClass::Large => &self.large,
            SizeClass::Medium => &self.medium,
            SizeClass::Small => &self.small,
        }
    }
}

/// Parameters controlling how a destroyed body splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentRuleSet {
    /// Child count range, keyed by the parent's size
    pub counts: SizeTable<CountRange>,
    /// Fraction of the parent velocity carried by each child
    pub inherit_velocity: f32,
    /// Travel-angle perturbation, radians
    pub angle_jitter: f32,
    /// Spawn-offset angle perturbation, radians
    pub radial_offset_jitter: f32,
    /// Spawn distance as a fraction of the parent radius
    pub radial_distance: Span,
    /// Speed multiplier range, keyed by the child's size
    pub speed_multiplier: SizeTable<Span>,
    /// Deepest fragmentation generation this rule set allows
    pub max_generation: u8,
}

impl Default for FragmentRuleSet {
    fn default() -> Self {
        Self {
            counts: SizeTable {
                large: CountRange::new(3, 4),
                medium: CountRange::new(2, 3),
                small: CountRange::new(0, 0),
            },
            inherit_velocity: 0.4,
            angle_jitter: 0.35,
            radial_offset_jitter: 0.25,
            radial_distance: Span::new(0.25, 0.55),
            speed_multiplier: SizeTable {
                large: Span::new(0.9, 1.1),
                medium: Span::new(0.9, 1.2),
                small: Span::new(1.0, 1.35),
            },
            max_generation: 2,
        }
    }
}

impl FragmentRuleSet {
    pub fn validate(&self, entry: &str) -> ConfigResult<()> {
        for (field, range) in [
            ("counts.large", self.counts.large),
            ("counts.medium", self.counts.medium),
            ("counts.small", self.counts.small),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    entry: entry.to_string(),
                    field,
                    min: range.min as f32,
                    max: range.max as f32,
                });
            }
            if range.max > MAX_FRAGMENT_COUNT {
                return Err(ConfigError::OutOfRange {
                    entry: entry.to_string(),
                    field,
                    value: range.max as f32,
                    expected: "[0, 32]",
                });
            }
        }
        check_unit(entry, "inherit_velocity", self.inherit_velocity)?;
        check_non_negative(entry, "angle_jitter", self.angle_jitter)?;
        check_non_negative(entry, "radial_offset_jitter", self.radial_offset_jitter)?;
        self.radial_distance.validate(entry, "radial_distance")?;
        check_non_negative(entry, "radial_distance", self.radial_distance.min)?;
        self.speed_multiplier.large.validate(entry, "speed_multiplier.large")?;
        self.speed_multiplier.medium.validate(entry, "speed_multiplier.medium")?;
        self.speed_multiplier.small.validate(entry, "speed_multiplier.small")?;
        Ok(())
    }
}
