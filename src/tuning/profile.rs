//! Crack generation profiles
//!
//! A profile holds one template per damage stage plus the health fractions
//! at which each stage is revealed. Lengths and radii in templates are
//! fractions of the body's safe radius so one profile fits any asteroid size.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, check_non_negative, check_range, check_unit};
use crate::sim::BurstDescriptor;
use crate::sim::rng::CrackRng;

/// Number of damage stages every profile describes
pub const STAGE_COUNT: usize = 3;

/// Inclusive float range, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in [min, max)
    pub fn sample(&self, rng: &mut CrackRng) -> f32 {
        rng.range(self.min, self.max)
    }

    pub fn validate(&self, entry: &str, field: &'static str) -> ConfigResult<()> {
        check_range(entry, field, self.min, self.max)
    }
}

impl From<[f32; 2]> for Span {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Span> for [f32; 2] {
    fn from(span: Span) -> Self {
        [span.min, span.max]
    }
}

/// Optional concentric ring emitted at the end of a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingSpec {
    /// Ring radius as a fraction of the min surface radius
    pub radius: Span,
    /// Number of chords around the full turn
    pub segments: u32,
    /// Per-vertex radial wobble (fraction of ring radius)
    pub wobble: f32,
    pub width: Span,
}

impl Default for RingSpec {
    fn default() -> Self {
        Self {
            radius: Span::new(0.45, 0.7),
            segments: 10,
            wobble: 0.08,
            width: Span::new(0.8, 1.2),
        }
    }
}

/// Per-stage crack template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTemplate {
    /// Target trunk (stage 1) or extension/new-root (stages 2-3) count
    pub main_rays: u32,
    /// Trunk start offset from the centroid (fraction of safe radius)
    pub start_radius: Span,
    /// Trunk and extension length (fraction of safe radius)
    pub main_length: Span,
    pub branches: u32,
    pub branch_length: Span,
    /// Angle off the parent direction, radians
    pub branch_spread: Span,
    pub micro: u32,
    pub micro_length: Span,
    pub micro_spread: Span,
    pub ring: Option<RingSpec>,
    /// Per-ray angular jitter for new trunks, radians
    pub rotation_jitter: f32,
    /// Main segment width range; branches and micro-cracks scale it down
    pub width: Span,
    /// Visual intensity of the revealed layer
    pub intensity: f32,
    pub burst: BurstDescriptor,
}

impl Default for StageTemplate {
    fn default() -> Self {
        Self {
            main_rays: 3,
            start_radius: Span::new(0.0, 0.12),
            main_length: Span::new(0.45, 0.75),
            branches: 1,
            branch_length: Span::new(0.18, 0.32),
            branch_spread: Span::new(0.35, 0.9),
            micro: 0,
            micro_length: Span::new(0.06, 0.12),
            micro_spread: Span::new(0.5, 1.3),
            ring: None,
            rotation_jitter: 0.25,
            width: Span::new(1.6, 2.2),
            intensity: 0.35,
            burst: BurstDescriptor::default(),
        }
    }
}

impl StageTemplate {
    pub fn validate(&self, entry: &str) -> ConfigResult<()> {
        self.start_radius.validate(entry, "start_radius")?;
        self.main_length.validate(entry, "main_length")?;
        self.branch_length.validate(entry, "branch_length")?;
        self.branch_spread.validate(entry, "branch_spread")?;
        self.micro_length.validate(entry, "micro_length")?;
        self.micro_spread.validate(entry, "micro_spread")?;
        self.width.validate(entry, "width")?;
        check_non_negative(entry, "rotation_jitter", self.rotation_jitter)?;
        check_unit(entry, "intensity", self.intensity)?;
        check_non_negative(entry, "start_radius", self.start_radius.min)?;
        check_non_negative(entry, "main_length", self.main_length.min)?;
        check_non_negative(entry, "branch_length", self.branch_length.min)?;
        check_non_negative(entry, "micro_length", self.micro_length.min)?;
        check_non_negative(entry, "width", self.width.min)?;
        if let Some(ring) = &self.ring {
            ring.radius.validate(entry, "ring.radius")?;
            ring.width.validate(entry, "ring.width")?;
            check_unit(entry, "ring.radius", ring.radius.min)?;
            check_unit(entry, "ring.radius", ring.radius.max)?;
            check_unit(entry, "ring.wobble", ring.wobble)?;
        }
        Ok(())
    }
}

/// Complete crack profile for one asteroid family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackProfile {
    pub stages: [StageTemplate; STAGE_COUNT],
    /// Health fraction at or below which each stage is revealed
    pub reveal_thresholds: [f32; STAGE_COUNT],
}

impl Default for CrackProfile {
    fn default() -> Self {
        super::defaults::default_profile()
    }
}

impl CrackProfile {
    /// Template for a 1-based stage index
    pub fn stage(&self, stage: u8) -> &StageTemplate {
        let idx = (stage.max(1) as usize - 1).min(STAGE_COUNT - 1);
        &self.stages[idx]
    }

    pub fn validate(&self, entry: &str) -> ConfigResult<()> {
        for template in &self.stages {
            template.validate(entry)?;
        }
        for threshold in self.reveal_thresholds {
            check_unit(entry, "reveal_thresholds", threshold)?;
        }
        Ok(())
    }
}

/// Child penalty weight by parent segment kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildPenalties {
    pub trunk: f32,
    pub extension: f32,
    pub branch: f32,
}

impl Default for ChildPenalties {
    fn default() -> Self {
        Self {
            trunk: 0.35,
            extension: 0.5,
            branch: 0.8,
        }
    }
}

/// Tunables shared by every profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRules {
    /// Probability that a main-ray attempt extends an existing trunk
    pub continuation_bias: f32,
    /// Probability of starting a new root when not extending
    pub new_root_chance: f32,
    /// Angular perturbation applied to extensions, radians
    pub continuation_jitter: f32,
    pub child_penalty: ChildPenalties,
    /// Extra weight penalty when the candidate parent is itself a branch
    pub branch_parent_penalty: f32,
    /// Jitter of the anchor point along a parent (fraction of its length)
    pub anchor_jitter: f32,
    pub micro_anchor_jitter: f32,
    /// Minimum segment length as a fraction of the min surface radius
    pub min_segment_length_ratio: f32,
    /// Distance kept between any endpoint and the boundary
    pub surface_margin: f32,
    /// Attempts allowed per requested segment
    pub retry_factor: u32,
}

impl Default for GrowthRules {
    fn default() -> Self {
        Self {
            continuation_bias: 0.65,
            new_root_chance: 0.35,
            continuation_jitter: 0.35,
            child_penalty: ChildPenalties::default(),
            branch_parent_penalty: 0.6,
            anchor_jitter: 0.12,
            micro_anchor_jitter: 0.3,
            min_segment_length_ratio: 0.06,
            surface_margin: 2.0,
            retry_factor: 4,
        }
    }
}

impl GrowthRules {
    pub fn validate(&self) -> ConfigResult<()> {
        let entry = "growth";
        check_unit(entry, "continuation_bias", self.continuation_bias)?;
        check_unit(entry, "new_root_chance", self.new_root_chance)?;
        check_non_negative(entry, "continuation_jitter", self.continuation_jitter)?;
        check_non_negative(entry, "child_penalty.trunk", self.child_penalty.trunk)?;
        check_non_negative(entry, "child_penalty.extension", self.child_penalty.extension)?;
        check_non_negative(entry, "child_penalty.branch", self.child_penalty.branch)?;
        check_non_negative(entry, "branch_parent_penalty", self.branch_parent_penalty)?;
        check_unit(entry, "anchor_jitter", self.anchor_jitter)?;
        check_unit(entry, "micro_anchor_jitter", self.micro_anchor_jitter)?;
        check_unit(entry, "min_segment_length_ratio", self.min_segment_length_ratio)?;
        check_non_negative(entry, "surface_margin", self.surface_margin)?;
        Ok(())
    }

    /// Attempt budget for `target` placements
    pub fn retry_budget(&self, target: u32) -> u32 {
        target.saturating_mul(self.retry_factor.max(1))
    }
}
