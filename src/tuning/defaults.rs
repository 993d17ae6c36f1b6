//! Built-in profile, rule and variant tables
//!
//! These are the shipped balance values. A configuration document can
//! override any entry by key.

use std::collections::BTreeMap;

use super::profile::{CrackProfile, GrowthRules, RingSpec, Span, StageTemplate};
use super::registry::{RegistryConfig, VariantBinding};
use super::rules::{CountRange, FragmentRuleSet, SizeTable};
use crate::sim::BurstDescriptor;

pub const DEFAULT_KEY: &str = "default";
pub const DENSE_CORE_KEY: &str = "denseCore";
pub const VOLATILE_KEY: &str = "volatile";
pub const PARASITE_KEY: &str = "parasite";
pub const CRYSTAL_KEY: &str = "crystal";

fn burst(particles: u32, speed: f32, flash: f32, shake: f32) -> BurstDescriptor {
    BurstDescriptor {
        particles,
        speed,
        flash,
        shake,
        ..Default::default()
    }
}

/// Baseline three-stage profile
pub fn default_profile() -> CrackProfile {
    let stage1 = StageTemplate::default();
    let stage2 = StageTemplate {
        main_rays: 2,
        main_length: Span::new(0.2, 0.4),
        branches: 3,
        micro: 4,
        rotation_jitter: 0.3,
        width: Span::new(1.3, 1.8),
        intensity: 0.65,
        burst: burst(12, 55.0, 0.3, 0.15),
        ..StageTemplate::default()
    };
    let stage3 = StageTemplate {
        main_rays: 2,
        main_length: Span::new(0.15, 0.35),
        branches: 4,
        micro: 8,
        ring: Some(RingSpec::default()),
        rotation_jitter: 0.35,
        width: Span::new(1.0, 1.5),
        intensity: 1.0,
        burst: burst(20, 70.0, 0.5, 0.3),
        ..StageTemplate::default()
    };

    CrackProfile {
        stages: [stage1, stage2, stage3],
        reveal_thresholds: [0.75, 0.5, 0.25],
    }
}

/// Heavy rocks: fewer, thicker trunks and a tight inner ring
fn dense_core_profile() -> CrackProfile {
    let mut profile = default_profile();
    let [s1, s2, s3] = &mut profile.stages;
    s1.main_rays = 2;
    s1.main_length = Span::new(0.35, 0.55);
    s1.width = Span::new(2.2, 2.8);
    s1.branches = 0;
    s2.main_rays = 2;
    s2.width = Span::new(1.8, 2.4);
    s2.ring = Some(RingSpec {
        radius: Span::new(0.25, 0.35),
        segments: 8,
        wobble: 0.05,
        width: Span::new(1.4, 1.8),
    });
    s3.branches = 3;
    s3.micro = 6;
    s3.width = Span::new(1.4, 2.0);
    profile.reveal_thresholds = [0.8, 0.55, 0.3];
    profile
}

/// Unstable rocks: many long trunks, aggressive branching
fn volatile_profile() -> CrackProfile {
    let mut profile = default_profile();
    let [s1, s2, s3] = &mut profile.stages;
    s1.main_rays = 5;
    s1.main_length = Span::new(0.55, 0.85);
    s1.rotation_jitter = 0.4;
    s1.branches = 2;
    s1.burst = burst(14, 60.0, 0.35, 0.2);
    s2.main_rays = 3;
    s2.branches = 5;
    s2.micro = 6;
    s3.main_rays = 3;
    s3.branches = 6;
    s3.micro = 10;
    s3.ring = None;
    s3.burst = burst(32, 95.0, 0.8, 0.5);
    profile.reveal_thresholds = [0.7, 0.45, 0.2];
    profile
}

/// Infested rocks: dense micro-cracking, wide spreads
fn parasite_profile() -> CrackProfile {
    let mut profile = default_profile();
    let [s1, s2, s3] = &mut profile.stages;
    s1.main_rays = 4;
    s1.micro = 3;
    s1.width = Span::new(1.2, 1.6);
    s2.branch_spread = Span::new(0.6, 1.3);
    s2.micro = 10;
    s3.micro = 16;
    s3.micro_spread = Span::new(0.8, 1.6);
    s3.ring = Some(RingSpec {
        radius: Span::new(0.55, 0.8),
        segments: 14,
        wobble: 0.15,
        width: Span::new(0.6, 0.9),
    });
    profile
}

/// Crystalline rocks: straight evenly spread trunks and two rings
fn crystal_profile() -> CrackProfile {
    let mut profile = default_profile();
    let [s1, s2, s3] = &mut profile.stages;
    s1.main_rays = 6;
    s1.rotation_jitter = 0.05;
    s1.branch_spread = Span::new(0.5, 0.55);
    s1.width = Span::new(1.2, 1.5);
    s2.main_rays = 3;
    s2.branch_spread = Span::new(0.5, 0.55);
    s2.ring = Some(RingSpec {
        radius: Span::new(0.3, 0.4),
        segments: 6,
        wobble: 0.0,
        width: Span::new(0.9, 1.1),
    });
    s3.branch_spread = Span::new(1.0, 1.05);
    s3.ring = Some(RingSpec {
        radius: Span::new(0.6, 0.75),
        segments: 12,
        wobble: 0.0,
        width: Span::new(0.8, 1.0),
    });
    profile
}

fn dense_core_rules() -> FragmentRuleSet {
    FragmentRuleSet {
        counts: SizeTable {
            large: CountRange::new(2, 3),
            medium: CountRange::new(2, 2),
            small: CountRange::new(0, 0),
        },
        inherit_velocity: 0.55,
        radial_distance: Span::new(0.2, 0.4),
        speed_multiplier: SizeTable {
            large: Span::new(0.7, 0.9),
            medium: Span::new(0.7, 0.95),
            small: Span::new(0.8, 1.1),
        },
        ..FragmentRuleSet::default()
    }
}

fn volatile_rules() -> FragmentRuleSet {
    FragmentRuleSet {
        counts: SizeTable {
            large: CountRange::new(4, 6),
            medium: CountRange::new(3, 4),
            small: CountRange::new(0, 0),
        },
        inherit_velocity: 0.25,
        angle_jitter: 0.6,
        radial_distance: Span::new(0.35, 0.7),
        speed_multiplier: SizeTable {
            large: Span::new(1.1, 1.4),
            medium: Span::new(1.2, 1.6),
            small: Span::new(1.3, 1.8),
        },
        ..FragmentRuleSet::default()
    }
}

fn parasite_rules() -> FragmentRuleSet {
    FragmentRuleSet {
        counts: SizeTable {
            large: CountRange::new(3, 5),
            medium: CountRange::new(2, 4),
            small: CountRange::new(0, 0),
        },
        max_generation: 3,
        ..FragmentRuleSet::default()
    }
}

fn crystal_rules() -> FragmentRuleSet {
    FragmentRuleSet {
        counts: SizeTable {
            large: CountRange::new(4, 4),
            medium: CountRange::new(3, 3),
            small: CountRange::new(0, 0),
        },
        angle_jitter: 0.05,
        radial_offset_jitter: 0.05,
        max_generation: 1,
        ..FragmentRuleSet::default()
    }
}

/// Full built-in table set: 5 profiles, 5 rule sets, 7 variants
pub fn builtin_config() -> RegistryConfig {
    let profiles = BTreeMap::from([
        (DEFAULT_KEY.to_string(), default_profile()),
        (DENSE_CORE_KEY.to_string(), dense_core_profile()),
        (VOLATILE_KEY.to_string(), volatile_profile()),
        (PARASITE_KEY.to_string(), parasite_profile()),
        (CRYSTAL_KEY.to_string(), crystal_profile()),
    ]);

    let rules = BTreeMap::from([
        (DEFAULT_KEY.to_string(), FragmentRuleSet::default()),
        (DENSE_CORE_KEY.to_string(), dense_core_rules()),
        (VOLATILE_KEY.to_string(), volatile_rules()),
        (PARASITE_KEY.to_string(), parasite_rules()),
        (CRYSTAL_KEY.to_string(), crystal_rules()),
    ]);

    let bind = |profile: &str, rules: &str| VariantBinding {
        profile: profile.to_string(),
        rules: rules.to_string(),
    };
    let variants = BTreeMap::from([
        ("standard".to_string(), bind(DEFAULT_KEY, DEFAULT_KEY)),
        ("heavy".to_string(), bind(DENSE_CORE_KEY, DEFAULT_KEY)),
        (DENSE_CORE_KEY.to_string(), bind(DENSE_CORE_KEY, DENSE_CORE_KEY)),
        (VOLATILE_KEY.to_string(), bind(VOLATILE_KEY, VOLATILE_KEY)),
        (PARASITE_KEY.to_string(), bind(PARASITE_KEY, PARASITE_KEY)),
        (CRYSTAL_KEY.to_string(), bind(CRYSTAL_KEY, CRYSTAL_KEY)),
        ("shard".to_string(), bind(CRYSTAL_KEY, VOLATILE_KEY)),
    ]);

    RegistryConfig {
        profiles,
        rules,
        variants,
        growth: Some(GrowthRules::default()),
    }
}
