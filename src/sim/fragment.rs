//! Fragmentation of destroyed bodies
//!
//! Pure function of the destroyed body's state, its rule set and a stream
//! derived from its crack seed with the fragment salt. Crack generation uses
//! a different stream, so crack profile changes never move fragments.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::rng::{CrackRng, FRAGMENT_SALT};
use crate::consts::{LARGE_BASE_SPEED, MEDIUM_BASE_SPEED, SMALL_BASE_SPEED};
use crate::polar_to_cartesian;
use crate::tuning::{FragmentRuleSet, MAX_FRAGMENT_COUNT, Registry};

/// Body size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Large,
    Medium,
    Small,
}

impl SizeClass {
    /// Size of the children this size splits into
    pub fn smaller(self) -> Option<SizeClass> {
        match self {
            SizeClass::Large => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Small),
            SizeClass::Small => None,
        }
    }

    /// Base travel speed for a freshly spawned body of this size
    pub fn base_speed(self) -> f32 {
        match self {
            SizeClass::Large => LARGE_BASE_SPEED,
            SizeClass::Medium => MEDIUM_BASE_SPEED,
            SizeClass::Small => SMALL_BASE_SPEED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Large => "large",
            SizeClass::Medium => "medium",
            SizeClass::Small => "small",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "large" | "l" => Some(SizeClass::Large),
            "medium" | "med" | "m" => Some(SizeClass::Medium),
            "small" | "s" => Some(SizeClass::Small),
            _ => None,
        }
    }
}

/// State of a body at the moment it is destroyed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentRequest {
    pub parent_id: u32,
    pub size: SizeClass,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Splits since the original spawn
    pub generation: u8,
    pub wave: u32,
    pub crack_seed: u64,
}

/// A child body to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentDescriptor {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: SizeClass,
    pub wave: u32,
    pub parent_id: u32,
    pub generation: u8,
}

/// Split a destroyed body into child descriptors
///
/// Returns an empty list for the smallest size, past the rule set's
/// generation cap, or when the drawn count is zero.
pub fn fragment(request: &FragmentRequest, rules: &FragmentRuleSet) -> Vec<FragmentDescriptor> {
    let Some(child_size) = request.size.smaller() else {
        return Vec::new();
    };
    let Some(generation) = request.generation.checked_add(1) else {
        return Vec::new();
    };
    if generation > rules.max_generation {
        log::trace!(
            "body {} at generation {} hit cap {}",
            request.parent_id,
            request.generation,
            rules.max_generation
        );
        return Vec::new();
    }

    let mut rng = CrackRng::derived(request.crack_seed, FRAGMENT_SALT);
    let count = rules
        .counts
        .get(request.size)
        .sample(&mut rng)
        .min(MAX_FRAGMENT_COUNT);
    if count == 0 {
        return Vec::new();
    }

    let radius = if request.radius.is_finite() {
        request.radius.max(0.0)
    } else {
        0.0
    };
    let inherited = request.velocity * rules.inherit_velocity;
    let base_speed = child_size.base_speed();
    let speed_range = *rules.speed_multiplier.get(child_size);
    let phase = rng.next_f32() * TAU;
    let step = TAU / count as f32;

    let fragments: Vec<FragmentDescriptor> = (0..count)
        .map(|i| {
            let slot = phase + i as f32 * step;
            let travel = slot + rng.signed(rules.angle_jitter);
            let spawn = slot + rng.signed(rules.radial_offset_jitter);
            let distance = rules.radial_distance.sample(&mut rng) * radius;
            let speed = base_speed * speed_range.sample(&mut rng);

            FragmentDescriptor {
                position: request.position + polar_to_cartesian(distance, spawn),
                velocity: polar_to_cartesian(speed, travel) + inherited,
                size: child_size,
                wave: request.wave,
                parent_id: request.parent_id,
                generation,
            }
        })
        .collect();

    log::debug!(
        "body {} ({}) split into {} {} fragments",
        request.parent_id,
        request.size.as_str(),
        fragments.len(),
        child_size.as_str()
    );
    fragments
}

/// Split using the rule set bound to `variant_key`
pub fn fragment_variant(
    request: &FragmentRequest,
    registry: &Registry,
    variant_key: &str,
) -> Vec<FragmentDescriptor> {
    fragment(request, registry.rules_for(variant_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{CountRange, DEFAULT_KEY, Span};
    use proptest::prelude::*;

    fn request(size: SizeClass, seed: u64, generation: u8) -> FragmentRequest {
        FragmentRequest {
            parent_id: 17,
            size,
            position: Vec2::new(100.0, -40.0),
            velocity: Vec2::new(30.0, 10.0),
            radius: 40.0,
            generation,
            wave: 3,
            crack_seed: seed,
        }
    }

    #[test]
    fn test_large_default_scenario() {
        let registry = Registry::builtin();
        let out = fragment_variant(&request(SizeClass::Large, 42, 0), &registry, DEFAULT_KEY);
        assert!((3..=4).contains(&out.len()));
        for f in &out {
            assert_eq!(f.size, SizeClass::Medium);
            assert_eq!(f.generation, 1);
            assert_eq!(f.parent_id, 17);
            assert_eq!(f.wave, 3);
        }
    }

    #[test]
    fn test_small_never_fragments() {
        let registry = Registry::builtin();
        for key in registry.rule_keys() {
            for seed in 0..10 {
                assert!(fragment_variant(&request(SizeClass::Small, seed, 0), &registry, key).is_empty());
            }
        }
    }

    #[test]
    fn test_generation_cap() {
        let rules = FragmentRuleSet::default();
        assert!(!fragment(&request(SizeClass::Medium, 1, 1), &rules).is_empty());
        assert!(fragment(&request(SizeClass::Medium, 1, 2), &rules).is_empty());
        assert!(fragment(&request(SizeClass::Large, 1, u8::MAX), &rules).is_empty());
    }

    #[test]
    fn test_zero_count_is_empty() {
        let rules = FragmentRuleSet {
            counts: crate::tuning::SizeTable {
                large: CountRange::new(0, 0),
                medium: CountRange::new(0, 0),
                small: CountRange::new(0, 0),
            },
            ..FragmentRuleSet::default()
        };
        assert!(fragment(&request(SizeClass::Large, 5, 0), &rules).is_empty());
    }

    #[test]
    fn test_unvalidated_count_is_capped() {
        let mut rules = FragmentRuleSet::default();
        rules.counts.large = CountRange::new(u32::MAX, u32::MAX);
        let out = fragment(&request(SizeClass::Large, 8, 0), &rules);
        assert_eq!(out.len(), MAX_FRAGMENT_COUNT as usize);
    }

    #[test]
    fn test_deterministic() {
        let rules = FragmentRuleSet::default();
        let a = fragment(&request(SizeClass::Large, 9001, 0), &rules);
        let b = fragment(&request(SizeClass::Large, 9001, 0), &rules);
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_distance_within_range() {
        let rules = FragmentRuleSet::default();
        let req = request(SizeClass::Large, 77, 0);
        for f in fragment(&req, &rules) {
            let d = (f.position - req.position).length();
            assert!(d >= rules.radial_distance.min * req.radius - 1e-3);
            assert!(d <= rules.radial_distance.max * req.radius + 1e-3);
        }
    }

    #[test]
    fn test_velocity_inheritance() {
        // No jitter and a fixed speed: outward components cancel exactly
        let rules = FragmentRuleSet {
            angle_jitter: 0.0,
            speed_multiplier: crate::tuning::SizeTable {
                large: Span::new(1.0, 1.0),
                medium: Span::new(1.0, 1.0),
                small: Span::new(1.0, 1.0),
            },
            ..FragmentRuleSet::default()
        };
        let req = request(SizeClass::Large, 3, 0);
        let out = fragment(&req, &rules);
        let mean = out.iter().map(|f| f.velocity).sum::<Vec2>() / out.len() as f32;
        let expected = req.velocity * rules.inherit_velocity;
        assert!((mean - expected).length() < 1e-3);
        for f in &out {
            let own = (f.velocity - expected).length();
            assert!((own - SizeClass::Medium.base_speed()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_crack_stream_does_not_leak() {
        use crate::sim::geometry::PolygonGeometry;
        use crate::sim::crack::generate_crack_layers;
        use crate::settings::DetailLevel;

        let registry = Registry::builtin();
        let req = request(SizeClass::Large, 555, 0);
        let before = fragment_variant(&req, &registry, DEFAULT_KEY);
        let geo = PolygonGeometry::regular(9, 40.0, 0.0);
        let _ = generate_crack_layers(&geo, req.crack_seed, "volatile", &registry, DetailLevel::High);
        let after = fragment_variant(&req, &registry, DEFAULT_KEY);
        assert_eq!(before, after);
    }

    #[test]
    fn test_size_parse() {
        assert_eq!(SizeClass::from_str("LARGE"), Some(SizeClass::Large));
        assert_eq!(SizeClass::from_str("med"), Some(SizeClass::Medium));
        assert_eq!(SizeClass::from_str("huge"), None);
        assert_eq!(SizeClass::Small.smaller(), None);
    }

    proptest! {
        #[test]
        fn prop_fragment_invariants(seed in any::<u64>(), generation in 0u8..4, size_idx in 0usize..3) {
            let size = [SizeClass::Large, SizeClass::Medium, SizeClass::Small][size_idx];
            let registry = Registry::builtin();
            for key in registry.rule_keys() {
                let rules = registry.rules_for(key);
                let out = fragment(&request(size, seed, generation), rules);
                if size == SizeClass::Small || generation + 1 > rules.max_generation {
                    prop_assert!(out.is_empty());
                } else {
                    let range = rules.counts.get(size);
                    prop_assert!(out.len() as u32 >= range.min && out.len() as u32 <= range.max);
                }
                for f in &out {
                    prop_assert_eq!(f.generation, generation + 1);
                    prop_assert!(f.generation <= rules.max_generation);
                    prop_assert_eq!(Some(f.size), size.smaller());
                }
            }
        }
    }
}
