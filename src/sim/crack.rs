//! Crack layer generation
//!
//! Grows a three-stage crack pattern inside an asteroid outline. Each stage:
//!
//! 1. Main rays: stage 1 seeds trunks from the centroid; later stages extend
//!    open trunk tips (or occasionally start a new root)
//! 2. Branches off existing trunks, extensions and branches
//! 3. Micro-cracks, same mechanism with shorter, thinner, jumpier placement
//! 4. An optional ring of chords
//!
//! Every placement is bounded by the outline and by the safe radius
//! (`min_surface_radius - surface_margin`). Placements that do not fit are
//! retried a bounded number of times and then dropped, so a layer may come
//! out with fewer segments than its template asks for. Generation never
//! fails.

use glam::Vec2;
use std::f32::consts::TAU;

use super::geometry::{PolygonGeometry, measure_ray_distance, ray_circle_exit};
use super::rng::{CRACK_SALT, CrackRng};
use super::segment::{CrackLayer, CrackSegment, SegmentKind};
use crate::settings::DetailLevel;
use crate::{cartesian_to_polar, normalize_angle, polar_to_cartesian};
use crate::tuning::{CrackProfile, GrowthRules, Registry, STAGE_COUNT, Span, StageTemplate};

/// Angular step between successive late roots
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Branch width relative to the stage's main width
const BRANCH_WIDTH_SCALE: f32 = 0.7;
/// Micro-crack width relative to the stage's main width
const MICRO_WIDTH_SCALE: f32 = 0.45;

/// Anchor range along a parent for branches
const BRANCH_ANCHOR: Span = Span::new(0.2, 0.85);
/// Anchor range along a parent for micro-cracks
const MICRO_ANCHOR: Span = Span::new(0.1, 0.95);

/// Open (or exhausted) trunk chain
#[derive(Debug, Clone, Copy)]
struct TrunkTip {
    root: u32,
    tip: u32,
    exhausted: bool,
}

/// Stage-by-stage crack pattern builder
///
/// Each call to [`CrackBuilder::next_stage`] builds one complete stage.
/// Dropping the builder between calls is the only safe way to abandon a
/// build; a stage is never left half-finished.
pub struct CrackBuilder<'a> {
    geometry: &'a PolygonGeometry,
    profile: &'a CrackProfile,
    growth: &'a GrowthRules,
    detail: DetailLevel,
    rng: CrackRng,
    arena: Vec<CrackSegment>,
    trunks: Vec<TrunkTip>,
    base_rotation: f32,
    safe_radius: f32,
    min_length: f32,
    layers: Vec<CrackLayer>,
}

impl<'a> CrackBuilder<'a> {
    /// Start a build for one asteroid
    ///
    /// `crack_seed` is the entity's crack seed; the crack stream is derived
    /// from it so fragmentation draws are unaffected. Unknown profile keys
    /// fall back to "default".
    pub fn new(
        geometry: &'a PolygonGeometry,
        crack_seed: u64,
        profile_key: &str,
        registry: &'a Registry,
        detail: DetailLevel,
    ) -> Self {
        Self::with_profile(
            geometry,
            crack_seed,
            registry.profile_for(profile_key),
            registry.growth(),
            detail,
        )
    }

    /// Start a build with an explicit profile and growth rules
    pub fn with_profile(
        geometry: &'a PolygonGeometry,
        crack_seed: u64,
        profile: &'a CrackProfile,
        growth: &'a GrowthRules,
        detail: DetailLevel,
    ) -> Self {
        let mut rng = CrackRng::derived(crack_seed, CRACK_SALT);
        let base_rotation = rng.next_f32() * TAU;
        let min_surface = geometry.min_surface_radius();
        let safe_radius = (min_surface - growth.surface_margin).max(0.0);
        let min_length = growth.min_segment_length_ratio * min_surface;

        Self {
            geometry,
            profile,
            growth,
            detail,
            rng,
            arena: Vec::new(),
            trunks: Vec::new(),
            base_rotation,
            safe_radius,
            min_length,
            layers: Vec::with_capacity(STAGE_COUNT),
        }
    }

    /// Radius no endpoint may exceed
    pub fn safe_radius(&self) -> f32 {
        self.safe_radius
    }

    /// Shortest segment the builder will emit
    pub fn min_length(&self) -> f32 {
        self.min_length
    }

    /// Stages built so far
    pub fn layers(&self) -> &[CrackLayer] {
        &self.layers
    }

    /// Build the next stage, or `None` once all three exist
    pub fn next_stage(&mut self) -> Option<&CrackLayer> {
        if self.layers.len() >= STAGE_COUNT {
            return None;
        }
        let stage = self.layers.len() as u8 + 1;
        let layer = self.build_stage(stage);
        self.layers.push(layer);
        self.layers.last()
    }

    /// Build any remaining stages and return all three layers
    pub fn finish(mut self) -> [CrackLayer; STAGE_COUNT] {
        let mut built = std::mem::take(&mut self.layers).into_iter();
        std::array::from_fn(|i| {
            built
                .next()
                .unwrap_or_else(|| self.build_stage(i as u8 + 1))
        })
    }

    fn build_stage(&mut self, stage: u8) -> CrackLayer {
        let profile = self.profile;
        let template = profile.stage(stage);
        let first = self.arena.len();

        if stage == 1 {
            self.grow_trunks(stage, template);
        } else {
            self.grow_main(stage, template);
        }

        let branches = DetailLevel::scale(template.branches, self.detail.branch_scale());
        self.grow_offshoots(stage, template, SegmentKind::Branch, branches);

        let micro = DetailLevel::scale(template.micro, self.detail.micro_scale());
        self.grow_offshoots(stage, template, SegmentKind::Micro, micro);

        if self.detail.rings_enabled() {
            self.grow_ring(stage, template);
        }

        // Snapshot: later stages bump child counts in the arena, not here
        let segments = self.arena[first..].to_vec();
        let layer = CrackLayer {
            stage,
            segments,
            intensity: template.intensity,
            burst: template.burst,
        };
        log::debug!(
            "crack stage {stage}: {} main, {} branch, {} micro, {} ring",
            layer.count(SegmentKind::Trunk) + layer.count(SegmentKind::Extension),
            layer.count(SegmentKind::Branch),
            layer.count(SegmentKind::Micro),
            layer.count(SegmentKind::Ring),
        );
        layer
    }

    /// Stage 1: evenly slotted trunks around the base rotation
    fn grow_trunks(&mut self, stage: u8, template: &StageTemplate) {
        let target = template.main_rays;
        let budget = self.growth.retry_budget(target);
        let mut made = 0;
        let mut attempts = 0;

        while made < target && attempts < budget {
            attempts += 1;
            let slot = made as f32 * TAU / target as f32;
            let angle = self.base_rotation + slot + self.rng.signed(template.rotation_jitter);
            if self.try_trunk(stage, template, angle) {
                made += 1;
            }
        }

        if made < target {
            log::trace!("stage {stage}: placed {made}/{target} trunks");
        }
    }

    /// Stages 2-3: extend open trunks, occasionally seed a new root
    fn grow_main(&mut self, stage: u8, template: &StageTemplate) {
        let target = template.main_rays;
        let budget = self.growth.retry_budget(target);
        let mut made = 0;
        let mut attempts = 0;

        while made < target && attempts < budget {
            attempts += 1;

            let open: Vec<usize> = self
                .trunks
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.exhausted)
                .map(|(i, _)| i)
                .collect();

            if !open.is_empty() && self.rng.chance(self.growth.continuation_bias) {
                let pick = pick_index(&mut self.rng, open.len());
                if self.try_extend(stage, template, open[pick]) {
                    made += 1;
                }
            } else if self.rng.chance(self.growth.new_root_chance) {
                let angle = self.base_rotation
                    + self.trunks.len() as f32 * GOLDEN_ANGLE
                    + self.rng.signed(template.rotation_jitter);
                if self.try_trunk(stage, template, angle) {
                    made += 1;
                }
            }
        }

        if made < target {
            log::trace!("stage {stage}: placed {made}/{target} main segments");
        }
    }

    fn try_trunk(&mut self, stage: u8, template: &StageTemplate, angle: f32) -> bool {
        let dir = polar_to_cartesian(1.0, angle);
        let start_radius = template.start_radius.sample(&mut self.rng) * self.safe_radius;
        let limit = self
            .geometry
            .surface_distance(angle, self.growth.surface_margin)
            .min(self.safe_radius);
        let available = limit - start_radius;
        if !self.fits(available) {
            return false;
        }

        let length = self.sample_length(template.main_length, available);
        let width = template.width.sample(&mut self.rng);
        let start = dir * start_radius;
        let id = self.next_id();
        self.push(
            stage,
            SegmentKind::Trunk,
            None,
            Some(id),
            start,
            start + dir * length,
            width,
        );
        self.trunks.push(TrunkTip {
            root: id,
            tip: id,
            exhausted: false,
        });
        true
    }

    fn try_extend(&mut self, stage: u8, template: &StageTemplate, trunk: usize) -> bool {
        let TrunkTip { root, tip, .. } = self.trunks[trunk];
        let (origin, tip_angle) = {
            let segment = &self.arena[tip as usize];
            (segment.end, segment.angle)
        };

        let angle = normalize_angle(tip_angle + self.rng.signed(self.growth.continuation_jitter));
        let available = self.available_from(origin, angle);
        if !self.fits(available) {
            self.trunks[trunk].exhausted = true;
            return false;
        }

        let length = self.sample_length(template.main_length, available);
        let width = template.width.sample(&mut self.rng);
        let dir = polar_to_cartesian(1.0, angle);
        let id = self.push(
            stage,
            SegmentKind::Extension,
            Some(tip),
            Some(root),
            origin,
            origin + dir * length,
            width,
        );
        self.arena[tip as usize].continuations += 1;
        self.trunks[trunk].tip = id;
        true
    }

    /// Branches or micro-cracks hung off existing segments
    fn grow_offshoots(
        &mut self,
        stage: u8,
        template: &StageTemplate,
        kind: SegmentKind,
        target: u32,
    ) {
        let budget = self.growth.retry_budget(target);
        let mut made = 0;
        let mut attempts = 0;

        while made < target && attempts < budget {
            attempts += 1;
            let Some(parent) = self.pick_parent(kind) else {
                break;
            };
            if self.try_offshoot(stage, template, kind, parent) {
                made += 1;
            }
        }

        if made < target {
            log::trace!("stage {stage}: placed {made}/{target} {}", kind.as_str());
        }
    }

    /// Length-weighted parent pick, discounted by existing children
    fn pick_parent(&mut self, kind: SegmentKind) -> Option<usize> {
        let penalties = self.growth.child_penalty;
        let branch_penalty = self.growth.branch_parent_penalty;
        let weight = |segment: &CrackSegment| -> f32 {
            let allowed = match kind {
                SegmentKind::Micro => segment.kind.can_parent_micro(),
                _ => segment.kind.can_parent_branch(),
            };
            if !allowed {
                return 0.0;
            }
            let (per_child, extra) = match segment.kind {
                SegmentKind::Trunk => (penalties.trunk, 0.0),
                SegmentKind::Extension => (penalties.extension, 0.0),
                _ => (penalties.branch, branch_penalty),
            };
            segment.length / (1.0 + segment.children as f32 * per_child + extra)
        };

        let total: f32 = self.arena.iter().map(weight).sum();
        if total.is_nan() || total <= 0.0 {
            return None;
        }

        let mut roll = self.rng.next_f32() * total;
        let mut last = None;
        for (i, segment) in self.arena.iter().enumerate() {
            let w = weight(segment);
            if w <= 0.0 {
                continue;
            }
            last = Some(i);
            if roll < w {
                return Some(i);
            }
            roll -= w;
        }
        last
    }

    fn try_offshoot(
        &mut self,
        stage: u8,
        template: &StageTemplate,
        kind: SegmentKind,
        parent: usize,
    ) -> bool {
        let (anchor_span, jitter, spread, length_span, width_scale) = match kind {
            SegmentKind::Micro => (
                MICRO_ANCHOR,
                self.growth.micro_anchor_jitter,
                template.micro_spread,
                template.micro_length,
                MICRO_WIDTH_SCALE,
            ),
            _ => (
                BRANCH_ANCHOR,
                self.growth.anchor_jitter,
                template.branch_spread,
                template.branch_length,
                BRANCH_WIDTH_SCALE,
            ),
        };

        let (parent_id, parent_root, anchor, parent_angle) = {
            let t = (anchor_span.sample(&mut self.rng) + self.rng.signed(jitter)).clamp(0.05, 0.95);
            let segment = &self.arena[parent];
            (segment.id, segment.root, segment.point_at(t), segment.angle)
        };

        let angle = normalize_angle(parent_angle + self.rng.sign() * spread.sample(&mut self.rng));
        let available = self.available_from(anchor, angle);
        if !self.fits(available) {
            return false;
        }

        let length = self.sample_length(length_span, available);
        let width = template.width.sample(&mut self.rng) * width_scale;
        let dir = polar_to_cartesian(1.0, angle);
        self.push(
            stage,
            kind,
            Some(parent_id),
            parent_root,
            anchor,
            anchor + dir * length,
            width,
        );
        self.arena[parent].children += 1;
        true
    }

    /// Concentric chords, parent-less and root-less
    fn grow_ring(&mut self, stage: u8, template: &StageTemplate) {
        let Some(ring) = &template.ring else {
            return;
        };
        let count = ring.segments as usize;
        if count < 3 {
            return;
        }

        let min_surface = self.geometry.min_surface_radius();
        for _ in 0..self.growth.retry_budget(1) {
            let radius = (ring.radius.sample(&mut self.rng) * min_surface)
                .min(self.safe_radius)
                .max(0.0);
            let offset = self.base_rotation + self.rng.next_f32() * TAU / count as f32;
            let points: Vec<Vec2> = (0..count)
                .map(|k| {
                    let theta = offset + k as f32 * TAU / count as f32;
                    let r = (radius * (1.0 + self.rng.signed(ring.wobble)))
                        .min(self.safe_radius)
                        .min(self.geometry.surface_distance(theta, self.growth.surface_margin))
                        .max(0.0);
                    polar_to_cartesian(r, theta)
                })
                .collect();

            let fits = (0..count)
                .all(|k| self.fits((points[(k + 1) % count] - points[k]).length()));
            if !fits {
                continue;
            }

            for k in 0..count {
                let width = ring.width.sample(&mut self.rng);
                self.push(
                    stage,
                    SegmentKind::Ring,
                    None,
                    None,
                    points[k],
                    points[(k + 1) % count],
                    width,
                );
            }
            return;
        }

        log::trace!("stage {stage}: ring abandoned");
    }

    /// Usable length along `angle` from an interior point
    fn available_from(&self, origin: Vec2, angle: f32) -> f32 {
        let dir = polar_to_cartesian(1.0, angle);
        let to_edge = measure_ray_distance(
            self.geometry.edges(),
            origin,
            angle,
            self.growth.surface_margin,
        );
        to_edge.min(ray_circle_exit(origin, dir, self.safe_radius))
    }

    /// Whether a segment of up to `available` may be placed
    fn fits(&self, available: f32) -> bool {
        available > 0.0 && available >= self.min_length
    }

    fn sample_length(&mut self, span: Span, available: f32) -> f32 {
        (span.sample(&mut self.rng) * self.safe_radius).clamp(self.min_length, available)
    }

    fn next_id(&self) -> u32 {
        self.arena.len() as u32
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        stage: u8,
        kind: SegmentKind,
        parent: Option<u32>,
        root: Option<u32>,
        start: Vec2,
        end: Vec2,
        width: f32,
    ) -> u32 {
        let id = self.next_id();
        let (length, angle) = cartesian_to_polar(end - start);
        self.arena.push(CrackSegment {
            id,
            stage,
            kind,
            parent,
            root,
            start,
            end,
            width,
            length,
            angle,
            children: 0,
            continuations: 0,
        });
        id
    }
}

fn pick_index(rng: &mut CrackRng, len: usize) -> usize {
    ((rng.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
}

/// Build all three crack layers for an asteroid
pub fn generate_crack_layers(
    geometry: &PolygonGeometry,
    crack_seed: u64,
    profile_key: &str,
    registry: &Registry,
    detail: DetailLevel,
) -> [CrackLayer; STAGE_COUNT] {
    CrackBuilder::new(geometry, crack_seed, profile_key, registry, detail).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::segment::SegmentIndex;
    use crate::tuning::{DEFAULT_KEY, RingSpec};
    use proptest::prelude::*;

    fn octagon() -> PolygonGeometry {
        PolygonGeometry::regular(8, 40.0, 0.0)
    }

    fn build(geometry: &PolygonGeometry, seed: u64, key: &str) -> [CrackLayer; 3] {
        let registry = Registry::builtin();
        generate_crack_layers(geometry, seed, key, &registry, DetailLevel::Medium)
    }

    fn all_segments(layers: &[CrackLayer]) -> impl Iterator<Item = &CrackSegment> {
        layers.iter().flat_map(|l| l.segments.iter())
    }

    #[test]
    fn test_octagon_scenario() {
        let registry = Registry::builtin();
        let layers = build(&octagon(), 12345, DEFAULT_KEY);
        assert_eq!(layers.len(), 3);
        let expected = registry.profile_for(DEFAULT_KEY).stages[0].main_rays as usize;
        assert_eq!(layers[0].count(SegmentKind::Trunk), expected);
    }

    #[test]
    fn test_determinism() {
        let geo = PolygonGeometry::jagged(5, 14, 50.0, 0.3);
        for key in ["default", "denseCore", "volatile", "parasite", "crystal"] {
            let a = build(&geo, 777, key);
            let b = build(&geo, 777, key);
            assert_eq!(a, b, "profile {key} not deterministic");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = build(&octagon(), 1, DEFAULT_KEY);
        let b = build(&octagon(), 2, DEFAULT_KEY);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_profile_falls_back() {
        let fallback = build(&octagon(), 12345, "doesNotExist");
        let default = build(&octagon(), 12345, DEFAULT_KEY);
        assert_eq!(fallback, default);
        for (i, layer) in fallback.iter().enumerate() {
            assert_eq!(layer.stage as usize, i + 1);
            assert!(layer.intensity > 0.0 && layer.intensity <= 1.0);
        }
    }

    #[test]
    fn test_boundedness_all_profiles() {
        let registry = Registry::builtin();
        let growth = registry.growth();
        for seed in 0..20u64 {
            let geo = PolygonGeometry::jagged(seed, 11, 45.0, 0.35);
            let safe = geo.min_surface_radius() - growth.surface_margin;
            for key in registry.profile_keys() {
                let layers = build(&geo, seed, key);
                for segment in all_segments(&layers) {
                    assert!(
                        segment.max_radius() <= safe + 1e-3,
                        "{key}/{seed}: segment {} reaches {} > {safe}",
                        segment.id,
                        segment.max_radius()
                    );
                }
            }
        }
    }

    #[test]
    fn test_minimum_length_respected() {
        let registry = Registry::builtin();
        let geo = octagon();
        let min_len = registry.growth().min_segment_length_ratio * geo.min_surface_radius();
        for key in registry.profile_keys() {
            for segment in all_segments(&build(&geo, 99, key)) {
                assert!(segment.length >= min_len - 1e-3);
            }
        }
    }

    #[test]
    fn test_tree_structure() {
        let layers = build(&PolygonGeometry::jagged(3, 12, 60.0, 0.2), 4242, "parasite");
        let index = SegmentIndex::new(&layers);

        let mut previous_id = None;
        for segment in all_segments(&layers) {
            // Ids are dense and in creation order
            assert_eq!(segment.id, previous_id.map_or(0, |p| p + 1));
            previous_id = Some(segment.id);

            match segment.kind {
                SegmentKind::Trunk => {
                    assert_eq!(segment.parent, None);
                    assert_eq!(segment.root, Some(segment.id));
                }
                SegmentKind::Ring => {
                    assert_eq!(segment.parent, None);
                    assert_eq!(segment.root, None);
                }
                _ => {
                    let parent = index.get(segment.parent.unwrap()).unwrap();
                    assert!(parent.id < segment.id);
                    assert_ne!(parent.kind, SegmentKind::Ring);
                    if segment.kind == SegmentKind::Micro {
                        assert_ne!(parent.kind, SegmentKind::Micro);
                    }
                    let chain = index.root_chain(segment.id);
                    assert_eq!(chain.last().copied(), segment.root);
                }
            }
        }
    }

    fn extend_only() -> GrowthRules {
        GrowthRules {
            continuation_bias: 1.0,
            new_root_chance: 0.0,
            ..GrowthRules::default()
        }
    }

    #[test]
    fn test_extensions_continue_from_tips() {
        let registry = Registry::builtin();
        let growth = extend_only();
        let profile = registry.profile_for(DEFAULT_KEY);
        let geo = octagon();
        let mut extensions = 0;

        for seed in 0..10u64 {
            let layers =
                CrackBuilder::with_profile(&geo, seed, profile, &growth, DetailLevel::Medium).finish();
            let index = SegmentIndex::new(&layers);

            // No new roots once every attempt continues a trunk
            assert!(layers[1..].iter().all(|l| l.count(SegmentKind::Trunk) == 0));

            for segment in all_segments(&layers) {
                if segment.kind != SegmentKind::Extension {
                    continue;
                }
                extensions += 1;
                assert!(segment.stage >= 2);

                let parent = index.get(segment.parent.unwrap()).unwrap();
                assert!(parent.kind.is_main());
                assert_eq!(segment.start, parent.end);
                assert_eq!(segment.root, parent.root);

                // A tip is continued at most once
                let continued = index
                    .children_of(parent.id)
                    .iter()
                    .filter(|id| index.get(**id).unwrap().kind == SegmentKind::Extension)
                    .count();
                assert_eq!(continued, 1);

                // Snapshots only see continuations made in their own stage
                let expected = if parent.stage == segment.stage { 1 } else { 0 };
                assert_eq!(parent.continuations, expected);
            }
        }
        assert!(extensions > 0);
    }

    #[test]
    fn test_exhausted_trunks_are_not_extended() {
        let geo = octagon();
        let growth = extend_only();
        let mut profile = CrackProfile::default();
        profile.stages[0].start_radius = Span::new(0.0, 0.0);
        profile.stages[0].main_length = Span::new(1.0, 1.0);

        for seed in 0..10u64 {
            let layers =
                CrackBuilder::with_profile(&geo, seed, &profile, &growth, DetailLevel::Medium).finish();
            // Stage 1 trunks run all the way to the safe radius
            assert_eq!(
                layers[0].count(SegmentKind::Trunk),
                profile.stages[0].main_rays as usize
            );
            for layer in &layers[1..] {
                assert_eq!(layer.count(SegmentKind::Extension), 0);
                assert_eq!(layer.count(SegmentKind::Trunk), 0);
            }
        }
    }

    #[test]
    fn test_negative_ring_radius_stays_bounded() {
        let geo = octagon();
        let registry = Registry::builtin();
        let mut profile = CrackProfile::default();
        for stage in &mut profile.stages {
            stage.ring = Some(RingSpec {
                radius: Span::new(-5.0, 0.0),
                ..RingSpec::default()
            });
        }
        let safe = geo.min_surface_radius() - registry.growth().surface_margin;

        for seed in 0..50u64 {
            let layers =
                CrackBuilder::with_profile(&geo, seed, &profile, registry.growth(), DetailLevel::High)
                    .finish();
            for segment in all_segments(&layers) {
                assert!(segment.max_radius() <= safe + 1e-3);
            }
            assert!(layers.iter().all(|l| l.count(SegmentKind::Ring) == 0));
        }

        let json = r#"{ "profiles": { "default": { "stages": [
            { "ring": { "radius": [-5.0, 0.0] } }, {}, {}
        ] } } }"#;
        assert!(Registry::from_json(json).is_err());
    }

    #[test]
    fn test_counts_within_template() {
        let registry = Registry::builtin();
        for key in registry.profile_keys() {
            let profile = registry.profile_for(key);
            let layers = build(&octagon(), 31337, key);
            for (layer, template) in layers.iter().zip(profile.stages.iter()) {
                let main = layer.count(SegmentKind::Trunk) + layer.count(SegmentKind::Extension);
                assert!(main <= template.main_rays as usize);
                assert!(layer.count(SegmentKind::Branch) <= template.branches as usize);
                assert!(layer.count(SegmentKind::Micro) <= template.micro as usize);
                let ring = layer.count(SegmentKind::Ring);
                match &template.ring {
                    Some(ring_spec) => assert!(ring == 0 || ring == ring_spec.segments as usize),
                    None => assert_eq!(ring, 0),
                }
            }
        }
    }

    #[test]
    fn test_stagewise_build_matches_finish() {
        let geo = octagon();
        let registry = Registry::builtin();
        let mut builder = CrackBuilder::new(&geo, 8, "volatile", &registry, DetailLevel::High);
        let first = builder.next_stage().cloned().unwrap();
        assert_eq!(first.stage, 1);
        let layers = builder.finish();

        let direct = generate_crack_layers(&geo, 8, "volatile", &registry, DetailLevel::High);
        assert_eq!(layers, direct);
        assert_eq!(first, direct[0]);
    }

    #[test]
    fn test_next_stage_stops_after_three() {
        let geo = octagon();
        let registry = Registry::builtin();
        let mut builder = CrackBuilder::new(&geo, 1, DEFAULT_KEY, &registry, DetailLevel::Medium);
        for stage in 1..=3u8 {
            assert_eq!(builder.next_stage().map(|l| l.stage), Some(stage));
        }
        assert!(builder.next_stage().is_none());
        assert_eq!(builder.layers().len(), 3);
    }

    #[test]
    fn test_low_detail_skips_rings() {
        let geo = octagon();
        let registry = Registry::builtin();
        let layers = generate_crack_layers(&geo, 5, "crystal", &registry, DetailLevel::Low);
        assert!(layers.iter().all(|l| l.count(SegmentKind::Ring) == 0));
        // Main rays are not scaled by detail
        let medium = generate_crack_layers(&geo, 5, "crystal", &registry, DetailLevel::Medium);
        assert_eq!(
            layers[0].count(SegmentKind::Trunk),
            medium[0].count(SegmentKind::Trunk)
        );
    }

    #[test]
    fn test_tiny_body_yields_empty_valid_layers() {
        let geo = PolygonGeometry::regular(6, 1.5, 0.0);
        let layers = build(&geo, 10, DEFAULT_KEY);
        assert_eq!(layers.len(), 3);
        assert!(layers.iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_degenerate_geometry_does_not_panic() {
        let geo = PolygonGeometry::from_vertices(&[Vec2::ZERO; 4], 20.0);
        let layers = build(&geo, 10, DEFAULT_KEY);
        assert!(layers.iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_parallel_builds_agree() {
        let geo = PolygonGeometry::jagged(9, 16, 80.0, 0.25);
        let registry = Registry::builtin();
        let expected = generate_crack_layers(&geo, 2024, "volatile", &registry, DetailLevel::High);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        generate_crack_layers(&geo, 2024, "volatile", &registry, DetailLevel::High)
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    proptest! {
        #[test]
        fn prop_bounded_and_deterministic(
            seed in any::<u64>(),
            sides in 5usize..24,
            radius in 12.0f32..120.0,
            roughness in 0.0f32..0.4,
        ) {
            let geo = PolygonGeometry::jagged(seed, sides, radius, roughness);
            let registry = Registry::builtin();
            let margin = registry.growth().surface_margin;
            for key in registry.profile_keys() {
                let a = generate_crack_layers(&geo, seed, key, &registry, DetailLevel::High);
                let b = generate_crack_layers(&geo, seed, key, &registry, DetailLevel::High);
                prop_assert_eq!(&a, &b);
                for segment in a.iter().flat_map(|l| l.segments.iter()) {
                    prop_assert!(segment.max_radius() <= geo.min_surface_radius() - margin + 1e-3);
                    prop_assert!((1..=3).contains(&segment.stage));
                }
            }
        }
    }
}
