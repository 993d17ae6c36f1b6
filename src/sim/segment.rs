//! Crack segment and layer types
//!
//! Segments form a forest through id back-references into a flat arena.
//! Nothing holds a live reference to another segment.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Structural category of a crack segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Radial crack grown from near the centroid
    Trunk,
    /// Continuation of a trunk from its current tip
    Extension,
    Branch,
    Micro,
    /// Concentric chord, never part of the parent tree
    Ring,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Trunk => "trunk",
            SegmentKind::Extension => "extension",
            SegmentKind::Branch => "branch",
            SegmentKind::Micro => "micro",
            SegmentKind::Ring => "ring",
        }
    }

    /// Trunks and extensions make up the main rays
    pub fn is_main(&self) -> bool {
        matches!(self, SegmentKind::Trunk | SegmentKind::Extension)
    }

    /// Whether a branch may grow off this kind
    pub fn can_parent_branch(&self) -> bool {
        matches!(
            self,
            SegmentKind::Trunk | SegmentKind::Extension | SegmentKind::Branch
        )
    }

    /// Whether a micro-crack may grow off this kind
    pub fn can_parent_micro(&self) -> bool {
        self.can_parent_branch()
    }
}

/// A single crack line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackSegment {
    pub id: u32,
    /// Damage stage (1-3) that created this segment
    pub stage: u8,
    pub kind: SegmentKind,
    pub parent: Option<u32>,
    /// Trunk this segment ultimately hangs off (None for rings)
    pub root: Option<u32>,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub length: f32,
    /// Direction from start to end, radians
    pub angle: f32,
    /// Branch and micro segments anchored on this one
    pub children: u32,
    /// Extensions grown from this segment's tip
    pub continuations: u32,
}

impl CrackSegment {
    /// Point at fraction `t` along the segment
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start.lerp(self.end, t)
    }

    /// Farthest endpoint distance from the centroid
    pub fn max_radius(&self) -> f32 {
        self.start.length().max(self.end.length())
    }
}

/// Visual burst parameters handed through to rendering untouched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstDescriptor {
    pub particles: u32,
    pub speed: f32,
    /// Angular spread of the burst, radians
    pub spread: f32,
    pub flash: f32,
    pub shake: f32,
}

impl Default for BurstDescriptor {
    fn default() -> Self {
        Self {
            particles: 8,
            speed: 40.0,
            spread: std::f32::consts::TAU,
            flash: 0.2,
            shake: 0.0,
        }
    }
}

/// All segments revealed at one damage threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackLayer {
    pub stage: u8,
    pub segments: Vec<CrackSegment>,
    pub intensity: f32,
    pub burst: BurstDescriptor,
}

impl CrackLayer {
    pub fn count(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Id lookup over a finished set of layers
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex<'a> {
    by_id: HashMap<u32, &'a CrackSegment>,
    children: HashMap<u32, Vec<u32>>,
}

impl<'a> SegmentIndex<'a> {
    pub fn new(layers: &'a [CrackLayer]) -> Self {
        let mut by_id = HashMap::new();
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for segment in layers.iter().flat_map(|l| l.segments.iter()) {
            by_id.insert(segment.id, segment);
            if let Some(parent) = segment.parent {
                children.entry(parent).or_default().push(segment.id);
            }
        }
        Self { by_id, children }
    }

    pub fn get(&self, id: u32) -> Option<&'a CrackSegment> {
        self.by_id.get(&id).copied()
    }

    /// Ids of segments whose parent is `id`, in creation order
    pub fn children_of(&self, id: u32) -> &[u32] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walk parent links from `id` up to its root (inclusive)
    pub fn root_chain(&self, id: u32) -> Vec<u32> {
        let mut chain = Vec::new();
        let mut current = self.get(id);
        while let Some(segment) = current {
            chain.push(segment.id);
            // Ids strictly decrease along parent links, so this terminates
            current = segment
                .parent
                .filter(|p| *p < segment.id)
                .and_then(|p| self.get(p));
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
