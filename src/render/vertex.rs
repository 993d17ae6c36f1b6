//! Vertex types for 2D crack rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::SegmentKind;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in an upload buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for crack segments
pub mod colors {
    use super::SegmentKind;

    pub const TRUNK: [f32; 4] = [1.0, 0.85, 0.6, 1.0];
    pub const EXTENSION: [f32; 4] = [1.0, 0.75, 0.45, 1.0];
    pub const BRANCH: [f32; 4] = [0.95, 0.6, 0.3, 0.9];
    pub const MICRO: [f32; 4] = [0.8, 0.5, 0.3, 0.7];
    pub const RING: [f32; 4] = [1.0, 0.95, 0.8, 0.8];

    pub fn for_kind(kind: SegmentKind) -> [f32; 4] {
        match kind {
            SegmentKind::Trunk => TRUNK,
            SegmentKind::Extension => EXTENSION,
            SegmentKind::Branch => BRANCH,
            SegmentKind::Micro => MICRO,
            SegmentKind::Ring => RING,
        }
    }
}
