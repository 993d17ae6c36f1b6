//! Shape generation for crack layers

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::sim::{CrackLayer, CrackSegment};

/// Multiply a kind color by a tint, fading alpha by layer intensity
fn tinted(base: [f32; 4], tint: [f32; 4], intensity: f32) -> [f32; 4] {
    [
        base[0] * tint[0],
        base[1] * tint[1],
        base[2] * tint[2],
        base[3] * tint[3] * intensity.clamp(0.0, 1.0),
    ]
}

/// Push one segment as a width-thick quad (two triangles)
fn segment_quad(vertices: &mut Vec<Vertex>, segment: &CrackSegment, color: [f32; 4]) {
    let dir = (segment.end - segment.start).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let half = segment.width.max(0.0) * 0.5;
    let perp = dir.perp() * half;

    let a = segment.start + perp;
    let b = segment.start - perp;
    let c = segment.end + perp;
    let d = segment.end - perp;

    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));

    vertices.push(Vertex::new(c.x, c.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(d.x, d.y, color));
}

/// Triangle-list vertices for every segment in a layer
///
/// Positions are in the body's local frame; zero-length segments are skipped.
pub fn crack_vertices(layer: &CrackLayer, tint: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(layer.segments.len() * 6);
    for segment in &layer.segments {
        let color = tinted(colors::for_kind(segment.kind), tint, layer.intensity);
        segment_quad(&mut vertices, segment, color);
    }
    vertices
}

/// Vertices for several layers, translated to `offset` and rotated by `rotation`
pub fn layers_vertices(layers: &[CrackLayer], offset: Vec2, rotation: f32, tint: [f32; 4]) -> Vec<Vertex> {
    let rot = Vec2::from_angle(rotation);
    layers
        .iter()
        .flat_map(|layer| crack_vertices(layer, tint))
        .map(|mut v| {
            let p = rot.rotate(Vec2::from(v.position)) + offset;
            v.position = p.to_array();
            v
        })
        .collect()
}
