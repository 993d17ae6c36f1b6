//! Polygon geometry and ray queries
//!
//! Asteroid outlines are stored relative to their centroid together with a
//! precomputed closed edge list. All crack placement is bounded by ray casts
//! against those edges and by the minimum surface radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::rng::{CrackRng, OUTLINE_SALT};
use crate::polar_to_cartesian;

/// Denominator below which a ray and an edge are treated as parallel
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Areas below this are treated as degenerate
const AREA_EPSILON: f32 = 1e-4;

/// A single polygon edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start: Vec2,
    pub end: Vec2,
}

impl Edge {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Closest distance from `p` to this edge
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let e = self.end - self.start;
        let len_sq = e.length_squared();
        if len_sq <= f32::EPSILON {
            return (p - self.start).length();
        }
        let t = ((p - self.start).dot(e) / len_sq).clamp(0.0, 1.0);
        (p - (self.start + e * t)).length()
    }
}

/// Immutable centroid-relative polygon with cached radii
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonGeometry {
    vertices: Vec<Vec2>,
    edges: Vec<Edge>,
    nominal_radius: f32,
    min_surface_radius: f32,
}

impl PolygonGeometry {
    /// Build geometry from an outline, re-centring it on its centroid
    ///
    /// Non-finite vertices are dropped. A non-positive `nominal_radius` is
    /// replaced by the farthest vertex distance.
    pub fn from_vertices(points: &[Vec2], nominal_radius: f32) -> Self {
        let finite: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
        let centroid = polygon_centroid(&finite);
        let vertices: Vec<Vec2> = finite.iter().map(|p| *p - centroid).collect();
        let edges = build_edges(&vertices);

        let farthest = vertices.iter().map(|v| v.length()).fold(0.0_f32, f32::max);
        let nominal_radius = if nominal_radius.is_finite() && nominal_radius > 0.0 {
            nominal_radius
        } else {
            farthest
        };
        let min_surface_radius = compute_min_surface_radius(&edges, nominal_radius);

        Self {
            vertices,
            edges,
            nominal_radius,
            min_surface_radius,
        }
    }

    /// Regular polygon with `sides` vertices at `radius`
    pub fn regular(sides: usize, radius: f32, rotation: f32) -> Self {
        let sides = sides.max(3);
        let points: Vec<Vec2> = (0..sides)
            .map(|i| polar_to_cartesian(radius, rotation + i as f32 * TAU / sides as f32))
            .collect();
        Self::from_vertices(&points, radius)
    }

    /// Deterministic rocky outline
    ///
    /// Vertex angles stay strictly increasing so the outline is star-shaped
    /// around its center. `roughness` is the maximum fractional inset.
    pub fn jagged(seed: u64, sides: usize, radius: f32, roughness: f32) -> Self {
        let sides = sides.max(3);
        let roughness = roughness.clamp(0.0, 0.9);
        let mut rng = CrackRng::derived(seed, OUTLINE_SALT);
        let step = TAU / sides as f32;

        let points: Vec<Vec2> = (0..sides)
            .map(|i| {
                let theta = i as f32 * step + rng.signed(step * 0.3);
                let r = radius * (1.0 - rng.range(0.0, roughness));
                polar_to_cartesian(r, theta)
            })
            .collect();
        Self::from_vertices(&points, radius)
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Overall body size
    pub fn nominal_radius(&self) -> f32 {
        self.nominal_radius
    }

    /// Minimum centroid-to-boundary distance
    pub fn min_surface_radius(&self) -> f32 {
        self.min_surface_radius
    }

    /// Boundary distance along `angle` from the centroid, less `margin`
    pub fn surface_distance(&self, angle: f32, margin: f32) -> f32 {
        measure_ray_distance(&self.edges, Vec2::ZERO, angle, margin)
    }
}

/// Distance along a ray to the nearest edge, or 0 if nothing is hit
pub fn intersect_ray(edges: &[Edge], origin: Vec2, dir: Vec2) -> f32 {
    let mut nearest = f32::INFINITY;

    for edge in edges {
        let e = edge.end - edge.start;
        let denom = dir.perp_dot(e);
        if !denom.is_finite() || denom.abs() < PARALLEL_EPSILON {
            continue;
        }

        let w = edge.start - origin;
        let t = w.perp_dot(e) / denom;
        let u = w.perp_dot(dir) / denom;

        if t.is_finite() && t >= 0.0 && (0.0..=1.0).contains(&u) && t < nearest {
            nearest = t;
        }
    }

    if nearest.is_finite() { nearest } else { 0.0 }
}

/// Ray distance along `angle`, minus `margin`, clamped to zero
pub fn measure_ray_distance(edges: &[Edge], origin: Vec2, angle: f32, margin: f32) -> f32 {
    let dir = Vec2::new(angle.cos(), angle.sin());
    (intersect_ray(edges, origin, dir) - margin).max(0.0)
}

/// Minimum distance from the centroid to the polygon boundary
///
/// Falls back to `fallback_radius` for empty or degenerate outlines.
pub fn compute_min_surface_radius(edges: &[Edge], fallback_radius: f32) -> f32 {
    let min = edges
        .iter()
        .map(|edge| edge.distance_to(Vec2::ZERO))
        .fold(f32::INFINITY, f32::min);

    if min.is_finite() && min > AREA_EPSILON {
        min
    } else {
        log::trace!("degenerate outline, min surface radius falls back to {fallback_radius}");
        fallback_radius.max(0.0)
    }
}

/// Distance along a unit ray from a point inside a circle to its rim
///
/// Returns 0 when `origin` already lies outside the circle.
pub fn ray_circle_exit(origin: Vec2, dir: Vec2, radius: f32) -> f32 {
    let c = origin.length_squared() - radius * radius;
    if c >= 0.0 {
        return 0.0;
    }
    let b = origin.dot(dir);
    let disc = b * b - c;
    (-b + disc.max(0.0).sqrt()).max(0.0)
}

fn build_edges(vertices: &[Vec2]) -> Vec<Edge> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    (0..vertices.len())
        .map(|i| Edge::new(vertices[i], vertices[(i + 1) % vertices.len()]))
        .collect()
}

/// Area centroid via the shoelace formula, vertex mean for zero-area input
fn polygon_centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }

    let mut area2 = 0.0;
    let mut acc = Vec2::ZERO;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let cross = a.perp_dot(b);
        area2 += cross;
        acc += (a + b) * cross;
    }

    if area2.abs() * 0.5 > AREA_EPSILON {
        acc / (3.0 * area2)
    } else {
        points.iter().copied().sum::<Vec2>() / points.len() as f32
    }
}
