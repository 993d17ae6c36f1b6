//! Asteroid Fracture - deterministic crack layers and fragmentation
//!
//! Core modules:
//! - `sim`: Pure generators (crack layers, fragments, reveal tracking)
//! - `tuning`: Data-driven crack profiles and fragment rule sets
//! - `render`: Vertex data for drawing crack layers
//! - `settings`: Crack detail level
//! - `error`: Configuration errors

pub mod error;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, ConfigResult};
pub use settings::DetailLevel;
pub use sim::{
    CrackLayer, CrackSegment, FragmentDescriptor, FragmentRequest, PolygonGeometry, SegmentKind,
    SizeClass, crack_seed, fragment, fragment_variant, generate_crack_layers,
};
pub use tuning::Registry;

use glam::Vec2;

/// Shared constants
pub mod consts {
    /// Base travel speed of freshly spawned bodies (pixels/s)
    pub const LARGE_BASE_SPEED: f32 = 40.0;
    pub const MEDIUM_BASE_SPEED: f32 = 70.0;
    pub const SMALL_BASE_SPEED: f32 = 100.0;

    /// Nominal body radii per size
    pub const LARGE_RADIUS: f32 = 48.0;
    pub const MEDIUM_RADIUS: f32 = 28.0;
    pub const SMALL_RADIUS: f32 = 14.0;

    /// Outline roughness used for generated rocks
    pub const OUTLINE_ROUGHNESS: f32 = 0.25;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return angle;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
