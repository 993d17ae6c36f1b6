//! Deterministic generation module
//!
//! Every generator here is a pure function of its inputs:
//! - Seeded RNG only, one salted stream per concern
//! - Stable iteration order (by segment id)
//! - No rendering or platform dependencies
//! - Nothing global; tables arrive through [`crate::tuning::Registry`]

pub mod crack;
pub mod fragment;
pub mod geometry;
pub mod reveal;
pub mod rng;
pub mod segment;

pub use crack::{CrackBuilder, generate_crack_layers};
pub use fragment::{FragmentDescriptor, FragmentRequest, SizeClass, fragment, fragment_variant};
pub use geometry::{Edge, PolygonGeometry};
pub use reveal::CrackReveal;
pub use rng::{CrackRng, RngState, crack_seed, derive_seed};
pub use segment::{BurstDescriptor, CrackLayer, CrackSegment, SegmentIndex, SegmentKind};
