//! Crack detail preferences
//!
//! Chosen by the host (usually from its graphics quality setting) and passed
//! into crack generation. Main rays are never scaled, so the structural
//! skeleton of a pattern is the same at every detail level.

use serde::{Deserialize, Serialize};

/// Crack detail levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Low => "Low",
            DetailLevel::Medium => "Medium",
            DetailLevel::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(DetailLevel::Low),
            "medium" | "med" => Some(DetailLevel::Medium),
            "high" => Some(DetailLevel::High),
            _ => None,
        }
    }

    /// Branch target multiplier
    pub fn branch_scale(&self) -> f32 {
        match self {
            DetailLevel::Low => 0.5,
            DetailLevel::Medium => 1.0,
            DetailLevel::High => 1.5,
        }
    }

    /// Micro-crack target multiplier
    pub fn micro_scale(&self) -> f32 {
        match self {
            DetailLevel::Low => 0.25,
            DetailLevel::Medium => 1.0,
            DetailLevel::High => 2.0,
        }
    }

    /// Whether ring segments are emitted
    pub fn rings_enabled(&self) -> bool {
        match self {
            DetailLevel::Low => false,
            DetailLevel::Medium => true,
            DetailLevel::High => true,
        }
    }

    /// Scale a profile count, rounding to nearest
    pub fn scale(count: u32, factor: f32) -> u32 {
        (count as f32 * factor).round() as u32
    }
}
