//! Configuration error types.
//!
//! Crack and fragment generation never fail; only loading the profile and
//! rule tables can. Everything fallible returns [`ConfigResult`].

use thiserror::Error;

/// Errors raised while loading or validating registry tables
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A table has no "default" entry to fall back on.
    #[error("{table} table has no \"default\" entry")]
    MissingDefault {
        /// Table name ("profiles" or "rules")
        table: &'static str,
    },

    /// A `[min, max]` range is inverted.
    #[error("{entry}: {field} range is inverted ({min} > {max})")]
    InvertedRange {
        entry: String,
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// A scalar tunable is non-finite or outside its allowed interval.
    #[error("{entry}: {field} = {value} is outside {expected}")]
    OutOfRange {
        entry: String,
        field: &'static str,
        value: f32,
        expected: &'static str,
    },

    /// A variant binding names a profile or rule set that does not exist.
    #[error("variant \"{variant}\" references unknown {table} entry \"{key}\"")]
    UnknownBinding {
        variant: String,
        table: &'static str,
        key: String,
    },
}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `min <= max` and both are finite.
pub fn check_range(entry: &str, field: &'static str, min: f32, max: f32) -> ConfigResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ConfigError::OutOfRange {
            entry: entry.to_string(),
            field,
            value: if min.is_finite() { max } else { min },
            expected: "finite values",
        });
    }
    if min > max {
        return Err(ConfigError::InvertedRange {
            entry: entry.to_string(),
            field,
            min,
            max,
        });
    }
    Ok(())
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn check_unit(entry: &str, field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            entry: entry.to_string(),
            field,
            value,
            expected: "[0, 1]",
        })
    }
}

/// Returns an error unless `value` is finite and non-negative.
pub fn check_non_negative(entry: &str, field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            entry: entry.to_string(),
            field,
            value,
            expected: "[0, ∞)",
        })
    }
}
