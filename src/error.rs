//! Scene-specific error types.
//!
//! Nothing in the scene is fatal: callers turn these into a warning and a
//! cheaper fallback (fewer shapes, fewer particles, default config) instead
//! of failing the host.
use std::fmt;

/// Top-level error enum for the backdrop scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// `assets/scene.toml` exists but could not be parsed.
    ConfigParse {
        /// Path that was read.
        path: String,
        /// Parser message.
        message: String,
    },

    /// A shape archetype cannot be simulated (non-finite position, radius ≤ 0, …).
    InvalidArchetype {
        /// Position of the archetype in the configured list.
        index: usize,
        /// Human-readable description of the problem.
        reason: &'static str,
    },

    /// A colour string is not a valid `#RRGGBB` / `#RRGGBBAA` hex code.
    InvalidColor {
        /// The rejected input.
        value: String,
    },

    /// Graphics / device capability could not be queried.
    DeviceProbe {
        /// Why the probe failed.
        reason: String,
    },

    /// Scene constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
            SceneError::InvalidArchetype { index, reason } => {
                write!(f, "shape archetype #{} is invalid: {}", index, reason)
            }
            SceneError::InvalidColor { value } => {
                write!(f, "'{}' is not a hex colour", value)
            }
            SceneError::DeviceProbe { reason } => {
                write!(f, "device capability probe failed: {}", reason)
            }
            SceneError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SceneError {}

/// Convenience alias: a `Result` using `SceneError` as the error type.
pub type SceneResult<T> = Result<T, SceneError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if the shape bounding box half-extent is not strictly positive.
pub fn validate_bounds(value: f32) -> SceneResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::UnsafeConstant {
            name: "BOUNDS_HALF_EXTENT",
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `damping` would add energy or freeze shapes outright.
pub fn validate_damping(value: f32) -> SceneResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(SceneError::UnsafeConstant {
            name: "SHAPE_DAMPING",
            value,
            safe_range: "(0.0, 1.0)",
        })
    }
}
