//! Error types for the animation engine.
//!
//! Per-frame physics events (boundary contact, occupied cells) are ordinary
//! branches of the collision algorithm, not errors. Only conditions the
//! caller can act on surface here.

use std::fmt;

/// Errors reported by the particle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The random free-cell search exhausted its retry budget without
    /// finding an empty cell; no particle was created.
    PlacementFailed {
        /// Number of placement attempts made before giving up.
        attempts: u16,
    },
    /// Grid dimensions produce a zero or out-of-range sub-pixel scale
    /// factor. Rejected at construction, never mid-simulation.
    InvalidDimensions { width: u16, height: u16 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::PlacementFailed { attempts } => {
                write!(f, "no free cell found for new particle after {} attempts", attempts)
            }
            EngineError::InvalidDimensions { width, height } => {
                write!(f, "grid {}x{} does not admit a valid sub-pixel scale factor", width, height)
            }
        }
    }
}

impl std::error::Error for EngineError {}
