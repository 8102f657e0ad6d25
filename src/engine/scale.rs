//! Sub-pixel coordinate scale derivation.
//!
//! Particles live in an integer coordinate space `scale` times finer than
//! the pixel grid, so they can move and interact at less-than-whole-pixel
//! increments. The scale is derived once from the larger grid dimension and
//! capped so `dimension * scale` always fits the `u16` position type.

use crate::error::EngineError;

/// Default scale for small panels: 256 sub-pixel units per pixel.
pub const FULL_SCALE: u16 = 256;

/// Derive the sub-pixel scale factor for a grid.
///
/// Large panels get a reduced scale (`10 * (5900 / max_dim)`) to keep the
/// coordinate space inside `u16`; panels small enough for the full 256x
/// scale use it. A grid too large for any scale (or with a zero dimension)
/// is a construction error, never a mid-simulation surprise.
pub fn derive_scale(width: u16, height: u16) -> Result<u16, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }

    let max_dim = width.max(height);
    let multiplier = 5900 / max_dim;
    if multiplier == 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }

    if multiplier > 25 {
        Ok(FULL_SCALE)
    } else {
        Ok(10 * multiplier)
    }
}
