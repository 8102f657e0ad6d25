//! Lumagrid Engine - pixel-grid animations for RGB LED matrix displays
//!
//! A library of animation generators (falling sand, gravity particles,
//! game of life, crawler) driven through an abstract renderer, so the same
//! animations run on LED panels, terminal emulators or browser canvases.
//!
//! Architecture:
//! - domain/     - colours and the palette-indexed cell values
//! - render/     - the Renderer trait and the Canvas occupancy grid
//! - engine/     - fixed-point particle motion and collision resolution
//! - animations/ - the animator classes
//! - api/        - wasm-bindgen facade for browser canvases

pub mod animations;
pub mod api;
pub mod domain;
pub mod engine;
pub mod render;

mod error;
mod settings;

pub use animations::{Crawler, FallingSand, GameOfLife, GravityParticles};
pub use domain::{ColorId, Palette, Rgb, EMPTY};
pub use engine::{Particle, ParticleEngine};
pub use error::EngineError;
pub use render::{Canvas, Renderer};
pub use settings::EngineSettings;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"Lumagrid animation engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
