//! Animation generators.
//!
//! Each animator owns its canvas and exposes `run_cycle(renderer)`; the
//! caller decides frame cadence and which renderer to drive.

mod crawler;
mod life;
mod particles;
mod sand;

pub use crawler::Crawler;
pub use life::GameOfLife;
pub use particles::GravityParticles;
pub use sand::FallingSand;
