//! Gravity particles animator.
//!
//! The fast sibling of the falling-sand animation: particles carry initial
//! velocities (sparks, fountains, rain) and cells are redrawn through the
//! renderer as they move instead of repainting the whole canvas each frame.

use crate::domain::Rgb;
use crate::engine::{Particle, ParticleEngine};
use crate::error::EngineError;
use crate::render::{Canvas, Renderer};
use crate::settings::EngineSettings;

pub struct GravityParticles {
    canvas: Canvas,
    engine: ParticleEngine,
}

impl GravityParticles {
    pub fn new(width: u16, height: u16, shake: u16) -> Result<Self, EngineError> {
        Self::with_settings(
            width,
            height,
            &EngineSettings {
                shake,
                ..EngineSettings::default()
            },
        )
    }

    pub fn with_settings(width: u16, height: u16, settings: &EngineSettings) -> Result<Self, EngineError> {
        let mut engine = ParticleEngine::new(width, height, settings.shake)?;
        engine.set_loss(settings.loss);
        engine.set_bounce(settings.bounce);
        engine.set_instant_redraw(true);

        let mut canvas = Canvas::new(width, height);
        canvas.set_max_brightness(settings.max_brightness);

        Ok(Self { canvas, engine })
    }

    /// One animation frame: physics with per-cell redraw, then present.
    pub fn run_cycle<R: Renderer>(&mut self, renderer: &mut R) {
        self.engine.run_cycle(&mut self.canvas, renderer);
        renderer.show();
    }

    /// Add a particle at a random free cell with an initial velocity.
    pub fn add_particle<R: Renderer>(
        &mut self,
        renderer: &mut R,
        color: Rgb,
        vx: i16,
        vy: i16,
    ) -> Result<u16, EngineError> {
        self.engine.add_particle(&mut self.canvas, renderer, color, vx, vy)
    }

    /// Add a particle at an explicit cell with an initial velocity.
    pub fn add_particle_at<R: Renderer>(
        &mut self,
        renderer: &mut R,
        x: u16,
        y: u16,
        color: Rgb,
        vx: i16,
        vy: i16,
    ) -> u16 {
        self.engine
            .add_particle_at(&mut self.canvas, renderer, x, y, color, vx, vy)
    }

    pub fn remove_particle(&mut self, index: u16) -> Particle {
        self.engine.remove_particle(&mut self.canvas, index)
    }

    pub fn clear_particles(&mut self) {
        self.engine.clear_particles();
    }

    #[inline]
    pub fn particle_count(&self) -> u16 {
        self.engine.particle_count()
    }

    pub fn particle(&self, index: u16) -> Particle {
        self.engine.particle(index)
    }

    pub fn set_acceleration<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16) {
        self.engine.set_acceleration(renderer, x, y);
    }

    pub fn set_acceleration_3d<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16, z: i16) {
        self.engine.set_acceleration_3d(renderer, x, y, z);
    }

    pub fn set_velocity_cap(&mut self, cap: i16) {
        self.engine.set_velocity_cap(cap);
    }

    /// Turn the whole current image into particles.
    pub fn pixels_to_particles<R: Renderer>(&mut self, renderer: &mut R) {
        self.engine.pixels_to_particles(&mut self.canvas, renderer);
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[inline]
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::TestRenderer;

    #[test]
    fn moving_particles_redraw_their_cells() {
        let mut sim = GravityParticles::new(8, 8, 0).unwrap();
        let mut renderer = TestRenderer::new(9);
        sim.add_particle_at(&mut renderer, 1, 4, Rgb::new(255, 0, 0), 512, 0);
        renderer.pixels.clear();

        // Velocity caps at 256, giving 8 sub-pixel units of travel per
        // frame; 40 frames crosses at least one 256-unit cell boundary.
        for _ in 0..40 {
            sim.run_cycle(&mut renderer);
        }

        // Only the affected cells were pushed: a clear for the old cell
        // and a draw for the new one per crossing, no full repaints.
        assert!(!renderer.pixels.is_empty());
        assert_eq!(renderer.pixels.len() % 2, 0);
        assert!(renderer.pixels.iter().any(|p| p.2 == Rgb::new(0, 0, 0)));
        assert!(renderer.pixels.iter().any(|p| p.2 == Rgb::new(255, 0, 0)));
        assert!(renderer.pixels.len() < 16);
        assert_eq!(renderer.shows, 40);
    }

    #[test]
    fn launched_particle_keeps_its_initial_velocity() {
        let mut sim = GravityParticles::new(16, 16, 0).unwrap();
        let mut renderer = TestRenderer::new(9);
        let idx = sim
            .add_particle(&mut renderer, Rgb::new(0, 200, 50), 300, -120)
            .unwrap();
        let p = sim.particle(idx);
        assert_eq!((p.vx, p.vy), (300, -120));
    }
}
