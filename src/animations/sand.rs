//! Falling sand animator.
//!
//! Grains pour, pile and topple under the configured acceleration. Static
//! pixels written straight onto the canvas act as obstacles; the collision
//! resolver treats them exactly like settled grains.

use crate::domain::Rgb;
use crate::engine::{Particle, ParticleEngine};
use crate::error::EngineError;
use crate::render::{Canvas, Renderer};
use crate::settings::EngineSettings;

pub struct FallingSand {
    canvas: Canvas,
    engine: ParticleEngine,
}

impl FallingSand {
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
        // Sand needs a tighter cap than fast sparks: 4 pixels per divisor
        // step keeps piles from tunnelling.
        engine.set_velocity_cap((engine.scale() * 4) as i16);

        let mut canvas = Canvas::new(width, height);
        canvas.set_max_brightness(settings.max_brightness);

        Ok(Self { canvas, engine })
    }

    /// One animation frame: physics, full repaint, present.
    pub fn run_cycle<R: Renderer>(&mut self, renderer: &mut R) {
        self.engine.run_cycle(&mut self.canvas, renderer);
        self.canvas.paint(renderer);
        renderer.show();
    }

    /// Drop a new grain at a random free cell.
    pub fn add_grain<R: Renderer>(&mut self, renderer: &mut R, color: Rgb) -> Result<u16, EngineError> {
        self.engine.add_particle(&mut self.canvas, renderer, color, 0, 0)
    }

    /// Place a grain at an explicit cell.
    pub fn add_grain_at<R: Renderer>(&mut self, renderer: &mut R, x: u16, y: u16, color: Rgb) -> u16 {
        self.engine
            .add_particle_at(&mut self.canvas, renderer, x, y, color, 0, 0)
    }

    pub fn remove_grain(&mut self, index: u16) -> Particle {
        self.engine.remove_particle(&mut self.canvas, index)
    }

    pub fn clear_grains(&mut self) {
        self.engine.clear_particles();
    }

    #[inline]
    pub fn grain_count(&self) -> u16 {
        self.engine.particle_count()
    }

    pub fn grain(&self, index: u16) -> Particle {
        self.engine.particle(index)
    }

    pub fn set_acceleration<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16) {
        self.engine.set_acceleration(renderer, x, y);
    }

    pub fn set_acceleration_3d<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16, z: i16) {
        self.engine.set_acceleration_3d(renderer, x, y, z);
    }

    /// Paint a fixed obstacle pixel. It occupies its cell but never moves.
    pub fn set_static_pixel(&mut self, x: u16, y: u16, color: Rgb) {
        self.canvas.set_pixel_color(x, y, color);
    }

    /// Turn the whole current image into grains (text-to-sand effects).
    pub fn pixels_to_grains<R: Renderer>(&mut self, renderer: &mut R) {
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
