//! Grid-constrained particle motion and collision engine.
//!
//! Shared by the falling-sand and gravity-particle animators. Particles
//! move through a fixed-point coordinate space finer than the pixel grid
//! and collide against the canvas occupancy map one at a time per frame.
//!
//! - `scale.rs`  - sub-pixel scale derivation
//! - `store.rs`  - growable particle store
//! - `velocity.rs` - acceleration, shake jitter, 2-D velocity cap
//! - `motion.rs` - position integration and collision resolution

mod motion;
mod scale;
mod store;
mod velocity;

pub use scale::derive_scale;
pub use store::Particle;

use crate::domain::{Rgb, EMPTY};
use crate::error::EngineError;
use crate::render::{Canvas, Renderer};
use store::ParticleStore;

/// Retry budget for random free-cell placement.
const MAX_PLACEMENT_ATTEMPTS: u16 = 2001;

/// The particle simulation core.
///
/// Owns the particle store; the canvas (occupancy grid) is passed in by
/// exclusive reference for the duration of each operation that touches it,
/// so engine and renderer never mutate it concurrently.
pub struct ParticleEngine {
    store: ParticleStore,
    width: u16,
    height: u16,
    scale: u16,
    max_x: u16,
    max_y: u16,
    accel_x: i16,
    accel_y: i16,
    shake: u16,
    vel_cap: i16,
    vel_cap_override: Option<i16>,
    loss: f32,
    bounce: bool,
    instant_redraw: bool,
}

impl ParticleEngine {
    /// Build an engine for a grid. Fails if the grid does not admit a
    /// valid sub-pixel scale factor.
    pub fn new(width: u16, height: u16, shake: u16) -> Result<Self, EngineError> {
        let scale = scale::derive_scale(width, height)?;

        // Fits u16 by construction of the scale factor.
        let max_x = (width as u32 * scale as u32 - 1) as u16;
        let max_y = (height as u32 * scale as u32 - 1) as u16;

        let cells = width as usize * height as usize;
        let initial_capacity = cells.min(100);

        Ok(Self {
            store: ParticleStore::new(initial_capacity),
            width,
            height,
            scale,
            max_x,
            max_y,
            accel_x: 0,
            accel_y: 0,
            shake,
            vel_cap: scale as i16,
            vel_cap_override: None,
            loss: 2.0,
            bounce: true,
            instant_redraw: false,
        })
    }

    // === Configuration ===

    #[inline]
    pub fn scale(&self) -> u16 {
        self.scale
    }

    #[inline]
    pub fn velocity_cap(&self) -> i16 {
        self.vel_cap
    }

    /// Enable bouncing off boundaries and obstacles; when disabled the
    /// blocked velocity component is zeroed instead.
    pub fn set_bounce(&mut self, bounce: bool) {
        self.bounce = bounce;
    }

    /// Divisor applied to a velocity component on contact. Values below
    /// 1.0 would add energy; they are clamped up to 1.0.
    pub fn set_loss(&mut self, loss: f32) {
        self.loss = if loss < 1.0 { 1.0 } else { loss };
    }

    /// Redraw cells through the renderer as particles move, instead of
    /// leaving repainting to the owner.
    pub fn set_instant_redraw(&mut self, instant: bool) {
        self.instant_redraw = instant;
    }

    /// Pin the velocity cap, overriding the value derived from the
    /// acceleration magnitude. Sand wants a lower cap than fast sparks.
    pub fn set_velocity_cap(&mut self, cap: i16) {
        self.vel_cap_override = Some(cap);
        self.update_velocity_cap(0);
    }

    /// Set the 2-D acceleration vector. Positive x accelerates particles
    /// toward greater x positions. The velocity cap follows the
    /// acceleration magnitude unless explicitly pinned.
    pub fn set_acceleration<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16) {
        self.accel_x = x;
        self.accel_y = y;
        self.update_velocity_cap(0);
        renderer.log(&format!(
            "Acceleration set: {},{} vel cap: {}",
            self.accel_x, self.accel_y, self.vel_cap
        ));
    }

    /// 3-axis acceleration for cube topologies: the z component only
    /// contributes to the velocity cap, the panel projection keeps (x, y).
    pub fn set_acceleration_3d<R: Renderer>(&mut self, renderer: &mut R, x: i16, y: i16, z: i16) {
        self.accel_x = x;
        self.accel_y = y;
        self.update_velocity_cap(z);
        renderer.log(&format!(
            "Acceleration set: {},{},{} vel cap: {}",
            x, y, z, self.vel_cap
        ));
    }

    fn update_velocity_cap(&mut self, accel_z: i16) {
        if let Some(cap) = self.vel_cap_override {
            self.vel_cap = cap;
            return;
        }
        let ax = self.accel_x as i64;
        let ay = self.accel_y as i64;
        let az = accel_z as i64;
        let magnitude = ((ax * ax + ay * ay + az * az) as f64).sqrt();
        let derived = (magnitude * self.scale as f64 / 32.0) as i64;
        let floor = (self.scale / 4) as i64;
        self.vel_cap = derived.max(floor).min(i16::MAX as i64) as i16;
    }

    // === Particle management ===

    /// Add a particle at a random free cell.
    ///
    /// Retries the random search up to a fixed budget; if the grid is too
    /// full to place the particle, reports the failure instead of looping
    /// forever or crashing.
    pub fn add_particle<R: Renderer>(
        &mut self,
        canvas: &mut Canvas,
        renderer: &mut R,
        color: Rgb,
        vx: i16,
        vy: i16,
    ) -> Result<u16, EngineError> {
        let mut attempts = 0;
        let (mut x, mut y);
        loop {
            x = renderer.random_int(0, self.width as i32) as u16;
            y = renderer.random_int(0, self.height as i32) as u16;
            attempts += 1;
            if canvas.is_empty_cell(canvas.index(x, y)) || attempts >= MAX_PLACEMENT_ATTEMPTS {
                break;
            }
        }

        if !canvas.is_empty_cell(canvas.index(x, y)) {
            renderer.log("Failed to find free position for new particle");
            return Err(EngineError::PlacementFailed { attempts });
        }

        Ok(self.add_particle_at(canvas, renderer, x, y, color, vx, vy))
    }

    /// Add a particle at an explicit pixel cell, marking the cell with the
    /// particle's colour. The store grows as needed.
    pub fn add_particle_at<R: Renderer>(
        &mut self,
        canvas: &mut Canvas,
        renderer: &mut R,
        x: u16,
        y: u16,
        color: Rgb,
        vx: i16,
        vy: i16,
    ) -> u16 {
        let grew = self.store.len() as usize == self.store.capacity();

        // Somewhere inside the cell, not pinned to its corner: a random
        // sub-cell offset keeps freshly poured particles from stacking in
        // lockstep.
        let scale = self.scale as u32;
        let sx = x as u32 * scale + renderer.random_int(0, scale as i32) as u32;
        let sy = y as u32 * scale + renderer.random_int(0, scale as i32) as u32;

        let index = self.store.push(Particle {
            x: sx as u16,
            y: sy as u16,
            vx,
            vy,
        });
        if grew {
            renderer.log(&format!("Particle store expanded to {} slots", self.store.capacity()));
        }

        let id = canvas.color_id(color);
        canvas.set_cell_at(x, y, id);
        if self.instant_redraw {
            renderer.set_pixel(x, y, color);
        }

        index
    }

    /// Remove a particle by index, clearing its occupancy cell.
    ///
    /// Returns the removed state with the position in pixel units. The
    /// index must be below `particle_count()`; anything else panics.
    pub fn remove_particle(&mut self, canvas: &mut Canvas, index: u16) -> Particle {
        let p = self.store.remove(index);
        let px = p.x / self.scale;
        let py = p.y / self.scale;
        canvas.set_cell_at(px, py, EMPTY);
        Particle {
            x: px,
            y: py,
            vx: p.vx,
            vy: p.vy,
        }
    }

    /// Forget all particles. The canvas is left untouched; owners clear
    /// the image separately if they want an empty frame.
    pub fn clear_particles(&mut self) {
        self.store.clear();
    }

    #[inline]
    pub fn particle_count(&self) -> u16 {
        self.store.len()
    }

    /// Particle state with the position reported in pixel units.
    pub fn particle(&self, index: u16) -> Particle {
        let p = self.store.get(index);
        Particle {
            x: p.x / self.scale,
            y: p.y / self.scale,
            vx: p.vx,
            vy: p.vy,
        }
    }

    /// Convert every non-empty canvas cell into a particle of that cell's
    /// colour, with zero initial velocity.
    pub fn pixels_to_particles<R: Renderer>(&mut self, canvas: &mut Canvas, renderer: &mut R) {
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let id = canvas.cell_at(x, y);
                if id != EMPTY {
                    let color = canvas.color(id);
                    self.add_particle_at(canvas, renderer, x, y, color, 0, 0);
                }
            }
        }
    }

    // === Frame driver ===

    /// Run one simulation step: integrate velocities for every live
    /// particle, then integrate positions and resolve collisions. Two full
    /// passes, not interleaved per particle. Presentation and pacing stay
    /// with the owning animator.
    pub fn run_cycle<R: Renderer>(&mut self, canvas: &mut Canvas, renderer: &mut R) {
        velocity::integrate_velocities(self, renderer);
        motion::integrate_positions(self, canvas, renderer);
    }

    /// Velocity component after contact: attenuated and reversed, or
    /// zeroed when bouncing is off. Truncates toward zero, so a slow
    /// particle settles instead of oscillating forever.
    fn bounced(&self, v: i16) -> i16 {
        if self.bounce {
            (v as f32 / -self.loss) as i16
        } else {
            0
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
