//! Wasm bindings: run the animators against a browser canvas.
//!
//! JS owns the requestAnimationFrame loop and blits the packed frame
//! buffer straight out of wasm memory via `frame_ptr`/`frame_len`, so no
//! per-frame copies cross the boundary.

use wasm_bindgen::prelude::*;

use crate::animations::{FallingSand, GravityParticles};
use crate::domain::{color::BLACK, Rgb};
use crate::render::{xorshift32, Renderer};

const BG_COLOR: u32 = 0xFF0A0A0A;

/// Renderer backed by a packed 0xAABBGGRR frame buffer.
pub struct BufferRenderer {
    width: u16,
    frame: Vec<u32>,
    rng_state: u32,
}

impl BufferRenderer {
    pub fn new(width: u16, height: u16) -> Self {
        // Seed from the clock so simultaneous sims don't animate in
        // lockstep. The low bits of the ms timestamp are plenty; the
        // `| 1` keeps xorshift out of its zero fixed point.
        let seed = js_sys::Date::now() as u32 | 1;
        Self {
            width,
            frame: vec![BG_COLOR; width as usize * height as usize],
            rng_state: seed,
        }
    }

    pub fn frame_ptr(&self) -> *const u32 {
        self.frame.as_ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.frame.len()
    }
}

impl Renderer for BufferRenderer {
    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) {
        let idx = y as usize * self.width as usize + x as usize;
        self.frame[idx] = if color == BLACK { BG_COLOR } else { color.to_abgr() };
    }

    fn show(&mut self) {
        // The frame buffer is always current; JS presents it.
    }

    fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u32;
        min + (xorshift32(&mut self.rng_state) % span) as i32
    }

    fn log(&mut self, message: &str) {
        web_sys::console::log_1(&message.into());
    }

    fn sleep_ms(&mut self, _millis: u32) {
        // Pacing belongs to the JS animation loop.
    }
}

/// Falling sand simulation for a JS canvas.
#[wasm_bindgen]
pub struct SandSim {
    sand: FallingSand,
    renderer: BufferRenderer,
}

#[wasm_bindgen]
impl SandSim {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u16, height: u16, shake: u16) -> Result<SandSim, JsValue> {
        let sand = FallingSand::new(width, height, shake)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(SandSim {
            sand,
            renderer: BufferRenderer::new(width, height),
        })
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.sand.run_cycle(&mut self.renderer);
    }

    pub fn set_acceleration(&mut self, x: i16, y: i16) {
        self.sand.set_acceleration(&mut self.renderer, x, y);
    }

    /// Drop a grain at a random free cell. Returns false if the grid was
    /// too full to place it.
    pub fn add_grain(&mut self, r: u8, g: u8, b: u8) -> bool {
        self.sand
            .add_grain(&mut self.renderer, Rgb::new(r, g, b))
            .is_ok()
    }

    pub fn add_grain_at(&mut self, x: u16, y: u16, r: u8, g: u8, b: u8) {
        self.sand
            .add_grain_at(&mut self.renderer, x, y, Rgb::new(r, g, b));
    }

    pub fn set_static_pixel(&mut self, x: u16, y: u16, r: u8, g: u8, b: u8) {
        self.sand.set_static_pixel(x, y, Rgb::new(r, g, b));
    }

    pub fn clear_grains(&mut self) {
        self.sand.clear_grains();
    }

    #[wasm_bindgen(getter)]
    pub fn grain_count(&self) -> u16 {
        self.sand.grain_count()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u16 {
        self.sand.canvas().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u16 {
        self.sand.canvas().height()
    }

    /// Pointer to the packed 0xAABBGGRR frame buffer (for JS rendering).
    pub fn frame_ptr(&self) -> *const u32 {
        self.renderer.frame_ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.renderer.frame_len()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn sand_sim_steps_and_exposes_the_frame() {
        let mut sim = SandSim::new(16, 16, 10).unwrap();
        assert!(sim.add_grain(200, 160, 40));
        sim.set_acceleration(0, -20);
        sim.step();
        assert_eq!(sim.frame_len(), 256);
        assert_eq!(sim.grain_count(), 1);
    }
}

/// Gravity particle simulation for a JS canvas.
#[wasm_bindgen]
pub struct ParticleSim {
    particles: GravityParticles,
    renderer: BufferRenderer,
}

#[wasm_bindgen]
impl ParticleSim {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u16, height: u16, shake: u16) -> Result<ParticleSim, JsValue> {
        let particles = GravityParticles::new(width, height, shake)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(ParticleSim {
            particles,
            renderer: BufferRenderer::new(width, height),
        })
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.particles.run_cycle(&mut self.renderer);
    }

    pub fn set_acceleration(&mut self, x: i16, y: i16) {
        self.particles.set_acceleration(&mut self.renderer, x, y);
    }

    pub fn set_acceleration_3d(&mut self, x: i16, y: i16, z: i16) {
        self.particles.set_acceleration_3d(&mut self.renderer, x, y, z);
    }

    /// Launch a particle with an initial velocity from a random free
    /// cell. Returns false if the grid was too full to place it.
    pub fn add_particle(&mut self, r: u8, g: u8, b: u8, vx: i16, vy: i16) -> bool {
        self.particles
            .add_particle(&mut self.renderer, Rgb::new(r, g, b), vx, vy)
            .is_ok()
    }

    pub fn add_particle_at(&mut self, x: u16, y: u16, r: u8, g: u8, b: u8, vx: i16, vy: i16) {
        self.particles
            .add_particle_at(&mut self.renderer, x, y, Rgb::new(r, g, b), vx, vy);
    }

    pub fn clear_particles(&mut self) {
        self.particles.clear_particles();
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u16 {
        self.particles.particle_count()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u16 {
        self.particles.canvas().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u16 {
        self.particles.canvas().height()
    }

    /// Pointer to the packed 0xAABBGGRR frame buffer (for JS rendering).
    pub fn frame_ptr(&self) -> *const u32 {
        self.renderer.frame_ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.renderer.frame_len()
    }
}
