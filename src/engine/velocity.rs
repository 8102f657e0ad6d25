//! Velocity integration pass.
//!
//! Each frame every particle picks up the configured acceleration plus a
//! little symmetric random jitter (shake), then has its velocity clipped as
//! a true 2-D vector. A per-axis clamp would let diagonal movement run
//! sqrt(2) faster than axis-aligned movement; the vector cap keeps terminal
//! speed direction-independent and stops fast particles passing through
//! each other.

use super::ParticleEngine;
use crate::render::Renderer;

pub(super) fn integrate_velocities<R: Renderer>(engine: &mut ParticleEngine, renderer: &mut R) {
    let shake_half = (engine.shake / 2) as i32;
    let accel_x = engine.accel_x as i32;
    let accel_y = engine.accel_y as i32;
    let cap = engine.vel_cap as i64;
    let cap_sq = cap * cap;

    for particle in engine.store.iter_mut() {
        // A little randomness makes tall stacks topple better.
        let ax = accel_x + renderer.random_int(-shake_half, shake_half + 1);
        let ay = accel_y + renderer.random_int(-shake_half, shake_half + 1);

        let mut vx = particle.vx as i32 + ax;
        let mut vy = particle.vy as i32 + ay;

        let v_sq = vx as i64 * vx as i64 + vy as i64 * vy as i64;
        if v_sq > cap_sq {
            // Maintain heading, limit magnitude.
            let v = (v_sq as f64).sqrt();
            vx = (cap as f64 * vx as f64 / v) as i32;
            vy = (cap as f64 * vy as f64 / v) as i32;
        }

        particle.vx = vx.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        particle.vy = vy.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}
