//! Position integration and collision resolution.
//!
//! Particles are advanced one at a time, in index order, against the canvas
//! occupancy map. Earlier particles have already moved this frame, later
//! ones have not; no simultaneity is attempted. The naive single-pass
//! heuristic, repeated quickly enough, visually integrates into something
//! that resembles physics at a fraction of the cost of a pairwise solve.

use super::ParticleEngine;
use crate::domain::{color::BLACK, EMPTY};
use crate::render::{Canvas, Renderer};

/// Velocity units per sub-pixel position unit per frame.
pub(super) const VELOCITY_DIVISOR: i32 = 32;

pub(super) fn integrate_positions<R: Renderer>(
    engine: &mut ParticleEngine,
    canvas: &mut Canvas,
    renderer: &mut R,
) {
    let width = canvas.width() as i32;
    let scale = engine.scale as i32;
    let max_x = engine.max_x as i32;
    let max_y = engine.max_y as i32;

    for i in 0..engine.store.len() {
        let p = engine.store.get(i);
        let mut vx = p.vx;
        let mut vy = p.vy;

        // Tentative move in sub-pixel space. Signed intermediates: a
        // negative velocity near the origin must not wrap the unsigned
        // stored position.
        let mut newx = p.x as i32 + vx as i32 / VELOCITY_DIVISOR;
        let mut newy = p.y as i32 + vy as i32 / VELOCITY_DIVISOR;

        // Keep the particle inside the domain, with a slight bounce off
        // the wall (or a dead stop when bouncing is disabled).
        if newx > max_x {
            newx = max_x;
            vx = engine.bounced(vx);
        } else if newx < 0 {
            newx = 0;
            vx = engine.bounced(vx);
        }
        if newy > max_y {
            newy = max_y;
            vy = engine.bounced(vy);
        } else if newy < 0 {
            newy = 0;
            vy = engine.bounced(vy);
        }

        let old_idx = (p.y as i32 / scale) * width + p.x as i32 / scale;
        let mut new_idx = (newy / scale) * width + newx / scale;

        if old_idx != new_idx && !canvas.is_empty_cell(new_idx as usize) {
            // Moving into an occupied pixel. Which way were we blocked?
            let delta = (new_idx - old_idx).abs();
            if delta == 1 {
                // One pixel left or right: cancel x motion, y is fine.
                newx = p.x as i32;
                vx = engine.bounced(vx);
                new_idx = old_idx;
            } else if delta == width {
                // One pixel up or down: cancel y motion, x is fine.
                newy = p.y as i32;
                vy = engine.bounced(vy);
                new_idx = old_idx;
            } else {
                // Diagonal contact: try skidding along one axis only,
                // starting with the faster one. Ties go to the x axis
                // (the >= is deliberate and pinned by tests). Since both
                // axes crossed a pixel boundary, a single-axis move is
                // guaranteed to land in a different pixel.
                if (vx as i32).abs() >= (vy as i32).abs() {
                    new_idx = (p.y as i32 / scale) * width + newx / scale;
                    if canvas.is_empty_cell(new_idx as usize) {
                        // Horizontal-only cell is free: take it.
                        newy = p.y as i32;
                        vy = engine.bounced(vy);
                    } else {
                        new_idx = (newy / scale) * width + p.x as i32 / scale;
                        if canvas.is_empty_cell(new_idx as usize) {
                            // Vertical-only cell is free: take that.
                            newx = p.x as i32;
                            vx = engine.bounced(vx);
                        } else {
                            // Corner-blocked: full stop.
                            newx = p.x as i32;
                            newy = p.y as i32;
                            vx = engine.bounced(vx);
                            vy = engine.bounced(vy);
                            new_idx = old_idx;
                        }
                    }
                } else {
                    new_idx = (newy / scale) * width + p.x as i32 / scale;
                    if canvas.is_empty_cell(new_idx as usize) {
                        newx = p.x as i32;
                        vx = engine.bounced(vx);
                    } else {
                        new_idx = (p.y as i32 / scale) * width + newx / scale;
                        if canvas.is_empty_cell(new_idx as usize) {
                            newy = p.y as i32;
                            vy = engine.bounced(vy);
                        } else {
                            newx = p.x as i32;
                            newy = p.y as i32;
                            vx = engine.bounced(vx);
                            vy = engine.bounced(vy);
                            new_idx = old_idx;
                        }
                    }
                }
            }
        }

        // Move the colour id before committing the position: the old cell
        // must be read while it still belongs to this particle.
        if old_idx != new_idx {
            let color_id = canvas.cell(old_idx as usize);
            canvas.set_cell(old_idx as usize, EMPTY);
            canvas.set_cell(new_idx as usize, color_id);
            if engine.instant_redraw {
                let color = canvas.color(color_id);
                renderer.set_pixel(p.x / engine.scale, p.y / engine.scale, BLACK);
                renderer.set_pixel((newx / scale) as u16, (newy / scale) as u16, color);
            }
        }

        let particle = engine.store.get_mut(i);
        particle.x = newx as u16;
        particle.y = newy as u16;
        particle.vx = vx;
        particle.vy = vy;
    }
}
