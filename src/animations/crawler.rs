//! Crawler animator.
//!
//! A single point wanders the grid, clearing a gap around its heading so
//! the trail it leaves behind stays readable. Direction changes are random
//! turns, the colour rotates every few steps.

use crate::domain::Rgb;
use crate::render::{Canvas, Renderer};

const UP: i8 = 0;
const RIGHT: i8 = 1;
const DOWN: i8 = 2;
const LEFT: i8 = 3;

pub struct Crawler {
    canvas: Canvas,
    x: u16,
    y: u16,
    direction: i8,
    dir_chg: u16,
    col_chg: u16,
    color_change_steps: u16,
    color: Rgb,
}

impl Crawler {
    pub fn new<R: Renderer>(
        width: u16,
        height: u16,
        color_change_steps: u16,
        renderer: &mut R,
    ) -> Self {
        let canvas = Canvas::new(width, height);
        let x = renderer.random_int(0, width as i32) as u16;
        let y = renderer.random_int(0, height as i32) as u16;
        let direction = renderer.random_int(0, 4) as i8;
        let color = canvas.random_color(renderer);

        Self {
            canvas,
            x,
            y,
            direction,
            dir_chg: 0,
            col_chg: 0,
            color_change_steps,
            color,
        }
    }

    #[inline]
    pub fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn run_cycle<R: Renderer>(&mut self, renderer: &mut R) {
        self.canvas.set_pixel_color(self.x, self.y, self.color);
        self.clear_ahead();
        self.canvas.paint(renderer);
        renderer.show();

        // Change direction only after at least one straight step.
        self.dir_chg += 1;
        if self.dir_chg > 1 {
            match renderer.random_int(0, 8) {
                0 => {
                    self.direction -= 1;
                    self.dir_chg = 0;
                }
                1 => {
                    self.direction += 1;
                    self.dir_chg = 0;
                }
                _ => {}
            }
            if self.direction > LEFT {
                self.direction = UP;
            } else if self.direction < UP {
                self.direction = LEFT;
            }
        }

        match self.direction {
            UP => self.y = self.canvas.new_position_y(self.y, 1, true),
            RIGHT => self.x = self.canvas.new_position_x(self.x, 1, true),
            DOWN => self.y = self.canvas.new_position_y(self.y, -1, true),
            _ => self.x = self.canvas.new_position_x(self.x, -1, true),
        }

        self.col_chg += 1;
        if self.col_chg >= self.color_change_steps {
            self.col_chg = 0;
            self.color = self.canvas.random_color(renderer);
        }
    }

    /// Clear the five cells fanned out around the direction of travel.
    /// The sideways probes clamp at the edge, the forward ones wrap with
    /// the crawler.
    fn clear_ahead(&mut self) {
        let (x, y) = (self.x, self.y);
        let black = Rgb::new(0, 0, 0);
        let c = &mut self.canvas;
        match self.direction {
            UP => {
                let left = c.new_position_x(x, -1, false);
                let right = c.new_position_x(x, 1, false);
                let ahead = c.new_position_y(y, 1, true);
                let wl = c.new_position_x(x, -1, true);
                let wr = c.new_position_x(x, 1, true);
                c.set_pixel_color(left, y, black);
                c.set_pixel_color(right, y, black);
                c.set_pixel_color(wl, ahead, black);
                c.set_pixel_color(wr, ahead, black);
                c.set_pixel_color(x, ahead, black);
            }
            RIGHT => {
                let above = c.new_position_y(y, -1, true);
                let below = c.new_position_y(y, 1, true);
                let ahead = c.new_position_x(x, 1, true);
                c.set_pixel_color(x, above, black);
                c.set_pixel_color(x, below, black);
                c.set_pixel_color(ahead, above, black);
                c.set_pixel_color(ahead, below, black);
                c.set_pixel_color(ahead, y, black);
            }
            DOWN => {
                let left = c.new_position_x(x, -1, false);
                let right = c.new_position_x(x, 1, false);
                let ahead = c.new_position_y(y, -1, true);
                let wl = c.new_position_x(x, -1, true);
                let wr = c.new_position_x(x, 1, true);
                c.set_pixel_color(left, y, black);
                c.set_pixel_color(right, y, black);
                c.set_pixel_color(wl, ahead, black);
                c.set_pixel_color(wr, ahead, black);
                c.set_pixel_color(x, ahead, black);
            }
            _ => {
                let above = c.new_position_y(y, -1, true);
                let below = c.new_position_y(y, 1, true);
                let ahead = c.new_position_x(x, -1, true);
                c.set_pixel_color(x, above, black);
                c.set_pixel_color(x, below, black);
                c.set_pixel_color(ahead, above, black);
                c.set_pixel_color(ahead, below, black);
                c.set_pixel_color(ahead, y, black);
            }
        }
    }
}
