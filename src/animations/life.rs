//! Conway's Game of Life animator.
//!
//! Cells carry their state, three frames of history and a colour index in
//! a single byte. The animation watches its own statistics (static
//! patterns, 2/3-frame repeats, constant or cycling population) and
//! restarts from a seed pattern when the simulation has visibly ended.
//! Births inherit the dominant neighbour colour; optional fading renders
//! births green-to-colour and deaths colour-to-red.

use crate::domain::{color::BLACK, Rgb};
use crate::render::{Canvas, Renderer};

const CELL_ALIVE: u8 = 0b0000_0001;
const CELL_CHANGE: u8 = 0b0000_0010;
const CELL_PREV1: u8 = 0b0000_0100;
const CELL_PREV2: u8 = 0b0000_1000;
const CELL_PREV3: u8 = 0b0001_0000;
const COLOR_SHIFT: u8 = 5;

/// Longest population repeat cycle the detector tracks.
const MAX_REPEAT_CYCLE: usize = 24;
/// Population history ring size.
const POP_HISTORY: usize = 48;

const NUM_COLORS: usize = 8;

pub struct GameOfLife {
    canvas: Canvas,
    cells: Vec<u8>,
    cell_colors: [Rgb; NUM_COLORS],
    fade_steps: u8,
    fade_step: u8,
    delay_ms: u16,
    start_pattern: u8,
    pattern_repeat_x: u8,
    pattern_repeat_y: u8,
    alive: u16,
    population: [u16; POP_HISTORY],
    pop_cursor: usize,
    unchanged_count: u32,
    repeat2_count: u32,
    repeat3_count: u32,
    unchanged_population: [u32; MAX_REPEAT_CYCLE],
    iterations: u32,
    iterations_min: u32,
    iterations_max: u32,
    panel_size: u32,
    start_over: bool,
    fade_on: bool,
}

impl GameOfLife {
    pub fn new(
        width: u16,
        height: u16,
        fade_steps: u8,
        delay_ms: u16,
        start_pattern: u8,
        pattern_repeat_x: u8,
        pattern_repeat_y: u8,
    ) -> Self {
        let canvas = Canvas::new(width, height);
        let size = canvas.size();
        Self {
            canvas,
            cells: vec![0; size],
            cell_colors: [BLACK; NUM_COLORS],
            fade_steps,
            fade_step: fade_steps,
            delay_ms,
            start_pattern: if (1..=8).contains(&start_pattern) { start_pattern } else { 0 },
            pattern_repeat_x: pattern_repeat_x.max(1),
            pattern_repeat_y: pattern_repeat_y.max(1),
            alive: 0,
            population: [0; POP_HISTORY],
            // Last position: it is incremented before first use.
            pop_cursor: POP_HISTORY - 1,
            unchanged_count: 0,
            repeat2_count: 0,
            repeat3_count: 0,
            unchanged_population: [0; MAX_REPEAT_CYCLE],
            iterations: 0,
            iterations_min: u32::MAX,
            iterations_max: 0,
            panel_size: width.min(height) as u32,
            start_over: true,
            fade_on: false,
        }
    }

    /// Seed pattern index: 0 = random fill, 1..=8 selects a preset.
    pub fn set_start_pattern(&mut self, pattern_idx: u8) {
        self.start_pattern = if (1..=8).contains(&pattern_idx) { pattern_idx } else { 0 };
    }

    /// Force a reseed on the next cycle.
    pub fn restart(&mut self) {
        self.start_over = true;
    }

    pub fn cell_state(&self, x: u16, y: u16) -> bool {
        self.cells[self.canvas.index(x, y)] & CELL_ALIVE != 0
    }

    pub fn cell_color(&self, idx: usize) -> Rgb {
        self.cell_colors[idx]
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn run_cycle<R: Renderer>(&mut self, renderer: &mut R) {
        // Highest consecutive-repeat count among cycles longer than 5
        // frames, for the long-cycle termination condition.
        let mut max_repeats_count = 0;
        let mut max_contributor = 0;
        for i in 4..MAX_REPEAT_CYCLE {
            if self.unchanged_population[i] > max_repeats_count {
                max_repeats_count = self.unchanged_population[i];
                max_contributor = i;
            }
        }

        /* Reinitialise the simulation on any of:
         *  - all cells dead
         *  - no changes between consecutive frames (static pattern)
         *  - pattern alternating between 2 states, or cycling over 3
         *  - population constant at exactly 5 cells for 4x panel size
         *    frames (gliding pattern), or constant at any size for 10x
         *  - population cycling with period 4 for 3x panel size frames
         *  - population cycling with period 6..24 for over 200 frames
         */
        if self.start_over
            || self.alive == 0
            || self.unchanged_count > 5
            || self.repeat2_count > 6
            || self.repeat3_count > 35
            || self.unchanged_population[0] > self.panel_size * 10
            || (self.unchanged_population[0] > self.panel_size * 4 && self.alive == 5)
            || self.unchanged_population[3] > self.panel_size * 3
            || max_repeats_count > 200
        {
            if self.iterations > 0 {
                if self.iterations < self.iterations_min {
                    self.iterations_min = self.iterations;
                }
                if self.iterations > self.iterations_max {
                    self.iterations_max = self.iterations;
                }

                let reason = if self.alive == 0 {
                    "All died".to_string()
                } else if self.unchanged_count > 5 {
                    "Static pattern for 5 frames".to_string()
                } else if self.repeat2_count > 6 {
                    "Pattern repeated over 2 frames".to_string()
                } else if self.repeat3_count > 35 {
                    "Pattern repeated over 3 frames".to_string()
                } else if self.unchanged_population[0] > self.panel_size * 10 {
                    format!("Population static over {} frames", self.panel_size * 10)
                } else if self.unchanged_population[0] > self.panel_size * 4 && self.alive == 5 {
                    format!(
                        "Population static over {} frames with 5 cells exactly",
                        self.panel_size * 4
                    )
                } else if self.unchanged_population[3] > self.panel_size * 3 {
                    format!("Population repeated over 4 step cycle {} x", self.panel_size * 3)
                } else if max_repeats_count > 150 {
                    format!("Population repeated over {} step cycle 150x", max_contributor + 1)
                } else {
                    "Restart requested".to_string()
                };
                renderer.log(&format!(
                    "Pattern terminated after {} iterations (min: {}, max: {}): {}",
                    self.iterations, self.iterations_min, self.iterations_max, reason
                ));
            }

            self.initialise_grid(self.start_pattern, renderer);
        } else if self.fade_on {
            self.fade_step += 1;
            self.fade_in_changes(self.fade_step, renderer);
            if self.fade_step >= self.fade_steps {
                // End of fade: commit the generation and repaint.
                self.fade_on = false;
                renderer.sleep_ms(self.delay_ms as u32);
                self.apply_changes();
                self.canvas.paint(renderer);
                renderer.show();
            }
        } else {
            self.mark_changes();

            if self.fade_steps > 1 {
                // Fade mode renders the transition over the next cycles.
                self.fade_step = 0;
                self.fade_on = true;
            } else {
                self.apply_changes();
                self.canvas.paint(renderer);
                renderer.show();
            }

            if self.alive == 0 {
                // Pause on the dead frame before the reset wipes it.
                let wait = (self.delay_ms as u32 * 100).min(3000);
                renderer.sleep_ms(wait);
            }
        }

        renderer.sleep_ms(self.delay_ms as u32);
        self.iterations += 1;
    }

    /// Apply the life rules, flagging births and deaths in the change bit
    /// without committing them yet.
    fn mark_changes(&mut self) {
        let width = self.canvas.width();
        let height = self.canvas.height();

        for y in 0..height {
            for x in 0..width {
                // Count live neighbours, wrapping over the grid edges. The
                // scan includes the cell itself, which the -1 start
                // cancels out for live cells; for empty cells a count of
                // 2 therefore means three live neighbours.
                let mut neighbours: i32 = -1;
                let mut scores = [0u8; NUM_COLORS];
                for xi in -1..2 {
                    let xt = self.canvas.new_position_x(x, xi, true);
                    for yi in -1..2 {
                        let yt = self.canvas.new_position_y(y, yi, true);
                        let cell = self.cells[self.canvas.index(xt, yt)];
                        if cell & CELL_ALIVE != 0 {
                            neighbours += 1;
                            scores[(cell >> COLOR_SHIFT) as usize] += 1;
                        }
                    }
                }

                let idx = self.canvas.index(x, y);
                let cell = &mut self.cells[idx];
                *cell &= !CELL_CHANGE;
                let is_alive = *cell & CELL_ALIVE != 0;

                if is_alive && neighbours < 2 {
                    // Too few neighbours: dies.
                    *cell |= CELL_CHANGE;
                } else if !is_alive && neighbours == 2 {
                    // Birth; colour from the highest-scoring neighbours.
                    *cell |= CELL_CHANGE;
                    let mut max_score = 0;
                    let mut new_color = 0u8;
                    for (i, &score) in scores.iter().enumerate() {
                        if score > max_score {
                            max_score = score;
                            new_color = i as u8;
                        }
                    }
                    *cell &= !(0b111 << COLOR_SHIFT);
                    *cell |= new_color << COLOR_SHIFT;
                } else if is_alive && neighbours > 3 {
                    // Overcrowded: dies.
                    *cell |= CELL_CHANGE;
                }
            }
        }
    }

    /// Commit flagged births and deaths, advance per-cell history, and
    /// update the repeat-detection statistics.
    fn apply_changes(&mut self) {
        let width = self.canvas.width();
        let height = self.canvas.height();

        let mut changes: u32 = 0;
        let mut compare2 = true;
        let mut compare3 = true;

        for y in 0..height {
            for x in 0..width {
                let idx = self.canvas.index(x, y);
                let mut cell = self.cells[idx];

                // Shift the last three frames of history along.
                cell = if cell & CELL_PREV2 != 0 { cell | CELL_PREV3 } else { cell & !CELL_PREV3 };
                cell = if cell & CELL_PREV1 != 0 { cell | CELL_PREV2 } else { cell & !CELL_PREV2 };
                cell = if cell & CELL_ALIVE != 0 { cell | CELL_PREV1 } else { cell & !CELL_PREV1 };

                if cell & CELL_ALIVE == 0 && cell & CELL_CHANGE != 0 {
                    cell |= CELL_ALIVE;
                    let color_idx = (cell >> COLOR_SHIFT) as usize;
                    self.cells[idx] = cell;
                    self.canvas.set_pixel_color(x, y, self.cell_colors[color_idx]);
                    changes += 1;
                    self.alive += 1;
                } else if cell & CELL_ALIVE != 0 && cell & CELL_CHANGE != 0 {
                    cell &= !CELL_ALIVE;
                    self.cells[idx] = cell;
                    self.canvas.set_pixel_color(x, y, BLACK);
                    changes += 1;
                    self.alive -= 1;
                } else {
                    self.cells[idx] = cell;
                }

                let cell = self.cells[idx];
                if compare2 && ((cell & CELL_ALIVE == 0) != (cell & CELL_PREV2 == 0)) {
                    compare2 = false;
                }
                if compare3 && ((cell & CELL_ALIVE == 0) != (cell & CELL_PREV3 == 0)) {
                    compare3 = false;
                }
            }
        }

        self.pop_cursor = (self.pop_cursor + 1) % POP_HISTORY;
        self.population[self.pop_cursor] = self.alive;

        if changes == 0 {
            self.unchanged_count += 1;
        } else {
            self.unchanged_count = 0;
        }
        if compare2 {
            self.repeat2_count += 1;
        } else {
            self.repeat2_count = 0;
        }
        if compare3 {
            self.repeat3_count += 1;
        } else {
            self.repeat3_count = 0;
        }

        // Consecutive frames with identical population.
        let prev = (self.pop_cursor + POP_HISTORY - 1) % POP_HISTORY;
        if self.population[prev] == self.alive {
            self.unchanged_population[0] += 1;
        } else {
            self.unchanged_population[0] = 0;
        }

        // Look for the shortest population cycle (4..=24 frames) that
        // repeats across the whole history ring.
        let mut matched_gap = None;
        'gaps: for gap in 4..=MAX_REPEAT_CYCLE {
            let mut gap_check = false;
            for i in 1..POP_HISTORY / gap {
                for j in 0..gap {
                    let pop_chk = (self.pop_cursor as i32 - 1 - (gap * i) as i32 - j as i32)
                        .rem_euclid(POP_HISTORY as i32) as usize;
                    let prev_chk = (pop_chk + gap * i) % POP_HISTORY;
                    gap_check = self.population[pop_chk] > 0
                        && self.population[pop_chk] == self.population[prev_chk];
                    if !gap_check {
                        break;
                    }
                }
                if !gap_check {
                    break;
                }
            }
            if gap_check {
                matched_gap = Some(gap);
                break 'gaps;
            }
        }
        for gap in 4..=MAX_REPEAT_CYCLE {
            if matched_gap == Some(gap) {
                self.unchanged_population[gap - 1] += 1;
            } else {
                self.unchanged_population[gap - 1] = 0;
            }
        }
    }

    /// Render one step of the birth/death fade directly to the renderer.
    /// Births fade black -> green -> cell colour, deaths colour -> red ->
    /// black, switching halfway through the fade.
    fn fade_in_changes<R: Renderer>(&self, step: u8, renderer: &mut R) {
        let half_steps = self.fade_steps / 2;
        let c0 = self.cell_colors[0];
        let brightness = ((c0.r as u16 + c0.g as u16 + c0.b as u16) / 2).min(128) as u8;

        let mut born = BLACK;
        let mut died = BLACK;
        if step <= half_steps {
            born = BLACK.blend(Rgb::new(0, brightness, 0), step, half_steps);
        } else {
            died = Rgb::new(brightness, 0, 0).blend(BLACK, step - half_steps, self.fade_steps - half_steps);
        }

        for y in 0..self.canvas.height() {
            for x in 0..self.canvas.width() {
                let cell = self.cells[self.canvas.index(x, y)];
                let color_idx = (cell >> COLOR_SHIFT) as usize;

                if cell & CELL_ALIVE == 0 && cell & CELL_CHANGE != 0 {
                    let c = if step <= half_steps {
                        born
                    } else {
                        Rgb::new(0, brightness, 0).blend(
                            self.cell_colors[color_idx],
                            step - half_steps,
                            self.fade_steps - half_steps,
                        )
                    };
                    renderer.set_pixel(x, y, c);
                } else if cell & CELL_ALIVE != 0 && cell & CELL_CHANGE != 0 {
                    let c = if step <= half_steps {
                        self.cell_colors[color_idx].blend(Rgb::new(brightness, 0, 0), step, half_steps)
                    } else {
                        died
                    };
                    renderer.set_pixel(x, y, c);
                } else if cell & CELL_ALIVE != 0 {
                    renderer.set_pixel(x, y, self.cell_colors[color_idx]);
                }
            }
        }

        renderer.show();
    }

    fn initialise_grid<R: Renderer>(&mut self, pattern_idx: u8, renderer: &mut R) {
        // Wipe the image (and its palette - colours are about to change).
        self.canvas.clear();

        self.alive = 0;
        self.iterations = 0;
        self.fade_on = false;
        self.fade_step = self.fade_steps;
        self.unchanged_count = 0;
        self.unchanged_population = [0; MAX_REPEAT_CYCLE];
        self.repeat2_count = 0;
        self.repeat3_count = 0;
        self.population = [0; POP_HISTORY];

        for i in 0..NUM_COLORS {
            self.cell_colors[i] = self.canvas.random_color(renderer);

            if self.fade_steps > 4 {
                // Reject colours too close to the red/green fade channels.
                const MAX_DIFF: i32 = 80;
                loop {
                    let c = self.cell_colors[i];
                    let (r, g, b) = (c.r as i32, c.g as i32, c.b as i32);
                    let too_red = r - g > MAX_DIFF && r - b > MAX_DIFF;
                    let too_green = g - r > MAX_DIFF && g - b > MAX_DIFF;
                    if !too_red && !too_green {
                        break;
                    }
                    renderer.log(&format!("Rejected colour {}, {}, {}", c.r, c.g, c.b));
                    self.cell_colors[i] = self.canvas.random_color(renderer);
                }
            }
        }

        let width = self.canvas.width();
        let height = self.canvas.height();

        if pattern_idx == 0 {
            // Random 15% fill with random palette colours.
            for y in 0..height {
                for x in 0..width {
                    let idx = self.canvas.index(x, y);
                    if renderer.random_int(0, 100) < 15 {
                        let color_idx = renderer.random_int(0, NUM_COLORS as i32) as u8;
                        self.cells[idx] = (color_idx << COLOR_SHIFT) | CELL_ALIVE;
                        self.canvas
                            .set_pixel_color(x, y, self.cell_colors[color_idx as usize]);
                        self.alive += 1;
                    } else {
                        self.cells[idx] = 0;
                        self.canvas.set_pixel_color(x, y, BLACK);
                    }
                }
            }
        } else {
            let pattern = patterns::preset(pattern_idx as usize - 1);

            for cell in self.cells.iter_mut() {
                *cell &= !CELL_ALIVE;
            }

            // Tile the pattern with even spacing.
            let mut color_idx = 0u8;
            for py in 0..self.pattern_repeat_y as u16 {
                for px in 0..self.pattern_repeat_x as u16 {
                    let spacing_x = width / (self.pattern_repeat_x as u16 + 1);
                    let spacing_y = height / (self.pattern_repeat_y as u16 + 1);
                    let offset_x = spacing_x * (px + 1);
                    let offset_y = spacing_y * (py + 1);

                    for y in offset_y..offset_y + 16 {
                        for x in offset_x..offset_x + 16 {
                            if x < width && y < height {
                                // Pattern rows are stored top-down; the
                                // grid y axis points up.
                                let row = 15 - (y - offset_y) as usize;
                                let col = (x - offset_x) as usize;
                                if pattern[row].as_bytes()[col] == b'X' {
                                    let idx = self.canvas.index(x, y);
                                    self.cells[idx] = (color_idx << COLOR_SHIFT) | CELL_ALIVE;
                                    self.canvas
                                        .set_pixel_color(x, y, self.cell_colors[color_idx as usize]);
                                    self.alive += 1;
                                }
                            }
                        }
                    }

                    color_idx = (color_idx + 1) % NUM_COLORS as u8;
                }
            }
        }

        self.canvas.paint(renderer);
        renderer.show();

        self.start_over = false;
    }
}

mod patterns {
    /// 16x16 seed patterns, row 0 at the top.
    const PRESETS: [[&str; 16]; 8] = [
        // 1: two symmetric still-life pairs that collapse inwards
        [
            "................",
            "..........XX....",
            "..........XX....",
            ".........X......",
            "..........XXX...",
            "..........XXX...",
            "................",
            "................",
            "................",
            "..........XXX...",
            "..........XXX...",
            ".........X......",
            "..........XX....",
            "..........XX....",
            "................",
            "................",
        ],
        // 2: double block-and-cap column
        [
            "................",
            "................",
            "................",
            "................",
            "......XXX.......",
            "......X.X.......",
            "......XXX.......",
            "......XXX.......",
            "......XXX.......",
            "......XXX.......",
            "......X.X.......",
            "......XXX.......",
            "................",
            "................",
            "................",
            "................",
        ],
        // 3: the acorn-like methuselah cluster
        [
            "................",
            "................",
            "................",
            "................",
            ".....XXX.X......",
            ".....X..........",
            "........XX......",
            "......XX.X......",
            ".....X.X.X......",
            "................",
            "................",
            "................",
            "................",
            "................",
            "................",
            "................",
        ],
        // 4: ring with glider escorts
        [
            "....XXX.........",
            "......X.........",
            ".....X..........",
            "................",
            ".......XX.......",
            "......X..X......",
            ".....X....X.....",
            "....X......X....",
            "....X......X....",
            ".....X....X.....",
            "......X..X......",
            ".......XX.......",
            "................",
            "..........X.....",
            ".........X......",
            ".........XXX....",
        ],
        // 5: plain ring
        [
            "................",
            "................",
            "................",
            "................",
            ".......XX.......",
            "......X..X......",
            ".....X....X.....",
            "....X......X....",
            "....X......X....",
            ".....X....X.....",
            "......X..X......",
            ".......XX.......",
            "................",
            "................",
            "................",
            "................",
        ],
        // 6: ring with gliders and corner eaters
        [
            "....XXX.........",
            "......X.........",
            ".....X..........",
            "................",
            ".......XX......X",
            "......X..X...X.X",
            ".....X....X...XX",
            "....X......X....",
            "....X......X....",
            "XX...X....X.....",
            "X.X...X..X......",
            "X......XX.......",
            "................",
            "..........X.....",
            ".........X......",
            ".........XXX....",
        ],
        // 7: two spark coils
        [
            "................",
            "................",
            ".....XXX........",
            ".....X..XXX.....",
            ".....XXX..X.....",
            "........XXX.....",
            "................",
            "................",
            "................",
            "................",
            ".....XXX........",
            ".....X..XXX.....",
            ".....XXX..X.....",
            "........XXX.....",
            "................",
            "................",
        ],
        // 8: corner rakes
        [
            "XXXXXX..........",
            "X.....X.........",
            "X...............",
            ".X....X......XXX",
            "...XX..........X",
            "..............X.",
            "................",
            ".X..X...........",
            "X...............",
            "X...X...........",
            "XXXX............",
            "............X...",
            "..........X...X.",
            "...............X",
            "..........X....X",
            "...........XXXXX",
        ],
    ];

    pub(super) fn preset(idx: usize) -> &'static [&'static str; 16] {
        &PRESETS[idx]
    }
}
