use super::*;
use crate::render::testing::TestRenderer;

fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

fn setup(width: u16, height: u16, shake: u16) -> (ParticleEngine, Canvas, TestRenderer) {
    let engine = ParticleEngine::new(width, height, shake).unwrap();
    let canvas = Canvas::new(width, height);
    let renderer = TestRenderer::new(42);
    (engine, canvas, renderer)
}

#[test]
fn construction_rejects_bad_grids() {
    assert_eq!(
        ParticleEngine::new(0, 8, 0).err(),
        Some(EngineError::InvalidDimensions { width: 0, height: 8 })
    );
    assert!(ParticleEngine::new(5901, 8, 0).is_err());
}

#[test]
fn velocity_cap_follows_acceleration_with_floor() {
    let (mut engine, _, mut renderer) = setup(16, 16, 0);
    assert_eq!(engine.scale(), 256);

    // Weak gravity: floor of scale/4 applies.
    engine.set_acceleration(&mut renderer, 0, 1);
    assert_eq!(engine.velocity_cap(), 64);

    // |a| = 50 -> 50 * 256 / 32 = 400.
    engine.set_acceleration(&mut renderer, 0, 50);
    assert_eq!(engine.velocity_cap(), 400);

    // Explicit cap wins over the derived value.
    engine.set_velocity_cap(1024);
    engine.set_acceleration(&mut renderer, 0, 50);
    assert_eq!(engine.velocity_cap(), 1024);
}

#[test]
fn three_axis_acceleration_projects_to_panel() {
    let (mut engine, _, mut renderer) = setup(16, 16, 0);
    engine.set_acceleration_3d(&mut renderer, 3, 4, 12);
    // Panel projection keeps (x, y); cap uses the full 3-D magnitude 13.
    assert_eq!(engine.accel_x, 3);
    assert_eq!(engine.accel_y, 4);
    assert_eq!(engine.velocity_cap(), 13 * 256 / 32);
}

#[test]
fn velocity_cap_invariant_holds_under_jitter() {
    let (mut engine, mut canvas, mut renderer) = setup(16, 16, 30);
    engine.set_acceleration(&mut renderer, 30, 50);
    for _ in 0..30 {
        engine
            .add_particle(&mut canvas, &mut renderer, rgb(200, 120, 40), 0, 0)
            .unwrap();
    }

    let cap_sq = engine.velocity_cap() as i64 * engine.velocity_cap() as i64;
    for _ in 0..50 {
        velocity::integrate_velocities(&mut engine, &mut renderer);
        for i in 0..engine.particle_count() {
            let p = engine.store.get(i);
            let v_sq = p.vx as i64 * p.vx as i64 + p.vy as i64 * p.vy as i64;
            assert!(v_sq <= cap_sq, "v^2 {} over cap^2 {}", v_sq, cap_sq);
        }
    }
}

#[test]
fn boundary_containment_and_occupancy_uniqueness() {
    let (mut engine, mut canvas, mut renderer) = setup(16, 16, 60);
    engine.set_acceleration(&mut renderer, 10, 20);
    for _ in 0..40 {
        engine
            .add_particle(&mut canvas, &mut renderer, rgb(90, 200, 30), 0, 0)
            .unwrap();
    }

    for _ in 0..100 {
        engine.run_cycle(&mut canvas, &mut renderer);

        let mut seen = std::collections::HashSet::new();
        for i in 0..engine.particle_count() {
            let p = engine.store.get(i);
            assert!(p.x <= engine.max_x);
            assert!(p.y <= engine.max_y);

            // At most one particle per occupancy cell, and the cell the
            // particle maps to is marked occupied.
            let cell = (p.y / engine.scale, p.x / engine.scale);
            assert!(seen.insert(cell), "two particles in cell {:?}", cell);
            assert!(!canvas.is_empty_cell(canvas.index(cell.1, cell.0)));
        }
    }
}

#[test]
fn diagonal_tie_goes_to_x_axis() {
    let (mut engine, mut canvas, mut renderer) = setup(5, 5, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 1, 1, rgb(255, 0, 0), 0, 0);
    {
        let p = engine.store.get_mut(0);
        p.x = 504;
        p.y = 504;
        p.vx = 256;
        p.vy = 256;
    }
    // Diagonal target blocked, horizontal alternate free.
    canvas.set_pixel_color(2, 2, rgb(0, 0, 255));

    motion::integrate_positions(&mut engine, &mut canvas, &mut renderer);

    let p = engine.store.get(0);
    // Took the horizontal-only cell: x advanced, y cancelled and bounced.
    assert_eq!((p.x / 256, p.y / 256), (2, 1));
    assert_eq!(p.vx, 256);
    assert_eq!(p.vy, -128);
    assert!(!canvas.is_empty_cell(canvas.index(2, 1)));
    assert!(canvas.is_empty_cell(canvas.index(1, 1)));
}

#[test]
fn faster_y_axis_tries_vertical_first() {
    let (mut engine, mut canvas, mut renderer) = setup(5, 5, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 1, 1, rgb(255, 0, 0), 0, 0);
    {
        let p = engine.store.get_mut(0);
        p.x = 505;
        p.y = 504;
        p.vx = 256;
        p.vy = 288;
    }
    canvas.set_pixel_color(2, 2, rgb(0, 0, 255));

    motion::integrate_positions(&mut engine, &mut canvas, &mut renderer);

    let p = engine.store.get(0);
    // Took the vertical-only cell: y advanced, x cancelled and bounced.
    assert_eq!((p.x / 256, p.y / 256), (1, 2));
    assert_eq!(p.vx, -128);
    assert_eq!(p.vy, 288);
}

#[test]
fn corner_blocked_particle_stops_dead() {
    let (mut engine, mut canvas, mut renderer) = setup(5, 5, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 1, 1, rgb(255, 0, 0), 0, 0);
    {
        let p = engine.store.get_mut(0);
        p.x = 504;
        p.y = 504;
        p.vx = 256;
        p.vy = 256;
    }
    canvas.set_pixel_color(2, 2, rgb(0, 0, 255));
    canvas.set_pixel_color(2, 1, rgb(0, 0, 255));
    canvas.set_pixel_color(1, 2, rgb(0, 0, 255));

    motion::integrate_positions(&mut engine, &mut canvas, &mut renderer);

    let p = engine.store.get(0);
    assert_eq!((p.x, p.y), (504, 504));
    assert_eq!(p.vx, -128);
    assert_eq!(p.vy, -128);
    assert!(!canvas.is_empty_cell(canvas.index(1, 1)));
}

#[test]
fn falling_particle_reaches_floor_and_stops() {
    // Scenario: one particle, gravity toward row 0, no bouncing.
    let (mut engine, mut canvas, mut renderer) = setup(10, 10, 0);
    engine.set_bounce(false);
    engine.set_acceleration(&mut renderer, 0, -50);
    engine.add_particle_at(&mut canvas, &mut renderer, 5, 5, rgb(250, 200, 0), 0, 0);

    for _ in 0..200 {
        engine.run_cycle(&mut canvas, &mut renderer);
    }

    let p = engine.particle(0);
    assert_eq!(p.y, 0);
    assert_eq!(p.vy, 0);
    assert_eq!(p.x, 5);
    assert!(!canvas.is_empty_cell(canvas.index(5, 0)));
}

#[test]
fn head_on_contest_leaves_one_particle_in_the_cell() {
    // Two particles converging on pixel (3, 0) with equal and opposite
    // velocity. The index-order pass lets the first claim the cell; the
    // second bounces off it.
    let (mut engine, mut canvas, mut renderer) = setup(10, 1, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 2, 0, rgb(255, 0, 0), 0, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 4, 0, rgb(0, 255, 0), 0, 0);
    {
        let p = engine.store.get_mut(0);
        p.x = 764;
        p.y = 100;
        p.vx = 256;
    }
    {
        let p = engine.store.get_mut(1);
        p.x = 1027;
        p.y = 100;
        p.vx = -256;
    }

    motion::integrate_positions(&mut engine, &mut canvas, &mut renderer);

    let first = engine.store.get(0);
    let second = engine.store.get(1);
    assert_eq!(first.x / 256, 3, "first mover claims the contested cell");
    assert_eq!(second.x / 256, 4, "second is blocked in place");
    assert_eq!(second.vx, 128, "blocked axis is negated and attenuated");
    assert!(!canvas.is_empty_cell(canvas.index(3, 0)));
    assert!(canvas.is_empty_cell(canvas.index(2, 0)));
}

#[test]
fn placement_fails_on_a_full_grid() {
    let (mut engine, mut canvas, mut renderer) = setup(4, 4, 0);
    for y in 0..4 {
        for x in 0..4 {
            canvas.set_pixel_color(x, y, rgb(10, 10, 10));
        }
    }

    let result = engine.add_particle(&mut canvas, &mut renderer, rgb(200, 0, 0), 0, 0);
    assert_eq!(result, Err(EngineError::PlacementFailed { attempts: 2001 }));
    assert_eq!(engine.particle_count(), 0);
    assert!(renderer
        .messages
        .iter()
        .any(|m| m.contains("Failed to find free position")));
}

#[test]
fn store_growth_preserves_particles() {
    let (mut engine, mut canvas, mut renderer) = setup(16, 16, 0);
    for _ in 0..120 {
        engine
            .add_particle(&mut canvas, &mut renderer, rgb(1, 2, 3), 7, -9)
            .unwrap();
    }
    assert_eq!(engine.particle_count(), 120);

    let early = engine.store.get(5);
    assert_eq!((early.vx, early.vy), (7, -9));
    assert!(renderer
        .messages
        .iter()
        .any(|m| m.contains("store expanded")));
}

#[test]
fn remove_clears_cell_and_reports_pixel_state() {
    let (mut engine, mut canvas, mut renderer) = setup(8, 8, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 1, 1, rgb(1, 1, 1), 0, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 3, 4, rgb(2, 2, 2), 5, 6);
    engine.add_particle_at(&mut canvas, &mut renderer, 6, 6, rgb(3, 3, 3), 0, 0);

    let removed = engine.remove_particle(&mut canvas, 1);
    assert_eq!((removed.x, removed.y, removed.vx, removed.vy), (3, 4, 5, 6));
    assert_eq!(engine.particle_count(), 2);
    assert!(canvas.is_empty_cell(canvas.index(3, 4)));
    // Former index 2 shifted down.
    assert_eq!(engine.particle(1).x, 6);
}

#[test]
fn clear_particles_leaves_canvas_alone() {
    let (mut engine, mut canvas, mut renderer) = setup(8, 8, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 2, 2, rgb(9, 9, 9), 0, 0);
    engine.clear_particles();
    assert_eq!(engine.particle_count(), 0);
    assert!(!canvas.is_empty_cell(canvas.index(2, 2)));
}

#[test]
fn bounce_division_truncates_toward_zero() {
    let (mut engine, _, _) = setup(8, 8, 0);
    assert_eq!(engine.bounced(1), 0);
    assert_eq!(engine.bounced(-1), 0);
    assert_eq!(engine.bounced(3), -1);
    assert_eq!(engine.bounced(-3), 1);
    assert_eq!(engine.bounced(5), -2);

    engine.set_loss(1.0);
    assert_eq!(engine.bounced(5), -5);

    engine.set_bounce(false);
    assert_eq!(engine.bounced(5), 0);
}

#[test]
fn boundary_bounce_reverses_and_attenuates() {
    let (mut engine, mut canvas, mut renderer) = setup(8, 8, 0);
    engine.add_particle_at(&mut canvas, &mut renderer, 7, 3, rgb(200, 0, 0), 0, 0);
    {
        let p = engine.store.get_mut(0);
        p.x = engine.max_x - 2;
        p.vx = 640;
    }

    motion::integrate_positions(&mut engine, &mut canvas, &mut renderer);

    let p = engine.store.get(0);
    assert_eq!(p.x, engine.max_x);
    assert_eq!(p.vx, -320);
}

#[test]
fn pixels_to_particles_adopts_the_image() {
    let (mut engine, mut canvas, mut renderer) = setup(8, 8, 0);
    canvas.set_pixel_color(1, 1, rgb(10, 0, 0));
    canvas.set_pixel_color(5, 2, rgb(0, 10, 0));
    canvas.set_pixel_color(7, 7, rgb(0, 0, 10));

    engine.pixels_to_particles(&mut canvas, &mut renderer);

    assert_eq!(engine.particle_count(), 3);
    let positions: Vec<_> = (0..3).map(|i| (engine.particle(i).x, engine.particle(i).y)).collect();
    assert!(positions.contains(&(1, 1)));
    assert!(positions.contains(&(5, 2)));
    assert!(positions.contains(&(7, 7)));
}
