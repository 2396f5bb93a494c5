/*
 * Viewer Module
 *
 * Optional nannou front end for the flock. Shows a top-down view of the x/z
 * plane, runs the simulation on a fixed timestep and exposes the run
 * settings through an egui panel.
 *
 * Controls:
 * - Left drag pans, mouse wheel zooms
 * - Right click sets a shared target for every flock
 */

mod camera;
mod ui;

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use nannou_egui::Egui;
use tracing::{debug, error, warn};

use crate::config::Settings;
use crate::motion::MotionProvider;
use crate::simulation::Simulation;

use camera::Camera;
use ui::{PanelState, UiActions};

const AGENT_SIZE: f32 = 2.5;

// One colour per flock, reused when there are more flocks than entries
const FLOCK_COLORS: [(f32, f32, f32); 5] = [
    (0.95, 0.45, 0.35),
    (0.35, 0.75, 0.95),
    (0.55, 0.90, 0.45),
    (0.95, 0.85, 0.35),
    (0.80, 0.50, 0.95),
];

pub struct Model {
    pub simulation: Simulation,
    pub settings: Settings,
    pub egui: Egui,
    pub camera: Camera,
    pub mouse_position: Vec2,
    pub paused: bool,
    pub show_debug: bool,
}

pub fn run() {
    nannou::app(model).update(update).run();
}

fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(1280, 800)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_wheel(mouse_wheel)
        .raw_event(raw_window_event)
        .build()
        .expect("Failed to create the viewer window");
    let window = app.window(window_id).expect("Viewer window closed during startup");
    let egui = Egui::from_window(&window);

    let settings = Settings::default();
    let simulation = Simulation::from_settings(&settings).expect("Default settings build a valid simulation");
    let mut camera = Camera::new(1.0);
    camera.frame_world(settings.flock.world_size, window.rect());

    Model {
        simulation,
        settings,
        egui,
        camera,
        mouse_position: Vec2::ZERO,
        paused: false,
        show_debug: true,
    }
}

fn update(_app: &App, model: &mut Model, update: Update) {
    let actions = ui::update_ui(
        &mut model.egui,
        PanelState {
            settings: &mut model.settings,
            paused: &mut model.paused,
            show_debug: &mut model.show_debug,
        },
        model.simulation.debug_info(),
    );
    apply_actions(model, actions);

    model.simulation.set_paused(model.paused);
    if let Err(err) = model.simulation.advance(update.since_last) {
        error!(%err, "flock update failed, pausing");
        model.paused = true;
    }
}

fn apply_actions(model: &mut Model, actions: UiActions) {
    if actions.settings_changed || actions.reset {
        rebuild(model);
    }
    if actions.clear_target {
        model.simulation.clear_target();
    }
}

// Replace the running simulation with one built from the edited settings.
// Invalid settings leave the current simulation running.
fn rebuild(model: &mut Model) {
    match Simulation::from_settings(&model.settings) {
        Ok(simulation) => {
            debug!(count = model.settings.population.count, "viewer rebuilt simulation");
            model.simulation = simulation;
        }
        Err(err) => warn!(%err, "settings rejected, keeping current simulation"),
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let world_size = model.simulation.config().world_size;

    // World boundary
    let corner_a = model.camera.world_to_screen(vec2(-world_size, -world_size), window_rect);
    let corner_b = model.camera.world_to_screen(vec2(world_size, world_size), window_rect);
    let world_rect = Rect::from_corners(corner_a, corner_b);
    draw.rect()
        .xy(world_rect.xy())
        .wh(world_rect.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    let scaled_size = AGENT_SIZE * model.camera.zoom;
    let points = [
        pt2(scaled_size, 0.0),
        pt2(-scaled_size, scaled_size / 2.0),
        pt2(-scaled_size, -scaled_size / 2.0),
    ];

    for (index, flock) in model.simulation.group().flocks().iter().enumerate() {
        let (r, g, b) = FLOCK_COLORS[index % FLOCK_COLORS.len()];
        for body in flock.bodies() {
            let screen_pos = model
                .camera
                .world_to_screen(Camera::project(body.position()), window_rect);
            let velocity = body.linear_velocity();
            let angle = velocity.z.atan2(velocity.x);
            draw.polygon()
                .color(rgb(r, g, b))
                .points(points.iter().cloned())
                .xy(screen_pos)
                .rotate(angle);
        }
    }

    if let Some(target) = model
        .simulation
        .group()
        .flocks()
        .first()
        .and_then(|flock| flock.agent(0))
        .and_then(|agent| agent.target())
    {
        let screen_pos = model
            .camera
            .world_to_screen(Camera::project(target.position), window_rect);
        draw.ellipse()
            .xy(screen_pos)
            .radius(4.0)
            .no_fill()
            .stroke_weight(1.5)
            .stroke(rgba(1.0, 1.0, 1.0, 0.8));
    }

    if model.show_debug {
        draw_debug_info(&draw, model, window_rect);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to render frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to render controls");
    }
}

fn draw_debug_info(draw: &Draw, model: &Model, window_rect: Rect) {
    let debug_info = model.simulation.debug_info();
    let last = &debug_info.last_tick;
    let lines = [
        format!("Agents: {}", model.simulation.group().len()),
        format!("Steps this frame: {}", debug_info.physics_updates_per_frame),
        format!("Processed: {}  copied: {}", last.processed, last.copied),
        format!("Without cohesion: {}", last.without_cohesion),
        format!("Speed clamped: {}  pinned: {}", last.speed_clamped, last.pinned),
        format!("Zoom: {:.2}x", model.camera.zoom),
    ];

    let margin = 20.0;
    let line_height = 20.0;
    let text_x = window_rect.right() - 130.0;
    let text_y = window_rect.top() - margin;
    for (i, text) in lines.iter().enumerate() {
        draw.text(text)
            .x_y(text_x, text_y - i as f32 * line_height)
            .w(240.0)
            .left_justify()
            .color(WHITE)
            .font_size(14);
    }
}

fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    model.camera.drag(pos);
    model.mouse_position = pos;
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match button {
        MouseButton::Left => model.camera.start_drag(model.mouse_position),
        MouseButton::Right => {
            let ground = model.camera.screen_to_world(model.mouse_position, app.window_rect());
            if let Err(err) = model.simulation.broadcast_target(Camera::unproject(ground)) {
                warn!(%err, "could not set target");
            }
        }
        _ => {}
    }
}

fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let window_rect = app.window_rect();
    match delta {
        MouseScrollDelta::LineDelta(_, y) => {
            model.camera.zoom_at(y, model.mouse_position, window_rect);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            model
                .camera
                .zoom_at(pos.y as f32 * 0.01, model.mouse_position, window_rect);
        }
    }
}

fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    model.egui.handle_raw_event(event);
}
