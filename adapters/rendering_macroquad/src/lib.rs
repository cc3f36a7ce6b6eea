#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the grid simulation.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The scene is drawn in window pixels without scaling, so a pointer position
//! reported by macroquad is already a grid pixel position.

use anyhow::Result;
use glam::Vec2;
use grid_sim_core::{Direction, InputEvent, PixelPosition};
use grid_sim_rendering::{
    Color, FrameInput, FramePacer, FrameTime, GridPresentation, GridScene, Presentation,
    RenderingBackend, Scene, WaypointScene,
};
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    thread,
    time::{Duration, Instant},
};

const HUD_FONT_SIZE: f32 = 18.0;
const HUD_LINE_HEIGHT: f32 = 18.0;
const HUD_MARGIN: f32 = 6.0;
const PLAN_MARKER_ALPHA: f32 = 0.35;
const SELECTION_OUTLINE: f32 = 2.0;

/// Edge-triggered keys and clicks observed during a single frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyObservations {
    /// `Escape` quits.
    pub escape: bool,
    /// `Space` toggles pause.
    pub space: bool,
    /// `R` resets.
    pub reset: bool,
    /// `Enter` confirms the plans.
    pub enter: bool,
    /// Arrow up.
    pub up: bool,
    /// Arrow right.
    pub right: bool,
    /// Arrow down.
    pub down: bool,
    /// Arrow left.
    pub left: bool,
    /// `Backspace` or `U` undoes the last planned step.
    pub undo: bool,
    /// `C` clears the plan.
    pub clear: bool,
    /// Pointer position of a left click this frame.
    pub left_click: Option<Vec2>,
}

impl KeyObservations {
    fn poll() -> Self {
        let left_click = is_mouse_button_pressed(MouseButton::Left).then(|| {
            let (x, y) = mouse_position();
            Vec2::new(x, y)
        });

        Self {
            escape: is_key_pressed(KeyCode::Escape),
            space: is_key_pressed(KeyCode::Space),
            reset: is_key_pressed(KeyCode::R),
            enter: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            up: is_key_pressed(KeyCode::Up),
            right: is_key_pressed(KeyCode::Right),
            down: is_key_pressed(KeyCode::Down),
            left: is_key_pressed(KeyCode::Left),
            undo: is_key_pressed(KeyCode::Backspace) || is_key_pressed(KeyCode::U),
            clear: is_key_pressed(KeyCode::C),
            left_click,
        }
    }

    /// Translates the observations into events in a fixed order.
    ///
    /// A click is emitted before plan edits so an arrow pressed in the same
    /// frame plans for the newly selected movable.
    #[must_use]
    pub fn into_events(self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.escape {
            events.push(InputEvent::Quit);
        }
        if self.reset {
            events.push(InputEvent::Reset);
        }
        if self.space {
            events.push(InputEvent::TogglePause);
        }
        if let Some(position) = self.left_click {
            events.push(InputEvent::Click(PixelPosition::new(position.x, position.y)));
        }
        let arrows = [
            (self.up, Direction::North),
            (self.right, Direction::East),
            (self.down, Direction::South),
            (self.left, Direction::West),
        ];
        events.extend(
            arrows
                .into_iter()
                .filter(|(pressed, _)| *pressed)
                .map(|(_, direction)| InputEvent::Plan(direction)),
        );
        if self.undo {
            events.push(InputEvent::Undo);
        }
        if self.clear {
            events.push(InputEvent::Clear);
        }
        if self.enter {
            events.push(InputEvent::Confirm);
        }
        events
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameTime, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            width,
            height,
            clear_color,
            pacer,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let started = Instant::now();

            loop {
                let frame_start = Instant::now();
                let input = FrameInput {
                    events: KeyObservations::poll().into_events(),
                };
                let quit = input.wants_quit();
                let time = FrameTime {
                    delta: Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0)),
                    elapsed: started.elapsed(),
                };

                update_scene(time, input, &mut scene);
                if quit {
                    break;
                }

                macroquad::window::clear_background(background);
                match &scene {
                    Scene::Grid(grid) => draw_grid_scene(grid),
                    Scene::Waypoint(waypoint) => draw_waypoint_scene(waypoint),
                }

                macroquad::window::next_frame().await;
                pace_frame(pacer, frame_start.elapsed());
            }
        });

        Ok(())
    }
}

fn pace_frame(pacer: FramePacer, frame_elapsed: Duration) {
    if let Some(rest) = pacer.remaining(frame_elapsed) {
        thread::sleep(rest);
    }
}

fn draw_grid_scene(scene: &GridScene) {
    let grid = &scene.grid;
    draw_grid_lines(grid);

    for plan in &scene.plans {
        let marker = to_macroquad_color(plan.color.with_alpha(PLAN_MARKER_ALPHA));
        for cell in plan.pending_cells() {
            let origin = grid.cell_origin(*cell);
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                grid.cell_size,
                grid.cell_size,
                marker,
            );
        }
    }

    let outline = to_macroquad_color(Color::WHITE);
    for entity in &scene.entities {
        let origin = grid.cell_origin(entity.cell);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            grid.cell_size,
            grid.cell_size,
            to_macroquad_color(entity.color),
        );
        if entity.selected {
            macroquad::shapes::draw_rectangle_lines(
                origin.x,
                origin.y,
                grid.cell_size,
                grid.cell_size,
                SELECTION_OUTLINE,
                outline,
            );
        }
    }

    draw_hud(&scene.hud_lines());
}

fn draw_grid_lines(grid: &GridPresentation) {
    let line_color = to_macroquad_color(grid.line_color);
    for column in 0..=grid.columns {
        let x = column as f32 * grid.cell_size;
        macroquad::shapes::draw_line(x, 0.0, x, grid.height(), 1.0, line_color);
    }
    for row in 0..=grid.rows {
        let y = row as f32 * grid.cell_size;
        macroquad::shapes::draw_line(0.0, y, grid.width(), y, 1.0, line_color);
    }
}

fn draw_waypoint_scene(scene: &WaypointScene) {
    let path_color = to_macroquad_color(Color::from_rgb_u8(90, 90, 110));
    for segment in scene.path.windows(2) {
        macroquad::shapes::draw_line(
            segment[0].x,
            segment[0].y,
            segment[1].x,
            segment[1].y,
            2.0,
            path_color,
        );
    }

    let waypoint_color = to_macroquad_color(Color::from_rgb_u8(160, 160, 180));
    for point in &scene.path {
        macroquad::shapes::draw_circle(point.x, point.y, 5.0, waypoint_color);
    }
    if let Some(end) = scene.path.last() {
        macroquad::shapes::draw_circle_lines(
            end.x,
            end.y,
            12.0,
            2.0,
            to_macroquad_color(Color::from_rgb_u8(80, 200, 120)),
        );
    }
    if let Some(target) = scene.target {
        macroquad::shapes::draw_circle_lines(
            target.x,
            target.y,
            9.0,
            2.0,
            to_macroquad_color(Color::from_rgb_u8(240, 200, 60)),
        );
    }

    macroquad::shapes::draw_circle(
        scene.position.x,
        scene.position.y,
        scene.radius,
        to_macroquad_color(scene.color),
    );

    draw_hud(&scene.hud_lines());
}

fn draw_hud(lines: &[String]) {
    let text_color = to_macroquad_color(Color::WHITE);
    for (index, line) in lines.iter().enumerate() {
        let origin = hud_line_origin(index);
        let _ = macroquad::text::draw_text(line, origin.x, origin.y, HUD_FONT_SIZE, text_color);
    }
}

fn hud_line_origin(index: usize) -> Vec2 {
    Vec2::new(HUD_MARGIN, HUD_MARGIN + HUD_LINE_HEIGHT * (index as f32 + 1.0))
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
