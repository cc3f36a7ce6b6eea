#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for grid simulation adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use grid_sim_core::{CellCoord, EntityColor, InputEvent, Phase};
use std::{error::Error, fmt, time::Duration};

/// Key legend shown at the bottom of the grid HUD.
pub const GRID_CONTROLS_HINT: &str =
    "click: select  arrows: plan  backspace/U: undo  C: clear  enter: go  space: pause  R: reset  esc: quit";

/// Key legend shown by the waypoint demo HUD.
pub const WAYPOINT_CONTROLS_HINT: &str = "space: pause  R: reset  esc: quit";

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl From<EntityColor> for Color {
    fn from(color: EntityColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Discrete events observed this frame, in the order they were polled.
    pub events: Vec<InputEvent>,
}

impl FrameInput {
    /// Reports whether the frame carries a quit request.
    #[must_use]
    pub fn wants_quit(&self) -> bool {
        self.events.contains(&InputEvent::Quit)
    }
}

/// Clock readings handed to the scene update each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Time elapsed since the previous frame.
    pub delta: Duration,
    /// Monotonic time since the backend started.
    pub elapsed: Duration,
}

/// Dimensions of the rendered cell grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of one cell in pixels.
    pub cell_size: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor, rejecting degenerate cells.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if cell_size.is_nan() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
            line_color,
        })
    }

    /// Width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Height of the grid in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Top-left pixel corner of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_size,
            cell.row() as f32 * self.cell_size,
        )
    }

    /// Pixel centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.cell_size * 0.5)
    }
}

/// Filled cell drawn for a wall or movable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Cell occupied by the entity.
    pub cell: CellCoord,
    /// Fill color.
    pub color: Color,
    /// Whether the entity should be outlined as selected.
    pub selected: bool,
}

impl SceneEntity {
    /// Creates a new entity descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, color: Color, selected: bool) -> Self {
        Self {
            cell,
            color,
            selected,
        }
    }
}

/// Planned route of one movable.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePlan {
    /// Color of the owning movable.
    pub color: Color,
    /// Planned cells in playback order.
    pub cells: Vec<CellCoord>,
    /// Number of planned cells already consumed by playback.
    pub playback_index: usize,
}

impl ScenePlan {
    /// Creates a new plan descriptor.
    #[must_use]
    pub fn new(color: Color, cells: Vec<CellCoord>, playback_index: usize) -> Self {
        Self {
            color,
            cells,
            playback_index,
        }
    }

    /// Cells that playback has not reached yet.
    #[must_use]
    pub fn pending_cells(&self) -> &[CellCoord] {
        let start = self.playback_index.min(self.cells.len());
        &self.cells[start..]
    }
}

/// Snapshot of the grid planning demo.
#[derive(Clone, Debug, PartialEq)]
pub struct GridScene {
    /// Grid dimensions.
    pub grid: GridPresentation,
    /// Every indexed entity.
    pub entities: Vec<SceneEntity>,
    /// Per-movable plans.
    pub plans: Vec<ScenePlan>,
    /// Phase reported by the controller.
    pub phase: Phase,
    /// Whether the controller is paused.
    pub paused: bool,
}

impl GridScene {
    /// Creates an empty scene for the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            entities: Vec::new(),
            plans: Vec::new(),
            phase: Phase::Planning,
            paused: false,
        }
    }

    /// Text lines describing phase, pause and per-movable progress.
    #[must_use]
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.plans.len() + 2);
        let pause = if self.paused { "  [PAUSED]" } else { "" };
        lines.push(format!("phase: {}{pause}", self.phase));
        for (index, plan) in self.plans.iter().enumerate() {
            lines.push(format!(
                "movable {index}: {}/{} steps",
                plan.playback_index.min(plan.cells.len()),
                plan.cells.len()
            ));
        }
        lines.push(GRID_CONTROLS_HINT.to_owned());
        lines
    }
}

/// Snapshot of the continuous waypoint demo.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointScene {
    /// Waypoints in travel order.
    pub path: Vec<Vec2>,
    /// Waypoint currently targeted, absent once finished.
    pub target: Option<Vec2>,
    /// Index of the targeted waypoint within `path`.
    pub target_index: usize,
    /// Entity position in pixels.
    pub position: Vec2,
    /// Entity radius in pixels.
    pub radius: f32,
    /// Entity fill color.
    pub color: Color,
    /// Status label such as `RUNNING`.
    pub status: &'static str,
}

impl WaypointScene {
    /// Text lines describing follower status.
    #[must_use]
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("status: {}", self.status)];
        if let Some(end) = self.path.last() {
            lines.push(format!(
                "waypoint: {}/{}   (end: {:.0}, {:.0})",
                self.target_index,
                self.path.len() - 1,
                end.x,
                end.y
            ));
        }
        lines.push(WAYPOINT_CONTROLS_HINT.to_owned());
        lines
    }
}

/// Scene content drawn by a backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Scene {
    /// Grid planning demo.
    Grid(GridScene),
    /// Waypoint follow demo.
    Waypoint(WaypointScene),
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Frame pacing applied by the backend.
    pub pacer: FramePacer,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        (width, height): (u32, u32),
        clear_color: Color,
        pacer: FramePacer,
        scene: Scene,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            width,
            height,
            clear_color,
            pacer,
            scene,
        }
    }
}

/// Caps the frame rate by reporting how long to sleep after each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePacer {
    budget: Duration,
}

impl FramePacer {
    /// Creates a pacer for the provided frames per second.
    pub fn new(frame_rate: u32) -> Result<Self, RenderingError> {
        if frame_rate == 0 {
            return Err(RenderingError::InvalidFrameRate { frame_rate });
        }
        Ok(Self {
            budget: Duration::from_secs(1) / frame_rate,
        })
    }

    /// Time available to a single frame.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Remaining sleep after a frame that took `frame_elapsed`, if any.
    #[must_use]
    pub fn remaining(&self, frame_elapsed: Duration) -> Option<Duration> {
        self.budget
            .checked_sub(frame_elapsed)
            .filter(|rest| !rest.is_zero())
    }
}

/// Rendering backend capable of presenting grid simulation scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame clock and the
    /// per-frame input captured by the adapter, and mutates the scene before
    /// it is rendered. A quit event ends the loop after the frame.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameTime, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cells must have a positive pixel size.
    InvalidCellSize {
        /// Provided size that failed validation.
        cell_size: f32,
    },
    /// Frame pacing needs at least one frame per second.
    InvalidFrameRate {
        /// Provided rate that failed validation.
        frame_rate: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell_size must be positive (received {cell_size})")
            }
            Self::InvalidFrameRate { frame_rate } => {
                write!(f, "frame_rate must be positive (received {frame_rate})")
            }
        }
    }
}

impl Error for RenderingError {}
