#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Sim workspace.
//!
//! This crate defines the value types that connect adapters, the
//! authoritative world, and the pure systems. Adapters translate device input
//! into [`InputEvent`] values, the controller system consumes them to drive
//! the [`Phase`] state machine, and the world answers occupancy questions in
//! terms of [`CellCoord`] and [`EntityId`].

use std::{collections::HashSet, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Sim.";

/// Simulation mode gating which input the controller accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Movables are selected and their routes are planned step by step.
    #[default]
    Planning,
    /// Planned routes are replayed one cell per playback tick.
    Moving,
    /// Every movable exhausted its plan.
    Finished,
}

impl Phase {
    /// Upper-case label shown by adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::Moving => "MOVING",
            Self::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete input delivered by adapters once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// The player asked to close the experience.
    Quit,
    /// Flips the pause flag.
    TogglePause,
    /// Returns every movable to its start cell and re-enters planning.
    Reset,
    /// Starts (or restarts) playback of the current plans.
    Confirm,
    /// Plans one step for every selected movable.
    Plan(Direction),
    /// Removes the most recently planned step of every selected movable.
    Undo,
    /// Empties the plan of every selected movable.
    Clear,
    /// Pointer click at the provided window position.
    Click(PixelPosition),
}

/// Pointer position measured in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPosition {
    /// Horizontal offset from the left window edge.
    pub x: f32,
    /// Vertical offset from the top window edge.
    pub y: f32,
}

impl PixelPosition {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cardinal directions used when planning steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit offset `(dx, dy)` applied by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Resolves a unit orthogonal offset into a direction.
    ///
    /// Diagonal, zero and non-unit offsets yield `None`.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Unique identifier assigned to an entity placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual identity applied to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EntityColor {
    /// Gray used for randomly generated walls.
    pub const WALL: Self = Self::from_rgb(128, 128, 128);

    /// Creates a new entity color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Location of a single grid cell expressed as column (x) and row (y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell one step away in `direction`, if it lies inside `size`.
    #[must_use]
    pub fn step(self, direction: Direction, size: GridSize) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        let cell = CellCoord::new(column, row);
        size.contains(cell).then_some(cell)
    }

    /// Cell under a pixel position for square cells of `cell_size` pixels.
    ///
    /// Positions left of or above the window origin, and a zero cell size,
    /// yield `None`. The result is not clamped to any grid.
    #[must_use]
    pub fn from_pixel(pixel: PixelPosition, cell_size: u32) -> Option<CellCoord> {
        if cell_size == 0 || !(pixel.x >= 0.0) || !(pixel.y >= 0.0) {
            return None;
        }

        let size = cell_size as f32;
        let column = (pixel.x / size).floor();
        let row = (pixel.y / size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }
}

/// Dimensions of the cell grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Start cell and color of a movable placed during setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableConfig {
    /// Column of the start cell.
    pub column: u32,
    /// Row of the start cell.
    pub row: u32,
    /// Fill color of the movable.
    pub color: EntityColor,
}

impl MovableConfig {
    /// Start cell of the movable.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

/// Static configuration supplied at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Side length of a cell in window pixels.
    pub cell_size: u32,
    /// Minimum time between playback steps, in milliseconds.
    pub step_interval_ms: u64,
    /// Number of random walls placed at setup.
    pub wall_count: u32,
    /// Frame rate cap applied by the render loop.
    pub frame_rate: u32,
    /// Seed for wall placement. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Movables placed at setup, in order.
    pub movables: Vec<MovableConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 30,
            cell_size: 20,
            step_interval_ms: 50,
            wall_count: 100,
            frame_rate: 60,
            seed: None,
            movables: vec![
                MovableConfig {
                    column: 15,
                    row: 15,
                    color: EntityColor::from_rgb(220, 40, 40),
                },
                MovableConfig {
                    column: 10,
                    row: 10,
                    color: EntityColor::from_rgb(0, 0, 255),
                },
            ],
        }
    }
}

impl SimConfig {
    /// Grid dimensions described by the configuration.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        GridSize::new(self.columns, self.rows)
    }

    /// Playback interval as a duration.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Window width in pixels required to show the whole grid.
    #[must_use]
    pub fn window_width(&self) -> u32 {
        self.columns.saturating_mul(self.cell_size)
    }

    /// Window height in pixels required to show the whole grid.
    #[must_use]
    pub fn window_height(&self) -> u32 {
        self.rows.saturating_mul(self.cell_size)
    }

    /// Checks that the configuration describes a playable setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }

        let size = self.grid_size();
        let mut starts = HashSet::with_capacity(self.movables.len());
        for movable in &self.movables {
            let start = movable.start();
            if !size.contains(start) {
                return Err(ConfigError::MovableOutOfBounds {
                    column: start.column(),
                    row: start.row(),
                });
            }
            if !starts.insert(start) {
                return Err(ConfigError::DuplicateMovableStart {
                    column: start.column(),
                    row: start.row(),
                });
            }
        }

        let available = size.cell_count().saturating_sub(self.movables.len());
        let requested = usize::try_from(self.wall_count).unwrap_or(usize::MAX);
        if requested >= available {
            return Err(ConfigError::TooManyWalls {
                requested: self.wall_count,
                available,
            });
        }

        Ok(())
    }
}

/// Reasons a [`SimConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row (got {columns}x{rows})")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// Cells must span at least one pixel.
    #[error("cell size must be positive")]
    ZeroCellSize,
    /// The frame rate cap must be positive.
    #[error("frame rate must be positive")]
    ZeroFrameRate,
    /// A movable starts outside the grid.
    #[error("movable start ({column}, {row}) lies outside the grid")]
    MovableOutOfBounds {
        /// Column of the rejected start cell.
        column: u32,
        /// Row of the rejected start cell.
        row: u32,
    },
    /// Two movables share a start cell.
    #[error("more than one movable starts at ({column}, {row})")]
    DuplicateMovableStart {
        /// Column of the shared start cell.
        column: u32,
        /// Row of the shared start cell.
        row: u32,
    },
    /// Walls would fill every cell not taken by a movable.
    #[error("{requested} walls requested but only {available} cells are free")]
    TooManyWalls {
        /// Configured wall count.
        requested: u32,
        /// Cells left after placing movables.
        available: usize,
    },
}
