//! Planning and playback state of a movable occupant.

use grid_sim_core::{CellCoord, Direction, EntityColor, EntityId, PixelPosition};
use tracing::warn;

use crate::grid::{EntityTemplate, Grid};

/// Plannable occupant that replays a validated route one cell at a time.
///
/// The occupant itself lives in the [`Grid`]; this record keeps the selection
/// flag, the planning cursor, the planned cells and the playback index. The
/// grid stays the only source of truth for the occupant's actual cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movable {
    entity: EntityId,
    start: CellCoord,
    selected: bool,
    cursor: CellCoord,
    planned: Vec<CellCoord>,
    playback_index: usize,
}

impl Movable {
    /// Adds a blocking movable occupant to the grid at `start`.
    ///
    /// Returns `None` when `start` lies outside the grid.
    pub fn spawn(grid: &mut Grid, color: EntityColor, start: CellCoord) -> Option<Self> {
        let entity = grid.add_entity(EntityTemplate::movable(color, start))?;
        Some(Self {
            entity,
            start,
            selected: false,
            cursor: start,
            planned: Vec::new(),
            playback_index: 0,
        })
    }

    /// Identifier of the occupant in the grid.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Cell the movable returns to on reset.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Whether the movable accepts directional planning input.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Cell the next planned step extends from.
    #[must_use]
    pub const fn cursor(&self) -> CellCoord {
        self.cursor
    }

    /// Planned cells in visiting order.
    #[must_use]
    pub fn planned_cells(&self) -> &[CellCoord] {
        &self.planned
    }

    /// Number of planned cells already visited during playback.
    #[must_use]
    pub const fn playback_index(&self) -> usize {
        self.playback_index
    }

    /// Actual cell of the occupant as recorded by the grid.
    #[must_use]
    pub fn position(&self, grid: &Grid) -> CellCoord {
        grid.position(self.entity).unwrap_or(self.start)
    }

    /// Extends the plan by one cell from the cursor.
    ///
    /// Fails without mutation when the target lies outside the grid or is
    /// blocked by another entity right now. Cells planned by other movables
    /// are not considered. The movable's own current cell never blocks it.
    pub fn plan_step(&mut self, grid: &Grid, direction: Direction) -> bool {
        let Some(next) = self.cursor.step(direction, grid.size()) else {
            return false;
        };
        if grid.is_blocked_for(next, self.entity) {
            return false;
        }

        self.planned.push(next);
        self.cursor = next;
        true
    }

    /// Removes the most recently planned cell.
    ///
    /// The cursor falls back to the new last cell, or to the actual position
    /// once the plan is empty. Fails when there is nothing to undo.
    pub fn undo_last_step(&mut self, grid: &Grid) -> bool {
        if self.planned.pop().is_none() {
            return false;
        }

        self.cursor = match self.planned.last() {
            Some(cell) => *cell,
            None => self.position(grid),
        };
        if self.playback_index > self.planned.len() {
            self.playback_index = self.planned.len();
        }
        true
    }

    /// Empties the plan and rewinds the cursor and playback.
    pub fn clear_plan(&mut self, grid: &Grid) {
        self.planned.clear();
        self.cursor = self.position(grid);
        self.playback_index = 0;
    }

    /// Selects the movable iff the click lands on its actual cell.
    ///
    /// Returns the resulting selection flag.
    pub fn handle_click(&mut self, grid: &Grid, pixel: PixelPosition, cell_size: u32) -> bool {
        let clicked = CellCoord::from_pixel(pixel, cell_size);
        self.selected = clicked == Some(self.position(grid));
        self.selected
    }

    /// Rewinds playback to the first planned cell without touching the plan.
    pub fn start_movement(&mut self) {
        self.playback_index = 0;
    }

    /// Moves the occupant onto the next planned cell.
    ///
    /// Returns `false` without advancing when playback is done, the next cell
    /// is blocked by another entity, or the grid refuses the relocation.
    pub fn advance_one_step(&mut self, grid: &mut Grid) -> bool {
        let Some(next) = self.planned.get(self.playback_index).copied() else {
            return false;
        };
        if grid.is_blocked_for(next, self.entity) {
            return false;
        }
        if !grid.move_entity(self.entity, next, false) {
            return false;
        }

        self.playback_index += 1;
        true
    }

    /// Whether every planned cell has been visited.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.playback_index == self.planned.len()
    }

    /// Forces the occupant back to its start cell and forgets all plan state.
    pub fn reset_to_start(&mut self, grid: &mut Grid) {
        if !grid.move_entity(self.entity, self.start, true) {
            warn!(
                entity = self.entity.get(),
                start = ?self.start,
                "movable could not be returned to its start cell"
            );
        }
        self.selected = false;
        self.planned.clear();
        self.cursor = self.start;
        self.playback_index = 0;
    }
}
