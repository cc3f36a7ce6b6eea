#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Sim.
//!
//! The [`World`] owns the occupancy [`Grid`] and the [`Movable`] records that
//! plan and replay routes across it. Systems mutate the world through the
//! batch operations exposed here and read it through the [`query`] module.

mod grid;
mod movable;

pub use grid::{Entity, EntityKind, EntityTemplate, Grid};
pub use movable::Movable;

use grid_sim_core::{
    CellCoord, ConfigError, Direction, EntityColor, GridSize, PixelPosition, SimConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

/// Represents the authoritative Grid Sim world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    movables: Vec<Movable>,
    cell_size: u32,
}

impl World {
    /// Builds the wall demo world described by the configuration.
    ///
    /// Movables are placed first so random walls never land on a start cell.
    /// Walls are drawn from a ChaCha generator seeded with `config.seed`, or
    /// from entropy when no seed is configured.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        match config.seed {
            Some(seed) => Self::with_rng(config, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => Self::with_rng(config, &mut ChaCha8Rng::from_entropy()),
        }
    }

    /// Builds the wall demo world using the provided random source.
    pub fn with_rng<R>(config: &SimConfig, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;

        let mut world = Self::empty(config.grid_size(), config.cell_size);
        for movable in &config.movables {
            if world.add_movable(movable.color, movable.start()).is_none() {
                warn!(start = ?movable.start(), "skipping movable outside the grid");
            }
        }

        let wall_count = usize::try_from(config.wall_count).unwrap_or(usize::MAX);
        let placed = world.grid.rand_gen_walls(wall_count, rng);
        info!(
            columns = config.columns,
            rows = config.rows,
            movables = world.movables.len(),
            walls = placed,
            "world ready"
        );
        Ok(world)
    }

    /// Creates a world with no occupants.
    #[must_use]
    pub fn empty(size: GridSize, cell_size: u32) -> Self {
        Self {
            grid: Grid::new(size),
            movables: Vec::new(),
            cell_size,
        }
    }

    /// Adds a blocking wall, returning `false` when the cell lies outside the grid.
    pub fn add_wall(&mut self, cell: CellCoord) -> bool {
        self.grid.add_entity(EntityTemplate::wall(cell)).is_some()
    }

    /// Adds a movable starting at `start` and returns its index.
    pub fn add_movable(&mut self, color: EntityColor, start: CellCoord) -> Option<usize> {
        let movable = Movable::spawn(&mut self.grid, color, start)?;
        self.movables.push(movable);
        Some(self.movables.len() - 1)
    }

    /// Read access to the occupancy grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Movables in setup order.
    #[must_use]
    pub fn movables(&self) -> &[Movable] {
        &self.movables
    }

    /// Number of movables in the world.
    #[must_use]
    pub fn movable_count(&self) -> usize {
        self.movables.len()
    }

    /// Number of currently selected movables.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.movables.iter().filter(|m| m.is_selected()).count()
    }

    /// Index of the movable whose actual cell is `cell`.
    #[must_use]
    pub fn movable_at(&self, cell: CellCoord) -> Option<usize> {
        self.movables
            .iter()
            .position(|movable| movable.position(&self.grid) == cell)
    }

    /// Side length of a cell in window pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Forwards a pointer click to every movable; returns how many are selected.
    pub fn click(&mut self, pixel: PixelPosition) -> usize {
        let grid = &self.grid;
        let mut selected = 0;
        for movable in &mut self.movables {
            if movable.handle_click(grid, pixel, self.cell_size) {
                selected += 1;
            }
        }
        selected
    }

    /// Plans a step for every selected movable; returns how many accepted it.
    pub fn plan_selected(&mut self, direction: Direction) -> usize {
        let grid = &self.grid;
        let mut planned = 0;
        for movable in self.movables.iter_mut().filter(|m| m.is_selected()) {
            if movable.plan_step(grid, direction) {
                planned += 1;
            }
        }
        planned
    }

    /// Undoes the last step of every selected movable; returns how many changed.
    pub fn undo_selected(&mut self) -> usize {
        let grid = &self.grid;
        let mut undone = 0;
        for movable in self.movables.iter_mut().filter(|m| m.is_selected()) {
            if movable.undo_last_step(grid) {
                undone += 1;
            }
        }
        undone
    }

    /// Clears the plan of every selected movable; returns how many were cleared.
    pub fn clear_selected(&mut self) -> usize {
        let grid = &self.grid;
        let mut cleared = 0;
        for movable in self.movables.iter_mut().filter(|m| m.is_selected()) {
            movable.clear_plan(grid);
            cleared += 1;
        }
        cleared
    }

    /// Rewinds playback of every movable.
    pub fn start_movement(&mut self) {
        for movable in &mut self.movables {
            movable.start_movement();
        }
    }

    /// Advances every movable by one planned cell; returns how many moved.
    pub fn advance_all(&mut self) -> usize {
        let grid = &mut self.grid;
        let mut advanced = 0;
        for movable in &mut self.movables {
            if movable.advance_one_step(grid) {
                advanced += 1;
            }
        }
        advanced
    }

    /// Whether every movable has visited all of its planned cells.
    #[must_use]
    pub fn all_done(&self) -> bool {
        self.movables.iter().all(Movable::is_done)
    }

    /// Returns every movable to its start cell with an empty plan.
    pub fn reset_all(&mut self) {
        let grid = &mut self.grid;
        for movable in &mut self.movables {
            movable.reset_to_start(grid);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{EntityKind, World};
    use grid_sim_core::{CellCoord, EntityColor, EntityId, GridSize};

    /// Dimensions of the world's grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.grid.size()
    }

    /// Captures a read-only view of every entity indexed by the grid.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .grid
            .entities()
            .map(|entity| EntitySnapshot {
                id: entity.id(),
                kind: entity.kind(),
                color: entity.color(),
                cell: entity.cell(),
                blocking: entity.is_blocking(),
                selected: world
                    .movables
                    .iter()
                    .any(|movable| movable.entity() == entity.id() && movable.is_selected()),
            })
            .collect();
        EntityView { snapshots }
    }

    /// Captures the plan of every movable in setup order.
    #[must_use]
    pub fn plan_view(world: &World) -> Vec<PlanSnapshot> {
        world
            .movables
            .iter()
            .map(|movable| PlanSnapshot {
                entity: movable.entity(),
                color: world
                    .grid
                    .entity(movable.entity())
                    .map_or(EntityColor::WALL, |entity| entity.color()),
                position: movable.position(&world.grid),
                cursor: movable.cursor(),
                planned_cells: movable.planned_cells().to_vec(),
                playback_index: movable.playback_index(),
            })
            .collect()
    }

    /// Read-only snapshot describing every occupant of the grid.
    #[derive(Clone, Debug, Default)]
    pub struct EntityView {
        snapshots: Vec<EntitySnapshot>,
    }

    impl EntityView {
        /// Iterator over the captured snapshots ordered by identifier.
        pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EntitySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single occupant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Identifier assigned by the grid.
        pub id: EntityId,
        /// Capability tag of the occupant.
        pub kind: EntityKind,
        /// Visual identity of the occupant.
        pub color: EntityColor,
        /// Cell the occupant currently holds.
        pub cell: CellCoord,
        /// Whether the occupant blocks other blocking entities.
        pub blocking: bool,
        /// Whether the occupant is a selected movable.
        pub selected: bool,
    }

    /// Immutable representation of a movable's plan and playback progress.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlanSnapshot {
        /// Identifier of the movable's occupant.
        pub entity: EntityId,
        /// Visual identity of the movable.
        pub color: EntityColor,
        /// Actual cell of the movable.
        pub position: CellCoord,
        /// Cell the next planned step extends from.
        pub cursor: CellCoord,
        /// Planned cells in visiting order.
        pub planned_cells: Vec<CellCoord>,
        /// Number of planned cells already visited.
        pub playback_index: usize,
    }
}
