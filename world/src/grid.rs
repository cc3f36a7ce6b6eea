//! Sparse cell occupancy and atomic entity relocation.

use std::collections::HashMap;

use grid_sim_core::{CellCoord, EntityColor, EntityId, GridSize};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

/// Capability tag distinguishing static obstacles from plannable occupants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Static obstacle that never relocates.
    Wall,
    /// Occupant driven by a [`Movable`](crate::Movable) plan.
    Movable,
}

/// Description of an entity before the grid assigns it an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityTemplate {
    /// Capability tag of the entity.
    pub kind: EntityKind,
    /// Visual identity of the entity.
    pub color: EntityColor,
    /// Cell the entity occupies when added.
    pub cell: CellCoord,
    /// Whether the entity excludes other blocking entities from its cell.
    pub blocking: bool,
}

impl EntityTemplate {
    /// Gray blocking wall at the provided cell.
    #[must_use]
    pub const fn wall(cell: CellCoord) -> Self {
        Self {
            kind: EntityKind::Wall,
            color: EntityColor::WALL,
            cell,
            blocking: true,
        }
    }

    /// Blocking movable occupant at the provided cell.
    #[must_use]
    pub const fn movable(color: EntityColor, cell: CellCoord) -> Self {
        Self {
            kind: EntityKind::Movable,
            color,
            cell,
            blocking: true,
        }
    }
}

/// Occupant of a single grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    color: EntityColor,
    cell: CellCoord,
    blocking: bool,
}

impl Entity {
    /// Identifier assigned by the grid.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Capability tag of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Visual identity of the entity.
    #[must_use]
    pub const fn color(&self) -> EntityColor {
        self.color
    }

    /// Cell the entity currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the entity excludes other blocking entities from its cell.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.blocking
    }
}

/// Fixed-size grid mapping occupied cells to the entity stored there.
///
/// Entities live in an arena indexed by [`EntityId`]; the cell map holds a key
/// only while an entity occupies that cell. [`Grid::move_entity`] is the only
/// operation that changes an entity's cell, and it updates the arena and the
/// cell map together.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    entities: Vec<Entity>,
    cells: HashMap<CellCoord, EntityId>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            entities: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Inserts an entity at its template cell and returns its identifier.
    ///
    /// An existing occupant of the cell is displaced from the cell map; avoiding
    /// such collisions during setup is the caller's responsibility. Returns
    /// `None` without mutation when the cell lies outside the grid.
    pub fn add_entity(&mut self, template: EntityTemplate) -> Option<EntityId> {
        if !self.size.contains(template.cell) {
            return None;
        }

        let id = EntityId::new(u32::try_from(self.entities.len()).ok()?);
        self.entities.push(Entity {
            id,
            kind: template.kind,
            color: template.color,
            cell: template.cell,
            blocking: template.blocking,
        });
        if let Some(displaced) = self.cells.insert(template.cell, id) {
            debug!(
                cell = ?template.cell,
                displaced = displaced.get(),
                "new entity displaced an existing occupant"
            );
        }
        Some(id)
    }

    /// Reports whether a blocking entity occupies the cell.
    ///
    /// Cells outside the grid are reported as blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        if !self.size.contains(cell) {
            return true;
        }
        self.occupant(cell).is_some_and(Entity::is_blocking)
    }

    /// Reports whether a blocking entity other than `mover` occupies the cell.
    ///
    /// Cells outside the grid are reported as blocked.
    #[must_use]
    pub fn is_blocked_for(&self, cell: CellCoord, mover: EntityId) -> bool {
        if !self.size.contains(cell) {
            return true;
        }
        self.occupant(cell)
            .is_some_and(|entity| entity.blocking && entity.id != mover)
    }

    /// Relocates an entity, keeping the cell map and its stored cell in sync.
    ///
    /// Fails without mutation when the entity is unknown, the destination lies
    /// outside the grid, or (unless `ignore_blocking` is set) a different
    /// blocking entity occupies the destination. Moving onto the entity's own
    /// cell always succeeds.
    pub fn move_entity(
        &mut self,
        id: EntityId,
        destination: CellCoord,
        ignore_blocking: bool,
    ) -> bool {
        if !self.size.contains(destination) {
            return false;
        }
        if !ignore_blocking && self.is_blocked_for(destination, id) {
            return false;
        }
        let Some(entity) = self.entity_slot_mut(id) else {
            return false;
        };

        let from = entity.cell;
        entity.cell = destination;
        if self.cells.get(&from) == Some(&id) {
            let _ = self.cells.remove(&from);
        }
        if let Some(displaced) = self.cells.insert(destination, id) {
            if displaced != id {
                debug!(
                    cell = ?destination,
                    mover = id.get(),
                    displaced = displaced.get(),
                    "forced relocation displaced an occupant"
                );
            }
        }
        true
    }

    /// Places up to `count` blocking walls on distinct unoccupied cells.
    ///
    /// Cells are drawn uniformly from the currently free cells, so the call
    /// always terminates; when fewer free cells exist than requested, every
    /// free cell receives a wall. Returns the number of walls placed.
    pub fn rand_gen_walls<R>(&mut self, count: usize, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let free: Vec<CellCoord> = self
            .size
            .cells()
            .filter(|cell| !self.cells.contains_key(cell))
            .collect();
        let target = count.min(free.len());
        if target < count {
            warn!(
                requested = count,
                available = free.len(),
                "not enough free cells for the requested walls"
            );
        }

        let mut placed = 0;
        for cell in free.choose_multiple(rng, target) {
            if self.add_entity(EntityTemplate::wall(*cell)).is_some() {
                placed += 1;
            }
        }
        debug!(requested = count, placed, "generated random walls");
        placed
    }

    /// Entity stored under the identifier, whether or not it is indexed.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        let index = usize::try_from(id.get()).ok()?;
        self.entities.get(index)
    }

    /// Cell currently occupied by the entity.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<CellCoord> {
        self.entity(id).map(Entity::cell)
    }

    /// Entity indexed under the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<&Entity> {
        self.cells.get(&cell).and_then(|id| self.entity(*id))
    }

    /// Entities currently indexed by the cell map, ordered by identifier.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|entity| self.cells.get(&entity.cell) == Some(&entity.id))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn entity_slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = usize::try_from(id.get()).ok()?;
        self.entities.get_mut(index)
    }
}
