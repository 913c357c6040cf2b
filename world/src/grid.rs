//! Tile grid with turret occupancy.

use glam::Vec2;
use waypoint_defence_core::{CellCoord, CellKind, EntityHandle, MapSpec, PlacementError};

#[derive(Debug)]
pub(crate) struct GridMap {
    columns: u32,
    rows: u32,
    tile_size: f32,
    origin: Vec2,
    cells: Vec<CellKind>,
    occupants: Vec<Option<EntityHandle>>,
}

impl GridMap {
    pub(crate) fn new(map: &MapSpec) -> Self {
        let capacity_u64 = u64::from(map.columns) * u64::from(map.rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = map.cells.clone();
        cells.resize(capacity, CellKind::Empty);
        Self {
            columns: map.columns,
            rows: map.rows,
            tile_size: map.tile_size,
            origin: map.origin,
            cells,
            occupants: vec![None; capacity],
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Classification of the cell, reporting `Occupied` while a turret stands on it.
    pub(crate) fn cell_kind(&self, cell: CellCoord) -> Option<CellKind> {
        let index = self.index(cell)?;
        if self.occupants.get(index).copied().flatten().is_some() {
            return Some(CellKind::Occupied);
        }
        self.cells.get(index).copied()
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<EntityHandle> {
        self.index(cell)
            .and_then(|index| self.occupants.get(index).copied().flatten())
    }

    pub(crate) fn check_placement(&self, cell: CellCoord) -> Result<(), PlacementError> {
        match self.cell_kind(cell) {
            None => Err(PlacementError::OutOfBounds),
            Some(CellKind::Buildable) => Ok(()),
            Some(CellKind::Occupied) => Err(PlacementError::Occupied),
            Some(_) => Err(PlacementError::NotBuildable),
        }
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, turret: EntityHandle) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupants.get_mut(index) {
                *slot = Some(turret);
            }
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<EntityHandle> {
        let index = self.index(cell)?;
        self.occupants.get_mut(index).and_then(Option::take)
    }

    pub(crate) fn world_center_of(&self, cell: CellCoord) -> Option<Vec2> {
        if !self.contains(cell) {
            return None;
        }
        let offset = Vec2::new(cell.column() as f32 + 0.5, cell.row() as f32 + 0.5);
        Some(self.origin + offset * self.tile_size)
    }

    pub(crate) fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = (position - self.origin) / self.tile_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = CellCoord::new(local.x.floor() as u32, local.y.floor() as u32);
        self.contains(cell).then_some(cell)
    }
}
