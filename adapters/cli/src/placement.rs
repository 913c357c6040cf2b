//! Parsing of `KIND@COLUMN,ROW` placement requests.

use std::str::FromStr;

use thiserror::Error;
use waypoint_defence_core::{CellCoord, TurretKind};

/// Turret the player wants built before the waves start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementRequest {
    /// Kind of turret to build.
    pub kind: TurretKind,
    /// Cell to build on.
    pub cell: CellCoord,
}

/// Reasons a placement request string is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlacementRequestError {
    /// The `@` separator is missing.
    #[error("expected KIND@COLUMN,ROW, got `{0}`")]
    MissingSeparator(String),
    /// The turret kind is not known.
    #[error("unknown turret kind `{0}`, expected shooter, area_damage or slowness")]
    UnknownKind(String),
    /// The cell coordinates could not be parsed.
    #[error("invalid cell `{0}`, expected COLUMN,ROW")]
    InvalidCell(String),
}

impl FromStr for PlacementRequest {
    type Err = PlacementRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, cell) = value
            .split_once('@')
            .ok_or_else(|| PlacementRequestError::MissingSeparator(value.to_owned()))?;
        let kind = kind.trim();
        let kind = TurretKind::ALL
            .into_iter()
            .find(|candidate| candidate.name() == kind)
            .ok_or_else(|| PlacementRequestError::UnknownKind(kind.to_owned()))?;

        let invalid = || PlacementRequestError::InvalidCell(cell.to_owned());
        let (column, row) = cell.split_once(',').ok_or_else(invalid)?;
        let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
        let row = row.trim().parse::<u32>().map_err(|_| invalid())?;

        Ok(Self {
            kind,
            cell: CellCoord::new(column, row),
        })
    }
}
