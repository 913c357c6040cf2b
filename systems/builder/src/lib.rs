#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system that turns clicked cells into placement, upgrade and
//! sell commands.

use log::{debug, warn};
use waypoint_defence_core::{CellCoord, CellKind, Command, Event, PlayerAction, TurretKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Cell the player clicked on this frame, if any.
    pub clicked_cell: Option<CellCoord>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(clicked_cell: Option<CellCoord>) -> Self {
        Self { clicked_cell }
    }
}

/// Builder system that tracks the player's selection and reacts to clicks.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    action: PlayerAction,
    turret_kind: Option<TurretKind>,
}

impl Builder {
    /// Creates a new builder system with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            action: PlayerAction::None,
            turret_kind: None,
        }
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// The `cell_kind` closure should mirror the semantics of the world's
    /// `query::cell_kind` helper, returning `None` outside the map.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut cell_kind: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<CellKind>,
    {
        for event in events {
            if let Event::SelectionChanged {
                action,
                turret_kind,
            } = event
            {
                self.action = *action;
                self.turret_kind = *turret_kind;
            }
        }

        let Some(cell) = input.clicked_cell else {
            return;
        };
        let Some(kind) = cell_kind(cell) else {
            warn!("clicked outside the map at {cell:?}, ignoring");
            return;
        };

        match (self.action, kind) {
            (PlayerAction::PlaceTurret, CellKind::Buildable) => match self.turret_kind {
                Some(turret) => out.push(Command::PlaceTurret { kind: turret, cell }),
                None => debug!("no turret kind selected for placement"),
            },
            (PlayerAction::UpgradeTurret, CellKind::Occupied) => {
                out.push(Command::UpgradeTurret { cell });
            }
            (PlayerAction::SellTurret, CellKind::Occupied) => {
                out.push(Command::RemoveTurret { cell });
            }
            (action, kind) => debug!("click with {action:?} on {kind:?} cell {cell:?} ignored"),
        }
    }
}
