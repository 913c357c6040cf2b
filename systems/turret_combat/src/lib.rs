#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns turret and enemy snapshots into combat commands.

use std::collections::BTreeMap;

use log::trace;
use waypoint_defence_core::{Command, EnemyView, EntityHandle, GamePhase, TurretView};
use waypoint_defence_system_targeting::{find_target, Targeting};

/// Turret combat system that queues target and firing commands.
#[derive(Debug, Default)]
pub struct TurretCombat {
    targeting: Targeting,
    ledger: BTreeMap<EntityHandle, f32>,
    scratch: Vec<Command>,
}

impl TurretCombat {
    /// Creates a new turret combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AcquireTarget` when a turret's best target changed and
    /// `Command::FireTurret` for every ready turret holding a target.
    ///
    /// Damage fired earlier in the same pass counts against the target's
    /// predicted health, so later turrets skip enemies already doomed.
    pub fn handle(
        &mut self,
        phase: GamePhase,
        enemies: &EnemyView,
        turrets: &TurretView,
        out: &mut Vec<Command>,
    ) {
        if phase != GamePhase::Playing {
            return;
        }

        self.targeting.prepare(enemies);
        self.ledger.clear();
        for candidate in self.targeting.candidates() {
            let _ = self
                .ledger
                .insert(candidate.handle, candidate.predicted_health);
        }

        self.scratch.clear();
        for turret in turrets.iter() {
            let ledger = &self.ledger;
            let target = find_target(
                turret.position,
                turret.range,
                self.targeting
                    .candidates()
                    .iter()
                    .filter(|candidate| ledger.get(&candidate.handle).is_some_and(|h| *h > 0.0)),
            );

            if target != turret.target {
                self.scratch.push(Command::AcquireTarget {
                    turret: turret.handle,
                    target,
                });
            }

            let Some(target) = target else {
                continue;
            };
            if !turret.ready {
                continue;
            }

            trace!("turret {:?} fires at {target:?}", turret.handle);
            self.scratch.push(Command::FireTurret {
                turret: turret.handle,
                target,
            });
            if let Some(predicted) = self.ledger.get_mut(&target) {
                *predicted -= turret.damage;
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use waypoint_defence_core::{
        CellCoord, EnemySnapshot, PrototypeId, TurretKind, TurretPhase, TurretSnapshot,
    };

    fn enemy(index: u32, x: f32, progress: f32, predicted_health: f32) -> EnemySnapshot {
        EnemySnapshot {
            handle: EntityHandle::new(index, 0),
            kind: PrototypeId::new(0),
            position: Vec2::new(x, 0.0),
            progress,
            health: predicted_health,
            predicted_health,
            targetable: true,
        }
    }

    fn turret(index: u32, damage: f32, ready: bool, target: Option<u32>) -> TurretSnapshot {
        TurretSnapshot {
            handle: EntityHandle::new(index, 0),
            kind: TurretKind::Shooter,
            cell: CellCoord::new(0, 1),
            position: Vec2::new(0.0, 1.0),
            level: 1,
            damage,
            range: 5.0,
            phase: TurretPhase::Idle,
            ready,
            target: target.map(|index| EntityHandle::new(index, 0)),
        }
    }

    #[test]
    fn finished_game_is_silent() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 1.0, 0.5, 10.0)]);
        let turrets = TurretView::from_snapshots(vec![turret(1, 5.0, true, None)]);
        let mut out = Vec::new();

        system.handle(GamePhase::Lost, &enemies, &turrets, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn unchanged_target_is_not_reacquired() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 1.0, 0.5, 10.0)]);
        let turrets = TurretView::from_snapshots(vec![turret(4, 5.0, false, Some(1))]);
        let mut out = Vec::new();

        system.handle(GamePhase::Playing, &enemies, &turrets, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn ledger_spreads_fire_across_enemies() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, 1.0, 0.2, 10.0),
            enemy(2, 2.0, 0.6, 10.0),
        ]);
        let turrets = TurretView::from_snapshots(vec![
            turret(7, 10.0, true, Some(2)),
            turret(8, 10.0, true, None),
        ]);
        let mut out = Vec::new();

        system.handle(GamePhase::Playing, &enemies, &turrets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTurret {
                    turret: EntityHandle::new(7, 0),
                    target: EntityHandle::new(2, 0),
                },
                Command::AcquireTarget {
                    turret: EntityHandle::new(8, 0),
                    target: Some(EntityHandle::new(1, 0)),
                },
                Command::FireTurret {
                    turret: EntityHandle::new(8, 0),
                    target: EntityHandle::new(1, 0),
                },
            ],
        );
    }

    #[test]
    fn lost_target_is_cleared() {
        let mut system = TurretCombat::new();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 40.0, 0.9, 10.0)]);
        let turrets = TurretView::from_snapshots(vec![turret(2, 5.0, true, Some(1))]);
        let mut out = Vec::new();

        system.handle(GamePhase::Playing, &enemies, &turrets, &mut out);

        assert_eq!(
            out,
            vec![Command::AcquireTarget {
                turret: EntityHandle::new(2, 0),
                target: None,
            }],
        );
    }
}
