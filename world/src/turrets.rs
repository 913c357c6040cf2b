//! Turret state stored inside the turret pool.

use std::time::Duration;

use glam::Vec2;
use waypoint_defence_core::{
    CellCoord, EntityHandle, LevelStats, TurretKind, TurretPhase, TurretSnapshot, TurretSpec,
};

/// Attack triggered but not yet released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingAttack {
    pub(crate) target: EntityHandle,
    pub(crate) damage: f32,
    pub(crate) windup_left: Duration,
}

#[derive(Debug)]
pub(crate) struct Turret {
    pub(crate) kind: TurretKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) level: u32,
    pub(crate) max_level: u32,
    pub(crate) stats: LevelStats,
    pub(crate) cooldown: Duration,
    pub(crate) phase: TurretPhase,
    pub(crate) target: Option<EntityHandle>,
    pub(crate) pending: Option<PendingAttack>,
    pub(crate) heading: Option<Vec2>,
}

impl Default for Turret {
    fn default() -> Self {
        Self {
            kind: TurretKind::Shooter,
            cell: CellCoord::new(0, 0),
            position: Vec2::ZERO,
            level: 0,
            max_level: 0,
            stats: LevelStats {
                damage: 0.0,
                range: 0.0,
                attack_interval: Duration::ZERO,
                upgrade_cost: 0,
                sell_value: 0,
                visual_key: String::new(),
            },
            cooldown: Duration::ZERO,
            phase: TurretPhase::Idle,
            target: None,
            pending: None,
            heading: None,
        }
    }
}

impl Turret {
    /// Configures a freshly spawned turret at level 1.
    pub(crate) fn configure(&mut self, spec: &TurretSpec, cell: CellCoord, position: Vec2) -> bool {
        let Some(stats) = spec.level(1) else {
            return false;
        };
        *self = Self {
            kind: spec.kind,
            cell,
            position,
            level: 1,
            max_level: spec.max_level,
            stats: stats.clone(),
            ..Self::default()
        };
        true
    }

    /// Advances one level and applies its stat block. Returns `false` at the
    /// final level.
    pub(crate) fn upgrade(&mut self, spec: &TurretSpec) -> bool {
        if self.level >= self.max_level {
            return false;
        }
        let Some(stats) = spec.level(self.level + 1) else {
            return false;
        };
        self.level += 1;
        self.stats = stats.clone();
        true
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.phase != TurretPhase::Attacking && self.cooldown >= self.stats.attack_interval
    }

    /// Turns toward the target, returning the heading when it changed.
    pub(crate) fn face(&mut self, target: Vec2) -> Option<Vec2> {
        let direction = (target - self.position).try_normalize()?;
        if self
            .heading
            .is_some_and(|heading| heading.abs_diff_eq(direction, 1e-4))
        {
            return None;
        }
        self.heading = Some(direction);
        Some(direction)
    }

    /// Advances the cooldown and wind-up timers. Returns the attack to
    /// release once its wind-up elapsed.
    pub(crate) fn tick(&mut self, dt: Duration) -> Option<PendingAttack> {
        self.cooldown = self.cooldown.saturating_add(dt);
        let pending = self.pending.as_mut()?;
        if pending.windup_left.is_zero() {
            return None;
        }
        pending.windup_left = pending.windup_left.saturating_sub(dt);
        if pending.windup_left.is_zero() {
            return self.take_pending();
        }
        None
    }

    /// Clears the pending attack and restarts the cooldown.
    pub(crate) fn take_pending(&mut self) -> Option<PendingAttack> {
        let pending = self.pending.take()?;
        self.cooldown = Duration::ZERO;
        self.phase = if self.target.is_some() {
            TurretPhase::Acquiring
        } else {
            TurretPhase::Idle
        };
        Some(pending)
    }

    pub(crate) fn snapshot(&self, handle: EntityHandle) -> TurretSnapshot {
        TurretSnapshot {
            handle,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            level: self.level,
            damage: self.stats.damage,
            range: self.stats.range,
            phase: self.phase,
            ready: self.is_ready(),
            target: self.target,
        }
    }
}
