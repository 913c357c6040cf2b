#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation collaborators to react to. Systems consume event streams,
//! query immutable views such as [`EnemyView`] and [`TurretView`], and respond
//! exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{
    ConfigError, EnemySpec, Level, LevelConfig, LevelStats, MapSpec, ProjectileSpec, TurretSpec,
    WaveSpec, ZoneEffect, ZoneSpec,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the first wave is scheduled.
    StartWaves,
    /// Reports that the wave scheduler ran out of configured waves.
    WavesExhausted,
    /// Requests that an enemy of the given kind enters the path.
    SpawnEnemy {
        /// Prototype describing the enemy kind to spawn.
        kind: PrototypeId,
    },
    /// Records the target a turret is currently tracking.
    AcquireTarget {
        /// Turret that evaluated its surroundings.
        turret: EntityHandle,
        /// Enemy selected by targeting, if any.
        target: Option<EntityHandle>,
    },
    /// Requests that a turret starts an attack against the provided enemy.
    FireTurret {
        /// Turret whose cooldown elapsed.
        turret: EntityHandle,
        /// Enemy chosen as the attack target.
        target: EntityHandle,
    },
    /// Signals that a turret's attack animation reached its release frame.
    AttackAnimationReady {
        /// Turret whose animation completed.
        turret: EntityHandle,
    },
    /// Requests placement of a turret on the provided cell.
    PlaceTurret {
        /// Type of turret to construct.
        kind: TurretKind,
        /// Grid cell that should host the turret.
        cell: CellCoord,
    },
    /// Requests that the turret on the provided cell is sold.
    RemoveTurret {
        /// Grid cell hosting the turret.
        cell: CellCoord,
    },
    /// Requests that the turret on the provided cell is upgraded.
    UpgradeTurret {
        /// Grid cell hosting the turret.
        cell: CellCoord,
    },
    /// Changes the tool the player currently has selected.
    SetSelectedAction {
        /// Action applied to subsequent cell clicks.
        action: PlayerAction,
    },
    /// Changes the turret kind used by placement clicks.
    SetSelectedTurretKind {
        /// Turret kind to place, or `None` to clear the selection.
        kind: Option<TurretKind>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that wave scheduling began.
    WavesStarted,
    /// Announces that every configured wave has been spawned.
    WavesCompleted,
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Handle allocated to the enemy by the pool.
        enemy: EntityHandle,
        /// Prototype the enemy was configured from.
        kind: PrototypeId,
        /// World position of the first waypoint.
        position: Vec2,
    },
    /// Reports that an enemy could not be configured and was reclaimed.
    EnemySpawnRejected {
        /// Prototype that failed to configure.
        kind: PrototypeId,
    },
    /// Notifies renderers that an enemy changed heading.
    EnemyDirectionChanged {
        /// Enemy whose heading changed.
        enemy: EntityHandle,
        /// Normalised heading along the current path segment.
        direction: Vec2,
    },
    /// Notifies presentation layers that an enemy's health changed.
    EnemyHealthChanged {
        /// Enemy whose health changed.
        enemy: EntityHandle,
        /// Health after the change.
        health: f32,
    },
    /// Reports that an invisible enemy became targetable.
    EnemyRevealed {
        /// Enemy that was revealed.
        enemy: EntityHandle,
    },
    /// Confirms that an enemy's health was depleted.
    EnemyDied {
        /// Enemy that died.
        enemy: EntityHandle,
        /// Gold credited to the player.
        gold_value: u32,
    },
    /// Confirms that an enemy reached the end of its path.
    EnemyReachedEnd {
        /// Enemy that leaked through the defences.
        enemy: EntityHandle,
        /// Damage dealt to the player.
        player_damage: u32,
    },
    /// Confirms that a turret was placed.
    TurretPlaced {
        /// Handle allocated to the turret.
        turret: EntityHandle,
        /// Type of turret that was placed.
        kind: TurretKind,
        /// Cell now occupied by the turret.
        cell: CellCoord,
    },
    /// Reports that a placement request was rejected.
    TurretPlacementRejected {
        /// Type of turret requested.
        kind: TurretKind,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a turret was sold and reclaimed.
    TurretRemoved {
        /// Handle of the turret that was removed.
        turret: EntityHandle,
        /// Cell previously occupied by the turret.
        cell: CellCoord,
        /// Gold credited for the sale.
        refund: u32,
    },
    /// Reports that a removal request was rejected.
    TurretRemovalRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Confirms that a turret advanced a level.
    TurretUpgraded {
        /// Turret that was upgraded.
        turret: EntityHandle,
        /// Cell occupied by the turret.
        cell: CellCoord,
        /// Level reached after the upgrade.
        level: u32,
    },
    /// Reports that an upgrade request was rejected.
    TurretUpgradeRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Notifies renderers that a turret's visual variant changed.
    TurretVisualChanged {
        /// Turret whose visuals changed.
        turret: EntityHandle,
        /// Key of the visual variant to display.
        visual_key: String,
    },
    /// Notifies renderers that a turret turned toward a new heading.
    TurretDirectionChanged {
        /// Turret that turned.
        turret: EntityHandle,
        /// Normalised heading toward the tracked target.
        direction: Vec2,
    },
    /// Reports that a turret started an attack animation.
    TurretAttackTriggered {
        /// Turret that started attacking.
        turret: EntityHandle,
        /// Enemy the attack was aimed at.
        target: EntityHandle,
    },
    /// Reports that a fire request was ignored.
    TurretFireRejected {
        /// Turret named in the request.
        turret: EntityHandle,
        /// Specific reason the request was ignored.
        reason: FireRejection,
    },
    /// Confirms that a projectile left a turret.
    ProjectileLaunched {
        /// Handle allocated to the projectile.
        projectile: EntityHandle,
        /// Turret that fired the projectile.
        turret: EntityHandle,
        /// Behaviour variant of the projectile.
        kind: ProjectileKind,
    },
    /// Reports that a projectile reached its impact point.
    ProjectileImpacted {
        /// Projectile that impacted.
        projectile: EntityHandle,
        /// World position of the impact.
        position: Vec2,
    },
    /// Confirms that a projectile finished and was reclaimed.
    ProjectileResolved {
        /// Projectile that was reclaimed.
        projectile: EntityHandle,
    },
    /// Reports the player's gold after a change.
    GoldChanged {
        /// Gold available after the change.
        gold: u32,
    },
    /// Reports the player's health after a change.
    PlayerHealthChanged {
        /// Health remaining after the change.
        health: u32,
    },
    /// Reports a change to the player's selected tool.
    SelectionChanged {
        /// Action applied to cell clicks.
        action: PlayerAction,
        /// Turret kind used by placement clicks.
        turret_kind: Option<TurretKind>,
    },
    /// Announces that the game reached a terminal phase.
    GameEnded {
        /// Terminal phase that was entered.
        phase: GamePhase,
    },
}

/// Opaque identity of a pooled instance.
///
/// The generation increments every time a slot is handed out again, so a
/// handle retained past a despawn never aliases the slot's next occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Number of times the slot has been reused.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Key identifying a spawn template.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PrototypeId(u32);

impl PrototypeId {
    /// Creates a new prototype identifier with the provided numeric value.
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

/// Location of a single grid cell expressed as column and row coordinates.
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
}

/// Classification of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Cell outside the playable area.
    Empty,
    /// Free ground that accepts turrets.
    Buildable,
    /// Ground the enemies walk on.
    Path,
    /// Decoration that blocks construction.
    Obstacle,
    /// Buildable ground currently hosting a turret.
    Occupied,
}

/// Types of turrets that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretKind {
    /// Fires homing single-target projectiles.
    Shooter,
    /// Lobs projectiles that damage everything around the impact point.
    AreaDamage,
    /// Lobs projectiles that leave a lingering slowing field.
    Slowness,
}

impl TurretKind {
    /// Every turret kind in declaration order.
    pub const ALL: [TurretKind; 3] = [Self::Shooter, Self::AreaDamage, Self::Slowness];

    /// Name used for the kind in level files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shooter => "shooter",
            Self::AreaDamage => "area_damage",
            Self::Slowness => "slowness",
        }
    }

    /// Prototype under which instances of this kind are pooled.
    #[must_use]
    pub const fn prototype(self) -> PrototypeId {
        match self {
            Self::Shooter => PrototypeId::new(0),
            Self::AreaDamage => PrototypeId::new(1),
            Self::Slowness => PrototypeId::new(2),
        }
    }
}

/// Behaviour variants available to projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Homes on a single target.
    Direct,
    /// Flies to a fixed point and damages everything in a radius.
    Area,
    /// Flies to a fixed point and leaves a slowing field.
    AreaStatus,
}

impl ProjectileKind {
    /// Prototype under which projectiles of this kind are pooled.
    #[must_use]
    pub const fn prototype(self) -> PrototypeId {
        match self {
            Self::Direct => PrototypeId::new(0),
            Self::Area => PrototypeId::new(1),
            Self::AreaStatus => PrototypeId::new(2),
        }
    }
}

/// Tool currently selected by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Clicks are ignored.
    #[default]
    None,
    /// Clicks on buildable cells place the selected turret kind.
    PlaceTurret,
    /// Clicks on turrets upgrade them.
    UpgradeTurret,
    /// Clicks on turrets sell them.
    SellTurret,
}

/// Overall state of a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// The level is running.
    #[default]
    Playing,
    /// Every wave was cleared.
    Won,
    /// The player's health was depleted.
    Lost,
}

/// Phase of a turret's attack cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurretPhase {
    /// No target in range.
    #[default]
    Idle,
    /// Tracking a target while the cooldown runs.
    Acquiring,
    /// Attack triggered, waiting for the release callback.
    Attacking,
}

/// Reasons a turret placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The level already ended.
    GameOver,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell does not accept turrets.
    NotBuildable,
    /// The requested cell already hosts a turret.
    Occupied,
    /// The level does not configure the requested turret kind.
    UnknownKind,
    /// The player cannot afford the turret.
    InsufficientFunds,
}

/// Reasons a turret removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// No turret occupies the requested cell.
    MissingTurret,
}

/// Reasons a turret upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The level already ended.
    GameOver,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// No turret occupies the requested cell.
    MissingTurret,
    /// The turret already reached its final level.
    MaxLevel,
    /// The player cannot afford the upgrade.
    InsufficientFunds,
}

/// Reasons a fire request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireRejection {
    /// The turret is not spawned.
    MissingTurret,
    /// The turret is still cooling down or mid-attack.
    NotReady,
    /// The target is gone or no longer targetable.
    TargetUnavailable,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub handle: EntityHandle,
    /// Prototype the enemy was configured from.
    pub kind: PrototypeId,
    /// Current world position.
    pub position: Vec2,
    /// Fraction of the path travelled, in `[0, 1]`.
    pub progress: f32,
    /// Current health.
    pub health: f32,
    /// Forward-looking health after in-flight attacks land.
    pub predicted_health: f32,
    /// Whether turrets may select this enemy.
    pub targetable: bool,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.handle);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single turret used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Handle of the turret.
    pub handle: EntityHandle,
    /// Kind of turret.
    pub kind: TurretKind,
    /// Cell the turret occupies.
    pub cell: CellCoord,
    /// World position of the cell centre.
    pub position: Vec2,
    /// Current level, starting at 1.
    pub level: u32,
    /// Damage dealt per attack at the current level.
    pub damage: f32,
    /// Targeting radius at the current level.
    pub range: f32,
    /// Phase of the attack cycle.
    pub phase: TurretPhase,
    /// Whether the cooldown elapsed and no attack is pending.
    pub ready: bool,
    /// Target tracked during the previous pass.
    pub target: Option<EntityHandle>,
}

/// Read-only snapshot describing all placed turrets.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.handle);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Number of turrets in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no turret is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_order_by_index_then_generation() {
        let mut handles = vec![
            EntityHandle::new(2, 0),
            EntityHandle::new(1, 3),
            EntityHandle::new(1, 1),
        ];
        handles.sort();
        assert_eq!(
            handles,
            vec![
                EntityHandle::new(1, 1),
                EntityHandle::new(1, 3),
                EntityHandle::new(2, 0),
            ]
        );
    }

    #[test]
    fn turret_kinds_map_to_distinct_prototypes() {
        let mut prototypes: Vec<_> = TurretKind::ALL.iter().map(|kind| kind.prototype()).collect();
        prototypes.dedup();
        assert_eq!(prototypes.len(), TurretKind::ALL.len());
    }

    #[test]
    fn enemy_view_sorts_snapshots_by_handle() {
        let snapshot = |index| EnemySnapshot {
            handle: EntityHandle::new(index, 0),
            kind: PrototypeId::new(0),
            position: Vec2::ZERO,
            progress: 0.0,
            health: 1.0,
            predicted_health: 1.0,
            targetable: true,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(3)]);
        let order: Vec<u32> = view.iter().map(|s| s.handle.index()).collect();
        assert_eq!(order, vec![1, 3, 4]);
    }
}
