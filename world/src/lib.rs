#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waypoint Defence.
//!
//! The world owns every pooled entity, the tile grid and the player's
//! economy. It is mutated exclusively through [`apply`] and observed through
//! the [`query`] module.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use log::{debug, error, info, warn};
use waypoint_defence_core::{
    CellCoord, Command, EntityHandle, Event, FireRejection, GamePhase, Level, PlacementError,
    PrototypeId, RemovalError, TurretKind, TurretPhase, UpgradeError, ZoneEffect,
};

mod contact;
mod economy;
mod enemies;
mod grid;
pub mod health;
pub mod path;
pub mod pool;
mod projectiles;
pub mod status;
mod turrets;

use crate::{
    contact::ContactZone,
    economy::Economy,
    enemies::Enemy,
    grid::GridMap,
    path::PathEvent,
    pool::{ObjectPool, Placement},
    projectiles::{Projectile, ProjectileStep},
    turrets::{PendingAttack, Turret},
};

/// Represents the authoritative Waypoint Defence world state.
#[derive(Debug)]
pub struct World {
    level: Level,
    grid: GridMap,
    path: Vec<Vec2>,
    economy: Economy,
    enemies: ObjectPool<Enemy>,
    turrets: ObjectPool<Turret>,
    projectiles: ObjectPool<Projectile>,
    zones: Vec<ContactZone>,
    waves_started: bool,
    waves_exhausted: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world for the provided level, preloading every pool.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let grid = GridMap::new(&level.map);
        let path: Vec<Vec2> = level
            .map
            .path
            .iter()
            .filter_map(|cell| grid.world_center_of(*cell))
            .collect();

        let mut enemies = ObjectPool::new();
        for (index, spec) in level.enemies.iter().enumerate() {
            let Ok(index) = u32::try_from(index) else {
                break;
            };
            enemies.register(PrototypeId::new(index), spec.preload);
        }

        let mut turrets = ObjectPool::new();
        let mut projectile_kinds = BTreeSet::new();
        for spec in level.turrets.values() {
            turrets.register(spec.kind.prototype(), spec.preload);
            let _ = projectile_kinds.insert(spec.projectile.kind());
        }

        let mut projectiles = ObjectPool::new();
        for kind in projectile_kinds {
            projectiles.register(kind.prototype(), level.projectile_preload);
        }

        let zones = level
            .zones
            .iter()
            .filter_map(|zone| {
                grid.world_center_of(zone.cell)
                    .map(|center| ContactZone::new(center, zone.radius, zone.effect))
            })
            .collect();

        Self {
            economy: Economy::new(level.initial_gold, level.initial_health),
            grid,
            path,
            enemies,
            turrets,
            projectiles,
            zones,
            level,
            waves_started: false,
            waves_exhausted: false,
            tick_index: 0,
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.economy.is_over() {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced { dt });

        let handles = self.enemies.spawned_handles();
        for &handle in &handles {
            if let Some(enemy) = self.enemies.get_mut(handle) {
                enemy.status.tick(dt);
            }
        }

        self.move_enemies(&handles, dt, out);
        self.apply_contact_zones(out);
        self.sync_depletion(out);
        self.advance_turrets(dt, out);
        self.advance_projectiles(dt, out);
        self.check_victory(out);
    }

    fn move_enemies(&mut self, handles: &[EntityHandle], dt: Duration, out: &mut Vec<Event>) {
        let mut path_events = Vec::new();
        for &handle in handles {
            let Some(enemy) = self.enemies.get_mut(handle) else {
                continue;
            };
            if enemy.health.is_depleted() {
                continue;
            }

            path_events.clear();
            let speed = enemy.status.effective_speed();
            enemy.follower.advance(speed, dt, &mut path_events);
            let player_damage = enemy.player_damage;

            for event in &path_events {
                match *event {
                    PathEvent::DirectionChanged(direction) => {
                        out.push(Event::EnemyDirectionChanged {
                            enemy: handle,
                            direction,
                        });
                    }
                    PathEvent::ReachedEnd => {
                        debug!("enemy {handle:?} reached the end of the path");
                        out.push(Event::EnemyReachedEnd {
                            enemy: handle,
                            player_damage,
                        });
                        self.economy.take_damage(player_damage, out);
                        self.reclaim_enemy(handle);
                    }
                }
            }
        }
    }

    fn apply_contact_zones(&mut self, out: &mut Vec<Event>) {
        if self.zones.is_empty() {
            return;
        }
        let positions: Vec<(EntityHandle, Vec2)> = self
            .enemies
            .iter_spawned()
            .map(|(handle, enemy)| (handle, enemy.position()))
            .collect();

        for index in 0..self.zones.len() {
            let enemies = &self.enemies;
            self.zones[index].retain(|handle| enemies.is_spawned(handle));

            for &(handle, position) in &positions {
                if !self.zones[index].entering(handle, position) {
                    continue;
                }
                let effect = self.zones[index].effect();
                let accepted = match effect {
                    ZoneEffect::Damage(amount) => self.damage_enemy(handle, amount, out),
                    ZoneEffect::Heal(amount) => self.heal_enemy(handle, amount, out),
                };
                if accepted {
                    self.zones[index].mark(handle);
                }
            }
        }
    }

    fn sync_depletion(&mut self, out: &mut Vec<Event>) {
        for handle in self.enemies.spawned_handles() {
            let Some(enemy) = self.enemies.get_mut(handle) else {
                continue;
            };
            if !enemy.health.sync() {
                continue;
            }
            let gold_value = enemy.gold_value;
            debug!("enemy {handle:?} died");
            out.push(Event::EnemyDied {
                enemy: handle,
                gold_value,
            });
            self.economy.add_gold(gold_value, out);
            self.reclaim_enemy(handle);
        }
    }

    fn advance_turrets(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for handle in self.turrets.spawned_handles() {
            let Some(turret) = self.turrets.get_mut(handle) else {
                continue;
            };
            if let Some(attack) = turret.tick(dt) {
                self.release_attack(handle, attack, out);
            }
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for handle in self.projectiles.spawned_handles() {
            let target_position = self
                .projectiles
                .get(handle)
                .and_then(Projectile::homing_target)
                .and_then(|target| self.enemies.get(target))
                .map(Enemy::position);
            let Some(projectile) = self.projectiles.get_mut(handle) else {
                continue;
            };
            let step = projectile.advance(dt, target_position);
            let position = projectile.position;

            match step {
                ProjectileStep::Flying | ProjectileStep::Lingering => {}
                ProjectileStep::Lost => {
                    debug!("projectile {handle:?} lost its target");
                    self.resolve_projectile(handle, out);
                }
                ProjectileStep::Hit { target, damage } => {
                    out.push(Event::ProjectileImpacted {
                        projectile: handle,
                        position,
                    });
                    let _ = self.damage_enemy(target, damage, out);
                    self.resolve_projectile(handle, out);
                }
                ProjectileStep::Blast {
                    center,
                    radius,
                    damage,
                    reclaim,
                } => {
                    out.push(Event::ProjectileImpacted {
                        projectile: handle,
                        position: center,
                    });
                    for enemy in self.enemies_within(center, radius) {
                        let _ = self.damage_enemy(enemy, damage, out);
                    }
                    if reclaim {
                        self.resolve_projectile(handle, out);
                    }
                }
                ProjectileStep::Field {
                    center,
                    radius,
                    slow_factor,
                    slow_duration,
                    impacted_now,
                    reclaim,
                } => {
                    if impacted_now {
                        out.push(Event::ProjectileImpacted {
                            projectile: handle,
                            position: center,
                        });
                    }
                    for enemy in self.enemies_within(center, radius) {
                        if let Some(enemy) = self.enemies.get_mut(enemy) {
                            enemy
                                .status
                                .apply_speed_reduction(slow_factor, slow_duration);
                        }
                    }
                    if reclaim {
                        self.resolve_projectile(handle, out);
                    }
                }
                ProjectileStep::Expired => self.resolve_projectile(handle, out),
            }
        }
    }

    fn enemies_within(&self, center: Vec2, radius: f32) -> Vec<EntityHandle> {
        self.enemies
            .iter_spawned()
            .filter(|(_, enemy)| enemy.position().distance(center) <= radius)
            .map(|(handle, _)| handle)
            .collect()
    }

    fn damage_enemy(&mut self, handle: EntityHandle, amount: f32, out: &mut Vec<Event>) -> bool {
        let Some(enemy) = self.enemies.get_mut(handle) else {
            return false;
        };
        if !enemy.health.apply_damage(amount) {
            return false;
        }
        out.push(Event::EnemyHealthChanged {
            enemy: handle,
            health: enemy.health.current(),
        });
        if enemy.reveal() {
            debug!("enemy {handle:?} revealed");
            out.push(Event::EnemyRevealed { enemy: handle });
        }
        true
    }

    fn heal_enemy(&mut self, handle: EntityHandle, amount: f32, out: &mut Vec<Event>) -> bool {
        let Some(enemy) = self.enemies.get_mut(handle) else {
            return false;
        };
        if !enemy.health.apply_heal(amount) {
            return false;
        }
        out.push(Event::EnemyHealthChanged {
            enemy: handle,
            health: enemy.health.current(),
        });
        true
    }

    fn reclaim_enemy(&mut self, handle: EntityHandle) {
        if let Err(error) = self.enemies.despawn(handle) {
            debug!("failed to reclaim enemy: {error}");
        }
    }

    fn resolve_projectile(&mut self, handle: EntityHandle, out: &mut Vec<Event>) {
        match self.projectiles.despawn(handle) {
            Ok(()) => out.push(Event::ProjectileResolved { projectile: handle }),
            Err(error) => debug!("failed to reclaim projectile: {error}"),
        }
    }

    fn check_victory(&mut self, out: &mut Vec<Event>) {
        if self.waves_exhausted && self.enemies.live_count() == 0 {
            self.economy.end(GamePhase::Won, out);
        }
    }

    fn start_waves(&mut self, out: &mut Vec<Event>) {
        if self.economy.is_over() || self.waves_started {
            debug!("ignoring wave start request");
            return;
        }
        if self.path.len() < 2 {
            error!("enemy path has fewer than two waypoints, waves are disabled");
            return;
        }
        self.waves_started = true;
        info!("waves started");
        out.push(Event::WavesStarted);
    }

    fn complete_waves(&mut self, out: &mut Vec<Event>) {
        if !self.waves_exhausted {
            self.waves_exhausted = true;
            info!("all waves spawned");
            out.push(Event::WavesCompleted);
        }
        self.check_victory(out);
    }

    fn spawn_enemy(&mut self, kind: PrototypeId, out: &mut Vec<Event>) {
        if self.economy.is_over() {
            return;
        }
        let start = self.path.first().copied().unwrap_or(Vec2::ZERO);
        let handle = self.enemies.spawn(kind, Placement::at(start));
        let configured = match (self.level.enemy(kind), self.enemies.get_mut(handle)) {
            (Some(spec), Some(enemy)) => enemy.configure(kind, spec, &self.path),
            _ => false,
        };

        if !configured {
            error!("enemy prototype {kind:?} could not be configured, reclaiming {handle:?}");
            self.reclaim_enemy(handle);
            out.push(Event::EnemySpawnRejected { kind });
            return;
        }

        debug!("spawned enemy {handle:?} of {kind:?}");
        out.push(Event::EnemySpawned {
            enemy: handle,
            kind,
            position: start,
        });
    }

    fn acquire_target(&mut self, turret: EntityHandle, target: Option<EntityHandle>) {
        let Some(state) = self.turrets.get_mut(turret) else {
            debug!("ignoring target for missing turret {turret:?}");
            return;
        };
        state.target = target;
        if state.phase != TurretPhase::Attacking {
            state.phase = if target.is_some() {
                TurretPhase::Acquiring
            } else {
                TurretPhase::Idle
            };
        }
    }

    fn fire_turret(&mut self, turret: EntityHandle, target: EntityHandle, out: &mut Vec<Event>) {
        let Some(state) = self.turrets.get(turret) else {
            out.push(Event::TurretFireRejected {
                turret,
                reason: FireRejection::MissingTurret,
            });
            return;
        };
        if !state.is_ready() {
            out.push(Event::TurretFireRejected {
                turret,
                reason: FireRejection::NotReady,
            });
            return;
        }
        let damage = state.stats.damage;
        let windup = self
            .level
            .turret(state.kind)
            .map_or(Duration::ZERO, |spec| spec.windup);

        let Some(enemy) = self
            .enemies
            .get_mut(target)
            .filter(|enemy| enemy.is_targetable())
        else {
            out.push(Event::TurretFireRejected {
                turret,
                reason: FireRejection::TargetUnavailable,
            });
            return;
        };
        enemy.health.predict_damage(damage);
        let target_position = enemy.position();

        let Some(state) = self.turrets.get_mut(turret) else {
            return;
        };
        state.target = Some(target);
        state.phase = TurretPhase::Attacking;
        state.pending = Some(PendingAttack {
            target,
            damage,
            windup_left: windup,
        });
        if let Some(direction) = state.face(target_position) {
            out.push(Event::TurretDirectionChanged { turret, direction });
        }
        out.push(Event::TurretAttackTriggered { turret, target });

        let immediate = if windup.is_zero() {
            state.take_pending()
        } else {
            None
        };
        if let Some(attack) = immediate {
            self.release_attack(turret, attack, out);
        }
    }

    fn attack_ready(&mut self, turret: EntityHandle, out: &mut Vec<Event>) {
        let Some(attack) = self
            .turrets
            .get_mut(turret)
            .and_then(Turret::take_pending)
        else {
            debug!("turret {turret:?} has no pending attack");
            return;
        };
        self.release_attack(turret, attack, out);
    }

    fn release_attack(&mut self, turret: EntityHandle, attack: PendingAttack, out: &mut Vec<Event>) {
        let Some(state) = self.turrets.get(turret) else {
            return;
        };
        let origin = state.position;
        let Some(spec) = self.level.turret(state.kind).map(|spec| spec.projectile) else {
            return;
        };
        let Some(target_position) = self.enemies.get(attack.target).map(Enemy::position) else {
            debug!("turret {turret:?} lost its target before release");
            return;
        };

        let kind = spec.kind();
        let projectile = self.projectiles.spawn(kind.prototype(), Placement::at(origin));
        if let Some(state) = self.projectiles.get_mut(projectile) {
            state.launch(spec, origin, attack.target, target_position, attack.damage);
        }
        out.push(Event::ProjectileLaunched {
            projectile,
            turret,
            kind,
        });
    }

    fn place_turret(&mut self, kind: TurretKind, cell: CellCoord, out: &mut Vec<Event>) {
        if let Err(reason) = self.try_place(kind, cell, out) {
            if reason == PlacementError::OutOfBounds {
                warn!("placement requested outside the map at {cell:?}");
            } else {
                debug!("placement of {kind:?} at {cell:?} rejected: {reason:?}");
            }
            out.push(Event::TurretPlacementRejected { kind, cell, reason });
        }
    }

    fn try_place(
        &mut self,
        kind: TurretKind,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if self.economy.is_over() {
            return Err(PlacementError::GameOver);
        }
        self.grid.check_placement(cell)?;
        let spec = self.level.turret(kind).ok_or(PlacementError::UnknownKind)?;
        let position = self
            .grid
            .world_center_of(cell)
            .ok_or(PlacementError::OutOfBounds)?;
        if !self.economy.try_spend(spec.cost, out) {
            return Err(PlacementError::InsufficientFunds);
        }

        let handle = self.turrets.spawn(kind.prototype(), Placement::at(position));
        let configured = self
            .turrets
            .get_mut(handle)
            .map_or(false, |turret| turret.configure(spec, cell, position));
        if !configured {
            error!("turret {kind:?} has no level data, refunding placement");
            if let Err(error) = self.turrets.despawn(handle) {
                debug!("failed to reclaim turret: {error}");
            }
            self.economy.add_gold(spec.cost, out);
            return Err(PlacementError::UnknownKind);
        }

        self.grid.occupy(cell, handle);
        let visual_key = spec
            .level(1)
            .map(|stats| stats.visual_key.clone())
            .unwrap_or_default();
        debug!("placed {kind:?} turret {handle:?} at {cell:?}");
        out.push(Event::TurretPlaced {
            turret: handle,
            kind,
            cell,
        });
        out.push(Event::TurretVisualChanged {
            turret: handle,
            visual_key,
        });
        Ok(())
    }

    fn remove_turret(&mut self, cell: CellCoord, out: &mut Vec<Event>) {
        let reason = if !self.grid.contains(cell) {
            RemovalError::OutOfBounds
        } else if let Some(handle) = self.grid.occupant(cell) {
            let refund = self
                .turrets
                .get(handle)
                .map_or(0, |turret| turret.stats.sell_value);
            let _ = self.grid.vacate(cell);
            if let Err(error) = self.turrets.despawn(handle) {
                warn!("failed to reclaim sold turret: {error}");
            }
            debug!("sold turret {handle:?} at {cell:?} for {refund}");
            out.push(Event::TurretRemoved {
                turret: handle,
                cell,
                refund,
            });
            self.economy.add_gold(refund, out);
            return;
        } else {
            RemovalError::MissingTurret
        };

        warn!("cannot remove turret at {cell:?}: {reason:?}");
        out.push(Event::TurretRemovalRejected { cell, reason });
    }

    fn upgrade_turret(&mut self, cell: CellCoord, out: &mut Vec<Event>) {
        match self.try_upgrade(cell, out) {
            Ok((turret, level, visual_key)) => {
                debug!("upgraded turret {turret:?} to level {level}");
                out.push(Event::TurretUpgraded {
                    turret,
                    cell,
                    level,
                });
                out.push(Event::TurretVisualChanged { turret, visual_key });
            }
            Err(reason) => {
                debug!("upgrade at {cell:?} rejected: {reason:?}");
                out.push(Event::TurretUpgradeRejected { cell, reason });
            }
        }
    }

    fn try_upgrade(
        &mut self,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<(EntityHandle, u32, String), UpgradeError> {
        if self.economy.is_over() {
            return Err(UpgradeError::GameOver);
        }
        if !self.grid.contains(cell) {
            return Err(UpgradeError::OutOfBounds);
        }
        let handle = self
            .grid
            .occupant(cell)
            .ok_or(UpgradeError::MissingTurret)?;
        let turret = self
            .turrets
            .get(handle)
            .ok_or(UpgradeError::MissingTurret)?;
        if turret.level >= turret.max_level {
            return Err(UpgradeError::MaxLevel);
        }
        let cost = turret.stats.upgrade_cost;
        let spec = self
            .level
            .turret(turret.kind)
            .ok_or(UpgradeError::MissingTurret)?;

        if !self.economy.try_spend(cost, out) {
            return Err(UpgradeError::InsufficientFunds);
        }
        let turret = self
            .turrets
            .get_mut(handle)
            .ok_or(UpgradeError::MissingTurret)?;
        if !turret.upgrade(spec) {
            self.economy.add_gold(cost, out);
            return Err(UpgradeError::MaxLevel);
        }
        Ok((handle, turret.level, turret.stats.visual_key.clone()))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StartWaves => world.start_waves(out_events),
        Command::WavesExhausted => world.complete_waves(out_events),
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::AcquireTarget { turret, target } => world.acquire_target(turret, target),
        Command::FireTurret { turret, target } => world.fire_turret(turret, target, out_events),
        Command::AttackAnimationReady { turret } => world.attack_ready(turret, out_events),
        Command::PlaceTurret { kind, cell } => world.place_turret(kind, cell, out_events),
        Command::RemoveTurret { cell } => world.remove_turret(cell, out_events),
        Command::UpgradeTurret { cell } => world.upgrade_turret(cell, out_events),
        Command::SetSelectedAction { action } => world.economy.select_action(action, out_events),
        Command::SetSelectedTurretKind { kind } => {
            world.economy.select_turret_kind(kind, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use waypoint_defence_core::{
        CellCoord, CellKind, EnemyView, EntityHandle, GamePhase, PlayerAction, PrototypeId,
        TurretKind, TurretView,
    };

    use super::World;

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter_spawned()
                .map(|(handle, enemy)| enemy.snapshot(handle))
                .collect(),
        )
    }

    /// Captures a read-only view of the placed turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        TurretView::from_snapshots(
            world
                .turrets
                .iter_spawned()
                .map(|(handle, turret)| turret.snapshot(handle))
                .collect(),
        )
    }

    /// Classification of a grid cell, or `None` outside the map.
    #[must_use]
    pub fn cell_kind(world: &World, cell: CellCoord) -> Option<CellKind> {
        world.grid.cell_kind(cell)
    }

    /// World-space centre of a grid cell.
    #[must_use]
    pub fn world_center_of(world: &World, cell: CellCoord) -> Option<Vec2> {
        world.grid.world_center_of(cell)
    }

    /// Grid cell containing the world position.
    #[must_use]
    pub fn cell_at(world: &World, position: Vec2) -> Option<CellCoord> {
        world.grid.cell_at(position)
    }

    /// Turret standing on the cell, if any.
    #[must_use]
    pub fn turret_at(world: &World, cell: CellCoord) -> Option<EntityHandle> {
        world.grid.occupant(cell)
    }

    /// Gold available to the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.economy.gold()
    }

    /// Player health remaining.
    #[must_use]
    pub fn player_health(world: &World) -> u32 {
        world.economy.health()
    }

    /// Current phase of the level.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.economy.phase()
    }

    /// Tool and turret kind currently selected by the player.
    #[must_use]
    pub fn selection(world: &World) -> (PlayerAction, Option<TurretKind>) {
        world.economy.selection()
    }

    /// Whether every configured wave has been spawned.
    #[must_use]
    pub fn waves_exhausted(world: &World) -> bool {
        world.waves_exhausted
    }

    /// Number of live enemies.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.live_count()
    }

    /// Number of projectiles in flight or lingering.
    #[must_use]
    pub fn live_projectile_count(world: &World) -> usize {
        world.projectiles.live_count()
    }

    /// Live and pooled instance counts for an enemy prototype.
    #[must_use]
    pub fn enemy_pool_counts(world: &World, kind: PrototypeId) -> (usize, usize) {
        (
            world.enemies.spawned_count(kind),
            world.enemies.despawned_count(kind),
        )
    }

    /// Effective movement speed of a live enemy.
    #[must_use]
    pub fn enemy_speed(world: &World, enemy: EntityHandle) -> Option<f32> {
        world
            .enemies
            .get(enemy)
            .map(|enemy| enemy.status.effective_speed())
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
