//! Process-wide simulation context owning the world and every system.

use std::time::Duration;

use log::debug;
use serde::Serialize;
use waypoint_defence_core::{CellCoord, Command, Event, GamePhase, Level};
use waypoint_defence_system_builder::{Builder, BuilderInput};
use waypoint_defence_system_turret_combat::TurretCombat;
use waypoint_defence_system_waves::WaveScheduler;
use waypoint_defence_world::{self as world, query, World};

/// Outcome of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Phase the level ended in.
    pub phase: GamePhase,
    /// Gold left.
    pub gold: u32,
    /// Player health left.
    pub health: u32,
    /// Enemies killed by the defences.
    pub kills: u32,
    /// Enemies that reached the end of the path.
    pub leaks: u32,
    /// Simulation steps taken.
    pub ticks: u64,
    /// Turrets standing at the end.
    pub turrets: usize,
}

/// Owns the world and the systems and runs them in the fixed tick order.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    waves: WaveScheduler,
    combat: TurretCombat,
    builder: Builder,
    kills: u32,
    leaks: u32,
}

impl Simulation {
    /// Creates a simulation for the provided level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let waves = WaveScheduler::new(level.waves.clone());
        Self {
            world: World::new(level),
            waves,
            combat: TurretCombat::new(),
            builder: Builder::new(),
            kills: 0,
            leaks: 0,
        }
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a player command and returns the resulting events.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        self.dispatch(vec![command], &mut events);
        events
    }

    /// Requests the wave schedule to begin.
    pub fn start_waves(&mut self) -> Vec<Event> {
        self.submit(Command::StartWaves)
    }

    /// Routes a clicked cell through the builder using the current selection.
    pub fn click(&mut self, cell: CellCoord) -> Vec<Event> {
        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &[],
            BuilderInput::new(Some(cell)),
            |cell| query::cell_kind(world, cell),
            &mut commands,
        );
        let mut events = Vec::new();
        self.dispatch(commands, &mut events);
        events
    }

    /// Advances the simulation by `dt`: world tick, wave scheduling, then the
    /// turret combat pass.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.observe(&events);

        let mut commands = Vec::new();
        self.waves.handle(&events, &mut commands);
        self.combat.handle(
            query::phase(&self.world),
            &query::enemy_view(&self.world),
            &query::turret_view(&self.world),
            &mut commands,
        );
        self.dispatch(commands, &mut events);
        events
    }

    /// Whether the level has been won or lost.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::phase(&self.world) != GamePhase::Playing
    }

    /// Snapshot of the run's outcome so far.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            phase: query::phase(&self.world),
            gold: query::gold(&self.world),
            health: query::player_health(&self.world),
            kills: self.kills,
            leaks: self.leaks,
            ticks: query::tick_index(&self.world),
            turrets: query::turret_view(&self.world).len(),
        }
    }

    /// Applies commands until the systems stop reacting, appending every
    /// resulting event to `events`.
    fn dispatch(&mut self, mut commands: Vec<Command>, events: &mut Vec<Event>) {
        while !commands.is_empty() {
            let start = events.len();
            for command in commands.drain(..) {
                debug!("applying {command:?}");
                world::apply(&mut self.world, command, events);
            }
            let produced = &events[start..];
            self.observe(produced);
            self.waves.handle(produced, &mut commands);
        }
    }

    fn observe(&mut self, events: &[Event]) {
        self.builder
            .handle(events, BuilderInput::default(), |_| None, &mut Vec::new());
        for event in events {
            match event {
                Event::EnemyDied { .. } => self.kills += 1,
                Event::EnemyReachedEnd { .. } => self.leaks += 1,
                _ => {}
            }
        }
    }
}
