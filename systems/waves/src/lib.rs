#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting enemy spawn commands.

use std::time::Duration;

use log::{debug, info};
use waypoint_defence_core::{Command, Event, WaveSpec};

/// Progress of the scheduler through the configured waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveState {
    /// Waves have not been started.
    Idle,
    /// Counting down the delay before the wave's first spawn.
    Waiting {
        /// Index of the wave.
        wave: usize,
        /// Time left before the first spawn.
        remaining: Duration,
    },
    /// Spawning the wave's enemies.
    Spawning {
        /// Index of the wave.
        wave: usize,
        /// Enemies spawned so far.
        spawned: u32,
        /// Time left before the next spawn.
        remaining: Duration,
    },
    /// Every wave has been spawned.
    Complete,
}

/// Pure system that schedules spawns from the level's wave list.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    state: WaveState,
}

impl WaveScheduler {
    /// Creates an idle scheduler for the provided waves.
    #[must_use]
    pub fn new(waves: Vec<WaveSpec>) -> Self {
        Self {
            waves,
            state: WaveState::Idle,
        }
    }

    /// Current scheduler state.
    #[must_use]
    pub fn state(&self) -> WaveState {
        self.state
    }

    /// Starts scheduling on `WavesStarted` and advances timers on
    /// `TimeAdvanced`, emitting `SpawnEnemy` and finally `WavesExhausted`.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::WavesStarted if self.state == WaveState::Idle => {
                    self.start_next_wave(out);
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                _ => {}
            }
        }
    }

    /// Moves to the wave after the current one, or to `Complete` past the
    /// last wave.
    pub fn start_next_wave(&mut self, out: &mut Vec<Command>) {
        let next = match self.state {
            WaveState::Idle => 0,
            WaveState::Waiting { wave, .. } | WaveState::Spawning { wave, .. } => wave + 1,
            WaveState::Complete => return,
        };

        let Some(spec) = self.waves.get(next) else {
            info!("wave schedule complete");
            self.state = WaveState::Complete;
            out.push(Command::WavesExhausted);
            return;
        };

        info!(
            "wave {} queued: {} enemies after {:?}",
            next + 1,
            spec.count,
            spec.delay
        );
        self.state = WaveState::Waiting {
            wave: next,
            remaining: spec.delay,
        };
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let mut budget = dt;
        loop {
            match self.state {
                WaveState::Idle | WaveState::Complete => return,
                WaveState::Waiting { wave, remaining } => {
                    if remaining > budget {
                        self.state = WaveState::Waiting {
                            wave,
                            remaining: remaining - budget,
                        };
                        return;
                    }
                    budget -= remaining;
                    self.state = WaveState::Spawning {
                        wave,
                        spawned: 0,
                        remaining: Duration::ZERO,
                    };
                }
                WaveState::Spawning {
                    wave,
                    spawned,
                    remaining,
                } => {
                    let Some(spec) = self.waves.get(wave) else {
                        self.start_next_wave(out);
                        continue;
                    };
                    if spawned >= spec.count {
                        self.start_next_wave(out);
                        continue;
                    }
                    if remaining > budget {
                        self.state = WaveState::Spawning {
                            wave,
                            spawned,
                            remaining: remaining - budget,
                        };
                        return;
                    }
                    budget -= remaining;
                    debug!("wave {} spawns enemy {}", wave + 1, spawned + 1);
                    out.push(Command::SpawnEnemy { kind: spec.enemy });
                    self.state = WaveState::Spawning {
                        wave,
                        spawned: spawned + 1,
                        remaining: spec.spacing,
                    };
                }
            }
        }
    }
}
