#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure targeting query that picks the enemy furthest along the path.

use glam::Vec2;
use waypoint_defence_core::{EnemySnapshot, EnemyView, EntityHandle};

/// Enemy eligible for targeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Handle of the enemy.
    pub handle: EntityHandle,
    /// World position of the enemy.
    pub position: Vec2,
    /// Fraction of the path the enemy has travelled.
    pub progress: f32,
    /// Health expected once in-flight attacks land.
    pub predicted_health: f32,
}

impl TargetCandidate {
    /// Builds a candidate from a snapshot, or `None` when the enemy may not
    /// be targeted.
    #[must_use]
    pub fn from_snapshot(snapshot: &EnemySnapshot) -> Option<Self> {
        if !snapshot.targetable {
            return None;
        }
        Some(Self {
            handle: snapshot.handle,
            position: snapshot.position,
            progress: snapshot.progress,
            predicted_health: snapshot.predicted_health,
        })
    }
}

/// Selects the in-range candidate with the greatest path progress.
///
/// Ties keep the earliest candidate in iteration order.
#[must_use]
pub fn find_target<'a>(
    origin: Vec2,
    range: f32,
    candidates: impl IntoIterator<Item = &'a TargetCandidate>,
) -> Option<EntityHandle> {
    let max_distance_sq = range * range;
    let mut best: Option<&TargetCandidate> = None;

    for candidate in candidates {
        if candidate.position.distance_squared(origin) > max_distance_sq {
            continue;
        }
        match best {
            Some(existing) if candidate.progress <= existing.progress => {}
            _ => best = Some(candidate),
        }
    }

    best.map(|candidate| candidate.handle)
}

/// Targeting workspace that reuses its candidate buffer between passes.
#[derive(Debug, Default)]
pub struct Targeting {
    candidates: Vec<TargetCandidate>,
}

impl Targeting {
    /// Creates a targeting workspace with an empty candidate buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the targetable enemies of the view in handle order.
    pub fn prepare(&mut self, enemies: &EnemyView) {
        self.candidates.clear();
        self.candidates.reserve(enemies.len());
        self.candidates
            .extend(enemies.iter().filter_map(TargetCandidate::from_snapshot));
    }

    /// Candidates gathered by the last [`Targeting::prepare`] call.
    #[must_use]
    pub fn candidates(&self) -> &[TargetCandidate] {
        &self.candidates
    }
}
