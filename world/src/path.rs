//! Waypoint following for enemies.

use std::time::Duration;

use glam::Vec2;
use log::warn;

const SNAP_DISTANCE: f32 = 0.001;
const HEADING_TOLERANCE: f32 = 1e-4;

/// Lifecycle of a [`PathFollower`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathState {
    /// No path assigned.
    #[default]
    Idle,
    /// Travelling along the path.
    Moving,
    /// Passed the last waypoint.
    ReachedEnd,
}

/// Notifications produced while advancing along a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathEvent {
    /// The heading changed to the provided unit vector.
    DirectionChanged(Vec2),
    /// The follower passed the final waypoint.
    ReachedEnd,
}

/// Moves a point along an ordered list of waypoints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathFollower {
    points: Vec<Vec2>,
    next: usize,
    position: Vec2,
    heading: Option<Vec2>,
    travelled: f32,
    length: f32,
    state: PathState,
}

impl PathFollower {
    /// Assigns a new path and moves to its first waypoint.
    ///
    /// Paths with fewer than two waypoints are rejected and the current path
    /// is kept.
    pub fn set_path(&mut self, points: Vec<Vec2>) -> bool {
        let Some(&start) = points.first() else {
            warn!("rejecting empty enemy path");
            return false;
        };
        if points.len() < 2 {
            warn!("rejecting enemy path with a single waypoint");
            return false;
        }

        self.length = points
            .windows(2)
            .map(|segment| segment[0].distance(segment[1]))
            .sum();
        self.points = points;
        self.next = 1;
        self.position = start;
        self.heading = None;
        self.travelled = 0.0;
        self.state = PathState::Moving;
        true
    }

    /// Travels `speed * dt` along the path, carrying leftover distance across
    /// waypoints.
    pub fn advance(&mut self, speed: f32, dt: Duration, out: &mut Vec<PathEvent>) {
        if self.state != PathState::Moving {
            return;
        }

        let mut budget = speed * dt.as_secs_f32();
        while budget > 0.0 {
            let Some(&target) = self.points.get(self.next) else {
                break;
            };
            let offset = target - self.position;
            let distance = offset.length();

            if distance < SNAP_DISTANCE {
                self.arrive(target, distance);
                continue;
            }

            let direction = offset / distance;
            let turned = self
                .heading
                .map_or(true, |heading| !heading.abs_diff_eq(direction, HEADING_TOLERANCE));
            if turned {
                self.heading = Some(direction);
                out.push(PathEvent::DirectionChanged(direction));
            }

            if budget >= distance {
                self.arrive(target, distance);
                budget -= distance;
            } else {
                self.position += direction * budget;
                self.travelled += budget;
                budget = 0.0;
            }
        }

        if self.next >= self.points.len() {
            self.state = PathState::ReachedEnd;
            out.push(PathEvent::ReachedEnd);
        }
    }

    fn arrive(&mut self, waypoint: Vec2, distance: f32) {
        self.position = waypoint;
        self.travelled += distance;
        self.next += 1;
    }

    /// Fraction of the path travelled, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.length <= 0.0 {
            return match self.state {
                PathState::ReachedEnd => 1.0,
                _ => 0.0,
            };
        }
        (self.travelled / self.length).clamp(0.0, 1.0)
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PathState {
        self.state
    }

    /// Waypoints of the assigned path.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shaped() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]
    }

    #[test]
    fn reaches_end_once_with_overshooting_steps() {
        let mut follower = PathFollower::default();
        assert!(follower.set_path(l_shaped()));

        let mut events = Vec::new();
        follower.advance(7.0, Duration::from_secs(1), &mut events);
        follower.advance(7.0, Duration::from_secs(1), &mut events);
        follower.advance(7.0, Duration::from_secs(1), &mut events);
        follower.advance(7.0, Duration::from_secs(1), &mut events);

        assert_eq!(
            events,
            vec![
                PathEvent::DirectionChanged(Vec2::X),
                PathEvent::DirectionChanged(Vec2::Y),
                PathEvent::ReachedEnd,
            ]
        );
        assert_eq!(follower.state(), PathState::ReachedEnd);
        assert_eq!(follower.position(), Vec2::new(10.0, 10.0));
        assert_eq!(follower.progress(), 1.0);
    }

    #[test]
    fn leftover_distance_carries_across_waypoints() {
        let mut follower = PathFollower::default();
        assert!(follower.set_path(l_shaped()));

        let mut events = Vec::new();
        follower.advance(12.0, Duration::from_secs(1), &mut events);

        assert!(follower.position().abs_diff_eq(Vec2::new(10.0, 2.0), 1e-5));
        assert!((follower.progress() - 0.6).abs() < 1e-5);
    }

    #[test]
    fn short_paths_are_rejected_without_losing_current_path() {
        let mut follower = PathFollower::default();
        assert!(!follower.set_path(vec![Vec2::ZERO]));
        assert_eq!(follower.state(), PathState::Idle);

        assert!(follower.set_path(l_shaped()));
        assert!(!follower.set_path(Vec::new()));
        assert_eq!(follower.points().len(), 3);
        assert_eq!(follower.state(), PathState::Moving);
    }

    #[test]
    fn heading_is_reported_only_on_change() {
        let mut follower = PathFollower::default();
        assert!(follower.set_path(l_shaped()));

        let mut events = Vec::new();
        for _ in 0..4 {
            follower.advance(1.0, Duration::from_secs(1), &mut events);
        }

        assert_eq!(events, vec![PathEvent::DirectionChanged(Vec2::X)]);
    }
}
