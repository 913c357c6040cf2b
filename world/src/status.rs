//! Timed speed reductions applied to enemies.

use std::time::Duration;

const MULTIPLIER_TOLERANCE: f32 = 1e-6;

/// Speed modifier with a single reduction timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    base_speed: f32,
    multiplier: f32,
    remaining: Duration,
}

impl Default for StatusEffect {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl StatusEffect {
    /// Creates an unaffected tracker for the provided base speed.
    #[must_use]
    pub const fn new(base_speed: f32) -> Self {
        Self {
            base_speed,
            multiplier: 1.0,
            remaining: Duration::ZERO,
        }
    }

    /// Resets the tracker, cancelling any running reduction.
    pub fn initialize(&mut self, base_speed: f32) {
        *self = Self::new(base_speed);
    }

    /// Applies a reduction removing `factor` of the base speed for `duration`.
    ///
    /// A reduction of equal strength extends the running timer, a stronger
    /// one replaces it, and a weaker one is ignored while a timer runs.
    /// Zero-length reductions have no effect.
    pub fn apply_speed_reduction(&mut self, factor: f32, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let multiplier = (1.0 - factor).clamp(0.0, 1.0);

        if (multiplier - self.multiplier).abs() <= MULTIPLIER_TOLERANCE {
            self.remaining = self.remaining.max(duration);
        }

        if multiplier < self.multiplier || self.remaining.is_zero() {
            self.multiplier = multiplier;
            self.remaining = duration;
        }
    }

    /// Advances the reduction timer, restoring full speed on expiry.
    pub fn tick(&mut self, dt: Duration) {
        if self.remaining.is_zero() {
            return;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.multiplier = 1.0;
        }
    }

    /// Base speed scaled by the active multiplier.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.base_speed * self.multiplier
    }

    /// Active speed multiplier in `[0, 1]`.
    #[must_use]
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Time left on the running reduction.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f32) -> Duration {
        Duration::from_secs_f32(value)
    }

    #[test]
    fn stronger_reduction_overrides_running_one() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.3, secs(2.0));
        status.apply_speed_reduction(0.5, secs(1.0));

        assert!((status.effective_speed() - 5.0).abs() < 1e-5);
        assert_eq!(status.remaining(), secs(1.0));
    }

    #[test]
    fn weaker_reduction_is_ignored_while_running() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.5, secs(2.0));
        status.apply_speed_reduction(0.3, secs(5.0));

        assert!((status.effective_speed() - 5.0).abs() < 1e-5);
        assert_eq!(status.remaining(), secs(2.0));
    }

    #[test]
    fn equal_reduction_extends_to_longest_duration() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.5, secs(1.0));
        status.apply_speed_reduction(0.5, secs(3.0));
        assert_eq!(status.remaining(), secs(3.0));

        status.apply_speed_reduction(0.5, secs(2.0));
        assert_eq!(status.remaining(), secs(3.0));
    }

    #[test]
    fn expiry_restores_full_speed() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.5, Duration::from_millis(500));

        status.tick(Duration::from_millis(300));
        assert!((status.effective_speed() - 5.0).abs() < 1e-5);

        status.tick(Duration::from_millis(300));
        assert_eq!(status.multiplier(), 1.0);
        assert_eq!(status.effective_speed(), 10.0);
    }

    #[test]
    fn weaker_reduction_applies_after_expiry() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.5, secs(1.0));
        status.tick(secs(1.0));

        status.apply_speed_reduction(0.2, secs(1.0));
        assert!((status.effective_speed() - 8.0).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_reduction_is_ignored() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(0.5, Duration::ZERO);
        assert_eq!(status.effective_speed(), 10.0);

        for _ in 0..100 {
            status.tick(Duration::from_millis(100));
        }
        assert_eq!(status.multiplier(), 1.0);
        assert_eq!(status.effective_speed(), 10.0);
    }

    #[test]
    fn factor_is_clamped() {
        let mut status = StatusEffect::new(10.0);
        status.apply_speed_reduction(1.5, secs(1.0));
        assert_eq!(status.effective_speed(), 0.0);
    }
}
