//! Hit points with forward-looking damage prediction.

/// Health state of a damageable instance.
///
/// `current` stays within `[0, max]`. `predicted` tracks the health expected
/// once every in-flight attack lands and may go negative. Depletion is latched
/// by [`Health::sync`], which the world runs once per tick, so an instance
/// brought to zero keeps accepting damage until the next sync.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    predicted: f32,
    healable: bool,
    depleted: bool,
}

impl Health {
    /// Creates full health with the provided maximum.
    #[must_use]
    pub fn new(max: f32, healable: bool) -> Self {
        let mut health = Self::default();
        health.initialize(max, healable);
        health
    }

    /// Resets to full health and clears the depletion latch.
    pub fn initialize(&mut self, max: f32, healable: bool) {
        self.max = max.max(0.0);
        self.current = self.max;
        self.predicted = self.max;
        self.healable = healable;
        self.depleted = false;
    }

    /// Subtracts damage, clamping at zero. Returns `false` once depleted.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.depleted {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        true
    }

    /// Adds health when healable and still above zero.
    ///
    /// A heal that would reach or exceed the maximum is accepted but leaves
    /// health unchanged.
    pub fn apply_heal(&mut self, amount: f32) -> bool {
        if !self.healable || self.current <= 0.0 {
            return false;
        }
        if self.current + amount >= self.max {
            return true;
        }
        self.current += amount;
        true
    }

    /// Records damage that an in-flight attack will deal.
    pub fn predict_damage(&mut self, amount: f32) {
        self.predicted -= amount;
    }

    /// Records healing that is expected to land.
    pub fn predict_heal(&mut self, amount: f32) {
        if self.healable && self.current > 0.0 {
            self.predicted += amount;
        }
    }

    /// Reports whether in-flight attacks are expected to finish the instance.
    #[must_use]
    pub fn is_predicted_dead(&self) -> bool {
        self.predicted <= 0.0
    }

    /// Latches depletion. Returns `true` exactly once, on the first sync
    /// that observes zero health.
    pub fn sync(&mut self) -> bool {
        if self.depleted || self.current > 0.0 {
            return false;
        }
        self.depleted = true;
        true
    }

    /// Current hit points.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Forward-looking hit points.
    #[must_use]
    pub fn predicted(&self) -> f32 {
        self.predicted
    }

    /// Whether depletion has been latched.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.depleted
    }
}
