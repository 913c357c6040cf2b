//! Static zones that damage or heal enemies on contact.

use std::collections::BTreeSet;

use glam::Vec2;
use waypoint_defence_core::{EntityHandle, ZoneEffect};

/// Zone that affects each enemy once per entry.
#[derive(Debug)]
pub(crate) struct ContactZone {
    center: Vec2,
    radius: f32,
    effect: ZoneEffect,
    touching: BTreeSet<EntityHandle>,
}

impl ContactZone {
    pub(crate) fn new(center: Vec2, radius: f32, effect: ZoneEffect) -> Self {
        Self {
            center,
            radius,
            effect,
            touching: BTreeSet::new(),
        }
    }

    pub(crate) fn effect(&self) -> ZoneEffect {
        self.effect
    }

    /// Reports whether the enemy just entered the zone and should be
    /// affected. Leaving the zone clears its contact flag.
    pub(crate) fn entering(&mut self, enemy: EntityHandle, position: Vec2) -> bool {
        if position.distance(self.center) > self.radius {
            let _ = self.touching.remove(&enemy);
            return false;
        }
        !self.touching.contains(&enemy)
    }

    /// Records that the effect landed, suppressing it until the enemy leaves.
    pub(crate) fn mark(&mut self, enemy: EntityHandle) {
        let _ = self.touching.insert(enemy);
    }

    /// Drops contact flags of enemies that are no longer live.
    pub(crate) fn retain(&mut self, mut live: impl FnMut(EntityHandle) -> bool) {
        self.touching.retain(|enemy| live(*enemy));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affects_once_per_entry() {
        let mut zone = ContactZone::new(Vec2::ZERO, 1.0, ZoneEffect::Damage(2.0));
        let enemy = EntityHandle::new(0, 0);

        assert!(zone.entering(enemy, Vec2::new(0.5, 0.0)));
        zone.mark(enemy);
        assert!(!zone.entering(enemy, Vec2::new(0.2, 0.0)));

        assert!(!zone.entering(enemy, Vec2::new(3.0, 0.0)));
        assert!(zone.entering(enemy, Vec2::new(0.0, 0.9)));
    }

    #[test]
    fn rejected_effect_keeps_retrying() {
        let mut zone = ContactZone::new(Vec2::ZERO, 1.0, ZoneEffect::Heal(2.0));
        let enemy = EntityHandle::new(1, 0);

        assert!(zone.entering(enemy, Vec2::ZERO));
        assert!(zone.entering(enemy, Vec2::ZERO));
    }

    #[test]
    fn retain_forgets_despawned_enemies() {
        let mut zone = ContactZone::new(Vec2::ZERO, 1.0, ZoneEffect::Damage(1.0));
        let enemy = EntityHandle::new(2, 0);
        zone.mark(enemy);

        zone.retain(|_| false);
        assert!(zone.entering(enemy, Vec2::ZERO));
    }
}
