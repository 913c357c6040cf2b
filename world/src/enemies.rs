//! Enemy state stored inside the enemy pool.

use glam::Vec2;
use waypoint_defence_core::{EnemySnapshot, EnemySpec, EntityHandle, PrototypeId};

use crate::{
    health::Health,
    path::{PathFollower, PathState},
    status::StatusEffect,
};

#[derive(Debug, Default)]
pub(crate) struct Enemy {
    pub(crate) kind: PrototypeId,
    pub(crate) health: Health,
    pub(crate) status: StatusEffect,
    pub(crate) follower: PathFollower,
    pub(crate) gold_value: u32,
    pub(crate) player_damage: u32,
    invisible: bool,
    revealed: bool,
}

impl Enemy {
    /// Applies the kind's stats and assigns the path. Returns `false` when
    /// the path is unusable.
    pub(crate) fn configure(&mut self, kind: PrototypeId, spec: &EnemySpec, path: &[Vec2]) -> bool {
        self.kind = kind;
        self.health.initialize(spec.max_health, spec.healable);
        self.status.initialize(spec.speed);
        self.gold_value = spec.gold_value;
        self.player_damage = spec.player_damage;
        self.invisible = spec.invisible;
        self.revealed = false;
        self.follower.set_path(path.to_vec())
    }

    /// Marks an invisible enemy as revealed. Returns `true` on the first reveal.
    pub(crate) fn reveal(&mut self) -> bool {
        if !self.invisible || self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }

    pub(crate) fn is_targetable(&self) -> bool {
        !self.health.is_depleted()
            && self.health.current() > 0.0
            && !self.health.is_predicted_dead()
            && self.follower.state() == PathState::Moving
            && (!self.invisible || self.revealed)
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.follower.position()
    }

    pub(crate) fn snapshot(&self, handle: EntityHandle) -> EnemySnapshot {
        EnemySnapshot {
            handle,
            kind: self.kind,
            position: self.position(),
            progress: self.follower.progress(),
            health: self.health.current(),
            predicted_health: self.health.predicted(),
            targetable: self.is_targetable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(invisible: bool) -> EnemySpec {
        EnemySpec {
            name: "ghost".to_owned(),
            max_health: 20.0,
            speed: 1.0,
            gold_value: 5,
            player_damage: 1,
            healable: true,
            invisible,
            preload: 0,
        }
    }

    fn path() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::new(5.0, 0.0)]
    }

    #[test]
    fn invisible_enemy_targetable_only_after_reveal() {
        let mut enemy = Enemy::default();
        assert!(enemy.configure(PrototypeId::new(1), &spec(true), &path()));
        assert!(!enemy.is_targetable());

        assert!(enemy.reveal());
        assert!(!enemy.reveal());
        assert!(enemy.is_targetable());
    }

    #[test]
    fn predicted_death_removes_targetability() {
        let mut enemy = Enemy::default();
        assert!(enemy.configure(PrototypeId::new(0), &spec(false), &path()));
        assert!(enemy.is_targetable());

        enemy.health.predict_damage(20.0);
        assert!(!enemy.snapshot(EntityHandle::new(0, 0)).targetable);
    }

    #[test]
    fn unusable_path_fails_configuration() {
        let mut enemy = Enemy::default();
        assert!(!enemy.configure(PrototypeId::new(0), &spec(false), &[Vec2::ZERO]));
    }
}
