//! Player gold, health, game phase and tool selection.

use log::info;
use waypoint_defence_core::{Event, GamePhase, PlayerAction, TurretKind};

#[derive(Debug)]
pub(crate) struct Economy {
    gold: u32,
    health: u32,
    phase: GamePhase,
    action: PlayerAction,
    turret_kind: Option<TurretKind>,
}

impl Economy {
    pub(crate) fn new(gold: u32, health: u32) -> Self {
        Self {
            gold,
            health,
            phase: GamePhase::Playing,
            action: PlayerAction::None,
            turret_kind: None,
        }
    }

    pub(crate) fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    pub(crate) fn add_gold(&mut self, amount: u32, out: &mut Vec<Event>) {
        if self.is_over() || amount == 0 {
            return;
        }
        self.gold = self.gold.saturating_add(amount);
        out.push(Event::GoldChanged { gold: self.gold });
    }

    pub(crate) fn try_spend(&mut self, amount: u32, out: &mut Vec<Event>) -> bool {
        if self.is_over() || self.gold < amount {
            return false;
        }
        self.gold -= amount;
        if amount > 0 {
            out.push(Event::GoldChanged { gold: self.gold });
        }
        true
    }

    pub(crate) fn take_damage(&mut self, amount: u32, out: &mut Vec<Event>) {
        if self.is_over() {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        out.push(Event::PlayerHealthChanged {
            health: self.health,
        });
        if self.health == 0 {
            self.end(GamePhase::Lost, out);
        }
    }

    pub(crate) fn end(&mut self, phase: GamePhase, out: &mut Vec<Event>) {
        if self.is_over() || phase == GamePhase::Playing {
            return;
        }
        self.phase = phase;
        info!("game ended: {phase:?}");
        out.push(Event::GameEnded { phase });
    }

    pub(crate) fn select_action(&mut self, action: PlayerAction, out: &mut Vec<Event>) {
        self.action = action;
        self.push_selection(out);
    }

    pub(crate) fn select_turret_kind(&mut self, kind: Option<TurretKind>, out: &mut Vec<Event>) {
        self.turret_kind = kind;
        self.push_selection(out);
    }

    fn push_selection(&self, out: &mut Vec<Event>) {
        out.push(Event::SelectionChanged {
            action: self.action,
            turret_kind: self.turret_kind,
        });
    }

    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.phase
    }

    pub(crate) fn selection(&self) -> (PlayerAction, Option<TurretKind>) {
        (self.action, self.turret_kind)
    }
}
