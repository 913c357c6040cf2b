use std::time::Duration;

use waypoint_defence_cli::{parse_level, Simulation};
use waypoint_defence_core::{
    CellCoord, CellKind, Command, Event, GamePhase, PlayerAction, TurretKind,
};
use waypoint_defence_world::query;

const DUEL: &str = r#"
[game]
initial_gold = 200
initial_health = 3

[map]
tile_size = 1.0
layout = ['##########', '..........']
path = [[0, 0], [9, 0]]

[[enemies]]
name = "grunt"
max_health = 10.0
speed = 1.0
gold_value = 5
player_damage = 1

[[turrets]]
kind = "shooter"
cost = 100
max_level = 1
projectile = { variant = "direct", speed = 50.0 }

[[turrets.levels]]
damage = 10.0
range = 3.0
attack_interval = 0.5
upgrade_cost = 0
sell_value = 50
visual_key = "shooter_1"

[[waves]]
enemy = "grunt"
count = 1
spacing = 1.0
delay = 0.0
"#;

fn run_to_end(simulation: &mut Simulation, dt: Duration, limit: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..limit {
        if simulation.is_over() {
            break;
        }
        events.extend(simulation.step(dt));
    }
    events
}

#[test]
fn undefended_default_level_is_lost() {
    let level = parse_level(include_str!("../levels/default.toml")).expect("level loads");
    let mut simulation = Simulation::new(level);
    let started = simulation.start_waves();
    assert_eq!(started, vec![Event::WavesStarted]);

    let _ = run_to_end(&mut simulation, Duration::from_millis(100), 5_000);
    let summary = simulation.summary();

    assert_eq!(summary.phase, GamePhase::Lost);
    assert_eq!(summary.health, 0);
    assert_eq!(summary.kills, 0, "contact zones alone never kill");
    assert!(summary.leaks >= 4, "ten health takes at least four leaks");
    assert_eq!(summary.gold, 400);
}

#[test]
fn defended_duel_is_won() {
    let mut simulation = Simulation::new(parse_level(DUEL).expect("level loads"));
    let placed = simulation.submit(Command::PlaceTurret {
        kind: TurretKind::Shooter,
        cell: CellCoord::new(1, 1),
    });
    assert!(placed
        .iter()
        .any(|event| matches!(event, Event::TurretPlaced { .. })));

    let _ = simulation.start_waves();
    let events = run_to_end(&mut simulation, Duration::from_millis(100), 200);

    assert!(events.contains(&Event::WavesCompleted));
    assert!(events.contains(&Event::GameEnded {
        phase: GamePhase::Won
    }));
    let summary = simulation.summary();
    assert_eq!(summary.phase, GamePhase::Won);
    assert_eq!(summary.kills, 1);
    assert_eq!(summary.leaks, 0);
    assert_eq!(summary.gold, 105);
    assert_eq!(summary.health, 3);
    assert_eq!(summary.turrets, 1);
}

#[test]
fn clicks_follow_the_selected_tool() {
    let mut simulation = Simulation::new(parse_level(DUEL).expect("level loads"));
    let cell = CellCoord::new(4, 1);

    assert!(simulation.click(cell).is_empty(), "no tool selected yet");

    let _ = simulation.submit(Command::SetSelectedAction {
        action: PlayerAction::PlaceTurret,
    });
    let _ = simulation.submit(Command::SetSelectedTurretKind {
        kind: Some(TurretKind::Shooter),
    });
    let placed = simulation.click(cell);
    assert!(placed
        .iter()
        .any(|event| matches!(event, Event::TurretPlaced { cell: c, .. } if *c == cell)));
    assert_eq!(
        query::cell_kind(simulation.world(), cell),
        Some(CellKind::Occupied)
    );

    let _ = simulation.submit(Command::SetSelectedAction {
        action: PlayerAction::SellTurret,
    });
    let sold = simulation.click(cell);
    assert!(sold.contains(&Event::GoldChanged { gold: 150 }));
    assert_eq!(
        query::cell_kind(simulation.world(), cell),
        Some(CellKind::Buildable)
    );
}

#[test]
fn summary_serializes_to_json() {
    let simulation = Simulation::new(parse_level(DUEL).expect("level loads"));
    let json = serde_json::to_value(simulation.summary()).expect("summary encodes");

    assert_eq!(json["phase"], "Playing");
    assert_eq!(json["gold"], 200);
    assert_eq!(json["ticks"], 0);
}
