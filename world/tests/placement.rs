use glam::Vec2;
use waypoint_defence_core::{
    CellCoord, CellKind, Command, EntityHandle, Event, GamePhase, LevelConfig, PlacementError,
    PlayerAction, RemovalError, TurretKind, UpgradeError,
};
use waypoint_defence_world::{self as world, query, World};

fn arena() -> World {
    let config: LevelConfig =
        toml::from_str(include_str!("fixtures/arena.toml")).expect("fixture parses");
    World::new(config.validate().expect("fixture validates"))
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn place(world: &mut World, kind: TurretKind, column: u32, row: u32) -> Vec<Event> {
    run(
        world,
        Command::PlaceTurret {
            kind,
            cell: CellCoord::new(column, row),
        },
    )
}

fn placed_handle(events: &[Event]) -> EntityHandle {
    events
        .iter()
        .find_map(|event| match event {
            Event::TurretPlaced { turret, .. } => Some(*turret),
            _ => None,
        })
        .expect("turret placed")
}

fn rejection(events: &[Event]) -> Option<PlacementError> {
    match events {
        [Event::TurretPlacementRejected { reason, .. }] => Some(*reason),
        _ => None,
    }
}

#[test]
fn placing_a_turret_charges_gold_and_occupies_the_cell() {
    let mut world = arena();
    let cell = CellCoord::new(0, 1);
    let events = place(&mut world, TurretKind::Shooter, 0, 1);
    let turret = placed_handle(&events);

    assert_eq!(
        events,
        vec![
            Event::GoldChanged { gold: 150 },
            Event::TurretPlaced {
                turret,
                kind: TurretKind::Shooter,
                cell,
            },
            Event::TurretVisualChanged {
                turret,
                visual_key: "shooter_1".to_owned(),
            },
        ]
    );
    assert_eq!(query::cell_kind(&world, cell), Some(CellKind::Occupied));
    assert_eq!(query::turret_at(&world, cell), Some(turret));
    assert_eq!(query::gold(&world), 150);

    let turrets = query::turret_view(&world).into_vec();
    assert_eq!(turrets.len(), 1, "one turret expected in the view");
    assert_eq!(turrets[0].level, 1);
    assert_eq!(turrets[0].damage, 10.0);
}

#[test]
fn placement_is_rejected_on_unbuildable_cells() {
    let mut world = arena();

    assert_eq!(
        rejection(&place(&mut world, TurretKind::Shooter, 0, 0)),
        Some(PlacementError::NotBuildable),
        "path cells are not buildable"
    );
    assert_eq!(
        rejection(&place(&mut world, TurretKind::Shooter, 3, 1)),
        Some(PlacementError::NotBuildable),
        "obstacles are not buildable"
    );
    assert_eq!(
        rejection(&place(&mut world, TurretKind::Shooter, 9, 1)),
        Some(PlacementError::OutOfBounds)
    );

    let _ = placed_handle(&place(&mut world, TurretKind::Shooter, 0, 1));
    assert_eq!(
        rejection(&place(&mut world, TurretKind::Slowness, 0, 1)),
        Some(PlacementError::Occupied)
    );
    assert_eq!(query::gold(&world), 150, "rejections never charge gold");
}

#[test]
fn placement_without_enough_gold_leaves_the_cell_free() {
    let mut world = arena();
    let _ = placed_handle(&place(&mut world, TurretKind::Shooter, 0, 1));
    let _ = placed_handle(&place(&mut world, TurretKind::AreaDamage, 1, 1));
    assert_eq!(query::gold(&world), 30);

    assert_eq!(
        rejection(&place(&mut world, TurretKind::Slowness, 2, 1)),
        Some(PlacementError::InsufficientFunds)
    );
    assert_eq!(
        query::cell_kind(&world, CellCoord::new(2, 1)),
        Some(CellKind::Buildable)
    );
    assert_eq!(query::gold(&world), 30);
}

#[test]
fn selling_refunds_the_level_sell_value() {
    let mut world = arena();
    let cell = CellCoord::new(0, 1);
    let turret = placed_handle(&place(&mut world, TurretKind::Shooter, 0, 1));

    let events = run(&mut world, Command::RemoveTurret { cell });
    assert_eq!(
        events,
        vec![
            Event::TurretRemoved {
                turret,
                cell,
                refund: 60,
            },
            Event::GoldChanged { gold: 210 },
        ]
    );
    assert_eq!(query::cell_kind(&world, cell), Some(CellKind::Buildable));
    assert!(query::turret_view(&world).is_empty());

    assert_eq!(
        run(&mut world, Command::RemoveTurret { cell }),
        vec![Event::TurretRemovalRejected {
            cell,
            reason: RemovalError::MissingTurret,
        }]
    );
    let outside = CellCoord::new(40, 40);
    assert_eq!(
        run(&mut world, Command::RemoveTurret { cell: outside }),
        vec![Event::TurretRemovalRejected {
            cell: outside,
            reason: RemovalError::OutOfBounds,
        }]
    );
}

#[test]
fn upgrading_applies_next_level_until_max() {
    let mut world = arena();
    let cell = CellCoord::new(0, 1);
    let turret = placed_handle(&place(&mut world, TurretKind::Shooter, 0, 1));

    let events = run(&mut world, Command::UpgradeTurret { cell });
    assert_eq!(
        events,
        vec![
            Event::GoldChanged { gold: 100 },
            Event::TurretUpgraded {
                turret,
                cell,
                level: 2,
            },
            Event::TurretVisualChanged {
                turret,
                visual_key: "shooter_2".to_owned(),
            },
        ]
    );
    let snapshot = query::turret_view(&world).into_vec();
    assert_eq!(snapshot[0].level, 2);
    assert_eq!(snapshot[0].range, 3.5);

    assert_eq!(
        run(&mut world, Command::UpgradeTurret { cell }),
        vec![Event::TurretUpgradeRejected {
            cell,
            reason: UpgradeError::MaxLevel,
        }]
    );
    assert_eq!(query::gold(&world), 100, "max level upgrades are free of charge");

    let sold = run(&mut world, Command::RemoveTurret { cell });
    assert!(sold.contains(&Event::GoldChanged { gold: 190 }));
}

#[test]
fn upgrading_an_empty_cell_is_rejected() {
    let mut world = arena();
    let cell = CellCoord::new(5, 1);
    assert_eq!(
        run(&mut world, Command::UpgradeTurret { cell }),
        vec![Event::TurretUpgradeRejected {
            cell,
            reason: UpgradeError::MissingTurret,
        }]
    );
}

#[test]
fn selection_changes_are_reported() {
    let mut world = arena();
    let events = run(
        &mut world,
        Command::SetSelectedAction {
            action: PlayerAction::PlaceTurret,
        },
    );
    assert_eq!(
        events,
        vec![Event::SelectionChanged {
            action: PlayerAction::PlaceTurret,
            turret_kind: None,
        }]
    );

    let _ = run(
        &mut world,
        Command::SetSelectedTurretKind {
            kind: Some(TurretKind::Slowness),
        },
    );
    assert_eq!(
        query::selection(&world),
        (PlayerAction::PlaceTurret, Some(TurretKind::Slowness))
    );
}

#[test]
fn finished_game_rejects_building() {
    let mut world = arena();
    let cell = CellCoord::new(0, 1);
    let _ = placed_handle(&place(&mut world, TurretKind::Shooter, 0, 1));

    let events = run(&mut world, Command::WavesExhausted);
    assert_eq!(
        events,
        vec![
            Event::WavesCompleted,
            Event::GameEnded {
                phase: GamePhase::Won
            },
        ]
    );

    assert_eq!(
        rejection(&place(&mut world, TurretKind::Shooter, 1, 1)),
        Some(PlacementError::GameOver)
    );
    assert_eq!(
        run(&mut world, Command::UpgradeTurret { cell }),
        vec![Event::TurretUpgradeRejected {
            cell,
            reason: UpgradeError::GameOver,
        }]
    );
}

#[test]
fn cells_and_world_positions_convert_both_ways() {
    let world = arena();
    let cell = CellCoord::new(3, 1);

    assert_eq!(query::world_center_of(&world, cell), Some(Vec2::new(3.5, 1.5)));
    assert_eq!(query::cell_at(&world, Vec2::new(3.9, 1.1)), Some(cell));
    assert_eq!(query::cell_at(&world, Vec2::new(-0.1, 0.5)), None);
    assert_eq!(query::cell_at(&world, Vec2::new(9.5, 0.5)), None);
    assert_eq!(query::world_center_of(&world, CellCoord::new(9, 0)), None);
}
