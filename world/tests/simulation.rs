//! Integration coverage for the authoritative world.

use std::time::Duration;

use path_defence_core::{
    tuning::Tuning, Command, DeliveryMode, EnemyClass, Event, GridCoord, ImpactEffects,
    PlacementError, ProjectileSpawn, RemovalError, Roster, SpawnConfig, TowerId, TowerKind,
    UpgradeError,
};
use path_defence_world::{apply, query, World};

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, ms: u64) -> Vec<Event> {
    submit(
        world,
        Command::Tick {
            dt: Duration::from_millis(ms),
        },
    )
}

fn walker(max_health: f32, speed: f32, delay_ms: u32) -> SpawnConfig {
    SpawnConfig {
        class: EnemyClass::Basic,
        max_health,
        speed,
        armor: 0.0,
        regen_per_second: 0.0,
        reward: 8,
        score: 10,
        slow_immune: false,
        stealthy: false,
        rage_capable: false,
        splits_on_death: false,
        delay_ms,
    }
}

fn start_wave_with(world: &mut World, entries: Vec<SpawnConfig>) {
    let events = submit(world, Command::StartWave);
    let wave = events
        .iter()
        .find_map(|event| match event {
            Event::WaveStarted { wave } => Some(*wave),
            _ => None,
        })
        .expect("wave starts");
    let _ = submit(world, Command::LoadRoster {
        roster: Roster { wave, entries },
    });
}

#[test]
fn placement_is_validated_in_document_order() {
    let mut world = World::new();

    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(25, 3),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::OutOfBounds,
            ..
        }]
    ));

    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(4, 5),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::OnPath,
            ..
        }]
    ));

    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Sniper,
            cell: GridCoord::new(1, 1),
        },
    );
    assert!(matches!(events.as_slice(), [Event::TowerPlaced { .. }]));

    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::Occupied,
            ..
        }]
    ));

    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Heavy,
            cell: GridCoord::new(2, 1),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::InsufficientGold,
            ..
        }]
    ));
}

#[test]
fn leaked_wave_still_completes_and_pays_reduced_bonus() {
    let mut world = World::new();
    start_wave_with(&mut world, vec![walker(30.0, 400.0, 0)]);

    let mut leaked = false;
    let mut completed = None;
    for _ in 0..200 {
        for event in tick(&mut world, 100) {
            match event {
                Event::EnemyLeaked {
                    lives_remaining, ..
                } => {
                    leaked = true;
                    assert_eq!(lives_remaining, 19);
                }
                Event::WaveCompleted { bonus, .. } => completed = Some(bonus),
                _ => {}
            }
        }
        if completed.is_some() {
            break;
        }
    }
    assert!(leaked);
    let bonus = completed.expect("wave completes");
    assert_eq!(bonus.base, 42);
    assert_eq!(bonus.no_leak, 0);
    assert_eq!(bonus.interest, 10);
    assert_eq!(query::game_status(&world).gold, 252);
}

#[test]
fn cleared_wave_pays_the_no_leak_bonus() {
    let mut world = World::new();
    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Pulse,
            cell: GridCoord::new(1, 6),
        },
    );
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, .. }] => *tower,
        other => panic!("unexpected events: {other:?}"),
    };

    start_wave_with(&mut world, vec![walker(30.0, 20.0, 0)]);
    let _ = tick(&mut world, 50);
    let _ = submit(
        &mut world,
        Command::PulseAura {
            tower,
            damage: 100.0,
        },
    );

    let events = tick(&mut world, 50);
    let bonus = events
        .iter()
        .find_map(|event| match event {
            Event::WaveCompleted { bonus, .. } => Some(*bonus),
            _ => None,
        })
        .expect("wave completes");
    assert_eq!(bonus.no_leak, 25);
    // 200 - 110 tower + 8 reward = 98 held at completion time.
    assert_eq!(bonus.interest, 4);
    let status = query::game_status(&world);
    assert_eq!(status.gold, 98 + bonus.total());
    // Kill score 10 plus the wave-completion increment of wave * 10.
    assert_eq!(status.score, 20);
}

#[test]
fn session_ends_when_the_last_life_is_lost() {
    let mut tuning = Tuning::default();
    tuning.economy.starting_lives = 1;
    let mut world = World::with_tuning(tuning);
    start_wave_with(&mut world, vec![walker(30.0, 400.0, 0)]);

    let mut over = false;
    for _ in 0..200 {
        for event in tick(&mut world, 100) {
            if matches!(event, Event::GameOver { .. }) {
                over = true;
            }
        }
        if over {
            break;
        }
    }
    assert!(over);
    assert!(query::game_status(&world).game_over);

    // The clock halts: further ticks are ignored entirely.
    assert!(tick(&mut world, 100).is_empty());
}

#[test]
fn upgrade_and_sell_settle_the_expected_gold() {
    let mut world = World::new();
    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, .. }] => *tower,
        other => panic!("unexpected events: {other:?}"),
    };
    assert_eq!(query::game_status(&world).gold, 150);

    let events = submit(&mut world, Command::UpgradeTower { tower });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerUpgraded {
            level: 2,
            cost: 75,
            ..
        }]
    ));
    assert_eq!(query::game_status(&world).gold, 75);

    let events = submit(&mut world, Command::SellTower { tower });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerSold { refund: 62, .. }]
    ));
    assert_eq!(query::game_status(&world).gold, 137);

    let events = submit(&mut world, Command::SellTower { tower });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerRemovalRejected {
            reason: RemovalError::MissingTower,
            ..
        }]
    ));
}

#[test]
fn upgrades_stop_at_level_three() {
    let mut tuning = Tuning::default();
    tuning.economy.starting_gold = 10_000;
    let mut world = World::with_tuning(tuning);
    let events = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, .. }] => *tower,
        other => panic!("unexpected events: {other:?}"),
    };
    let _ = submit(&mut world, Command::UpgradeTower { tower });
    let _ = submit(&mut world, Command::UpgradeTower { tower });
    let events = submit(&mut world, Command::UpgradeTower { tower });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerUpgradeRejected {
            reason: UpgradeError::MaxLevel,
            ..
        }]
    ));
}

#[test]
fn chain_damage_falls_off_per_bounce() {
    let mut world = World::new();
    start_wave_with(
        &mut world,
        vec![
            walker(1000.0, 10.0, 0),
            walker(1000.0, 10.0, 0),
            walker(1000.0, 10.0, 0),
        ],
    );
    let _ = tick(&mut world, 20);
    assert_eq!(query::enemy_view(&world).iter().count(), 3);
    let target = query::enemy_view(&world)
        .iter()
        .next()
        .expect("enemy spawned")
        .id;

    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Arc,
            cell: GridCoord::new(1, 6),
        },
    );
    let _ = submit(
        &mut world,
        Command::FireProjectile {
            tower: TowerId::new(0),
            shots: vec![ProjectileSpawn {
                target,
                damage: 100.0,
                speed: 100_000.0,
                delivery: DeliveryMode::Chain {
                    bounces: 2,
                    range: 90.0,
                    falloff: 0.65,
                    effects: ImpactEffects::default(),
                },
            }],
        },
    );
    let _ = tick(&mut world, 20);

    let mut losses: Vec<f32> = query::enemy_view(&world)
        .iter()
        .map(|enemy| enemy.max_health - enemy.health)
        .collect();
    losses.sort_by(|a, b| b.partial_cmp(a).expect("finite"));
    assert!((losses[0] - 100.0).abs() < 1e-2);
    assert!((losses[1] - 65.0).abs() < 1e-2);
    assert!((losses[2] - 42.25).abs() < 1e-2);
}

#[test]
fn splash_ignores_armour_while_single_shots_respect_it() {
    let mut world = World::new();
    let mut armoured = walker(1000.0, 10.0, 0);
    armoured.armor = 0.4;
    start_wave_with(&mut world, vec![armoured]);
    let _ = tick(&mut world, 20);
    let target = query::enemy_view(&world)
        .iter()
        .next()
        .expect("enemy spawned")
        .id;

    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Heavy,
            cell: GridCoord::new(1, 6),
        },
    );
    let _ = submit(
        &mut world,
        Command::FireProjectile {
            tower: TowerId::new(0),
            shots: vec![ProjectileSpawn {
                target,
                damage: 100.0,
                speed: 100_000.0,
                delivery: DeliveryMode::Single {
                    effects: ImpactEffects::default(),
                },
            }],
        },
    );
    let _ = tick(&mut world, 20);
    let health = query::enemy_view(&world)
        .iter()
        .next()
        .expect("enemy alive")
        .health;
    assert!((1000.0 - health - 60.0).abs() < 1e-2);

    let _ = submit(
        &mut world,
        Command::FireProjectile {
            tower: TowerId::new(0),
            shots: vec![ProjectileSpawn {
                target,
                damage: 100.0,
                speed: 100_000.0,
                delivery: DeliveryMode::Splash {
                    radius: 75.0,
                    shockwave: None,
                    pool: None,
                },
            }],
        },
    );
    let _ = tick(&mut world, 20);
    let after = query::enemy_view(&world)
        .iter()
        .next()
        .expect("enemy alive")
        .health;
    assert!((health - after - 100.0).abs() < 1e-2);
}

#[test]
fn swarm_enemies_split_into_spawnlings() {
    let mut world = World::new();
    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Pulse,
            cell: GridCoord::new(1, 6),
        },
    );
    let mut swarm = walker(40.0, 20.0, 0);
    swarm.class = EnemyClass::Swarm;
    swarm.splits_on_death = true;
    start_wave_with(&mut world, vec![swarm]);
    let _ = tick(&mut world, 50);

    let events = submit(
        &mut world,
        Command::PulseAura {
            tower: TowerId::new(0),
            damage: 100.0,
        },
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));

    let view = query::enemy_view(&world);
    let spawnlings: Vec<_> = view
        .iter()
        .filter(|enemy| enemy.class == EnemyClass::Spawnling)
        .collect();
    assert_eq!(spawnlings.len(), 2);
    for spawnling in spawnlings {
        assert!((spawnling.max_health - 10.0).abs() < 1e-3);
        assert!((spawnling.speed - 24.0).abs() < 1e-3);
    }
}

#[test]
fn game_speed_scales_simulated_time_consistently() {
    let mut fast = World::new();
    let mut slow = World::new();
    start_wave_with(&mut fast, vec![walker(100.0, 60.0, 0)]);
    start_wave_with(&mut slow, vec![walker(100.0, 60.0, 0)]);
    let _ = submit(&mut fast, Command::SetGameSpeed { multiplier: 2 });

    for _ in 0..10 {
        let _ = tick(&mut fast, 100);
        let _ = tick(&mut slow, 200);
    }

    let a = query::enemy_view(&fast)
        .iter()
        .next()
        .expect("enemy alive")
        .position;
    let b = query::enemy_view(&slow)
        .iter()
        .next()
        .expect("enemy alive")
        .position;
    assert!(a.distance_to(b) < 1e-2);
}

#[test]
fn pausing_suspends_the_clock_and_pending_spawns() {
    let mut world = World::new();
    start_wave_with(&mut world, vec![walker(100.0, 60.0, 500)]);
    let _ = submit(&mut world, Command::SetPaused { paused: true });
    for _ in 0..20 {
        assert!(tick(&mut world, 100).is_empty());
    }
    assert_eq!(query::enemy_view(&world).iter().count(), 0);

    let _ = submit(&mut world, Command::SetPaused { paused: false });
    let mut spawned = false;
    for _ in 0..6 {
        spawned |= tick(&mut world, 100)
            .iter()
            .any(|event| matches!(event, Event::EnemySpawned { .. }));
    }
    assert!(spawned);
}

#[test]
fn map_switch_clears_towers_and_is_blocked_mid_wave() {
    let mut world = World::new();
    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    start_wave_with(&mut world, vec![walker(100.0, 60.0, 0)]);

    let events = submit(&mut world, Command::SelectMap { map_index: 1 });
    assert!(matches!(
        events.as_slice(),
        [Event::MapSelectionRejected { .. }]
    ));

    let mut world = World::new();
    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    let events = submit(&mut world, Command::SelectMap { map_index: 1 });
    assert!(matches!(events.as_slice(), [Event::MapSelected { map_index: 1 }]));
    assert_eq!(query::tower_view(&world).iter().count(), 0);
}

#[test]
fn save_snapshot_round_trips_between_waves() {
    let mut world = World::new();
    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Sniper,
            cell: GridCoord::new(2, 2),
        },
    );
    let snapshot = query::save_snapshot(&world).expect("idle world snapshots");
    assert_eq!(snapshot.gold, 50);
    assert_eq!(snapshot.towers.len(), 1);

    let mut restored = World::new();
    let events = submit(
        &mut restored,
        Command::RestoreSnapshot {
            snapshot: snapshot.clone(),
        },
    );
    assert!(matches!(events.as_slice(), [Event::SnapshotRestored { .. }]));
    let towers = query::tower_view(&restored);
    let tower = towers.iter().next().expect("tower restored");
    assert_eq!(tower.kind, TowerKind::Sniper);
    assert_eq!(query::game_status(&restored).gold, 50);

    start_wave_with(&mut restored, vec![walker(100.0, 60.0, 0)]);
    assert!(query::save_snapshot(&restored).is_none());
    let events = submit(&mut restored, Command::RestoreSnapshot { snapshot });
    assert!(matches!(events.as_slice(), [Event::SnapshotRejected { .. }]));
}

#[test]
fn damage_boost_raises_derived_damage_until_it_expires() {
    let mut world = World::new();
    let _ = submit(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCoord::new(1, 1),
        },
    );
    let before = query::tower_view(&world)
        .iter()
        .next()
        .expect("tower placed")
        .damage;
    let _ = submit(
        &mut world,
        Command::ActivateDamageBoost {
            multiplier: 2.0,
            duration: Duration::from_millis(500),
        },
    );
    let during = query::tower_view(&world)
        .iter()
        .next()
        .expect("tower placed")
        .damage;
    assert!((during - before * 2.0).abs() < 1e-3);

    let _ = tick(&mut world, 600);
    let after = query::tower_view(&world)
        .iter()
        .next()
        .expect("tower placed")
        .damage;
    assert!((after - before).abs() < 1e-3);
}
