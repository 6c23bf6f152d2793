#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that plays complete Path Defence sessions.
//!
//! The binary wires the pure systems around the authoritative world in the
//! canonical order: targeting, combat, tick, roster generation. Between
//! waves a simple builder fills the field from a fixed construction plan,
//! so a run needs no interactive input. The end-of-run report and ASCII
//! board are printed to stdout.

mod save_transfer;
mod tuning_overlay;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use path_defence_core::{
    tuning::Tuning, Command, Difficulty, Event, GridCoord, TowerId, TowerKind,
};
use path_defence_rendering::{compose_scene, default_grid, Scene};
use path_defence_system_analytics::Analytics;
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_system_wave_generation::WaveGeneration;
use path_defence_world::{apply, query, World};

use save_transfer::SaveTransfer;

/// Simulated time per tick in milliseconds.
const TICK_MS: u64 = 16;
/// Upper bound on simulated time per wave before the run aborts.
const WAVE_TIMEOUT_MS: u64 = 600_000;

/// Construction order attempted by the automatic builder.
const BUILD_PLAN: [TowerKind; 10] = [
    TowerKind::Basic,
    TowerKind::Cryo,
    TowerKind::Heavy,
    TowerKind::Sniper,
    TowerKind::Venom,
    TowerKind::Arc,
    TowerKind::Fast,
    TowerKind::Bomber,
    TowerKind::Pulse,
    TowerKind::Laser,
];

/// Plays headless Path Defence sessions and prints an end-of-run report.
#[derive(Debug, Parser)]
#[command(name = "path-defence", version, about)]
struct Cli {
    /// Number of waves to simulate before stopping.
    #[arg(long, default_value_t = 10)]
    waves: u32,

    /// Zero-based index of the built-in map to play.
    #[arg(long, default_value_t = 0)]
    map: u32,

    /// Difficulty preset applied to enemy spawns.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,

    /// Whole-number game speed multiplier, clamped to 1..=3 by the world.
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Seed feeding the combat system's random rolls.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML file overriding parts of the default tuning.
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Save code to resume from instead of starting fresh.
    #[arg(long)]
    load: Option<String>,

    /// Print a save code for the finished session.
    #[arg(long, default_value_t = false)]
    save: bool,
}

/// Difficulty presets accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    /// Slower enemies for a relaxed session.
    Easy,
    /// Unmodified enemy statistics.
    Normal,
    /// Faster enemies for a punishing session.
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let tuning = match &cli.tuning {
        Some(path) => tuning_overlay::load_tuning(path)?,
        None => Tuning::default(),
    };
    let mut world = World::with_tuning(tuning);
    let mut analytics = Analytics::new();
    let mut targeting = TowerTargeting::new();
    let mut combat = TowerCombat::new(cli.seed);
    let mut wave_generation = WaveGeneration::new();

    if cli.map > 0 {
        let events = submit(
            &mut world,
            Command::SelectMap { map_index: cli.map },
            &mut analytics,
        );
        if events
            .iter()
            .any(|event| matches!(event, Event::MapSelectionRejected { .. }))
        {
            bail!("map {} is not built in", cli.map);
        }
    }
    let _ = submit(
        &mut world,
        Command::SetDifficulty {
            difficulty: cli.difficulty.into(),
        },
        &mut analytics,
    );
    if cli.speed != 1 {
        let _ = submit(
            &mut world,
            Command::SetGameSpeed {
                multiplier: cli.speed,
            },
            &mut analytics,
        );
    }
    if let Some(code) = &cli.load {
        let transfer = SaveTransfer::decode(code).context("save code rejected")?;
        let events = submit(
            &mut world,
            Command::RestoreSnapshot {
                snapshot: transfer.snapshot,
            },
            &mut analytics,
        );
        if events
            .iter()
            .any(|event| matches!(event, Event::SnapshotRejected { .. }))
        {
            bail!("save code describes a session this world cannot restore");
        }
    }

    let mut builder = AutoBuilder::new();
    'session: for _ in 0..cli.waves {
        builder.build(&mut world, &mut analytics);

        let started = submit(&mut world, Command::StartWave, &mut analytics);
        dispatch_rosters(&mut world, &mut wave_generation, &started, &mut analytics);

        let mut elapsed: u64 = 0;
        while query::game_status(&world).wave_in_progress {
            step(&mut world, &mut targeting, &mut combat, &mut analytics);
            if query::game_status(&world).game_over {
                break 'session;
            }
            elapsed += TICK_MS;
            if elapsed > WAVE_TIMEOUT_MS {
                bail!("wave did not finish within the simulated timeout");
            }
        }
    }

    print_report(&world, &analytics)?;

    if cli.save {
        match query::save_snapshot(&world) {
            Some(snapshot) => println!("save code: {}", SaveTransfer { snapshot }.encode()),
            None => println!("no save code: the session cannot be resumed"),
        }
    }

    Ok(())
}

/// Applies a command and routes the resulting events through analytics.
fn submit(world: &mut World, command: Command, analytics: &mut Analytics) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    analytics.handle(&events);
    events
}

/// Runs one simulation tick in the canonical system order.
fn step(
    world: &mut World,
    targeting: &mut TowerTargeting,
    combat: &mut TowerCombat,
    analytics: &mut Analytics,
) {
    let mut commands = Vec::new();

    let towers = query::tower_view(world);
    let enemies = query::enemy_view(world);
    targeting.handle(&towers, &enemies, &mut commands);
    for command in commands.drain(..) {
        let _ = submit(world, command, analytics);
    }

    let towers = query::tower_view(world);
    let enemies = query::enemy_view(world);
    combat.handle(&towers, &enemies, query::tuning(world), &mut commands);
    for command in commands.drain(..) {
        let _ = submit(world, command, analytics);
    }

    let _ = submit(
        world,
        Command::Tick {
            dt: Duration::from_millis(TICK_MS),
        },
        analytics,
    );
}

/// Answers wave-start announcements with generated rosters.
fn dispatch_rosters(
    world: &mut World,
    wave_generation: &mut WaveGeneration,
    events: &[Event],
    analytics: &mut Analytics,
) {
    let mut generated = Vec::new();
    let difficulty = query::game_status(world).difficulty;
    wave_generation.handle(events, query::tuning(world), difficulty, &mut generated);
    for event in generated {
        if let Event::RosterReady { roster, .. } = event {
            let _ = submit(world, Command::LoadRoster { roster }, analytics);
        }
    }
}

/// Fills the field from [`BUILD_PLAN`], then spends leftovers on upgrades.
///
/// The builder scans cells row by row and lets the world arbitrate every
/// placement, so path cells and occupied cells are skipped via rejection
/// events rather than duplicated validation.
#[derive(Debug, Default)]
struct AutoBuilder {
    cursor: u32,
    plan_index: usize,
}

impl AutoBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn build(&mut self, world: &mut World, analytics: &mut Analytics) {
        let (columns, rows) = query::grid_dimensions(world);
        let total = columns * rows;
        while self.cursor < total {
            let kind = BUILD_PLAN[self.plan_index % BUILD_PLAN.len()];
            let cost = query::tuning(world).towers.get(kind).cost;
            if query::game_status(world).gold < cost {
                break;
            }
            let cell = GridCoord::new(self.cursor % columns, self.cursor / columns);
            let events = submit(world, Command::PlaceTower { kind, cell }, analytics);
            self.cursor += 1;
            if events
                .iter()
                .any(|event| matches!(event, Event::TowerPlaced { .. }))
            {
                self.plan_index += 1;
            }
        }

        let ids: Vec<TowerId> = query::tower_view(world).iter().map(|tower| tower.id).collect();
        for tower in ids {
            // The world rejects upgrades past the level cap or the gold on hand.
            let _ = submit(world, Command::UpgradeTower { tower }, analytics);
        }
    }
}

fn print_report(world: &World, analytics: &Analytics) -> anyhow::Result<()> {
    let status = query::game_status(world);
    let report = analytics.report();

    println!(
        "wave {} | gold {} | lives {} | score {}",
        status.wave, status.gold, status.lives, status.score
    );
    println!(
        "kills {} | leaks {} | waves cleared {} | bounty gold {} | bonus gold {}",
        report.kills, report.leaks, report.waves_cleared, report.bounty_gold, report.bonus_gold
    );
    for (tower, kills) in analytics.top_towers(5) {
        println!("  tower #{} credited with {} kills", tower.get(), kills);
    }
    if let Some(score) = report.final_score {
        println!("game over with final score {score}");
    }

    let (columns, rows) = query::grid_dimensions(world);
    let scene = compose_scene(
        default_grid(columns, rows)?,
        &query::path_waypoints(world),
        status,
        &query::enemy_view(world),
        &query::tower_view(world),
        &query::projectile_view(world),
        &query::beam_snapshots(world),
    );
    println!("{}", render_ascii(&scene));

    Ok(())
}

/// Renders the scene as one character per grid cell.
fn render_ascii(scene: &Scene) -> String {
    let columns = scene.grid.columns as usize;
    let rows = scene.grid.rows as usize;
    let cell_length = scene.grid.cell_length;
    let mut cells = vec![b'.'; columns * rows];

    let mut mark = |x: f32, y: f32, glyph: u8| {
        let column = (x / cell_length).floor() as i64;
        let row = (y / cell_length).floor() as i64;
        if (0..columns as i64).contains(&column) && (0..rows as i64).contains(&row) {
            cells[row as usize * columns + column as usize] = glyph;
        }
    };

    for pair in scene.path.points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let steps = ((to - from).length() / cell_length).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let point = from.lerp(to, i as f32 / steps as f32);
            mark(point.x, point.y, b'#');
        }
    }
    for tower in &scene.towers {
        mark(tower.position.x, tower.position.y, tower_glyph(tower.kind));
    }
    for enemy in &scene.enemies {
        mark(enemy.position.x, enemy.position.y, b'o');
    }

    let mut board = String::with_capacity(rows * (columns + 1));
    for row in 0..rows {
        for column in 0..columns {
            board.push(char::from(cells[row * columns + column]));
        }
        board.push('\n');
    }
    board
}

const fn tower_glyph(kind: TowerKind) -> u8 {
    match kind {
        TowerKind::Basic => b'B',
        TowerKind::Heavy => b'H',
        TowerKind::Fast => b'F',
        TowerKind::Cryo => b'C',
        TowerKind::Sniper => b'S',
        TowerKind::Bomber => b'O',
        TowerKind::Venom => b'V',
        TowerKind::Arc => b'A',
        TowerKind::Pulse => b'P',
        TowerKind::Laser => b'L',
    }
}
