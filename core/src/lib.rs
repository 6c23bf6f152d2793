#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod tuning;

/// Side length of a single square grid cell expressed in world units.
pub const CELL_LENGTH: f32 = 40.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Selects one of the built-in waypoint maps, clearing all towers.
    SelectMap {
        /// Zero-based index of the map to activate.
        map_index: u32,
    },
    /// Changes the difficulty applied to future enemy spawns.
    SetDifficulty {
        /// Difficulty preset the world should activate.
        difficulty: Difficulty,
    },
    /// Begins the next wave, making the world expect a roster to load.
    StartWave,
    /// Loads a generated spawn roster into the world's spawn schedule.
    LoadRoster {
        /// Roster describing every enemy the wave will spawn.
        roster: Roster,
    },
    /// Requests placement of a tower on the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that will anchor the tower.
        cell: GridCoord,
    },
    /// Requests the sale of an existing tower for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests a level upgrade for an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Changes the targeting mode a tower uses to pick enemies.
    SetTargetMode {
        /// Identifier of the tower to reconfigure.
        tower: TowerId,
        /// Targeting mode the tower should use from now on.
        mode: TargetMode,
    },
    /// Assigns or clears the enemy a tower is tracking.
    AssignTarget {
        /// Identifier of the tower receiving the assignment.
        tower: TowerId,
        /// Enemy the tower should track, or `None` to stand down.
        target: Option<EnemyId>,
    },
    /// Launches one or more projectiles from a tower that just fired.
    FireProjectile {
        /// Identifier of the tower that fired.
        tower: TowerId,
        /// Projectiles produced by the shot, one entry per target.
        shots: Vec<ProjectileSpawn>,
    },
    /// Discharges an area pulse damaging every enemy in a tower's range.
    PulseAura {
        /// Identifier of the pulsing tower.
        tower: TowerId,
        /// Damage applied to each enemy caught in the pulse.
        damage: f32,
    },
    /// Changes the global simulation speed multiplier.
    SetGameSpeed {
        /// Whole-number multiplier applied to every tick, clamped to 1..=3.
        multiplier: u32,
    },
    /// Pauses or resumes the simulation clock.
    SetPaused {
        /// Whether the clock should stand still.
        paused: bool,
    },
    /// Activates a timed global damage multiplier.
    ActivateDamageBoost {
        /// Factor applied to all tower damage while the boost lasts.
        multiplier: f32,
        /// How long the boost remains active in simulated time.
        duration: Duration,
    },
    /// Restores a previously captured save snapshot.
    RestoreSnapshot {
        /// Snapshot describing the session to resume.
        snapshot: SaveSnapshot,
    },
    /// Resets the world to a fresh session on the current map.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new wave started and needs a roster.
    WaveStarted {
        /// One-based index of the wave that started.
        wave: u32,
    },
    /// Carries a generated roster back toward the world.
    RosterReady {
        /// Wave the roster was generated for.
        wave: u32,
        /// Roster describing every enemy the wave will spawn.
        roster: Roster,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Class of the spawned enemy.
        class: EnemyClass,
    },
    /// Confirms that an enemy died and its bounty was settled.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Class of the enemy that died.
        class: EnemyClass,
        /// Tower credited with the kill, if damage was attributable.
        killer: Option<TowerId>,
        /// Gold awarded for the kill.
        reward: u32,
        /// Score awarded for the kill.
        score: u32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Lives remaining after the leak was charged.
        lives_remaining: u32,
    },
    /// Announces that the active wave finished and bonuses were paid.
    WaveCompleted {
        /// One-based index of the completed wave.
        wave: u32,
        /// Bonus gold breakdown paid for the completion.
        bonus: WaveBonus,
    },
    /// Announces that the session ended because all lives were lost.
    GameOver {
        /// Wave that was active when the session ended.
        wave: u32,
        /// Final score of the session.
        score: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: GridCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold and refunded.
    TowerSold {
        /// Identifier of the tower that was sold.
        tower: TowerId,
        /// Gold returned to the player.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerRemovalRejected {
        /// Identifier of the tower targeted for sale.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: RemovalError,
    },
    /// Confirms that a tower advanced to the next level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower now holds.
        level: u8,
        /// Gold spent on the upgrade.
        cost: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower's targeting mode changed.
    TargetModeChanged {
        /// Identifier of the reconfigured tower.
        tower: TowerId,
        /// Mode the tower now uses.
        mode: TargetMode,
    },
    /// Confirms that a tower's tracked enemy changed.
    TargetAssigned {
        /// Identifier of the tower receiving the assignment.
        tower: TowerId,
        /// Enemy the tower now tracks, or `None`.
        target: Option<EnemyId>,
    },
    /// Confirms that the global simulation speed changed.
    GameSpeedChanged {
        /// Multiplier now applied to every tick.
        multiplier: u32,
    },
    /// Confirms that the simulation clock was paused or resumed.
    PausedChanged {
        /// Whether the clock now stands still.
        paused: bool,
    },
    /// Confirms that a timed damage boost became active.
    DamageBoostActivated {
        /// Factor applied to all tower damage while the boost lasts.
        multiplier: f32,
    },
    /// Confirms that a new map became active and the field was cleared.
    MapSelected {
        /// Zero-based index of the activated map.
        map_index: u32,
    },
    /// Reports that a map selection request was rejected.
    MapSelectionRejected {
        /// Zero-based index of the requested map.
        map_index: u32,
        /// Specific reason the selection failed.
        reason: MapError,
    },
    /// Confirms that the difficulty preset changed.
    DifficultyChanged {
        /// Difficulty now applied to future spawns.
        difficulty: Difficulty,
    },
    /// Confirms that a save snapshot was restored.
    SnapshotRestored {
        /// Wave the restored session will start from.
        wave: u32,
    },
    /// Reports that a snapshot restore request was rejected.
    SnapshotRejected {
        /// Specific reason the restore failed.
        reason: RestoreError,
    },
    /// Confirms that the world was reset to a fresh session.
    GameReset,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    ///
    /// Diagonal neighbours sit at distance one, so a distance of one spans
    /// the full eight-cell neighbourhood around a cell.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Returns the world-space centre of the cell.
    #[must_use]
    pub fn centre(self) -> WorldPoint {
        WorldPoint::new(
            (self.column as f32 + 0.5) * CELL_LENGTH,
            (self.row as f32 + 0.5) * CELL_LENGTH,
        )
    }
}

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world position from explicit components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the squared Euclidean distance to another position.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Computes the Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Types of towers that can be constructed beside the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap single-target tower with balanced parameters.
    Basic,
    /// Slow-firing tower dealing splash damage around its impact point.
    Heavy,
    /// Rapid-firing single-target tower with low per-shot damage.
    Fast,
    /// Single-target tower that slows whatever it hits.
    Cryo,
    /// Long-range precision tower that can see stealthy enemies.
    Sniper,
    /// Heavy splash tower with a larger payload and slower cycle.
    Bomber,
    /// Area tower pulsing damage into every enemy within range.
    Pulse,
    /// Single-target tower applying a damage-over-time poison.
    Venom,
    /// Tower whose shots arc between nearby enemies with falloff.
    Arc,
    /// Continuous beam tower whose damage ramps while locked on.
    Laser,
}

impl TowerKind {
    /// Every constructible tower kind in deterministic order.
    pub const ALL: [TowerKind; 10] = [
        TowerKind::Basic,
        TowerKind::Heavy,
        TowerKind::Fast,
        TowerKind::Cryo,
        TowerKind::Sniper,
        TowerKind::Bomber,
        TowerKind::Pulse,
        TowerKind::Venom,
        TowerKind::Arc,
        TowerKind::Laser,
    ];

    /// Returns the combat style governing how the tower deals damage.
    #[must_use]
    pub const fn combat_style(self) -> CombatStyle {
        match self {
            TowerKind::Basic | TowerKind::Fast | TowerKind::Cryo | TowerKind::Sniper
            | TowerKind::Venom => CombatStyle::Single,
            TowerKind::Heavy | TowerKind::Bomber => CombatStyle::Splash,
            TowerKind::Arc => CombatStyle::Chain,
            TowerKind::Pulse => CombatStyle::AuraPulse,
            TowerKind::Laser => CombatStyle::Beam,
        }
    }

    /// Human-readable label used by textual front ends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TowerKind::Basic => "Basic",
            TowerKind::Heavy => "Heavy",
            TowerKind::Fast => "Fast",
            TowerKind::Cryo => "Cryo",
            TowerKind::Sniper => "Sniper",
            TowerKind::Bomber => "Bomber",
            TowerKind::Pulse => "Pulse",
            TowerKind::Venom => "Venom",
            TowerKind::Arc => "Arc",
            TowerKind::Laser => "Laser",
        }
    }
}

/// Damage delivery style a tower kind is built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatStyle {
    /// One projectile damaging exactly one enemy.
    Single,
    /// A projectile damaging every enemy around its impact point.
    Splash,
    /// A projectile whose damage arcs onward to nearby enemies.
    Chain,
    /// No projectile; damage pulses outward from the tower itself.
    AuraPulse,
    /// No projectile; a continuous beam tracks the locked target.
    Beam,
}

/// Strategies a tower can use to choose which enemy to track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// Track the enemy furthest along the path.
    #[default]
    First,
    /// Track the enemy least far along the path.
    Last,
    /// Track the enemy with the most remaining health.
    Strongest,
    /// Track the enemy with the least remaining health.
    Weakest,
}

/// Classes of enemies that can walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    /// Baseline walker with unmodified statistics.
    Basic,
    /// Fragile runner moving far faster than the baseline.
    Fast,
    /// Durable, slow walker immune to slowing effects; rages when near
    /// death.
    Tank,
    /// Fragile unit that splits into spawnlings on death.
    Swarm,
    /// Remnant produced when a swarm unit dies.
    Spawnling,
    /// Regenerating bruiser that heals a fraction of its health each second.
    Mutant,
    /// Armoured machine shrugging off part of all direct damage.
    Mech,
    /// Unit invisible to towers without stealth detection.
    Stealth,
    /// Rare champion that rages below a quarter of its health.
    Elite,
    /// Milestone-wave behemoth combining immunity and rage.
    Boss,
}

/// Difficulty presets scaling the threat of spawned enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slower enemies for a relaxed session.
    Easy,
    /// Unmodified enemy statistics.
    #[default]
    Normal,
    /// Faster enemies for a punishing session.
    Hard,
}

impl Difficulty {
    /// Factor applied to the movement speed of spawned enemies.
    #[must_use]
    pub const fn enemy_speed_multiplier(self) -> f32 {
        match self {
            Difficulty::Easy => 0.85,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// Statistics and capabilities of a single enemy the wave will spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Class of the enemy to spawn.
    pub class: EnemyClass,
    /// Maximum health the enemy starts with.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Fraction of direct damage absorbed by armour, `0.0` for none.
    pub armor: f32,
    /// Fraction of maximum health regenerated per second, `0.0` for none.
    pub regen_per_second: f32,
    /// Gold awarded when the enemy dies.
    pub reward: u32,
    /// Score awarded when the enemy dies.
    pub score: u32,
    /// Whether slowing and freezing effects are ignored.
    pub slow_immune: bool,
    /// Whether only stealth-detecting towers can track the enemy.
    pub stealthy: bool,
    /// Whether the enemy gains speed once pushed below a quarter of its
    /// health.
    pub rage_capable: bool,
    /// Whether the enemy splits into spawnlings on death.
    pub splits_on_death: bool,
    /// Delay after the wave start at which the enemy enters the path.
    pub delay_ms: u32,
}

/// Complete spawn plan for a single wave, sorted by spawn delay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// One-based index of the wave the roster belongs to.
    pub wave: u32,
    /// Spawn entries ordered by ascending delay.
    pub entries: Vec<SpawnConfig>,
}

impl Roster {
    /// Counts the roster entries belonging to the provided class.
    #[must_use]
    pub fn count_of(&self, class: EnemyClass) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.class == class)
            .count()
    }
}

/// Single projectile requested by a tower that fired.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpawn {
    /// Enemy the projectile homes toward.
    pub target: EnemyId,
    /// Damage delivered on impact before armour.
    pub damage: f32,
    /// Flight speed in world units per second.
    pub speed: f32,
    /// How the impact damage is delivered.
    pub delivery: DeliveryMode,
}

/// Delivery behaviour attached to a projectile impact.
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryMode {
    /// Damage exactly the struck enemy.
    Single {
        /// Status effects applied to the struck enemy.
        effects: ImpactEffects,
    },
    /// Damage every enemy within a radius of the impact point.
    Splash {
        /// Radius of the damaged area in world units.
        radius: f32,
        /// Optional outer ring dealing a fraction of the damage.
        shockwave: Option<Shockwave>,
        /// Optional poison applied to every enemy caught in the splash.
        pool: Option<PoisonEffect>,
    },
    /// Damage the struck enemy, then arc onward to nearby enemies.
    Chain {
        /// Number of additional enemies the damage arcs to.
        bounces: u32,
        /// Maximum arc distance between consecutive victims.
        range: f32,
        /// Damage multiplier applied per completed bounce.
        falloff: f32,
        /// Status effects applied to every struck enemy.
        effects: ImpactEffects,
    },
}

/// Outer ring of a splash impact dealing reduced damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shockwave {
    /// Additional radius beyond the inner splash area.
    pub bonus_radius: f32,
    /// Fraction of the impact damage dealt inside the ring.
    pub fraction: f32,
}

/// Status effects a single impact can apply.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImpactEffects {
    /// Slowing effect, if the impact applies one.
    pub slow: Option<SlowEffect>,
    /// Poison effect, if the impact applies one.
    pub poison: Option<PoisonEffect>,
}

/// Timed movement-speed reduction applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowEffect {
    /// Factor applied to the enemy's speed while the effect lasts.
    pub factor: f32,
    /// Lifetime of the effect in milliseconds of simulated time.
    pub duration_ms: u32,
}

/// Timed damage-over-time effect applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoisonEffect {
    /// Damage applied per second of simulated time.
    pub damage_per_second: f32,
    /// Lifetime of the effect in milliseconds of simulated time.
    pub duration_ms: u32,
    /// Whether the poison jumps to one nearby unpoisoned enemy at half
    /// potency when first applied.
    pub spreads: bool,
}

/// Bonus gold paid when a wave completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveBonus {
    /// Flat completion bonus scaled by wave index.
    pub base: u32,
    /// Extra bonus paid when no enemy leaked during the wave.
    pub no_leak: u32,
    /// Interest paid on the gold held at completion time.
    pub interest: u32,
}

impl WaveBonus {
    /// Total gold paid by the bonus.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.base + self.no_leak + self.interest
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the configured grid bounds.
    OutOfBounds,
    /// The requested cell overlaps the enemy path.
    OnPath,
    /// The requested cell already holds a tower.
    Occupied,
    /// The player cannot afford the tower's cost.
    InsufficientGold,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower already sits at the maximum level.
    MaxLevel,
    /// The player cannot afford the upgrade cost.
    InsufficientGold,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Reasons a map selection request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapError {
    /// No built-in map with the provided index exists.
    UnknownMap,
    /// Maps can only change between waves.
    WaveInProgress,
}

/// Reasons a snapshot restore request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestoreError {
    /// Snapshots can only be restored between waves.
    WaveInProgress,
    /// The snapshot references a map that does not exist.
    UnknownMap,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Class of the enemy.
    pub class: EnemyClass,
    /// Current world position of the enemy.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: f32,
    /// Maximum health the enemy spawned with.
    pub max_health: f32,
    /// Index of the path segment the enemy currently walks.
    pub path_index: u32,
    /// Distance travelled along the current segment in world units.
    pub progress: f32,
    /// Effective movement speed including slow and rage modifiers.
    pub speed: f32,
    /// Fraction of direct damage absorbed by armour.
    pub armor: f32,
    /// Whether a slowing or freezing effect is currently active.
    pub slowed: bool,
    /// Whether at least one poison effect is currently active.
    pub poisoned: bool,
    /// Whether the enemy is currently raging.
    pub raging: bool,
    /// Whether only stealth-detecting towers can track the enemy.
    pub stealthy: bool,
}

impl EnemySnapshot {
    /// Scalar measure of path progress used to order enemies front to back.
    ///
    /// Segment indices dominate in-segment distance, so the metric grows
    /// strictly monotonically along the path.
    #[must_use]
    pub fn progress_metric(&self) -> f32 {
        self.path_index as f32 * 10_000.0 + self.progress
    }
}

/// Read-only snapshot describing all enemies on the path.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Level the tower currently holds, starting at one.
    pub level: u8,
    /// Cell the tower occupies.
    pub cell: GridCoord,
    /// World-space centre of the tower.
    pub position: WorldPoint,
    /// Smoothed heading of the tower's barrel in radians.
    pub angle: f32,
    /// Enemy the tower currently tracks, if any.
    pub target: Option<EnemyId>,
    /// Targeting mode the tower uses to pick enemies.
    pub target_mode: TargetMode,
    /// Effective per-shot damage after every active multiplier.
    pub damage: f32,
    /// Effective targeting radius in world units.
    pub range: f32,
    /// Effective interval between shots in milliseconds.
    pub fire_interval_ms: u32,
    /// Milliseconds remaining until the tower may fire again.
    pub cooldown_remaining_ms: u32,
    /// Number of shots the tower has fired this session.
    pub shots_fired: u32,
    /// Number of aura pulses the tower has discharged this session.
    pub pulses_fired: u32,
    /// Number of kills credited to the tower.
    pub kills: u32,
    /// Total damage the tower has dealt.
    pub total_damage: f32,
    /// Whether the tower can track stealthy enemies.
    pub detects_stealth: bool,
}

/// Read-only snapshot describing all towers placed beside the path.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Tower that launched the projectile.
    pub tower: TowerId,
    /// Kind of the launching tower.
    pub tower_kind: TowerKind,
    /// Enemy the projectile homes toward.
    pub target: EnemyId,
    /// Current world position of the projectile.
    pub position: WorldPoint,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an active laser beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamSnapshot {
    /// Tower projecting the beam.
    pub tower: TowerId,
    /// World position the beam originates from.
    pub from: WorldPoint,
    /// World position the beam terminates at.
    pub to: WorldPoint,
    /// Current damage output as a multiple of the beam's base output.
    pub intensity: f32,
}

/// Aggregate session state exposed to adapters in one read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameStatus {
    /// Gold currently held by the player.
    pub gold: u32,
    /// Lives remaining before the session ends.
    pub lives: u32,
    /// One-based index of the current wave, zero before the first.
    pub wave: u32,
    /// Score accumulated this session.
    pub score: u32,
    /// Whether a wave is currently in progress.
    pub wave_in_progress: bool,
    /// Whether the session has ended.
    pub game_over: bool,
    /// Whether the simulation clock is paused.
    pub paused: bool,
    /// Whole-number multiplier applied to every tick.
    pub speed_multiplier: u32,
    /// Difficulty applied to future spawns.
    pub difficulty: Difficulty,
    /// Zero-based index of the active map.
    pub map_index: u32,
}

/// Tower description captured within a save snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedTower {
    /// Cell the tower occupies.
    pub cell: GridCoord,
    /// Kind of the saved tower.
    pub kind: TowerKind,
    /// Level the tower holds, starting at one.
    pub level: u8,
    /// Kills credited to the tower at capture time.
    pub kills: u32,
    /// Total damage dealt by the tower at capture time.
    pub total_damage: f32,
    /// Targeting mode the tower was using.
    pub target_mode: TargetMode,
}

/// Serializable capture of a session taken between waves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Gold held at capture time.
    pub gold: u32,
    /// Lives remaining at capture time.
    pub lives: u32,
    /// Index of the last completed wave.
    pub wave: u32,
    /// Score accumulated at capture time.
    pub score: u32,
    /// Zero-based index of the active map.
    pub map_index: u32,
    /// Difficulty preset active at capture time.
    pub difficulty: Difficulty,
    /// Every tower standing at capture time.
    pub towers: Vec<SavedTower>,
}
