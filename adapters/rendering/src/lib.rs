#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Path Defence adapters.
//!
//! The simulation never draws anything itself. Adapters pull read-only views
//! out of the world each frame, fold them into a [`Scene`] with
//! [`compose_scene`], and hand the scene to a [`RenderingBackend`]. Scene
//! composition is pure so any backend presents the same frame for the same
//! world state.

use anyhow::Result as AnyResult;
use glam::Vec2;
use path_defence_core::{
    BeamSnapshot, EnemyClass, EnemyId, EnemyView, GameStatus, ProjectileId, ProjectileView,
    TowerId, TowerKind, TowerView, WorldPoint, CELL_LENGTH,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a replacement alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Describes the square cell grid that composes the play field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the cell length is not positive.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }
}

/// Polyline traced along the centre of the enemy path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPresentation {
    /// Waypoints of the path expressed in world units.
    pub points: Vec<Vec2>,
    /// Stroke color of the path ribbon.
    pub color: Color,
    /// Stroke width of the path ribbon in world units.
    pub thickness: f32,
}

/// Enemy rendered as a filled circle with a health bar above it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySprite {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Centre of the sprite in world units.
    pub position: Vec2,
    /// Radius of the sprite body in world units.
    pub radius: f32,
    /// Fill color of the sprite body.
    pub color: Color,
    /// Remaining health as a fraction of maximum health.
    pub health_fraction: f32,
    /// Overlay tint describing an active status, if any.
    pub status_tint: Option<Color>,
}

/// Tower rendered as a rotated sprite within its cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSprite {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of the rendered tower.
    pub kind: TowerKind,
    /// Level the tower holds, starting at one.
    pub level: u8,
    /// Centre of the sprite in world units.
    pub position: Vec2,
    /// Barrel heading in radians.
    pub angle: f32,
    /// Fill color of the sprite body.
    pub color: Color,
    /// Remaining cooldown as a fraction of the firing interval.
    pub cooldown_fraction: f32,
}

/// Projectile rendered as a small dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileDot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Centre of the dot in world units.
    pub position: Vec2,
    /// Fill color matching the launching tower.
    pub color: Color,
}

/// World-space line segment describing an active beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamLine {
    /// Tower projecting the beam.
    pub tower: TowerId,
    /// Start of the beam in world units.
    pub from: Vec2,
    /// End of the beam in world units.
    pub to: Vec2,
    /// Damage output as a multiple of the beam's base output.
    pub intensity: f32,
}

/// Session numbers shown in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudStatus {
    /// Gold currently held by the player.
    pub gold: u32,
    /// Lives remaining before the session ends.
    pub lives: u32,
    /// One-based index of the current wave, zero before the first.
    pub wave: u32,
    /// Score accumulated this session.
    pub score: u32,
    /// Whether the simulation clock is paused.
    pub paused: bool,
    /// Whole-number multiplier applied to every tick.
    pub speed_multiplier: u32,
    /// Whether the session has ended.
    pub game_over: bool,
}

/// Scene description combining the grid, path and all field inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Cell grid that composes the play area.
    pub grid: GridPresentation,
    /// Path ribbon enemies walk along.
    pub path: PathPresentation,
    /// Enemies currently on the field.
    pub enemies: Vec<EnemySprite>,
    /// Towers currently on the field.
    pub towers: Vec<TowerSprite>,
    /// Projectiles currently in flight.
    pub projectiles: Vec<ProjectileDot>,
    /// Beams currently locked onto enemies.
    pub beams: Vec<BeamLine>,
    /// Session numbers for the heads-up display.
    pub hud: HudStatus,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Path Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and may
    /// replace the scene contents before presentation, allowing adapters to
    /// feed fresh world snapshots every frame.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Folds read-only world views into a renderable scene.
#[must_use]
pub fn compose_scene(
    grid: GridPresentation,
    waypoints: &[WorldPoint],
    status: GameStatus,
    enemies: &EnemyView,
    towers: &TowerView,
    projectiles: &ProjectileView,
    beams: &[BeamSnapshot],
) -> Scene {
    let path = PathPresentation {
        points: waypoints.iter().map(|point| to_vec2(*point)).collect(),
        color: PATH_COLOR,
        thickness: grid.cell_length * 0.6,
    };

    let enemy_sprites = enemies
        .iter()
        .map(|enemy| EnemySprite {
            id: enemy.id,
            position: to_vec2(enemy.position),
            radius: enemy_radius(enemy.class, grid.cell_length),
            color: enemy_color(enemy.class),
            health_fraction: if enemy.max_health > 0.0 {
                (enemy.health / enemy.max_health).clamp(0.0, 1.0)
            } else {
                0.0
            },
            status_tint: status_tint(enemy.slowed, enemy.poisoned, enemy.raging),
        })
        .collect();

    let tower_sprites = towers
        .iter()
        .map(|tower| TowerSprite {
            id: tower.id,
            kind: tower.kind,
            level: tower.level,
            position: to_vec2(tower.position),
            angle: tower.angle,
            color: tower_color(tower.kind),
            cooldown_fraction: if tower.fire_interval_ms > 0 {
                (tower.cooldown_remaining_ms as f32 / tower.fire_interval_ms as f32)
                    .clamp(0.0, 1.0)
            } else {
                0.0
            },
        })
        .collect();

    let projectile_dots = projectiles
        .iter()
        .map(|projectile| ProjectileDot {
            id: projectile.id,
            position: to_vec2(projectile.position),
            color: tower_color(projectile.tower_kind).lighten(0.35),
        })
        .collect();

    let beam_lines = beams
        .iter()
        .map(|beam| BeamLine {
            tower: beam.tower,
            from: to_vec2(beam.from),
            to: to_vec2(beam.to),
            intensity: beam.intensity,
        })
        .collect();

    Scene {
        grid,
        path,
        enemies: enemy_sprites,
        towers: tower_sprites,
        projectiles: projectile_dots,
        beams: beam_lines,
        hud: HudStatus {
            gold: status.gold,
            lives: status.lives,
            wave: status.wave,
            score: status.score,
            paused: status.paused,
            speed_multiplier: status.speed_multiplier,
            game_over: status.game_over,
        },
    }
}

/// Returns the default grid descriptor matching the world's cell metrics.
pub fn default_grid(columns: u32, rows: u32) -> std::result::Result<GridPresentation, RenderingError> {
    GridPresentation::new(columns, rows, CELL_LENGTH, GRID_LINE_COLOR)
}

const GRID_LINE_COLOR: Color = Color::from_rgb_u8(52, 58, 74);
const PATH_COLOR: Color = Color::from_rgb_u8(94, 84, 60);

const SLOW_TINT: Color = Color::new(0.45, 0.75, 1.0, 0.5);
const POISON_TINT: Color = Color::new(0.45, 0.95, 0.45, 0.5);
const RAGE_TINT: Color = Color::new(1.0, 0.35, 0.25, 0.5);

fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

/// Slow wins over poison and rage so freeze feedback stays readable.
fn status_tint(slowed: bool, poisoned: bool, raging: bool) -> Option<Color> {
    if slowed {
        Some(SLOW_TINT)
    } else if poisoned {
        Some(POISON_TINT)
    } else if raging {
        Some(RAGE_TINT)
    } else {
        None
    }
}

fn enemy_radius(class: EnemyClass, cell_length: f32) -> f32 {
    let factor = match class {
        EnemyClass::Spawnling => 0.14,
        EnemyClass::Swarm | EnemyClass::Fast => 0.2,
        EnemyClass::Basic | EnemyClass::Stealth | EnemyClass::Mutant => 0.26,
        EnemyClass::Tank | EnemyClass::Mech => 0.34,
        EnemyClass::Elite => 0.4,
        EnemyClass::Boss => 0.46,
    };
    cell_length * factor
}

fn enemy_color(class: EnemyClass) -> Color {
    match class {
        EnemyClass::Basic => Color::from_rgb_u8(214, 69, 65),
        EnemyClass::Fast => Color::from_rgb_u8(244, 179, 80),
        EnemyClass::Tank => Color::from_rgb_u8(120, 90, 170),
        EnemyClass::Swarm => Color::from_rgb_u8(240, 130, 180),
        EnemyClass::Mutant => Color::from_rgb_u8(110, 190, 90),
        EnemyClass::Mech => Color::from_rgb_u8(130, 140, 150),
        EnemyClass::Stealth => Color::from_rgb_u8(90, 110, 140),
        EnemyClass::Elite => Color::from_rgb_u8(230, 200, 60),
        EnemyClass::Boss => Color::from_rgb_u8(160, 40, 60),
        EnemyClass::Spawnling => Color::from_rgb_u8(240, 160, 190),
    }
}

fn tower_color(kind: TowerKind) -> Color {
    match kind {
        TowerKind::Basic => Color::from_rgb_u8(120, 160, 220),
        TowerKind::Heavy => Color::from_rgb_u8(180, 120, 80),
        TowerKind::Fast => Color::from_rgb_u8(110, 210, 200),
        TowerKind::Cryo => Color::from_rgb_u8(140, 200, 255),
        TowerKind::Sniper => Color::from_rgb_u8(90, 90, 120),
        TowerKind::Bomber => Color::from_rgb_u8(200, 150, 60),
        TowerKind::Venom => Color::from_rgb_u8(120, 200, 90),
        TowerKind::Arc => Color::from_rgb_u8(180, 180, 255),
        TowerKind::Pulse => Color::from_rgb_u8(220, 120, 220),
        TowerKind::Laser => Color::from_rgb_u8(255, 110, 110),
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cell length must be positive to avoid a degenerate grid.
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{EnemySnapshot, GridCoord, TargetMode, TowerSnapshot};

    fn grid() -> GridPresentation {
        default_grid(20, 15).expect("positive cell length")
    }

    fn status() -> GameStatus {
        GameStatus {
            gold: 200,
            lives: 20,
            wave: 3,
            score: 640,
            wave_in_progress: true,
            game_over: false,
            paused: false,
            speed_multiplier: 2,
            difficulty: path_defence_core::Difficulty::Normal,
            map_index: 0,
        }
    }

    fn enemy(id: u32, health: f32, slowed: bool, poisoned: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            class: EnemyClass::Basic,
            position: WorldPoint::new(60.0, 300.0),
            health,
            max_health: 100.0,
            path_index: 0,
            progress: 20.0,
            speed: 51.0,
            armor: 0.0,
            slowed,
            poisoned,
            raging: false,
            stealthy: false,
        }
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(100, 150, 200).lighten(0.5);
        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 150.0 / 255.0);
        assert!(color.blue > 200.0 / 255.0);
        assert!((Color::from_rgb_u8(10, 20, 30).lighten(1.0).red - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn grid_rejects_non_positive_cell_length() {
        let error = GridPresentation::new(20, 15, 0.0, GRID_LINE_COLOR)
            .expect_err("zero cell length must be rejected");
        assert!(matches!(error, RenderingError::InvalidCellLength { .. }));
    }

    #[test]
    fn scene_maps_health_fractions_and_status_tints() {
        let scene = compose_scene(
            grid(),
            &[WorldPoint::new(20.0, 300.0), WorldPoint::new(180.0, 300.0)],
            status(),
            &EnemyView::from_snapshots(vec![
                enemy(1, 25.0, false, false),
                enemy(2, 100.0, true, true),
            ]),
            &TowerView::from_snapshots(Vec::new()),
            &ProjectileView::from_snapshots(Vec::new()),
            &[],
        );

        assert_eq!(scene.path.points.len(), 2);
        assert_eq!(scene.enemies.len(), 2);
        assert!((scene.enemies[0].health_fraction - 0.25).abs() < f32::EPSILON);
        assert!(scene.enemies[0].status_tint.is_none());
        // Slow takes precedence over poison in the overlay.
        assert_eq!(scene.enemies[1].status_tint, Some(SLOW_TINT));
        assert_eq!(scene.hud.gold, 200);
        assert_eq!(scene.hud.speed_multiplier, 2);
    }

    #[test]
    fn scene_maps_tower_cooldown_fractions() {
        let tower = TowerSnapshot {
            id: TowerId::new(0),
            kind: TowerKind::Sniper,
            level: 2,
            cell: GridCoord::new(1, 1),
            position: WorldPoint::new(60.0, 60.0),
            angle: 1.2,
            target: None,
            target_mode: TargetMode::First,
            damage: 40.0,
            range: 180.0,
            fire_interval_ms: 2000,
            cooldown_remaining_ms: 500,
            shots_fired: 4,
            pulses_fired: 0,
            kills: 2,
            total_damage: 160.0,
            detects_stealth: true,
        };
        let scene = compose_scene(
            grid(),
            &[],
            status(),
            &EnemyView::from_snapshots(Vec::new()),
            &TowerView::from_snapshots(vec![tower]),
            &ProjectileView::from_snapshots(Vec::new()),
            &[],
        );
        assert_eq!(scene.towers.len(), 1);
        assert!((scene.towers[0].cooldown_fraction - 0.25).abs() < f32::EPSILON);
        assert!((scene.towers[0].angle - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn beams_survive_composition_in_world_units() {
        let beam = BeamSnapshot {
            tower: TowerId::new(3),
            from: WorldPoint::new(60.0, 60.0),
            to: WorldPoint::new(140.0, 300.0),
            intensity: 2.0,
        };
        let scene = compose_scene(
            grid(),
            &[],
            status(),
            &EnemyView::from_snapshots(Vec::new()),
            &TowerView::from_snapshots(Vec::new()),
            &ProjectileView::from_snapshots(Vec::new()),
            &[beam],
        );
        assert_eq!(
            scene.beams,
            vec![BeamLine {
                tower: TowerId::new(3),
                from: Vec2::new(60.0, 60.0),
                to: Vec2::new(140.0, 300.0),
                intensity: 2.0,
            }]
        );
    }

    #[test]
    fn boss_sprites_dwarf_spawnlings() {
        assert!(enemy_radius(EnemyClass::Boss, CELL_LENGTH) > enemy_radius(EnemyClass::Spawnling, CELL_LENGTH) * 3.0);
    }
}
