//! Level configuration records and their validation.
//!
//! [`LevelConfig`] mirrors the on-disk format one-to-one and is deliberately
//! permissive. [`LevelConfig::validate`] resolves names to prototypes, converts
//! seconds into [`Duration`] values and rejects inconsistent data, producing a
//! [`Level`] that the world and systems treat as immutable.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, CellKind, PrototypeId, TurretKind};

const DEFAULT_DIRECT_HIT_THRESHOLD: f32 = 0.02;
const DEFAULT_AREA_HIT_THRESHOLD: f32 = 0.2;

/// Errors raised while validating a level configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric field that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: String,
        /// Value found in the configuration.
        value: f32,
    },
    /// A duration field was negative or not finite.
    #[error("{field} is not a valid duration in seconds: {value}")]
    InvalidDuration {
        /// Name of the offending field.
        field: String,
        /// Value found in the configuration.
        value: f32,
    },
    /// Two enemy kinds share a name.
    #[error("enemy `{0}` is defined more than once")]
    DuplicateEnemy(String),
    /// Two turret entries share a kind.
    #[error("turret {0:?} is defined more than once")]
    DuplicateTurret(TurretKind),
    /// A wave references an enemy name that is not defined.
    #[error("wave {wave} references unknown enemy `{name}`")]
    UnknownEnemy {
        /// Zero-based index of the wave.
        wave: usize,
        /// Name that failed to resolve.
        name: String,
    },
    /// A turret declares no levels.
    #[error("turret {0:?} has no levels")]
    MissingLevels(TurretKind),
    /// A turret's `max_level` disagrees with its level table.
    #[error("turret {kind:?} declares max_level {max_level} but defines {defined} levels")]
    MaxLevelMismatch {
        /// Turret kind at fault.
        kind: TurretKind,
        /// Declared maximum level.
        max_level: u32,
        /// Number of level entries present.
        defined: usize,
    },
    /// The enemy path has fewer than two waypoints.
    #[error("enemy path needs at least two waypoints, got {0}")]
    PathTooShort(usize),
    /// A waypoint lies outside the map.
    #[error("waypoint ({column}, {row}) lies outside the map")]
    WaypointOutOfBounds {
        /// Column of the waypoint.
        column: u32,
        /// Row of the waypoint.
        row: u32,
    },
    /// The path crosses a cell that is not a path tile.
    #[error("path crosses ({column}, {row}), which is not a path tile")]
    OffPath {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
    },
    /// The layout rows have different widths.
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The layout contains a glyph with no tile meaning.
    #[error("layout row {row} column {column} contains unknown glyph `{glyph}`")]
    UnknownGlyph {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Character found.
        glyph: char,
    },
    /// The layout has no cells.
    #[error("map layout is empty")]
    EmptyLayout,
    /// A contact zone is anchored outside the map.
    #[error("zone {0} is anchored outside the map")]
    ZoneOutOfBounds(usize),
}

/// On-disk description of a complete level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Starting economy.
    pub game: GameConfig,
    /// Tile layout and enemy path.
    pub map: MapConfig,
    /// Enemy kinds, referenced by name from waves.
    pub enemies: Vec<EnemyConfig>,
    /// Turret kinds available for construction.
    pub turrets: Vec<TurretConfig>,
    /// Waves in the order they are played.
    pub waves: Vec<WaveConfig>,
    /// Static damage and heal zones.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    /// Projectiles to allocate up front per variant.
    #[serde(default)]
    pub projectile_preload: u32,
}

/// Starting economy of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Gold available when the level starts.
    pub initial_gold: u32,
    /// Player health when the level starts.
    pub initial_health: u32,
}

/// Tile layout and path description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Edge length of a square tile in world units.
    pub tile_size: f32,
    /// World position of the grid's top-left corner.
    #[serde(default)]
    pub origin: [f32; 2],
    /// Rows of glyphs: `.` buildable, `#` path, `x` obstacle, space empty.
    pub layout: Vec<String>,
    /// Waypoints as `[column, row]` pairs in travel order.
    pub path: Vec<[u32; 2]>,
}

/// Stats of one enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Name referenced by waves.
    pub name: String,
    /// Maximum hit points.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Gold paid out when the enemy dies.
    pub gold_value: u32,
    /// Health removed from the player when the enemy leaks.
    pub player_damage: u32,
    /// Whether heal effects apply.
    #[serde(default = "default_true")]
    pub healable: bool,
    /// Whether the enemy starts hidden from turrets.
    #[serde(default)]
    pub invisible: bool,
    /// Instances to allocate up front.
    #[serde(default)]
    pub preload: u32,
}

/// Stats of one turret kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretConfig {
    /// Kind described by this entry.
    pub kind: TurretKind,
    /// Gold charged for placement.
    pub cost: u32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Seconds between triggering an attack and releasing the projectile.
    #[serde(default)]
    pub windup: f32,
    /// Projectile fired by the turret.
    pub projectile: ProjectileConfig,
    /// Stat blocks indexed by level, starting at level 1.
    pub levels: Vec<TurretLevelConfig>,
    /// Instances to allocate up front.
    #[serde(default)]
    pub preload: u32,
}

/// Stat block for one turret level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretLevelConfig {
    /// Damage dealt per attack.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Seconds between attacks.
    pub attack_interval: f32,
    /// Gold charged to reach the next level.
    pub upgrade_cost: u32,
    /// Gold refunded when sold at this level.
    pub sell_value: u32,
    /// Visual variant displayed at this level.
    #[serde(default)]
    pub visual_key: String,
}

/// Projectile behaviour and parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ProjectileConfig {
    /// Homing single-target projectile.
    Direct {
        /// Speed in world units per second.
        speed: f32,
        /// Distance at which the projectile counts as arrived.
        #[serde(default = "default_direct_threshold")]
        hit_threshold: f32,
    },
    /// Fixed-trajectory projectile that damages a radius.
    Area {
        /// Speed in world units per second.
        speed: f32,
        /// Radius of the blast.
        radius: f32,
        /// Distance at which the projectile counts as arrived.
        #[serde(default = "default_area_threshold")]
        hit_threshold: f32,
        /// Seconds the spent projectile stays before it is reclaimed.
        #[serde(default)]
        impact_linger: f32,
    },
    /// Fixed-trajectory projectile that leaves a slowing field.
    AreaStatus {
        /// Speed in world units per second.
        speed: f32,
        /// Radius of the field.
        radius: f32,
        /// Distance at which the projectile counts as arrived.
        #[serde(default = "default_area_threshold")]
        hit_threshold: f32,
        /// Fraction of speed removed, in `[0, 1]`.
        slow_factor: f32,
        /// Seconds each application of the slow lasts.
        slow_duration: f32,
        /// Seconds the field stays active after impact.
        field_duration: f32,
    },
}

/// Description of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Name of the enemy kind to spawn.
    pub enemy: String,
    /// Number of enemies in the wave.
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub spacing: f32,
    /// Seconds to wait after the previous wave before the first spawn.
    pub delay: f32,
}

/// Static contact zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Cell the zone is centred on, as `[column, row]`.
    pub cell: [u32; 2],
    /// Radius of the zone in world units.
    pub radius: f32,
    /// Effect applied on contact.
    pub effect: ZoneEffect,
}

/// Effect applied by a contact zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum ZoneEffect {
    /// Deals the given damage once per entry.
    Damage(f32),
    /// Heals the given amount once per entry.
    Heal(f32),
}

/// Validated level ready for simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    /// Gold available at the start.
    pub initial_gold: u32,
    /// Player health at the start.
    pub initial_health: u32,
    /// Tile layout and path.
    pub map: MapSpec,
    /// Enemy kinds indexed by [`PrototypeId`].
    pub enemies: Vec<EnemySpec>,
    /// Turret kinds available for construction.
    pub turrets: BTreeMap<TurretKind, TurretSpec>,
    /// Waves in play order.
    pub waves: Vec<WaveSpec>,
    /// Static contact zones.
    pub zones: Vec<ZoneSpec>,
    /// Projectiles to allocate up front per variant.
    pub projectile_preload: u32,
}

impl Level {
    /// Looks up the enemy kind registered under the prototype.
    #[must_use]
    pub fn enemy(&self, kind: PrototypeId) -> Option<&EnemySpec> {
        usize::try_from(kind.get())
            .ok()
            .and_then(|index| self.enemies.get(index))
    }

    /// Looks up the turret kind configuration.
    #[must_use]
    pub fn turret(&self, kind: TurretKind) -> Option<&TurretSpec> {
        self.turrets.get(&kind)
    }
}

/// Validated tile layout.
#[derive(Clone, Debug, PartialEq)]
pub struct MapSpec {
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// World position of the grid's top-left corner.
    pub origin: Vec2,
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Row-major cell kinds.
    pub cells: Vec<CellKind>,
    /// Waypoint cells in travel order.
    pub path: Vec<CellCoord>,
}

/// Validated enemy kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpec {
    /// Human-readable name.
    pub name: String,
    /// Maximum hit points.
    pub max_health: f32,
    /// Speed in world units per second.
    pub speed: f32,
    /// Gold paid out on death.
    pub gold_value: u32,
    /// Health removed from the player on leak.
    pub player_damage: u32,
    /// Whether heal effects apply.
    pub healable: bool,
    /// Whether the enemy starts hidden.
    pub invisible: bool,
    /// Instances to allocate up front.
    pub preload: u32,
}

/// Validated turret kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TurretSpec {
    /// Kind described.
    pub kind: TurretKind,
    /// Placement price.
    pub cost: u32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Delay between triggering an attack and releasing the projectile.
    pub windup: Duration,
    /// Projectile fired on release.
    pub projectile: ProjectileSpec,
    /// Stat blocks for levels `1..=max_level`.
    pub levels: Vec<LevelStats>,
    /// Instances to allocate up front.
    pub preload: u32,
}

impl TurretSpec {
    /// Returns the stat block for a one-based level.
    #[must_use]
    pub fn level(&self, level: u32) -> Option<&LevelStats> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.levels.get(index)
    }
}

/// Validated turret level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelStats {
    /// Damage per attack.
    pub damage: f32,
    /// Targeting radius.
    pub range: f32,
    /// Time between attacks.
    pub attack_interval: Duration,
    /// Price of the next level.
    pub upgrade_cost: u32,
    /// Refund when sold.
    pub sell_value: u32,
    /// Visual variant key.
    pub visual_key: String,
}

/// Validated projectile behaviour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileSpec {
    /// Homing single-target projectile.
    Direct {
        /// Speed in world units per second.
        speed: f32,
        /// Arrival distance.
        hit_threshold: f32,
    },
    /// Fixed-trajectory blast.
    Area {
        /// Speed in world units per second.
        speed: f32,
        /// Blast radius.
        radius: f32,
        /// Arrival distance.
        hit_threshold: f32,
        /// Time the spent projectile lingers before reclaim.
        impact_linger: Duration,
    },
    /// Fixed-trajectory slowing field.
    AreaStatus {
        /// Speed in world units per second.
        speed: f32,
        /// Field radius.
        radius: f32,
        /// Arrival distance.
        hit_threshold: f32,
        /// Fraction of speed removed.
        slow_factor: f32,
        /// Duration of each slow application.
        slow_duration: Duration,
        /// Lifetime of the field after impact.
        field_duration: Duration,
    },
}

impl ProjectileSpec {
    /// Behaviour variant of the projectile.
    #[must_use]
    pub const fn kind(&self) -> crate::ProjectileKind {
        match self {
            Self::Direct { .. } => crate::ProjectileKind::Direct,
            Self::Area { .. } => crate::ProjectileKind::Area,
            Self::AreaStatus { .. } => crate::ProjectileKind::AreaStatus,
        }
    }
}

/// Validated wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveSpec {
    /// Enemy prototype spawned by the wave.
    pub enemy: PrototypeId,
    /// Number of spawns.
    pub count: u32,
    /// Gap between consecutive spawns.
    pub spacing: Duration,
    /// Wait before the first spawn.
    pub delay: Duration,
}

/// Validated contact zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneSpec {
    /// Cell the zone is centred on.
    pub cell: CellCoord,
    /// Radius in world units.
    pub radius: f32,
    /// Effect applied on contact.
    pub effect: ZoneEffect,
}

impl LevelConfig {
    /// Validates the configuration, producing an immutable [`Level`].
    pub fn validate(self) -> Result<Level, ConfigError> {
        let map = validate_map(&self.map)?;

        let mut enemies = Vec::with_capacity(self.enemies.len());
        for enemy in self.enemies {
            if enemies.iter().any(|known: &EnemySpec| known.name == enemy.name) {
                return Err(ConfigError::DuplicateEnemy(enemy.name));
            }
            let label = format!("enemy `{}`", enemy.name);
            let max_health = positive(&format!("{label} max_health"), enemy.max_health)?;
            let speed = positive(&format!("{label} speed"), enemy.speed)?;
            enemies.push(EnemySpec {
                name: enemy.name,
                max_health,
                speed,
                gold_value: enemy.gold_value,
                player_damage: enemy.player_damage,
                healable: enemy.healable,
                invisible: enemy.invisible,
                preload: enemy.preload,
            });
        }

        let mut turrets = BTreeMap::new();
        for turret in self.turrets {
            let kind = turret.kind;
            let spec = validate_turret(turret)?;
            if turrets.insert(kind, spec).is_some() {
                return Err(ConfigError::DuplicateTurret(kind));
            }
        }

        let mut waves = Vec::with_capacity(self.waves.len());
        for (index, wave) in self.waves.into_iter().enumerate() {
            let Some(position) = enemies.iter().position(|enemy| enemy.name == wave.enemy) else {
                return Err(ConfigError::UnknownEnemy {
                    wave: index,
                    name: wave.enemy,
                });
            };
            let enemy = PrototypeId::new(u32::try_from(position).unwrap_or(u32::MAX));
            waves.push(WaveSpec {
                enemy,
                count: wave.count,
                spacing: seconds(&format!("wave {index} spacing"), wave.spacing)?,
                delay: seconds(&format!("wave {index} delay"), wave.delay)?,
            });
        }

        let mut zones = Vec::with_capacity(self.zones.len());
        for (index, zone) in self.zones.into_iter().enumerate() {
            let [column, row] = zone.cell;
            if column >= map.columns || row >= map.rows {
                return Err(ConfigError::ZoneOutOfBounds(index));
            }
            let effect = match zone.effect {
                ZoneEffect::Damage(amount) => {
                    ZoneEffect::Damage(positive(&format!("zone {index} damage"), amount)?)
                }
                ZoneEffect::Heal(amount) => {
                    ZoneEffect::Heal(positive(&format!("zone {index} heal"), amount)?)
                }
            };
            zones.push(ZoneSpec {
                cell: CellCoord::new(column, row),
                radius: positive(&format!("zone {index} radius"), zone.radius)?,
                effect,
            });
        }

        Ok(Level {
            initial_gold: self.game.initial_gold,
            initial_health: self.game.initial_health,
            map,
            enemies,
            turrets,
            waves,
            zones,
            projectile_preload: self.projectile_preload,
        })
    }
}

fn validate_map(config: &MapConfig) -> Result<MapSpec, ConfigError> {
    let tile_size = positive("map tile_size", config.tile_size)?;

    let expected = config
        .layout
        .first()
        .map(|row| row.chars().count())
        .unwrap_or(0);
    if expected == 0 {
        return Err(ConfigError::EmptyLayout);
    }

    let mut cells = Vec::with_capacity(expected * config.layout.len());
    for (row_index, row) in config.layout.iter().enumerate() {
        let found = row.chars().count();
        if found != expected {
            return Err(ConfigError::RaggedLayout {
                row: row_index,
                expected,
                found,
            });
        }
        for (column, glyph) in row.chars().enumerate() {
            let kind = match glyph {
                '.' => CellKind::Buildable,
                '#' => CellKind::Path,
                'x' => CellKind::Obstacle,
                ' ' => CellKind::Empty,
                _ => {
                    return Err(ConfigError::UnknownGlyph {
                        row: row_index,
                        column,
                        glyph,
                    })
                }
            };
            cells.push(kind);
        }
    }

    let columns = u32::try_from(expected).unwrap_or(u32::MAX);
    let rows = u32::try_from(config.layout.len()).unwrap_or(u32::MAX);

    if config.path.len() < 2 {
        return Err(ConfigError::PathTooShort(config.path.len()));
    }
    let mut path: Vec<CellCoord> = Vec::with_capacity(config.path.len());
    for &[column, row] in &config.path {
        if column >= columns || row >= rows {
            return Err(ConfigError::WaypointOutOfBounds { column, row });
        }
        let waypoint = CellCoord::new(column, row);
        let from = path.last().copied().unwrap_or(waypoint);
        for cell in segment_cells(from, waypoint) {
            let index = cell.row() as usize * expected + cell.column() as usize;
            if cells.get(index) != Some(&CellKind::Path) {
                return Err(ConfigError::OffPath {
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }
        path.push(waypoint);
    }

    Ok(MapSpec {
        tile_size,
        origin: Vec2::from(config.origin),
        columns,
        rows,
        cells,
        path,
    })
}

fn validate_turret(config: TurretConfig) -> Result<TurretSpec, ConfigError> {
    let kind = config.kind;
    if config.levels.is_empty() {
        return Err(ConfigError::MissingLevels(kind));
    }
    let defined = config.levels.len();
    if config.max_level == 0 || usize::try_from(config.max_level).map_or(true, |max| max > defined)
    {
        return Err(ConfigError::MaxLevelMismatch {
            kind,
            max_level: config.max_level,
            defined,
        });
    }

    let mut levels = Vec::with_capacity(defined);
    for (index, level) in config.levels.into_iter().enumerate() {
        let label = format!("turret {kind:?} level {}", index + 1);
        let range = positive(&format!("{label} range"), level.range)?;
        let attack_interval = seconds(&format!("{label} attack_interval"), level.attack_interval)?;
        levels.push(LevelStats {
            damage: level.damage.max(0.0),
            range,
            attack_interval,
            upgrade_cost: level.upgrade_cost,
            sell_value: level.sell_value,
            visual_key: level.visual_key,
        });
    }

    let projectile = match config.projectile {
        ProjectileConfig::Direct {
            speed,
            hit_threshold,
        } => ProjectileSpec::Direct {
            speed: positive(&format!("turret {kind:?} projectile speed"), speed)?,
            hit_threshold: hit_threshold.max(0.0),
        },
        ProjectileConfig::Area {
            speed,
            radius,
            hit_threshold,
            impact_linger,
        } => ProjectileSpec::Area {
            speed: positive(&format!("turret {kind:?} projectile speed"), speed)?,
            radius: positive(&format!("turret {kind:?} projectile radius"), radius)?,
            hit_threshold: hit_threshold.max(0.0),
            impact_linger: seconds(&format!("turret {kind:?} impact_linger"), impact_linger)?,
        },
        ProjectileConfig::AreaStatus {
            speed,
            radius,
            hit_threshold,
            slow_factor,
            slow_duration,
            field_duration,
        } => ProjectileSpec::AreaStatus {
            speed: positive(&format!("turret {kind:?} projectile speed"), speed)?,
            radius: positive(&format!("turret {kind:?} projectile radius"), radius)?,
            hit_threshold: hit_threshold.max(0.0),
            slow_factor: slow_factor.clamp(0.0, 1.0),
            slow_duration: seconds(&format!("turret {kind:?} slow_duration"), slow_duration)?,
            field_duration: seconds(&format!("turret {kind:?} field_duration"), field_duration)?,
        },
    };

    Ok(TurretSpec {
        kind,
        cost: config.cost,
        max_level: config.max_level,
        windup: seconds(&format!("turret {kind:?} windup"), config.windup)?,
        projectile,
        levels,
        preload: config.preload,
    })
}

/// Cells crossed by the straight segment between two waypoints, both ends
/// included.
fn segment_cells(from: CellCoord, to: CellCoord) -> impl Iterator<Item = CellCoord> {
    let (x0, y0) = (i64::from(from.column()), i64::from(from.row()));
    let (dx, dy) = (i64::from(to.column()) - x0, i64::from(to.row()) - y0);
    let steps = dx.abs().max(dy.abs());
    (0..=steps).map(move |step| {
        let (x, y) = if steps == 0 {
            (x0, y0)
        } else {
            (
                x0 + (dx * step * 2 + steps).div_euclid(steps * 2),
                y0 + (dy * step * 2 + steps).div_euclid(steps * 2),
            )
        };
        CellCoord::new(
            u32::try_from(x).unwrap_or(u32::MAX),
            u32::try_from(y).unwrap_or(u32::MAX),
        )
    })
}

fn positive(field: &str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive {
            field: field.to_owned(),
            value,
        })
    }
}

fn seconds(field: &str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration {
        field: field.to_owned(),
        value,
    })
}

fn default_true() -> bool {
    true
}

fn default_direct_threshold() -> f32 {
    DEFAULT_DIRECT_HIT_THRESHOLD
}

fn default_area_threshold() -> f32 {
    DEFAULT_AREA_HIT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#####"
        projectile_preload = 4

        [game]
        initial_gold = 250
        initial_health = 10

        [map]
        tile_size = 1.0
        layout = [
            "....",
            "####",
            ".x..",
        ]
        path = [[0, 1], [3, 1]]

        [[enemies]]
        name = "grunt"
        max_health = 100.0
        speed = 2.0
        gold_value = 10
        player_damage = 1

        [[turrets]]
        kind = "shooter"
        cost = 100
        max_level = 2
        windup = 0.25
        projectile = { variant = "direct", speed = 10.0 }

        [[turrets.levels]]
        damage = 15.0
        range = 3.0
        attack_interval = 1.0
        upgrade_cost = 50
        sell_value = 50
        visual_key = "shooter_1"

        [[turrets.levels]]
        damage = 25.0
        range = 3.5
        attack_interval = 0.8
        upgrade_cost = 0
        sell_value = 100
        visual_key = "shooter_2"

        [[waves]]
        enemy = "grunt"
        count = 3
        spacing = 1.0
        delay = 2.0

        [[zones]]
        cell = [1, 1]
        radius = 0.5
        effect = { type = "heal", amount = 5.0 }
    "#####;

    fn parse(source: &str) -> LevelConfig {
        toml::from_str(source).expect("level parses")
    }

    #[test]
    fn validates_complete_level() {
        let level = parse(LEVEL).validate().expect("level validates");

        assert_eq!(level.map.columns, 4);
        assert_eq!(level.map.rows, 3);
        assert_eq!(level.map.cells[4], CellKind::Path);
        assert_eq!(level.map.cells[9], CellKind::Obstacle);
        assert_eq!(level.enemies[0].name, "grunt");
        assert!(level.enemy(PrototypeId::new(0)).expect("grunt").healable);

        let wave = level.waves[0];
        assert_eq!(wave.count, 3);
        assert_eq!(wave.spacing, Duration::from_secs(1));
        assert_eq!(wave.delay, Duration::from_secs(2));

        let shooter = level.turret(TurretKind::Shooter).expect("shooter");
        assert_eq!(shooter.windup, Duration::from_millis(250));
        assert_eq!(shooter.level(2).map(|stats| stats.sell_value), Some(100));
        assert!(shooter.level(0).is_none());
        assert!(shooter.level(3).is_none());
        assert!(matches!(
            shooter.projectile,
            ProjectileSpec::Direct { hit_threshold, .. } if (hit_threshold - 0.02).abs() < f32::EPSILON
        ));
        assert_eq!(level.zones[0].effect, ZoneEffect::Heal(5.0));
    }

    #[test]
    fn unknown_wave_enemy_is_rejected() {
        let mut config = parse(LEVEL);
        config.waves[0].enemy = "ghost".to_owned();

        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownEnemy {
                wave: 0,
                name: "ghost".to_owned(),
            })
        );
    }

    #[test]
    fn single_waypoint_path_is_rejected() {
        let mut config = parse(LEVEL);
        config.map.path.truncate(1);

        assert_eq!(config.validate(), Err(ConfigError::PathTooShort(1)));
    }

    #[test]
    fn ragged_layout_is_rejected() {
        let mut config = parse(LEVEL);
        config.map.layout[2] = "..".to_owned();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::RaggedLayout { row: 2, expected: 4, found: 2 })
        ));
    }

    #[test]
    fn max_level_beyond_level_table_is_rejected() {
        let mut config = parse(LEVEL);
        config.turrets[0].max_level = 3;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxLevelMismatch { max_level: 3, defined: 2, .. })
        ));
    }

    #[test]
    fn path_over_non_path_tiles_is_rejected() {
        let mut config = parse(LEVEL);
        config.map.path = vec![[0, 1], [3, 1], [3, 2]];
        assert_eq!(
            config.validate(),
            Err(ConfigError::OffPath { column: 3, row: 2 })
        );

        let mut config = parse(LEVEL);
        config.map.layout[1] = "#x##".to_owned();
        assert_eq!(
            config.validate(),
            Err(ConfigError::OffPath { column: 1, row: 1 })
        );
    }

    #[test]
    fn zone_amounts_must_be_positive() {
        let mut config = parse(LEVEL);
        config.zones[0].effect = ZoneEffect::Damage(-50.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field, .. }) if field == "zone 0 damage"
        ));

        let mut config = parse(LEVEL);
        config.zones[0].effect = ZoneEffect::Heal(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field, .. }) if field == "zone 0 heal"
        ));
    }

    #[test]
    fn negative_durations_are_rejected() {
        let mut config = parse(LEVEL);
        config.waves[0].spacing = -1.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }
}
