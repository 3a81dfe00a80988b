/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing, incomplete, or
/// fails validation.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub level: LevelConfig,
    /// Host frame interval.
    pub frame: Duration,
    pub gamepad: GamepadConfig,
    /// Seed for a reproducible run; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Everything the simulation core reads. Immutable once a game starts.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub columns: i32,
    pub rows: i32,
    pub wall_count: CountRange,
    pub food_count: CountRange,
    pub wall_hp: i32,
    pub start_food: i32,
    /// Damage the player deals to a wall per chop.
    pub wall_damage: u32,
    /// Damage the player deals to an enemy per attack.
    pub enemy_damage: u32,
    pub points_per_food: i32,
    pub points_per_soda: i32,
    pub player_move_time: Duration,
    pub enemy_move_time: Duration,
    pub enemy_kinds: Vec<EnemyKind>,
    pub initial_level: u32,
    pub timing: TimingConfig,
}

/// Inclusive `[min, max]` count drawn per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EnemyKind {
    pub damage: u32,
    pub health: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// Title card shown during level setup.
    pub level_start_delay: Duration,
    /// Pause before the enemy phase (and padding when there are no enemies).
    pub turn_delay: Duration,
    /// Delay between reaching the exit and requesting the next level.
    pub restart_level_delay: Duration,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    enemies: TomlEnemies,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_columns")]
    columns: i32,
    #[serde(default = "default_rows")]
    rows: i32,
    #[serde(default = "default_wall_min")]
    wall_min: u32,
    #[serde(default = "default_wall_max")]
    wall_max: u32,
    #[serde(default = "default_food_min")]
    food_min: u32,
    #[serde(default = "default_food_max")]
    food_max: u32,
    #[serde(default = "default_wall_hp")]
    wall_hp: i32,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_start_food")]
    start_food: i32,
    #[serde(default = "default_wall_damage")]
    wall_damage: u32,
    #[serde(default = "default_enemy_damage")]
    enemy_damage: u32,
    #[serde(default = "default_points_per_food")]
    points_per_food: i32,
    #[serde(default = "default_points_per_soda")]
    points_per_soda: i32,
    #[serde(default = "default_move_time")]
    move_time_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlEnemies {
    #[serde(default = "default_move_time")]
    move_time_ms: u64,
    #[serde(default = "default_enemy_kinds")]
    kind: Vec<TomlEnemyKind>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct TomlEnemyKind {
    damage: u32,
    health: i32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_level_start_delay")]
    level_start_delay_ms: u64,
    #[serde(default = "default_turn_delay")]
    turn_delay_ms: u64,
    #[serde(default = "default_restart_level_delay")]
    restart_level_delay_ms: u64,
    #[serde(default = "default_frame")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_initial_level")]
    initial_level: u32,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_columns() -> i32 { 8 }
fn default_rows() -> i32 { 8 }
fn default_wall_min() -> u32 { 5 }
fn default_wall_max() -> u32 { 9 }
fn default_food_min() -> u32 { 1 }
fn default_food_max() -> u32 { 5 }
fn default_wall_hp() -> i32 { 4 }

fn default_start_food() -> i32 { 100 }
fn default_wall_damage() -> u32 { 1 }
fn default_enemy_damage() -> u32 { 1 }
fn default_points_per_food() -> i32 { 10 }
fn default_points_per_soda() -> i32 { 20 }
fn default_move_time() -> u64 { 100 }

fn default_enemy_kinds() -> Vec<TomlEnemyKind> {
    vec![
        TomlEnemyKind { damage: 10, health: 3 },
        TomlEnemyKind { damage: 20, health: 5 },
    ]
}

fn default_level_start_delay() -> u64 { 2000 }
fn default_turn_delay() -> u64 { 100 }
fn default_restart_level_delay() -> u64 { 1000 }
fn default_frame() -> u64 { 16 }

fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["A".into(), "Start".into()] }

fn default_initial_level() -> u32 { 1 }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            columns: default_columns(),
            rows: default_rows(),
            wall_min: default_wall_min(),
            wall_max: default_wall_max(),
            food_min: default_food_min(),
            food_max: default_food_max(),
            wall_hp: default_wall_hp(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            start_food: default_start_food(),
            wall_damage: default_wall_damage(),
            enemy_damage: default_enemy_damage(),
            points_per_food: default_points_per_food(),
            points_per_soda: default_points_per_soda(),
            move_time_ms: default_move_time(),
        }
    }
}

impl Default for TomlEnemies {
    fn default() -> Self {
        TomlEnemies {
            move_time_ms: default_move_time(),
            kind: default_enemy_kinds(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            level_start_delay_ms: default_level_start_delay(),
            turn_delay_ms: default_turn_delay(),
            restart_level_delay_ms: default_restart_level_delay(),
            frame_ms: default_frame(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            cancel: default_cancel(),
            pause: default_pause(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            initial_level: default_initial_level(),
            seed: None,
            log_file: None,
        }
    }
}

// ── Conversion ──

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        let level = LevelConfig {
            columns: t.board.columns,
            rows: t.board.rows,
            wall_count: CountRange { min: t.board.wall_min, max: t.board.wall_max },
            food_count: CountRange { min: t.board.food_min, max: t.board.food_max },
            wall_hp: t.board.wall_hp,
            start_food: t.player.start_food,
            wall_damage: t.player.wall_damage,
            enemy_damage: t.player.enemy_damage,
            points_per_food: t.player.points_per_food,
            points_per_soda: t.player.points_per_soda,
            player_move_time: Duration::from_millis(t.player.move_time_ms),
            enemy_move_time: Duration::from_millis(t.enemies.move_time_ms),
            enemy_kinds: t.enemies.kind.iter()
                .map(|k| EnemyKind { damage: k.damage, health: k.health })
                .collect(),
            initial_level: t.general.initial_level,
            timing: TimingConfig {
                level_start_delay: Duration::from_millis(t.timing.level_start_delay_ms),
                turn_delay: Duration::from_millis(t.timing.turn_delay_ms),
                restart_level_delay: Duration::from_millis(t.timing.restart_level_delay_ms),
            },
        };

        GameConfig {
            level,
            frame: Duration::from_millis(t.timing.frame_ms),
            gamepad: GamepadConfig {
                cancel: t.gamepad.cancel,
                pause: t.gamepad.pause,
                restart: t.gamepad.restart,
            },
            seed: t.general.seed,
            log_file: t.general.log_file.map(PathBuf::from),
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        GameConfig::default().level
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from(TomlConfig::default())
    }
}

// ── Validation ──

impl LevelConfig {
    /// Reject configurations the generator or conductor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 3 || self.rows < 3 {
            return Err(ConfigError::BoardTooSmall { columns: self.columns, rows: self.rows });
        }
        for (name, range) in [("wall count", self.wall_count), ("food count", self.food_count)] {
            if range.min > range.max {
                return Err(ConfigError::InvalidRange { name, min: range.min, max: range.max });
            }
        }
        if self.enemy_kinds.is_empty() {
            return Err(ConfigError::NoEnemyKinds);
        }
        if self.enemy_kinds.iter().any(|k| k.health <= 0) {
            return Err(ConfigError::NonPositive { name: "enemy health" });
        }
        if self.wall_hp <= 0 {
            return Err(ConfigError::NonPositive { name: "wall_hp" });
        }
        if self.start_food <= 0 {
            return Err(ConfigError::NonPositive { name: "start_food" });
        }
        if self.initial_level == 0 {
            return Err(ConfigError::NonPositive { name: "initial_level" });
        }
        let damages = [("wall_damage", self.wall_damage), ("enemy_damage", self.enemy_damage)]
            .into_iter()
            .chain(self.enemy_kinds.iter().map(|k| ("enemy damage", k.damage)));
        for (name, value) in damages {
            if i32::try_from(value).is_err() {
                return Err(ConfigError::TooLarge { name, value });
            }
        }
        Ok(())
    }
}

// ── Loading ──

impl GameConfig {
    /// Parse and validate a config document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        let cfg = GameConfig::from(toml_cfg);
        cfg.level.validate()?;
        Ok(cfg)
    }

    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/scavenger`.
    /// Missing file, missing keys, or a rejected file fall back to defaults.
    pub fn load() -> Loaded {
        GameConfig::load_from(&candidate_dirs())
    }

    /// Load the first `config.toml` found in `dirs`.
    pub fn load_from(dirs: &[PathBuf]) -> Loaded {
        let mut notes = vec![];
        for dir in dirs {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(config) => {
                        notes.push((log::Level::Info, format!("loaded {}", path.display())));
                        return Loaded { config, notes };
                    }
                    Err(e) => {
                        notes.push((
                            log::Level::Warn,
                            format!("{}: {e}; using default settings", path.display()),
                        ));
                        return Loaded { config: GameConfig::default(), notes };
                    }
                },
                Err(e) => {
                    notes.push((log::Level::Warn, format!("could not read {}: {e}", path.display())));
                }
            }
        }
        Loaded { config: GameConfig::default(), notes }
    }
}

/// A config plus what happened while finding it. Loading runs before the
/// logger is up, so the host logs `notes` once it is.
#[derive(Debug)]
pub struct Loaded {
    pub config: GameConfig,
    pub notes: Vec<(log::Level, String)>,
}

impl Loaded {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.notes.iter()
            .filter(|(level, _)| *level <= log::Level::Warn)
            .map(|(_, text)| text.as_str())
    }
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. ~/.local/share/scavenger
    if let Ok(home) = std::env::var("HOME") {
        let data = PathBuf::from(&home).join(".local/share/scavenger");
        if data.is_dir() && !dirs.iter().any(|d| d == &data) {
            dirs.push(data);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        let l = &cfg.level;
        assert_eq!((l.columns, l.rows), (8, 8));
        assert_eq!(l.wall_count, CountRange { min: 5, max: 9 });
        assert_eq!(l.food_count, CountRange { min: 1, max: 5 });
        assert_eq!(l.wall_hp, 4);
        assert_eq!(l.start_food, 100);
        assert_eq!(l.enemy_kinds.len(), 2);
        assert_eq!(l.timing.level_start_delay, Duration::from_secs(2));
        assert_eq!(l.timing.turn_delay, Duration::from_millis(100));
        assert_eq!(cfg.frame, Duration::from_millis(16));
        assert_eq!(cfg.seed, None);
        assert_eq!(*l, LevelConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [board]
            columns = 10
            wall_max = 12

            [general]
            seed = 1234

            [[enemies.kind]]
            damage = 5
            health = 1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.level.columns, 10);
        assert_eq!(cfg.level.rows, 8);
        assert_eq!(cfg.level.wall_count, CountRange { min: 5, max: 12 });
        assert_eq!(cfg.level.enemy_kinds, vec![EnemyKind { damage: 5, health: 1 }]);
        assert_eq!(cfg.seed, Some(1234));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = GameConfig::from_toml_str("[board]\nfood_min = 6\nfood_max = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { name: "food count", min: 6, max: 2 }));
    }

    #[test]
    fn rejects_tiny_board_and_bad_values() {
        assert!(matches!(
            GameConfig::from_toml_str("[board]\ncolumns = 2\n"),
            Err(ConfigError::BoardTooSmall { columns: 2, rows: 8 })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[player]\nstart_food = 0\n"),
            Err(ConfigError::NonPositive { name: "start_food" })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[enemies]\nkind = []\n"),
            Err(ConfigError::NoEnemyKinds)
        ));
    }

    #[test]
    fn rejects_damage_past_counter_range() {
        assert_eq!(
            GameConfig::from_toml_str("[[enemies.kind]]\ndamage = 3000000000\nhealth = 3\n").unwrap_err(),
            ConfigError::TooLarge { name: "enemy damage", value: 3_000_000_000 }
        );
        assert!(matches!(
            GameConfig::from_toml_str("[player]\nwall_damage = 2147483648\n"),
            Err(ConfigError::TooLarge { name: "wall_damage", .. })
        ));
        assert!(GameConfig::from_toml_str("[player]\nenemy_damage = 2147483647\n").is_ok());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scavenger-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn broken_file_is_reported_not_swallowed() {
        let dir = scratch_dir("broken");
        std::fs::write(dir.join("config.toml"), "[board]\ncolumns = \"wide\"\n").unwrap();

        let loaded = GameConfig::load_from(&[dir.clone()]);
        assert_eq!(loaded.config.level, LevelConfig::default());
        let warnings: Vec<&str> = loaded.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("using default settings"));

        std::fs::write(dir.join("config.toml"), "[board]\ncolumns = 12\n").unwrap();
        let loaded = GameConfig::load_from(&[dir.clone()]);
        assert_eq!(loaded.config.level.columns, 12);
        assert_eq!(loaded.warnings().count(), 0);
        assert_eq!(loaded.notes[0].0, log::Level::Info);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn no_file_means_defaults_and_no_notes() {
        let dir = scratch_dir("empty");
        let loaded = GameConfig::load_from(&[dir.clone()]);
        assert!(loaded.notes.is_empty());
        assert_eq!(loaded.config.level, LevelConfig::default());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            GameConfig::from_toml_str("[board]\ncolumns = \"wide\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
