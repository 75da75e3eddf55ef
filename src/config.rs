/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/kahina`. Every key is optional: a missing file, a
/// missing section or a missing key falls back to the built-in tuning.
/// A file that fails to parse is ignored as a whole and the reason is
/// kept in `diagnostics` so it can be logged once the logger is up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub vision: VisionConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
    /// Problems met while loading (unreadable or malformed file).
    pub diagnostics: Vec<String>,
}

/// Player motion tuning, in world units per tick.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub speed: f32,
    /// Initial vertical velocity of a jump. Negative = upward.
    pub jump_power: f32,
    pub gravity: f32,
}

/// Vision ability timings, in ticks.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VisionConfig {
    pub max_duration: u32,
    pub max_cooldown: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    pub tick_rate_hz: u32,
    /// Log destination. `None` = no log file.
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub vision: Vec<String>,
    pub restart: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

// ── Defaults ──

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig { speed: 5.0, jump_power: -15.0, gravity: 0.8 }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        // 2s active, 3s cooldown at 60 Hz
        VisionConfig { max_duration: 120, max_cooldown: 180 }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig { tick_rate_hz: 60, log_file: None }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            jump: vec!["A".into()],
            vision: vec!["Y".into(), "X".into()],
            restart: vec!["B".into()],
            pause: vec!["Start".into()],
            quit: vec!["Select".into()],
        }
    }
}

impl GeneralConfig {
    /// Simulation tick period. A zero rate is treated as 1 Hz.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: PhysicsConfig,
    #[serde(default)]
    vision: VisionConfig,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: GamepadConfig,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate_hz")]
    tick_rate_hz: u32,
    #[serde(default)]
    log_file: String,
}

fn default_tick_rate_hz() -> u32 { 60 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tick_rate_hz: default_tick_rate_hz(), log_file: String::new() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml` from the first candidate directory that has one.
    pub fn load() -> Self {
        let dirs = candidate_dirs();
        for dir in &dirs {
            let path = dir.join(CONFIG_FILE);
            if !path.is_file() { continue; }
            return match std::fs::read_to_string(&path) {
                Ok(text) => Self::from_toml_str(&text, dir),
                Err(e) => GameConfig {
                    diagnostics: vec![format!("could not read {}: {e}", path.display())],
                    ..GameConfig::default()
                },
            };
        }
        GameConfig::default()
    }

    /// Parse config text. Relative `log_file` paths resolve against `base`.
    pub fn from_toml_str(text: &str, base: &Path) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig {
                physics: cfg.physics,
                vision: cfg.vision,
                general: GeneralConfig {
                    tick_rate_hz: cfg.general.tick_rate_hz,
                    log_file: resolve_log_file(&cfg.general.log_file, base),
                },
                gamepad: cfg.gamepad,
                diagnostics: vec![],
            },
            Err(e) => GameConfig {
                diagnostics: vec![format!("{CONFIG_FILE} parse error, using defaults: {e}")],
                ..GameConfig::default()
            },
        }
    }
}

fn resolve_log_file(raw: &str, base: &Path) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let p = PathBuf::from(raw);
    Some(if p.is_absolute() { p } else { base.join(p) })
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share/kahina");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}
