/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD, or a
/// handful of conventional system paths). Falls back to the documented
/// constants from the specification if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::SimError;

/// Every tunable named as a "locked constant" in the design: map shape,
/// spawn rules, AP/HP figures, FOV geometry, action costs, and phase
/// timing. Nothing here is read by the simulation directly — callers
/// construct a `World` with a `SimConfig` and the rest of the crate reads
/// fields off it.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub map_width: usize,
    pub map_height: usize,
    pub floor_count: usize,
    pub wall_density: f64,
    /// Enemy count is `enemy_count_min + range(0, enemy_count_span)`.
    pub enemy_count_min: i32,
    pub enemy_count_span: i32,
    pub plaza_size: i32,
    pub stair_min_distance: i32,
    pub enemy_spawn_min_distance: i32,

    pub player_hp: i64,
    pub player_ap: f64,
    pub player_ap_recovery: f64,
    pub player_sight_range: i32,
    pub player_noise_level: i32,

    pub enemy_hp: i64,
    pub enemy_ap: f64,
    pub enemy_ap_recovery: f64,
    pub enemy_sight_range: i32,
    pub default_noise_level: i32,

    pub fov_ray_step: f64,
    pub fov_angle_step_degrees: i32,

    pub diagonal_cost: f64,
    pub pass_through_cost: f64,
    pub attack_cost: f64,
    pub attack_damage: i64,
    pub climb_cost: f64,

    pub decision_timer_secs: f64,
    pub step_animation_delay_ms: u64,
    pub damage_event_ttl_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            map_width: 20,
            map_height: 20,
            floor_count: 2,
            wall_density: 0.2,
            enemy_count_min: 3,
            enemy_count_span: 2,
            plaza_size: 5,
            stair_min_distance: 5,
            enemy_spawn_min_distance: 6,

            player_hp: 100,
            player_ap: 10.0,
            player_ap_recovery: 5.0,
            player_sight_range: 10,
            player_noise_level: 3,

            enemy_hp: 3,
            enemy_ap: 8.0,
            enemy_ap_recovery: 4.0,
            enemy_sight_range: 7,
            default_noise_level: 3,

            fov_ray_step: 0.5,
            fov_angle_step_degrees: 2,

            diagonal_cost: 1.5,
            pass_through_cost: 3.0,
            attack_cost: 3.0,
            attack_damage: 1,
            climb_cost: 3.0,

            decision_timer_secs: 5.0,
            step_animation_delay_ms: 300,
            damage_event_ttl_ms: 1500,
        }
    }
}

// ── TOML schema (every field optional; missing keys fall back to default) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    map: TomlMap,
    #[serde(default)]
    units: TomlUnits,
    #[serde(default)]
    fov: TomlFov,
    #[serde(default)]
    costs: TomlCosts,
    #[serde(default)]
    timing: TomlTiming,
}

#[derive(Deserialize, Debug, Default)]
struct TomlMap {
    width: Option<usize>,
    height: Option<usize>,
    floor_count: Option<usize>,
    wall_density: Option<f64>,
    enemy_count_min: Option<i32>,
    enemy_count_span: Option<i32>,
    plaza_size: Option<i32>,
    stair_min_distance: Option<i32>,
    enemy_spawn_min_distance: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlUnits {
    player_hp: Option<i64>,
    player_ap: Option<f64>,
    player_ap_recovery: Option<f64>,
    player_sight_range: Option<i32>,
    player_noise_level: Option<i32>,
    enemy_hp: Option<i64>,
    enemy_ap: Option<f64>,
    enemy_ap_recovery: Option<f64>,
    enemy_sight_range: Option<i32>,
    default_noise_level: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlFov {
    ray_step: Option<f64>,
    angle_step_degrees: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlCosts {
    diagonal: Option<f64>,
    pass_through: Option<f64>,
    attack: Option<f64>,
    attack_damage: Option<i64>,
    climb: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlTiming {
    decision_timer_secs: Option<f64>,
    step_animation_delay_ms: Option<u64>,
    damage_event_ttl_ms: Option<u64>,
}

impl SimConfig {
    /// Load from `config.toml`, searching the executable's directory, the
    /// current working directory, then a couple of conventional system
    /// paths. A missing file or unparseable TOML never panics — it warns
    /// and falls back to `SimConfig::default()`, merged field-by-field
    /// with whatever the file did provide.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::default().merge(toml_cfg)
    }

    fn merge(mut self, toml: TomlConfig) -> Self {
        if let Some(v) = toml.map.width { self.map_width = v; }
        if let Some(v) = toml.map.height { self.map_height = v; }
        if let Some(v) = toml.map.floor_count { self.floor_count = v; }
        if let Some(v) = toml.map.wall_density { self.wall_density = v; }
        if let Some(v) = toml.map.enemy_count_min { self.enemy_count_min = v; }
        if let Some(v) = toml.map.enemy_count_span { self.enemy_count_span = v; }
        if let Some(v) = toml.map.plaza_size { self.plaza_size = v; }
        if let Some(v) = toml.map.stair_min_distance { self.stair_min_distance = v; }
        if let Some(v) = toml.map.enemy_spawn_min_distance { self.enemy_spawn_min_distance = v; }

        if let Some(v) = toml.units.player_hp { self.player_hp = v; }
        if let Some(v) = toml.units.player_ap { self.player_ap = v; }
        if let Some(v) = toml.units.player_ap_recovery { self.player_ap_recovery = v; }
        if let Some(v) = toml.units.player_sight_range { self.player_sight_range = v; }
        if let Some(v) = toml.units.player_noise_level { self.player_noise_level = v; }
        if let Some(v) = toml.units.enemy_hp { self.enemy_hp = v; }
        if let Some(v) = toml.units.enemy_ap { self.enemy_ap = v; }
        if let Some(v) = toml.units.enemy_ap_recovery { self.enemy_ap_recovery = v; }
        if let Some(v) = toml.units.enemy_sight_range { self.enemy_sight_range = v; }
        if let Some(v) = toml.units.default_noise_level { self.default_noise_level = v; }

        if let Some(v) = toml.fov.ray_step { self.fov_ray_step = v; }
        if let Some(v) = toml.fov.angle_step_degrees { self.fov_angle_step_degrees = v; }

        if let Some(v) = toml.costs.diagonal { self.diagonal_cost = v; }
        if let Some(v) = toml.costs.pass_through { self.pass_through_cost = v; }
        if let Some(v) = toml.costs.attack { self.attack_cost = v; }
        if let Some(v) = toml.costs.attack_damage { self.attack_damage = v; }
        if let Some(v) = toml.costs.climb { self.climb_cost = v; }

        if let Some(v) = toml.timing.decision_timer_secs { self.decision_timer_secs = v; }
        if let Some(v) = toml.timing.step_animation_delay_ms { self.step_animation_delay_ms = v; }
        if let Some(v) = toml.timing.damage_event_ttl_ms { self.damage_event_ttl_ms = v; }

        self
    }
}

/// Candidate directories to search: exe dir, CWD, then XDG/system data
/// dirs, deduplicated in priority order.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tactics-core");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/tactics-core");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    let err = SimError::ConfigParse(path.clone(), e.to_string());
                    warn!(%err, "using defaults");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config.toml");
            }
        }
    }
    TomlConfig::default()
}
