//! Game balance constants.
//!
//! Every number the simulation depends on lives in [`Tuning`].  The defaults
//! match the classic arcade balance; a JSON file may override any subset
//! of fields.

use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Pixels per tick along each held axis.
    pub player_speed: f32,
    pub player_lives: u32,
    /// Distance of the spawn point above the bottom edge.
    pub player_bottom_offset: f32,

    // === Fire control ===
    /// Minimum milliseconds between two accepted shots.
    pub shoot_delay_ms: u64,
    pub bullet_speed: f32,

    // === Normal enemies ===
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub enemy_base_speed: f32,
    pub enemy_speed_per_level: f32,
    pub grid_spacing: f32,
    pub grid_origin_x: f32,
    /// Negative so the wave scrolls in from above.
    pub grid_origin_y: f32,
    pub grid_max_rows: u32,
    pub grid_max_cols: u32,

    // === Golden elder ===
    pub boss_width: f32,
    pub boss_height: f32,
    pub boss_base_speed: f32,
    pub boss_speed_per_level: f32,
    pub bosses_per_level: u32,
    pub boss_hit_threshold: u32,
    pub boss_defeat_bonus: u32,
    pub boss_respawn_ms: u64,
    pub boss_fire_interval_ms: u64,
    /// The elder stops closing in once this near the player.
    pub boss_chase_distance: f32,
    pub boss_bullet_speed: f32,
    /// Spawn anchor as a fraction of the canvas size.
    pub boss_spawn_x: f32,
    pub boss_spawn_y: f32,
    /// Random offset applied on each axis around the anchor.
    pub boss_spawn_spread: f32,

    // === Enemy bullet trails ===
    pub trail_length: usize,
    pub trail_interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_width: 50.0,
            player_height: 80.0,
            player_speed: 5.0,
            player_lives: 10,
            player_bottom_offset: 100.0,

            shoot_delay_ms: 200,
            bullet_speed: 12.0,

            enemy_width: 40.0,
            enemy_height: 40.0,
            enemy_base_speed: 0.5,
            enemy_speed_per_level: 0.1,
            grid_spacing: 80.0,
            grid_origin_x: 100.0,
            grid_origin_y: -200.0,
            grid_max_rows: 5,
            grid_max_cols: 8,

            boss_width: 60.0,
            boss_height: 80.0,
            boss_base_speed: 1.0,
            boss_speed_per_level: 0.1,
            bosses_per_level: 2,
            boss_hit_threshold: 30,
            boss_defeat_bonus: 5,
            boss_respawn_ms: 2000,
            boss_fire_interval_ms: 1000,
            boss_chase_distance: 200.0,
            boss_bullet_speed: 5.0,
            boss_spawn_x: 0.4,
            boss_spawn_y: 0.2,
            boss_spawn_spread: 120.0,

            trail_length: 10,
            trail_interval_ms: 50,
        }
    }
}

impl Tuning {
    /// Read a JSON tuning file.  Missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        let tuning = Self::from_json(&json)
            .with_context(|| format!("parsing tuning file {}", path.display()))?;
        log::debug!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make the game degenerate.
    pub fn validate(&self) -> anyhow::Result<()> {
        let sizes = [
            ("player", self.player_width, self.player_height),
            ("enemy", self.enemy_width, self.enemy_height),
            ("boss", self.boss_width, self.boss_height),
        ];
        for (name, w, h) in sizes {
            if !(w > 0.0 && h > 0.0) {
                bail!("{name} size must be positive, got {w}x{h}");
            }
        }
        if self.player_lives == 0 {
            bail!("player_lives must be at least 1");
        }
        if self.boss_hit_threshold == 0 {
            bail!("boss_hit_threshold must be at least 1");
        }
        if !(self.boss_spawn_spread >= 0.0) {
            bail!("boss_spawn_spread must not be negative");
        }
        if self.trail_length == 0 {
            bail!("trail_length must be at least 1");
        }
        Ok(())
    }

    /// Downward speed of normal enemies at `level`.
    pub fn enemy_speed(&self, level: u32) -> f32 {
        self.enemy_base_speed + level as f32 * self.enemy_speed_per_level
    }

    pub fn boss_speed(&self, level: u32) -> f32 {
        self.boss_base_speed + level as f32 * self.boss_speed_per_level
    }
}
