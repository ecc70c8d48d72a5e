/// Enemy waves.
///
/// A wave is a grid of normal enemies that scrolls in from above the canvas,
/// plus a pack of golden elders.  Both grow linearly with the level.

use glam::Vec2;
use rand::Rng;

use crate::config::Tuning;
use crate::entities::{BossEnemy, Enemy, NormalEnemy};
use crate::geometry::Canvas;

/// Grid dimensions `(rows, cols)` of the normal enemies at `level`.
pub fn grid_size(level: u32, tuning: &Tuning) -> (u32, u32) {
    (
        level.min(tuning.grid_max_rows),
        level.min(tuning.grid_max_cols),
    )
}

/// Build the full wave for `level`: normal enemies first, then the elders.
pub fn spawn_wave(
    level: u32,
    canvas: Canvas,
    tuning: &Tuning,
    now: u64,
    rng: &mut impl Rng,
) -> Vec<Enemy> {
    let (rows, cols) = grid_size(level, tuning);
    let size = Vec2::new(tuning.enemy_width, tuning.enemy_height);
    let speed = tuning.enemy_speed(level);

    let mut enemies = Vec::with_capacity((rows * cols + level * tuning.bosses_per_level) as usize);
    for row in 0..rows {
        for col in 0..cols {
            enemies.push(Enemy::Normal(NormalEnemy {
                pos: Vec2::new(
                    tuning.grid_origin_x + col as f32 * tuning.grid_spacing,
                    tuning.grid_origin_y + row as f32 * tuning.grid_spacing,
                ),
                size,
                speed,
            }));
        }
    }

    for _ in 0..level * tuning.bosses_per_level {
        enemies.push(Enemy::Boss(spawn_boss(level, canvas, tuning, now, rng)));
    }

    log::info!(
        "Wave {}: {}x{} grid, {} elders",
        level,
        rows,
        cols,
        level * tuning.bosses_per_level
    );
    enemies
}

/// A fresh golden elder near the spawn anchor, ready to fire one interval
/// after `now`.
pub fn spawn_boss(
    level: u32,
    canvas: Canvas,
    tuning: &Tuning,
    now: u64,
    rng: &mut impl Rng,
) -> BossEnemy {
    let anchor = Vec2::new(
        canvas.width * tuning.boss_spawn_x,
        canvas.height * tuning.boss_spawn_y,
    );
    let spread = tuning.boss_spawn_spread;
    let offset = if spread > 0.0 {
        Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
    } else {
        Vec2::ZERO
    };

    BossEnemy {
        pos: anchor + offset,
        size: Vec2::new(tuning.boss_width, tuning.boss_height),
        speed: tuning.boss_speed(level),
        hits: 0,
        last_shot: now,
        dead_since: None,
    }
}
