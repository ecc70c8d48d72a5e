/// Rendering layer.
///
/// Every function receives a drawing [`Surface`] and an immutable view of the
/// game state.  No game logic is performed; this module only translates state
/// into draw calls.  The one exception is [`record_trails`], which keeps the
/// purely cosmetic enemy-bullet trails up to date.

pub mod terminal;

use std::io;

use crossterm::style::Color;
use glam::Vec2;

use crate::entities::{BossEnemy, Bullet, BulletOwner, Enemy, GameState, NormalEnemy};
use crate::geometry::Canvas;

pub use terminal::{CellSize, TerminalSurface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A 2D drawing target measured in pixels.
pub trait Surface {
    /// Current `(width, height)`; may change between frames.
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, background: Color) -> io::Result<()>;
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) -> io::Result<()>;
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> io::Result<()>;
    fn fill_text(&mut self, text: &str, pos: Vec2, align: TextAlign, color: Color)
        -> io::Result<()>;
    /// Flush the finished frame.
    fn present(&mut self) -> io::Result<()>;
}

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BACKGROUND: Color = Color::Black;
const C_GOLD: Color = Color::Rgb { r: 0xff, g: 0xcc, b: 0x00 };
const C_RIFLE_BARREL: Color = Color::Rgb { r: 0x33, g: 0x33, b: 0x33 };
const C_RIFLE_MAGAZINE: Color = Color::Rgb { r: 0x66, g: 0x66, b: 0x66 };
const C_RIFLE_STOCK: Color = Color::Rgb { r: 0x44, g: 0x44, b: 0x44 };
const C_HUD: Color = Color::White;
const C_HEALTH_BG: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0x00 };
const C_HEALTH: Color = Color::Rgb { r: 0x00, g: 0xff, b: 0x00 };
const C_BULLET_PLAYER: Color = Color::Rgb { r: 0xff, g: 0x88, b: 0x00 };
const C_BULLET_ENEMY: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0x00 };
const C_TRAIL: Color = Color::Rgb { r: 0x66, g: 0x00, b: 0x00 };
const C_ENEMY_NORMAL: Color = Color::Rgb { r: 0x00, g: 0xff, b: 0x00 };
const C_PISTOL: Color = Color::Rgb { r: 0x66, g: 0x33, b: 0x00 };
const C_OVERLAY: Color = Color::Rgb { r: 0x10, g: 0x10, b: 0x10 };
const C_GAME_OVER: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0x00 };

// HUD rows, in pixels from the top.
const HUD_X: f32 = 20.0;
const HUD_LINE: f32 = 30.0;

const HEALTH_BAR_OFFSET: f32 = 20.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;
const COUNTDOWN_OFFSET: f32 = 25.0;

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<S: Surface>(surface: &mut S, state: &GameState, now: u64) -> io::Result<()> {
    let canvas = Canvas::from(surface.size());

    surface.clear(C_BACKGROUND)?;
    draw_player(surface, state)?;
    draw_hud(surface, state)?;
    draw_boss_status(surface, state, now)?;

    if state.is_over() {
        draw_game_over(surface, state, canvas)?;
        return surface.present();
    }

    for bullet in &state.bullets {
        draw_bullet(surface, bullet)?;
    }
    for bullet in &state.enemy_bullets {
        draw_bullet(surface, bullet)?;
    }
    for enemy in &state.enemies {
        match enemy {
            Enemy::Normal(e) => draw_normal_enemy(surface, e)?,
            Enemy::Boss(b) => draw_boss(surface, b)?,
        }
    }

    surface.present()
}

/// Append the current position to each enemy bullet's trail, at most once
/// per trail interval.  Cosmetic only: hit detection never reads trails.
pub fn record_trails(state: &mut GameState, now: u64) {
    let interval = state.tuning.trail_interval_ms;
    let cap = state.tuning.trail_length;
    for bullet in &mut state.enemy_bullets {
        let pos = bullet.pos;
        if let Some(trail) = bullet.trail.as_mut() {
            trail.record(pos, now, interval, cap);
        }
    }
}

/// Whole seconds until a dead elder returns, rounded up.
pub fn respawn_countdown(boss: &BossEnemy, respawn_ms: u64, now: u64) -> u64 {
    let elapsed = boss
        .dead_since
        .map(|since| now.saturating_sub(since))
        .unwrap_or(0);
    respawn_ms.saturating_sub(elapsed).div_ceil(1000)
}

// ── Player ────────────────────────────────────────────────────────────────────

fn draw_player<S: Surface>(out: &mut S, state: &GameState) -> io::Result<()> {
    let p = &state.player;
    let mid_x = p.pos.x + p.size.x / 2.0;

    // Head, body, arm
    out.fill_circle(Vec2::new(mid_x, p.pos.y + 20.0), 20.0, C_GOLD)?;
    out.fill_rect(Vec2::new(mid_x - 15.0, p.pos.y + 40.0), Vec2::new(30.0, 40.0), C_GOLD)?;
    out.fill_rect(Vec2::new(mid_x - 5.0, p.pos.y + 50.0), Vec2::new(10.0, 40.0), C_GOLD)?;

    // Rifle, rotated with the aim: stock, magazine, then barrel on top.
    let pivot = p.center();
    let along = Vec2::from_angle(p.angle);
    draw_segment(out, pivot + along * -15.0, pivot + along * -5.0, 6.0, C_RIFLE_STOCK)?;
    draw_segment(out, pivot + along * -10.0, pivot, 4.0, C_RIFLE_MAGAZINE)?;
    draw_segment(out, pivot + along * -5.0, pivot + along * 55.0, 2.0, C_RIFLE_BARREL)
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud<S: Surface>(out: &mut S, state: &GameState) -> io::Result<()> {
    let lines = [
        format!("Level: {}", state.level),
        format!("Score: {}", state.score),
        format!("Lives: {}", state.player.lives),
    ];
    for (i, line) in lines.iter().enumerate() {
        let y = HUD_LINE * (i + 1) as f32;
        out.fill_text(line, Vec2::new(HUD_X, y), TextAlign::Left, C_HUD)?;
    }
    Ok(())
}

/// Health bars over live elders, respawn countdowns over dead ones.
fn draw_boss_status<S: Surface>(out: &mut S, state: &GameState, now: u64) -> io::Result<()> {
    let tuning = &state.tuning;
    for boss in state.bosses() {
        if boss.is_dead() {
            let secs = respawn_countdown(boss, tuning.boss_respawn_ms, now);
            let at = Vec2::new(boss.pos.x + boss.size.x / 2.0, boss.pos.y - COUNTDOWN_OFFSET);
            out.fill_text(&format!("Respawn: {}s", secs), at, TextAlign::Center, C_HUD)?;
        } else {
            let bar = Vec2::new(boss.pos.x, boss.pos.y - HEALTH_BAR_OFFSET);
            let left = 1.0 - boss.hits as f32 / tuning.boss_hit_threshold as f32;
            out.fill_rect(bar, Vec2::new(boss.size.x, HEALTH_BAR_HEIGHT), C_HEALTH_BG)?;
            if left > 0.0 {
                out.fill_rect(bar, Vec2::new(boss.size.x * left, HEALTH_BAR_HEIGHT), C_HEALTH)?;
            }
        }
    }
    Ok(())
}

// ── Projectiles ───────────────────────────────────────────────────────────────

fn draw_bullet<S: Surface>(out: &mut S, bullet: &Bullet) -> io::Result<()> {
    let color = match bullet.owner {
        BulletOwner::Player => C_BULLET_PLAYER,
        BulletOwner::Enemy => C_BULLET_ENEMY,
    };

    if let Some(trail) = &bullet.trail {
        let n = trail.points.len() as f32;
        for (i, point) in trail.points.iter().enumerate() {
            // Oldest point is largest, shrinking toward the bullet.
            let radius = 2.0 * (1.0 - i as f32 / n);
            out.fill_circle(*point, radius, C_TRAIL)?;
        }
    }

    let along = Vec2::from_angle(bullet.angle);
    let at = |d: f32| bullet.pos + along * d;
    draw_segment(out, at(-20.0), at(-15.0), 3.0, color)?; // exhaust flame
    draw_segment(out, at(-15.0), at(15.0), 3.0, C_GOLD)?; // casing
    out.fill_circle(at(15.0), 3.0, color) // tip
}

// ── Enemies ───────────────────────────────────────────────────────────────────

fn draw_normal_enemy<S: Surface>(out: &mut S, enemy: &NormalEnemy) -> io::Result<()> {
    out.fill_rect(enemy.pos, enemy.size, C_ENEMY_NORMAL)
}

fn draw_boss<S: Surface>(out: &mut S, boss: &BossEnemy) -> io::Result<()> {
    let mid_x = boss.pos.x + boss.size.x / 2.0;
    let y = boss.pos.y;
    out.fill_circle(Vec2::new(mid_x, y + 20.0), 20.0, C_GOLD)?;
    out.fill_rect(Vec2::new(mid_x - 15.0, y + 40.0), Vec2::new(30.0, 40.0), C_GOLD)?;
    out.fill_rect(Vec2::new(mid_x - 5.0, y + 50.0), Vec2::new(10.0, 40.0), C_GOLD)?;
    out.fill_rect(Vec2::new(mid_x - 5.0, y + 60.0), Vec2::new(10.0, 20.0), C_PISTOL)
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<S: Surface>(out: &mut S, state: &GameState, canvas: Canvas) -> io::Result<()> {
    out.fill_rect(Vec2::ZERO, Vec2::new(canvas.width, canvas.height), C_OVERLAY)?;
    let mid = canvas.center();
    out.fill_text("GAME OVER", mid, TextAlign::Center, C_GAME_OVER)?;
    out.fill_text(
        &format!("Final Score: {}", state.score),
        mid + Vec2::new(0.0, 50.0),
        TextAlign::Center,
        C_GAME_OVER,
    )
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A thick line approximated by overlapping discs; the surface only knows
/// axis-aligned shapes, so rotated parts are drawn this way.
fn draw_segment<S: Surface>(
    out: &mut S,
    from: Vec2,
    to: Vec2,
    thickness: f32,
    color: Color,
) -> io::Result<()> {
    let radius = thickness / 2.0;
    let steps = ((to - from).length() / radius.max(1.0)).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        out.fill_circle(from.lerp(to, t), radius, color)?;
    }
    Ok(())
}
