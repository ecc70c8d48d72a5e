/// Game-logic functions.
///
/// Every public function takes the single `GameState` by mutable reference
/// plus the tick time in milliseconds from a monotonic clock.  The clock is
/// sampled once per frame by the driver, so every comparison inside a tick
/// sees the same `now`.  Randomness only enters through the injected RNG.

use glam::Vec2;
use rand::Rng;

use crate::config::Tuning;
use crate::entities::{
    Bullet, BulletOwner, Enemy, GameState, GameStatus, HeldKeys, Player, Trail,
};
use crate::geometry::{self, Canvas};
use crate::input::InputSnapshot;
use crate::spawner::spawn_wave;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial game state for the given canvas, with the level-1 wave
/// already spawned.
pub fn init_state(tuning: Tuning, canvas: Canvas, now: u64, rng: &mut impl Rng) -> GameState {
    let enemies = spawn_wave(1, canvas, &tuning, now, rng);
    let size = Vec2::new(tuning.player_width, tuning.player_height);
    // Tiny canvases would otherwise put the player outside the movable area.
    let max = (Vec2::new(canvas.width, canvas.height) - size).max(Vec2::ZERO);
    let pos = Vec2::new(
        canvas.width / 2.0,
        canvas.height - tuning.player_bottom_offset,
    )
    .clamp(Vec2::ZERO, max);
    GameState {
        player: Player {
            pos,
            size,
            speed: tuning.player_speed,
            angle: 0.0,
            lives: tuning.player_lives,
        },
        bullets: Vec::new(),
        enemy_bullets: Vec::new(),
        enemies,
        level: 1,
        score: 0,
        status: GameStatus::Playing,
        keys: HeldKeys::default(),
        last_shot: None,
        frame: 0,
        tuning,
    }
}

// ── Fire control ─────────────────────────────────────────────────────────────

/// Point the player's weapon at `pointer`.
pub fn set_aim(state: &mut GameState, pointer: Vec2) {
    state.player.angle = geometry::angle_to(state.player.center(), pointer);
}

/// Fire one bullet along the current aim angle.  Returns `false` when the
/// request falls inside the cooldown and nothing was fired.
pub fn player_shoot(state: &mut GameState, now: u64) -> bool {
    if let Some(last) = state.last_shot {
        if now.saturating_sub(last) < state.tuning.shoot_delay_ms {
            return false;
        }
    }
    let angle = state.player.angle;
    state.bullets.push(Bullet {
        pos: state.player.center(),
        vel: geometry::velocity(angle, state.tuning.bullet_speed),
        angle,
        owner: BulletOwner::Player,
        trail: None,
    });
    state.last_shot = Some(now);
    true
}

// ── Player movement ──────────────────────────────────────────────────────────

/// Apply one step per held direction.  A step that would leave the canvas is
/// skipped.  Diagonals are not normalised.
pub fn move_player(state: &mut GameState, canvas: Canvas) {
    let keys = state.keys;
    let p = &mut state.player;
    let max = Vec2::new(canvas.width - p.size.x, canvas.height - p.size.y);

    if keys.up && p.pos.y - p.speed >= 0.0 {
        p.pos.y -= p.speed;
    }
    if keys.down && p.pos.y + p.speed <= max.y {
        p.pos.y += p.speed;
    }
    if keys.left && p.pos.x - p.speed >= 0.0 {
        p.pos.x -= p.speed;
    }
    if keys.right && p.pos.x + p.speed <= max.x {
        p.pos.x += p.speed;
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  Does nothing once the game is over.
pub fn tick(
    state: &mut GameState,
    input: &InputSnapshot,
    canvas: Canvas,
    now: u64,
    rng: &mut impl Rng,
) {
    if state.is_over() {
        return;
    }
    state.frame += 1;

    // ── 0. Input ─────────────────────────────────────────────────────────────
    state.keys = input.held;
    state.player.angle = input.aim;
    if input.fire {
        player_shoot(state, now);
    }

    // ── 1. Player ────────────────────────────────────────────────────────────
    move_player(state, canvas);

    // ── 2. Player bullets ↔ enemies ──────────────────────────────────────────
    let waves = advance_player_bullets(state, canvas, now);
    for level in waves {
        let wave = spawn_wave(level, canvas, &state.tuning, now, rng);
        state.enemies.extend(wave);
    }

    // ── 3. Enemy bullets ↔ player ────────────────────────────────────────────
    advance_enemy_bullets(state, canvas);

    // ── 4. Enemies ───────────────────────────────────────────────────────────
    update_enemies(state, canvas, now);
}

/// Move player bullets and resolve their hits.  Returns the levels whose
/// waves must be spawned, one per elder defeated this tick.
fn advance_player_bullets(state: &mut GameState, canvas: Canvas, now: u64) -> Vec<u32> {
    let tuning = &state.tuning;
    let mut spent: Vec<usize> = Vec::new();
    let mut killed: Vec<usize> = Vec::new();
    let mut waves: Vec<u32> = Vec::new();

    for (bi, bullet) in state.bullets.iter_mut().enumerate() {
        bullet.pos += bullet.vel;

        // No early exit: one bullet may land on several overlapping enemies.
        let mut hit = false;
        for (ei, enemy) in state.enemies.iter_mut().enumerate() {
            match enemy {
                Enemy::Normal(e) => {
                    if !killed.contains(&ei) && e.rect().contains(bullet.pos) {
                        killed.push(ei);
                        hit = true;
                    }
                }
                Enemy::Boss(b) => {
                    if b.is_dead() || !b.rect().contains(bullet.pos) {
                        continue;
                    }
                    hit = true;
                    b.hits += 1;
                    state.score += 1;
                    if b.hits >= tuning.boss_hit_threshold {
                        b.dead_since = Some(now);
                        state.score += tuning.boss_defeat_bonus;
                        log::info!(
                            "Golden elder defeated at level {} (score {})",
                            state.level,
                            state.score
                        );
                        state.level += 1;
                        state.score = 0;
                        waves.push(state.level);
                    }
                }
            }
        }

        if hit || !canvas.contains(bullet.pos) {
            spent.push(bi);
        }
    }

    compact(&mut state.bullets, &spent);
    compact(&mut state.enemies, &killed);
    waves
}

fn advance_enemy_bullets(state: &mut GameState, canvas: Canvas) {
    let mut spent: Vec<usize> = Vec::new();
    let target = state.player.rect();

    for (bi, bullet) in state.enemy_bullets.iter_mut().enumerate() {
        bullet.pos += bullet.vel;

        if target.contains(bullet.pos) {
            state.player.lives = state.player.lives.saturating_sub(1);
            if state.player.lives == 0 && state.status != GameStatus::GameOver {
                log::info!("Out of lives, final score {}", state.score);
                state.status = GameStatus::GameOver;
            }
            spent.push(bi);
        } else if !canvas.contains(bullet.pos) {
            spent.push(bi);
        }
    }

    compact(&mut state.enemy_bullets, &spent);
}

fn update_enemies(state: &mut GameState, canvas: Canvas, now: u64) {
    let tuning = &state.tuning;
    let player_pos = state.player.pos;
    let player_center = state.player.center();
    let mut escaped: Vec<usize> = Vec::new();

    for (ei, enemy) in state.enemies.iter_mut().enumerate() {
        match enemy {
            Enemy::Normal(e) => {
                e.pos.y += e.speed;
                if e.pos.y > canvas.height {
                    escaped.push(ei);
                    if state.status != GameStatus::GameOver {
                        log::info!("An enemy reached the bottom, final score {}", state.score);
                    }
                    state.status = GameStatus::GameOver;
                }
            }
            Enemy::Boss(b) => {
                if let Some(since) = b.dead_since {
                    if now.saturating_sub(since) >= tuning.boss_respawn_ms {
                        log::debug!("Golden elder revived");
                        b.revive();
                    }
                    continue;
                }

                let distance = geometry::distance(b.pos, player_pos);
                if distance > tuning.boss_chase_distance {
                    if let Some(dir) = geometry::direction(b.pos, player_pos) {
                        b.pos += dir * b.speed;
                    }
                }

                if now.saturating_sub(b.last_shot) >= tuning.boss_fire_interval_ms {
                    state
                        .enemy_bullets
                        .push(enemy_bullet(b.center(), player_center, tuning, now));
                    b.last_shot = now;
                }
            }
        }
    }

    compact(&mut state.enemies, &escaped);
}

fn enemy_bullet(from: Vec2, to: Vec2, tuning: &Tuning, now: u64) -> Bullet {
    let angle = geometry::angle_to(from, to);
    Bullet {
        pos: from,
        vel: geometry::velocity(angle, tuning.boss_bullet_speed),
        angle,
        owner: BulletOwner::Enemy,
        trail: Some(Trail::new(now)),
    }
}

/// Drop every element whose index appears in `doomed`.
fn compact<T>(items: &mut Vec<T>, doomed: &[usize]) {
    if doomed.is_empty() {
        return;
    }
    let mut index = 0;
    items.retain(|_| {
        let keep = !doomed.contains(&index);
        index += 1;
        keep
    });
}
