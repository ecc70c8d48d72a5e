use elder_shooter::compute::*;
use elder_shooter::entities::*;
use elder_shooter::input::InputSnapshot;
use elder_shooter::{Canvas, Tuning};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn canvas() -> Canvas {
    Canvas::new(800.0, 600.0)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Fresh state with the opening wave removed, so each test places its own
/// enemies.  Player top-left is (400, 500), center (425, 540).
fn make_state() -> GameState {
    let mut s = init_state(Tuning::default(), canvas(), 0, &mut seeded_rng());
    s.enemies.clear();
    s
}

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

fn holding(keys: HeldKeys) -> InputSnapshot {
    InputSnapshot {
        held: keys,
        ..InputSnapshot::default()
    }
}

fn boss_at(x: f32, y: f32) -> BossEnemy {
    BossEnemy {
        pos: Vec2::new(x, y),
        size: Vec2::new(60.0, 80.0),
        speed: 1.1,
        hits: 0,
        last_shot: 0,
        dead_since: None,
    }
}

fn normal_at(x: f32, y: f32) -> NormalEnemy {
    NormalEnemy {
        pos: Vec2::new(x, y),
        size: Vec2::new(40.0, 40.0),
        speed: 0.6,
    }
}

fn bullet(owner: BulletOwner, pos: Vec2, vel: Vec2) -> Bullet {
    let trail = match owner {
        BulletOwner::Player => None,
        BulletOwner::Enemy => Some(Trail::new(0)),
    };
    Bullet {
        pos,
        vel,
        angle: 0.0,
        owner,
        trail,
    }
}

fn boss(s: &GameState, i: usize) -> &BossEnemy {
    s.enemies[i].as_boss().expect("enemy is a boss")
}

fn count_bosses(s: &GameState) -> usize {
    s.enemies.iter().filter(|e| e.is_boss()).count()
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_player_position() {
    let s = init_state(Tuning::default(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(400.0, 500.0)); // (w/2, h-100)
    assert_eq!(s.player.size, Vec2::new(50.0, 80.0));
    assert_eq!(s.player.lives, 10);
}

#[test]
fn init_state_keeps_player_on_short_canvas() {
    let short = Canvas::new(640.0, 96.0);
    let mut s = init_state(Tuning::default(), short, 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(320.0, 0.0));
    s.enemies.clear();
    tick(&mut s, &idle(), short, 16, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(320.0, 0.0));
}

#[test]
fn init_state_clamps_on_canvas_smaller_than_player() {
    let s = init_state(Tuning::default(), Canvas::new(30.0, 40.0), 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::ZERO);
}

#[test]
fn init_state_spawns_level_one_wave() {
    let s = init_state(Tuning::default(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.level, 1);
    assert_eq!(s.score, 0);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.enemies.len(), 3); // 1x1 grid + 2 elders
    assert_eq!(count_bosses(&s), 2);
    assert!(s.bullets.is_empty());
    assert!(s.enemy_bullets.is_empty());
    assert_eq!(s.last_shot, None);
}

// ── move_player ───────────────────────────────────────────────────────────────

#[test]
fn move_each_direction() {
    let cases = [
        (HeldKeys { up: true, ..HeldKeys::default() }, Vec2::new(400.0, 495.0)),
        (HeldKeys { down: true, ..HeldKeys::default() }, Vec2::new(400.0, 505.0)),
        (HeldKeys { left: true, ..HeldKeys::default() }, Vec2::new(395.0, 500.0)),
        (HeldKeys { right: true, ..HeldKeys::default() }, Vec2::new(405.0, 500.0)),
    ];
    for (keys, expected) in cases {
        let mut s = make_state();
        tick(&mut s, &holding(keys), canvas(), 0, &mut seeded_rng());
        assert_eq!(s.player.pos, expected, "{:?}", keys);
    }
}

#[test]
fn move_diagonal_is_not_normalised() {
    let mut s = make_state();
    let keys = HeldKeys { up: true, right: true, ..HeldKeys::default() };
    tick(&mut s, &holding(keys), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(405.0, 495.0));
}

#[test]
fn move_blocked_at_top_left() {
    let mut s = make_state();
    s.player.pos = Vec2::new(2.0, 3.0);
    let keys = HeldKeys { up: true, left: true, ..HeldKeys::default() };
    tick(&mut s, &holding(keys), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(2.0, 3.0)); // a full step would leave the canvas
}

#[test]
fn move_reaches_exact_edge() {
    let mut s = make_state();
    s.player.pos = Vec2::new(745.0, 515.0);
    let keys = HeldKeys { down: true, right: true, ..HeldKeys::default() };
    tick(&mut s, &holding(keys), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(750.0, 520.0)); // (w - 50, h - 80)

    tick(&mut s, &holding(keys), canvas(), 16, &mut seeded_rng());
    assert_eq!(s.player.pos, Vec2::new(750.0, 520.0));
}

#[test]
fn move_uses_current_canvas() {
    let mut s = make_state();
    s.player.pos = Vec2::new(400.0, 100.0);
    let keys = HeldKeys { right: true, ..HeldKeys::default() };
    // The canvas shrank under the player: a step right no longer fits.
    tick(&mut s, &holding(keys), Canvas::new(452.0, 600.0), 0, &mut seeded_rng());
    assert_eq!(s.player.pos.x, 400.0);
}

#[test]
fn tick_records_held_keys() {
    let mut s = make_state();
    let keys = HeldKeys { left: true, ..HeldKeys::default() };
    tick(&mut s, &holding(keys), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.keys, keys);
}

// ── fire control ──────────────────────────────────────────────────────────────

#[test]
fn shoot_adds_bullet_at_player_center() {
    let mut s = make_state();
    s.player.angle = std::f32::consts::FRAC_PI_2;
    assert!(player_shoot(&mut s, 1000));
    assert_eq!(s.bullets.len(), 1);
    let b = &s.bullets[0];
    assert_eq!(b.pos, Vec2::new(425.0, 540.0));
    assert_eq!(b.angle, std::f32::consts::FRAC_PI_2);
    assert!(b.vel.x.abs() < 1e-4);
    assert!((b.vel.y - 12.0).abs() < 1e-4);
    assert_eq!(b.owner, BulletOwner::Player);
    assert!(b.trail.is_none());
    assert_eq!(s.last_shot, Some(1000));
}

#[test]
fn shoot_first_shot_is_never_throttled() {
    let mut s = make_state();
    assert!(player_shoot(&mut s, 0));
}

#[test]
fn shoot_cooldown_rejects_early_requests() {
    let mut s = make_state();
    assert!(player_shoot(&mut s, 1000));
    assert!(!player_shoot(&mut s, 1199));
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.last_shot, Some(1000)); // rejected shots don't reset the clock
    assert!(player_shoot(&mut s, 1200));
    assert_eq!(s.bullets.len(), 2);
}

#[test]
fn set_aim_points_from_player_center() {
    let mut s = make_state();
    set_aim(&mut s, Vec2::new(425.0, 0.0)); // straight up
    assert!((s.player.angle + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    set_aim(&mut s, Vec2::new(800.0, 540.0)); // straight right
    assert!(s.player.angle.abs() < 1e-5);
}

#[test]
fn tick_fires_with_snapshot_aim() {
    let mut s = make_state();
    let input = InputSnapshot {
        aim: std::f32::consts::PI,
        fire: true,
        ..InputSnapshot::default()
    };
    tick(&mut s, &input, canvas(), 500, &mut seeded_rng());
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.bullets[0].angle, std::f32::consts::PI);
    // Fired then advanced once: 12 px to the left of the center.
    assert!((s.bullets[0].pos.x - 413.0).abs() < 1e-3);

    tick(&mut s, &input, canvas(), 600, &mut seeded_rng());
    assert_eq!(s.bullets.len(), 1); // still cooling down
}

// ── player bullets ────────────────────────────────────────────────────────────

#[test]
fn player_bullet_moves_by_velocity() {
    let mut s = make_state();
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(100.0, 100.0), Vec2::new(3.0, -4.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.bullets[0].pos, Vec2::new(103.0, 96.0));
}

#[test]
fn player_bullet_removed_off_canvas() {
    let mut s = make_state();
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(100.0, 2.0), Vec2::new(0.0, -5.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(100.0, 5.0), Vec2::new(0.0, -5.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.bullets[0].pos.y, 0.0); // the edge itself is still on screen
}

#[test]
fn player_bullet_destroys_normal_enemy() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(120.0, 125.0), Vec2::new(0.0, -5.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
    assert_eq!(s.score, 0); // only elders score
}

#[test]
fn player_bullet_on_enemy_edge_misses() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(100.0, 125.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.bullets.len(), 1);
}

#[test]
fn player_bullet_hits_every_overlapping_enemy() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 100.0)));
    s.enemies.push(Enemy::Normal(normal_at(110.0, 110.0)));
    s.enemies.push(Enemy::Normal(normal_at(500.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(120.0, 120.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].rect().pos.x, 500.0);
    assert!(s.bullets.is_empty());
}

#[test]
fn two_bullets_on_one_normal_enemy_destroy_it_once() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 100.0)));
    s.enemies.push(Enemy::Normal(normal_at(300.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(120.0, 120.0), Vec2::ZERO));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(121.0, 121.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].rect().pos.x, 300.0);
    // The second bullet found nothing left to hit.
    assert_eq!(s.bullets.len(), 1);
}

#[test]
fn player_bullet_damages_boss() {
    let mut s = make_state();
    s.enemies.push(Enemy::Boss(boss_at(300.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(330.0, 135.0), Vec2::new(0.0, 5.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(boss(&s, 0).hits, 1);
    assert!(!boss(&s, 0).is_dead());
    assert_eq!(s.score, 1);
    assert!(s.bullets.is_empty());
}

#[test]
fn dead_boss_ignores_bullets() {
    let mut s = make_state();
    let mut b = boss_at(300.0, 100.0);
    b.hits = 30;
    b.dead_since = Some(0);
    s.enemies.push(Enemy::Boss(b));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(330.0, 140.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 100, &mut seeded_rng());
    assert_eq!(boss(&s, 0).hits, 30);
    assert_eq!(s.level, 1);
    assert_eq!(s.bullets.len(), 1);
}

#[test]
fn tuned_threshold_and_lives_bound_the_counters() {
    let tuning = Tuning {
        player_lives: 3,
        boss_hit_threshold: 3,
        ..Tuning::default()
    };
    let mut s = init_state(tuning, canvas(), 0, &mut seeded_rng());
    s.enemies.clear();
    assert_eq!(s.player.lives, 3);

    s.enemies.push(Enemy::Boss(boss_at(300.0, 100.0)));
    for hit in 1..=3u32 {
        assert!(!boss(&s, 0).is_dead());
        s.bullets.push(bullet(BulletOwner::Player, Vec2::new(330.0, 140.0), Vec2::ZERO));
        tick(&mut s, &idle(), canvas(), hit as u64, &mut seeded_rng());
        assert_eq!(boss(&s, 0).hits, hit);
    }
    assert!(boss(&s, 0).is_dead());
    assert_eq!(s.level, 2);
}

#[test]
fn boss_defeat_advances_level_and_spawns_wave() {
    let mut s = make_state();
    s.score = 17;
    let mut b = boss_at(300.0, 100.0);
    b.hits = 29;
    s.enemies.push(Enemy::Boss(b));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(330.0, 140.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 5000, &mut seeded_rng());

    assert_eq!(boss(&s, 0).hits, 30);
    assert_eq!(boss(&s, 0).dead_since, Some(5000));
    assert_eq!(s.level, 2);
    assert_eq!(s.score, 0);
    assert!(s.bullets.is_empty());
    // Level-2 wave appended: 2x2 grid + 4 elders, plus the fallen elder.
    assert_eq!(s.enemies.len(), 1 + 4 + 4);
    assert_eq!(count_bosses(&s), 1 + 4);
}

#[test]
fn two_boss_defeats_in_one_tick_advance_twice() {
    let mut s = make_state();
    for x in [300.0, 310.0] {
        let mut b = boss_at(x, 100.0);
        b.hits = 29;
        s.enemies.push(Enemy::Boss(b));
    }
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(340.0, 140.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());

    assert_eq!(s.level, 3);
    assert_eq!(s.score, 0);
    // Waves for level 2 (4 + 4) and level 3 (9 + 6).
    assert_eq!(s.enemies.len(), 2 + 8 + 15);
}

#[test]
fn thirty_hits_defeat_a_boss() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.enemies.push(Enemy::Boss(boss_at(300.0, 100.0)));

    let mut now = 0;
    for hit in 1..=30 {
        now += 200;
        let center = s.enemies[0].rect().center();
        s.bullets.push(bullet(BulletOwner::Player, center, Vec2::ZERO));
        tick(&mut s, &idle(), canvas(), now, &mut rng);
        if hit < 30 {
            assert_eq!(boss(&s, 0).hits, hit);
            assert_eq!(s.score, hit);
            assert_eq!(s.level, 1);
        }
    }

    assert!(boss(&s, 0).is_dead());
    assert_eq!(s.level, 2);
    assert_eq!(s.score, 0);
    assert_eq!(count_bosses(&s), 1 + 4);
    assert_eq!(s.enemies.len() - count_bosses(&s), 4);
    assert_eq!(s.status, GameStatus::Playing);
}

// ── enemy bullets ─────────────────────────────────────────────────────────────

#[test]
fn enemy_bullet_hits_player() {
    let mut s = make_state();
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(420.0, 535.0), Vec2::new(5.0, 5.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.lives, 9);
    assert!(s.enemy_bullets.is_empty());
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn each_overlapping_enemy_bullet_costs_one_life() {
    let mut s = make_state();
    for dx in [0.0, 5.0, 10.0] {
        s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(410.0 + dx, 540.0), Vec2::ZERO));
    }
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(100.0, 100.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.lives, 7);
    assert_eq!(s.enemy_bullets.len(), 1);
}

#[test]
fn last_life_ends_the_game() {
    let mut s = make_state();
    s.player.lives = 1;
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(425.0, 540.0), Vec2::ZERO));
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(426.0, 540.0), Vec2::ZERO));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.player.lives, 0); // floored, no underflow
    assert_eq!(s.status, GameStatus::GameOver);
}

#[test]
fn enemy_bullet_removed_off_canvas() {
    let mut s = make_state();
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(798.0, 100.0), Vec2::new(5.0, 0.0)));
    s.enemy_bullets.push(bullet(BulletOwner::Enemy, Vec2::new(100.0, 100.0), Vec2::new(5.0, 0.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemy_bullets.len(), 1);
    assert_eq!(s.enemy_bullets[0].pos, Vec2::new(105.0, 100.0));
}

// ── enemies ───────────────────────────────────────────────────────────────────

#[test]
fn normal_enemy_moves_down() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, -200.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert!((s.enemies[0].rect().pos.y + 199.4).abs() < 1e-4);
}

#[test]
fn normal_enemy_reaching_bottom_ends_game() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 599.9)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert!(s.enemies.is_empty());
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(s.player.lives, 10);
}

#[test]
fn normal_enemy_at_bottom_edge_is_still_in_play() {
    let mut s = make_state();
    s.enemies.push(Enemy::Normal(normal_at(100.0, 599.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn boss_chases_distant_player() {
    let mut s = make_state();
    s.enemies.push(Enemy::Boss(boss_at(100.0, 500.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    // Player is 300 px to the right: one step of 1.1 px along +x.
    let pos = s.enemies[0].rect().pos;
    assert!((pos.x - 101.1).abs() < 1e-4);
    assert!((pos.y - 500.0).abs() < 1e-4);
}

#[test]
fn boss_holds_position_near_player() {
    let mut s = make_state();
    s.enemies.push(Enemy::Boss(boss_at(250.0, 500.0)));
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.enemies[0].rect().pos, Vec2::new(250.0, 500.0));
}

#[test]
fn boss_fires_once_per_interval() {
    let mut s = make_state();
    s.enemies.push(Enemy::Boss(boss_at(250.0, 500.0)));

    tick(&mut s, &idle(), canvas(), 999, &mut seeded_rng());
    assert!(s.enemy_bullets.is_empty());

    tick(&mut s, &idle(), canvas(), 1000, &mut seeded_rng());
    assert_eq!(s.enemy_bullets.len(), 1);
    assert_eq!(boss(&s, 0).last_shot, 1000);

    let shot = &s.enemy_bullets[0];
    assert_eq!(shot.owner, BulletOwner::Enemy);
    assert_eq!(shot.pos, Vec2::new(280.0, 540.0)); // elder center
    assert!((shot.vel.length() - 5.0).abs() < 1e-4);
    assert!(shot.vel.x > 0.0); // towards the player
    assert!(shot.trail.as_ref().is_some_and(|t| t.points.is_empty()));

    tick(&mut s, &idle(), canvas(), 1500, &mut seeded_rng());
    assert_eq!(s.enemy_bullets.len(), 1);
}

#[test]
fn dead_boss_revives_after_delay() {
    let mut s = make_state();
    let mut b = boss_at(100.0, 100.0);
    b.hits = 30;
    b.dead_since = Some(1000);
    s.enemies.push(Enemy::Boss(b));

    tick(&mut s, &idle(), canvas(), 2999, &mut seeded_rng());
    assert!(boss(&s, 0).is_dead());
    assert_eq!(boss(&s, 0).pos, Vec2::new(100.0, 100.0)); // dead elders don't move

    tick(&mut s, &idle(), canvas(), 3000, &mut seeded_rng());
    assert!(!boss(&s, 0).is_dead());
    assert_eq!(boss(&s, 0).hits, 0);
    assert!(s.enemy_bullets.is_empty()); // the revival tick is skipped
}

// ── game over ─────────────────────────────────────────────────────────────────

#[test]
fn tick_is_inert_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    s.enemies.push(Enemy::Normal(normal_at(100.0, 100.0)));
    s.bullets.push(bullet(BulletOwner::Player, Vec2::new(50.0, 50.0), Vec2::new(1.0, 0.0)));
    let input = InputSnapshot {
        held: HeldKeys { up: true, ..HeldKeys::default() },
        fire: true,
        ..InputSnapshot::default()
    };
    tick(&mut s, &input, canvas(), 1000, &mut seeded_rng());
    assert_eq!(s.frame, 0);
    assert_eq!(s.player.pos, Vec2::new(400.0, 500.0));
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.bullets[0].pos, Vec2::new(50.0, 50.0));
    assert_eq!(s.enemies[0].rect().pos.y, 100.0);
}

#[test]
fn tick_increments_frame() {
    let mut s = make_state();
    s.frame = 5;
    tick(&mut s, &idle(), canvas(), 0, &mut seeded_rng());
    assert_eq!(s.frame, 6);
}
