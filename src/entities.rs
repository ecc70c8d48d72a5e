/// All game entity types — pure data, next to no logic.

use std::collections::VecDeque;

use glam::Vec2;

use crate::config::Tuning;
use crate::geometry::Rect;

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Movement keys currently held, as logical directions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Recent positions of an enemy bullet, oldest first.  Cosmetic only.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    pub points: VecDeque<Vec2>,
    /// Timestamp (ms) of the last recorded point.
    pub last_update: u64,
}

impl Trail {
    pub fn new(now: u64) -> Self {
        Self {
            points: VecDeque::new(),
            last_update: now,
        }
    }

    /// Append `pos` if more than `interval` ms passed since the last point,
    /// dropping the oldest points beyond `cap`.
    pub fn record(&mut self, pos: Vec2, now: u64, interval: u64, cap: usize) {
        if now.saturating_sub(self.last_update) <= interval {
            return;
        }
        self.points.push_back(pos);
        while self.points.len() > cap {
            self.points.pop_front();
        }
        self.last_update = now;
    }
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub pos: Vec2,
    /// Added to `pos` every tick.
    pub vel: Vec2,
    pub angle: f32,
    pub owner: BulletOwner,
    /// Only enemy bullets leave a trail.
    pub trail: Option<Trail>,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Aim angle in radians, measured from the player center.
    pub angle: f32,
    pub lives: u32,
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NormalEnemy {
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick, straight down.
    pub speed: f32,
}

impl NormalEnemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// The golden elder: chases the player, shoots back, and comes back to life
/// a while after being defeated.
#[derive(Clone, Debug)]
pub struct BossEnemy {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// Hits taken since the last revival.
    pub hits: u32,
    pub last_shot: u64,
    /// When the elder went down; `None` while alive.
    pub dead_since: Option<u64>,
}

impl BossEnemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub fn is_dead(&self) -> bool {
        self.dead_since.is_some()
    }

    pub fn revive(&mut self) {
        self.dead_since = None;
        self.hits = 0;
    }
}

#[derive(Clone, Debug)]
pub enum Enemy {
    Normal(NormalEnemy),
    Boss(BossEnemy),
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        match self {
            Enemy::Normal(e) => e.rect(),
            Enemy::Boss(b) => b.rect(),
        }
    }

    pub fn as_boss(&self) -> Option<&BossEnemy> {
        match self {
            Enemy::Boss(b) => Some(b),
            Enemy::Normal(_) => None,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, Enemy::Boss(_))
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state, owned by the driver and handed to the simulation
/// and the renderer by reference.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    /// Bullets fired by the player.
    pub bullets: Vec<Bullet>,
    /// Bullets fired by golden elders.
    pub enemy_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub level: u32,
    pub score: u32,
    pub status: GameStatus,
    /// Movement keys applied on the most recent tick.
    pub keys: HeldKeys,
    /// Timestamp (ms) of the last accepted player shot.
    pub last_shot: Option<u64>,
    pub frame: u64,
    pub tuning: Tuning,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn bosses(&self) -> impl Iterator<Item = &BossEnemy> {
        self.enemies.iter().filter_map(Enemy::as_boss)
    }
}
