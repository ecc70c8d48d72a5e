//! Small 2D helpers shared by the simulation and the renderer.

use glam::Vec2;

/// Size of the playfield in pixels.  Re-read from the surface every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds test; a point exactly on the edge is still on screen.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl From<(f32, f32)> for Canvas {
    fn from((width, height): (f32, f32)) -> Self {
        Self::new(width, height)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Strict containment: points on the border do not count as a hit.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.pos.x
            && p.x < self.pos.x + self.size.x
            && p.y > self.pos.y
            && p.y < self.pos.y + self.size.y
    }
}

/// Angle (radians) of the vector pointing from `from` to `to`.
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` towards `to`, or `None` when the points coincide.
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}

/// Velocity of magnitude `speed` along `angle`.
#[inline]
pub fn velocity(angle: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(angle) * speed
}
