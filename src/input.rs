/// Input adapter: raw terminal events in, one snapshot per tick out.
///
/// Input model: instead of acting on each key event individually, we keep a
/// `key_frame` map recording the frame of the last press/repeat event for
/// every key.  Each tick checks which keys are still "fresh" (within
/// `HOLD_WINDOW` frames), so WASD and the mouse can be used at once.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events, keys are dropped on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire after `HOLD_WINDOW` frames of silence.

use std::collections::HashMap;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use glam::Vec2;

use crate::display::terminal::CellSize;
use crate::entities::HeldKeys;
use crate::geometry;

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  8 frames @ 60 FPS ≈ 133 ms, longer than the OS repeat interval.
pub const HOLD_WINDOW: u64 = 8;

/// Everything the simulation needs from the player for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub held: HeldKeys,
    /// Aim angle in radians from the player center.
    pub aim: f32,
    /// A fire request arrived since the previous snapshot.
    pub fire: bool,
}

/// Events the driver must act on itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputAction {
    Quit,
    Resize(u16, u16),
}

#[derive(Debug)]
pub struct InputAdapter {
    key_frame: HashMap<KeyCode, u64>,
    /// Last pointer position in canvas pixels.
    pointer: Option<Vec2>,
    fire_requested: bool,
    aim: f32,
    cell: CellSize,
}

impl InputAdapter {
    pub fn new(cell: CellSize) -> Self {
        Self {
            key_frame: HashMap::new(),
            pointer: None,
            fire_requested: false,
            aim: 0.0,
            cell,
        }
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Feed one terminal event received during `frame`.
    pub fn handle_event(&mut self, event: &Event, frame: u64) -> Option<InputAction> {
        match event {
            Event::Key(key) => self.handle_key(key, frame),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            Event::Resize(cols, rows) => Some(InputAction::Resize(*cols, *rows)),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, frame: u64) -> Option<InputAction> {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Press => {
                self.key_frame.insert(code, frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Some(InputAction::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Some(InputAction::Quit);
                    }
                    KeyCode::Char(' ') => self.fire_requested = true,
                    _ => {}
                }
            }
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
        None
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.pointer = Some(self.cell.center_of(mouse.column, mouse.row));
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some(self.cell.center_of(mouse.column, mouse.row));
                self.fire_requested = true;
            }
            _ => {}
        }
    }

    fn is_held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|key| {
            self.key_frame
                .get(key)
                .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
                .unwrap_or(false)
        })
    }

    /// Build the snapshot for `frame`.  The aim is recomputed against the
    /// player's current center; a pending fire request is consumed.
    pub fn snapshot(&mut self, frame: u64, player_center: Vec2) -> InputSnapshot {
        if let Some(pointer) = self.pointer {
            if pointer != player_center {
                self.aim = geometry::angle_to(player_center, pointer);
            }
        }
        let held = HeldKeys {
            up: self.is_held(&[KeyCode::Char('w'), KeyCode::Up], frame),
            down: self.is_held(&[KeyCode::Char('s'), KeyCode::Down], frame),
            left: self.is_held(&[KeyCode::Char('a'), KeyCode::Left], frame),
            right: self.is_held(&[KeyCode::Char('d'), KeyCode::Right], frame),
        };
        InputSnapshot {
            held,
            aim: self.aim,
            fire: std::mem::take(&mut self.fire_requested),
        }
    }
}

/// Letter keys are tracked case-insensitively.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
