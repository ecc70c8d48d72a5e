//! Golden Elder Shooter - a single-screen arcade shooter for the terminal
//!
//! Core modules:
//! - `geometry`: vector helpers, rectangles and canvas bounds
//! - `config`: tuning constants, loadable from JSON
//! - `entities`: plain data for the player, bullets, enemies and game state
//! - `spawner`: enemy waves as a function of level
//! - `compute`: the per-tick simulation and fire control
//! - `display`: rendering onto an abstract drawing surface
//! - `input`: terminal events to per-tick input snapshots

pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod spawner;

pub use config::Tuning;
pub use entities::GameState;
pub use geometry::Canvas;
