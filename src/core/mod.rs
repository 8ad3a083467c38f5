//! World data, player state and session logic.
//!
//! Modules:
//! - `grid`: cell tags, coordinates, rooms and flood fill
//! - `maze`: procedural maze generation
//! - `content`: monster and treasure placement
//! - `level`: a generated level with a safe spawn
//! - `player`: movement, collision and vertical physics
//! - `encounter`: battles, loot and session statistics
//! - `session`: per-frame update and messages
//! - `process_events`: keyboard/mouse sampling

pub mod grid;
pub mod maze;
pub mod content;
pub mod level;
pub mod player;
pub mod encounter;
pub mod session;
pub mod process_events;
