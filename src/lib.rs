//! First-person maze exploration with a software renderer.
//!
//! - `core`: maze generation, content, player and session logic
//! - `render`: projection, framebuffer and painter
//! - `config`: RON configuration
//! - `audio_manager`: optional sound cues

pub mod audio_manager;
pub mod config;
pub mod core;
pub mod error;
pub mod render;
