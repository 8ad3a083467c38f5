//! Software rendering.
//!
//! Modules:
//! - `camera`: world-to-screen projection and near-plane clipping
//! - `surface`: drawing target trait
//! - `framebuffer`: CPU framebuffer implementing `Surface`
//! - `render3d`: painter for floors and walls
//! - `sprites`: billboard markers for entities
//! - `minimap`: top-down overview

pub mod camera;
pub mod surface;
pub mod framebuffer;
pub mod render3d;
pub mod sprites;
pub mod minimap;
