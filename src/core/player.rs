//! Player state: position, view angles, vertical physics and progression.
//!
//! Collision is grid occupancy only. A blocked move retries along x and then
//! along z so the player slides along walls.

use raylib::prelude::{Vector2, Vector3};

use super::encounter::Weapon;
use super::grid::GridPos;
use super::level::Level;
use crate::config::PlayerConfig;

/// Experience needed per level.
pub const EXPERIENCE_PER_LEVEL: u32 = 100;

/// Vertical speeds below this count as resting on the ground.
const RESTING_SPEED: f32 = 0.1;

/// Longest single collision-checked step, in cells.
const MAX_STEP: f32 = 0.5;

pub struct Player {
    /// `x`/`z` on the grid plane, `y` is eye height.
    pub position: Vector3,
    /// Radians. Zero looks along +z.
    pub yaw: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub hp: i32,
    pub max_hp: i32,
    pub level: u32,
    pub experience: u32,
    pub weapon: Weapon,
    pub weapon_upgrades: u32,
}

impl Player {
    pub fn new(config: &PlayerConfig, position: Vector3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            hp: config.max_hp,
            max_hp: config.max_hp,
            level: 1,
            experience: 0,
            weapon: Weapon::Sword,
            weapon_upgrades: 0,
        }
    }

    /// Unit view direction on the grid plane.
    pub fn forward(&self) -> Vector2 {
        Vector2::new(-self.yaw.sin(), self.yaw.cos())
    }

    pub fn right(&self) -> Vector2 {
        Vector2::new(self.yaw.cos(), self.yaw.sin())
    }

    /// Apply mouse motion. Sensitivity and limit are in degrees.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32, pitch_limit: f32) {
        let limit = pitch_limit.to_radians();
        self.yaw -= (dx * sensitivity).to_radians();
        self.pitch = (self.pitch - (dy * sensitivity).to_radians()).clamp(-limit, limit);
    }

    /// The grid cell under the player.
    pub fn cell(&self) -> GridPos {
        GridPos::from_world(self.position.x, self.position.z)
    }

    /// Move by `(dx, dz)`, sliding along one axis when the full move is blocked.
    /// Returns whether the position changed.
    pub fn try_move(&mut self, level: &Level, dx: f32, dz: f32, buffer: f32) -> bool {
        let (x, z) = (self.position.x, self.position.z);
        let target = if level.can_move_to(x + dx, z + dz, buffer) {
            Some((x + dx, z + dz))
        } else if dx != 0.0 && level.can_move_to(x + dx, z, buffer) {
            Some((x + dx, z))
        } else if dz != 0.0 && level.can_move_to(x, z + dz, buffer) {
            Some((x, z + dz))
        } else {
            None
        };
        match target {
            Some((nx, nz)) => {
                self.position.x = nx;
                self.position.z = nz;
                true
            }
            None => false,
        }
    }

    /// Walk along the view axes. `forward` and `strafe` are in `[-1, 1]`.
    pub fn walk(&mut self, level: &Level, forward: f32, strafe: f32, distance: f32, buffer: f32) -> bool {
        let (f, r) = (self.forward(), self.right());
        let dx = f.x * forward + r.x * strafe;
        let dz = f.y * forward + r.y * strafe;
        let length = dx.hypot(dz);
        if length <= f32::EPSILON {
            return false;
        }
        let scale = distance / length.max(1.0);
        let (dx, dz) = (dx * scale, dz * scale);
        // Sub-steps keep a slow frame from skipping over a one-cell wall.
        let steps = (dx.hypot(dz) / MAX_STEP).ceil().max(1.0) as usize;
        let (step_x, step_z) = (dx / steps as f32, dz / steps as f32);
        let mut moved = false;
        for _ in 0..steps {
            if !self.try_move(level, step_x, step_z, buffer) {
                break;
            }
            moved = true;
        }
        moved
    }

    /// Start a jump if standing still on the ground.
    pub fn jump(&mut self, strength: f32) -> bool {
        if self.grounded && self.vertical_velocity.abs() < RESTING_SPEED {
            self.vertical_velocity = strength;
            self.grounded = false;
            true
        } else {
            false
        }
    }

    /// Integrate gravity and clamp at `ground`, the eye height when standing.
    pub fn apply_physics(&mut self, dt: f32, gravity: f32, ground: f32) {
        self.vertical_velocity += gravity * dt;
        self.position.y += self.vertical_velocity * dt;
        if self.position.y <= ground {
            self.position.y = ground;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    /// Put the player at `position`, at rest. Stats are kept.
    pub fn respawn(&mut self, position: Vector3) {
        self.position = position;
        self.vertical_velocity = 0.0;
        self.grounded = true;
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    pub fn damage(&mut self, amount: i32) {
        self.hp -= amount;
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Add experience. Returns the new level if it went up.
    pub fn gain_experience(&mut self, amount: u32) -> Option<u32> {
        self.experience += amount;
        let level = self.experience / EXPERIENCE_PER_LEVEL + 1;
        if level <= self.level {
            return None;
        }
        self.max_hp += (level - self.level) as i32;
        self.hp = self.max_hp;
        self.level = level;
        Some(level)
    }
}
