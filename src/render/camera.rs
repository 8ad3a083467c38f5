//! Perspective projection from world space to screen pixels.
//!
//! View space has `x` to the right, `y` up and `z` forward. The view is
//! rotated by yaw about the vertical axis first, then by pitch.

use raylib::prelude::Vector3;

use crate::config::CameraConfig;

/// A point on screen with its camera-space forward distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Eye position and orientation with the trig precomputed for a frame.
#[derive(Copy, Clone, Debug)]
pub struct Viewpoint {
    pub position: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    sin_yaw: f32,
    cos_yaw: f32,
    sin_pitch: f32,
    cos_pitch: f32,
}

impl Viewpoint {
    pub fn new(position: Vector3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            sin_yaw: yaw.sin(),
            cos_yaw: yaw.cos(),
            sin_pitch: pitch.sin(),
            cos_pitch: pitch.cos(),
        }
    }

    /// World point to view space.
    pub fn to_view(&self, point: Vector3) -> Vector3 {
        let rel_x = point.x - self.position.x;
        let rel_y = point.y - self.position.y;
        let rel_z = point.z - self.position.z;

        let x = rel_x * self.cos_yaw + rel_z * self.sin_yaw;
        let z = -rel_x * self.sin_yaw + rel_z * self.cos_yaw;

        let y = rel_y * self.cos_pitch - z * self.sin_pitch;
        let z = rel_y * self.sin_pitch + z * self.cos_pitch;
        Vector3::new(x, y, z)
    }

    /// Distance on the grid plane to a world `(x, z)`.
    pub fn ground_distance(&self, x: f32, z: f32) -> f32 {
        (x - self.position.x).hypot(z - self.position.z)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// Horizontal field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
        }
    }

    /// Project a view-space point. `None` at or behind the near plane or past the far plane.
    ///
    /// Each axis is scaled by its own half extent.
    pub fn project_view(&self, view: Vector3, width: f32, height: f32) -> Option<Projected> {
        if !(view.z > self.near) || view.z > self.far {
            return None;
        }
        let spread = view.z * (self.fov * 0.5).tan();
        let projected = Projected {
            x: width * 0.5 + view.x * (width * 0.5) / spread,
            y: height * 0.5 - view.y * (height * 0.5) / spread,
            depth: view.z,
        };
        (projected.x.is_finite() && projected.y.is_finite()).then_some(projected)
    }

    pub fn project_from(&self, eye: &Viewpoint, point: Vector3, width: f32, height: f32) -> Option<Projected> {
        self.project_view(eye.to_view(point), width, height)
    }

    /// One-off projection of `point` seen from `position`.
    pub fn project(
        &self,
        point: Vector3,
        position: Vector3,
        pitch: f32,
        yaw: f32,
        width: f32,
        height: f32,
    ) -> Option<Projected> {
        self.project_from(&Viewpoint::new(position, yaw, pitch), point, width, height)
    }
}

/// Clip a view-space polygon to `z >= near` (Sutherland-Hodgman, one plane).
pub fn clip_near(polygon: &[Vector3], near: f32) -> Vec<Vector3> {
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let current_in = current.z >= near;
        let next_in = next.z >= near;
        if current_in {
            out.push(current);
        }
        if current_in != next_in {
            let t = (near - current.z) / (next.z - current.z);
            out.push(Vector3::new(
                current.x + (next.x - current.x) * t,
                current.y + (next.y - current.y) * t,
                near,
            ));
        }
    }
    out
}
