//! Painter's-algorithm renderer for the maze.
//!
//! Per frame: sky fill, floor quads, wall faces, then entity markers. Each
//! category is sorted farthest-first and painted over the previous one.
//! Only cells in a window around the eye are ever considered.

use raylib::prelude::{Color, Vector2, Vector3};

use super::camera::{clip_near, Camera, Viewpoint};
use super::sprites::{collect_markers, draw_markers};
use super::surface::Surface;
use crate::config::RenderConfig;
use crate::core::grid::{Cell, Grid, GridPos, AXIS_DIRECTIONS};
use crate::core::level::Level;

pub const SKY: Color = Color { r: 30, g: 50, b: 80, a: 255 };
const ROOM_FLOOR: Color = Color { r: 140, g: 170, b: 200, a: 255 };
const CORRIDOR_FLOOR: Color = Color { r: 120, g: 160, b: 120, a: 255 };
const WALL: Color = Color { r: 140, g: 110, b: 80, a: 255 };

const FLOOR_FALLOFF: f32 = 50.0;
const FLOOR_MIN_BRIGHTNESS: f32 = 0.7;
const WALL_FALLOFF: f32 = 25.0;
const WALL_MIN_BRIGHTNESS: f32 = 0.4;

/// Counters for one rendered frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub floors_drawn: u32,
    /// Wall cells in range with at least one open neighbor.
    pub walls_considered: u32,
    pub walls_distance_culled: u32,
    pub walls_occlusion_culled: u32,
    /// Wall faces painted.
    pub walls_drawn: u32,
    pub markers_drawn: u32,
    /// Primitives dropped at projection or rasterization.
    pub primitives_skipped: u32,
}

/// A flat-colored screen polygon with its sort depth.
struct Primitive {
    points: Vec<Vector2>,
    depth: f32,
    fill: Color,
    outline: Color,
}

/// Scale a color towards black. `brightness` is clamped to `[0, 1]`.
pub fn shade(color: Color, brightness: f32) -> Color {
    let b = brightness.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * b).round() as u8;
    Color::new(scale(color.r), scale(color.g), scale(color.b), color.a)
}

/// Move a color towards white by `amount` in `[0, 1]`.
pub fn lighten(color: Color, amount: f32) -> Color {
    let a = amount.clamp(0.0, 1.0);
    let lift = |c: u8| (c as f32 + (255.0 - c as f32) * a).round() as u8;
    Color::new(lift(color.r), lift(color.g), lift(color.b), color.a)
}

/// Whether a sampled ray from the eye to `target` crosses another wall cell first.
///
/// Walls closer than `min_distance` are never occluded. Sampling at a fixed
/// step can both miss thin corners and hide walls seen at grazing angles.
pub fn is_wall_occluded(grid: &Grid, from_x: f32, from_z: f32, target: GridPos, step: f32, min_distance: f32) -> bool {
    let (tx, tz) = target.center();
    let (dx, dz) = (tx - from_x, tz - from_z);
    let distance = dx.hypot(dz);
    if distance < min_distance || step <= 0.0 {
        return false;
    }
    let steps = (distance / step) as i32;
    (1..steps).any(|i| {
        let t = i as f32 * step / distance;
        let cell = GridPos::from_world(from_x + dx * t, from_z + dz * t);
        cell != target && grid.cell_or_wall(cell) == Cell::Wall
    })
}

/// Draw one frame of `level` seen from `eye`.
pub fn render_frame<S: Surface>(
    surface: &mut S,
    level: &Level,
    eye: &Viewpoint,
    camera: &Camera,
    config: &RenderConfig,
) -> FrameStats {
    let mut stats = FrameStats::default();
    let (width, height) = (surface.width() as f32, surface.height() as f32);
    surface.clear(SKY);

    let mut floors = collect_floors(level, eye, camera, config, width, height);
    let mut walls = collect_walls(level, eye, camera, config, width, height, &mut stats);
    stats.floors_drawn = paint(surface, &mut floors, &mut stats);
    stats.walls_drawn = paint(surface, &mut walls, &mut stats);

    let mut markers = collect_markers(level, eye, camera, config, width, height);
    let (drawn, skipped) = draw_markers(surface, &mut markers);
    stats.markers_drawn = drawn;
    stats.primitives_skipped += skipped;

    log::trace!("{stats:?}");
    stats
}

fn paint<S: Surface>(surface: &mut S, primitives: &mut [Primitive], stats: &mut FrameStats) -> u32 {
    primitives.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let mut drawn = 0;
    for primitive in primitives.iter() {
        if surface.fill_polygon(&primitive.points, primitive.fill).is_err() {
            stats.primitives_skipped += 1;
            continue;
        }
        let points = &primitive.points;
        for (i, &a) in points.iter().enumerate() {
            surface.draw_line(a, points[(i + 1) % points.len()], primitive.outline);
        }
        drawn += 1;
    }
    drawn
}

/// Project all corners. `None` if any corner fails or lies at or past `max_depth`.
fn project_all(eye: &Viewpoint, camera: &Camera, corners: &[Vector3], max_depth: f32, width: f32, height: f32) -> Option<(Vec<Vector2>, f32)> {
    let mut points = Vec::with_capacity(corners.len());
    let mut depth = 0.0;
    for &corner in corners {
        let p = camera.project_from(eye, corner, width, height)?;
        if p.depth >= max_depth {
            return None;
        }
        points.push(Vector2::new(p.x, p.y));
        depth += p.depth;
    }
    Some((points, depth / corners.len() as f32))
}

fn collect_floors(level: &Level, eye: &Viewpoint, camera: &Camera, config: &RenderConfig, width: f32, height: f32) -> Vec<Primitive> {
    let center = GridPos::from_world(eye.position.x, eye.position.z);
    let radius = config.floor_radius;
    let step = config.floor_sample_step.max(1);
    let size = step as f32;
    let y = config.floor_level();
    let mut floors = Vec::new();

    for z in (center.z - radius..=center.z + radius).step_by(step) {
        for x in (center.x - radius..=center.x + radius).step_by(step) {
            let base = match level.grid.get(GridPos::new(x, z)) {
                Some(Cell::Room) => ROOM_FLOOR,
                Some(Cell::Corridor | Cell::Door) => CORRIDOR_FLOOR,
                Some(Cell::Wall) | None => continue,
            };
            let (x0, z0) = (x as f32, z as f32);
            let corners = [
                Vector3::new(x0, y, z0),
                Vector3::new(x0 + size, y, z0),
                Vector3::new(x0 + size, y, z0 + size),
                Vector3::new(x0, y, z0 + size),
            ];
            let Some((points, depth)) = project_all(eye, camera, &corners, config.floor_max_depth, width, height) else {
                continue;
            };
            if depth >= config.floor_fade_depth {
                continue;
            }
            let fill = shade(base, (1.0 - depth / FLOOR_FALLOFF).max(FLOOR_MIN_BRIGHTNESS));
            floors.push(Primitive {
                points,
                depth,
                fill,
                outline: lighten(fill, 0.25),
            });
        }
    }
    floors
}

/// The two ground corners of the face a wall cell shows towards `direction`.
fn face_corners(pos: GridPos, (dx, dz): (i32, i32)) -> [(f32, f32); 2] {
    let (x, z) = (pos.x as f32, pos.z as f32);
    match (dx, dz) {
        (0, -1) => [(x, z), (x + 1.0, z)],
        (0, 1) => [(x + 1.0, z + 1.0), (x, z + 1.0)],
        (-1, 0) => [(x, z + 1.0), (x, z)],
        _ => [(x + 1.0, z), (x + 1.0, z + 1.0)],
    }
}

fn wall_face(
    pos: GridPos,
    direction: (i32, i32),
    eye: &Viewpoint,
    camera: &Camera,
    config: &RenderConfig,
    width: f32,
    height: f32,
) -> Option<Primitive> {
    let [(ax, az), (bx, bz)] = face_corners(pos, direction);
    let bottom = config.floor_level();
    let top = config.base_level + config.wall_height;
    let quad = [
        eye.to_view(Vector3::new(ax, bottom, az)),
        eye.to_view(Vector3::new(bx, bottom, bz)),
        eye.to_view(Vector3::new(bx, top, bz)),
        eye.to_view(Vector3::new(ax, top, az)),
    ];
    let clipped = clip_near(&quad, config.wall_clip_near.max(camera.near * 2.0));
    if clipped.len() < 3 {
        return None;
    }
    let mut points = Vec::with_capacity(clipped.len());
    let mut depth = 0.0;
    for &v in &clipped {
        let p = camera.project_view(v, width, height)?;
        points.push(Vector2::new(p.x, p.y));
        depth += p.depth;
    }
    let depth = depth / clipped.len() as f32;
    let fill = shade(WALL, (1.0 - depth / WALL_FALLOFF).max(WALL_MIN_BRIGHTNESS));
    Some(Primitive {
        points,
        depth,
        fill,
        outline: shade(fill, 0.6),
    })
}

fn collect_walls(
    level: &Level,
    eye: &Viewpoint,
    camera: &Camera,
    config: &RenderConfig,
    width: f32,
    height: f32,
    stats: &mut FrameStats,
) -> Vec<Primitive> {
    let grid = &level.grid;
    let center = GridPos::from_world(eye.position.x, eye.position.z);
    let radius = config.wall_radius;
    let cull_distance = radius as f32 + config.wall_cull_margin;
    let mut walls = Vec::new();

    for z in center.z - radius..=center.z + radius {
        for x in center.x - radius..=center.x + radius {
            let pos = GridPos::new(x, z);
            if grid.get(pos) != Some(Cell::Wall) {
                continue;
            }
            let open: Vec<(i32, i32)> = AXIS_DIRECTIONS
                .into_iter()
                .filter(|&(dx, dz)| grid.get(pos.offset(dx, dz)).is_some_and(Cell::is_walkable))
                .collect();
            if open.is_empty() {
                continue;
            }
            stats.walls_considered += 1;

            let (cx, cz) = pos.center();
            if eye.ground_distance(cx, cz) > cull_distance {
                stats.walls_distance_culled += 1;
                continue;
            }
            if is_wall_occluded(
                grid,
                eye.position.x,
                eye.position.z,
                pos,
                config.occlusion_step,
                config.occlusion_min_distance,
            ) {
                stats.walls_occlusion_culled += 1;
                continue;
            }
            for direction in open {
                match wall_face(pos, direction, eye, camera, config, width, height) {
                    Some(face) => walls.push(face),
                    None => stats.primitives_skipped += 1,
                }
            }
        }
    }
    walls
}

/// Small cross at the screen center.
pub fn draw_crosshair<S: Surface>(surface: &mut S, color: Color) {
    let (cx, cy) = (surface.width() as f32 / 2.0, surface.height() as f32 / 2.0);
    surface.draw_line(Vector2::new(cx - 8.0, cy), Vector2::new(cx + 8.0, cy), color);
    surface.draw_line(Vector2::new(cx, cy - 8.0), Vector2::new(cx, cy + 8.0), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::core::content::EntityMap;
    use crate::core::level::{Spawn, SpawnStrategy};
    use crate::render::framebuffer::Framebuffer;
    use pretty_assertions::assert_eq;

    /// 15x15 level with one corridor along z at x = 7.
    fn corridor_level() -> Level {
        let mut grid = Grid::new(15, 15);
        for z in 2..13 {
            grid.set(GridPos::new(7, z), Cell::Corridor);
        }
        Level {
            grid,
            rooms: Vec::new(),
            entities: EntityMap::new(),
            start: GridPos::new(7, 7),
            spawn: Spawn { pos: GridPos::new(7, 3), strategy: SpawnStrategy::NearCenter },
            seed: 0,
        }
    }

    #[test]
    fn shading_clamps() {
        assert_eq!(shade(WALL, 2.0), WALL);
        assert_eq!(shade(WALL, -1.0), Color::new(0, 0, 0, 255));
        assert_eq!(lighten(Color::new(0, 100, 255, 255), 1.0), Color::new(255, 255, 255, 255));
    }

    #[test]
    fn walls_behind_other_walls_are_occluded() {
        let level = corridor_level();
        let grid = &level.grid;
        // Straight down the corridor to the end wall: clear.
        assert!(!is_wall_occluded(grid, 7.5, 3.5, GridPos::new(7, 13), 0.5, 3.0));
        // Diagonally through the side wall: blocked.
        assert!(is_wall_occluded(grid, 7.5, 3.5, GridPos::new(5, 11), 0.5, 3.0));
        // Close walls are always kept.
        assert!(!is_wall_occluded(grid, 7.5, 3.5, GridPos::new(5, 4), 0.5, 3.0));
    }

    #[test]
    fn corridor_frame_draws_floor_and_walls() {
        let level = corridor_level();
        let config = RenderConfig::default();
        let camera = Camera::new(&CameraConfig::default());
        let eye = Viewpoint::new(Vector3::new(7.5, config.floor_level() + 1.7, 3.5), 0.0, 0.0);
        let mut fb = Framebuffer::new(160, 120);

        let stats = render_frame(&mut fb, &level, &eye, &camera, &config);
        assert!(stats.floors_drawn > 0, "{stats:?}");
        assert!(stats.walls_drawn > 0, "{stats:?}");
        assert!(stats.walls_occlusion_culled > 0, "{stats:?}");
        assert_eq!(stats.walls_distance_culled, 0);
        assert_ne!(fb.get_pixel(80, 60), Some(SKY));
    }

    fn level_from(grid: Grid, start: GridPos) -> Level {
        Level {
            grid,
            rooms: Vec::new(),
            entities: EntityMap::new(),
            start,
            spawn: Spawn { pos: start, strategy: SpawnStrategy::NearCenter },
            seed: 0,
        }
    }

    #[test]
    fn far_walls_inside_the_window_are_distance_culled() {
        let mut grid = Grid::new(81, 81);
        for z in 1..80 {
            for x in 1..80 {
                grid.set(GridPos::new(x, z), Cell::Room);
            }
        }
        let level = level_from(grid, GridPos::new(20, 40));
        let config = RenderConfig::default();
        let camera = Camera::new(&CameraConfig::default());
        let eye = Viewpoint::new(Vector3::new(20.5, config.floor_level() + 1.7, 40.5), 0.0, 0.0);
        let mut fb = Framebuffer::new(160, 120);

        let stats = render_frame(&mut fb, &level, &eye, &camera, &config);
        // West ring cells near the window corners lie past radius + margin.
        assert!(stats.walls_distance_culled > 0, "{stats:?}");
        assert!(stats.walls_considered > stats.walls_distance_culled, "{stats:?}");
    }

    #[test]
    fn cells_outside_the_window_are_never_emitted() {
        let mut grid = Grid::new(81, 81);
        for z in 30..=50 {
            grid.set(GridPos::new(40, z), Cell::Corridor);
        }
        let near_only = level_from(grid.clone(), GridPos::new(40, 40));
        grid.set(GridPos::new(40, 78), Cell::Corridor);
        let with_far_cell = level_from(grid, GridPos::new(40, 40));

        let config = RenderConfig {
            floor_max_depth: 200.0,
            floor_fade_depth: 200.0,
            ..RenderConfig::default()
        };
        let camera = Camera::new(&CameraConfig::default());
        let eye = Viewpoint::new(Vector3::new(40.5, config.floor_level() + 1.7, 40.5), 0.0, 0.0);
        let mut fb = Framebuffer::new(160, 120);

        let baseline = render_frame(&mut fb, &near_only, &eye, &camera, &config);
        let far = render_frame(&mut fb, &with_far_cell, &eye, &camera, &config);
        assert_eq!(far, baseline);

        // The same cell is picked up once the window reaches it.
        let wide = RenderConfig { floor_radius: 40, ..config };
        let widened = render_frame(&mut fb, &with_far_cell, &eye, &camera, &wide);
        assert!(
            widened.floors_drawn + widened.primitives_skipped > baseline.floors_drawn + baseline.primitives_skipped,
            "{widened:?} vs {baseline:?}"
        );
    }

    #[test]
    fn looking_at_open_sky_draws_only_sky() {
        let level = corridor_level();
        let config = RenderConfig::default();
        let camera = Camera::new(&CameraConfig::default());
        // High above the maze looking straight up.
        let eye = Viewpoint::new(Vector3::new(7.5, 50.0, 7.5), 0.0, 1.5);
        let mut fb = Framebuffer::new(64, 48);
        let stats = render_frame(&mut fb, &level, &eye, &camera, &config);
        assert_eq!(stats.floors_drawn, 0);
        assert!(fb.color_buffer.iter().all(|&c| c == SKY));
    }
}
