//! Billboard markers for monsters and treasures.
//!
//! Exposes:
//! - `collect_markers`: project active entities in range to screen markers
//! - `draw_markers`: sort farthest-first and draw
//!
use raylib::prelude::{Color, Vector2, Vector3};

use super::camera::{Camera, Viewpoint};
use super::render3d::shade;
use super::surface::Surface;
use crate::config::RenderConfig;
use crate::core::content::{Entity, MonsterKind};
use crate::core::level::Level;

const MONSTER_ELEVATION: f32 = 1.2;
const TREASURE_ELEVATION: f32 = 0.4;
const MIN_DEPTH: f32 = 0.1;
/// Markers this far outside the viewport are still kept so large ones stay visible at the edges.
const SCREEN_MARGIN: f32 = 100.0;
const MIN_RADIUS: f32 = 4.0;
const RADIUS_SCALE: f32 = 60.0;
const TREASURE_COLOR: Color = Color { r: 230, g: 200, b: 60, a: 255 };

fn monster_color(kind: MonsterKind) -> Color {
    match kind {
        MonsterKind::Dragon => Color::new(200, 60, 40, 255),
        MonsterKind::Troll => Color::new(90, 140, 60, 255),
        MonsterKind::Witch => Color::new(150, 70, 180, 255),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Glyph {
    Horns,
    Gem,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Marker {
    pub center: Vector2,
    pub radius: f32,
    pub depth: f32,
    pub color: Color,
    pub glyph: Option<Glyph>,
}

pub fn collect_markers(
    level: &Level,
    eye: &Viewpoint,
    camera: &Camera,
    config: &RenderConfig,
    width: f32,
    height: f32,
) -> Vec<Marker> {
    let floor = config.floor_level();
    let mut markers = Vec::new();
    for (pos, entity) in level.entities.iter() {
        if !entity.is_active() {
            continue;
        }
        let (x, z) = pos.center();
        let (cutoff, max_depth, elevation, color, glyph_depth, glyph) = match entity {
            Entity::Monster(m) => (
                config.monster_cutoff,
                config.monster_max_depth,
                MONSTER_ELEVATION,
                monster_color(m.kind),
                config.monster_glyph_depth,
                Glyph::Horns,
            ),
            Entity::Treasure(_) => (
                config.treasure_cutoff,
                config.treasure_max_depth,
                TREASURE_ELEVATION,
                TREASURE_COLOR,
                config.treasure_glyph_depth,
                Glyph::Gem,
            ),
        };
        if eye.ground_distance(x, z) > cutoff {
            continue;
        }
        let Some(p) = camera.project_from(eye, Vector3::new(x, floor + elevation, z), width, height) else {
            continue;
        };
        if p.depth <= MIN_DEPTH || p.depth >= max_depth {
            continue;
        }
        if p.x < -SCREEN_MARGIN || p.x > width + SCREEN_MARGIN || p.y < -SCREEN_MARGIN || p.y > height + SCREEN_MARGIN {
            continue;
        }
        markers.push(Marker {
            center: Vector2::new(p.x, p.y),
            radius: (RADIUS_SCALE / p.depth).max(MIN_RADIUS),
            depth: p.depth,
            color,
            glyph: (p.depth < glyph_depth).then_some(glyph),
        });
    }
    markers
}

/// Draw markers farthest-first. Returns `(drawn, skipped glyphs)`.
pub fn draw_markers<S: Surface>(surface: &mut S, markers: &mut [Marker]) -> (u32, u32) {
    markers.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let mut skipped = 0;
    for marker in markers.iter() {
        surface.fill_circle(marker.center, marker.radius, marker.color);
        let (cx, cy, r) = (marker.center.x, marker.center.y, marker.radius);
        let result = match marker.glyph {
            None => Ok(()),
            Some(Glyph::Horns) => {
                let dark = shade(marker.color, 0.5);
                surface.fill_circle(Vector2::new(cx - r * 0.35, cy - r * 0.1), r * 0.18, Color::WHITE);
                surface.fill_circle(Vector2::new(cx + r * 0.35, cy - r * 0.1), r * 0.18, Color::WHITE);
                surface.fill_polygon(
                    &[
                        Vector2::new(cx - r * 0.6, cy - r * 0.6),
                        Vector2::new(cx + r * 0.6, cy - r * 0.6),
                        Vector2::new(cx, cy - r * 1.6),
                    ],
                    dark,
                )
            }
            Some(Glyph::Gem) => surface.fill_polygon(
                &[
                    Vector2::new(cx, cy - r * 0.7),
                    Vector2::new(cx + r * 0.5, cy),
                    Vector2::new(cx, cy + r * 0.7),
                    Vector2::new(cx - r * 0.5, cy),
                ],
                Color::WHITE,
            ),
        };
        if result.is_err() {
            skipped += 1;
        }
    }
    (markers.len() as u32, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::core::content::{EntityMap, LootKind, Monster, Placement, Treasure};
    use crate::core::grid::{Cell, Grid, GridPos};
    use crate::core::level::{Spawn, SpawnStrategy};
    use crate::render::framebuffer::Framebuffer;
    use pretty_assertions::assert_eq;

    fn level_with(entities: EntityMap) -> Level {
        let mut grid = Grid::new(31, 31);
        for pos in grid.positions().collect::<Vec<_>>() {
            grid.set_interior(pos, Cell::Room);
        }
        Level {
            grid,
            rooms: Vec::new(),
            entities,
            start: GridPos::new(15, 15),
            spawn: Spawn { pos: GridPos::new(15, 3), strategy: SpawnStrategy::NearCenter },
            seed: 0,
        }
    }

    fn eye() -> Viewpoint {
        Viewpoint::new(Vector3::new(15.5, 0.7, 3.5), 0.0, 0.0)
    }

    #[test]
    fn monster_ahead_is_centered_and_gets_a_glyph() {
        let mut entities = EntityMap::new();
        entities.insert(
            GridPos::new(15, 8),
            Entity::Monster(Monster { kind: MonsterKind::Dragon, health: 3, defeated: false }),
        );
        let level = level_with(entities);
        let camera = Camera::new(&CameraConfig::default());
        let markers = collect_markers(&level, &eye(), &camera, &RenderConfig::default(), 320.0, 240.0);
        assert_eq!(markers.len(), 1);
        let m = markers[0];
        assert!((m.center.x - 160.0).abs() < 1e-3);
        assert!((m.depth - 5.0).abs() < 1e-4);
        assert_eq!(m.glyph, Some(Glyph::Horns));
        assert!((m.radius - 12.0).abs() < 1e-4);
    }

    #[test]
    fn inactive_behind_and_distant_entities_are_skipped() {
        let mut entities = EntityMap::new();
        entities.insert(
            GridPos::new(15, 9),
            Entity::Monster(Monster { kind: MonsterKind::Troll, health: 3, defeated: true }),
        );
        entities.insert(
            GridPos::new(15, 1),
            Entity::Treasure(Treasure { loot: LootKind::Points, placement: Placement::Random, opened: false }),
        );
        let level = level_with(entities);
        let camera = Camera::new(&CameraConfig::default());
        let mut config = RenderConfig::default();
        assert!(collect_markers(&level, &eye(), &camera, &config, 320.0, 240.0).is_empty());

        let mut entities = EntityMap::new();
        entities.insert(
            GridPos::new(15, 28),
            Entity::Treasure(Treasure { loot: LootKind::Health, placement: Placement::Random, opened: false }),
        );
        let level = level_with(entities);
        assert_eq!(collect_markers(&level, &eye(), &camera, &config, 320.0, 240.0).len(), 1);
        config.treasure_cutoff = 10.0;
        assert!(collect_markers(&level, &eye(), &camera, &config, 320.0, 240.0).is_empty());
    }

    #[test]
    fn depth_limits_are_per_kind() {
        let mut entities = EntityMap::new();
        entities.insert(
            GridPos::new(14, 13),
            Entity::Monster(Monster { kind: MonsterKind::Witch, health: 3, defeated: false }),
        );
        entities.insert(
            GridPos::new(16, 13),
            Entity::Treasure(Treasure { loot: LootKind::Points, placement: Placement::DeadEnd, opened: false }),
        );
        let level = level_with(entities);
        let camera = Camera::new(&CameraConfig::default());
        let config = RenderConfig {
            monster_max_depth: 20.0,
            treasure_max_depth: 8.0,
            ..RenderConfig::default()
        };
        let markers = collect_markers(&level, &eye(), &camera, &config, 320.0, 240.0);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].glyph, Some(Glyph::Horns));
    }

    #[test]
    fn nearer_markers_are_painted_last() {
        let red = Color::new(255, 0, 0, 255);
        let blue = Color::new(0, 0, 255, 255);
        let mut markers = [
            Marker { center: Vector2::new(10.0, 10.0), radius: 5.0, depth: 2.0, color: red, glyph: None },
            Marker { center: Vector2::new(10.0, 10.0), radius: 5.0, depth: 8.0, color: blue, glyph: None },
        ];
        let mut fb = Framebuffer::new(20, 20);
        assert_eq!(draw_markers(&mut fb, &mut markers), (2, 0));
        assert_eq!(fb.get_pixel(10, 10), Some(red));
    }
}
