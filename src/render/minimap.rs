//! Top-down overview drawn into the framebuffer corner.

use raylib::prelude::{Color, Vector2};

use super::surface::Surface;
use crate::core::content::Entity;
use crate::core::grid::{Cell, GridPos};
use crate::core::level::Level;
use crate::core::player::Player;

const MARGIN: i32 = 10;

fn cell_color(cell: Cell) -> Color {
    match cell {
        Cell::Wall => Color::new(35, 35, 40, 255),
        Cell::Corridor => Color::new(120, 160, 120, 255),
        Cell::Room => Color::new(140, 170, 200, 255),
        Cell::Door => Color::new(170, 140, 90, 255),
    }
}

/// Draw the whole level scaled into a `size` pixel square at the top right.
pub fn draw_minimap<S: Surface>(surface: &mut S, level: &Level, player: &Player, size: u32) {
    let grid = &level.grid;
    let cells = grid.width().max(grid.height()).max(1) as f32;
    let scale = size as f32 / cells;
    let origin_x = surface.width() as i32 - size as i32 - MARGIN;
    let origin_y = MARGIN;
    let to_px = |v: f32| (v * scale) as i32;

    for pos in grid.positions() {
        let (x0, y0) = (to_px(pos.x as f32), to_px(pos.z as f32));
        let (x1, y1) = (to_px(pos.x as f32 + 1.0), to_px(pos.z as f32 + 1.0));
        surface.fill_rect(
            origin_x + x0,
            origin_y + y0,
            (x1 - x0).max(1),
            (y1 - y0).max(1),
            cell_color(grid.cell_or_wall(pos)),
        );
    }

    let dot = (scale * 0.8).max(1.5);
    for (pos, entity) in level.entities.iter().filter(|(_, e)| e.is_active()) {
        let color = match entity {
            Entity::Monster(_) => Color::RED,
            Entity::Treasure(_) => Color::YELLOW,
        };
        surface.fill_circle(screen_point(pos, origin_x, origin_y, scale), dot, color);
    }

    let here = Vector2::new(
        origin_x as f32 + player.position.x * scale,
        origin_y as f32 + player.position.z * scale,
    );
    let facing = player.forward();
    let tip = Vector2::new(here.x + facing.x * 8.0, here.y + facing.y * 8.0);
    surface.draw_line(here, tip, Color::WHITE);
    surface.fill_circle(here, dot + 1.0, Color::WHITE);
}

fn screen_point(pos: GridPos, origin_x: i32, origin_y: i32, scale: f32) -> Vector2 {
    let (x, z) = pos.center();
    Vector2::new(origin_x as f32 + x * scale, origin_y as f32 + z * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, PlayerConfig};
    use crate::render::framebuffer::Framebuffer;

    #[test]
    fn minimap_marks_the_player() {
        let config = GameConfig::default();
        let level = Level::generate(&config, 4);
        let spawn = level.spawn_point(config.render.floor_level(), config.player.eye_height);
        let player = Player::new(&PlayerConfig::default(), spawn);
        let mut fb = Framebuffer::new(400, 300);
        draw_minimap(&mut fb, &level, &player, 162);

        let scale = 162.0 / 81.0;
        let px = (400 - 162 - MARGIN) as f32 + spawn.x * scale;
        let py = MARGIN as f32 + spawn.z * scale;
        assert_eq!(fb.get_pixel(px.round() as u32, py.round() as u32), Some(Color::WHITE));
        // Outside the map area stays untouched.
        assert_eq!(fb.get_pixel(0, 299), Some(Color::BLACK));
    }
}
