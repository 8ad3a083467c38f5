use maze_explorer::config::{ContentConfig, GameConfig, MazeConfig};
use maze_explorer::core::grid::{Cell, GridPos};
use maze_explorer::core::level::Level;
use maze_explorer::core::maze::generate;
use maze_explorer::render::camera::Camera;
use pretty_assertions::assert_eq;
use raylib::prelude::Vector3;

const SEED: u64 = 2024;

fn small_config() -> GameConfig {
    GameConfig {
        maze: MazeConfig {
            width: 21,
            height: 21,
            ..MazeConfig::default()
        },
        content: ContentConfig {
            monster_count: (3, 6),
            treasure_count: (2, 5),
            ..ContentConfig::default()
        },
        ..GameConfig::default()
    }
}

#[test]
fn small_maze_spreads_to_every_border() {
    let config = small_config();
    let maze = generate(&config.maze, SEED);
    let grid = &maze.grid;
    assert_eq!((grid.width(), grid.height()), (21, 21));

    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let open: Vec<GridPos> = grid.walkable_positions().collect();
    assert!(open.iter().any(|p| p.x <= 2), "nothing near the west border");
    assert!(open.iter().any(|p| p.x >= w - 3), "nothing near the east border");
    assert!(open.iter().any(|p| p.z <= 2), "nothing near the north border");
    assert!(open.iter().any(|p| p.z >= h - 3), "nothing near the south border");

    let mask = grid.flood_fill(maze.start);
    assert!(open.iter().all(|&p| grid.reached(&mask, p)));
}

#[test]
fn small_level_end_to_end() {
    let config = small_config();
    let level = Level::generate(&config, SEED);

    let (min, max) = config.content.monster_count;
    let monsters = level.entities.monster_count();
    assert!((min as usize..=max as usize).contains(&monsters), "{monsters} monsters");
    let (min, max) = config.content.treasure_count;
    let treasures = level.entities.treasure_count();
    assert!((min as usize..=max as usize).contains(&treasures), "{treasures} treasures");
    for (pos, _) in level.entities.iter() {
        assert!(level.grid.is_walkable(pos));
    }

    let buffer = config.player.collision_buffer;
    assert!(!level.can_move_to(0.5, 0.5, buffer));
    let wall = level
        .grid
        .positions()
        .find(|&p| level.grid.is_interior(p) && level.grid.get(p) == Some(Cell::Wall))
        .expect("a small maze has interior walls");
    let (x, z) = wall.center();
    assert!(!level.can_move_to(x, z, buffer));

    let eye = level.spawn_point(config.render.floor_level(), config.player.eye_height);
    let camera = Camera::new(&config.camera);
    let (width, height) = (config.window.width as f32, config.window.height as f32);

    // Five cells straight ahead at eye height lands on the screen center.
    let ahead = Vector3::new(eye.x, eye.y, eye.z + 5.0);
    let projected = camera
        .project(ahead, eye, 0.0, 0.0, width, height)
        .expect("point ahead projects");
    assert!((projected.x - width / 2.0).abs() < 1e-3);
    assert!((projected.y - height / 2.0).abs() < 1e-3);
    assert!((projected.depth - 5.0).abs() < 1e-4);

    // The base plane under that point sits below the eye, so it lands in the lower half.
    let (sx, sz) = level.spawn.pos.center();
    let point = Vector3::new(sx, config.render.base_level, sz + 5.0);
    let projected = camera
        .project(point, eye, 0.0, 0.0, width, height)
        .expect("point ahead projects");
    assert!((projected.x - width / 2.0).abs() < 1e-3);
    assert!(projected.y > height / 2.0 && projected.y < height);
    assert!((projected.depth - 5.0).abs() < 1e-4);
}
