//! A complete level: grid, rooms, entities and a safe spawn point.

use rand::rngs::StdRng;
use rand::SeedableRng;
use raylib::prelude::Vector3;

use super::content::{place_entities, EntityMap};
use super::grid::{Cell, Grid, GridPos, Room};
use super::maze::generate_with_rng;
use crate::config::GameConfig;

/// How the spawn cell was found, in the order the strategies are tried.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpawnStrategy {
    RoomCenter,
    NearCenter,
    FullScan,
    Forced,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spawn {
    pub pos: GridPos,
    pub strategy: SpawnStrategy,
}

const NEAR_CENTER_RANGE: i32 = 30;
const FULL_SCAN_STRIDE: usize = 3;
const FORCED_HALF: i32 = 2;

/// Pick a walkable spawn cell, carving one at the center as a last resort.
pub fn find_spawn(grid: &mut Grid, rooms: &[Room]) -> Spawn {
    if let Some(pos) = rooms.iter().map(Room::center).find(|&c| grid.is_walkable(c)) {
        return Spawn { pos, strategy: SpawnStrategy::RoomCenter };
    }

    let center = GridPos::new(grid.width() as i32 / 2, grid.height() as i32 / 2);
    let near = (1..=NEAR_CENTER_RANGE).find_map(|offset| {
        (-offset..=offset).step_by(2).find_map(|dz| {
            (-offset..=offset)
                .step_by(2)
                .map(|dx| center.offset(dx, dz))
                .find(|&p| grid.is_interior(p) && grid.is_walkable(p))
        })
    });
    if let Some(pos) = near {
        log::warn!("No room available for spawn, using open cell {pos:?} near the center");
        return Spawn { pos, strategy: SpawnStrategy::NearCenter };
    }

    let scanned = grid
        .positions()
        .filter(|&p| grid.is_interior(p))
        .step_by(FULL_SCAN_STRIDE)
        .find(|&p| grid.is_walkable(p));
    if let Some(pos) = scanned {
        log::warn!("Nothing open near the center, full scan picked {pos:?}");
        return Spawn { pos, strategy: SpawnStrategy::FullScan };
    }

    let pos = GridPos::new(
        center.x.clamp(1 + FORCED_HALF, grid.width() as i32 - 2 - FORCED_HALF),
        center.z.clamp(1 + FORCED_HALF, grid.height() as i32 - 2 - FORCED_HALF),
    );
    for dz in -FORCED_HALF..=FORCED_HALF {
        for dx in -FORCED_HALF..=FORCED_HALF {
            grid.set_interior(pos.offset(dx, dz), Cell::Room);
        }
    }
    log::warn!("No walkable cell found, carved a spawn area at {pos:?}");
    Spawn { pos, strategy: SpawnStrategy::Forced }
}

/// Everything generated for one maze. Replaced wholesale on regeneration.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub entities: EntityMap,
    /// Center of the generator's seed block.
    pub start: GridPos,
    pub spawn: Spawn,
    pub seed: u64,
}

impl Level {
    pub fn generate(config: &GameConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let maze = generate_with_rng(&config.maze, &mut rng);
        let mut grid = maze.grid;
        let spawn = find_spawn(&mut grid, &maze.rooms);
        let entities = place_entities(&grid, &maze.rooms, &config.content, &mut rng);

        log::info!(
            "Built level {}x{} from seed {seed}: {} rooms, {} open cells, {} monsters, {} treasures, spawn {:?} ({:?})",
            grid.width(),
            grid.height(),
            maze.rooms.len(),
            grid.walkable_count(),
            entities.monster_count(),
            entities.treasure_count(),
            spawn.pos,
            spawn.strategy,
        );

        Self {
            grid,
            rooms: maze.rooms,
            entities,
            start: maze.start,
            spawn,
            seed,
        }
    }

    /// Whether a body centered at world `(x, z)` may stand there.
    pub fn can_move_to(&self, x: f32, z: f32, buffer: f32) -> bool {
        let max_x = self.grid.width() as f32 - buffer;
        let max_z = self.grid.height() as f32 - buffer;
        if x < buffer || z < buffer || x >= max_x || z >= max_z {
            return false;
        }
        self.grid.is_walkable(GridPos::from_world(x, z))
    }

    /// World position of the spawn cell center at eye height above `floor_level`.
    pub fn spawn_point(&self, floor_level: f32, eye_height: f32) -> Vector3 {
        let (x, z) = self.spawn.pos.center();
        Vector3::new(x, floor_level + eye_height, z)
    }
}
