//! Procedural maze generation.
//!
//! The skeleton is carved by an iterative depth-first backtracker over a
//! coarse lattice of decision points centered on the grid. Rooms and extra
//! loop connections are layered on top afterwards. Every walkable cell is
//! reachable from the start cell when generation returns.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::grid::{Cell, Grid, GridPos, Room, AXIS_DIRECTIONS};
use crate::config::{MazeConfig, Span};

/// Smallest width/height the generator accepts.
pub const MIN_DIMENSION: usize = 15;

const MIN_STEP: i32 = 4;

/// Uniform draw from an inclusive span.
pub(crate) fn roll<R: Rng + ?Sized>(rng: &mut R, (min, max): Span) -> u32 {
    rng.gen_range(min..=max.max(min))
}

/// Force a requested dimension to be odd and at least [`MIN_DIMENSION`].
pub fn normalize_dimension(requested: usize) -> usize {
    let n = requested.max(MIN_DIMENSION);
    if n % 2 == 0 { n + 1 } else { n }
}

/// Spacing and corridor size actually used for a given grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    pub step: i32,
    pub half_width: i32,
}

impl Lattice {
    /// Shrink the configured step until one lattice node fits on every side of
    /// the center, keeping at least one wall cell between neighboring blocks.
    pub fn fit(width: usize, height: usize, config: &MazeConfig) -> Self {
        let reach = (width / 2).min(height / 2) as i32;
        let mut step = (config.coarse_step as i32).max(MIN_STEP);
        let mut half_width = (config.corridor_half_width as i32).min((step - 2) / 2);
        while step > MIN_STEP && reach - step - half_width < 1 {
            step -= 1;
            half_width = half_width.min((step - 2) / 2);
        }
        Self { step, half_width }
    }
}

/// Output of a generation run.
#[derive(Clone, Debug)]
pub struct GeneratedMaze {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    /// Center of the seed block the skeleton grows from.
    pub start: GridPos,
    pub lattice: Lattice,
}

/// Generate a maze from a seed.
pub fn generate(config: &MazeConfig, seed: u64) -> GeneratedMaze {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_with_rng(config, &mut rng)
}

/// Generate a maze drawing all randomness from `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> GeneratedMaze {
    let width = normalize_dimension(config.width);
    let height = normalize_dimension(config.height);
    let lattice = Lattice::fit(width, height, config);
    let start = GridPos::new((width / 2) as i32, (height / 2) as i32);

    let mut grid = Grid::new(width, height);
    let nodes = carve_skeleton(&mut grid, start, lattice, rng);

    let mut rooms = overlay_rooms(&mut grid, config, rng);
    let pruned = prune_unreachable(&mut grid, start, &mut rooms);
    let loops = add_loops(&mut grid, config, rng);

    log::debug!(
        "Generated {}x{} maze: step {}, corridor width {}, {} lattice nodes, {} rooms, {} loops, {} stranded cells pruned, {} room cells",
        width,
        height,
        lattice.step,
        lattice.half_width * 2 + 1,
        nodes,
        rooms.len(),
        loops,
        pruned,
        grid.count(Cell::Room),
    );

    GeneratedMaze {
        grid,
        rooms,
        start,
        lattice,
    }
}

/// Whether a lattice node's whole block stays inside the border.
fn block_fits(grid: &Grid, center: GridPos, half_width: i32) -> bool {
    grid.is_interior(center.offset(-half_width, -half_width))
        && grid.is_interior(center.offset(half_width, half_width))
}

fn carve_block(grid: &mut Grid, center: GridPos, half_width: i32, cell: Cell) {
    for dz in -half_width..=half_width {
        for dx in -half_width..=half_width {
            grid.set_interior(center.offset(dx, dz), cell);
        }
    }
}

/// Carve the band between two lattice nodes on the same axis.
fn carve_corridor(grid: &mut Grid, from: GridPos, (dx, dz): (i32, i32), lattice: Lattice) {
    for s in 1..lattice.step {
        let spine = from.offset(dx * s, dz * s);
        for w in -lattice.half_width..=lattice.half_width {
            let cell = if dx != 0 { spine.offset(0, w) } else { spine.offset(w, 0) };
            grid.set_interior(cell, Cell::Corridor);
        }
    }
}

/// Iterative backtracker over the lattice. Returns the number of nodes visited.
fn carve_skeleton<R: Rng + ?Sized>(grid: &mut Grid, start: GridPos, lattice: Lattice, rng: &mut R) -> usize {
    carve_block(grid, start, lattice.half_width, Cell::Corridor);
    let mut stack = vec![start];
    let mut visited = 1;

    while let Some(&current) = stack.last() {
        let mut directions = AXIS_DIRECTIONS;
        directions.shuffle(rng);

        let next = directions.into_iter().find_map(|(dx, dz)| {
            let target = current.offset(dx * lattice.step, dz * lattice.step);
            let open = block_fits(grid, target, lattice.half_width)
                && grid.get(target) == Some(Cell::Wall);
            open.then_some((target, (dx, dz)))
        });

        match next {
            Some((target, direction)) => {
                carve_corridor(grid, current, direction, lattice);
                carve_block(grid, target, lattice.half_width, Cell::Corridor);
                stack.push(target);
                visited += 1;
            }
            None => {
                stack.pop();
            }
        }
    }
    visited
}

/// Random odd size in `[min, max]`, capped at `limit`.
fn odd_size<R: Rng + ?Sized>(rng: &mut R, (min, max): Span, limit: i32) -> Option<i32> {
    let lo = (min as i32) | 1;
    let hi = (max as i32).min(limit);
    let hi = if hi % 2 == 0 { hi - 1 } else { hi };
    (lo <= hi).then(|| lo + 2 * rng.gen_range(0..=(hi - lo) / 2))
}

fn overlay_rooms<R: Rng + ?Sized>(grid: &mut Grid, config: &MazeConfig, rng: &mut R) -> Vec<Room> {
    let margin = config.room_margin.max(1) as i32;
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let attempts = roll(rng, config.room_attempts);
    let mut rooms = Vec::new();

    for _ in 0..attempts {
        let Some(room_w) = odd_size(rng, config.room_size, width - 2 * margin) else {
            continue;
        };
        let Some(room_h) = odd_size(rng, config.room_size, height - 2 * margin) else {
            continue;
        };
        let room = Room {
            x: rng.gen_range(margin..=width - room_w - margin),
            z: rng.gen_range(margin..=height - room_h - margin),
            width: room_w,
            height: room_h,
        };

        let total = room_w * room_h;
        let walls = (room.z..room.z + room_h)
            .flat_map(|z| (room.x..room.x + room_w).map(move |x| GridPos::new(x, z)))
            .filter(|&p| grid.get(p) == Some(Cell::Wall))
            .count();
        if (walls as f32) < config.room_wall_coverage * total as f32 {
            continue;
        }

        for z in room.z + 1..room.z + room_h - 1 {
            for x in room.x + 1..room.x + room_w - 1 {
                grid.set_interior(GridPos::new(x, z), Cell::Room);
            }
        }
        let connections = connect_room(grid, &room, config, rng);
        log::trace!("Room at ({}, {}) {}x{} with {} connectors", room.x, room.z, room_w, room_h, connections);
        rooms.push(room);
    }
    rooms
}

#[derive(Copy, Clone, Debug)]
enum Side {
    North,
    South,
    West,
    East,
}

/// Tunnel from the room's wall ring to the nearest open cell, trying each
/// side once. Returns the number of connectors carved.
fn connect_room<R: Rng + ?Sized>(grid: &mut Grid, room: &Room, config: &MazeConfig, rng: &mut R) -> u32 {
    let wanted = roll(rng, config.room_connections);
    let mut sides = [Side::North, Side::South, Side::West, Side::East];
    sides.shuffle(rng);

    let mut made = 0;
    for side in sides {
        if made >= wanted {
            break;
        }
        if tunnel_from_side(grid, room, side, config.connector_reach as i32) {
            made += 1;
        }
    }
    made
}

fn tunnel_from_side(grid: &mut Grid, room: &Room, side: Side, reach: i32) -> bool {
    let right = room.x + room.width - 1;
    let bottom = room.z + room.height - 1;
    let along_x = (room.x + 2..room.x + room.width - 2).step_by(2);
    let along_z = (room.z + 2..room.z + room.height - 2).step_by(2);

    let (edges, (dx, dz)): (Vec<GridPos>, (i32, i32)) = match side {
        Side::North => (along_x.map(|x| GridPos::new(x, room.z)).collect(), (0, -1)),
        Side::South => (along_x.map(|x| GridPos::new(x, bottom)).collect(), (0, 1)),
        Side::West => (along_z.map(|z| GridPos::new(room.x, z)).collect(), (-1, 0)),
        Side::East => (along_z.map(|z| GridPos::new(right, z)).collect(), (1, 0)),
    };

    for edge in edges {
        for k in 1..=reach {
            let probe = edge.offset(dx * k, dz * k);
            if !grid.is_interior(probe) {
                break;
            }
            if grid.is_walkable(probe) {
                for j in 0..k {
                    let cell = edge.offset(dx * j, dz * j);
                    if grid.get(cell) == Some(Cell::Wall) {
                        grid.set_interior(cell, Cell::Corridor);
                    }
                }
                return true;
            }
        }
    }
    false
}

/// Wall off every walkable cell the start cannot reach and drop rooms that
/// ended up stranded. Returns the number of cells reverted.
fn prune_unreachable(grid: &mut Grid, start: GridPos, rooms: &mut Vec<Room>) -> usize {
    let mask = grid.flood_fill(start);
    let stranded: Vec<GridPos> = grid
        .walkable_positions()
        .filter(|&p| !grid.reached(&mask, p))
        .collect();
    for &pos in &stranded {
        grid.set(pos, Cell::Wall);
    }
    rooms.retain(|room| grid.reached(&mask, room.center()));
    stranded.len()
}

/// Punch doors through single walls separating two open cells.
fn add_loops<R: Rng + ?Sized>(grid: &mut Grid, config: &MazeConfig, rng: &mut R) -> u32 {
    let wanted = roll(rng, config.loop_connections);
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut added = 0;

    for _ in 0..wanted * 3 {
        if added >= wanted {
            break;
        }
        let pos = GridPos::new(rng.gen_range(1..width - 1), rng.gen_range(1..height - 1));
        if grid.get(pos) != Some(Cell::Wall) {
            continue;
        }
        let horizontal = grid.is_walkable(pos.offset(-1, 0)) && grid.is_walkable(pos.offset(1, 0));
        let vertical = grid.is_walkable(pos.offset(0, -1)) && grid.is_walkable(pos.offset(0, 1));
        if (horizontal && rng.gen_bool(config.loop_probability))
            || (vertical && rng.gen_bool(config.loop_probability))
        {
            grid.set_interior(pos, Cell::Door);
            added += 1;
        }
    }
    added
}
