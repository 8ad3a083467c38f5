//! Occupancy grid, grid coordinates and rooms.

use std::collections::VecDeque;

/// Tag of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Corridor,
    Room,
    Door,
}

impl Cell {
    /// Whether the player may stand on this cell.
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    pub fn name(self) -> &'static str {
        match self {
            Cell::Wall => "Wall",
            Cell::Corridor => "Corridor",
            Cell::Room => "Room",
            Cell::Door => "Door",
        }
    }
}

/// Integer grid coordinate. `x` runs along the width, `z` along the height.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The cell containing a continuous world position.
    pub fn from_world(x: f32, z: f32) -> Self {
        Self::new(x.floor() as i32, z.floor() as i32)
    }

    /// Pack into a single integer key; `unpack` is the inverse.
    #[inline]
    pub fn pack(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.z as u32 as u64)
    }

    #[inline]
    pub fn unpack(key: u64) -> Self {
        Self::new((key >> 32) as u32 as i32, key as u32 as i32)
    }

    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// World position of the cell center on the grid plane.
    pub fn center(self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.z as f32 + 0.5)
    }
}

/// The four axis directions as `(dx, dz)`.
pub const AXIS_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Axis-aligned rectangular room. The footprint includes its wall ring; the
/// carved interior is one cell smaller on every side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn center(&self) -> GridPos {
        GridPos::new(self.x + self.width / 2, self.z + self.height / 2)
    }
}

/// Fixed-size 2D array of cell tags, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid filled with walls.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.z >= 0 && (pos.x as usize) < self.width && (pos.z as usize) < self.height
    }

    /// True for cells that are not on the outer border.
    #[inline]
    pub fn is_interior(&self, pos: GridPos) -> bool {
        pos.x >= 1
            && pos.z >= 1
            && (pos.x as usize) < self.width - 1
            && (pos.z as usize) < self.height - 1
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.z as usize * self.width + pos.x as usize)
    }

    /// Cell tag at `pos`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Out-of-bounds positions count as walls.
    #[inline]
    pub fn cell_or_wall(&self, pos: GridPos) -> Cell {
        self.get(pos).unwrap_or(Cell::Wall)
    }

    #[inline]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.cell_or_wall(pos).is_walkable()
    }

    /// Set a cell. Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, pos: GridPos, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Set a cell only if it lies strictly inside the border.
    #[inline]
    pub fn set_interior(&mut self, pos: GridPos, cell: Cell) {
        if self.is_interior(pos) {
            self.set(pos, cell);
        }
    }

    /// Every coordinate in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height as i32).flat_map(move |z| (0..self.width as i32).map(move |x| GridPos::new(x, z)))
    }

    pub fn walkable_positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.positions().filter(|&p| self.is_walkable(p))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_walkable()).count()
    }

    /// Number of walkable cells among the 8 neighbors of `pos`.
    pub fn open_neighbors8(&self, pos: GridPos) -> usize {
        let mut open = 0;
        for dz in -1..=1 {
            for dx in -1..=1 {
                if (dx, dz) != (0, 0) && self.is_walkable(pos.offset(dx, dz)) {
                    open += 1;
                }
            }
        }
        open
    }

    /// Breadth-first flood fill over walkable cells, 4-connected.
    ///
    /// Returns a row-major visited mask. An unwalkable `start` yields an empty fill.
    pub fn flood_fill(&self, start: GridPos) -> Vec<bool> {
        let mut visited = vec![false; self.cells.len()];
        let Some(start_index) = self.index(start) else {
            return visited;
        };
        if !self.cells[start_index].is_walkable() {
            return visited;
        }
        visited[start_index] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for (dx, dz) in AXIS_DIRECTIONS {
                let next = current.offset(dx, dz);
                if let Some(i) = self.index(next) {
                    if !visited[i] && self.cells[i].is_walkable() {
                        visited[i] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    /// Whether `pos` was reached in a mask produced by [`Grid::flood_fill`].
    pub fn reached(&self, mask: &[bool], pos: GridPos) -> bool {
        self.index(pos).is_some_and(|i| mask.get(i).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pack_round_trips_negative_coordinates() {
        for pos in [GridPos::new(0, 0), GridPos::new(-3, 7), GridPos::new(80, -1)] {
            assert_eq!(GridPos::unpack(pos.pack()), pos);
        }
    }

    #[test]
    fn out_of_bounds_reads_as_wall_and_writes_are_ignored() {
        let mut grid = Grid::new(5, 5);
        grid.set(GridPos::new(-1, 2), Cell::Room);
        grid.set(GridPos::new(5, 2), Cell::Room);
        assert_eq!(grid.get(GridPos::new(-1, 2)), None);
        assert_eq!(grid.cell_or_wall(GridPos::new(9, 9)), Cell::Wall);
        assert_eq!(grid.walkable_count(), 0);
    }

    #[test]
    fn set_interior_never_touches_the_border() {
        let mut grid = Grid::new(5, 5);
        for pos in grid.positions().collect::<Vec<_>>() {
            grid.set_interior(pos, Cell::Corridor);
        }
        assert_eq!(grid.walkable_count(), 9);
        assert_eq!(grid.get(GridPos::new(0, 0)), Some(Cell::Wall));
        assert_eq!(grid.get(GridPos::new(4, 2)), Some(Cell::Wall));
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let mut grid = Grid::new(7, 3);
        for x in [1, 2, 4, 5] {
            grid.set(GridPos::new(x, 1), Cell::Corridor);
        }
        let mask = grid.flood_fill(GridPos::new(1, 1));
        assert!(grid.reached(&mask, GridPos::new(2, 1)));
        assert!(!grid.reached(&mask, GridPos::new(4, 1)));

        grid.set(GridPos::new(3, 1), Cell::Door);
        let mask = grid.flood_fill(GridPos::new(1, 1));
        assert!(grid.reached(&mask, GridPos::new(5, 1)));
    }

    #[test]
    fn open_neighbors_counts_diagonals() {
        let mut grid = Grid::new(5, 5);
        grid.set(GridPos::new(1, 1), Cell::Room);
        grid.set(GridPos::new(3, 3), Cell::Room);
        grid.set(GridPos::new(2, 1), Cell::Room);
        assert_eq!(grid.open_neighbors8(GridPos::new(2, 2)), 3);
    }

    #[test]
    fn room_center() {
        let room = Room { x: 5, z: 7, width: 15, height: 17 };
        assert_eq!(room.center(), GridPos::new(12, 15));
    }
}
