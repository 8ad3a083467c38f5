//! Monsters and treasures, keyed by grid coordinate.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::{Cell, Grid, GridPos, Room};
use super::maze::roll;
use crate::config::ContentConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    Dragon,
    Troll,
    Witch,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 3] = [MonsterKind::Dragon, MonsterKind::Troll, MonsterKind::Witch];

    pub fn name(self) -> &'static str {
        match self {
            MonsterKind::Dragon => "Dragon",
            MonsterKind::Troll => "Troll",
            MonsterKind::Witch => "Witch",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LootKind {
    Health,
    MegaHealth,
    WeaponUpgrade,
    Points,
}

impl LootKind {
    pub fn name(self) -> &'static str {
        match self {
            LootKind::Health => "Health Potion",
            LootKind::MegaHealth => "Mega Health Potion",
            LootKind::WeaponUpgrade => "Weapon Upgrade",
            LootKind::Points => "Gold",
        }
    }
}

/// Why a cell was chosen for a treasure. Decides the loot distribution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    RoomCenter,
    DeadEnd,
    Random,
}

impl Placement {
    /// Loot drawn uniformly from this table; repeated entries weight the draw.
    pub fn loot_table(self) -> &'static [LootKind] {
        match self {
            Placement::RoomCenter => &[
                LootKind::MegaHealth,
                LootKind::WeaponUpgrade,
                LootKind::Points,
                LootKind::MegaHealth,
            ],
            Placement::DeadEnd => &[LootKind::Health, LootKind::WeaponUpgrade, LootKind::Points],
            Placement::Random => &[LootKind::Health, LootKind::Points, LootKind::Health],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Monster {
    pub kind: MonsterKind,
    pub health: u32,
    pub defeated: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Treasure {
    pub loot: LootKind,
    pub placement: Placement,
    pub opened: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Monster(Monster),
    Treasure(Treasure),
}

impl Entity {
    /// Undefeated monsters and unopened treasures.
    pub fn is_active(&self) -> bool {
        match self {
            Entity::Monster(m) => !m.defeated,
            Entity::Treasure(t) => !t.opened,
        }
    }
}

/// At most one entity per grid coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityMap {
    entries: BTreeMap<u64, Entity>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.entries.contains_key(&pos.pack())
    }

    pub fn get(&self, pos: GridPos) -> Option<&Entity> {
        self.entries.get(&pos.pack())
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Entity> {
        self.entries.get_mut(&pos.pack())
    }

    /// Insert unless the coordinate is taken. Returns whether it was inserted.
    pub fn insert(&mut self, pos: GridPos, entity: Entity) -> bool {
        if self.contains(pos) {
            return false;
        }
        self.entries.insert(pos.pack(), entity);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Entity)> + '_ {
        self.entries.iter().map(|(&k, e)| (GridPos::unpack(k), e))
    }

    pub fn monsters(&self) -> impl Iterator<Item = (GridPos, &Monster)> + '_ {
        self.iter().filter_map(|(pos, e)| match e {
            Entity::Monster(m) => Some((pos, m)),
            Entity::Treasure(_) => None,
        })
    }

    pub fn treasures(&self) -> impl Iterator<Item = (GridPos, &Treasure)> + '_ {
        self.iter().filter_map(|(pos, e)| match e {
            Entity::Treasure(t) => Some((pos, t)),
            Entity::Monster(_) => None,
        })
    }

    pub fn monster_count(&self) -> usize {
        self.monsters().count()
    }

    pub fn treasure_count(&self) -> usize {
        self.treasures().count()
    }

    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_active()).count()
    }
}

/// Scatter monsters, then treasures, over the walkable cells of `grid`.
///
/// Falls short of the target counts quietly when the grid is too small.
pub fn place_entities<R: Rng + ?Sized>(
    grid: &Grid,
    rooms: &[Room],
    config: &ContentConfig,
    rng: &mut R,
) -> EntityMap {
    let mut entities = EntityMap::new();
    let monsters = place_monsters(&mut entities, grid, config, rng);
    let treasures = place_treasures(&mut entities, grid, rooms, config, rng);
    log::debug!("Placed {monsters} monsters and {treasures} treasures");
    entities
}

fn place_monsters<R: Rng + ?Sized>(entities: &mut EntityMap, grid: &Grid, config: &ContentConfig, rng: &mut R) -> usize {
    let target = roll(rng, config.monster_count) as usize;
    let mut cells: Vec<GridPos> = grid.walkable_positions().collect();
    cells.shuffle(rng);

    let mut placed: Vec<GridPos> = Vec::with_capacity(target);
    for pos in cells {
        if placed.len() >= target {
            break;
        }
        if placed.iter().any(|&other| pos.manhattan(other) < config.monster_spacing) {
            continue;
        }
        let mut health = roll(rng, config.monster_health);
        if grid.get(pos) == Some(Cell::Room) {
            health += roll(rng, config.room_health_bonus);
        }
        let kind = MonsterKind::ALL.choose(rng).copied().unwrap_or(MonsterKind::Troll);
        entities.insert(pos, Entity::Monster(Monster { kind, health, defeated: false }));
        placed.push(pos);
    }
    placed.len()
}

fn treasure_candidates<R: Rng + ?Sized>(
    grid: &Grid,
    rooms: &[Room],
    config: &ContentConfig,
    rng: &mut R,
) -> Vec<(GridPos, Placement)> {
    let mut candidates: Vec<(GridPos, Placement)> = rooms
        .iter()
        .map(Room::center)
        .filter(|&c| grid.is_walkable(c))
        .map(|c| (c, Placement::RoomCenter))
        .collect();

    candidates.extend(
        grid.positions()
            .filter(|&p| matches!(grid.get(p), Some(Cell::Corridor | Cell::Door)))
            .filter(|&p| grid.open_neighbors8(p) <= 2)
            .map(|p| (p, Placement::DeadEnd)),
    );

    for pos in grid.walkable_positions() {
        if rng.gen_bool(config.treasure_random_chance) {
            candidates.push((pos, Placement::Random));
        }
    }
    candidates
}

fn place_treasures<R: Rng + ?Sized>(
    entities: &mut EntityMap,
    grid: &Grid,
    rooms: &[Room],
    config: &ContentConfig,
    rng: &mut R,
) -> usize {
    let target = roll(rng, config.treasure_count) as usize;
    let mut candidates = treasure_candidates(grid, rooms, config, rng);
    candidates.shuffle(rng);

    let mut placed = 0;
    for (pos, placement) in candidates {
        if placed >= target {
            break;
        }
        if entities.contains(pos) {
            continue;
        }
        let loot = placement.loot_table().choose(rng).copied().unwrap_or(LootKind::Health);
        entities.insert(pos, Entity::Treasure(Treasure { loot, placement, opened: false }));
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Open 31x31 grid with one room in the middle.
    fn open_grid() -> (Grid, Vec<Room>) {
        let mut grid = Grid::new(31, 31);
        for pos in grid.positions().collect::<Vec<_>>() {
            grid.set_interior(pos, Cell::Corridor);
        }
        let room = Room { x: 10, z: 10, width: 9, height: 9 };
        for z in 11..18 {
            for x in 11..18 {
                grid.set(GridPos::new(x, z), Cell::Room);
            }
        }
        (grid, vec![room])
    }

    #[test]
    fn entities_sit_on_walkable_cells_within_counts() {
        let (grid, rooms) = open_grid();
        let config = ContentConfig::default();
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let entities = place_entities(&grid, &rooms, &config, &mut rng);
            for (pos, _) in entities.iter() {
                assert!(grid.is_walkable(pos), "{pos:?}");
            }
            let (min, max) = config.monster_count;
            assert!((min as usize..=max as usize).contains(&entities.monster_count()));
            let (min, max) = config.treasure_count;
            assert!((min as usize..=max as usize).contains(&entities.treasure_count()));
            assert_eq!(entities.len(), entities.monster_count() + entities.treasure_count());
        }
    }

    #[test]
    fn monsters_keep_their_distance() {
        let (grid, rooms) = open_grid();
        let config = ContentConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let entities = place_entities(&grid, &rooms, &config, &mut rng);
        let monsters: Vec<GridPos> = entities.monsters().map(|(p, _)| p).collect();
        for (i, a) in monsters.iter().enumerate() {
            for b in &monsters[i + 1..] {
                assert!(a.manhattan(*b) >= config.monster_spacing, "{a:?} {b:?}");
            }
        }
    }

    #[test]
    fn room_monsters_are_tougher() {
        let (grid, rooms) = open_grid();
        let config = ContentConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let entities = place_entities(&grid, &rooms, &config, &mut rng);
        let (_, max_health) = config.monster_health;
        for (pos, monster) in entities.monsters() {
            if grid.get(pos) == Some(Cell::Room) {
                assert!(monster.health > config.monster_health.0);
            } else {
                assert!(monster.health <= max_health);
            }
        }
    }

    #[test]
    fn small_grid_yields_fewer_entities() {
        let mut grid = Grid::new(15, 15);
        grid.set(GridPos::new(7, 7), Cell::Corridor);
        grid.set(GridPos::new(8, 7), Cell::Corridor);
        let mut rng = StdRng::seed_from_u64(1);
        let entities = place_entities(&grid, &[], &ContentConfig::default(), &mut rng);
        assert_eq!(entities.monster_count(), 1);
        assert!(entities.len() <= 2);
    }

    #[test]
    fn insert_refuses_occupied_cells() {
        let mut map = EntityMap::new();
        let pos = GridPos::new(4, 4);
        let monster = Entity::Monster(Monster { kind: MonsterKind::Witch, health: 3, defeated: false });
        let treasure = Entity::Treasure(Treasure {
            loot: LootKind::Points,
            placement: Placement::Random,
            opened: false,
        });
        assert!(map.insert(pos, monster));
        assert!(!map.insert(pos, treasure));
        assert_eq!(map.get(pos), Some(&monster));
        assert_eq!(map.treasure_count(), 0);
    }

    #[test]
    fn richer_loot_for_room_centers() {
        let table = Placement::RoomCenter.loot_table();
        assert!(!table.contains(&LootKind::Health));
        assert!(!Placement::Random.loot_table().contains(&LootKind::WeaponUpgrade));
    }
}
