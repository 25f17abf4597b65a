use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DijkstraMap, DistanceAlg};
use bracket_random::prelude::RandomNumberGenerator;
use smallvec::SmallVec;
use tracing::debug;

use crate::{config::GameConfig, error::MapError};

const MAX_LAYOUT_ATTEMPTS: u32 = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Floor,
}

impl CellKind {
    pub const fn glyph(self) -> char {
        match self {
            CellKind::Wall => '#',
            CellKind::Floor => '.',
        }
    }
}

/// True with probability `chance`. 0 never hits, 1 always does.
pub fn roll_chance(rng: &mut RandomNumberGenerator, chance: f32) -> bool {
    rng.rand::<f32>() < chance
}

/// Bordered grid of walls and floor. Never changes after generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Outer ring is always wall; interior cells become wall with
    /// probability `wall_density`.
    pub fn generate(
        width: i32,
        height: i32,
        wall_density: f32,
        rng: &mut RandomNumberGenerator,
    ) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if border || roll_chance(rng, wall_density) {
                    cells.push(CellKind::Wall);
                } else {
                    cells.push(CellKind::Floor);
                }
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Builds a grid from ASCII rows: `#` is wall, anything else floor.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as i32;
        let cells = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|ch| if ch == '#' { CellKind::Wall } else { CellKind::Floor })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell_at(&self, point: Point) -> Option<CellKind> {
        self.idx(point).map(|idx| self.cells[idx])
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.cell_at(point) == Some(CellKind::Floor)
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if self.is_walkable(point) {
                    points.push(point);
                }
            }
        }
        points
    }

    /// Cells reachable on foot from `start`, as a per-index mask.
    pub fn reachable_from(&self, start: Point) -> Vec<bool> {
        let Some(start_idx) = self.idx(start) else {
            return vec![false; self.len()];
        };
        let dijkstra = DijkstraMap::new(
            self.width,
            self.height,
            &[start_idx],
            self,
            self.len() as f32,
        );
        dijkstra.map.iter().map(|depth| *depth < f32::MAX).collect()
    }
}

impl BaseMap for Grid {
    fn is_opaque(&self, _idx: usize) -> bool {
        // light ignores walls
        false
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        let steps = [
            Point::new(1, 0),
            Point::new(-1, 0),
            Point::new(0, 1),
            Point::new(0, -1),
        ];
        for dir in steps {
            let dest = Point::new(point.x + dir.x, point.y + dir.y);
            if self.is_walkable(dest) {
                exits.push((self.point2d_to_index(dest), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Manhattan.distance2d(p1, p2)
    }
}

impl Algorithm2D for Grid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Grid::in_bounds(self, point)
    }
}

/// A generated grid plus where the player, keys and exit start.
#[derive(Clone, Debug)]
pub struct Dungeon {
    pub grid: Grid,
    pub spawn: Point,
    pub keys: Vec<Point>,
    pub exit: Point,
}

impl Dungeon {
    /// Generates grids until one has room for the player, every key and the
    /// exit on distinct floor cells that are all reachable from the spawn.
    pub fn generate(
        config: &GameConfig,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Self, MapError> {
        for attempt in 1..=MAX_LAYOUT_ATTEMPTS {
            let grid = Grid::generate(config.width, config.height, config.wall_density, rng);
            match Self::place(grid, config.key_count, rng) {
                Ok(dungeon) => {
                    debug!(attempt, keys = dungeon.keys.len(), "dungeon generated");
                    return Ok(dungeon);
                }
                Err(err) => debug!(attempt, %err, "discarding layout"),
            }
        }
        Err(MapError::Exhausted {
            attempts: MAX_LAYOUT_ATTEMPTS,
        })
    }

    /// Picks distinct floor cells for the spawn, keys and exit, all inside the
    /// spawn's connected region.
    pub fn place(
        grid: Grid,
        key_count: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Self, MapError> {
        let needed = key_count + 2;
        let mut walkable = grid.walkable_points();
        if walkable.len() < needed {
            return Err(MapError::NotEnoughFloor {
                available: walkable.len(),
                needed,
            });
        }

        let spawn = walkable.swap_remove(rng.range(0, walkable.len() as i32) as usize);
        let reachable = grid.reachable_from(spawn);
        walkable.retain(|point| grid.idx(*point).is_some_and(|idx| reachable[idx]));
        if walkable.len() < needed - 1 {
            return Err(MapError::NotEnoughFloor {
                available: walkable.len() + 1,
                needed,
            });
        }

        let mut keys = Vec::with_capacity(key_count);
        for _ in 0..key_count {
            let idx = rng.range(0, walkable.len() as i32) as usize;
            keys.push(walkable.swap_remove(idx));
        }
        let exit = walkable.swap_remove(rng.range(0, walkable.len() as i32) as usize);

        Ok(Self {
            grid,
            spawn,
            keys,
            exit,
        })
    }
}
