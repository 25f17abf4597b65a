use bracket_geometry::prelude::Point;
use smallvec::SmallVec;
use tracing::info;

/// A single emitter. The player's ember follows the player; placed torches
/// keep the cell they were dropped on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSource {
    PlayerAmbient,
    Placed(Point),
}

/// Remaining placeable lights. Only ever counts down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightPool {
    remaining: u32,
}

impl LightPool {
    pub const fn new(count: u32) -> Self {
        Self { remaining: count }
    }

    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Every active emitter plus the pool that feeds them.
///
/// The player's ember draws on the same pool as torches: while any light is
/// left it burns, and dropping the last torch snuffs it for good.
#[derive(Clone, Debug)]
pub struct LightSources {
    pool: LightPool,
    sources: SmallVec<[LightSource; 8]>,
}

impl LightSources {
    pub fn new(count: u32) -> Self {
        let pool = LightPool::new(count);
        let mut sources = SmallVec::new();
        if !pool.is_empty() {
            sources.push(LightSource::PlayerAmbient);
        }
        Self { pool, sources }
    }

    pub const fn remaining(&self) -> u32 {
        self.pool.remaining()
    }

    pub fn ambient_active(&self) -> bool {
        self.sources.contains(&LightSource::PlayerAmbient)
    }

    pub fn has_torch_at(&self, point: Point) -> bool {
        self.sources.contains(&LightSource::Placed(point))
    }

    pub fn torches(&self) -> impl Iterator<Item = Point> + '_ {
        self.sources.iter().filter_map(|source| match source {
            LightSource::Placed(point) => Some(*point),
            LightSource::PlayerAmbient => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightSource> {
        self.sources.iter()
    }

    /// Drops a torch at `at`. Does nothing when the pool is empty or a torch
    /// already burns there.
    pub fn place_light(&mut self, at: Point) -> bool {
        if self.has_torch_at(at) || !self.pool.take() {
            return false;
        }
        self.sources.push(LightSource::Placed(at));
        info!(x = at.x, y = at.y, remaining = self.pool.remaining(), "torch placed");

        if self.pool.is_empty() {
            self.sources.retain(|source| *source != LightSource::PlayerAmbient);
            info!("player ember retired");
        }
        true
    }
}
