use bracket_geometry::prelude::Point;
use tracing::info;

use crate::{data, lighting::LightSources, map::Dungeon, map::Grid};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const fn delta(self) -> Point {
        match self {
            Direction::North => Point::constant(0, -1),
            Direction::South => Point::constant(0, 1),
            Direction::West => Point::constant(-1, 0),
            Direction::East => Point::constant(1, 0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LossReason {
    Quit,
    Interrupted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Title,
    Playing,
    Won,
    Lost(LossReason),
}

impl Phase {
    pub const fn is_over(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageTone {
    Info,
    Progress,
    Warning,
    Triumph,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub tone: MessageTone,
}

impl Message {
    pub fn new<S: Into<String>>(text: S, tone: MessageTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved,
    KeyCollected { collected: usize, total: usize },
    Escaped,
}

/// Player, keys, exit, lights and the one message on screen.
#[derive(Clone, Debug)]
pub struct GameState {
    grid: Grid,
    player: Point,
    keys: Vec<Point>,
    collected: Vec<bool>,
    exit: Point,
    may_exit: bool,
    phase: Phase,
    message: Message,
    lights: LightSources,
}

impl GameState {
    pub fn new(dungeon: Dungeon, light_count: u32) -> Self {
        let total = dungeon.keys.len();
        Self {
            grid: dungeon.grid,
            player: dungeon.spawn,
            collected: vec![false; total],
            keys: dungeon.keys,
            exit: dungeon.exit,
            may_exit: false,
            phase: Phase::Title,
            message: Message::new(data::opening(total), MessageTone::Info),
            lights: LightSources::new(light_count),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Point {
        self.player
    }

    pub fn exit(&self) -> Point {
        self.exit
    }

    pub fn lights(&self) -> &LightSources {
        &self.lights
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn may_exit(&self) -> bool {
        self.may_exit
    }

    pub fn total_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn collected_count(&self) -> usize {
        self.collected.iter().filter(|taken| **taken).count()
    }

    pub fn uncollected_keys(&self) -> impl Iterator<Item = Point> + '_ {
        self.keys
            .iter()
            .zip(&self.collected)
            .filter(|(_, taken)| !**taken)
            .map(|(point, _)| *point)
    }

    /// Leaves the title screen. Returns false outside the title phase.
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Title {
            return false;
        }
        self.phase = Phase::Playing;
        info!("game started");
        true
    }

    pub fn end(&mut self, reason: LossReason) {
        if self.phase.is_over() {
            return;
        }
        self.phase = Phase::Lost(reason);
        info!(?reason, "game lost");
    }

    /// Steps one cell. Walls and the map edge reject the move with no state
    /// change; otherwise the step may pick up a key and then escape.
    pub fn try_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.phase != Phase::Playing {
            return MoveOutcome::Blocked;
        }
        let delta = direction.delta();
        let target = Point::new(self.player.x + delta.x, self.player.y + delta.y);
        if !self.grid.is_walkable(target) {
            return MoveOutcome::Blocked;
        }
        self.player = target;

        let mut outcome = MoveOutcome::Moved;
        if let Some(slot) = self
            .keys
            .iter()
            .zip(&self.collected)
            .position(|(key, taken)| *key == target && !*taken)
        {
            outcome = self.collect(slot);
        }

        if self.may_exit && target == self.exit {
            self.phase = Phase::Won;
            self.message = Message::new(data::VICTORY, MessageTone::Triumph);
            info!(x = target.x, y = target.y, "escaped");
            return MoveOutcome::Escaped;
        }
        outcome
    }

    fn collect(&mut self, slot: usize) -> MoveOutcome {
        self.collected[slot] = true;
        let collected = self.collected_count();
        let total = self.total_keys();
        self.message = if collected == total {
            self.may_exit = true;
            Message::new(data::all_keys(collected, total), MessageTone::Triumph)
        } else if collected + 1 == total {
            Message::new(data::ancient_stirring(collected, total), MessageTone::Warning)
        } else {
            Message::new(data::key_found(collected, total), MessageTone::Progress)
        };
        info!(collected, total, "key collected");
        MoveOutcome::KeyCollected { collected, total }
    }

    /// Drops a torch on the player's cell. Silently does nothing when out of
    /// lights or already standing on a torch.
    pub fn place_light(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        self.lights.place_light(self.player)
    }
}
