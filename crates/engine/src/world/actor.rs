use serde::Serialize;

use super::grid::Cell;

/// Remaining distance, in cells, below which the actor snaps onto its target.
pub const SNAP_EPSILON: f32 = 0.02;
/// Fraction of the remaining distance covered per frame.
pub const INTERPOLATION_FACTOR: f32 = 0.24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_cell(cell: Cell) -> Self {
        Self {
            x: cell.x as f32,
            y: cell.y as f32,
        }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Four-directional only: exactly one component must be non-zero.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Logical cell plus an eased visual position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    target: Cell,
    position: Vec2,
    facing: Direction,
    moving: bool,
}

impl Actor {
    pub fn spawn(cell: Cell) -> Self {
        Self {
            target: cell,
            position: Vec2::from_cell(cell),
            facing: Direction::Down,
            moving: false,
        }
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Cell the visual position currently rounds to.
    pub fn rounded_cell(&self) -> Cell {
        Cell::new(self.position.x.round() as i32, self.position.y.round() as i32)
    }

    /// Cell directly ahead of the rounded position.
    pub fn front_cell(&self) -> Cell {
        let (dx, dy) = self.facing.delta();
        self.rounded_cell().offset(dx, dy)
    }

    pub fn pixel_position(&self, tile_px: f32) -> Vec2 {
        self.position.scaled(tile_px)
    }

    pub(crate) fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    pub(crate) fn commit(&mut self, cell: Cell) {
        self.target = cell;
    }

    /// Moves target and visual position together; used by scene transitions.
    pub(crate) fn teleport(&mut self, cell: Cell, facing: Direction) {
        self.target = cell;
        self.position = Vec2::from_cell(cell);
        self.facing = facing;
        self.moving = false;
    }

    /// One frame of exponential easing toward the committed cell.
    pub fn advance(&mut self) {
        let target = Vec2::from_cell(self.target);
        let delta = Vec2::new(target.x - self.position.x, target.y - self.position.y);

        if delta.length() > SNAP_EPSILON {
            self.position.x += delta.x * INTERPOLATION_FACTOR;
            self.position.y += delta.y * INTERPOLATION_FACTOR;
            self.moving = true;
        } else {
            self.position = target;
            self.moving = false;
        }
    }
}
