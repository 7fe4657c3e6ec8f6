use std::collections::VecDeque;

use rand::Rng;
use Direction::*;

use crate::GridInt;

/// Cells kept free between the spawn point and every edge of the grid.
pub const SPAWN_MARGIN: GridInt = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: GridInt,
    pub y: GridInt,
}

impl Position {
    pub const fn new(x: GridInt, y: GridInt) -> Self {
        Position { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Position::new(self.x + dx, self.y + dy)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn offset(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// The play field, in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: GridInt,
    pub height: GridInt,
}

impl Grid {
    pub const fn new(width: GridInt, height: GridInt) -> Self {
        Grid { width, height }
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Any cell of the grid, occupied or not.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }

    /// A cell at least `SPAWN_MARGIN` cells away from every edge.
    pub fn random_spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.gen_range(SPAWN_MARGIN..=self.width - SPAWN_MARGIN - 1),
            rng.gen_range(SPAWN_MARGIN..=self.height - SPAWN_MARGIN - 1),
        )
    }
}

/// Head-first list of occupied cells plus the heading.
#[derive(Clone, Debug)]
pub struct Worm {
    body: VecDeque<Position>,
    direction: Direction,
}

impl Worm {
    /// Lays out `size` segments in a straight line behind `head`.
    pub fn new(head: Position, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();

        let body = (0..size as GridInt).map(|i| Position::new(head.x - dx * i, head.y - dy * i));
        Worm::from_segments(body, direction)
    }

    pub fn from_segments<I>(segments: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        Worm { body: segments.into_iter().collect(), direction }
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Turns the worm unless `new_direction` would fold it back onto itself.
    /// Returns whether the heading was accepted.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) => false,
            _ => {
                self.direction = new_direction;
                true
            }
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    /// Puts a new head one cell ahead. The tail stays put when `grow` is set.
    pub fn advance(&mut self, grow: bool) -> Position {
        let new_head = self.head().step(self.direction);

        if !grow {
            self.body.pop_back();
        }
        self.body.push_front(new_head);
        new_head
    }
}
