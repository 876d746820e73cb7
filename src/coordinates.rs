use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, Sub};

use crate::units::{ColumnIndex, RowIndex};

/// An integer (x, y) grid position. `y` grows downwards, so `y` is the row and `x` the column.
///
/// Positions double as offsets: `b - a` is the step taken going from `a` to `b`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

pub type PositionSmallVec = SmallVec<[GridPosition; 4]>;

impl GridPosition {
    pub fn new(x: i32, y: i32) -> GridPosition {
        GridPosition { x, y }
    }

    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> GridPosition {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        GridPosition::new(col as i32, row as i32)
    }

    /// The position one step away in `direction`, `None` if that falls off the `i32` range.
    #[inline]
    pub fn offset(self, direction: Direction) -> Option<GridPosition> {
        self.checked_add(direction.offset())
    }

    /// The cardinal neighbours in `Direction::ALL` order, skipping any that overflow. Bounds are
    /// the graph's business.
    pub fn neighbours(self) -> PositionSmallVec {
        Direction::ALL.iter().filter_map(|dir| self.offset(*dir)).collect()
    }

    pub fn checked_add(self, rhs: GridPosition) -> Option<GridPosition> {
        Some(GridPosition::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// `self - rhs`, `None` on overflow.
    pub fn checked_sub(self, rhs: GridPosition) -> Option<GridPosition> {
        Some(GridPosition::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
    }

    /// Manhattan distance, which is 1 for grid-adjacent positions. Computed in `i64` so it holds
    /// for any two positions.
    pub fn manhattan_distance(self, other: GridPosition) -> u64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx.unsigned_abs() + dy.unsigned_abs()
    }
}

impl Add for GridPosition {
    type Output = GridPosition;
    fn add(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridPosition {
    type Output = GridPosition;
    fn sub(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from(x_y_pair: (i32, i32)) -> GridPosition {
        GridPosition::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The cardinal directions, which are also the cached edge slots on every node.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    #[inline]
    pub fn offset(self) -> GridPosition {
        match self {
            Direction::Up => GridPosition::new(0, -1),
            Direction::Right => GridPosition::new(1, 0),
            Direction::Down => GridPosition::new(0, 1),
            Direction::Left => GridPosition::new(-1, 0),
        }
    }

    /// The cardinal direction of a unit offset, `None` for anything else (diagonals, jumps, zero).
    pub fn from_offset(offset: GridPosition) -> Option<Direction> {
        match (offset.x, offset.y) {
            (0, -1) => Some(Direction::Up),
            (1, 0) => Some(Direction::Right),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            _ => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Slot index into a node's cached directional edges.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}
