//! Integer grid cells and cardinal directions

use crate::vector::Vec2;
use core::fmt;
use core::ops::{Add, Mul};

/// A cell on the unit grid. Cell `(x, y)` is centred on world point `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a world position to the nearest cell.
    ///
    /// Halves round away from zero, so `(0.5, -0.5)` lands on `(1, -1)`.
    #[inline]
    pub fn from_world(position: Vec2) -> Self {
        Self::new(position.x.round() as i32, position.y.round() as i32)
    }

    /// World-space centre of the cell
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Neighbouring cell one step in `direction`
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// Manhattan distance to another cell
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Add for Cell {
    type Output = Self;
    #[inline] fn add(self, rhs: Self) -> Self { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl Mul<i32> for Cell {
    type Output = Self;
    #[inline] fn mul(self, rhs: i32) -> Self { Self::new(self.x * rhs, self.y * rhs) }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Propagation order used by explosions
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Cell offset of a single step
    #[inline]
    pub const fn offset(self) -> Cell {
        match self {
            Self::Up => Cell::new(0, 1),
            Self::Down => Cell::new(0, -1),
            Self::Left => Cell::new(-1, 0),
            Self::Right => Cell::new(1, 0),
        }
    }

    /// Unit vector of this direction
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        let o = self.offset();
        Vec2::new(o.x as f32, o.y as f32)
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Horizontal facing for a signed x component (`Right` for zero)
    #[inline]
    pub fn horizontal(x: f32) -> Self {
        if x < 0.0 { Self::Left } else { Self::Right }
    }
}
