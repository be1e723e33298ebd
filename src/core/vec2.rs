//! Integer 2D Vector
//!
//! Grid positions, directions and sizes. All operations return new values;
//! a `Vec2i` is never mutated in place by the engine.

use std::fmt;
use std::ops::{Add, Sub, Neg, Mul};
use serde::{Serialize, Deserialize};

/// 2D vector with integer (tile) components.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Vec2i {
    /// X component (tiles, grows right)
    pub x: i32,
    /// Y component (tiles, grows up)
    pub y: i32,
}

impl Vec2i {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// (1, 1), the size of a single tile
    pub const ONE: Self = Self { x: 1, y: 1 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0, y: 1 };

    /// Unit vector pointing down (-Y)
    pub const DOWN: Self = Self { x: 0, y: -1 };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -1, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Add another vector.
    #[inline]
    pub const fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtract another vector.
    #[inline]
    pub const fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Scale both components by an integer.
    #[inline]
    pub const fn scale(self, scalar: i32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Floor-divide both components (rounds toward negative infinity).
    #[inline]
    pub const fn div_floor(self, divisor: i32) -> Self {
        Self {
            x: self.x.div_euclid(divisor),
            y: self.y.div_euclid(divisor),
        }
    }
}

impl Add for Vec2i {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vec2i::add(self, rhs)
    }
}

impl Sub for Vec2i {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Vec2i::sub(self, rhs)
    }
}

impl Mul<i32> for Vec2i {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec2i {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Vec2i {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Debug for Vec2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2i({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vec2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
