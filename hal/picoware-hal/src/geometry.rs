//! Geometry value types

use core::ops::{Add, Sub};

/// A 2D integer pair used for both positions and sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    /// The origin (or an empty size)
    pub const ZERO: Vector = Vector { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Multiply both components by `factor`
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Treating `self` as a size, check whether `point` lies inside it
    pub const fn contains(self, point: Vector) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.x && point.y < self.y
    }

    /// Area when treated as a size; negative extents count as zero
    pub fn area(self) -> u32 {
        (self.x.max(0) as u32) * (self.y.max(0) as u32)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Vector {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
