//! Tournament points, counted in half points.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A non-negative score in half-point steps (0, 0.5, 1, 1.5, ...).
///
/// Kept as an integer count of half points so score groups can be keyed by
/// exact value. On disk it is a plain JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Points(u32);

impl Points {
    pub const ZERO: Points = Points(0);
    pub const HALF: Points = Points(1);
    pub const ONE: Points = Points(2);

    /// Build from a count of half points.
    pub const fn from_halves(halves: u32) -> Self {
        Self(halves)
    }

    /// Number of half points.
    pub fn halves(&self) -> u32 {
        self.0
    }

    /// Convert from a decimal value, rounding to the nearest half point.
    /// Negative and non-finite values become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::ZERO;
        }
        Self((value * 2.0).round() as u32)
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 2.0
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::ZERO, Add::add)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole numbers are written as integers: `1`, not `1.0`.
        if self.0 % 2 == 0 {
            serializer.serialize_u32(self.0 / 2)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Points::from_f64(value))
    }
}
