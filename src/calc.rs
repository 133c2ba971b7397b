//! Small arithmetic helpers.

use std::ops::{Add, Sub};

pub fn add<T: Add<Output = T>>(x: T, y: T) -> T {
    x + y
}

/// Subtracts `x` from `y`.
pub fn subtract<T: Sub<Output = T>>(x: T, y: T) -> T {
    y - x
}
