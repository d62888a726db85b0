//! Two dimensional vector math used by every other module.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline(always)]
    pub const fn dot(self, other: Vector2) -> f32 {
        self.x*other.x + self.y*other.y
    }

    #[inline(always)]
    pub const fn length_sqr(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length, `sqrt(x² + y²)`
    #[inline(always)]
    pub fn magnitude(self) -> f32 {
        self.length_sqr().sqrt()
    }

    /// Returns `self / magnitude`
    ///
    /// The result is not finite when the magnitude is zero, callers must rule that out first
    /// (or use [`Vector2::try_unit`]).
    #[inline]
    pub fn to_unit(self) -> Vector2 {
        self / self.magnitude()
    }

    /// Checked version of [`Vector2::to_unit`], [`None`] for a zero or non-finite magnitude
    pub fn try_unit(self) -> Option<Vector2> {
        let length = self.magnitude();

        if length == 0.0 || !length.is_finite() {
            return None;
        }

        Some(self / length)
    }
}

impl Neg for Vector2 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}

impl Add for Vector2 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Vector2 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl SubAssign for Vector2 {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: f32) -> Self::Output {
        Self { x: self.x*rhs, y: self.y*rhs }
    }
}

impl Mul<Vector2> for f32 {
    type Output = Vector2;
    #[inline(always)]
    fn mul(self, rhs: Vector2) -> Self::Output {
        rhs*self
    }
}

impl MulAssign<f32> for Vector2 {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vector2 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: f32) -> Self::Output {
        Self { x: self.x/rhs, y: self.y/rhs }
    }
}

impl DivAssign<f32> for Vector2 {
    #[inline(always)]
    fn div_assign(&mut self, rhs: f32) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(feature = "raylib")]
impl From<raylib::prelude::Vector2> for Vector2 {
    fn from(v: raylib::prelude::Vector2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[cfg(feature = "raylib")]
impl From<Vector2> for raylib::prelude::Vector2 {
    fn from(v: Vector2) -> Self {
        raylib::prelude::Vector2::new(v.x, v.y)
    }
}
