//! Quantities with compile-time-checked units (em, pixels, font units).
//!
//! A function requiring a pixel length asks for a [`Unit<Px>`]; mixing up font units
//! and surface units then becomes a type error rather than a layout bug.

use std::cmp::{PartialEq, PartialOrd};
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use self::units::{Em, Pt, Px, Ratio};
pub mod units;

/// An `f64` value whose unit is carried in the type.
#[derive(Serialize, Deserialize)]
pub struct Unit<U> {
    value: f64,
    _phantom: std::marker::PhantomData<U>,
}

impl<U> Unit<U> {
    /// The zero length.
    pub const ZERO: Self = Self::new(0.);

    /// Wraps a raw value. The caller vouches that the value really is in unit `U`.
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Is the quantity zero?
    pub fn is_zero(self) -> bool {
        self.value == 0.0
    }

    /// Strips the unit. Lossy with respect to dimension checking; prefer the typed
    /// operations where possible.
    #[inline]
    pub const fn to_unitless(self) -> f64 {
        self.value
    }

    /// Multiplies by a dimensionless factor.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.value * factor)
    }

    /// `f64::min` for lengths of the same unit.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.value.min(other.value))
    }

    /// `f64::max` for lengths of the same unit.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.value.max(other.value))
    }

    /// `f64::abs` for lengths.
    pub fn abs(self) -> Self {
        Self::new(self.value.abs())
    }
}

impl<U, V> Unit<Ratio<U, V>> {
    /// Inverts a ratio, going from U/V to V/U.
    #[inline]
    pub fn recip(self) -> Unit<Ratio<V, U>> {
        Unit::new(self.value.recip())
    }
}

impl Unit<Ratio<Px, Pt>> {
    /// Standard pt → px conversion: 96 PPI / 72 points per inch.
    pub const fn standard_pt_to_px() -> Self {
        Self::new(96. / 72.)
    }
}

// ---- arithmetic -----------------------------------------------------------

impl<U> Add for Unit<U> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value)
    }
}

impl<U> Sub for Unit<U> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value)
    }
}

impl<U> Neg for Unit<U> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.value)
    }
}

impl<U> AddAssign for Unit<U> {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl<U> SubAssign for Unit<U> {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

/// Multiplying a V-length by a U/V ratio yields a U-length.
impl<U, V> Mul<Unit<Ratio<U, V>>> for Unit<V> {
    type Output = Unit<U>;
    fn mul(self, rhs: Unit<Ratio<U, V>>) -> Unit<U> {
        Unit::new(self.value * rhs.value)
    }
}

/// Dividing a U-length by a V-length yields a U/V ratio.
impl<U, V> Div<Unit<V>> for Unit<U> {
    type Output = Unit<Ratio<U, V>>;
    fn div(self, rhs: Unit<V>) -> Unit<Ratio<U, V>> {
        Unit::new(self.value / rhs.value)
    }
}

impl<U> Sum for Unit<U> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Unit::ZERO, |a, b| a + b)
    }
}

// ---- std trait plumbing ---------------------------------------------------
// derive(Clone, Copy, PartialEq, ...) would demand U: Clone etc., which the phantom
// tag never needs; implemented by hand like any phantom-parameterized type.

impl<U> Clone for Unit<U> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<U> Copy for Unit<U> {}

impl<U> PartialEq for Unit<U> {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq(&other.value)
    }
}

impl<U> PartialOrd for Unit<U> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<U> Debug for Unit<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unit::<{}>::new({})", std::any::type_name::<U>(), self.value)
    }
}

impl<U> Display for Unit<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl<U> Default for Unit<U> {
    fn default() -> Self {
        Unit::ZERO
    }
}

impl<U> From<f64> for Unit<U> {
    fn from(x: f64) -> Self {
        Unit::new(x)
    }
}

impl<U> From<i16> for Unit<U> {
    fn from(x: i16) -> Self {
        Unit::new(x.into())
    }
}

impl<U> From<u16> for Unit<U> {
    fn from(x: u16) -> Self {
        Unit::new(x.into())
    }
}

impl<U> From<u32> for Unit<U> {
    fn from(x: u32) -> Self {
        Unit::new(x.into())
    }
}

/// One mu, the unit inter-atom spacing is specified in: 1/18 em.
pub const MU: Unit<Em> = Unit::new(1. / 18.);
