//! Logarithmic fixed-point value.

use core::fmt;

use super::tables::{EXP2_CORRECTION, LOG2_CORRECTION};

/// Number of code units per octave (`log2(v) == 1`).
pub const UNITS_PER_OCTAVE: i16 = 512;

/// A positive magnitude stored as `log2(v) * 512` in a signed 16 bit code.
///
/// Multiplication, division, squares and square roots become additions,
/// subtractions and halvings of the code, so the ramp arithmetic needs neither
/// floating point nor a hardware divider.
///
/// `LogValue::ZERO` is a sentinel for "zero/undefined". It orders below every
/// valid code and converts back to `0`, but arithmetic on it has no meaning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogValue(i16);

impl LogValue {
    /// The zero/undefined sentinel.
    pub const ZERO: Self = Self(i16::MIN);

    /// The value `1` (`2^0`).
    pub const ONE: Self = Self(0);

    /// The value `2`.
    pub const TWO: Self = Self(UNITS_PER_OCTAVE);

    /// Largest representable code.
    pub const MAX: Self = Self(i16::MAX);

    /// Codes at or above this saturate [`to_u16`](Self::to_u16).
    const U16_LIMIT: i16 = 16 * UNITS_PER_OCTAVE;

    /// Codes at or above this saturate [`to_u32`](Self::to_u32).
    const U32_LIMIT: i16 = 32 * UNITS_PER_OCTAVE;

    /// Build from a raw code.
    #[inline]
    pub const fn from_raw(code: i16) -> Self {
        Self(code)
    }

    /// Get the raw code.
    #[inline]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Check for the zero sentinel.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == i16::MIN
    }

    /// Convert an 8 bit integer. `0` yields [`LogValue::ZERO`].
    #[inline]
    pub fn from_u8(x: u8) -> Self {
        Self::from_u32(u32::from(x))
    }

    /// Convert a 16 bit integer. `0` yields [`LogValue::ZERO`].
    #[inline]
    pub fn from_u16(x: u16) -> Self {
        Self::from_u32(u32::from(x))
    }

    /// Convert a 32 bit integer. `0` yields [`LogValue::ZERO`].
    ///
    /// The leading one gives the exponent, the nine bits below it the
    /// mantissa. The upper eight mantissa bits index the correction table
    /// that bends the linear mantissa onto the log2 curve.
    pub fn from_u32(x: u32) -> Self {
        if x == 0 {
            return Self::ZERO;
        }
        let exponent = 31 - x.leading_zeros();
        let aligned = if exponent >= 9 {
            x >> (exponent - 9)
        } else {
            x << (9 - exponent)
        };
        let mantissa = (aligned & 0x1ff) as i16;
        let correction = i16::from(LOG2_CORRECTION[(mantissa >> 1) as usize]);
        Self(exponent as i16 * UNITS_PER_OCTAVE + mantissa + correction)
    }

    /// Convert back to a 16 bit integer.
    ///
    /// Saturates to `0` for values below one and to `u16::MAX` for values
    /// that do not fit.
    pub fn to_u16(self) -> u16 {
        if self.0 < 0 {
            return 0;
        }
        if self.0 >= Self::U16_LIMIT {
            return u16::MAX;
        }
        let exponent = (self.0 >> 9) as u32;
        let mantissa = (self.0 & 0x1ff) as u16;
        let correction = u16::from(EXP2_CORRECTION[(mantissa >> 1) as usize]);
        let x = mantissa + 0x200 - correction;
        if exponent > 9 {
            x << (exponent - 9)
        } else if exponent < 9 {
            (x + 1) >> (9 - exponent)
        } else {
            x
        }
    }

    /// Convert back to a 32 bit integer.
    ///
    /// Saturates to `0` for values below one and to `u32::MAX` for values
    /// that do not fit.
    pub fn to_u32(self) -> u32 {
        if self.0 < 0 {
            return 0;
        }
        if self.0 >= Self::U32_LIMIT {
            return u32::MAX;
        }
        let exponent = (self.0 >> 9) as u8;
        if exponent < 16 {
            return u32::from(self.to_u16());
        }
        let shift = exponent - 15;
        u32::from(self.shr(shift).to_u16()) << shift
    }

    /// `self * other`.
    #[inline]
    pub fn multiply(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// `self / other`.
    #[inline]
    pub fn divide(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `1 / self`.
    #[inline]
    pub fn reciprocal(self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// `self * self`, clamped to the representable extremes.
    #[inline]
    pub fn square(self) -> Self {
        if self.0 >= 0x4000 {
            Self(0x7fff)
        } else if self.0 <= -0x4000 {
            Self(-0x7fff)
        } else {
            Self(self.0 + self.0)
        }
    }

    /// `1 / (self * self)`.
    #[inline]
    pub fn reciprocal_square(self) -> Self {
        self.square().reciprocal()
    }

    /// `1 / sqrt(self)`.
    #[inline]
    pub fn reciprocal_sqrt(self) -> Self {
        Self(self.0.saturating_neg() / 2)
    }

    /// `self * 2^n`.
    #[inline]
    pub fn shl(self, n: u8) -> Self {
        Self(self.0.saturating_add(i16::from(n) * UNITS_PER_OCTAVE))
    }

    /// `self / 2^n`.
    #[inline]
    pub fn shr(self, n: u8) -> Self {
        Self(self.0.saturating_sub(i16::from(n) * UNITS_PER_OCTAVE))
    }
}

impl Default for LogValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u8> for LogValue {
    fn from(x: u8) -> Self {
        Self::from_u8(x)
    }
}

impl From<u16> for LogValue {
    fn from(x: u16) -> Self {
        Self::from_u16(x)
    }
}

impl From<u32> for LogValue {
    fn from(x: u32) -> Self {
        Self::from_u32(x)
    }
}

impl fmt::Debug for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "LogValue(zero)")
        } else {
            write!(f, "LogValue({:#06x})", self.0)
        }
    }
}
