//! Logarithmic fixed-point arithmetic.
//!
//! Integers are converted into a base-2 logarithmic code once, after which the
//! ratios, squares and square roots of the ramp calculation are plain integer
//! additions. Conversion back saturates instead of failing.
//!
//! The relative error of a round trip `to_u32(from_u32(x))` stays below 0.4%.

mod tables;
mod value;

pub use value::{LogValue, UNITS_PER_OCTAVE};
