//! Fixed numeric helpers shared by the modulation and demodulation paths.

use std::f64::consts::TAU;

use crate::errors::{NumericsError, Result};

/// Default absolute tolerance for floating-point comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Check whether `value` is a power of two. Zero is not.
pub fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Interpret a bit slice (most-significant bit first) as a decimal value.
///
/// Only the least-significant bit of each element is considered, so any
/// non-zero `u8` counts as a set bit.
pub fn bits_to_decimal(bits: &[u8]) -> u32 {
    debug_assert!(bits.len() <= 32, "bit group wider than u32");
    bits.iter().fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit & 1))
}

/// Pack a bit stream into symbols of `bits_per_symbol` bits, MSB first.
///
/// When the bit count is not a multiple of the group width the *first*
/// symbol takes the leftover bits, i.e. it is implicitly zero-padded on the
/// left. An empty input yields an empty output.
pub fn bits_to_symbols(bits: &[u8], bits_per_symbol: u32) -> Vec<u32> {
    assert!(
        (1..=32).contains(&bits_per_symbol),
        "bits per symbol must be in 1..=32"
    );
    if bits.is_empty() {
        return Vec::new();
    }
    let width = bits_per_symbol as usize;
    let leading = bits.len() % width;
    let mut symbols = Vec::with_capacity(bits.len() / width + usize::from(leading != 0));
    if leading != 0 {
        symbols.push(bits_to_decimal(&bits[..leading]));
    }
    symbols.extend(bits[leading..].chunks_exact(width).map(bits_to_decimal));
    symbols
}

/// Unpack symbols back into a bit stream, `bits_per_symbol` bits each,
/// MSB first. The inverse of [`bits_to_symbols`] up to the left padding of
/// the first symbol.
pub fn symbols_to_bits(symbols: &[u32], bits_per_symbol: u32) -> Vec<u8> {
    assert!(
        (1..=32).contains(&bits_per_symbol),
        "bits per symbol must be in 1..=32"
    );
    symbols
        .iter()
        .flat_map(|&symbol| {
            (0..bits_per_symbol)
                .rev()
                .map(move |bit| ((symbol >> bit) & 1) as u8)
        })
        .collect()
}

/// Number of binary digits a positive value occupies.
pub fn num_bits_for_value(value: u32) -> Result<u32> {
    if value == 0 {
        return Err(NumericsError::ZeroArgument { name: "value" }.into());
    }
    Ok(32 - value.leading_zeros())
}

/// Convert an angle from degrees to radians.
pub fn degrees_to_radians(angle_degrees: f64) -> f64 {
    angle_degrees * std::f64::consts::PI / 180.0
}

/// Greatest common divisor.
pub fn gcd(mut first: u32, mut second: u32) -> u32 {
    while second != 0 {
        let remainder = first % second;
        first = second;
        second = remainder;
    }
    first
}

/// Shift a phase value into the canonical range [0, 2*pi).
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid of a tiny negative value can round up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Compare two doubles with the default 1e-6 absolute tolerance.
pub fn nearly_equal(lhs: f64, rhs: f64) -> bool {
    nearly_equal_with(lhs, rhs, DEFAULT_TOLERANCE)
}

/// Compare two doubles with an explicit absolute tolerance.
pub fn nearly_equal_with(lhs: f64, rhs: f64, tolerance: f64) -> bool {
    (lhs - rhs).abs() <= tolerance
}

/// Compare two sample slices element-wise with the default tolerance.
pub fn nearly_equal_slice(lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(&left, &right)| nearly_equal(left, right))
}

/// Search direction for [`nearest_divisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Largest divisor less than or equal to the starting value.
    Below,
    /// Smallest divisor greater than or equal to the starting value.
    Above,
}

/// Find the number closest to `value` that divides `of` without remainder,
/// searching downward or upward from `value`.
pub fn nearest_divisor(value: u32, of: u32, direction: Direction) -> Result<u32> {
    if value == 0 {
        return Err(NumericsError::ZeroArgument { name: "value" }.into());
    }
    if of == 0 {
        return Err(NumericsError::ZeroArgument { name: "of" }.into());
    }
    match direction {
        Direction::Below => {
            // 1 divides everything, so the downward search always terminates
            let mut candidate = value.min(of);
            while of % candidate != 0 {
                candidate -= 1;
            }
            Ok(candidate)
        }
        Direction::Above => {
            let mut candidate = value;
            while candidate <= of {
                if of % candidate == 0 {
                    return Ok(candidate);
                }
                candidate += 1;
            }
            Err(NumericsError::NoDivisor {
                value,
                of,
                direction: "at or above",
            }
            .into())
        }
    }
}
