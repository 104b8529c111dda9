//! Gray-code generation for the constellation circle.
//!
//! The codes are produced directly in circle order (reflect-and-prefix),
//! not via the XOR shortcut: both the modulator's phase map and the
//! demodulator's sector table index into this sequence positionally.

use crate::errors::{NumericsError, Result};
use crate::numerics::{bits_to_decimal, is_power_of_two};

/// Produce the ordered table of `num_codes` Gray codes, one row per code,
/// most-significant bit first.
///
/// Adjacent rows (including the wrap from last to first) differ in exactly
/// one bit. `num_codes` must be a power of two; a single code degenerates
/// to `[[0]]`.
pub fn gray_codes(num_codes: u32) -> Result<Vec<Vec<u8>>> {
    if !is_power_of_two(num_codes) {
        return Err(NumericsError::NotPowerOfTwo { value: num_codes }.into());
    }
    if num_codes == 1 {
        return Ok(vec![vec![0]]);
    }
    let width = num_codes.trailing_zeros() as usize;
    let mut codes = vec![vec![0u8; width]; num_codes as usize];

    // Each block mirrors the previously filled half behind a new senior bit.
    let mut block = 1usize;
    while block < num_codes as usize {
        let senior = width - block.trailing_zeros() as usize - 1;
        let mut offset_back = 1usize;
        for code in block..block * 2 {
            codes[code][senior] = 1;
            for bit in senior + 1..width {
                codes[code][bit] = codes[code - offset_back][bit];
            }
            offset_back += 2;
        }
        block *= 2;
    }
    Ok(codes)
}

/// Decimal values of the Gray codes in circle order.
pub fn gray_sequence(num_codes: u32) -> Result<Vec<u32>> {
    Ok(gray_codes(num_codes)?
        .iter()
        .map(|code| bits_to_decimal(code))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hamming(lhs: u32, rhs: u32) -> u32 {
        (lhs ^ rhs).count_ones()
    }

    #[test]
    fn single_code_degenerates_to_zero() {
        assert_eq!(gray_codes(1).unwrap(), vec![vec![0]]);
    }

    #[test]
    fn two_codes() {
        assert_eq!(gray_codes(2).unwrap(), vec![vec![0], vec![1]]);
    }

    #[test]
    fn four_codes_in_circle_order() {
        let codes = gray_codes(4).unwrap();
        assert_eq!(
            codes,
            vec![vec![0, 0], vec![0, 1], vec![1, 1], vec![1, 0]]
        );
        assert_eq!(gray_sequence(4).unwrap(), vec![0, 1, 3, 2]);
    }

    #[test]
    fn eight_codes_in_circle_order() {
        assert_eq!(gray_sequence(8).unwrap(), vec![0, 1, 3, 2, 6, 7, 5, 4]);
    }

    #[test]
    fn rejects_non_powers_of_two() {
        for bad in [0, 3, 6, 12, 100] {
            assert!(gray_codes(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn sequence_is_a_permutation_with_unit_hamming_steps() {
        for exponent in 1..=10u32 {
            let num_codes = 1 << exponent;
            let sequence = gray_sequence(num_codes).unwrap();
            assert_eq!(sequence[0], 0);
            assert_eq!(sequence.len(), num_codes as usize);

            let mut sorted = sequence.clone();
            sorted.sort_unstable();
            assert!(sorted.iter().enumerate().all(|(i, &v)| v == i as u32));

            for pair in sequence.windows(2) {
                assert_eq!(hamming(pair[0], pair[1]), 1);
            }
            assert_eq!(hamming(sequence[num_codes as usize - 1], sequence[0]), 1);
        }
    }
}
