//! End-to-end modulation/demodulation scenarios.
//!
//! The ideal channel must round-trip exactly: differential decoding leaves
//! no tolerance budget, a decision either lands in the right sector or it
//! does not. Noise scenarios measure symbol errors instead of expecting
//! failures.

use dpsk_core::channel::add_gaussian_noise;
use dpsk_core::numerics::bits_to_symbols;
use dpsk_core::{Demodulator, ModemConfig, ModulationFunction, Modulator, PivotMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn random_bits(count: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(0..=1u8)).collect()
}

fn round_trip(config: &ModemConfig, bits: &[u8]) -> Vec<u32> {
    let mut modulator = Modulator::new(config.clone()).unwrap();
    let mut demodulator = Demodulator::new(config.clone()).unwrap();
    let samples = modulator.modulate(bits, PivotMode::WithoutPivot).unwrap();
    demodulator.demodulate(&samples).unwrap()
}

#[test]
fn binary_dpsk_at_symbol_rate_carrier() {
    let config = ModemConfig::new(19_200, 1_200);
    let bits = [1, 1, 1, 1, 1, 0];

    let mut modulator = Modulator::new(config.clone()).unwrap();
    let samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();
    assert_eq!(samples.len(), 112);

    let mut demodulator = Demodulator::new(config).unwrap();
    assert_eq!(
        demodulator.demodulate(&samples).unwrap(),
        vec![1, 1, 1, 1, 1, 0]
    );
}

#[test]
fn quadrature_dpsk_through_the_intermediate_frequency() {
    let config = ModemConfig::new(19_200, 1_200)
        .with_positionality(4)
        .with_carrier_frequency(1_800)
        .with_intermediate_frequency(1_200);
    let bits = [1, 0, 1, 1, 0, 1, 0, 0];
    assert_eq!(round_trip(&config, &bits), vec![2, 3, 1, 0]);
}

#[test]
fn eight_position_dpsk() {
    let config = ModemConfig::new(50_000, 1_000).with_positionality(8);
    let bits = [1, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0];
    assert_eq!(round_trip(&config, &bits), vec![5, 4, 7, 0]);
}

#[test]
fn base_phase_and_sector_shift_pairing() {
    let modulator_config = ModemConfig::new(50_000, 1_000).with_phase(PI / 2.0);
    let demodulator_config = ModemConfig::new(50_000, 1_000).with_phase_shift(PI / 2.0);
    let bits = [0, 1, 1, 1, 0, 1];

    let mut modulator = Modulator::new(modulator_config).unwrap();
    let mut demodulator = Demodulator::new(demodulator_config).unwrap();
    let samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();
    assert_eq!(
        demodulator.demodulate(&samples).unwrap(),
        vec![0, 1, 1, 1, 0, 1]
    );
}

#[test]
fn round_trip_identity_across_positionalities_and_rates() {
    for &(sampling_frequency, symbol_rate) in &[(19_200u32, 1_200u32), (50_000, 1_000)] {
        for &positionality in &[2u16, 4, 8] {
            let config = ModemConfig::new(sampling_frequency, symbol_rate)
                .with_positionality(positionality);
            let bits = random_bits(60, u64::from(positionality) * 1000 + u64::from(symbol_rate));
            let expected = bits_to_symbols(&bits, config.bits_per_symbol());
            assert_eq!(
                round_trip(&config, &bits),
                expected,
                "Fs={sampling_frequency} M={positionality}"
            );
        }
    }
}

#[test]
fn constellation_shift_cancels_between_the_ends() {
    let bits = random_bits(64, 99);
    let plain = ModemConfig::new(19_200, 1_200).with_positionality(4);
    let shifted = plain.clone().with_phase_shift(1.1);
    assert_eq!(round_trip(&shifted, &bits), round_trip(&plain, &bits));
}

#[test]
fn cosine_waveform_round_trip() {
    let config = ModemConfig::new(19_200, 1_200)
        .with_positionality(4)
        .with_modulation_function(ModulationFunction::Cos);
    let bits = random_bits(40, 3);
    assert_eq!(
        round_trip(&config, &bits),
        bits_to_symbols(&bits, config.bits_per_symbol())
    );
}

#[test]
fn amplitude_mismatch_does_not_disturb_the_phase_decision() {
    let bits = random_bits(40, 12);
    let loud = ModemConfig::new(19_200, 1_200)
        .with_positionality(4)
        .with_amplitude(2.5);
    let quiet = loud.clone().with_amplitude(1.0);

    let mut modulator = Modulator::new(loud).unwrap();
    let mut demodulator = Demodulator::new(quiet.clone()).unwrap();
    let samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();
    assert_eq!(
        demodulator.demodulate(&samples).unwrap(),
        bits_to_symbols(&bits, quiet.bits_per_symbol())
    );
}

#[test]
fn complex_baseband_round_trip() {
    let config = ModemConfig::new(19_200, 1_200).with_positionality(8);
    let bits = random_bits(60, 4);
    let mut modulator = Modulator::new(config.clone()).unwrap();
    let demodulator = Demodulator::new(config.clone()).unwrap();
    let iq = modulator
        .complex_modulate(&bits, PivotMode::WithoutPivot)
        .unwrap();
    assert_eq!(
        demodulator.demodulate_iq(&iq).unwrap(),
        bits_to_symbols(&bits, config.bits_per_symbol())
    );
}

#[test]
fn moderate_noise_leaves_the_stream_decodable() {
    let config = ModemConfig::new(19_200, 1_200);
    let bits = random_bits(600, 21);
    let expected = bits_to_symbols(&bits, config.bits_per_symbol());

    let mut modulator = Modulator::new(config.clone()).unwrap();
    let mut samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();

    let mut rng = StdRng::seed_from_u64(1234);
    add_gaussian_noise(&mut samples, 0.2, 0.0, &mut rng).unwrap();

    let mut demodulator = Demodulator::new(config).unwrap();
    let symbols = demodulator.demodulate(&samples).unwrap();
    assert_eq!(symbols.len(), expected.len());

    let errors = symbols
        .iter()
        .zip(&expected)
        .filter(|(received, sent)| received != sent)
        .count();
    let symbol_error_rate = errors as f64 / expected.len() as f64;
    assert!(
        symbol_error_rate < 0.01,
        "symbol error rate {symbol_error_rate} too high"
    );
}

#[test]
fn heavy_noise_degrades_gracefully_instead_of_failing() {
    let config = ModemConfig::new(19_200, 1_200).with_positionality(8);
    let bits = random_bits(300, 8);

    let mut modulator = Modulator::new(config.clone()).unwrap();
    let mut samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();

    let mut rng = StdRng::seed_from_u64(5678);
    add_gaussian_noise(&mut samples, 3.0, 0.0, &mut rng).unwrap();

    let mut demodulator = Demodulator::new(config.clone()).unwrap();
    // no error, whatever the bit error rate ends up being
    let symbols = demodulator.demodulate(&samples).unwrap();
    assert_eq!(symbols.len(), bits.len() / config.bits_per_symbol() as usize);
}

#[test]
fn noiseless_channel_with_explicit_zero_deviation() {
    let config = ModemConfig::new(19_200, 1_200).with_positionality(4);
    let bits = random_bits(80, 77);
    let expected = bits_to_symbols(&bits, config.bits_per_symbol());

    let mut modulator = Modulator::new(config.clone()).unwrap();
    let mut samples = modulator.modulate(&bits, PivotMode::WithoutPivot).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    add_gaussian_noise(&mut samples, 0.0, 0.0, &mut rng).unwrap();

    let mut demodulator = Demodulator::new(config).unwrap();
    assert_eq!(demodulator.demodulate(&samples).unwrap(), expected);
}

#[test]
fn surrogate_carrier_matches_a_directly_configured_divisor() {
    // 1800 Hz does not divide 19200 Hz; the opt-in fallback retunes to the
    // nearest divisor below, which is 1600 Hz
    let bits = random_bits(32, 15);
    let fallback = ModemConfig::new(19_200, 1_200)
        .with_carrier_frequency(1_800)
        .with_surrogate_carrier(true);
    let direct = ModemConfig::new(19_200, 1_200).with_carrier_frequency(1_600);

    let mut fallback_modulator = Modulator::new(fallback).unwrap();
    let mut direct_modulator = Modulator::new(direct).unwrap();
    let fallback_samples = fallback_modulator
        .modulate(&bits, PivotMode::WithoutPivot)
        .unwrap();
    let direct_samples = direct_modulator
        .modulate(&bits, PivotMode::WithoutPivot)
        .unwrap();
    assert_eq!(fallback_samples, direct_samples);
}
