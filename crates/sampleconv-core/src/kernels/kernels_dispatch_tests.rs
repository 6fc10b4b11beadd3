//! Dispatch tests: every SIMD level must agree bit-for-bit with the scalar
//! reference, including the tail lengths that are not a multiple of the
//! lane width.

use num_complex::Complex32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

const LEVELS: [SimdLevel; 3] = [SimdLevel::Avx2, SimdLevel::Neon, SimdLevel::Scalar];

// Covers empty input, pure-tail lengths and several full blocks plus tails.
const LENGTHS: [usize; 12] = [0, 1, 3, 4, 7, 8, 15, 16, 17, 31, 64, 1027];

fn random_f32(rng: &mut StdRng, len: usize, range: f32) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-range..range)).collect()
}

fn random_i16(rng: &mut StdRng, len: usize) -> Vec<i16> {
    (0..len).map(|_| rng.gen()).collect()
}

fn random_i8(rng: &mut StdRng, len: usize) -> Vec<i8> {
    (0..len).map(|_| rng.gen()).collect()
}

// ============================================================================
// Level detection
// ============================================================================

#[test]
fn test_simd_level_is_cached_and_available() {
    let first = simd_level();
    assert_eq!(first, simd_level());
    assert!(first.is_available());
    assert!(SimdLevel::Scalar.is_available());
}

#[test]
fn test_unavailable_level_falls_back_to_scalar() {
    for level in LEVELS {
        let resolved = level.or_scalar();
        assert!(resolved == level || resolved == SimdLevel::Scalar);
        assert!(resolved.is_available());
    }
}

#[test]
fn test_level_names_are_distinct() {
    assert_ne!(SimdLevel::Avx2.name(), SimdLevel::Scalar.name());
    assert_ne!(SimdLevel::Neon.name(), SimdLevel::Scalar.name());
    assert_eq!(SimdLevel::Scalar.to_string(), "Scalar (no SIMD)");
}

// ============================================================================
// SIMD vs scalar equivalence
// ============================================================================

#[test]
fn test_integer_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in LENGTHS {
        let bytes = random_i8(&mut rng, len);
        let words = random_i16(&mut rng, len);
        let mut expected_words = vec![0i16; len];
        let mut expected_bytes = vec![0i8; len];
        scalar::s8_to_s16(&bytes, &mut expected_words);
        scalar::s16_to_s8(&words, &mut expected_bytes);

        for level in LEVELS {
            let mut got_words = vec![0i16; len];
            let mut got_bytes = vec![0i8; len];
            s8_to_s16_with_level(level, &bytes, &mut got_words);
            s16_to_s8_with_level(level, &words, &mut got_bytes);
            assert_eq!(got_words, expected_words, "s8_to_s16 {level:?} len={len}");
            assert_eq!(got_bytes, expected_bytes, "s16_to_s8 {level:?} len={len}");
        }
    }
}

#[test]
fn test_int_to_float_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(11);
    for len in LENGTHS {
        let bytes = random_i8(&mut rng, len);
        let words = random_i16(&mut rng, len);
        let dwords: Vec<i32> = (0..len).map(|_| rng.gen()).collect();

        let mut e8 = vec![0.0f32; len];
        let mut e16 = vec![0.0f32; len];
        let mut e32 = vec![0.0f32; len];
        scalar::s8_to_f32(&bytes, &mut e8, 1.0 / 128.0);
        scalar::s16_to_f32(&words, &mut e16, 1.0 / 32768.0);
        scalar::s32_to_f32(&dwords, &mut e32, 1.0 / 2_147_483_648.0);

        for level in LEVELS {
            let mut g8 = vec![0.0f32; len];
            let mut g16 = vec![0.0f32; len];
            let mut g32 = vec![0.0f32; len];
            s8_to_f32_div_with_level(level, &bytes, &mut g8, 128.0);
            s16_to_f32_div_with_level(level, &words, &mut g16, 32768.0);
            s32_to_f32_div_with_level(level, &dwords, &mut g32, 2_147_483_648.0);
            assert_eq!(g8, e8, "s8_to_f32 {level:?} len={len}");
            assert_eq!(g16, e16, "s16_to_f32 {level:?} len={len}");
            assert_eq!(g32, e32, "s32_to_f32 {level:?} len={len}");
        }
    }
}

#[test]
fn test_float_to_int_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(13);
    for len in LENGTHS {
        // Range past 1.0 so saturation is exercised on every path.
        let src = random_f32(&mut rng, len, 1.5);

        let mut e8 = vec![0i8; len];
        let mut e16 = vec![0i16; len];
        let mut e32 = vec![0i32; len];
        scalar::f32_to_s8(&src, &mut e8, 128.0);
        scalar::f32_to_s16(&src, &mut e16, 32768.0);
        scalar::f32_to_s32(&src, &mut e32, 2_147_483_648.0);

        for level in LEVELS {
            let mut g8 = vec![0i8; len];
            let mut g16 = vec![0i16; len];
            let mut g32 = vec![0i32; len];
            f32_to_s8_mul_with_level(level, &src, &mut g8, 128.0);
            f32_to_s16_mul_with_level(level, &src, &mut g16, 32768.0);
            f32_to_s32_mul_with_level(level, &src, &mut g32, 2_147_483_648.0);
            assert_eq!(g8, e8, "f32_to_s8 {level:?} len={len}");
            assert_eq!(g16, e16, "f32_to_s16 {level:?} len={len}");
            assert_eq!(g32, e32, "f32_to_s32 {level:?} len={len}");
        }
    }
}

#[test]
fn test_float_to_int_special_values_match_scalar() {
    let src = [
        f32::NAN,
        f32::INFINITY,
        f32::NEG_INFINITY,
        0.5,
        1.5,
        -2.5,
        2_147_483_648.0,
        -2_147_483_648.0,
        f32::NAN,
        -0.0,
        3.0e38,
        -3.0e38,
        126.5,
        127.5,
        -128.5,
        40000.0,
    ];
    let mut e8 = [0i8; 16];
    let mut e16 = [0i16; 16];
    let mut e32 = [0i32; 16];
    scalar::f32_to_s8(&src, &mut e8, 1.0);
    scalar::f32_to_s16(&src, &mut e16, 1.0);
    scalar::f32_to_s32(&src, &mut e32, 1.0);

    for level in LEVELS {
        let mut g8 = [0i8; 16];
        let mut g16 = [0i16; 16];
        let mut g32 = [0i32; 16];
        f32_to_s8_mul_with_level(level, &src, &mut g8, 1.0);
        f32_to_s16_mul_with_level(level, &src, &mut g16, 1.0);
        f32_to_s32_mul_with_level(level, &src, &mut g32, 1.0);
        assert_eq!(g8, e8, "f32_to_s8 {level:?}");
        assert_eq!(g16, e16, "f32_to_s16 {level:?}");
        assert_eq!(g32, e32, "f32_to_s32 {level:?}");
    }
    assert_eq!(e32[1], i32::MAX);
    assert_eq!(e32[2], i32::MIN);
    assert_eq!(e16[0], 0);
}

#[test]
fn test_float_width_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(17);
    for len in LENGTHS {
        let narrow = random_f32(&mut rng, len, 1.0e6);
        let wide: Vec<f64> = (0..len).map(|_| rng.gen_range(-1.0e9..1.0e9)).collect();

        let mut e_wide = vec![0.0f64; len];
        let mut e_narrow = vec![0.0f32; len];
        scalar::f32_to_f64(&narrow, &mut e_wide);
        scalar::f64_to_f32(&wide, &mut e_narrow);

        for level in LEVELS {
            let mut g_wide = vec![0.0f64; len];
            let mut g_narrow = vec![0.0f32; len];
            f32_to_f64_with_level(level, &narrow, &mut g_wide);
            f64_to_f32_with_level(level, &wide, &mut g_narrow);
            assert_eq!(g_wide, e_wide, "f32_to_f64 {level:?} len={len}");
            assert_eq!(g_narrow, e_narrow, "f64_to_f32 {level:?} len={len}");
        }
    }
}

#[test]
fn test_scale_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(19);
    for len in LENGTHS {
        let src = random_f32(&mut rng, len, 100.0);
        let mut expected = vec![0.0f32; len];
        scalar::f32_scale(&src, &mut expected, 0.1);

        for level in LEVELS {
            let mut got = vec![0.0f32; len];
            f32_scale_with_level(level, &src, &mut got, 0.1);
            assert_eq!(got, expected, "f32_scale {level:?} len={len}");

            let mut in_place = src.clone();
            f32_scale_inplace_with_level(level, &mut in_place, 0.1);
            assert_eq!(in_place, expected, "f32_scale_inplace {level:?} len={len}");
        }
    }
}

#[test]
fn test_complex_scale_kernels_match_scalar() {
    let mut rng = StdRng::seed_from_u64(23);
    let k = Complex32::new(0.75, -1.25);
    for len in LENGTHS.iter().map(|len| len * 2) {
        let src = random_f32(&mut rng, len, 10.0);
        let mut expected = vec![0.0f32; len];
        scalar::cf32_scale(&src, &mut expected, k);

        for level in LEVELS {
            let mut got = vec![0.0f32; len];
            cf32_scale_with_level(level, &src, &mut got, k);
            assert_eq!(got, expected, "cf32_scale {level:?} len={len}");

            let mut in_place = src.clone();
            cf32_scale_inplace_with_level(level, &mut in_place, k);
            assert_eq!(in_place, expected, "cf32_scale_inplace {level:?} len={len}");
        }
    }
}

#[test]
fn test_complex_16bit_kernels_are_unscaled() {
    let src = [1i16, -2, 32767, -32768];
    let mut floats = [0.0f32; 4];
    cs16_to_cf32(&src, &mut floats);
    assert_eq!(floats, [1.0, -2.0, 32767.0, -32768.0]);

    let mut back = [0i16; 4];
    cf32_to_cs16(&floats, &mut back);
    assert_eq!(back, src);
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
#[should_panic(expected = "lengths must match")]
fn test_mismatched_lengths_panic() {
    let mut dst = [0i16; 3];
    s8_to_s16(&[1, 2], &mut dst);
}

#[test]
#[should_panic(expected = "odd length")]
fn test_odd_complex_length_panics() {
    let mut buf = [0.0f32; 3];
    cf32_scale_inplace(&mut buf, Complex32::new(1.0, 0.0));
}
