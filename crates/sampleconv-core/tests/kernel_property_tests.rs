//! Property-based equivalence tests for the conversion kernels.
//!
//! The detected SIMD level is compared bit-for-bit with the scalar
//! reference, and registry conversions are checked against closed-form
//! bounds over randomized inputs and tail lengths.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use proptest::{
    collection::vec,
    prelude::{any, prop_assert, prop_assert_eq, prop_oneof, Just, Strategy},
    proptest,
    test_runner::{Config as ProptestConfig, FileFailurePersistence},
};
use sampleconv_core::kernels::{
    self, cf32_to_cs16_with_level, cs16_to_cf32_with_level, f32_scale_with_level,
    f32_to_f64_with_level, f32_to_s16_mul_with_level, f32_to_s32_mul_with_level,
    f32_to_s8_mul_with_level, f64_to_f32_with_level, s16_to_f32_div_with_level,
    s16_to_s8_with_level, s32_to_f32_div_with_level, s8_to_f32_div_with_level,
    s8_to_s16_with_level, SimdLevel,
};
use sampleconv_core::{ConverterRegistry, Format, FunctionPriority};

const KERNEL_PROP_CASES: u32 = 256;
const KERNEL_PROP_MAX_SHRINK_ITERS: u32 = 2048;

fn length_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![
        Just(0_usize),
        Just(1_usize),
        Just(7_usize),
        Just(8_usize),
        Just(9_usize),
        Just(15_usize),
        Just(16_usize),
        Just(17_usize),
        Just(31_usize),
        Just(32_usize),
        Just(33_usize),
        0_usize..=1100,
    ]
}

fn nonempty_length_strategy() -> impl Strategy<Value = usize> {
    length_strategy().prop_map(|n| n.max(1))
}

fn even_length_strategy() -> impl Strategy<Value = usize> {
    length_strategy().prop_map(|n| n & !1)
}

fn floats(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec<f32>> {
    length_strategy().prop_flat_map(move |len| vec(range.clone(), len))
}

fn nonempty_floats(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec<f32>> {
    nonempty_length_strategy().prop_flat_map(move |len| vec(range.clone(), len))
}

fn kernel_proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: KERNEL_PROP_CASES,
        max_shrink_iters: KERNEL_PROP_MAX_SHRINK_ITERS,
        // Integration tests do not have a nearby lib.rs/main.rs, so set an
        // explicit persistence root for reproducible counterexamples.
        failure_persistence: Some(Box::new(FileFailurePersistence::WithSource(
            "kernel-property-regressions",
        ))),
        ..ProptestConfig::default()
    }
}

fn detected() -> SimdLevel {
    kernels::simd_level()
}

fn bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

fn convert<S: bytemuck::Pod, D: bytemuck::Pod + Default>(
    registry: &ConverterRegistry,
    source: Format,
    target: Format,
    src: &[S],
    scalar: f64,
) -> Vec<D> {
    let converter = registry
        .get_function(source, target, FunctionPriority::Vectorized)
        .unwrap();
    let count = src.len() / source.components();
    let mut dst = vec![D::default(); count * target.components()];
    converter
        .convert(
            bytemuck::cast_slice(src),
            bytemuck::cast_slice_mut(&mut dst),
            count,
            scalar,
        )
        .unwrap();
    dst
}

proptest! {
    #![proptest_config(kernel_proptest_config())]

    #[test]
    fn test_integer_shifts_match_scalar(
        bytes in length_strategy().prop_flat_map(|len| vec(any::<i8>(), len)),
        words in length_strategy().prop_flat_map(|len| vec(any::<i16>(), len)),
    ) {
        let mut simd = vec![0i16; bytes.len()];
        let mut scalar = vec![0i16; bytes.len()];
        s8_to_s16_with_level(detected(), &bytes, &mut simd);
        s8_to_s16_with_level(SimdLevel::Scalar, &bytes, &mut scalar);
        prop_assert_eq!(&simd, &scalar);

        let mut simd = vec![0i8; words.len()];
        let mut scalar = vec![0i8; words.len()];
        s16_to_s8_with_level(detected(), &words, &mut simd);
        s16_to_s8_with_level(SimdLevel::Scalar, &words, &mut scalar);
        prop_assert_eq!(&simd, &scalar);
    }

    #[test]
    fn test_int_to_float_matches_scalar(
        words in length_strategy().prop_flat_map(|len| vec(any::<i16>(), len)),
        longs in length_strategy().prop_flat_map(|len| vec(any::<i32>(), len)),
        bytes in length_strategy().prop_flat_map(|len| vec(any::<i8>(), len)),
        divisor in 0.001_f32..100_000.0,
    ) {
        let mut simd = vec![0.0f32; words.len()];
        let mut scalar = vec![0.0f32; words.len()];
        s16_to_f32_div_with_level(detected(), &words, &mut simd, divisor);
        s16_to_f32_div_with_level(SimdLevel::Scalar, &words, &mut scalar, divisor);
        prop_assert_eq!(bits(&simd), bits(&scalar));

        let mut simd = vec![0.0f32; longs.len()];
        let mut scalar = vec![0.0f32; longs.len()];
        s32_to_f32_div_with_level(detected(), &longs, &mut simd, divisor);
        s32_to_f32_div_with_level(SimdLevel::Scalar, &longs, &mut scalar, divisor);
        prop_assert_eq!(bits(&simd), bits(&scalar));

        let mut simd = vec![0.0f32; bytes.len()];
        let mut scalar = vec![0.0f32; bytes.len()];
        s8_to_f32_div_with_level(detected(), &bytes, &mut simd, divisor);
        s8_to_f32_div_with_level(SimdLevel::Scalar, &bytes, &mut scalar, divisor);
        prop_assert_eq!(bits(&simd), bits(&scalar));
    }

    #[test]
    fn test_float_to_int_matches_scalar(
        src in floats(-4.0e9..4.0e9),
        scale in 0.0001_f32..10.0,
    ) {
        let mut simd = vec![0i8; src.len()];
        let mut scalar = vec![0i8; src.len()];
        f32_to_s8_mul_with_level(detected(), &src, &mut simd, scale);
        f32_to_s8_mul_with_level(SimdLevel::Scalar, &src, &mut scalar, scale);
        prop_assert_eq!(&simd, &scalar);

        let mut simd = vec![0i16; src.len()];
        let mut scalar = vec![0i16; src.len()];
        f32_to_s16_mul_with_level(detected(), &src, &mut simd, scale);
        f32_to_s16_mul_with_level(SimdLevel::Scalar, &src, &mut scalar, scale);
        prop_assert_eq!(&simd, &scalar);

        let mut simd = vec![0i32; src.len()];
        let mut scalar = vec![0i32; src.len()];
        f32_to_s32_mul_with_level(detected(), &src, &mut simd, scale);
        f32_to_s32_mul_with_level(SimdLevel::Scalar, &src, &mut scalar, scale);
        prop_assert_eq!(&simd, &scalar);
    }

    #[test]
    fn test_float_width_and_scale_match_scalar(
        src in floats(-1.0e6..1.0e6),
        scale in -100.0_f32..100.0,
    ) {
        let mut simd = vec![0.0f64; src.len()];
        let mut scalar = vec![0.0f64; src.len()];
        f32_to_f64_with_level(detected(), &src, &mut simd);
        f32_to_f64_with_level(SimdLevel::Scalar, &src, &mut scalar);
        prop_assert_eq!(&simd, &scalar);

        let mut simd_back = vec![0.0f32; src.len()];
        let mut scalar_back = vec![0.0f32; src.len()];
        f64_to_f32_with_level(detected(), &simd, &mut simd_back);
        f64_to_f32_with_level(SimdLevel::Scalar, &scalar, &mut scalar_back);
        prop_assert_eq!(bits(&simd_back), bits(&scalar_back));

        let mut simd = vec![0.0f32; src.len()];
        let mut scalar = vec![0.0f32; src.len()];
        f32_scale_with_level(detected(), &src, &mut simd, scale);
        f32_scale_with_level(SimdLevel::Scalar, &src, &mut scalar, scale);
        prop_assert_eq!(bits(&simd), bits(&scalar));
    }

    #[test]
    fn test_interleaved_complex_matches_scalar(
        words in even_length_strategy().prop_flat_map(|len| vec(any::<i16>(), len)),
    ) {
        let mut simd = vec![0.0f32; words.len()];
        let mut scalar = vec![0.0f32; words.len()];
        cs16_to_cf32_with_level(detected(), &words, &mut simd);
        cs16_to_cf32_with_level(SimdLevel::Scalar, &words, &mut scalar);
        prop_assert_eq!(bits(&simd), bits(&scalar));

        let mut simd_back = vec![0i16; words.len()];
        let mut scalar_back = vec![0i16; words.len()];
        cf32_to_cs16_with_level(detected(), &simd, &mut simd_back);
        cf32_to_cs16_with_level(SimdLevel::Scalar, &scalar, &mut scalar_back);
        prop_assert_eq!(&simd_back, &scalar_back);
        prop_assert_eq!(&simd_back, &words);
    }

    #[test]
    fn test_s16_float_loopback_is_exact(
        words in nonempty_length_strategy().prop_flat_map(|len| vec(any::<i16>(), len)),
    ) {
        let registry = ConverterRegistry::with_defaults().unwrap();
        let floats: Vec<f32> = convert(&registry, Format::S16, Format::F32, &words, 1.0 / 32768.0);
        for &f in &floats {
            prop_assert!((-1.0..1.0).contains(&f), "{f} outside [-1, 1)");
        }
        let back: Vec<i16> = convert(&registry, Format::F32, Format::S16, &floats, 32768.0);
        prop_assert_eq!(back, words);
    }

    #[test]
    fn test_float_to_s16_saturates(src in nonempty_floats(-10.0..10.0)) {
        let registry = ConverterRegistry::with_defaults().unwrap();
        let ints: Vec<i16> = convert(&registry, Format::F32, Format::S16, &src, 32768.0);
        for (&f, &i) in src.iter().zip(&ints) {
            let expected = (f64::from(f) * 32768.0)
                .round_ties_even()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX));
            prop_assert!(
                (f64::from(i) - expected).abs() <= 1.0,
                "f={f} got={i} expected={expected}"
            );
        }
    }

    #[test]
    fn test_shift_pairs_ignore_scalar(
        bytes in nonempty_length_strategy().prop_flat_map(|len| vec(any::<i8>(), len)),
        scalar in 0.001_f64..1000.0,
    ) {
        let registry = ConverterRegistry::with_defaults().unwrap();
        let unit: Vec<i16> = convert(&registry, Format::S8, Format::S16, &bytes, 1.0);
        let scaled: Vec<i16> = convert(&registry, Format::S8, Format::S16, &bytes, scalar);
        prop_assert_eq!(&unit, &scaled);

        let back: Vec<i8> = convert(&registry, Format::S16, Format::S8, &unit, scalar);
        prop_assert_eq!(back, bytes);
    }
}
