use std::collections::BTreeSet;

use crate::buffer::AlignedBuffer;
use crate::catalog::*;
use crate::error::Error;
use crate::format::Format;
use crate::registry::{ConverterRegistry, FunctionPriority, ScalarRule};

fn convert<S: bytemuck::Pod, D: bytemuck::Pod + Default + Clone>(
    source: Format,
    target: Format,
    src: &[S],
    scalar: f64,
) -> Vec<D> {
    let entry = find(source, target).expect("pair is in the catalog");
    let count = src.len() / source.components();
    let mut dst = vec![D::default(); count * target.components()];
    entry
        .convert(
            bytemuck::cast_slice(src),
            bytemuck::cast_slice_mut(&mut dst),
            count,
            scalar,
        )
        .unwrap();
    dst
}

// ============================================================================
// Table shape
// ============================================================================

#[test]
fn test_catalog_has_34_unique_pairs() {
    let pairs: BTreeSet<_> = entries().iter().map(|e| (e.source, e.target)).collect();
    assert_eq!(entries().len(), 34);
    assert_eq!(pairs.len(), 34);
}

#[test]
fn test_catalog_pairs_keep_complexity_and_skip_unsigned() {
    for e in entries() {
        assert_eq!(e.source.is_complex(), e.target.is_complex(), "{e:?}");
        for format in [e.source, e.target] {
            assert!(
                !matches!(format.component(), Format::U8 | Format::U16 | Format::U32),
                "{e:?}"
            );
        }
    }
}

#[test]
fn test_real_and_complex_halves_mirror_each_other() {
    for e in entries().iter().filter(|e| !e.source.is_complex()) {
        assert!(
            find(e.source.to_complex(), e.target.to_complex()).is_some(),
            "missing complex counterpart of {:?}",
            (e.source, e.target)
        );
    }
}

#[test]
fn test_only_integer_shift_pairs_ignore_the_scalar() {
    for e in entries() {
        let shift_pair = matches!(
            (e.source.component(), e.target.component()),
            (Format::S8, Format::S16) | (Format::S16, Format::S8)
        );
        assert_eq!(e.scalar == ScalarRule::Ignored, shift_pair, "{e:?}");
    }
}

#[test]
fn test_complex_multiply_rows() {
    let complex: Vec<_> = entries()
        .iter()
        .filter(|e| e.scalar == ScalarRule::ComplexMultiply)
        .map(|e| (e.source, e.target))
        .collect();
    assert_eq!(
        complex,
        vec![
            (Format::CS16, Format::CF32),
            (Format::CF32, Format::CS16),
            (Format::CF32, Format::CF32)
        ]
    );
}

#[test]
fn test_same_format_rows_apply_the_scalar() {
    for e in entries().iter().filter(|e| e.source == e.target) {
        assert!(e.scalar.applies_scalar(), "{e:?}");
    }
}

#[test]
fn test_chained_routes_consume_the_scalar_once() {
    for e in entries() {
        if let Route::ViaF32(first, second) = e.route {
            let consumers = [first, second]
                .iter()
                .filter(|k| k.scalar_convention() != KernelScalar::None)
                .count();
            assert_eq!(consumers, 1, "{e:?}");
        }
    }
}

// ============================================================================
// Scalar conventions
// ============================================================================

#[test]
fn test_kernel_argument_inverts_dividing_kernels() {
    assert_eq!(kernel_argument(Kernel::S16ToF32, 1.0 / 32768.0), 32768.0);
    assert_eq!(kernel_argument(Kernel::S8ToF32, 0.5), 2.0);
    assert_eq!(kernel_argument(Kernel::F32ToS16, 32768.0), 32768.0);
    assert_eq!(kernel_argument(Kernel::S8ToS16, 123.0), 1.0);
}

#[test]
fn test_s16_to_s8_ignores_scalar() {
    let src = [0x1234i16, -0x0100, 0x7fff, -0x8000];
    let unit: Vec<i8> = convert(Format::S16, Format::S8, &src, 1.0);
    let scaled: Vec<i8> = convert(Format::S16, Format::S8, &src, 1000.0);
    assert_eq!(unit, vec![0x12, -1, 127, -128]);
    assert_eq!(unit, scaled);
}

#[test]
fn test_s8_to_s16_ignores_scalar() {
    let src = [1i8, -1, 127];
    let unit: Vec<i16> = convert(Format::S8, Format::S16, &src, 1.0);
    let scaled: Vec<i16> = convert(Format::S8, Format::S16, &src, 0.001);
    assert_eq!(unit, vec![256, -256, 32512]);
    assert_eq!(unit, scaled);
}

#[test]
fn test_int_to_float_multiplies_by_scalar() {
    let out: Vec<f32> = convert(Format::S16, Format::F32, &[16384i16, -32768], 1.0 / 32768.0);
    assert_eq!(out, vec![0.5, -1.0]);

    let out: Vec<f32> = convert(Format::S8, Format::F32, &[64i8], 1.0 / 128.0);
    assert_eq!(out, vec![0.5]);

    let out: Vec<f32> = convert(Format::S32, Format::F32, &[1i32 << 30], 1.0 / 2_147_483_648.0);
    assert_eq!(out, vec![0.5]);
}

#[test]
fn test_float_to_int_multiplies_by_scalar() {
    let out: Vec<i16> = convert(Format::F32, Format::S16, &[0.5f32, -1.0, 2.0], 32768.0);
    assert_eq!(out, vec![16384, -32768, 32767]);

    let out: Vec<i8> = convert(Format::F32, Format::S8, &[0.25f32], 128.0);
    assert_eq!(out, vec![32]);
}

#[test]
fn test_float_to_float_scales() {
    let out: Vec<f32> = convert(Format::F32, Format::F32, &[1.0f32, -2.0], 10.0);
    assert_eq!(out, vec![10.0, -20.0]);
}

// ============================================================================
// Complex pairs
// ============================================================================

#[test]
fn test_cf32_to_cf32_real_scalar_scales_both_components() {
    let src = [1.0f32, 2.0, -3.0, 4.0];
    let out: Vec<f32> = convert(Format::CF32, Format::CF32, &src, 2.0);
    assert_eq!(out, vec![2.0, 4.0, -6.0, 8.0]);
}

#[test]
fn test_cs16_cf32_round_trip_with_scalars() {
    let src = [16384i16, -16384, 32767, 0];
    let floats: Vec<f32> = convert(Format::CS16, Format::CF32, &src, 1.0 / 32768.0);
    assert_eq!(floats[0], 0.5);
    assert_eq!(floats[1], -0.5);

    let back: Vec<i16> = convert(Format::CF32, Format::CS16, &floats, 32768.0);
    assert_eq!(back, src.to_vec());
}

#[test]
fn test_cs16_cf32_unit_scalar_is_plain_conversion() {
    let src = [3i16, -7];
    let floats: Vec<f32> = convert(Format::CS16, Format::CF32, &src, 1.0);
    assert_eq!(floats, vec![3.0, -7.0]);
}

#[test]
fn test_complex_pairs_convert_both_components() {
    let out: Vec<f32> = convert(Format::CS8, Format::CF32, &[64i8, -64], 1.0 / 128.0);
    assert_eq!(out, vec![0.5, -0.5]);
}

// ============================================================================
// Float width and chained routes
// ============================================================================

#[test]
fn test_f32_f64_unit_scalar_is_exact() {
    let src = [0.1f32, -3.75, 1.0e-20];
    let wide: Vec<f64> = convert(Format::F32, Format::F64, &src, 1.0);
    assert_eq!(wide, src.iter().map(|&x| f64::from(x)).collect::<Vec<_>>());

    let narrow: Vec<f32> = convert(Format::F64, Format::F32, &wide, 1.0);
    assert_eq!(narrow, src.to_vec());
}

#[test]
fn test_f32_f64_scaled() {
    let wide: Vec<f64> = convert(Format::F32, Format::F64, &[1.5f32], 2.0);
    assert_eq!(wide, vec![3.0]);

    let narrow: Vec<f32> = convert(Format::F64, Format::F32, &[3.0f64], 0.5);
    assert_eq!(narrow, vec![1.5]);
}

#[test]
fn test_chained_integer_to_f64() {
    let out: Vec<f64> = convert(Format::S16, Format::F64, &[8192i16, -32768], 1.0 / 32768.0);
    assert_eq!(out, vec![0.25, -1.0]);

    let out: Vec<i32> = convert(Format::F64, Format::S32, &[0.5f64], 2_147_483_648.0);
    assert_eq!(out, vec![1 << 30]);
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
fn test_zero_count_is_rejected() {
    let entry = find(Format::S16, Format::F32).unwrap();
    let err = entry.convert(&[0; 8], &mut [0; 16], 0, 1.0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_short_destination_is_rejected_without_writing() {
    let entry = find(Format::S16, Format::F32).unwrap();
    let src = [1i16; 4];
    let mut dst = vec![0xAAu8; 15];
    let err = entry
        .convert(bytemuck::cast_slice(&src), &mut dst, 4, 1.0)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(dst.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_misaligned_source_converts() {
    let samples = [0.5f32, -0.5, 0.25, 0.75];
    let mut packet = AlignedBuffer::new(1 + 16).unwrap();
    packet.as_mut_slice()[1..].copy_from_slice(bytemuck::cast_slice(&samples));

    let entry = find(Format::F32, Format::S16).unwrap();
    let mut dst = [0i16; 4];
    entry
        .convert(&packet.as_slice()[1..], bytemuck::cast_slice_mut(&mut dst), 4, 32768.0)
        .unwrap();
    assert_eq!(dst, [16384, -16384, 8192, 24576]);
}

#[test]
fn test_packet_payload_after_header_byte_converts() {
    let samples = [16384i16, -16384, 3, -7];
    let mut packet = AlignedBuffer::new(1 + 8).unwrap();
    packet.as_mut_slice()[0] = 0x5a;
    packet.as_mut_slice()[1..].copy_from_slice(bytemuck::cast_slice(&samples));

    let entry = find(Format::CS16, Format::CF32).unwrap();
    let mut dst = [0.0f32; 4];
    entry
        .convert(
            &packet.as_slice()[1..],
            bytemuck::cast_slice_mut(&mut dst),
            2,
            1.0 / 32768.0,
        )
        .unwrap();
    assert_eq!(dst, [0.5, -0.5, 3.0 / 32768.0, -7.0 / 32768.0]);
}

#[test]
fn test_misaligned_destination_is_written_in_place() {
    let src = [3i16, -7, 100, -100];
    let mut out = AlignedBuffer::new(1 + 16 + 1).unwrap();
    out.as_mut_slice().fill(0xAA);

    let entry = find(Format::CS16, Format::CF32).unwrap();
    entry
        .convert(bytemuck::cast_slice(&src), &mut out.as_mut_slice()[1..17], 2, 1.0)
        .unwrap();

    let mut floats = [0.0f32; 4];
    bytemuck::cast_slice_mut(&mut floats).copy_from_slice(&out.as_slice()[1..17]);
    assert_eq!(floats, [3.0, -7.0, 100.0, -100.0]);
    assert_eq!(out.as_slice()[0], 0xAA);
    assert_eq!(out.as_slice()[17], 0xAA);
}

#[test]
fn test_misaligned_via_f32_route_converts() {
    let src = [64i8, -64, 127, -128];
    let mut packet = AlignedBuffer::new(1 + 4 + 1 + 32).unwrap();
    packet.as_mut_slice()[1..5].copy_from_slice(bytemuck::cast_slice(&src));

    let entry = find(Format::S8, Format::F64).unwrap();
    let (input, output) = packet.as_mut_slice().split_at_mut(5);
    entry.convert(&input[1..], &mut output[1..], 4, 1.0).unwrap();

    let mut wide = [0.0f64; 4];
    bytemuck::cast_slice_mut(&mut wide).copy_from_slice(&output[1..]);
    assert_eq!(wide, [64.0, -64.0, 127.0, -128.0]);
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_vectorized_fills_registry() {
    let mut registry = ConverterRegistry::new();
    let count = register_vectorized(&mut registry).unwrap();
    assert_eq!(count, 34);
    assert_eq!(registry.len(), 34);
    for e in entries() {
        let converter = registry
            .get_function(e.source, e.target, FunctionPriority::Vectorized)
            .unwrap();
        assert_eq!(converter.scalar_rule(), e.scalar);
    }
}
