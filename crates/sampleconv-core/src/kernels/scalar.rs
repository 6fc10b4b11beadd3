//! Scalar reference implementations of the conversion kernels.
//!
//! These functions serve as:
//! - Fallback on platforms without SIMD support
//! - Reference implementations for testing SIMD correctness
//! - Tail-loop handlers for SIMD remainder processing
//!
//! Every function here takes its scalar already in *multiply* form. The
//! dispatch layer turns a dividing kernel's argument into a multiplier before
//! calling in, so SIMD and scalar paths perform the exact same operations.

// Narrowing casts below are preceded by an explicit clamp or shift that
// guarantees the value fits the destination type.
#![allow(clippy::cast_possible_truncation)]

use num_complex::Complex32;

/// Sign-extends and scales to the full 16-bit range (`x << 8`).
#[inline]
pub fn s8_to_s16(src: &[i8], dst: &mut [i16]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = i16::from(s) << 8;
    }
}

/// Keeps the high byte of each sample (`x >> 8`, arithmetic).
#[inline]
pub fn s16_to_s8(src: &[i16], dst: &mut [i8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (s >> 8) as i8;
    }
}

/// `dst[i] = src[i] * scale`.
#[inline]
pub fn s8_to_f32(src: &[i8], dst: &mut [f32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f32::from(s) * scale;
    }
}

/// `dst[i] = src[i] * scale`.
#[inline]
pub fn s16_to_f32(src: &[i16], dst: &mut [f32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f32::from(s) * scale;
    }
}

/// `dst[i] = src[i] * scale`, with `src[i]` rounded to the nearest f32.
#[inline]
#[allow(clippy::cast_precision_loss)] // i32 -> f32 rounding is the documented behaviour.
pub fn s32_to_f32(src: &[i32], dst: &mut [f32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s as f32 * scale;
    }
}

/// Saturating round-half-even of `x` into `i8`. NaN maps to 0.
#[inline]
#[must_use]
pub fn saturate_i8(x: f32) -> i8 {
    x.round_ties_even().clamp(-128.0, 127.0) as i8
}

/// Saturating round-half-even of `x` into `i16`. NaN maps to 0.
#[inline]
#[must_use]
pub fn saturate_i16(x: f32) -> i16 {
    x.round_ties_even().clamp(-32768.0, 32767.0) as i16
}

/// Saturating round-half-even of `x` into `i32`. NaN maps to 0.
///
/// `as` already saturates for f32 -> i32; no clamp is needed (and
/// `i32::MAX` is not representable as f32 anyway).
#[inline]
#[must_use]
pub fn saturate_i32(x: f32) -> i32 {
    x.round_ties_even() as i32
}

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s8(src: &[f32], dst: &mut [i8], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = saturate_i8(s * scale);
    }
}

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s16(src: &[f32], dst: &mut [i16], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = saturate_i16(s * scale);
    }
}

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s32(src: &[f32], dst: &mut [i32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = saturate_i32(s * scale);
    }
}

/// Exact widening.
#[inline]
pub fn f32_to_f64(src: &[f32], dst: &mut [f64]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f64::from(s);
    }
}

/// Round-to-nearest narrowing.
#[inline]
pub fn f64_to_f32(src: &[f64], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s as f32;
    }
}

/// `dst[i] = src[i] * scale`.
#[inline]
pub fn f32_scale(src: &[f32], dst: &mut [f32], scale: f32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s * scale;
    }
}

/// `buf[i] *= scale`.
#[inline]
pub fn f32_scale_inplace(buf: &mut [f32], scale: f32) {
    for x in buf.iter_mut() {
        *x *= scale;
    }
}

/// Complex multiply of interleaved `(re, im)` pairs by `k`.
#[inline]
pub fn cf32_scale(src: &[f32], dst: &mut [f32], k: Complex32) {
    for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let (re, im) = (s[0], s[1]);
        d[0] = re * k.re - im * k.im;
        d[1] = re * k.im + im * k.re;
    }
}

/// In-place complex multiply of interleaved `(re, im)` pairs by `k`.
#[inline]
pub fn cf32_scale_inplace(buf: &mut [f32], k: Complex32) {
    for pair in buf.chunks_exact_mut(2) {
        let (re, im) = (pair[0], pair[1]);
        pair[0] = re * k.re - im * k.im;
        pair[1] = re * k.im + im * k.re;
    }
}
