//! ARM NEON kernel implementations for aarch64.
//!
//! Covers the hottest conversions (16-bit integer <-> f32, f32 <-> f64 and
//! real scaling). Other kernels use the scalar reference on aarch64.
//!
//! NEON is always available on aarch64, so no runtime detection is needed.

#![allow(clippy::wildcard_imports)]

use std::arch::aarch64::*;

use super::scalar;

/// NEON `i16 -> f32` times `scale`, 4 lanes per iteration.
#[inline]
pub(crate) fn s16_to_f32_neon(src: &[i16], dst: &mut [f32], scale: f32) {
    let simd_len = src.len() / 4;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 4;
        // SAFETY: offset + 4 <= len; vld1/vst1 handle unaligned access on ARM64.
        unsafe {
            let wide = vmovl_s16(vld1_s16(s.add(offset)));
            let f = vmulq_f32(vcvtq_f32_s32(wide), vdupq_n_f32(scale));
            vst1q_f32(d.add(offset), f);
        }
    }

    let base = simd_len * 4;
    scalar::s16_to_f32(&src[base..], &mut dst[base..], scale);
}

/// NEON `f32 -> i16`, saturating round-half-even, 4 lanes per iteration.
///
/// `vcvtnq_s32_f32` rounds to nearest-even, saturates and maps NaN to 0;
/// `vqmovn_s32` then saturates into the 16-bit range.
#[inline]
pub(crate) fn f32_to_s16_neon(src: &[f32], dst: &mut [i16], scale: f32) {
    let simd_len = src.len() / 4;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 4;
        // SAFETY: offset + 4 <= len; vld1/vst1 handle unaligned access on ARM64.
        unsafe {
            let scaled = vmulq_f32(vld1q_f32(s.add(offset)), vdupq_n_f32(scale));
            let words = vqmovn_s32(vcvtnq_s32_f32(scaled));
            vst1_s16(d.add(offset), words);
        }
    }

    let base = simd_len * 4;
    scalar::f32_to_s16(&src[base..], &mut dst[base..], scale);
}

/// NEON `f32 -> f64`, 2 lanes per iteration.
#[inline]
pub(crate) fn f32_to_f64_neon(src: &[f32], dst: &mut [f64]) {
    let simd_len = src.len() / 2;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 2;
        // SAFETY: offset + 2 <= len.
        unsafe {
            vst1q_f64(d.add(offset), vcvt_f64_f32(vld1_f32(s.add(offset))));
        }
    }

    let base = simd_len * 2;
    scalar::f32_to_f64(&src[base..], &mut dst[base..]);
}

/// NEON `f64 -> f32`, 2 lanes per iteration.
#[inline]
pub(crate) fn f64_to_f32_neon(src: &[f64], dst: &mut [f32]) {
    let simd_len = src.len() / 2;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 2;
        // SAFETY: offset + 2 <= len.
        unsafe {
            vst1_f32(d.add(offset), vcvt_f32_f64(vld1q_f64(s.add(offset))));
        }
    }

    let base = simd_len * 2;
    scalar::f64_to_f32(&src[base..], &mut dst[base..]);
}

/// NEON real multiply over `len` floats. `src` and `dst` may be the same pointer.
///
/// # Safety
///
/// Both pointers must be valid for `len` elements.
#[inline]
pub(crate) unsafe fn f32_scale_neon(src: *const f32, dst: *mut f32, len: usize, scale: f32) {
    let mut i = 0;
    while i + 4 <= len {
        let v = vld1q_f32(src.add(i));
        vst1q_f32(dst.add(i), vmulq_n_f32(v, scale));
        i += 4;
    }
    while i < len {
        *dst.add(i) = *src.add(i) * scale;
        i += 1;
    }
}
