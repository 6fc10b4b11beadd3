//! AVX2 kernel implementations for x86_64.
//!
//! Each kernel processes full SIMD blocks with unaligned loads/stores and hands
//! the remainder to the scalar reference in `super::scalar`, so results are
//! bit-identical to the scalar path.
//!
//! All functions require runtime AVX2 detection before calling.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::similar_names)]

use std::arch::x86_64::*;

use num_complex::Complex32;

use super::scalar;

// =============================================================================
// Integer <-> integer
// =============================================================================

/// AVX2 `i8 -> i16` (`x << 8`), 16 lanes per iteration.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 (enforced by `#[target_feature]` and runtime detection)
/// - `src.len() == dst.len()` (enforced by public API assert)
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn s8_to_s16_avx2(src: &[i8], dst: &mut [i16]) {
    let simd_len = src.len() / 16;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    // SAFETY: offset + 16 <= len for every block; loads and stores are unaligned.
    for i in 0..simd_len {
        let offset = i * 16;
        let v = _mm_loadu_si128(s.add(offset).cast::<__m128i>());
        let wide = _mm256_slli_epi16::<8>(_mm256_cvtepi8_epi16(v));
        _mm256_storeu_si256(d.add(offset).cast::<__m256i>(), wide);
    }

    let base = simd_len * 16;
    scalar::s8_to_s16(&src[base..], &mut dst[base..]);
}

/// AVX2 `i16 -> i8` (`x >> 8`), 16 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn s16_to_s8_avx2(src: &[i16], dst: &mut [i8]) {
    let simd_len = src.len() / 16;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 16;
        let v = _mm256_loadu_si256(s.add(offset).cast::<__m256i>());
        let high = _mm256_srai_epi16::<8>(v);
        // Values already fit in i8, so the saturating pack is exact.
        let lo = _mm256_castsi256_si128(high);
        let hi = _mm256_extracti128_si256::<1>(high);
        _mm_storeu_si128(d.add(offset).cast::<__m128i>(), _mm_packs_epi16(lo, hi));
    }

    let base = simd_len * 16;
    scalar::s16_to_s8(&src[base..], &mut dst[base..]);
}

// =============================================================================
// Integer -> float
// =============================================================================

/// AVX2 `i8 -> f32` times `scale`, 8 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn s8_to_f32_avx2(src: &[i8], dst: &mut [f32], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);

    for i in 0..simd_len {
        let offset = i * 8;
        let v = _mm_loadl_epi64(s.add(offset).cast::<__m128i>());
        let f = _mm256_cvtepi32_ps(_mm256_cvtepi8_epi32(v));
        _mm256_storeu_ps(d.add(offset), _mm256_mul_ps(f, vscale));
    }

    let base = simd_len * 8;
    scalar::s8_to_f32(&src[base..], &mut dst[base..], scale);
}

/// AVX2 `i16 -> f32` times `scale`, 8 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn s16_to_f32_avx2(src: &[i16], dst: &mut [f32], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);

    for i in 0..simd_len {
        let offset = i * 8;
        let v = _mm_loadu_si128(s.add(offset).cast::<__m128i>());
        let f = _mm256_cvtepi32_ps(_mm256_cvtepi16_epi32(v));
        _mm256_storeu_ps(d.add(offset), _mm256_mul_ps(f, vscale));
    }

    let base = simd_len * 8;
    scalar::s16_to_f32(&src[base..], &mut dst[base..], scale);
}

/// AVX2 `i32 -> f32` times `scale`, 8 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn s32_to_f32_avx2(src: &[i32], dst: &mut [f32], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);

    for i in 0..simd_len {
        let offset = i * 8;
        let v = _mm256_loadu_si256(s.add(offset).cast::<__m256i>());
        let f = _mm256_cvtepi32_ps(v);
        _mm256_storeu_ps(d.add(offset), _mm256_mul_ps(f, vscale));
    }

    let base = simd_len * 8;
    scalar::s32_to_f32(&src[base..], &mut dst[base..], scale);
}

// =============================================================================
// Float -> integer
// =============================================================================

/// Scales 8 lanes, zeroes NaN lanes, clamps to `[lo, hi]` and rounds half-even.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn scale_clamp_round(v: __m256, scale: __m256, lo: __m256, hi: __m256) -> __m256i {
    let scaled = _mm256_mul_ps(v, scale);
    let ordered = _mm256_cmp_ps::<_CMP_ORD_Q>(scaled, scaled);
    let scaled = _mm256_and_ps(scaled, ordered);
    let clamped = _mm256_min_ps(_mm256_max_ps(scaled, lo), hi);
    // Default MXCSR rounding is round-to-nearest-even.
    _mm256_cvtps_epi32(clamped)
}

/// AVX2 `f32 -> i8`, saturating, 8 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f32_to_s8_avx2(src: &[f32], dst: &mut [i8], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);
    let lo = _mm256_set1_ps(-128.0);
    let hi = _mm256_set1_ps(127.0);

    for i in 0..simd_len {
        let offset = i * 8;
        let ints = scale_clamp_round(_mm256_loadu_ps(s.add(offset)), vscale, lo, hi);
        let words = _mm_packs_epi32(
            _mm256_castsi256_si128(ints),
            _mm256_extracti128_si256::<1>(ints),
        );
        let bytes = _mm_packs_epi16(words, words);
        _mm_storel_epi64(d.add(offset).cast::<__m128i>(), bytes);
    }

    let base = simd_len * 8;
    scalar::f32_to_s8(&src[base..], &mut dst[base..], scale);
}

/// AVX2 `f32 -> i16`, saturating, 8 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f32_to_s16_avx2(src: &[f32], dst: &mut [i16], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);
    let lo = _mm256_set1_ps(-32768.0);
    let hi = _mm256_set1_ps(32767.0);

    for i in 0..simd_len {
        let offset = i * 8;
        let ints = scale_clamp_round(_mm256_loadu_ps(s.add(offset)), vscale, lo, hi);
        let words = _mm_packs_epi32(
            _mm256_castsi256_si128(ints),
            _mm256_extracti128_si256::<1>(ints),
        );
        _mm_storeu_si128(d.add(offset).cast::<__m128i>(), words);
    }

    let base = simd_len * 8;
    scalar::f32_to_s16(&src[base..], &mut dst[base..], scale);
}

/// AVX2 `f32 -> i32`, saturating, 8 lanes per iteration.
///
/// `cvtps_epi32` returns `i32::MIN` on overflow in either direction, so lanes
/// at or above 2^31 are patched to `i32::MAX` afterwards.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f32_to_s32_avx2(src: &[f32], dst: &mut [i32], scale: f32) {
    let simd_len = src.len() / 8;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();
    let vscale = _mm256_set1_ps(scale);
    let limit = _mm256_set1_ps(2_147_483_648.0);
    let max = _mm256_set1_epi32(i32::MAX);

    for i in 0..simd_len {
        let offset = i * 8;
        let scaled = _mm256_mul_ps(_mm256_loadu_ps(s.add(offset)), vscale);
        let ordered = _mm256_cmp_ps::<_CMP_ORD_Q>(scaled, scaled);
        let scaled = _mm256_and_ps(scaled, ordered);
        let ints = _mm256_cvtps_epi32(scaled);
        let overflow = _mm256_castps_si256(_mm256_cmp_ps::<_CMP_GE_OQ>(scaled, limit));
        let ints = _mm256_blendv_epi8(ints, max, overflow);
        _mm256_storeu_si256(d.add(offset).cast::<__m256i>(), ints);
    }

    let base = simd_len * 8;
    scalar::f32_to_s32(&src[base..], &mut dst[base..], scale);
}

// =============================================================================
// Float <-> float
// =============================================================================

/// AVX2 `f32 -> f64`, 4 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f32_to_f64_avx2(src: &[f32], dst: &mut [f64]) {
    let simd_len = src.len() / 4;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 4;
        let wide = _mm256_cvtps_pd(_mm_loadu_ps(s.add(offset)));
        _mm256_storeu_pd(d.add(offset), wide);
    }

    let base = simd_len * 4;
    scalar::f32_to_f64(&src[base..], &mut dst[base..]);
}

/// AVX2 `f64 -> f32`, 4 lanes per iteration.
///
/// # Safety
///
/// Same contract as [`s8_to_s16_avx2`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f64_to_f32_avx2(src: &[f64], dst: &mut [f32]) {
    let simd_len = src.len() / 4;
    let s = src.as_ptr();
    let d = dst.as_mut_ptr();

    for i in 0..simd_len {
        let offset = i * 4;
        let narrow = _mm256_cvtpd_ps(_mm256_loadu_pd(s.add(offset)));
        _mm_storeu_ps(d.add(offset), narrow);
    }

    let base = simd_len * 4;
    scalar::f64_to_f32(&src[base..], &mut dst[base..]);
}

// =============================================================================
// Scaling
// =============================================================================

/// Real multiply over `len` floats. `src` and `dst` may be the same pointer.
///
/// # Safety
///
/// Caller must ensure AVX2 support and that both pointers are valid for `len`
/// elements.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn f32_scale_avx2(src: *const f32, dst: *mut f32, len: usize, scale: f32) {
    let vscale = _mm256_set1_ps(scale);
    let mut i = 0;
    while i + 8 <= len {
        let v = _mm256_loadu_ps(src.add(i));
        _mm256_storeu_ps(dst.add(i), _mm256_mul_ps(v, vscale));
        i += 8;
    }
    while i < len {
        *dst.add(i) = *src.add(i) * scale;
        i += 1;
    }
}

/// Complex multiply over `len` interleaved floats (`len` even). `src` and `dst`
/// may be the same pointer.
///
/// Lane layout per 128-bit half: `[re0, im0, re1, im1]`. With `a` the input
/// and `a'` its pair-swapped copy, `addsub(a * k.re, a' * k.im)` yields
/// `re*k.re - im*k.im` in even lanes and `im*k.re + re*k.im` in odd lanes.
///
/// # Safety
///
/// Caller must ensure AVX2 support and that both pointers are valid for `len`
/// elements.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn cf32_scale_avx2(src: *const f32, dst: *mut f32, len: usize, k: Complex32) {
    let kr = _mm256_set1_ps(k.re);
    let ki = _mm256_set1_ps(k.im);
    let mut i = 0;
    while i + 8 <= len {
        let a = _mm256_loadu_ps(src.add(i));
        let swapped = _mm256_permute_ps::<0xB1>(a);
        let out = _mm256_addsub_ps(_mm256_mul_ps(a, kr), _mm256_mul_ps(swapped, ki));
        _mm256_storeu_ps(dst.add(i), out);
        i += 8;
    }
    while i + 2 <= len {
        let re = *src.add(i);
        let im = *src.add(i + 1);
        *dst.add(i) = re * k.re - im * k.im;
        *dst.add(i + 1) = re * k.im + im * k.re;
        i += 2;
    }
}
