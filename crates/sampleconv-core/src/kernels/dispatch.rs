//! Runtime SIMD level detection and dispatch wiring.
//!
//! This module provides:
//! - `SimdLevel` enum for representing detected SIMD capability
//! - `simd_level()` for cached runtime detection
//! - All public kernel entry points, each with a `_with_level` variant that
//!   forces a specific path (falling back to scalar when it is unavailable)
//!
//! Kernel scalar conventions follow the kernel names: `*_div` kernels divide
//! by their scalar argument, `*_mul` and `*_scale` kernels multiply by it.

use std::sync::OnceLock;

use num_complex::Complex32;

use super::scalar;

/// SIMD capability level detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdLevel {
    /// AVX2 available (x86_64 only).
    Avx2,
    /// NEON available (aarch64, always true).
    Neon,
    /// Scalar fallback.
    Scalar,
}

impl SimdLevel {
    /// Human-readable name, printed by the harnesses.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SimdLevel::Avx2 => "AVX2 (256-bit)",
            SimdLevel::Neon => "NEON (128-bit)",
            SimdLevel::Scalar => "Scalar (no SIMD)",
        }
    }

    /// Returns `true` if the current CPU can execute this level.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            SimdLevel::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2 => is_x86_feature_detected!("avx2"),
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Returns `self` if available, otherwise [`SimdLevel::Scalar`].
    #[must_use]
    pub fn or_scalar(self) -> SimdLevel {
        if self.is_available() {
            self
        } else {
            SimdLevel::Scalar
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cached SIMD level - detected once at first use.
static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detects the best available SIMD level for the current CPU.
fn detect_simd_level() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        return SimdLevel::Neon;
    }

    #[allow(unreachable_code)]
    SimdLevel::Scalar
}

/// Returns the cached SIMD capability level.
#[inline]
#[must_use]
pub fn simd_level() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(|| {
        let level = detect_simd_level();
        tracing::debug!(level = level.name(), "conversion kernels selected");
        level
    })
}

fn check_lengths(kernel: &str, src: usize, dst: usize) {
    assert_eq!(
        src, dst,
        "{kernel}: source and destination lengths must match ({src} vs {dst})"
    );
}

fn check_interleaved(kernel: &str, len: usize) {
    assert!(
        len % 2 == 0,
        "{kernel}: interleaved complex buffer has odd length {len}"
    );
}

// =============================================================================
// Integer <-> integer (scalar ignored)
// =============================================================================

/// `i8 -> i16`, scaled to the full 16-bit range (`x << 8`).
#[inline]
pub fn s8_to_s16(src: &[i8], dst: &mut [i16]) {
    s8_to_s16_with_level(simd_level(), src, dst);
}

/// [`s8_to_s16`] on a forced SIMD level.
pub fn s8_to_s16_with_level(level: SimdLevel, src: &[i8], dst: &mut [i16]) {
    check_lengths("s8_to_s16", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::s8_to_s16_avx2(src, dst) },
        _ => scalar::s8_to_s16(src, dst),
    }
}

/// `i16 -> i8`, keeping the high byte (`x >> 8`).
#[inline]
pub fn s16_to_s8(src: &[i16], dst: &mut [i8]) {
    s16_to_s8_with_level(simd_level(), src, dst);
}

/// [`s16_to_s8`] on a forced SIMD level.
pub fn s16_to_s8_with_level(level: SimdLevel, src: &[i16], dst: &mut [i8]) {
    check_lengths("s16_to_s8", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::s16_to_s8_avx2(src, dst) },
        _ => scalar::s16_to_s8(src, dst),
    }
}

// =============================================================================
// Integer -> float (kernels divide by their scalar)
// =============================================================================

/// `dst[i] = src[i] / divisor`.
#[inline]
pub fn s8_to_f32_div(src: &[i8], dst: &mut [f32], divisor: f32) {
    s8_to_f32_div_with_level(simd_level(), src, dst, divisor);
}

/// [`s8_to_f32_div`] on a forced SIMD level.
pub fn s8_to_f32_div_with_level(level: SimdLevel, src: &[i8], dst: &mut [f32], divisor: f32) {
    check_lengths("s8_to_f32_div", src.len(), dst.len());
    let scale = 1.0 / divisor;
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::s8_to_f32_avx2(src, dst, scale) },
        _ => scalar::s8_to_f32(src, dst, scale),
    }
}

/// `dst[i] = src[i] / divisor`.
#[inline]
pub fn s16_to_f32_div(src: &[i16], dst: &mut [f32], divisor: f32) {
    s16_to_f32_div_with_level(simd_level(), src, dst, divisor);
}

/// [`s16_to_f32_div`] on a forced SIMD level.
pub fn s16_to_f32_div_with_level(level: SimdLevel, src: &[i16], dst: &mut [f32], divisor: f32) {
    check_lengths("s16_to_f32_div", src.len(), dst.len());
    let scale = 1.0 / divisor;
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::s16_to_f32_avx2(src, dst, scale) },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => super::neon::s16_to_f32_neon(src, dst, scale),
        _ => scalar::s16_to_f32(src, dst, scale),
    }
}

/// `dst[i] = src[i] / divisor`.
#[inline]
pub fn s32_to_f32_div(src: &[i32], dst: &mut [f32], divisor: f32) {
    s32_to_f32_div_with_level(simd_level(), src, dst, divisor);
}

/// [`s32_to_f32_div`] on a forced SIMD level.
pub fn s32_to_f32_div_with_level(level: SimdLevel, src: &[i32], dst: &mut [f32], divisor: f32) {
    check_lengths("s32_to_f32_div", src.len(), dst.len());
    let scale = 1.0 / divisor;
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::s32_to_f32_avx2(src, dst, scale) },
        _ => scalar::s32_to_f32(src, dst, scale),
    }
}

// =============================================================================
// Float -> integer (kernels multiply by their scalar)
// =============================================================================

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s8_mul(src: &[f32], dst: &mut [i8], scale: f32) {
    f32_to_s8_mul_with_level(simd_level(), src, dst, scale);
}

/// [`f32_to_s8_mul`] on a forced SIMD level.
pub fn f32_to_s8_mul_with_level(level: SimdLevel, src: &[f32], dst: &mut [i8], scale: f32) {
    check_lengths("f32_to_s8_mul", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::f32_to_s8_avx2(src, dst, scale) },
        _ => scalar::f32_to_s8(src, dst, scale),
    }
}

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s16_mul(src: &[f32], dst: &mut [i16], scale: f32) {
    f32_to_s16_mul_with_level(simd_level(), src, dst, scale);
}

/// [`f32_to_s16_mul`] on a forced SIMD level.
pub fn f32_to_s16_mul_with_level(level: SimdLevel, src: &[f32], dst: &mut [i16], scale: f32) {
    check_lengths("f32_to_s16_mul", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::f32_to_s16_avx2(src, dst, scale) },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => super::neon::f32_to_s16_neon(src, dst, scale),
        _ => scalar::f32_to_s16(src, dst, scale),
    }
}

/// `dst[i] = saturate(round(src[i] * scale))`.
#[inline]
pub fn f32_to_s32_mul(src: &[f32], dst: &mut [i32], scale: f32) {
    f32_to_s32_mul_with_level(simd_level(), src, dst, scale);
}

/// [`f32_to_s32_mul`] on a forced SIMD level.
pub fn f32_to_s32_mul_with_level(level: SimdLevel, src: &[f32], dst: &mut [i32], scale: f32) {
    check_lengths("f32_to_s32_mul", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::f32_to_s32_avx2(src, dst, scale) },
        _ => scalar::f32_to_s32(src, dst, scale),
    }
}

// =============================================================================
// Float <-> float (scalar ignored)
// =============================================================================

/// Exact `f32 -> f64` widening.
#[inline]
pub fn f32_to_f64(src: &[f32], dst: &mut [f64]) {
    f32_to_f64_with_level(simd_level(), src, dst);
}

/// [`f32_to_f64`] on a forced SIMD level.
pub fn f32_to_f64_with_level(level: SimdLevel, src: &[f32], dst: &mut [f64]) {
    check_lengths("f32_to_f64", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::f32_to_f64_avx2(src, dst) },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => super::neon::f32_to_f64_neon(src, dst),
        _ => scalar::f32_to_f64(src, dst),
    }
}

/// Round-to-nearest `f64 -> f32` narrowing.
#[inline]
pub fn f64_to_f32(src: &[f64], dst: &mut [f32]) {
    f64_to_f32_with_level(simd_level(), src, dst);
}

/// [`f64_to_f32`] on a forced SIMD level.
pub fn f64_to_f32_with_level(level: SimdLevel, src: &[f64], dst: &mut [f32]) {
    check_lengths("f64_to_f32", src.len(), dst.len());
    match level.or_scalar() {
        // SAFETY: AVX2 availability was checked by `or_scalar`.
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => unsafe { super::x86_avx2::f64_to_f32_avx2(src, dst) },
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => super::neon::f64_to_f32_neon(src, dst),
        _ => scalar::f64_to_f32(src, dst),
    }
}

// =============================================================================
// Scaling
// =============================================================================

/// Routes a (possibly in-place) real multiply to the best kernel.
///
/// # Safety
///
/// `src` and `dst` must be valid for `len` elements; they may be equal but must
/// not otherwise overlap.
unsafe fn f32_scale_raw(level: SimdLevel, src: *const f32, dst: *mut f32, len: usize, scale: f32) {
    match level.or_scalar() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => super::x86_avx2::f32_scale_avx2(src, dst, len, scale),
        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => super::neon::f32_scale_neon(src, dst, len, scale),
        _ => {
            for i in 0..len {
                *dst.add(i) = *src.add(i) * scale;
            }
        }
    }
}

/// `dst[i] = src[i] * scale`.
#[inline]
pub fn f32_scale(src: &[f32], dst: &mut [f32], scale: f32) {
    f32_scale_with_level(simd_level(), src, dst, scale);
}

/// [`f32_scale`] on a forced SIMD level.
pub fn f32_scale_with_level(level: SimdLevel, src: &[f32], dst: &mut [f32], scale: f32) {
    check_lengths("f32_scale", src.len(), dst.len());
    // SAFETY: both slices are valid for `src.len()` elements and cannot overlap.
    unsafe { f32_scale_raw(level, src.as_ptr(), dst.as_mut_ptr(), src.len(), scale) }
}

/// `buf[i] *= scale`.
#[inline]
pub fn f32_scale_inplace(buf: &mut [f32], scale: f32) {
    f32_scale_inplace_with_level(simd_level(), buf, scale);
}

/// [`f32_scale_inplace`] on a forced SIMD level.
pub fn f32_scale_inplace_with_level(level: SimdLevel, buf: &mut [f32], scale: f32) {
    let len = buf.len();
    let ptr = buf.as_mut_ptr();
    // SAFETY: the slice is valid for `len` elements; each lane is read before it is written.
    unsafe { f32_scale_raw(level, ptr, ptr, len, scale) }
}

/// Routes a (possibly in-place) complex multiply to the best kernel.
///
/// # Safety
///
/// Same contract as [`f32_scale_raw`]; `len` must be even.
unsafe fn cf32_scale_raw(level: SimdLevel, src: *const f32, dst: *mut f32, len: usize, k: Complex32) {
    match level.or_scalar() {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => super::x86_avx2::cf32_scale_avx2(src, dst, len, k),
        _ => {
            let mut i = 0;
            while i + 2 <= len {
                let re = *src.add(i);
                let im = *src.add(i + 1);
                *dst.add(i) = re * k.re - im * k.im;
                *dst.add(i + 1) = re * k.im + im * k.re;
                i += 2;
            }
        }
    }
}

/// Complex multiply of interleaved `(re, im)` pairs: `dst = src * k`.
#[inline]
pub fn cf32_scale(src: &[f32], dst: &mut [f32], k: Complex32) {
    cf32_scale_with_level(simd_level(), src, dst, k);
}

/// [`cf32_scale`] on a forced SIMD level.
pub fn cf32_scale_with_level(level: SimdLevel, src: &[f32], dst: &mut [f32], k: Complex32) {
    check_lengths("cf32_scale", src.len(), dst.len());
    check_interleaved("cf32_scale", src.len());
    // SAFETY: both slices are valid for `src.len()` elements and cannot overlap.
    unsafe { cf32_scale_raw(level, src.as_ptr(), dst.as_mut_ptr(), src.len(), k) }
}

/// In-place complex multiply: `buf *= k`.
#[inline]
pub fn cf32_scale_inplace(buf: &mut [f32], k: Complex32) {
    cf32_scale_inplace_with_level(simd_level(), buf, k);
}

/// [`cf32_scale_inplace`] on a forced SIMD level.
pub fn cf32_scale_inplace_with_level(level: SimdLevel, buf: &mut [f32], k: Complex32) {
    check_interleaved("cf32_scale_inplace", buf.len());
    let len = buf.len();
    let ptr = buf.as_mut_ptr();
    // SAFETY: the slice is valid for `len` elements; each pair is read before it is written.
    unsafe { cf32_scale_raw(level, ptr, ptr, len, k) }
}

// =============================================================================
// Complex 16-bit <-> complex f32 (no scalar)
// =============================================================================

/// Interleaved complex `i16 -> f32` without scaling.
#[inline]
pub fn cs16_to_cf32(src: &[i16], dst: &mut [f32]) {
    cs16_to_cf32_with_level(simd_level(), src, dst);
}

/// [`cs16_to_cf32`] on a forced SIMD level.
pub fn cs16_to_cf32_with_level(level: SimdLevel, src: &[i16], dst: &mut [f32]) {
    check_interleaved("cs16_to_cf32", src.len());
    s16_to_f32_div_with_level(level, src, dst, 1.0);
}

/// Interleaved complex `f32 -> i16`, saturating round-half-even, without scaling.
#[inline]
pub fn cf32_to_cs16(src: &[f32], dst: &mut [i16]) {
    cf32_to_cs16_with_level(simd_level(), src, dst);
}

/// [`cf32_to_cs16`] on a forced SIMD level.
pub fn cf32_to_cs16_with_level(level: SimdLevel, src: &[f32], dst: &mut [i16]) {
    check_interleaved("cf32_to_cs16", src.len());
    f32_to_s16_mul_with_level(level, src, dst, 1.0);
}
