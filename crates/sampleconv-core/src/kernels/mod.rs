//! Typed sample conversion kernels with runtime SIMD dispatch.
//!
//! This is the vectorized-math layer the conversion catalog is built on. The
//! catalog only calls the public primitives re-exported here and never
//! reaches into the ISA modules.
//!
//! # Module Structure
//!
//! - `scalar`: Reference implementations, also used for SIMD tails
//! - `x86_avx2`: AVX2 kernels (x86_64 only)
//! - `neon`: ARM NEON kernels (aarch64 only)
//! - `dispatch`: Runtime SIMD level detection and dispatch wiring
//!
//! # Scalar conventions
//!
//! Integer to float primitives (`*_div`) divide by their scalar argument.
//! Float to integer primitives (`*_mul`) and the `*_scale` primitives
//! multiply. Callers that want multiply semantics everywhere must invert the
//! argument of a dividing primitive.
#![allow(clippy::doc_markdown)] // Contains ISA/architecture nomenclature in docs.
#![allow(clippy::missing_panics_doc)] // Dispatch APIs assert equal buffer lengths.

pub mod scalar;

// =============================================================================
// Unsafe Invariants Reference
// =============================================================================
// SAFETY: Shared invariants for SIMD unsafe blocks in this module tree.
// - Condition 1: Pointer arithmetic is derived from slice pointers with loop bounds
//   proving in-range access for each lane width.
// - Condition 2: Target-featured functions are called only after a runtime feature
//   check or on architectures where the feature is guaranteed.
// - Condition 3: All loads and stores use unaligned intrinsics.

#[cfg(target_arch = "x86_64")]
mod x86_avx2;

#[cfg(target_arch = "aarch64")]
mod neon;

mod dispatch;

pub use dispatch::{
    cf32_scale, cf32_scale_inplace, cf32_scale_inplace_with_level, cf32_scale_with_level,
    cf32_to_cs16, cf32_to_cs16_with_level, cs16_to_cf32, cs16_to_cf32_with_level, f32_scale,
    f32_scale_inplace, f32_scale_inplace_with_level, f32_scale_with_level, f32_to_f64,
    f32_to_f64_with_level, f32_to_s16_mul, f32_to_s16_mul_with_level, f32_to_s32_mul,
    f32_to_s32_mul_with_level, f32_to_s8_mul, f32_to_s8_mul_with_level, f64_to_f32,
    f64_to_f32_with_level, s16_to_f32_div, s16_to_f32_div_with_level, s16_to_s8,
    s16_to_s8_with_level, s32_to_f32_div, s32_to_f32_div_with_level, s8_to_f32_div,
    s8_to_f32_div_with_level, s8_to_s16, s8_to_s16_with_level, simd_level, SimdLevel,
};

/// Logs the detected SIMD level once at `info`.
pub fn log_simd_capabilities() {
    let level = simd_level();
    tracing::info!(level = level.name(), "sample conversion kernels ready");
}

#[cfg(test)]
mod kernels_dispatch_tests;
