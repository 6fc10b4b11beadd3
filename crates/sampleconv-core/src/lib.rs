//! # sampleconv core
//!
//! SIMD-accelerated sample-format conversion for software-defined radio
//! streams, organised as a tiered converter registry.
//!
//! ## Features
//!
//! - **Format catalog**: the host's 16 sample formats with byte sizes
//! - **Tiered registry**: `(source, target, priority)` lookup with
//!   best-available resolution (VECTORIZED before GENERIC)
//! - **Vectorized catalog**: 34 pairs built on AVX2 / NEON kernels with
//!   runtime CPU detection and a bit-identical scalar fallback
//! - **Harnesses**: benchmark (median / MAD timings) and loopback
//!   correctness checks
//!
//! ## Quick Start
//!
//! ```rust
//! use sampleconv_core::{ConverterRegistry, Format, FunctionPriority};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ConverterRegistry::with_defaults()?;
//!     let to_float = registry.get_function(Format::S16, Format::F32, FunctionPriority::Vectorized)?;
//!
//!     let src: Vec<i16> = vec![16384, -32768];
//!     let mut dst = vec![0.0f32; 2];
//!     to_float.convert(
//!         bytemuck::cast_slice(&src),
//!         bytemuck::cast_slice_mut(&mut dst),
//!         2,
//!         1.0 / 32768.0,
//!     )?;
//!     assert_eq!(dst, vec![0.5, -1.0]);
//!     # Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::float_cmp,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::manual_assert
    )
)]

pub mod bench;
pub mod buffer;
pub mod catalog;
#[cfg(test)]
mod catalog_tests;
pub mod check;
pub mod config;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod format;
pub mod generic;
pub mod kernels;
pub mod registry;
pub mod stats;

pub use bench::{BenchConfig, BenchMode, BenchReport};
pub use buffer::AlignedBuffer;
pub use check::{CheckConfig, LoopbackCase, LoopbackReport, SmokeReport, ValueClass};
pub use config::SampleconvConfig;
pub use error::{Error, Result};
pub use format::{format_to_size, Format};
pub use kernels::{log_simd_capabilities, simd_level, SimdLevel};
pub use registry::{Converter, ConverterRegistry, FunctionPriority, ScalarRule};
pub use stats::TimingStats;
