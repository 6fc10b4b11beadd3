//! Benchmark harness: times registered converters per tier.
//!
//! Every iteration converts a fresh aligned buffer of random bit patterns
//! with one timed call. The output buffer is allocated once per pair and
//! reused. Timings are summarised as median and MAD in microseconds.

use std::fmt;
use std::time::Instant;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::buffer::AlignedBuffer;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::kernels::{simd_level, SimdLevel};
use crate::registry::{ConverterRegistry, FunctionPriority};
use crate::stats::TimingStats;

/// Benchmark parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Elements per converter call.
    pub num_elements: usize,
    /// Timed calls per tier.
    pub num_iterations: usize,
    /// Scalar used for pairs of different element size.
    pub scalar_ratio: f64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_elements: 16384,
            num_iterations: 10000,
            scalar_ratio: 10.0,
        }
    }
}

impl BenchConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for a zero size or iteration count, or a scalar
    /// ratio that is not finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.num_elements == 0 {
            return Err(Error::Config("bench.num_elements must be positive".into()));
        }
        if self.num_iterations == 0 {
            return Err(Error::Config("bench.num_iterations must be positive".into()));
        }
        if !(self.scalar_ratio.is_finite() && self.scalar_ratio > 0.0) {
            return Err(Error::Config(format!(
                "bench.scalar_ratio must be finite and positive, got {}",
                self.scalar_ratio
            )));
        }
        Ok(())
    }
}

/// Scalar passed to the converter for a pair: `1.0` for equal element sizes,
/// `1 / ratio` when the source is wider, `ratio` otherwise.
#[must_use]
pub fn pair_scalar(source: Format, target: Format, ratio: f64) -> f64 {
    let (source_size, target_size) = (source.size(), target.size());
    if source_size == target_size {
        1.0
    } else if source_size > target_size {
        1.0 / ratio
    } else {
        ratio
    }
}

/// Whether a suite entry compares both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    /// Generic against vectorized.
    Compare,
    /// Vectorized tier only.
    VectorizedOnly,
}

/// One pair of the benchmark suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchCase {
    /// Source format.
    pub source: Format,
    /// Destination format.
    pub target: Format,
    /// Requested mode.
    pub mode: BenchMode,
}

/// The fixed benchmark suite.
#[must_use]
pub fn default_suite() -> Vec<BenchCase> {
    use BenchMode::{Compare, VectorizedOnly};
    use Format::{CF32, CS16, F32, F64, S16, S32, S8};

    [
        (CS16, CF32, Compare),
        (S16, S8, Compare),
        (CF32, CS16, Compare),
        (S8, S16, Compare),
        (S16, F32, Compare),
        (F32, S16, Compare),
        (F32, S8, Compare),
        (S8, F32, Compare),
        (F32, F64, VectorizedOnly),
        (F64, F32, VectorizedOnly),
        (F32, S32, VectorizedOnly),
        (S32, F32, VectorizedOnly),
    ]
    .into_iter()
    .map(|(source, target, mode)| BenchCase {
        source,
        target,
        mode,
    })
    .collect()
}

/// Result of benchmarking one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Source format.
    pub source: Format,
    /// Destination format.
    pub target: Format,
    /// Scalar passed to every call.
    pub scalar: f64,
    /// Generic tier timings, absent for vectorized-only pairs.
    pub generic: Option<TimingStats>,
    /// Vectorized tier timings.
    pub vectorized: TimingStats,
    /// Kernel level active during the run.
    pub level: SimdLevel,
}

impl BenchReport {
    /// `median(GENERIC) / median(VECTORIZED)`, when both tiers were timed.
    #[must_use]
    pub fn speedup(&self) -> Option<f64> {
        self.generic
            .map(|generic| generic.median / self.vectorized.median)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} -> {}", self.source, self.target)?;
        if let Some(generic) = self.generic {
            writeln!(
                f,
                "Generic:    {} us (MAD = {} us)",
                generic.median, generic.mad
            )?;
        }
        writeln!(
            f,
            "Vectorized: {} us (MAD = {} us)",
            self.vectorized.median, self.vectorized.mad
        )?;
        if let Some(speedup) = self.speedup() {
            writeln!(f, "{speedup:.2}x faster")?;
        }
        write!(f, "Kernel:     {}", self.level.name())
    }
}

/// Times `num_iterations` calls of the converter at exactly `priority`.
///
/// # Errors
///
/// [`Error::ConverterNotFound`] when the tier is not registered, or the
/// converter's own error.
pub fn benchmark_converter<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    source: Format,
    target: Format,
    priority: FunctionPriority,
    config: &BenchConfig,
    rng: &mut R,
) -> Result<TimingStats> {
    let converter = registry.get_function(source, target, priority)?;
    let scalar = pair_scalar(source, target, config.scalar_ratio);
    let mut output = AlignedBuffer::for_elements(target, config.num_elements)?;
    let mut times = Vec::with_capacity(config.num_iterations);

    for _ in 0..config.num_iterations {
        let mut input = AlignedBuffer::for_elements(source, config.num_elements)?;
        input.fill_random_bytes(rng);

        let start = Instant::now();
        converter.convert(
            input.as_slice(),
            output.as_mut_slice(),
            config.num_elements,
            scalar,
        )?;
        times.push(start.elapsed());
    }

    let stats = TimingStats::from_durations(&times);
    tracing::debug!(
        %source,
        %target,
        %priority,
        median_us = stats.median,
        mad_us = stats.mad,
        "converter benchmarked"
    );
    Ok(stats)
}

/// Benchmarks both tiers of a pair.
///
/// # Errors
///
/// As [`benchmark_converter`], for either tier.
pub fn compare_converters<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    source: Format,
    target: Format,
    config: &BenchConfig,
    rng: &mut R,
) -> Result<BenchReport> {
    let generic =
        benchmark_converter(registry, source, target, FunctionPriority::Generic, config, rng)?;
    let vectorized =
        benchmark_converter(registry, source, target, FunctionPriority::Vectorized, config, rng)?;
    Ok(BenchReport {
        source,
        target,
        scalar: pair_scalar(source, target, config.scalar_ratio),
        generic: Some(generic),
        vectorized,
        level: simd_level(),
    })
}

/// Benchmarks only the vectorized tier of a pair.
///
/// # Errors
///
/// As [`benchmark_converter`].
pub fn benchmark_vectorized_only<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    source: Format,
    target: Format,
    config: &BenchConfig,
    rng: &mut R,
) -> Result<BenchReport> {
    let vectorized =
        benchmark_converter(registry, source, target, FunctionPriority::Vectorized, config, rng)?;
    Ok(BenchReport {
        source,
        target,
        scalar: pair_scalar(source, target, config.scalar_ratio),
        generic: None,
        vectorized,
        level: simd_level(),
    })
}

/// Runs one suite entry, comparing tiers only when a generic converter exists.
///
/// # Errors
///
/// As [`benchmark_converter`].
pub fn run_case<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    case: &BenchCase,
    config: &BenchConfig,
    rng: &mut R,
) -> Result<BenchReport> {
    let has_generic = registry.contains(case.source, case.target, FunctionPriority::Generic);
    if case.mode == BenchMode::Compare && has_generic {
        compare_converters(registry, case.source, case.target, config, rng)
    } else {
        benchmark_vectorized_only(registry, case.source, case.target, config, rng)
    }
}
