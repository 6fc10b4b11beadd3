//! Correctness harness: smoke and loopback checks over the vectorized tier.
//!
//! The smoke check calls every catalog pair on random bytes with each of
//! [`smoke_scalars`]. The loopback check converts `type1 -> type2` with a
//! scalar `s`, converts back with `1 / s` and reports the median and MAD of the per-element residuals.

use std::fmt;

use num_complex::Complex64;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bench::pair_scalar;
use crate::buffer::{AlignedBuffer, SampleSlice, SampleSliceMut};
use crate::catalog;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::registry::{ConverterRegistry, FunctionPriority};
use crate::stats::{median, median_abs_dev};

/// Correctness harness parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Elements per smoke call.
    pub smoke_elements: usize,
    /// Elements per loopback run.
    pub loopback_elements: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            smoke_elements: 1024,
            loopback_elements: 8192,
        }
    }
}

impl CheckConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when an element count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.smoke_elements == 0 {
            return Err(Error::Config("check.smoke_elements must be positive".into()));
        }
        if self.loopback_elements == 0 {
            return Err(Error::Config("check.loopback_elements must be positive".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Smoke check
// =============================================================================

/// Ratio behind the non-unit smoke scalar, as in the benchmark.
pub const SMOKE_SCALAR_RATIO: f64 = 10.0;

/// Scalars every pair is smoked with: `1.0`, then a non-unit scalar so the
/// scale pass of each route runs too.
#[must_use]
pub fn smoke_scalars(source: Format, target: Format) -> [f64; 2] {
    let scaled = if source.size() == target.size() {
        SMOKE_SCALAR_RATIO
    } else {
        pair_scalar(source, target, SMOKE_SCALAR_RATIO)
    };
    [1.0, scaled]
}

/// Resolves `source -> target` at the vectorized tier and runs it once on
/// `elements` random-byte elements with `scalar`.
///
/// # Errors
///
/// [`Error::ConverterNotFound`] or the converter's own error.
pub fn smoke_check<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    source: Format,
    target: Format,
    elements: usize,
    scalar: f64,
    rng: &mut R,
) -> Result<()> {
    let converter = registry.get_function(source, target, FunctionPriority::Vectorized)?;
    let mut input = AlignedBuffer::for_elements(source, elements)?;
    input.fill_random_bytes(rng);
    let mut output = AlignedBuffer::for_elements(target, elements)?;
    converter.convert(input.as_slice(), output.as_mut_slice(), elements, scalar)
}

/// A smoke check that did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeFailure {
    /// Source format.
    pub source: Format,
    /// Destination format.
    pub target: Format,
    /// Rendered error.
    pub error: String,
}

/// Outcome of [`smoke_check_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeReport {
    /// Pairs attempted.
    pub checked: usize,
    /// Pairs that failed.
    pub failures: Vec<SmokeFailure>,
}

impl SmokeReport {
    /// Returns `true` when every pair passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Smoke-checks every catalog pair, collecting failures instead of stopping.
pub fn smoke_check_all<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    config: &CheckConfig,
    rng: &mut R,
) -> SmokeReport {
    let mut report = SmokeReport::default();
    for entry in catalog::entries() {
        report.checked += 1;
        let (source, target) = (entry.source, entry.target);
        let outcome = smoke_scalars(source, target).into_iter().try_for_each(|scalar| {
            smoke_check(registry, source, target, config.smoke_elements, scalar, &mut *rng)
                .map_err(|e| (scalar, e))
        });
        match outcome {
            Ok(()) => debug!(%source, %target, "smoke check passed"),
            Err((scalar, e)) => {
                warn!(%source, %target, scalar, error = %e, "smoke check failed");
                report.failures.push(SmokeFailure {
                    source,
                    target,
                    error: format!("scalar {scalar}: {e}"),
                });
            }
        }
    }
    report
}

// =============================================================================
// Loopback check
// =============================================================================

/// Distribution used to generate loopback test values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    /// 8-bit integers, uniform in `0..=127`.
    ByteInt,
    /// Wider integers, uniform in `0..=MAX`.
    WideInt,
    /// Floats, uniform in `[0, 1)`.
    Float,
}

impl ValueClass {
    /// Class of a format's components; complex formats draw both components
    /// from their component's class.
    #[must_use]
    pub const fn for_format(format: Format) -> ValueClass {
        match format.component() {
            Format::S8 | Format::U8 => ValueClass::ByteInt,
            Format::F32 | Format::F64 => ValueClass::Float,
            _ => ValueClass::WideInt,
        }
    }
}

/// Allocates `count` elements of `format` filled from its [`ValueClass`].
///
/// # Errors
///
/// [`Error::InvalidArgument`] for formats without a typed view.
pub fn random_values<R: RngCore + ?Sized>(
    format: Format,
    count: usize,
    rng: &mut R,
) -> Result<AlignedBuffer> {
    let mut buffer = AlignedBuffer::for_elements(format, count)?;
    let class = ValueClass::for_format(format);
    match (class, SampleSliceMut::from_bytes(format, buffer.as_mut_slice())?) {
        (ValueClass::ByteInt, SampleSliceMut::S8(s)) => {
            s.iter_mut().for_each(|x| *x = rng.gen_range(0..=127));
        }
        (ValueClass::WideInt, SampleSliceMut::S16(s)) => {
            s.iter_mut().for_each(|x| *x = rng.gen_range(0..=i16::MAX));
        }
        (ValueClass::WideInt, SampleSliceMut::S32(s)) => {
            s.iter_mut().for_each(|x| *x = rng.gen_range(0..=i32::MAX));
        }
        (ValueClass::Float, SampleSliceMut::F32(s)) => {
            s.iter_mut().for_each(|x| *x = rng.gen_range(0.0..1.0));
        }
        (ValueClass::Float, SampleSliceMut::F64(s)) => {
            s.iter_mut().for_each(|x| *x = rng.gen_range(0.0..1.0));
        }
        (class, _) => {
            return Err(Error::InvalidArgument(format!(
                "no {class:?} generator for {format}"
            )))
        }
    }
    Ok(buffer)
}

/// One loopback round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopbackCase {
    /// Format of the test values.
    pub type1: Format,
    /// Intermediate format.
    pub type2: Format,
    /// Scalar for `type1 -> type2`; the way back uses `1 / scalar`.
    pub scalar: f64,
}

const S8_TO_F32: f64 = 1.0 / 128.0;
const S16_TO_F32: f64 = 1.0 / 32768.0;
const S32_TO_F32: f64 = 1.0 / 2_147_483_648.0;

/// The loopback suite: every catalog pair with its full-scale scalar.
#[must_use]
pub fn default_loopback_suite() -> Vec<LoopbackCase> {
    use Format::{F32, F64, S16, S32, S8};

    let real = [
        (S8, S16, 1.0),
        (S8, F32, S8_TO_F32),
        (S8, F64, S8_TO_F32),
        (S16, S8, 1.0),
        (S16, F32, S16_TO_F32),
        (S16, F64, S16_TO_F32),
        (S32, F32, S32_TO_F32),
        (S32, F64, S32_TO_F32),
        (F32, S8, 1.0 / S8_TO_F32),
        (F32, S16, 1.0 / S16_TO_F32),
        (F32, S32, 1.0 / S32_TO_F32),
        (F32, F32, 10.0),
        (F32, F64, 10.0),
        (F64, S8, 1.0 / S8_TO_F32),
        (F64, S16, 1.0 / S16_TO_F32),
        (F64, S32, 1.0 / S32_TO_F32),
        (F64, F32, 10.0),
    ];

    real.iter()
        .map(|&(type1, type2, scalar)| LoopbackCase {
            type1,
            type2,
            scalar,
        })
        .chain(real.iter().map(|&(type1, type2, scalar)| LoopbackCase {
            type1: type1.to_complex(),
            type2: type2.to_complex(),
            scalar,
        }))
        .collect()
}

/// Residual statistics of one loopback run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopbackReport {
    /// The case that was run.
    pub case: LoopbackCase,
    /// Median residual.
    pub median: f64,
    /// MAD of the residuals.
    pub mad: f64,
}

impl fmt::Display for LoopbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let LoopbackCase {
            type1,
            type2,
            scalar,
        } = self.case;
        writeln!(
            f,
            "Testing {type1} -> {type2} (scaled x{scalar}) -> {type1} (scaled x{})...",
            1.0 / scalar
        )?;
        let label = if type1.is_complex() {
            "Average complex diff"
        } else {
            "Average diff"
        };
        write!(f, " * {label}: {} +- {}", self.median, self.mad)
    }
}

/// Per-element residuals: `|a - b|` for reals, `||a| - |b||` for complex.
fn residuals(format: Format, original: &[f64], loopback: &[f64]) -> Vec<f64> {
    if format.is_complex() {
        original
            .chunks_exact(2)
            .zip(loopback.chunks_exact(2))
            .map(|(a, b)| {
                (Complex64::new(a[0], a[1]).norm() - Complex64::new(b[0], b[1]).norm()).abs()
            })
            .collect()
    } else {
        original
            .iter()
            .zip(loopback)
            .map(|(a, b)| (a - b).abs())
            .collect()
    }
}

/// Runs one loopback case on `elements` generated values.
///
/// # Errors
///
/// [`Error::ConverterNotFound`] when either direction is missing at the
/// vectorized tier, or a converter's own error.
pub fn loopback_check<R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    case: &LoopbackCase,
    elements: usize,
    rng: &mut R,
) -> Result<LoopbackReport> {
    let forward = registry.get_function(case.type1, case.type2, FunctionPriority::Vectorized)?;
    let backward = registry.get_function(case.type2, case.type1, FunctionPriority::Vectorized)?;

    let input = random_values(case.type1, elements, rng)?;
    let mut converted = AlignedBuffer::for_elements(case.type2, elements)?;
    let mut loopback = AlignedBuffer::for_elements(case.type1, elements)?;

    forward.convert(input.as_slice(), converted.as_mut_slice(), elements, case.scalar)?;
    backward.convert(
        converted.as_slice(),
        loopback.as_mut_slice(),
        elements,
        1.0 / case.scalar,
    )?;

    let original = SampleSlice::from_bytes(case.type1, input.as_slice())?.to_f64_vec();
    let returned = SampleSlice::from_bytes(case.type1, loopback.as_slice())?.to_f64_vec();
    let diffs = residuals(case.type1, &original, &returned);

    Ok(LoopbackReport {
        case: *case,
        median: median(&diffs),
        mad: median_abs_dev(&diffs),
    })
}
