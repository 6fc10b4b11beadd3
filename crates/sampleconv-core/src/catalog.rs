//! Declarative table of vectorized conversions.
//!
//! Each [`CatalogEntry`] names a format pair, the kernel [`Route`] that
//! implements it and the pair's [`ScalarRule`]. A single routine,
//! [`register_vectorized`], turns every row into a [`Converter`]; the only
//! place a scalar is adapted to a kernel's own convention is
//! [`kernel_argument`].

// Scalars travel as f64 through the registry and as f32 into the kernels.
#![allow(clippy::cast_possible_truncation)]

use num_complex::Complex32;
use tracing::info;

use crate::buffer::{check_conversion_args, with_aligned, SampleSlice, SampleSliceMut};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::kernels;
use crate::registry::{Converter, ConverterRegistry, FunctionPriority, ScalarRule};

/// How a kernel consumes its scalar argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelScalar {
    /// The kernel takes no scalar.
    None,
    /// The kernel multiplies by its argument.
    Multiplies,
    /// The kernel divides by its argument.
    Divides,
}

/// A kernel primitive, by concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// `i8 -> i16`, `x << 8`.
    S8ToS16,
    /// `i16 -> i8`, `x >> 8`.
    S16ToS8,
    /// `i8 -> f32`, dividing.
    S8ToF32,
    /// `i16 -> f32`, dividing.
    S16ToF32,
    /// `i32 -> f32`, dividing.
    S32ToF32,
    /// `f32 -> i8`, multiplying.
    F32ToS8,
    /// `f32 -> i16`, multiplying.
    F32ToS16,
    /// `f32 -> i32`, multiplying.
    F32ToS32,
    /// `f32 -> f64`.
    F32ToF64,
    /// `f64 -> f32`.
    F64ToF32,
    /// Real `f32` multiply.
    F32Scale,
    /// Interleaved complex `i16 -> f32`.
    Cs16ToCf32,
    /// Interleaved complex `f32 -> i16`.
    Cf32ToCs16,
    /// Complex multiply of interleaved `f32` pairs.
    Cf32Scale,
}

impl Kernel {
    /// The kernel's own scalar convention.
    #[must_use]
    pub const fn scalar_convention(self) -> KernelScalar {
        match self {
            Kernel::S8ToS16
            | Kernel::S16ToS8
            | Kernel::F32ToF64
            | Kernel::F64ToF32
            | Kernel::Cs16ToCf32
            | Kernel::Cf32ToCs16 => KernelScalar::None,
            Kernel::S8ToF32 | Kernel::S16ToF32 | Kernel::S32ToF32 => KernelScalar::Divides,
            Kernel::F32ToS8
            | Kernel::F32ToS16
            | Kernel::F32ToS32
            | Kernel::F32Scale
            | Kernel::Cf32Scale => KernelScalar::Multiplies,
        }
    }

    /// Runs the kernel over typed views of equal component count.
    fn run(self, input: SampleSlice<'_>, output: SampleSliceMut<'_>, arg: f32) -> Result<()> {
        use SampleSlice as In;
        use SampleSliceMut as Out;

        match (self, input, output) {
            (Kernel::S8ToS16, In::S8(s), Out::S16(d)) => kernels::s8_to_s16(s, d),
            (Kernel::S16ToS8, In::S16(s), Out::S8(d)) => kernels::s16_to_s8(s, d),
            (Kernel::S8ToF32, In::S8(s), Out::F32(d)) => kernels::s8_to_f32_div(s, d, arg),
            (Kernel::S16ToF32, In::S16(s), Out::F32(d)) => kernels::s16_to_f32_div(s, d, arg),
            (Kernel::S32ToF32, In::S32(s), Out::F32(d)) => kernels::s32_to_f32_div(s, d, arg),
            (Kernel::F32ToS8, In::F32(s), Out::S8(d)) => kernels::f32_to_s8_mul(s, d, arg),
            (Kernel::F32ToS16, In::F32(s), Out::S16(d)) => kernels::f32_to_s16_mul(s, d, arg),
            (Kernel::F32ToS32, In::F32(s), Out::S32(d)) => kernels::f32_to_s32_mul(s, d, arg),
            (Kernel::F32ToF64, In::F32(s), Out::F64(d)) => kernels::f32_to_f64(s, d),
            (Kernel::F64ToF32, In::F64(s), Out::F32(d)) => kernels::f64_to_f32(s, d),
            (Kernel::F32Scale, In::F32(s), Out::F32(d)) => kernels::f32_scale(s, d, arg),
            (Kernel::Cs16ToCf32, In::S16(s), Out::F32(d)) => kernels::cs16_to_cf32(s, d),
            (Kernel::Cf32ToCs16, In::F32(s), Out::S16(d)) => kernels::cf32_to_cs16(s, d),
            (Kernel::Cf32Scale, In::F32(s), Out::F32(d)) => {
                kernels::cf32_scale(s, d, Complex32::new(arg, 0.0));
            }
            (kernel, input, output) => {
                return Err(Error::InvalidArgument(format!(
                    "kernel {kernel:?} cannot convert {} components into {}",
                    view_name(&input),
                    view_mut_name(&output)
                )))
            }
        }
        Ok(())
    }
}

fn view_name(view: &SampleSlice<'_>) -> &'static str {
    match view {
        SampleSlice::S8(_) => "i8",
        SampleSlice::S16(_) => "i16",
        SampleSlice::S32(_) => "i32",
        SampleSlice::F32(_) => "f32",
        SampleSlice::F64(_) => "f64",
    }
}

fn view_mut_name(view: &SampleSliceMut<'_>) -> &'static str {
    match view {
        SampleSliceMut::S8(_) => "i8",
        SampleSliceMut::S16(_) => "i16",
        SampleSliceMut::S32(_) => "i32",
        SampleSliceMut::F32(_) => "f32",
        SampleSliceMut::F64(_) => "f64",
    }
}

/// Adapts a multiply-form scalar to `kernel`'s own convention.
///
/// Dividing kernels receive `1 / scalar`, multiplying kernels receive the
/// scalar unchanged and scalar-free kernels receive `1.0` (unused).
#[must_use]
pub fn kernel_argument(kernel: Kernel, scalar: f64) -> f32 {
    match kernel.scalar_convention() {
        KernelScalar::None => 1.0,
        KernelScalar::Multiplies => scalar as f32,
        KernelScalar::Divides => (1.0 / scalar) as f32,
    }
}

/// Kernel composition implementing one catalog pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A single kernel call.
    Direct(Kernel),
    /// Two kernels chained through a fresh `f32` scratch buffer. Exactly one
    /// of them consumes the scalar.
    ViaF32(Kernel, Kernel),
    /// Scale the `f32` input into scratch, then run the kernel. The scale
    /// pass is skipped when the scalar is exactly `1.0`.
    ScaleThen(Kernel),
    /// Run the kernel into the `f32` destination, then scale it in place.
    /// The scale pass is skipped when the scalar is exactly `1.0`.
    ThenScale(Kernel),
}

/// One row of the vectorized catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Source format.
    pub source: Format,
    /// Destination format.
    pub target: Format,
    /// Kernel composition.
    pub route: Route,
    /// How the pair applies its scalar.
    pub scalar: ScalarRule,
}

const fn entry(source: Format, target: Format, route: Route, scalar: ScalarRule) -> CatalogEntry {
    CatalogEntry {
        source,
        target,
        route,
        scalar,
    }
}

use Format::{CF32, CF64, CS16, CS32, CS8, F32, F64, S16, S32, S8};
use Kernel as K;
use Route::{Direct, ScaleThen, ThenScale, ViaF32};
use ScalarRule::{ComplexMultiply, Ignored, Multiply};

static CATALOG: [CatalogEntry; 34] = [
    // Real
    entry(S8, S16, Direct(K::S8ToS16), Ignored),
    entry(S16, S8, Direct(K::S16ToS8), Ignored),
    entry(S8, F32, Direct(K::S8ToF32), Multiply),
    entry(S16, F32, Direct(K::S16ToF32), Multiply),
    entry(S32, F32, Direct(K::S32ToF32), Multiply),
    entry(F32, S8, Direct(K::F32ToS8), Multiply),
    entry(F32, S16, Direct(K::F32ToS16), Multiply),
    entry(F32, S32, Direct(K::F32ToS32), Multiply),
    entry(S8, F64, ViaF32(K::S8ToF32, K::F32ToF64), Multiply),
    entry(S16, F64, ViaF32(K::S16ToF32, K::F32ToF64), Multiply),
    entry(S32, F64, ViaF32(K::S32ToF32, K::F32ToF64), Multiply),
    entry(F64, S8, ViaF32(K::F64ToF32, K::F32ToS8), Multiply),
    entry(F64, S16, ViaF32(K::F64ToF32, K::F32ToS16), Multiply),
    entry(F64, S32, ViaF32(K::F64ToF32, K::F32ToS32), Multiply),
    entry(F32, F64, ScaleThen(K::F32ToF64), Multiply),
    entry(F64, F32, ThenScale(K::F64ToF32), Multiply),
    entry(F32, F32, Direct(K::F32Scale), Multiply),
    // Complex
    entry(CS8, CS16, Direct(K::S8ToS16), Ignored),
    entry(CS16, CS8, Direct(K::S16ToS8), Ignored),
    entry(CS8, CF32, Direct(K::S8ToF32), Multiply),
    entry(CS16, CF32, ThenScale(K::Cs16ToCf32), ComplexMultiply),
    entry(CS32, CF32, Direct(K::S32ToF32), Multiply),
    entry(CF32, CS8, Direct(K::F32ToS8), Multiply),
    entry(CF32, CS16, ScaleThen(K::Cf32ToCs16), ComplexMultiply),
    entry(CF32, CS32, Direct(K::F32ToS32), Multiply),
    entry(CS8, CF64, ViaF32(K::S8ToF32, K::F32ToF64), Multiply),
    entry(CS16, CF64, ViaF32(K::S16ToF32, K::F32ToF64), Multiply),
    entry(CS32, CF64, ViaF32(K::S32ToF32, K::F32ToF64), Multiply),
    entry(CF64, CS8, ViaF32(K::F64ToF32, K::F32ToS8), Multiply),
    entry(CF64, CS16, ViaF32(K::F64ToF32, K::F32ToS16), Multiply),
    entry(CF64, CS32, ViaF32(K::F64ToF32, K::F32ToS32), Multiply),
    entry(CF32, CF64, ScaleThen(K::F32ToF64), Multiply),
    entry(CF64, CF32, ThenScale(K::F64ToF32), Multiply),
    entry(CF32, CF32, Direct(K::Cf32Scale), ComplexMultiply),
];

/// The vectorized catalog rows.
#[must_use]
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Finds the catalog row for a pair.
#[must_use]
pub fn find(source: Format, target: Format) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|entry| entry.source == source && entry.target == target)
}

fn scale_into(rule: ScalarRule, src: &[f32], dst: &mut [f32], scalar: f32) {
    if rule == ScalarRule::ComplexMultiply {
        kernels::cf32_scale(src, dst, Complex32::new(scalar, 0.0));
    } else {
        kernels::f32_scale(src, dst, scalar);
    }
}

fn scale_in_place(rule: ScalarRule, buf: &mut [f32], scalar: f32) {
    if rule == ScalarRule::ComplexMultiply {
        kernels::cf32_scale_inplace(buf, Complex32::new(scalar, 0.0));
    } else {
        kernels::f32_scale_inplace(buf, scalar);
    }
}

impl CatalogEntry {
    /// Converts `count` elements of `source` into `target`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when the buffers violate the conversion
    /// contract; nothing is written in that case.
    pub fn convert(&self, src: &[u8], dst: &mut [u8], count: usize, scalar: f64) -> Result<()> {
        let (src_bytes, dst_bytes) =
            check_conversion_args(self.source, self.target, src, dst, count)?;
        with_aligned(
            self.source,
            self.target,
            &src[..src_bytes],
            &mut dst[..dst_bytes],
            |src, dst| self.convert_aligned(src, dst, scalar),
        )
    }

    #[allow(clippy::float_cmp)] // An exact unit scalar skips the scale pass.
    fn convert_aligned(&self, src: &[u8], dst: &mut [u8], scalar: f64) -> Result<()> {
        let input = SampleSlice::from_bytes(self.source, src)?;
        let output = SampleSliceMut::from_bytes(self.target, dst)?;
        let components = input.len();

        match self.route {
            Route::Direct(kernel) => kernel.run(input, output, kernel_argument(kernel, scalar)),
            Route::ViaF32(first, second) => {
                let mut scratch = vec![0.0f32; components];
                first.run(
                    input,
                    SampleSliceMut::F32(&mut scratch),
                    kernel_argument(first, scalar),
                )?;
                second.run(
                    SampleSlice::F32(&scratch),
                    output,
                    kernel_argument(second, scalar),
                )
            }
            Route::ScaleThen(kernel) => {
                if scalar == 1.0 {
                    return kernel.run(input, output, kernel_argument(kernel, 1.0));
                }
                let SampleSlice::F32(samples) = input else {
                    return Err(self.route_mismatch());
                };
                let mut scratch = vec![0.0f32; components];
                scale_into(self.scalar, samples, &mut scratch, scalar as f32);
                kernel.run(
                    SampleSlice::F32(&scratch),
                    output,
                    kernel_argument(kernel, 1.0),
                )
            }
            Route::ThenScale(kernel) => {
                let SampleSliceMut::F32(out) = output else {
                    return Err(self.route_mismatch());
                };
                kernel.run(
                    input,
                    SampleSliceMut::F32(&mut *out),
                    kernel_argument(kernel, 1.0),
                )?;
                if scalar != 1.0 {
                    scale_in_place(self.scalar, out, scalar as f32);
                }
                Ok(())
            }
        }
    }

    fn route_mismatch(&self) -> Error {
        Error::InvalidArgument(format!(
            "route {:?} needs an f32 side for {} -> {}",
            self.route, self.source, self.target
        ))
    }

    /// Wraps the row as a registry [`Converter`].
    #[must_use]
    pub fn converter(self) -> Converter {
        Converter::new(self.scalar, move |src, dst, count, scalar| {
            self.convert(src, dst, count, scalar)
        })
    }
}

/// Registers every catalog row at [`FunctionPriority::Vectorized`] and
/// returns the number of rows registered.
///
/// # Errors
///
/// Propagates a rejected registration.
pub fn register_vectorized(registry: &mut ConverterRegistry) -> Result<usize> {
    for entry in entries() {
        registry.register(
            entry.source,
            entry.target,
            FunctionPriority::Vectorized,
            entry.converter(),
        )?;
    }
    info!(
        count = CATALOG.len(),
        kernels = kernels::simd_level().name(),
        "vectorized converters registered"
    );
    Ok(CATALOG.len())
}
