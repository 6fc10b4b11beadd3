//! Generic tier: portable per-element converters.
//!
//! These are the host framework's fallback converters, registered at
//! [`FunctionPriority::Generic`]. Each element is widened to `f64`,
//! multiplied by the scalar and narrowed with round-half-even and
//! saturation. S8 <-> S16 uses the same shifts as the vectorized tier.

#![allow(clippy::cast_possible_truncation)]

use bytemuck::Pod;
use tracing::info;

use crate::buffer::{check_conversion_args, with_aligned};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::registry::{Converter, ConverterRegistry, FunctionPriority, ScalarRule};

/// A real sample component with lossless-enough `f64` round trips.
trait Sample: Pod {
    fn to_f64(self) -> f64;
    fn from_f64(x: f64) -> Self;
}

macro_rules! impl_int_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            #[inline]
            fn from_f64(x: f64) -> Self {
                if x.is_nan() {
                    return 0;
                }
                x.round_ties_even().clamp(f64::from(<$t>::MIN), f64::from(<$t>::MAX)) as $t
            }
        }
    )*};
}

impl_int_sample!(i8, i16);

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(x: f64) -> Self {
        x as f32
    }
}

fn view<'a, T: Pod>(format: Format, bytes: &'a [u8]) -> Result<&'a [T]> {
    bytemuck::try_cast_slice(bytes)
        .map_err(|e| Error::InvalidArgument(format!("{format} source buffer: {e:?}")))
}

fn view_mut<'a, T: Pod>(format: Format, bytes: &'a mut [u8]) -> Result<&'a mut [T]> {
    bytemuck::try_cast_slice_mut(bytes)
        .map_err(|e| Error::InvalidArgument(format!("{format} destination buffer: {e:?}")))
}

/// `dst = saturate(round(src * scalar))`, computed per component in `f64`.
fn scaled<S: Sample, D: Sample>(source: Format, target: Format) -> Converter {
    Converter::new(ScalarRule::Multiply, move |src, dst, count, scalar| {
        let (src_bytes, dst_bytes) = check_conversion_args(source, target, src, dst, count)?;
        with_aligned(source, target, &src[..src_bytes], &mut dst[..dst_bytes], |src, dst| {
            let input: &[S] = view(source, src)?;
            let output: &mut [D] = view_mut(target, dst)?;
            for (d, &s) in output.iter_mut().zip(input) {
                *d = D::from_f64(s.to_f64() * scalar);
            }
            Ok(())
        })
    })
}

fn widen_s8(source: Format, target: Format) -> Converter {
    Converter::new(ScalarRule::Ignored, move |src, dst, count, _scalar| {
        let (src_bytes, dst_bytes) = check_conversion_args(source, target, src, dst, count)?;
        with_aligned(source, target, &src[..src_bytes], &mut dst[..dst_bytes], |src, dst| {
            let input: &[i8] = view(source, src)?;
            let output: &mut [i16] = view_mut(target, dst)?;
            for (d, &s) in output.iter_mut().zip(input) {
                *d = i16::from(s) << 8;
            }
            Ok(())
        })
    })
}

fn narrow_s16(source: Format, target: Format) -> Converter {
    Converter::new(ScalarRule::Ignored, move |src, dst, count, _scalar| {
        let (src_bytes, dst_bytes) = check_conversion_args(source, target, src, dst, count)?;
        with_aligned(source, target, &src[..src_bytes], &mut dst[..dst_bytes], |src, dst| {
            let input: &[i16] = view(source, src)?;
            let output: &mut [i8] = view_mut(target, dst)?;
            for (d, &s) in output.iter_mut().zip(input) {
                *d = (s >> 8) as i8;
            }
            Ok(())
        })
    })
}

/// Real pairs covered by the generic tier; each is also registered for its
/// complex counterpart.
const GENERIC_PAIRS: [(Format, Format); 7] = [
    (Format::S8, Format::S16),
    (Format::S16, Format::S8),
    (Format::S8, Format::F32),
    (Format::S16, Format::F32),
    (Format::F32, Format::S8),
    (Format::F32, Format::S16),
    (Format::F32, Format::F32),
];

pub(crate) fn generic_converter(source: Format, target: Format) -> Result<Converter> {
    Ok(match (source.component(), target.component()) {
        (Format::S8, Format::S16) => widen_s8(source, target),
        (Format::S16, Format::S8) => narrow_s16(source, target),
        (Format::S8, Format::F32) => scaled::<i8, f32>(source, target),
        (Format::S16, Format::F32) => scaled::<i16, f32>(source, target),
        (Format::F32, Format::S8) => scaled::<f32, i8>(source, target),
        (Format::F32, Format::S16) => scaled::<f32, i16>(source, target),
        (Format::F32, Format::F32) => scaled::<f32, f32>(source, target),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "no generic converter for {source} -> {target}"
            )))
        }
    })
}

/// Pairs registered by [`register_generic`], real then complex.
#[must_use]
pub fn generic_pairs() -> Vec<(Format, Format)> {
    GENERIC_PAIRS
        .iter()
        .copied()
        .chain(
            GENERIC_PAIRS
                .iter()
                .map(|&(s, t)| (s.to_complex(), t.to_complex())),
        )
        .collect()
}

/// Registers the generic tier and returns the number of entries added.
///
/// # Errors
///
/// Propagates a rejected registration.
pub fn register_generic(registry: &mut ConverterRegistry) -> Result<usize> {
    let pairs = generic_pairs();
    for &(source, target) in &pairs {
        registry.register(
            source,
            target,
            FunctionPriority::Generic,
            generic_converter(source, target)?,
        )?;
    }
    info!(count = pairs.len(), "generic converters registered");
    Ok(pairs.len())
}
