//! Sample buffers and byte-level views.
//!
//! Conversion functions exchange raw bytes. [`AlignedBuffer`] provides
//! 64-byte aligned, zero-initialised storage for harness inputs and outputs,
//! and [`SampleSlice`] / [`SampleSliceMut`] reinterpret checked byte ranges as
//! typed component slices. Callers may pass byte ranges at any address:
//! [`with_aligned`] stages misaligned ones through aligned scratch.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

use rand::RngCore;

use crate::error::{Error, Result};
use crate::format::Format;

/// Alignment of every [`AlignedBuffer`], one cache line.
pub const BUFFER_ALIGNMENT: usize = 64;

/// Owned, zero-initialised byte buffer aligned to [`BUFFER_ALIGNMENT`].
///
/// Memory is released on drop. Allocation failure aborts via
/// [`handle_alloc_error`], as `Vec` does.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

// SAFETY: `AlignedBuffer` owns its allocation exclusively, like `Vec<u8>`.
// - Condition 1: No interior mutability; mutation requires `&mut self`.
// - Condition 2: The pointer is never shared outside borrow-checked slices.
unsafe impl Send for AlignedBuffer {}
// SAFETY: Shared access only hands out `&[u8]`.
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocates `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the size overflows a [`Layout`].
    pub fn new(len: usize) -> Result<Self> {
        // A zero-size layout cannot be passed to the allocator; keep one line.
        let layout = Layout::from_size_align(len.max(1), BUFFER_ALIGNMENT)
            .map_err(|e| Error::InvalidArgument(format!("buffer of {len} bytes: {e}")))?;

        // SAFETY: `alloc_zeroed` requires a non-zero layout.
        // - Condition 1: `layout.size() >= 1` by construction above.
        // Reason: Aligned zeroed storage is not expressible through `Vec<u8>`.
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            handle_alloc_error(layout)
        };

        Ok(Self { ptr, len, layout })
    }

    /// Allocates room for `count` elements of `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the byte size overflows.
    pub fn for_elements(format: Format, count: usize) -> Result<Self> {
        let len = count.checked_mul(format.size()).ok_or_else(|| {
            Error::InvalidArgument(format!("{count} elements of {format} overflow usize"))
        })?;
        Self::new(len)
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrows the contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialised bytes for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Mutably borrows the contents.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: `ptr` is valid for `len` bytes and `&mut self` guarantees uniqueness.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Overwrites every byte with random bits.
    pub fn fill_random_bytes<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        rng.fill_bytes(self.as_mut_slice());
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed(self.layout)` and is freed once.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("align", &BUFFER_ALIGNMENT)
            .finish()
    }
}

/// Checks the conversion contract for `count` elements and returns the byte
/// lengths `(source_bytes, target_bytes)` the call will touch.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `count` is zero, a buffer is too short or
/// a byte size overflows.
pub fn check_conversion_args(
    source: Format,
    target: Format,
    src: &[u8],
    dst: &[u8],
    count: usize,
) -> Result<(usize, usize)> {
    if count == 0 {
        return Err(Error::InvalidArgument(format!(
            "{source} -> {target}: element count must be positive"
        )));
    }
    let need = |format: Format| {
        count.checked_mul(format.size()).ok_or_else(|| {
            Error::InvalidArgument(format!("{count} elements of {format} overflow usize"))
        })
    };
    let src_bytes = need(source)?;
    let dst_bytes = need(target)?;
    if src.len() < src_bytes {
        return Err(Error::InvalidArgument(format!(
            "{source} -> {target}: source holds {} bytes, {count} elements need {src_bytes}",
            src.len()
        )));
    }
    if dst.len() < dst_bytes {
        return Err(Error::InvalidArgument(format!(
            "{source} -> {target}: destination holds {} bytes, {count} elements need {dst_bytes}",
            dst.len()
        )));
    }
    Ok((src_bytes, dst_bytes))
}

fn is_aligned_for(bytes: &[u8], format: Format) -> bool {
    bytes.as_ptr() as usize % format.component().size() == 0
}

/// Calls `convert` with `src` and `dst` starting on a component boundary of
/// `source` and `target`.
///
/// A misaligned source is copied into scratch first. A misaligned
/// destination is converted into scratch and copied back once `convert`
/// succeeds, so a failed call leaves `dst` untouched.
///
/// # Errors
///
/// Whatever `convert` returns, or [`Error::InvalidArgument`] if scratch
/// cannot be allocated.
pub fn with_aligned<F>(
    source: Format,
    target: Format,
    src: &[u8],
    dst: &mut [u8],
    convert: F,
) -> Result<()>
where
    F: FnOnce(&[u8], &mut [u8]) -> Result<()>,
{
    let src_copy;
    let src = if is_aligned_for(src, source) {
        src
    } else {
        let mut scratch = AlignedBuffer::new(src.len())?;
        scratch.as_mut_slice().copy_from_slice(src);
        src_copy = scratch;
        src_copy.as_slice()
    };

    if is_aligned_for(dst, target) {
        return convert(src, dst);
    }
    let mut scratch = AlignedBuffer::new(dst.len())?;
    convert(src, scratch.as_mut_slice())?;
    dst.copy_from_slice(scratch.as_slice());
    Ok(())
}

fn cast_error(format: Format, e: bytemuck::PodCastError) -> Error {
    Error::InvalidArgument(format!("{format} buffer cannot be viewed as samples: {e:?}"))
}

/// Immutable typed view of a byte buffer, by component type.
#[derive(Debug, Clone, Copy)]
pub enum SampleSlice<'a> {
    /// Signed 8-bit components.
    S8(&'a [i8]),
    /// Signed 16-bit components.
    S16(&'a [i16]),
    /// Signed 32-bit components.
    S32(&'a [i32]),
    /// 32-bit float components.
    F32(&'a [f32]),
    /// 64-bit float components.
    F64(&'a [f64]),
}

impl<'a> SampleSlice<'a> {
    /// Views `bytes` as the components of `format` (complex formats yield
    /// their interleaved real components).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for unsigned formats, a misaligned buffer
    /// or a length that is not a multiple of the component size.
    pub fn from_bytes(format: Format, bytes: &'a [u8]) -> Result<Self> {
        let err = |e| cast_error(format, e);
        Ok(match format.component() {
            Format::S8 => SampleSlice::S8(bytemuck::try_cast_slice(bytes).map_err(err)?),
            Format::S16 => SampleSlice::S16(bytemuck::try_cast_slice(bytes).map_err(err)?),
            Format::S32 => SampleSlice::S32(bytemuck::try_cast_slice(bytes).map_err(err)?),
            Format::F32 => SampleSlice::F32(bytemuck::try_cast_slice(bytes).map_err(err)?),
            Format::F64 => SampleSlice::F64(bytemuck::try_cast_slice(bytes).map_err(err)?),
            other => {
                return Err(Error::InvalidArgument(format!(
                    "{other} samples have no typed view"
                )))
            }
        })
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SampleSlice::S8(s) => s.len(),
            SampleSlice::S16(s) => s.len(),
            SampleSlice::S32(s) => s.len(),
            SampleSlice::F32(s) => s.len(),
            SampleSlice::F64(s) => s.len(),
        }
    }

    /// Returns `true` when the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component value `i` widened to `f64`.
    #[must_use]
    pub fn get_f64(&self, i: usize) -> f64 {
        match self {
            SampleSlice::S8(s) => f64::from(s[i]),
            SampleSlice::S16(s) => f64::from(s[i]),
            SampleSlice::S32(s) => f64::from(s[i]),
            SampleSlice::F32(s) => f64::from(s[i]),
            SampleSlice::F64(s) => s[i],
        }
    }

    /// All components widened to `f64`.
    #[must_use]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.get_f64(i)).collect()
    }
}

/// Mutable typed view of a byte buffer, by component type.
#[derive(Debug)]
pub enum SampleSliceMut<'a> {
    /// Signed 8-bit components.
    S8(&'a mut [i8]),
    /// Signed 16-bit components.
    S16(&'a mut [i16]),
    /// Signed 32-bit components.
    S32(&'a mut [i32]),
    /// 32-bit float components.
    F32(&'a mut [f32]),
    /// 64-bit float components.
    F64(&'a mut [f64]),
}

impl<'a> SampleSliceMut<'a> {
    /// Mutable counterpart of [`SampleSlice::from_bytes`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`SampleSlice::from_bytes`].
    pub fn from_bytes(format: Format, bytes: &'a mut [u8]) -> Result<Self> {
        let err = |e| cast_error(format, e);
        Ok(match format.component() {
            Format::S8 => SampleSliceMut::S8(bytemuck::try_cast_slice_mut(bytes).map_err(err)?),
            Format::S16 => {
                SampleSliceMut::S16(bytemuck::try_cast_slice_mut(bytes).map_err(err)?)
            }
            Format::S32 => {
                SampleSliceMut::S32(bytemuck::try_cast_slice_mut(bytes).map_err(err)?)
            }
            Format::F32 => {
                SampleSliceMut::F32(bytemuck::try_cast_slice_mut(bytes).map_err(err)?)
            }
            Format::F64 => {
                SampleSliceMut::F64(bytemuck::try_cast_slice_mut(bytes).map_err(err)?)
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "{other} samples have no typed view"
                )))
            }
        })
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SampleSliceMut::S8(s) => s.len(),
            SampleSliceMut::S16(s) => s.len(),
            SampleSliceMut::S32(s) => s.len(),
            SampleSliceMut::F32(s) => s.len(),
            SampleSliceMut::F64(s) => s.len(),
        }
    }

    /// Returns `true` when the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
