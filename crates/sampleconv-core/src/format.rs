//! Sample format catalog.
//!
//! Every format has a fixed string identifier (the ids the host framework
//! uses, e.g. `"CS16"`) and a byte size per element. A complex format stores
//! interleaved `(re, im)` pairs of its component format, so its size is
//! always twice the component size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named element encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Format {
    /// Signed 8-bit integer.
    S8,
    /// Signed 16-bit integer.
    S16,
    /// Signed 32-bit integer.
    S32,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Complex signed 8-bit integer.
    CS8,
    /// Complex signed 16-bit integer.
    CS16,
    /// Complex signed 32-bit integer.
    CS32,
    /// Complex unsigned 8-bit integer.
    CU8,
    /// Complex unsigned 16-bit integer.
    CU16,
    /// Complex unsigned 32-bit integer.
    CU32,
    /// Complex 32-bit float.
    CF32,
    /// Complex 64-bit float.
    CF64,
}

impl Format {
    /// All formats known to the catalog.
    pub const ALL: [Format; 16] = [
        Format::S8,
        Format::S16,
        Format::S32,
        Format::U8,
        Format::U16,
        Format::U32,
        Format::F32,
        Format::F64,
        Format::CS8,
        Format::CS16,
        Format::CS32,
        Format::CU8,
        Format::CU16,
        Format::CU32,
        Format::CF32,
        Format::CF64,
    ];

    /// Returns the host identifier of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Format::S8 => "S8",
            Format::S16 => "S16",
            Format::S32 => "S32",
            Format::U8 => "U8",
            Format::U16 => "U16",
            Format::U32 => "U32",
            Format::F32 => "F32",
            Format::F64 => "F64",
            Format::CS8 => "CS8",
            Format::CS16 => "CS16",
            Format::CS32 => "CS32",
            Format::CU8 => "CU8",
            Format::CU16 => "CU16",
            Format::CU32 => "CU32",
            Format::CF32 => "CF32",
            Format::CF64 => "CF64",
        }
    }

    /// Returns `true` for interleaved complex formats.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            Format::CS8
                | Format::CS16
                | Format::CS32
                | Format::CU8
                | Format::CU16
                | Format::CU32
                | Format::CF32
                | Format::CF64
        )
    }

    /// Returns `true` for floating-point formats (real or complex).
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self.component(), Format::F32 | Format::F64)
    }

    /// Returns the real component of a complex format, or `self` for a real one.
    #[must_use]
    pub const fn component(self) -> Format {
        match self {
            Format::CS8 => Format::S8,
            Format::CS16 => Format::S16,
            Format::CS32 => Format::S32,
            Format::CU8 => Format::U8,
            Format::CU16 => Format::U16,
            Format::CU32 => Format::U32,
            Format::CF32 => Format::F32,
            Format::CF64 => Format::F64,
            real => real,
        }
    }

    /// Returns the complex counterpart of a real format, or `self` for a complex one.
    #[must_use]
    pub const fn to_complex(self) -> Format {
        match self {
            Format::S8 => Format::CS8,
            Format::S16 => Format::CS16,
            Format::S32 => Format::CS32,
            Format::U8 => Format::CU8,
            Format::U16 => Format::CU16,
            Format::U32 => Format::CU32,
            Format::F32 => Format::CF32,
            Format::F64 => Format::CF64,
            complex => complex,
        }
    }

    /// Number of real components per element (2 for complex formats).
    #[must_use]
    pub const fn components(self) -> usize {
        if self.is_complex() {
            2
        } else {
            1
        }
    }

    /// Size in bytes of one element.
    #[must_use]
    pub const fn size(self) -> usize {
        let scalar = match self.component() {
            Format::S8 | Format::U8 => 1,
            Format::S16 | Format::U16 => 2,
            Format::S32 | Format::U32 | Format::F32 => 4,
            _ => 8,
        };
        scalar * self.components()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

impl TryFrom<String> for Format {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.as_str().to_string()
    }
}

/// Looks up the element size of a format by its string identifier.
///
/// ```
/// use sampleconv_core::format::format_to_size;
///
/// assert_eq!(format_to_size("CS16").unwrap(), 4);
/// assert!(format_to_size("CS12").is_err());
/// ```
pub fn format_to_size(id: &str) -> Result<usize> {
    id.parse::<Format>().map(Format::size)
}
