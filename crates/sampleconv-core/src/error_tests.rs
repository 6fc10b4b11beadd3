//! Tests for `error` module.

use super::error::*;
use crate::format::Format;
use crate::registry::FunctionPriority;

#[test]
fn test_not_found_display_with_priority() {
    let err = Error::ConverterNotFound {
        from: Format::S16,
        to: Format::F64,
        priority: Some(FunctionPriority::Generic),
    };
    assert_eq!(
        err.to_string(),
        "no converter registered for S16 -> F64 at priority GENERIC"
    );
}

#[test]
fn test_not_found_display_best_available() {
    let err = Error::ConverterNotFound {
        from: Format::CU8,
        to: Format::CF32,
        priority: None,
    };
    assert_eq!(err.to_string(), "no converter registered for CU8 -> CF32");
}

#[test]
fn test_unknown_format_display() {
    let err = Error::UnknownFormat("CS12".to_string());
    assert_eq!(err.to_string(), "unknown sample format: \"CS12\"");
}

#[test]
fn test_error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}
