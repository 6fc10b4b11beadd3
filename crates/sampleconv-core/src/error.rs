//! Error types for sampleconv.

use thiserror::Error;

use crate::format::Format;
use crate::registry::FunctionPriority;

/// Errors raised by the registry, the conversion functions and the harnesses.
#[derive(Error, Debug)]
pub enum Error {
    /// No converter is registered for the pair (at the requested tier, if any).
    #[error("no converter registered for {from} -> {to}{}", format_priority(.priority))]
    ConverterNotFound {
        /// Source format.
        from: Format,
        /// Destination format.
        to: Format,
        /// Requested tier, `None` for a best-available lookup.
        priority: Option<FunctionPriority>,
    },

    /// A format identifier that is not part of the catalog.
    #[error("unknown sample format: {0:?}")]
    UnknownFormat(String),

    /// Buffer, count or scalar arguments violate the conversion contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The registry refused an entry.
    #[error("registration rejected for {from} -> {to}: {reason}")]
    RegistrationRejected {
        /// Source format.
        from: Format,
        /// Destination format.
        to: Format,
        /// Why the entry was refused.
        reason: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_priority(priority: &Option<FunctionPriority>) -> String {
    priority.map_or_else(String::new, |p| format!(" at priority {p}"))
}

/// Result type alias for sampleconv operations.
pub type Result<T> = std::result::Result<T, Error>;
