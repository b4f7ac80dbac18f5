//! Error types for the printer bridge

use crate::loader::EntryPoint;
use thiserror::Error;

/// Bridge error types
///
/// Non-zero vendor return codes from individual forwards are not errors;
/// they travel in the outcome structs. Only the session layer
/// ([`NipponPrinter`](crate::NipponPrinter)) raises [`BridgeError::Vendor`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or malformed argument, raised before any vendor call
    #[error("{0}")]
    Usage(String),

    /// Argument outside the range the vendor call accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The vendor library could not be loaded
    #[error("Failed to load {name}: {source}")]
    LibraryUnavailable {
        name: String,
        #[source]
        source: libloading::Error,
    },

    /// The library is loaded but a required entry point is not
    #[error("NPrinterLib not available: {0} not resolved")]
    EntryPointUnavailable(EntryPoint),

    /// Second enumeration call failed after a successful size query
    #[error("Failed to enumerate printers (code {code})")]
    Enumeration { code: i32 },

    /// Session operation without an open printer
    #[error("Printer not open")]
    NotOpen,

    /// Vendor call reported a non-zero code (session layer only)
    #[error("{operation} failed with code {code}")]
    Vendor { operation: &'static str, code: i32 },

    /// Blocking task could not be joined
    #[error("Task join failed: {0}")]
    Join(String),
}

impl BridgeError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Whether the caller passed bad input
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::InvalidArgument(_))
    }

    /// Whether the library or an entry point is missing on this machine
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::LibraryUnavailable { .. } | Self::EntryPointUnavailable(_)
        )
    }

    /// Raw vendor code, if this error carries one
    pub fn vendor_code(&self) -> Option<i32> {
        match self {
            Self::Enumeration { code } | Self::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
