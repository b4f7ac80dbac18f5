//! Bridge configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | NPRINTER_LIBRARY | NPrinterLib.dll | Library name or path passed to the loader |
//! | NPRINTER_INFO_BUFFER_SIZE | 65536 | Scratch buffer handed to `NGetInformation` |
//! | NPRINTER_INFO_TIMEOUT_MS | 5000 | Initial timeout value for `NGetInformation` |

/// Discovery name of the vendor library.
pub const DEFAULT_LIBRARY_NAME: &str = "NPrinterLib.dll";

/// Scratch buffer size for information queries (64 KiB).
///
/// The vendor call receives no length, so this is a ceiling rather than a
/// negotiated size.
pub const DEFAULT_INFO_BUFFER_SIZE: usize = 64 * 1024;

/// Initial timeout handed to `NGetInformation`, in vendor units (milliseconds).
pub const DEFAULT_INFO_TIMEOUT: u32 = 5000;

/// Configuration for a [`Bridge`](crate::Bridge)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Library name resolved through the standard system search path
    pub library_name: String,
    /// Size of the information query scratch buffer in bytes
    pub info_buffer_size: usize,
    /// Initial in/out timeout for information queries
    pub info_timeout: u32,
}

impl BridgeConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            library_name: std::env::var("NPRINTER_LIBRARY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LIBRARY_NAME.into()),
            info_buffer_size: std::env::var("NPRINTER_INFO_BUFFER_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(DEFAULT_INFO_BUFFER_SIZE),
            info_timeout: std::env::var("NPRINTER_INFO_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INFO_TIMEOUT),
        }
    }

    /// Override the library name or path
    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = name.into();
        self
    }

    /// Override the information buffer ceiling
    pub fn with_info_buffer_size(mut self, size: usize) -> Self {
        self.info_buffer_size = size.max(1);
        self
    }

    /// Override the initial information timeout
    pub fn with_info_timeout(mut self, timeout: u32) -> Self {
        self.info_timeout = timeout;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.into(),
            info_buffer_size: DEFAULT_INFO_BUFFER_SIZE,
            info_timeout: DEFAULT_INFO_TIMEOUT,
        }
    }
}
