//! # nippon-printer
//!
//! Bridge to the Nippon thermal printer driver library (`NPrinterLib.dll`).
//!
//! ## Scope
//!
//! This crate only forwards calls. Device I/O, spooling and status handling
//! all live inside the vendor library:
//! - Lazy, once-per-process loading with per-export capability checks
//! - UTF-16 printer names, raw byte print payloads
//! - Vendor return codes passed through as opaque integers
//! - A session wrapper with status decoding and payload builders
//!
//! ## Example
//!
//! ```ignore
//! use nippon_printer::{Bridge, NipponPrinter, Receipt};
//!
//! let bridge = Bridge::shared()?;
//! for name in bridge.enumerate_printers()? {
//!     println!("{name}");
//! }
//!
//! let outcome = bridge.print("NP-3511", "1B40\"Hello\"0A")?;
//! if !outcome.success {
//!     eprintln!("vendor code {}", outcome.return_code);
//! }
//!
//! let mut printer = NipponPrinter::new(bridge);
//! printer.open("NP-3511")?;
//! printer.print_receipt(&receipt)?;
//! printer.close()?;
//! ```

mod bridge;
mod config;
mod error;
mod escpos;
mod loader;
mod outcome;
mod printer;
mod status;
mod wide;

// Re-exports
pub use bridge::{Bridge, ensure_loaded};
pub use config::{
    BridgeConfig, DEFAULT_INFO_BUFFER_SIZE, DEFAULT_INFO_TIMEOUT, DEFAULT_LIBRARY_NAME,
};
pub use error::{BridgeError, BridgeResult};
pub use escpos::{
    Align, Cut, DEFAULT_FEED_LINES, DEFAULT_RECEIPT_WIDTH, EscPosBuilder, Feed, Price, Receipt,
    ReceiptItem, TextOptions, format_receipt_line, render_text,
};
pub use loader::{EntryPoint, EntryPoints, VendorLibrary, loaded_library};
pub use outcome::{CallOutcome, InformationOutcome, JobOutcome, StatusOutcome};
pub use printer::{
    INFO_DEVICE, INFO_FIRMWARE_VERSION, INFO_MODEL_NAME, INFO_SERIAL_NUMBER, Information,
    NipponPrinter, Printer,
};
pub use status::{PrinterStatus, StatusFlags};
pub use wide::{from_wide, split_printer_list, to_wide};

/// Function-pointer prototypes of the vendor exports
pub mod ffi {
    pub use crate::loader::{
        NBarcode2Fn, NBarcodeSettingsFn, NCancelDocFn, NClosePrinterFn, NClosePrintersFn,
        NEndDocFn, NEnumPrintersFn, NGetInformationFn, NGetStatusFn, NImagePrintFn,
        NOpenPrinterFn, NPrintFn, NResetPrinterFn, NStartDocFn,
    };
}
