//! Text marshaling between Rust strings and the vendor's encodings
//!
//! NPrinterLib takes printer names as NUL-terminated UTF-16 (`PWCHAR`) and
//! answers information queries with NUL-terminated narrow text.

use crate::error::{BridgeError, BridgeResult};
use widestring::{U16CString, U16Str};

/// Delimiter between printer names in the `NEnumPrinters` buffer
///
/// There is no escaping, so a printer name containing a comma cannot be
/// recovered from the list.
pub const PRINTER_LIST_DELIMITER: u16 = b',' as u16;

/// Convert a printer name to a NUL-terminated wide string
///
/// Any NUL in `s` is a usage error, trailing ones included.
pub fn to_wide(s: &str) -> BridgeResult<U16CString> {
    const NUL_IN_NAME: &str = "Printer name must not contain NUL characters";
    if s.contains('\0') {
        return Err(BridgeError::usage(NUL_IN_NAME));
    }
    U16CString::from_str(s).map_err(|_| BridgeError::usage(NUL_IN_NAME))
}

/// Convert wide characters (without terminator) back to UTF-8
pub fn from_wide(s: &[u16]) -> String {
    U16Str::from_slice(s).to_string_lossy()
}

/// Split the enumeration buffer into printer names
///
/// Reads up to the first NUL (or the end of the buffer), splits on commas
/// and drops empty segments, keeping the vendor's order.
pub fn split_printer_list(buf: &[u16]) -> Vec<String> {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());

    buf[..end]
        .split(|&c| c == PRINTER_LIST_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(from_wide)
        .collect()
}

/// Extract NUL-terminated narrow text from a scratch buffer
///
/// Returns the text and whether the buffer held no terminator at all, in
/// which case the whole buffer is returned.
pub fn narrow_until_nul(buf: &[u8]) -> (String, bool) {
    match buf.iter().position(|&b| b == 0) {
        Some(end) => (String::from_utf8_lossy(&buf[..end]).into_owned(), false),
        None => (String::from_utf8_lossy(buf).into_owned(), true),
    }
}
