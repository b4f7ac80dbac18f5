//! # nippon-printer-node
//!
//! Node-API addon exposing the NPrinterLib bridge to JavaScript.
//!
//! Every export is a synchronous request/response call. Argument problems
//! throw before the vendor library is touched; a missing library or entry
//! point throws; vendor return codes come back in the result object.
//!
//! The `NipponPrinter` class wraps the same calls in an open-printer
//! session with decoded status and text/receipt printing.

#[macro_use]
extern crate napi_derive;

mod error;
mod logging;
mod session;

use error::{IntoNapi, usage};
use napi::Result;
use nippon_printer::{
    Bridge, CallOutcome, EntryPoint, InformationOutcome, JobOutcome, StatusOutcome,
};

pub use logging::init_logging;
pub use session::JsNipponPrinter;

#[napi(object)]
pub struct CallResult {
    pub success: bool,
    pub return_code: i32,
}

impl From<CallOutcome> for CallResult {
    fn from(o: CallOutcome) -> Self {
        Self {
            success: o.success,
            return_code: o.return_code,
        }
    }
}

#[napi(object)]
pub struct JobResult {
    pub success: bool,
    pub return_code: i32,
    pub job_id: u32,
}

impl From<JobOutcome> for JobResult {
    fn from(o: JobOutcome) -> Self {
        Self {
            success: o.success,
            return_code: o.return_code,
            job_id: o.job_id,
        }
    }
}

#[napi(object)]
pub struct StatusResult {
    pub success: bool,
    pub return_code: i32,
    pub status: u32,
}

impl From<StatusOutcome> for StatusResult {
    fn from(o: StatusOutcome) -> Self {
        Self {
            success: o.success,
            return_code: o.return_code,
            status: o.status,
        }
    }
}

#[napi(object)]
pub struct InformationResult {
    pub success: bool,
    pub return_code: i32,
    pub data: Option<String>,
    pub timeout: Option<u32>,
    /// Payload filled the whole scratch buffer
    pub truncated: bool,
}

impl From<InformationOutcome> for InformationResult {
    fn from(o: InformationOutcome) -> Self {
        Self {
            success: o.success,
            return_code: o.return_code,
            data: o.data,
            timeout: o.timeout,
            truncated: o.truncated,
        }
    }
}

const NAME_EXPECTED: &str = "String expected for printer name";

fn printer_name(arg: Option<String>, message: &str) -> Result<String> {
    match arg {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(usage(message)),
    }
}

fn bridge() -> Result<Bridge> {
    Bridge::shared().into_napi()
}

/// Printer names reported by the vendor library
#[napi]
pub fn enumerate_printers() -> Result<Vec<String>> {
    bridge()?.enumerate_printers().into_napi()
}

#[napi]
pub fn open_printer(printer_name: Option<String>) -> Result<CallResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.open_printer(&name).map(Into::into).into_napi()
}

#[napi]
pub fn close_printer(printer_name: Option<String>) -> Result<CallResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.close_printer(&name).map(Into::into).into_napi()
}

#[napi]
pub fn close_all_printers() -> Result<CallResult> {
    bridge()?.close_all_printers().map(Into::into).into_napi()
}

/// Send `data` as UTF-8 bytes, unchanged
#[napi]
pub fn print(printer_name: Option<String>, data: Option<String>) -> Result<JobResult> {
    const EXPECTED: &str = "Printer name and data expected";
    let name = self::printer_name(printer_name, EXPECTED)?;
    let data = data.ok_or_else(|| usage(EXPECTED))?;
    bridge()?.print(&name, data).map(Into::into).into_napi()
}

#[napi]
pub fn get_status(printer_name: Option<String>) -> Result<StatusResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.get_status(&name).map(Into::into).into_napi()
}

#[napi]
pub fn get_information(
    printer_name: Option<String>,
    info_id: Option<u32>,
) -> Result<InformationResult> {
    const EXPECTED: &str = "Printer name and info ID expected";
    let name = self::printer_name(printer_name, EXPECTED)?;
    let info_id = info_id.ok_or_else(|| usage(EXPECTED))?;
    bridge()?
        .get_information(&name, info_id)
        .map(Into::into)
        .into_napi()
}

#[napi]
pub fn reset_printer(printer_name: Option<String>) -> Result<CallResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.reset_printer(&name).map(Into::into).into_napi()
}

#[napi]
pub fn start_doc(printer_name: Option<String>) -> Result<JobResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.start_document(&name).map(Into::into).into_napi()
}

#[napi]
pub fn end_doc(printer_name: Option<String>) -> Result<CallResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.end_document(&name).map(Into::into).into_napi()
}

#[napi]
pub fn cancel_doc(printer_name: Option<String>) -> Result<CallResult> {
    let name = self::printer_name(printer_name, NAME_EXPECTED)?;
    bridge()?.cancel_document(&name).map(Into::into).into_napi()
}

/// Load the library if needed; false when it or a mandatory export is missing
#[napi]
pub fn is_available() -> bool {
    nippon_printer::ensure_loaded()
}

/// Symbol names the loaded library exports
#[napi]
pub fn available_entry_points() -> Result<Vec<String>> {
    let bridge = bridge()?;
    Ok(bridge
        .library()
        .available_entry_points()
        .into_iter()
        .map(|entry: EntryPoint| entry.symbol().to_string())
        .collect())
}
