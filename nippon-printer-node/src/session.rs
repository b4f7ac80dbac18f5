//! `NipponPrinter` class: an open-printer session for JavaScript callers
//!
//! Unlike the plain forwards, session methods throw when the vendor reports
//! a failure, and status words come back decoded.

use crate::error::{IntoNapi, usage};
use napi::Result;
use nippon_printer::{
    BridgeError, Information, JobOutcome, NipponPrinter, PrinterStatus, Receipt, TextOptions,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[napi(object)]
pub struct PrintResult {
    pub success: bool,
    pub job_id: u32,
    pub return_code: i32,
}

impl From<JobOutcome> for PrintResult {
    fn from(o: JobOutcome) -> Self {
        Self {
            success: o.success,
            job_id: o.job_id,
            return_code: o.return_code,
        }
    }
}

/// Decoded printer status
#[napi(object)]
pub struct StatusInfo {
    pub status: u32,
    pub online: bool,
    pub ready: bool,
    pub connected: bool,
    pub printing: bool,
    pub paper_near_end: bool,
    pub cover_open: bool,
    pub paper_out: bool,
    pub overheat: bool,
    pub error: bool,
    pub error_message: Option<String>,
    pub return_code: Option<i32>,
    pub raw_status: u32,
}

impl From<PrinterStatus> for StatusInfo {
    fn from(s: PrinterStatus) -> Self {
        Self {
            status: s.status,
            online: s.online,
            ready: s.ready,
            connected: s.connected,
            printing: s.printing,
            paper_near_end: s.paper_near_end,
            cover_open: s.cover_open,
            paper_out: s.paper_out,
            overheat: s.overheat,
            error: s.error,
            error_message: s.error_message,
            return_code: s.return_code,
            raw_status: s.raw_status,
        }
    }
}

#[napi(object)]
pub struct InformationInfo {
    pub data: String,
    pub timeout: u32,
    pub info_id: u32,
    pub truncated: bool,
}

impl From<Information> for InformationInfo {
    fn from(info: Information) -> Self {
        Self {
            data: info.data,
            timeout: info.timeout,
            info_id: u32::from(info.info_id),
            truncated: info.truncated,
        }
    }
}

fn from_json<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| usage(&format!("Invalid {what}: {e}")))
}

#[napi(js_name = "NipponPrinter")]
pub struct JsNipponPrinter {
    session: Option<NipponPrinter>,
}

#[napi]
impl JsNipponPrinter {
    /// The vendor library is loaded on the first `open`
    #[napi(constructor)]
    pub fn new() -> Self {
        Self { session: None }
    }

    #[napi]
    pub fn enumerate_printers() -> Result<Vec<String>> {
        crate::enumerate_printers()
    }

    #[napi(getter)]
    pub fn printer_name(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.printer_name())
            .map(str::to_string)
    }

    #[napi(getter)]
    pub fn is_open(&self) -> bool {
        self.session.as_ref().is_some_and(NipponPrinter::is_open)
    }

    fn session(&self) -> Result<&NipponPrinter> {
        self.session
            .as_ref()
            .filter(|s| s.is_open())
            .ok_or(BridgeError::NotOpen)
            .into_napi()
    }

    /// Open a printer by name or IP address
    #[napi]
    pub fn open(&mut self, printer_name: Option<String>) -> Result<bool> {
        let name = crate::printer_name(printer_name, crate::NAME_EXPECTED)?;
        let mut session = match self.session.take() {
            Some(session) => session,
            None => NipponPrinter::shared().into_napi()?,
        };
        let opened = session.open(&name);
        self.session = Some(session);
        opened.into_napi()?;
        Ok(true)
    }

    #[napi]
    pub fn close(&mut self) -> Result<bool> {
        match self.session.as_mut() {
            Some(session) => session.close().into_napi(),
            None => Ok(true),
        }
    }

    /// Send raw data (may include ESC/POS commands)
    #[napi]
    pub fn print(&self, data: String) -> Result<PrintResult> {
        self.session()?.print_sync(data).map(Into::into).into_napi()
    }

    /// `options` follows `TextOptions`: `feed` takes a count or `true`
    #[napi]
    pub fn print_text(&self, text: String, options: Option<Value>) -> Result<PrintResult> {
        let session = self.session()?;
        let options: TextOptions = match options {
            Some(value) => from_json(value, "text options")?,
            None => TextOptions::default(),
        };
        session.print_text(&text, &options).map(Into::into).into_napi()
    }

    #[napi]
    pub fn print_receipt(&self, receipt: Value) -> Result<PrintResult> {
        let session = self.session()?;
        let receipt: Receipt = from_json(receipt, "receipt")?;
        session.print_receipt(&receipt).map(Into::into).into_napi()
    }

    #[napi]
    pub fn get_status(&self) -> Result<StatusInfo> {
        self.session()?.status().map(Into::into).into_napi()
    }

    #[napi]
    pub fn get_information(&self, info_id: u32) -> Result<InformationInfo> {
        let session = self.session()?;
        let info_id = u8::try_from(info_id)
            .map_err(|_| {
                BridgeError::InvalidArgument(format!("info id {} is outside 0..=255", info_id))
            })
            .into_napi()?;
        session.information(info_id).map(Into::into).into_napi()
    }

    #[napi]
    pub fn get_device_info(&self) -> Result<String> {
        self.session()?.device_info().into_napi()
    }

    #[napi]
    pub fn get_firmware_version(&self) -> Result<String> {
        self.session()?.firmware_version().into_napi()
    }

    #[napi]
    pub fn get_serial_number(&self) -> Result<String> {
        self.session()?.serial_number().into_napi()
    }

    #[napi]
    pub fn get_model_name(&self) -> Result<String> {
        self.session()?.model_name().into_napi()
    }

    #[napi]
    pub fn reset(&self) -> Result<bool> {
        self.session()?.reset().into_napi()
    }

    /// Start a multi-command document, returning its job id
    #[napi]
    pub fn start_doc(&self) -> Result<u32> {
        self.session()?.start_doc().into_napi()
    }

    #[napi]
    pub fn end_doc(&self) -> Result<bool> {
        self.session()?.end_doc().into_napi()
    }

    #[napi]
    pub fn cancel_doc(&self) -> Result<bool> {
        self.session()?.cancel_doc().into_napi()
    }
}

impl Default for JsNipponPrinter {
    fn default() -> Self {
        Self::new()
    }
}
