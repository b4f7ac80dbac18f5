//! Printer session on top of the bridge
//!
//! [`NipponPrinter`] remembers which printer is open and turns vendor
//! failures into errors, which is what application code usually wants.

use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::escpos::{Receipt, TextOptions, render_text};
use crate::outcome::JobOutcome;
use crate::status::PrinterStatus;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Information category: model name
pub const INFO_MODEL_NAME: u8 = 2;
/// Information category: device information
pub const INFO_DEVICE: u8 = 10;
/// Information category: firmware version
pub const INFO_FIRMWARE_VERSION: u8 = 11;
/// Information category: serial number
pub const INFO_SERIAL_NUMBER: u8 = 12;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw data to the printer, returning the job id
    async fn print(&self, data: &[u8]) -> BridgeResult<u32>;

    /// Check if the printer is online
    async fn is_online(&self) -> bool;
}

/// Successful information query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Information {
    pub data: String,
    pub timeout: u32,
    pub info_id: u8,
    pub truncated: bool,
}

/// A single Nippon printer session
#[derive(Debug, Clone)]
pub struct NipponPrinter {
    bridge: Bridge,
    printer_name: Option<String>,
}

impl NipponPrinter {
    pub fn new(bridge: Bridge) -> Self {
        Self {
            bridge,
            printer_name: None,
        }
    }

    /// Session over the process-wide bridge
    pub fn shared() -> BridgeResult<Self> {
        Ok(Self::new(Bridge::shared()?))
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn enumerate_printers(&self) -> BridgeResult<Vec<String>> {
        self.bridge.enumerate_printers()
    }

    /// Current printer name (None if not open)
    pub fn printer_name(&self) -> Option<&str> {
        self.printer_name.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.printer_name.is_some()
    }

    fn name(&self) -> BridgeResult<&str> {
        self.printer_name.as_deref().ok_or(BridgeError::NotOpen)
    }

    /// Open a printer by name or IP address
    #[instrument(skip(self))]
    pub fn open(&mut self, printer_name: &str) -> BridgeResult<()> {
        let outcome = self.bridge.open_printer(printer_name)?;
        if !outcome.success {
            return Err(BridgeError::Vendor {
                operation: "Open",
                code: outcome.return_code,
            });
        }
        info!("Printer opened");
        self.printer_name = Some(printer_name.to_string());
        Ok(())
    }

    /// Close the session; closing a session that is not open succeeds
    #[instrument(skip(self), fields(printer = ?self.printer_name))]
    pub fn close(&mut self) -> BridgeResult<bool> {
        let Some(name) = self.printer_name.as_deref() else {
            return Ok(true);
        };
        let outcome = self.bridge.close_printer(name)?;
        if !outcome.success {
            warn!(return_code = outcome.return_code, "Close reported failure");
        }
        self.printer_name = None;
        Ok(outcome.success)
    }

    /// Send raw data (may include ESC/POS commands) synchronously
    pub fn print_sync(&self, data: impl AsRef<[u8]>) -> BridgeResult<JobOutcome> {
        let outcome = self.bridge.print(self.name()?, data)?;
        if !outcome.success {
            return Err(BridgeError::Vendor {
                operation: "Print",
                code: outcome.return_code,
            });
        }
        Ok(outcome)
    }

    /// Print formatted text using the vendor command-string notation
    pub fn print_text(&self, text: &str, options: &TextOptions) -> BridgeResult<JobOutcome> {
        self.name()?;
        self.print_sync(render_text(text, options))
    }

    pub fn print_receipt(&self, receipt: &Receipt) -> BridgeResult<JobOutcome> {
        self.name()?;
        self.print_sync(receipt.render())
    }

    /// Query and decode the printer status
    pub fn status(&self) -> BridgeResult<PrinterStatus> {
        let outcome = self.bridge.get_status(self.name()?)?;
        Ok(PrinterStatus::from_outcome(outcome))
    }

    pub fn information(&self, info_id: u8) -> BridgeResult<Information> {
        let outcome = self
            .bridge
            .get_information(self.name()?, u32::from(info_id))?;
        match (outcome.success, outcome.data, outcome.timeout) {
            (true, Some(data), Some(timeout)) => Ok(Information {
                data,
                timeout,
                info_id,
                truncated: outcome.truncated,
            }),
            _ => Err(BridgeError::Vendor {
                operation: "Get information",
                code: outcome.return_code,
            }),
        }
    }

    pub fn device_info(&self) -> BridgeResult<String> {
        self.information(INFO_DEVICE).map(|info| info.data)
    }

    pub fn firmware_version(&self) -> BridgeResult<String> {
        self.information(INFO_FIRMWARE_VERSION).map(|info| info.data)
    }

    pub fn serial_number(&self) -> BridgeResult<String> {
        self.information(INFO_SERIAL_NUMBER).map(|info| info.data)
    }

    pub fn model_name(&self) -> BridgeResult<String> {
        self.information(INFO_MODEL_NAME).map(|info| info.data)
    }

    /// Reset printer to default state
    pub fn reset(&self) -> BridgeResult<bool> {
        Ok(self.bridge.reset_printer(self.name()?)?.success)
    }

    /// Start a multi-command document, returning its job id
    pub fn start_doc(&self) -> BridgeResult<u32> {
        let outcome = self.bridge.start_document(self.name()?)?;
        if !outcome.success {
            return Err(BridgeError::Vendor {
                operation: "Start doc",
                code: outcome.return_code,
            });
        }
        Ok(outcome.job_id)
    }

    pub fn end_doc(&self) -> BridgeResult<bool> {
        Ok(self.bridge.end_document(self.name()?)?.success)
    }

    pub fn cancel_doc(&self) -> BridgeResult<bool> {
        Ok(self.bridge.cancel_document(self.name()?)?.success)
    }
}

impl Printer for NipponPrinter {
    async fn print(&self, data: &[u8]) -> BridgeResult<u32> {
        // Vendor calls block, run them off the async runtime
        let session = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || session.print_sync(&data).map(|o| o.job_id))
            .await
            .map_err(|e| BridgeError::Join(e.to_string()))?
    }

    async fn is_online(&self) -> bool {
        let session = self.clone();
        match tokio::task::spawn_blocking(move || session.status()).await {
            Ok(Ok(status)) => status.online,
            Ok(Err(e)) => {
                warn!(error = %e, "Status query failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Status task failed");
                false
            }
        }
    }
}
