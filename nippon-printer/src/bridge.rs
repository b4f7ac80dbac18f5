//! Forwarding calls into NPrinterLib
//!
//! Every operation validates its arguments, checks that the library is
//! usable and the entry point resolved, converts the printer name to UTF-16
//! and forwards once. Vendor calls run without any bridge lock held, so a
//! call blocked on one printer never stalls calls on another.
//!
//! Whether NPrinterLib itself tolerates concurrent calls is the vendor's
//! contract and is not enforced here.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::loader::{self, EntryPoint, VendorLibrary};
use crate::outcome::{CallOutcome, InformationOutcome, JobOutcome, StatusOutcome};
use crate::wide::{narrow_until_nul, split_printer_list, to_wide};
use std::ffi::{c_char, c_void};
use std::ptr;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument, warn};
use widestring::U16CString;

static SHARED_CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

/// `NOpenPrinter` always requests exclusive access
const OPEN_EXCLUSIVE: i32 = 1;

/// Handle to a loaded vendor library
///
/// Cheap to clone; all clones share the same library and configuration.
#[derive(Debug, Clone)]
pub struct Bridge {
    library: Arc<VendorLibrary>,
    config: Arc<BridgeConfig>,
}

impl Bridge {
    /// Build a bridge over an already loaded library
    pub fn new(library: VendorLibrary, config: BridgeConfig) -> Self {
        Self::with_library(Arc::new(library), config)
    }

    pub fn with_library(library: Arc<VendorLibrary>, config: BridgeConfig) -> Self {
        Self {
            library,
            config: Arc::new(config),
        }
    }

    /// Load a private copy of the library described by `config`
    pub fn load(config: BridgeConfig) -> BridgeResult<Self> {
        let library = VendorLibrary::load(&config.library_name)?;
        Ok(Self::new(library, config))
    }

    /// The process-wide bridge
    ///
    /// Configuration is read from the environment on first use; the library
    /// is loaded once and kept for the life of the process.
    pub fn shared() -> BridgeResult<Self> {
        let config = SHARED_CONFIG.get_or_init(BridgeConfig::from_env).clone();
        let library = loader::shared_library(&config.library_name)?;
        Ok(Self::with_library(library, config))
    }

    pub fn library(&self) -> &VendorLibrary {
        &self.library
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether an operation can be forwarded on this machine
    pub fn is_available(&self, entry: EntryPoint) -> bool {
        self.library.has_mandatory() && self.library.is_available(entry)
    }

    /// Check library usability, then return the requested entry point
    fn entry<T: Copy>(&self, entry: EntryPoint, resolved: Option<T>) -> BridgeResult<T> {
        if let Some(missing) = self.library.missing_mandatory() {
            return Err(BridgeError::EntryPointUnavailable(missing));
        }
        resolved.ok_or(BridgeError::EntryPointUnavailable(entry))
    }

    /// List printer names known to the vendor library
    ///
    /// A size query that fails or reports zero yields an empty list; a
    /// failure on the fill call after a good size query is an error.
    #[instrument(level = "debug", skip(self))]
    pub fn enumerate_printers(&self) -> BridgeResult<Vec<String>> {
        let enum_printers = self.entry(
            EntryPoint::EnumPrinters,
            self.library.entry_points().enum_printers,
        )?;

        let mut size: i32 = 0;
        // SAFETY: a null buffer asks only for the required size
        let ret = unsafe { enum_printers(ptr::null_mut(), &mut size) };
        if ret != 0 || size <= 0 {
            debug!(return_code = ret, size, "No printer list available");
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u16; size as usize];
        // SAFETY: buffer holds exactly `size` wide characters
        let ret = unsafe { enum_printers(buffer.as_mut_ptr(), &mut size) };
        if ret != 0 {
            return Err(BridgeError::Enumeration { code: ret });
        }

        let printers = split_printer_list(&buffer);
        debug!(count = printers.len(), "Enumerated printers");
        Ok(printers)
    }

    /// Open a printer with exclusive access
    #[instrument(level = "debug", skip(self))]
    pub fn open_printer(&self, printer_name: &str) -> BridgeResult<CallOutcome> {
        let name = printer_name_arg(printer_name)?;
        let open = self.entry(
            EntryPoint::OpenPrinter,
            self.library.entry_points().open_printer,
        )?;

        // SAFETY: name is NUL-terminated and outlives the call
        let ret = unsafe { open(wide_ptr(&name), OPEN_EXCLUSIVE, ptr::null_mut()) };
        debug!(return_code = ret, "NOpenPrinter");
        Ok(CallOutcome::from_code(ret))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn close_printer(&self, printer_name: &str) -> BridgeResult<CallOutcome> {
        let name = printer_name_arg(printer_name)?;
        let close = self.entry(
            EntryPoint::ClosePrinter,
            self.library.entry_points().close_printer,
        )?;

        // SAFETY: name is NUL-terminated and outlives the call
        let ret = unsafe { close(wide_ptr(&name)) };
        debug!(return_code = ret, "NClosePrinter");
        Ok(CallOutcome::from_code(ret))
    }

    /// Close every printer the vendor library holds open
    #[instrument(level = "debug", skip(self))]
    pub fn close_all_printers(&self) -> BridgeResult<CallOutcome> {
        let close_all = self.entry(
            EntryPoint::ClosePrinters,
            self.library.entry_points().close_printers,
        )?;

        // SAFETY: takes no arguments
        let ret = unsafe { close_all() };
        debug!(return_code = ret, "NClosePrinters");
        Ok(CallOutcome::from_code(ret))
    }

    /// Send a raw payload
    ///
    /// The bytes go through unchanged (no wide conversion) and the declared
    /// length is exactly `data.len()`; a NUL is appended past that length
    /// for vendors that read the payload as a C string.
    #[instrument(level = "debug", skip(self, data), fields(data_len = data.as_ref().len()))]
    pub fn print(&self, printer_name: &str, data: impl AsRef<[u8]>) -> BridgeResult<JobOutcome> {
        let data = data.as_ref();
        let name = printer_name_arg(printer_name)?;
        let length = u32::try_from(data.len()).map_err(|_| {
            BridgeError::InvalidArgument(format!("payload of {} bytes is too large", data.len()))
        })?;
        let print = self.entry(EntryPoint::Print, self.library.entry_points().print)?;

        let mut payload = Vec::with_capacity(data.len() + 1);
        payload.extend_from_slice(data);
        payload.push(0);

        let mut job_id: u32 = 0;
        // SAFETY: payload holds `length` bytes plus a terminator
        let ret = unsafe {
            print(
                wide_ptr(&name),
                payload.as_mut_ptr() as *mut c_char,
                length,
                &mut job_id,
            )
        };
        debug!(return_code = ret, job_id, "NPrint");
        Ok(JobOutcome::new(ret, job_id))
    }

    /// Query the opaque vendor status word
    #[instrument(level = "debug", skip(self))]
    pub fn get_status(&self, printer_name: &str) -> BridgeResult<StatusOutcome> {
        let name = printer_name_arg(printer_name)?;
        let get_status = self.entry(
            EntryPoint::GetStatus,
            self.library.entry_points().get_status,
        )?;

        let mut status: u32 = 0;
        // SAFETY: name is NUL-terminated, status is a valid out pointer
        let ret = unsafe { get_status(wide_ptr(&name), &mut status) };
        debug!(return_code = ret, status, "NGetStatus");
        Ok(StatusOutcome::new(ret, status))
    }

    /// Query a vendor information category
    ///
    /// The vendor writes into a zeroed scratch buffer of
    /// `config.info_buffer_size` bytes without being told its size; if no
    /// terminator is left inside it the result is flagged `truncated`.
    #[instrument(level = "debug", skip(self))]
    pub fn get_information(
        &self,
        printer_name: &str,
        info_id: u32,
    ) -> BridgeResult<InformationOutcome> {
        let name = printer_name_arg(printer_name)?;
        let info_id = u8::try_from(info_id).map_err(|_| {
            BridgeError::InvalidArgument(format!("info id {} is outside 0..=255", info_id))
        })?;
        let get_information = self.entry(
            EntryPoint::GetInformation,
            self.library.entry_points().get_information,
        )?;

        let mut buffer = vec![0u8; self.config.info_buffer_size];
        let mut timeout = self.config.info_timeout;
        // SAFETY: buffer is writable for info_buffer_size bytes
        let ret = unsafe {
            get_information(
                wide_ptr(&name),
                info_id,
                buffer.as_mut_ptr() as *mut c_void,
                &mut timeout,
            )
        };
        debug!(return_code = ret, timeout, "NGetInformation");

        if ret != 0 {
            return Ok(InformationOutcome::failed(ret));
        }

        let (data, truncated) = narrow_until_nul(&buffer);
        if truncated {
            warn!(
                info_id,
                buffer_size = buffer.len(),
                "Information payload filled the scratch buffer"
            );
        }

        Ok(InformationOutcome {
            success: true,
            return_code: ret,
            data: Some(data),
            timeout: Some(timeout),
            truncated,
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn reset_printer(&self, printer_name: &str) -> BridgeResult<CallOutcome> {
        let name = printer_name_arg(printer_name)?;
        let reset = self.entry(
            EntryPoint::ResetPrinter,
            self.library.entry_points().reset_printer,
        )?;

        // SAFETY: name is NUL-terminated; the reserved pointer is null
        let ret = unsafe { reset(wide_ptr(&name), ptr::null_mut()) };
        debug!(return_code = ret, "NResetPrinter");
        Ok(CallOutcome::from_code(ret))
    }

    /// Begin a multi-command document
    #[instrument(level = "debug", skip(self))]
    pub fn start_document(&self, printer_name: &str) -> BridgeResult<JobOutcome> {
        let name = printer_name_arg(printer_name)?;
        let start_doc = self.entry(
            EntryPoint::StartDoc,
            self.library.entry_points().start_doc,
        )?;

        let mut job_id: u32 = 0;
        // SAFETY: name is NUL-terminated, job_id is a valid out pointer
        let ret = unsafe { start_doc(wide_ptr(&name), &mut job_id) };
        debug!(return_code = ret, job_id, "NStartDoc");
        Ok(JobOutcome::new(ret, job_id))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn end_document(&self, printer_name: &str) -> BridgeResult<CallOutcome> {
        let name = printer_name_arg(printer_name)?;
        let end_doc = self.entry(EntryPoint::EndDoc, self.library.entry_points().end_doc)?;

        // SAFETY: name is NUL-terminated and outlives the call
        let ret = unsafe { end_doc(wide_ptr(&name)) };
        debug!(return_code = ret, "NEndDoc");
        Ok(CallOutcome::from_code(ret))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn cancel_document(&self, printer_name: &str) -> BridgeResult<CallOutcome> {
        let name = printer_name_arg(printer_name)?;
        let cancel_doc = self.entry(
            EntryPoint::CancelDoc,
            self.library.entry_points().cancel_doc,
        )?;

        // SAFETY: name is NUL-terminated and outlives the call
        let ret = unsafe { cancel_doc(wide_ptr(&name)) };
        debug!(return_code = ret, "NCancelDoc");
        Ok(CallOutcome::from_code(ret))
    }
}

/// Validate and convert a printer name argument
fn printer_name_arg(printer_name: &str) -> BridgeResult<U16CString> {
    if printer_name.is_empty() {
        return Err(BridgeError::usage("String expected for printer name"));
    }
    to_wide(printer_name)
}

/// The vendor prototypes take `PWCHAR` but never write through it
fn wide_ptr(name: &U16CString) -> *mut u16 {
    name.as_ptr() as *mut u16
}

/// Load the process-wide library if needed and report whether it is usable
///
/// A library that is missing `NEnumPrinters` or `NOpenPrinter` stays
/// cached and keeps reporting `false`.
pub fn ensure_loaded() -> bool {
    match Bridge::shared() {
        Ok(bridge) => bridge.library().has_mandatory(),
        Err(e) => {
            debug!(error = %e, "Vendor library not loaded");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::EntryPoints;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};
    use widestring::U16CStr;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open { name: String, exclusive: i32, options_null: bool },
        Close(String),
        CloseAll,
        Print { name: String, length: u32, bytes: Vec<u8> },
        Status(String),
        Information { name: String, info_id: u8, timeout: u32 },
        Reset { name: String, reserved_null: bool },
        StartDoc(String),
        EndDoc(String),
        CancelDoc(String),
    }

    thread_local! {
        static CALLS: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
    }

    fn record(call: Call) {
        CALLS.with(|calls| calls.borrow_mut().push(call));
    }

    fn take_calls() -> Vec<Call> {
        CALLS.with(|calls| calls.borrow_mut().drain(..).collect())
    }

    unsafe fn name_of(ptr: *mut u16) -> String {
        unsafe { U16CStr::from_ptr_str(ptr) }.to_string_lossy()
    }

    /// "fail-87" returns 87, "fail-neg" returns -1, anything else 0
    fn code_for(name: &str) -> i32 {
        match name {
            "fail-87" => 87,
            "fail-neg" => -1,
            _ => 0,
        }
    }

    unsafe fn fill_list(list: &str, buffer: *mut u16, size: *mut i32) -> i32 {
        let wide: Vec<u16> = list.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            if buffer.is_null() {
                *size = wide.len() as i32;
                return 0;
            }
            let n = wide.len().min(*size as usize);
            ptr::copy_nonoverlapping(wide.as_ptr(), buffer, n);
        }
        0
    }

    unsafe extern "system" fn enum_three(buffer: *mut u16, size: *mut i32) -> i32 {
        unsafe { fill_list("PrinterA,PrinterB,PrinterC", buffer, size) }
    }

    unsafe extern "system" fn enum_gaps(buffer: *mut u16, size: *mut i32) -> i32 {
        unsafe { fill_list("PrinterA,,PrinterB,", buffer, size) }
    }

    unsafe extern "system" fn enum_none(_buffer: *mut u16, size: *mut i32) -> i32 {
        unsafe { *size = 0 };
        0
    }

    unsafe extern "system" fn enum_size_error(_buffer: *mut u16, size: *mut i32) -> i32 {
        unsafe { *size = 32 };
        5
    }

    unsafe extern "system" fn enum_fill_fails(buffer: *mut u16, size: *mut i32) -> i32 {
        if buffer.is_null() {
            unsafe { *size = 16 };
            0
        } else {
            -7
        }
    }

    unsafe extern "system" fn open(name: *mut u16, exclusive: i32, options: *mut c_void) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        record(Call::Open {
            name,
            exclusive,
            options_null: options.is_null(),
        });
        code
    }

    unsafe extern "system" fn close(name: *mut u16) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        record(Call::Close(name));
        code
    }

    unsafe extern "system" fn close_all() -> i32 {
        record(Call::CloseAll);
        0
    }

    unsafe extern "system" fn print(
        name: *mut u16,
        data: *mut c_char,
        length: u32,
        job_id: *mut u32,
    ) -> i32 {
        let name = unsafe { name_of(name) };
        let bytes = unsafe { std::slice::from_raw_parts(data as *const u8, length as usize) };
        let code = code_for(&name);
        unsafe { *job_id = 7 };
        record(Call::Print {
            name,
            length,
            bytes: bytes.to_vec(),
        });
        code
    }

    unsafe extern "system" fn status(name: *mut u16, status: *mut u32) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        unsafe { *status = 0x81 };
        record(Call::Status(name));
        code
    }

    unsafe extern "system" fn information(
        name: *mut u16,
        info_id: u8,
        buffer: *mut c_void,
        timeout: *mut u32,
    ) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        let text: &[u8] = match info_id {
            11 => b"Ver 1.02",
            _ => b"NP-3511D",
        };
        unsafe {
            record(Call::Information {
                name,
                info_id,
                timeout: *timeout,
            });
            ptr::copy_nonoverlapping(text.as_ptr(), buffer as *mut u8, text.len());
            *timeout = 1200;
        }
        code
    }

    /// Writes 16 bytes and no terminator
    unsafe extern "system" fn information_full(
        _name: *mut u16,
        _info_id: u8,
        buffer: *mut c_void,
        _timeout: *mut u32,
    ) -> i32 {
        unsafe { ptr::write_bytes(buffer as *mut u8, b'X', 16) };
        0
    }

    unsafe extern "system" fn reset(name: *mut u16, reserved: *mut c_void) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        record(Call::Reset {
            name,
            reserved_null: reserved.is_null(),
        });
        code
    }

    unsafe extern "system" fn start_doc(name: *mut u16, job_id: *mut u32) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        unsafe { *job_id = 1001 };
        record(Call::StartDoc(name));
        code
    }

    unsafe extern "system" fn end_doc(name: *mut u16) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        record(Call::EndDoc(name));
        code
    }

    unsafe extern "system" fn cancel_doc(name: *mut u16) -> i32 {
        let name = unsafe { name_of(name) };
        let code = code_for(&name);
        record(Call::CancelDoc(name));
        code
    }

    fn full_table() -> EntryPoints {
        EntryPoints {
            enum_printers: Some(enum_three),
            open_printer: Some(open),
            close_printer: Some(close),
            close_printers: Some(close_all),
            print: Some(print),
            get_status: Some(status),
            get_information: Some(information),
            reset_printer: Some(reset),
            start_doc: Some(start_doc),
            end_doc: Some(end_doc),
            cancel_doc: Some(cancel_doc),
            ..Default::default()
        }
    }

    fn bridge_with(entry_points: EntryPoints) -> Bridge {
        Bridge::new(
            VendorLibrary::from_entry_points("mock", entry_points),
            BridgeConfig::default(),
        )
    }

    fn bridge() -> Bridge {
        take_calls();
        bridge_with(full_table())
    }

    #[test]
    fn test_enumerate_printers() {
        let bridge = bridge();
        assert_eq!(
            bridge.enumerate_printers().unwrap(),
            vec!["PrinterA", "PrinterB", "PrinterC"]
        );
    }

    #[test]
    fn test_enumerate_drops_empty_segments() {
        let bridge = bridge_with(EntryPoints {
            enum_printers: Some(enum_gaps),
            ..full_table()
        });
        assert_eq!(
            bridge.enumerate_printers().unwrap(),
            vec!["PrinterA", "PrinterB"]
        );
    }

    #[test]
    fn test_enumerate_zero_size_is_empty() {
        let bridge = bridge_with(EntryPoints {
            enum_printers: Some(enum_none),
            ..full_table()
        });
        assert!(bridge.enumerate_printers().unwrap().is_empty());

        let bridge = bridge_with(EntryPoints {
            enum_printers: Some(enum_size_error),
            ..full_table()
        });
        assert!(bridge.enumerate_printers().unwrap().is_empty());
    }

    #[test]
    fn test_enumerate_fill_failure_is_error() {
        let bridge = bridge_with(EntryPoints {
            enum_printers: Some(enum_fill_fails),
            ..full_table()
        });
        let err = bridge.enumerate_printers().unwrap_err();
        assert!(matches!(err, BridgeError::Enumeration { code: -7 }));
    }

    #[test]
    fn test_open_passes_exclusive_flag() {
        let bridge = bridge();
        let outcome = bridge.open_printer("NP-3511").unwrap();
        assert_eq!(
            outcome,
            CallOutcome {
                success: true,
                return_code: 0
            }
        );
        assert_eq!(
            take_calls(),
            vec![Call::Open {
                name: "NP-3511".into(),
                exclusive: 1,
                options_null: true
            }]
        );
    }

    #[test]
    fn test_vendor_codes_pass_through() {
        let bridge = bridge();

        let outcome = bridge.open_printer("fail-87").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.return_code, 87);

        let outcome = bridge.close_printer("fail-neg").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.return_code, -1);

        let outcome = bridge.print("fail-87", "HELLO").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.return_code, 87);
        assert_eq!(outcome.job_id, 0);
    }

    #[test]
    fn test_print_forwards_exact_length() {
        let bridge = bridge();
        let outcome = bridge.print("NP-3511", "HELLO").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.job_id, 7);
        assert_eq!(
            take_calls(),
            vec![Call::Print {
                name: "NP-3511".into(),
                length: 5,
                bytes: b"HELLO".to_vec()
            }]
        );
    }

    #[test]
    fn test_print_keeps_embedded_nul_and_utf8_bytes() {
        let bridge = bridge();
        bridge.print("NP-3511", b"AB\0CD".as_slice()).unwrap();
        bridge.print("NP-3511", "1B40\"日本\"").unwrap();

        let calls = take_calls();
        assert_eq!(
            calls[0],
            Call::Print {
                name: "NP-3511".into(),
                length: 5,
                bytes: b"AB\0CD".to_vec()
            }
        );
        // UTF-8 bytes, not UTF-16
        assert_eq!(
            calls[1],
            Call::Print {
                name: "NP-3511".into(),
                length: 12,
                bytes: "1B40\"日本\"".as_bytes().to_vec()
            }
        );
    }

    #[test]
    fn test_status_is_opaque() {
        let bridge = bridge();
        assert_eq!(
            bridge.get_status("NP-3511").unwrap(),
            StatusOutcome {
                success: true,
                return_code: 0,
                status: 0x81
            }
        );
    }

    #[test]
    fn test_get_information() {
        let bridge = bridge();
        let outcome = bridge.get_information("NP-3511", 11).unwrap();
        assert_eq!(
            outcome,
            InformationOutcome {
                success: true,
                return_code: 0,
                data: Some("Ver 1.02".into()),
                timeout: Some(1200),
                truncated: false
            }
        );
        assert_eq!(
            take_calls(),
            vec![Call::Information {
                name: "NP-3511".into(),
                info_id: 11,
                timeout: 5000
            }]
        );
    }

    #[test]
    fn test_get_information_failure_has_no_payload() {
        let bridge = bridge();
        let outcome = bridge.get_information("fail-neg", 10).unwrap();
        assert_eq!(outcome, InformationOutcome::failed(-1));
    }

    #[test]
    fn test_get_information_rejects_wide_id() {
        let bridge = bridge();
        let err = bridge.get_information("NP-3511", 256).unwrap_err();
        assert!(err.is_usage());
        assert!(take_calls().is_empty());
    }

    #[test]
    fn test_get_information_flags_saturated_buffer() {
        let bridge = Bridge::new(
            VendorLibrary::from_entry_points(
                "mock",
                EntryPoints {
                    get_information: Some(information_full),
                    ..full_table()
                },
            ),
            BridgeConfig::default().with_info_buffer_size(16),
        );
        let outcome = bridge.get_information("NP-3511", 10).unwrap();
        assert!(outcome.success);
        assert!(outcome.truncated);
        assert_eq!(outcome.data.as_deref(), Some("XXXXXXXXXXXXXXXX"));
    }

    #[test]
    fn test_session_operations() {
        let bridge = bridge();
        assert!(bridge.reset_printer("NP").unwrap().success);
        let job = bridge.start_document("NP").unwrap();
        assert_eq!(job.job_id, 1001);
        assert!(bridge.end_document("NP").unwrap().success);
        assert!(!bridge.cancel_document("fail-87").unwrap().success);
        assert!(bridge.close_all_printers().unwrap().success);

        assert_eq!(
            take_calls(),
            vec![
                Call::Reset {
                    name: "NP".into(),
                    reserved_null: true
                },
                Call::StartDoc("NP".into()),
                Call::EndDoc("NP".into()),
                Call::CancelDoc("fail-87".into()),
                Call::CloseAll,
            ]
        );
    }

    #[test]
    fn test_empty_name_never_reaches_vendor() {
        let bridge = bridge();

        assert!(bridge.open_printer("").unwrap_err().is_usage());
        assert!(bridge.close_printer("").unwrap_err().is_usage());
        assert!(bridge.print("", "HELLO").unwrap_err().is_usage());
        assert!(bridge.get_status("").unwrap_err().is_usage());
        assert!(bridge.get_information("", 10).unwrap_err().is_usage());
        assert!(bridge.reset_printer("").unwrap_err().is_usage());
        assert!(bridge.start_document("").unwrap_err().is_usage());
        assert!(bridge.end_document("").unwrap_err().is_usage());
        assert!(bridge.cancel_document("").unwrap_err().is_usage());
        assert!(bridge.open_printer("NP\0").unwrap_err().is_usage());

        assert!(take_calls().is_empty());
    }

    #[test]
    fn test_usage_checked_before_availability() {
        let bridge = bridge_with(EntryPoints::default());
        assert!(bridge.get_status("").unwrap_err().is_usage());
        assert!(bridge.get_status("NP").unwrap_err().is_unavailable());
    }

    #[test]
    fn test_missing_entry_point() {
        let bridge = bridge_with(EntryPoints {
            get_status: None,
            ..full_table()
        });
        let err = bridge.get_status("NP-3511").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::EntryPointUnavailable(EntryPoint::GetStatus)
        ));
        assert!(!bridge.is_available(EntryPoint::GetStatus));
        assert!(bridge.is_available(EntryPoint::Print));
    }

    #[test]
    fn test_missing_mandatory_blocks_everything() {
        take_calls();
        let bridge = bridge_with(EntryPoints {
            open_printer: None,
            ..full_table()
        });

        let err = bridge.get_status("NP-3511").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::EntryPointUnavailable(EntryPoint::OpenPrinter)
        ));
        assert!(bridge.enumerate_printers().unwrap_err().is_unavailable());
        assert!(!bridge.is_available(EntryPoint::GetStatus));
        assert!(take_calls().is_empty());
    }

    static STATUS_SEEN: AtomicBool = AtomicBool::new(false);

    /// Blocks until a status query has been observed on another thread
    unsafe extern "system" fn print_waiting_for_status(
        _name: *mut u16,
        _data: *mut c_char,
        _length: u32,
        job_id: *mut u32,
    ) -> i32 {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if STATUS_SEEN.load(Ordering::SeqCst) {
                unsafe { *job_id = 9 };
                return 0;
            }
            thread::sleep(Duration::from_millis(5));
        }
        -99
    }

    unsafe extern "system" fn status_signalling(_name: *mut u16, status: *mut u32) -> i32 {
        STATUS_SEEN.store(true, Ordering::SeqCst);
        unsafe { *status = 0 };
        0
    }

    #[test]
    fn test_calls_on_different_printers_do_not_serialize() {
        let bridge = bridge_with(EntryPoints {
            print: Some(print_waiting_for_status),
            get_status: Some(status_signalling),
            ..full_table()
        });

        let printing = {
            let bridge = bridge.clone();
            thread::spawn(move || bridge.print("PrinterB", "HELLO"))
        };
        thread::sleep(Duration::from_millis(50));
        let querying = {
            let bridge = bridge.clone();
            thread::spawn(move || bridge.get_status("PrinterA"))
        };

        let status = querying.join().unwrap().unwrap();
        let job = printing.join().unwrap().unwrap();
        assert!(status.success);
        assert!(job.success, "print was blocked behind the status query");
        assert_eq!(job.job_id, 9);
    }
}
