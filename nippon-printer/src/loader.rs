//! Loading NPrinterLib and resolving its entry points
//!
//! The library is opened once per process and never unloaded. Every export
//! is resolved independently; a missing symbol leaves that entry point
//! unavailable without failing the load, except for `NEnumPrinters` and
//! `NOpenPrinter` which a usable library must provide.

use crate::error::{BridgeError, BridgeResult};
use libloading::Library;
use std::ffi::{c_char, c_void};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{info, instrument, warn};

// Vendor prototypes. WINAPI is `extern "system"`; INT is i32, DWORD u32, BYTE u8.

/// `INT NEnumPrinters(PWCHAR buffer, PINT size)`
pub type NEnumPrintersFn = unsafe extern "system" fn(buffer: *mut u16, size: *mut i32) -> i32;
/// `INT NOpenPrinter(PWCHAR name, BOOL exclusive, void* options)`
pub type NOpenPrinterFn =
    unsafe extern "system" fn(name: *mut u16, exclusive: i32, options: *mut c_void) -> i32;
/// `INT NClosePrinter(PWCHAR name)`
pub type NClosePrinterFn = unsafe extern "system" fn(name: *mut u16) -> i32;
/// `INT NClosePrinters()`
pub type NClosePrintersFn = unsafe extern "system" fn() -> i32;
/// `INT NPrint(PWCHAR name, PCHAR data, DWORD length, PDWORD job_id)`
pub type NPrintFn = unsafe extern "system" fn(
    name: *mut u16,
    data: *mut c_char,
    length: u32,
    job_id: *mut u32,
) -> i32;
/// `INT NImagePrint(PWCHAR name, HDC dc, INT width, INT height, BYTE scale, PDWORD job_id)`
pub type NImagePrintFn = unsafe extern "system" fn(
    name: *mut u16,
    dc: *mut c_void,
    width: i32,
    height: i32,
    scale: u8,
    job_id: *mut u32,
) -> i32;
/// `INT NGetStatus(PWCHAR name, LPDWORD status)`
pub type NGetStatusFn = unsafe extern "system" fn(name: *mut u16, status: *mut u32) -> i32;
/// `INT NGetInformation(PWCHAR name, BYTE info_id, PVOID buffer, PDWORD timeout)`
pub type NGetInformationFn = unsafe extern "system" fn(
    name: *mut u16,
    info_id: u8,
    buffer: *mut c_void,
    timeout: *mut u32,
) -> i32;
/// `INT NResetPrinter(PWCHAR name, void* reserved)`
pub type NResetPrinterFn = unsafe extern "system" fn(name: *mut u16, reserved: *mut c_void) -> i32;
/// `INT NStartDoc(PWCHAR name, PDWORD job_id)`
pub type NStartDocFn = unsafe extern "system" fn(name: *mut u16, job_id: *mut u32) -> i32;
/// `INT NEndDoc(PWCHAR name)`
pub type NEndDocFn = unsafe extern "system" fn(name: *mut u16) -> i32;
/// `INT NCancelDoc(PWCHAR name)`
pub type NCancelDocFn = unsafe extern "system" fn(name: *mut u16) -> i32;
/// `INT NBarcode2(HDC dc, DWORD, DWORD, PDWORD, PDWORD, PBYTE, DWORD)`
pub type NBarcode2Fn = unsafe extern "system" fn(
    dc: *mut c_void,
    a: u32,
    b: u32,
    c: *mut u32,
    d: *mut u32,
    data: *mut u8,
    length: u32,
) -> i32;
/// `INT NBarcodeSettings(UINT, UINT, UINT, INT, INT, INT, INT, UINT, UINT, UINT)`
pub type NBarcodeSettingsFn = unsafe extern "system" fn(
    u32,
    u32,
    u32,
    i32,
    i32,
    i32,
    i32,
    u32,
    u32,
    u32,
) -> i32;

/// Named exports of NPrinterLib
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    EnumPrinters,
    OpenPrinter,
    ClosePrinter,
    ClosePrinters,
    Print,
    ImagePrint,
    GetStatus,
    GetInformation,
    ResetPrinter,
    StartDoc,
    EndDoc,
    CancelDoc,
    Barcode2,
    BarcodeSettings,
}

impl EntryPoint {
    /// Every export, in resolution order
    pub const ALL: [EntryPoint; 14] = [
        EntryPoint::EnumPrinters,
        EntryPoint::OpenPrinter,
        EntryPoint::ClosePrinter,
        EntryPoint::ClosePrinters,
        EntryPoint::Print,
        EntryPoint::ImagePrint,
        EntryPoint::GetStatus,
        EntryPoint::GetInformation,
        EntryPoint::ResetPrinter,
        EntryPoint::StartDoc,
        EntryPoint::EndDoc,
        EntryPoint::CancelDoc,
        EntryPoint::Barcode2,
        EntryPoint::BarcodeSettings,
    ];

    /// Exported symbol name
    pub fn symbol(self) -> &'static str {
        match self {
            EntryPoint::EnumPrinters => "NEnumPrinters",
            EntryPoint::OpenPrinter => "NOpenPrinter",
            EntryPoint::ClosePrinter => "NClosePrinter",
            EntryPoint::ClosePrinters => "NClosePrinters",
            EntryPoint::Print => "NPrint",
            EntryPoint::ImagePrint => "NImagePrint",
            EntryPoint::GetStatus => "NGetStatus",
            EntryPoint::GetInformation => "NGetInformation",
            EntryPoint::ResetPrinter => "NResetPrinter",
            EntryPoint::StartDoc => "NStartDoc",
            EntryPoint::EndDoc => "NEndDoc",
            EntryPoint::CancelDoc => "NCancelDoc",
            EntryPoint::Barcode2 => "NBarcode2",
            EntryPoint::BarcodeSettings => "NBarcodeSettings",
        }
    }

    /// Whether a library without this export is unusable
    pub fn is_mandatory(self) -> bool {
        matches!(self, EntryPoint::EnumPrinters | EntryPoint::OpenPrinter)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Resolved entry points; `None` marks an export the library lacks
#[derive(Clone, Copy, Default)]
pub struct EntryPoints {
    pub enum_printers: Option<NEnumPrintersFn>,
    pub open_printer: Option<NOpenPrinterFn>,
    pub close_printer: Option<NClosePrinterFn>,
    pub close_printers: Option<NClosePrintersFn>,
    pub print: Option<NPrintFn>,
    pub image_print: Option<NImagePrintFn>,
    pub get_status: Option<NGetStatusFn>,
    pub get_information: Option<NGetInformationFn>,
    pub reset_printer: Option<NResetPrinterFn>,
    pub start_doc: Option<NStartDocFn>,
    pub end_doc: Option<NEndDocFn>,
    pub cancel_doc: Option<NCancelDocFn>,
    pub barcode2: Option<NBarcode2Fn>,
    pub barcode_settings: Option<NBarcodeSettingsFn>,
}

impl EntryPoints {
    /// Resolve every export from an opened library
    ///
    /// # Safety
    ///
    /// The library must export these symbols with the prototypes above.
    unsafe fn resolve(library: &Library) -> Self {
        unsafe {
            Self {
                enum_printers: symbol(library, EntryPoint::EnumPrinters),
                open_printer: symbol(library, EntryPoint::OpenPrinter),
                close_printer: symbol(library, EntryPoint::ClosePrinter),
                close_printers: symbol(library, EntryPoint::ClosePrinters),
                print: symbol(library, EntryPoint::Print),
                image_print: symbol(library, EntryPoint::ImagePrint),
                get_status: symbol(library, EntryPoint::GetStatus),
                get_information: symbol(library, EntryPoint::GetInformation),
                reset_printer: symbol(library, EntryPoint::ResetPrinter),
                start_doc: symbol(library, EntryPoint::StartDoc),
                end_doc: symbol(library, EntryPoint::EndDoc),
                cancel_doc: symbol(library, EntryPoint::CancelDoc),
                barcode2: symbol(library, EntryPoint::Barcode2),
                barcode_settings: symbol(library, EntryPoint::BarcodeSettings),
            }
        }
    }

    /// Whether an entry point resolved
    pub fn is_resolved(&self, entry: EntryPoint) -> bool {
        match entry {
            EntryPoint::EnumPrinters => self.enum_printers.is_some(),
            EntryPoint::OpenPrinter => self.open_printer.is_some(),
            EntryPoint::ClosePrinter => self.close_printer.is_some(),
            EntryPoint::ClosePrinters => self.close_printers.is_some(),
            EntryPoint::Print => self.print.is_some(),
            EntryPoint::ImagePrint => self.image_print.is_some(),
            EntryPoint::GetStatus => self.get_status.is_some(),
            EntryPoint::GetInformation => self.get_information.is_some(),
            EntryPoint::ResetPrinter => self.reset_printer.is_some(),
            EntryPoint::StartDoc => self.start_doc.is_some(),
            EntryPoint::EndDoc => self.end_doc.is_some(),
            EntryPoint::CancelDoc => self.cancel_doc.is_some(),
            EntryPoint::Barcode2 => self.barcode2.is_some(),
            EntryPoint::BarcodeSettings => self.barcode_settings.is_some(),
        }
    }
}

impl fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(
                EntryPoint::ALL
                    .iter()
                    .filter(|entry| self.is_resolved(**entry)),
            )
            .finish()
    }
}

/// Look up one export, copying the function pointer out of the symbol
unsafe fn symbol<T: Copy>(library: &Library, entry: EntryPoint) -> Option<T> {
    match unsafe { library.get::<T>(entry.symbol().as_bytes()) } {
        Ok(sym) => Some(*sym),
        Err(e) => {
            warn!(symbol = entry.symbol(), error = %e, "Entry point not exported");
            None
        }
    }
}

/// NPrinterLib loaded into the process, with its resolved entry points
pub struct VendorLibrary {
    /// Keeps the module mapped; never dropped for the shared instance
    _library: Option<Library>,
    name: String,
    entry_points: EntryPoints,
}

impl VendorLibrary {
    /// Open a library by name through the system search path
    ///
    /// Succeeds whenever the file itself loads; check
    /// [`has_mandatory`](Self::has_mandatory) before use.
    #[instrument]
    pub fn load(name: &str) -> BridgeResult<Self> {
        // SAFETY: loading runs the vendor's DllMain; nothing else to uphold
        let library = unsafe { Library::new(name) }.map_err(|source| {
            BridgeError::LibraryUnavailable {
                name: name.to_string(),
                source,
            }
        })?;

        // SAFETY: prototypes follow the vendor header
        let entry_points = unsafe { EntryPoints::resolve(&library) };

        let lib = Self {
            _library: Some(library),
            name: name.to_string(),
            entry_points,
        };

        info!(
            library = name,
            resolved = ?lib.entry_points,
            usable = lib.has_mandatory(),
            "Loaded vendor library"
        );

        Ok(lib)
    }

    /// Wrap an entry-point table that did not come from a file
    ///
    /// Used for statically linked vendors and for tests.
    pub fn from_entry_points(name: impl Into<String>, entry_points: EntryPoints) -> Self {
        Self {
            _library: None,
            name: name.into(),
            entry_points,
        }
    }

    /// Library name as passed to the loader
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved table
    pub fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }

    /// Whether a single entry point can be called
    pub fn is_available(&self, entry: EntryPoint) -> bool {
        self.entry_points.is_resolved(entry)
    }

    /// Whether both mandatory entry points resolved
    pub fn has_mandatory(&self) -> bool {
        self.missing_mandatory().is_none()
    }

    /// First mandatory entry point that did not resolve
    pub fn missing_mandatory(&self) -> Option<EntryPoint> {
        EntryPoint::ALL
            .into_iter()
            .filter(|entry| entry.is_mandatory())
            .find(|entry| !self.is_available(*entry))
    }

    /// All entry points that resolved
    pub fn available_entry_points(&self) -> Vec<EntryPoint> {
        EntryPoint::ALL
            .into_iter()
            .filter(|entry| self.is_available(*entry))
            .collect()
    }
}

impl fmt::Debug for VendorLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorLibrary")
            .field("name", &self.name)
            .field("entry_points", &self.entry_points)
            .finish()
    }
}

static SHARED: OnceLock<Arc<VendorLibrary>> = OnceLock::new();
static LOAD_LOCK: Mutex<()> = Mutex::new(());

/// The process-wide library, loading it on first use
///
/// Concurrent first calls serialize on the load; once set, the handle is
/// read without locking. A failed load leaves nothing cached, so the next
/// call tries again.
pub fn shared_library(name: &str) -> BridgeResult<Arc<VendorLibrary>> {
    if let Some(lib) = SHARED.get() {
        return Ok(Arc::clone(lib));
    }

    let _guard = LOAD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(lib) = SHARED.get() {
        return Ok(Arc::clone(lib));
    }

    let lib = Arc::new(VendorLibrary::load(name)?);
    Ok(Arc::clone(SHARED.get_or_init(|| lib)))
}

/// The process-wide library if it has already been loaded
pub fn loaded_library() -> Option<Arc<VendorLibrary>> {
    SHARED.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "system" fn fake_enum(_buffer: *mut u16, size: *mut i32) -> i32 {
        unsafe { *size = 0 };
        0
    }

    unsafe extern "system" fn fake_status(_name: *mut u16, status: *mut u32) -> i32 {
        unsafe { *status = 0 };
        0
    }

    #[test]
    fn test_symbol_names() {
        let names: Vec<&str> = EntryPoint::ALL.iter().map(|e| e.symbol()).collect();
        assert_eq!(names.len(), 14);
        assert!(names.contains(&"NEnumPrinters"));
        assert!(names.contains(&"NBarcodeSettings"));
        assert_eq!(EntryPoint::GetInformation.to_string(), "NGetInformation");
    }

    #[test]
    fn test_mandatory_entry_points() {
        let mandatory: Vec<EntryPoint> = EntryPoint::ALL
            .into_iter()
            .filter(|e| e.is_mandatory())
            .collect();
        assert_eq!(
            mandatory,
            vec![EntryPoint::EnumPrinters, EntryPoint::OpenPrinter]
        );
    }

    #[test]
    fn test_partial_table() {
        let lib = VendorLibrary::from_entry_points(
            "fake",
            EntryPoints {
                enum_printers: Some(fake_enum),
                get_status: Some(fake_status),
                ..Default::default()
            },
        );

        assert!(lib.is_available(EntryPoint::GetStatus));
        assert!(!lib.is_available(EntryPoint::Print));
        assert!(!lib.has_mandatory());
        assert_eq!(lib.missing_mandatory(), Some(EntryPoint::OpenPrinter));
        assert_eq!(
            lib.available_entry_points(),
            vec![EntryPoint::EnumPrinters, EntryPoint::GetStatus]
        );
    }

    #[test]
    fn test_missing_library() {
        let err = VendorLibrary::load("definitely-not-NPrinterLib-4f1c.dll").unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(err, BridgeError::LibraryUnavailable { .. }));
    }
}
