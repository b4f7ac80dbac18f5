//! Decoding the NGetStatus word
//!
//! Bit meanings come from observed Nippon printer behavior; the bridge
//! itself keeps the raw value opaque.

use crate::outcome::StatusOutcome;
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Status bits reported by Nippon thermal printers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u32 {
        const PAPER_NEAR_END = 0x01;
        const COVER_OPEN = 0x02;
        const PAPER_OUT = 0x04;
        const OVERHEAT = 0x08;
        const PRINTING = 0x80;

        /// Bits that count as an error condition
        const ERRORS = Self::PAPER_NEAR_END.bits()
            | Self::COVER_OPEN.bits()
            | Self::PAPER_OUT.bits()
            | Self::OVERHEAT.bits();
    }
}

/// Printer state derived from a status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub status: u32,
    /// No error bits set (printing still counts as online)
    pub online: bool,
    /// No error bits set and not printing
    pub ready: bool,
    pub connected: bool,
    pub printing: bool,
    pub paper_near_end: bool,
    pub cover_open: bool,
    pub paper_out: bool,
    pub overheat: bool,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    pub raw_status: u32,
}

impl PrinterStatus {
    /// Interpret a status outcome
    ///
    /// A negative return code means the printer could not be queried
    /// (typically disconnected); every condition flag is then false.
    pub fn from_outcome(outcome: StatusOutcome) -> Self {
        if outcome.return_code < 0 {
            return Self {
                status: 0,
                online: false,
                ready: false,
                connected: false,
                printing: false,
                paper_near_end: false,
                cover_open: false,
                paper_out: false,
                overheat: false,
                error: true,
                error_message: Some(format!("Printer error (code {})", outcome.return_code)),
                return_code: Some(outcome.return_code),
                raw_status: outcome.status,
            };
        }

        let flags = StatusFlags::from_bits_retain(outcome.status);
        let error = flags.intersects(StatusFlags::ERRORS);
        let printing = flags.contains(StatusFlags::PRINTING);

        Self {
            status: outcome.status,
            online: !error,
            ready: !error && !printing,
            connected: true,
            printing,
            paper_near_end: flags.contains(StatusFlags::PAPER_NEAR_END),
            cover_open: flags.contains(StatusFlags::COVER_OPEN),
            paper_out: flags.contains(StatusFlags::PAPER_OUT),
            overheat: flags.contains(StatusFlags::OVERHEAT),
            error,
            error_message: None,
            return_code: None,
            raw_status: outcome.status,
        }
    }

    /// The raw word as flags
    pub fn flags(&self) -> StatusFlags {
        StatusFlags::from_bits_retain(self.raw_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(return_code: i32, status: u32) -> PrinterStatus {
        PrinterStatus::from_outcome(StatusOutcome::new(return_code, status))
    }

    #[test]
    fn test_ready() {
        let s = decode(0, 0);
        assert!(s.online && s.ready && s.connected);
        assert!(!s.error && !s.printing);
    }

    #[test]
    fn test_printing_is_online_but_not_ready() {
        let s = decode(0, 0x80);
        assert!(s.online);
        assert!(!s.ready);
        assert!(s.printing);
        assert!(!s.error);
    }

    #[test]
    fn test_error_bits() {
        let s = decode(0, 0x07);
        assert!(s.paper_near_end && s.cover_open && s.paper_out);
        assert!(!s.overheat);
        assert!(s.error && !s.online && !s.ready);

        let s = decode(0, 0x88);
        assert!(s.overheat && s.printing && s.error);
    }

    #[test]
    fn test_unknown_bits_do_not_raise_error() {
        let s = decode(0, 0x30);
        assert!(!s.error);
        assert_eq!(s.flags().bits(), 0x30);
    }

    #[test]
    fn test_negative_code_means_disconnected() {
        let s = decode(-2, 0x04);
        assert!(s.error);
        assert!(!s.connected && !s.online && !s.paper_out);
        assert_eq!(s.error_message.as_deref(), Some("Printer error (code -2)"));
        assert_eq!(s.return_code, Some(-2));
        assert_eq!(s.raw_status, 0x04);
    }
}
