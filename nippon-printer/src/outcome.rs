//! Per-call results handed back to the host
//!
//! A return code of exactly zero is success; anything else is passed
//! through untouched.

use serde::Serialize;

/// Result of a forward that only reports a return code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub success: bool,
    pub return_code: i32,
}

impl CallOutcome {
    pub fn from_code(return_code: i32) -> Self {
        Self {
            success: return_code == 0,
            return_code,
        }
    }
}

/// Result of `print` and `start_document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub success: bool,
    pub return_code: i32,
    /// Vendor-assigned job id; zero when the call failed
    pub job_id: u32,
}

impl JobOutcome {
    pub fn new(return_code: i32, job_id: u32) -> Self {
        let success = return_code == 0;
        Self {
            success,
            return_code,
            job_id: if success { job_id } else { 0 },
        }
    }
}

/// Result of `get_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutcome {
    pub success: bool,
    pub return_code: i32,
    /// Opaque vendor status word
    pub status: u32,
}

impl StatusOutcome {
    pub fn new(return_code: i32, status: u32) -> Self {
        Self {
            success: return_code == 0,
            return_code,
            status,
        }
    }
}

/// Result of `get_information`
///
/// `data` and `timeout` are only present on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InformationOutcome {
    pub success: bool,
    pub return_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// The vendor filled the whole scratch buffer without a terminator
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl InformationOutcome {
    pub fn failed(return_code: i32) -> Self {
        Self {
            success: false,
            return_code,
            data: None,
            timeout: None,
            truncated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        assert_eq!(
            CallOutcome::from_code(0),
            CallOutcome {
                success: true,
                return_code: 0
            }
        );
    }

    #[test]
    fn test_nonzero_codes_preserved() {
        for code in [-1, 87, i32::MIN, i32::MAX, 1] {
            let outcome = CallOutcome::from_code(code);
            assert!(!outcome.success);
            assert_eq!(outcome.return_code, code);
        }
    }

    #[test]
    fn test_job_id_cleared_on_failure() {
        assert_eq!(JobOutcome::new(0, 42).job_id, 42);
        let failed = JobOutcome::new(-3, 42);
        assert!(!failed.success);
        assert_eq!(failed.job_id, 0);
    }
}
