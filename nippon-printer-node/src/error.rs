//! Mapping bridge errors onto JavaScript exceptions

use napi::{Error, Status};
use nippon_printer::{BridgeError, BridgeResult};

/// Argument errors become `InvalidArg`, everything else `GenericFailure`
fn to_napi(err: BridgeError) -> Error {
    let status = if err.is_usage() {
        Status::InvalidArg
    } else {
        Status::GenericFailure
    };
    Error::new(status, err.to_string())
}

pub(crate) fn usage(message: &str) -> Error {
    to_napi(BridgeError::usage(message))
}

pub(crate) trait IntoNapi<T> {
    fn into_napi(self) -> napi::Result<T>;
}

impl<T> IntoNapi<T> for BridgeResult<T> {
    fn into_napi(self) -> napi::Result<T> {
        self.map_err(to_napi)
    }
}
