//! Response handling
//!
//! Every response is one line: a status code, optionally followed by a
//! JSON payload, terminated by CRLF.

use log::error;
use serde::Serialize;

use crate::error::{ObjectError, error_to_status_code};

pub const READY: u16 = 220;
pub const CLOSING: u16 = 221;
pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const BAD_REQUEST: u16 = 400;
pub const TOO_MANY_CONNECTIONS: u16 = 421;
pub const INTERNAL_ERROR: u16 = 500;
pub const NOT_IMPLEMENTED: u16 = 502;

/// Error payload sent with every failure status
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

/// Format a status line without payload
pub fn format_response(code: u16) -> String {
    format!("{code}\r\n")
}

/// Format a status line carrying `payload` as JSON
pub fn json_response<T: Serialize + ?Sized>(code: u16, payload: &T) -> String {
    match serde_json::to_string(payload) {
        Ok(json) => format!("{code} {json}\r\n"),
        Err(e) => {
            error!("Failed to serialize response payload: {e}");
            error_response(INTERNAL_ERROR, "serialization_error", &e.to_string())
        }
    }
}

pub fn error_response(code: u16, error_code: &str, message: &str) -> String {
    json_response(
        code,
        &ErrorBody {
            code: error_code,
            message,
        },
    )
}

/// Render an object failure with its mapped status code
pub fn object_error_response(err: &ObjectError) -> String {
    error_response(error_to_status_code(err), err.code(), err.message())
}
