//! Error handlers
//!
//! Maps object failures onto transport status codes and logs them.

use crate::error::types::{ErrorKind, ObjectError};
use log::{error, warn};

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_UNPROCESSABLE_ENTITY: u16 = 422;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Log a failed operation; caller mistakes are warnings, I/O failures errors
pub fn handle_error(operation: &str, err: &ObjectError) {
    match err.kind() {
        ErrorKind::Internal => error!("{operation} failed: {err}"),
        _ => warn!("{operation} rejected: {err}"),
    }
}

/// Convert error to transport status code
pub fn error_to_status_code(err: &ObjectError) -> u16 {
    match err.kind() {
        ErrorKind::BadRequest => STATUS_BAD_REQUEST,
        ErrorKind::NotFound => STATUS_NOT_FOUND,
        ErrorKind::UnprocessableEntity => STATUS_UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => STATUS_INTERNAL_ERROR,
    }
}
