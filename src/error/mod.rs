//! Error handling
//!
//! Defines the typed failures of the object core and of the server process.

pub mod handlers;
pub mod types;

pub use handlers::{error_to_status_code, handle_error};
pub use types::*;
