//! Server core functionality
//!
//! Listener, client registry and per-connection sessions.

pub mod core;
pub mod session;

pub use self::core::{ClientSession, Server};
