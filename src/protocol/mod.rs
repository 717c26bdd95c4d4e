//! Command protocol
//!
//! Line-oriented protocol spoken on client connections: parsing, dispatch
//! to the object service, and response formatting.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::handle_command;
