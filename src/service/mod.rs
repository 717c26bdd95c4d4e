//! Object service
//!
//! The call surface used by the transport: one method per API operation.

mod operations;

pub use operations::ObjectService;
