pub mod config;
pub mod error;
pub mod protocol;
pub mod publish;
pub mod server;
pub mod service;
pub mod storage;

pub use config::{RootPaths, ServerConfig};
pub use error::{ObjectError, ObjectResult};
pub use server::Server;
pub use service::ObjectService;
