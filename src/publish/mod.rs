//! Page publishing
//!
//! Mirrors draft pages into the published branch and removes them again.

mod coordinator;

pub use coordinator::{PAGE_SUFFIX, PublishCoordinator, page_name};
