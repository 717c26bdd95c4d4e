//! File tree storage
//!
//! Path resolution, object reads and writes, and subtree traversal under the
//! browsable root.

pub mod object;
pub mod resolver;
pub mod store;
pub mod validation;
pub mod walker;

pub use object::{FileSystemObject, ObjectRequest, ObjectType};
pub use resolver::{PathResolver, ResolvedPath};
pub use store::{ObjectStore, StoreEntry};
pub use walker::{ExclusionScope, TreeWalker};
