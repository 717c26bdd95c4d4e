//! Object service operations

use crate::config::{RootPaths, ServerConfig};
use crate::error::{ObjectError, ObjectResult};
use crate::publish::PublishCoordinator;
use crate::storage::{
    ExclusionScope, FileSystemObject, ObjectRequest, ObjectStore, PathResolver, TreeWalker,
};

/// Entry point for every object and page operation.
///
/// Holds no mutable state, so one instance can serve all connections.
#[derive(Debug, Clone)]
pub struct ObjectService {
    roots: RootPaths,
    resolver: PathResolver,
    store: ObjectStore,
    publisher: PublishCoordinator,
    scope: ExclusionScope,
}

impl ObjectService {
    pub fn new(roots: RootPaths, scope: ExclusionScope) -> Self {
        Self {
            resolver: PathResolver::new(roots.browsable_root()),
            store: ObjectStore::new(roots.browsable_root()),
            publisher: PublishCoordinator::new(&roots),
            roots,
            scope,
        }
    }

    pub fn from_config(config: &ServerConfig, roots: RootPaths) -> Self {
        let scope = if config.anchor_branch_exclusion {
            ExclusionScope::TopLevel
        } else {
            ExclusionScope::AnyDepth
        };
        Self::new(roots, scope)
    }

    pub fn roots(&self) -> &RootPaths {
        &self.roots
    }

    /// List the files under `encoded_path`, hiding the page branch not selected
    /// by `published_pages`.
    pub fn browse(
        &self,
        encoded_path: &str,
        max_depth: u32,
        published_pages: bool,
    ) -> ObjectResult<Vec<FileSystemObject>> {
        let target = self.resolver.resolve(encoded_path)?;
        let exclude = if published_pages {
            self.roots.draft_dir_name()
        } else {
            self.roots.published_dir_name()
        };

        TreeWalker::new(&self.store, self.scope).browse(&target, max_depth, exclude)
    }

    pub fn get_object(&self, encoded_path: &str) -> ObjectResult<FileSystemObject> {
        let target = self.resolver.resolve(encoded_path)?;
        self.store.read_with(&target.absolute, &target.metadata)
    }

    pub fn put_object(
        &self,
        encoded_path: &str,
        request: &ObjectRequest,
    ) -> ObjectResult<FileSystemObject> {
        let path = self.resolver.locate(encoded_path)?;
        self.store.create(&path, request)
    }

    /// Delete a file or empty directory; deleting a missing path succeeds.
    pub fn delete_object(&self, encoded_path: &str) -> ObjectResult<()> {
        let path = self.resolver.locate(encoded_path)?;
        if path == self.roots.browsable_root() {
            return Err(ObjectError::unprocessable(
                "cannot_delete_root",
                "the browsable root cannot be deleted",
            ));
        }
        self.store.delete(&path)
    }

    pub fn publish_page(&self, encoded_path: &str) -> ObjectResult<()> {
        self.publisher.publish(encoded_path)
    }

    pub fn unpublish_page(&self, encoded_path: &str) -> ObjectResult<()> {
        self.publisher.unpublish(encoded_path)
    }
}
