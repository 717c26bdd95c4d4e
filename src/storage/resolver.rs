//! Path resolution against the browsable root

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ObjectError, ObjectResult};
use crate::storage::validation::{decode_path, sandboxed_join};

/// An existing entry under the browsable root, with the metadata read while
/// checking that it exists.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub absolute: PathBuf,
    pub metadata: Metadata,
}

impl ResolvedPath {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }
}

/// Turns transport-encoded paths into locations under one base directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode `encoded` and place it under the root without checking existence.
    pub fn locate(&self, encoded: &str) -> ObjectResult<PathBuf> {
        let decoded = decode_path(encoded)?;
        sandboxed_join(&self.root, &decoded)
    }

    /// Decode `encoded` and require that it names an existing entry.
    pub fn resolve(&self, encoded: &str) -> ObjectResult<ResolvedPath> {
        let absolute = self.locate(encoded)?;
        let metadata = stat(&absolute)?;
        Ok(ResolvedPath { absolute, metadata })
    }
}

/// Metadata of `path`, `NotFound("path_not_found")` when it is absent.
pub fn stat(path: &Path) -> ObjectResult<Metadata> {
    fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ObjectError::not_found(
            "path_not_found",
            format!("{} does not exist", path.display()),
        ),
        _ => ObjectError::io("stat_error", path, &e),
    })
}
