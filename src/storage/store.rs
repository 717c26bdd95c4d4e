//! Object store
//!
//! Creates, reads, lists and deletes entries under the browsable root. All
//! operations take absolute paths already produced by `PathResolver`.

use log::{debug, error, info};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ObjectError, ObjectResult};
use crate::storage::object::{FileSystemObject, ObjectRequest, ObjectType};
use crate::storage::resolver::stat;

/// A directory child as returned by [`ObjectStore::list`]
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub path: PathBuf,
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a directory or write a file at `path`.
    ///
    /// Directories are created only when absent; files are overwritten. The
    /// parent of `path` must already exist.
    pub fn create(&self, path: &Path, request: &ObjectRequest) -> ObjectResult<FileSystemObject> {
        match request.object_type {
            ObjectType::Directory if !request.content.is_empty() => {
                return Err(ObjectError::bad_request(
                    "dir_write_error",
                    "a directory cannot have content",
                ));
            }
            ObjectType::File if request.content.is_empty() => {
                return Err(ObjectError::bad_request(
                    "file_without_content",
                    "a file must be created with content",
                ));
            }
            _ => {}
        }

        self.require_parent(path)?;
        let existing = existing_metadata(path)?;

        match request.object_type {
            ObjectType::Directory => match existing {
                Some(metadata) if !metadata.is_dir() => {
                    return Err(ObjectError::unprocessable(
                        "file_exists",
                        format!("{} is a file", path.display()),
                    ));
                }
                Some(_) => debug!("Directory {} already exists", path.display()),
                None => {
                    fs::create_dir(path).map_err(|e| {
                        error!("Failed to create directory {}: {}", path.display(), e);
                        ObjectError::io("dir_creation_error", path, &e)
                    })?;
                    info!("Created directory {}", path.display());
                }
            },
            ObjectType::File => {
                if existing.is_some_and(|m| m.is_dir()) {
                    return Err(ObjectError::unprocessable(
                        "dir_exists",
                        format!("{} is a directory", path.display()),
                    ));
                }
                fs::write(path, request.content.as_bytes()).map_err(|e| {
                    error!("Failed to write file {}: {}", path.display(), e);
                    ObjectError::io("write_error", path, &e)
                })?;
                info!(
                    "Wrote file {} ({} bytes)",
                    path.display(),
                    request.content.len()
                );
            }
        }

        self.read(path).map_err(|e| match e {
            ObjectError::NotFound { .. } => ObjectError::internal(
                "object_vanished",
                format!("{} disappeared right after being written", path.display()),
            ),
            other => other,
        })
    }

    /// Read the object at `path`, including the full content of a file.
    pub fn read(&self, path: &Path) -> ObjectResult<FileSystemObject> {
        let metadata = stat(path)?;
        self.read_with(path, &metadata)
    }

    /// Read the object at `path` using metadata the caller already holds.
    pub fn read_with(&self, path: &Path, metadata: &Metadata) -> ObjectResult<FileSystemObject> {
        let content = if metadata.is_dir() {
            None
        } else {
            let bytes = fs::read(path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ObjectError::internal(
                    "object_vanished",
                    format!("{} disappeared while being read", path.display()),
                ),
                _ => ObjectError::io("read_error", path, &e),
            })?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        };

        FileSystemObject::from_entry(&self.root, path, metadata, content)
    }

    /// Object view of `path` without content.
    pub fn describe(&self, path: &Path, metadata: &Metadata) -> ObjectResult<FileSystemObject> {
        FileSystemObject::from_entry(&self.root, path, metadata, None)
    }

    /// Remove a file or an empty directory. An absent target is not an error.
    pub fn delete(&self, path: &Path) -> ObjectResult<()> {
        let Some(metadata) = existing_metadata(path)? else {
            debug!("Nothing to delete at {}", path.display());
            return Ok(());
        };

        let removed = if metadata.is_dir() {
            let mut children = fs::read_dir(path)
                .map_err(|e| ObjectError::io("deletion_error", path, &e))?;
            if children.next().is_some() {
                return Err(ObjectError::unprocessable(
                    "dir_with_children",
                    format!("{} is not empty", path.display()),
                ));
            }
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        match removed {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                Err(ObjectError::io("deletion_error", path, &e))
            }
        }
    }

    /// Immediate children of the directory at `path`, sorted by name.
    pub fn list(&self, path: &Path) -> ObjectResult<Vec<StoreEntry>> {
        let browse_error = |e: io::Error| {
            error!("Failed to list directory {}: {}", path.display(), e);
            ObjectError::internal(
                "browse_error",
                format!("can't read directory {}: {e}", path.display()),
            )
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(browse_error)? {
            let entry = entry.map_err(browse_error)?;
            let metadata = entry.metadata().map_err(browse_error)?;
            entries.push(StoreEntry {
                path: entry.path(),
                metadata,
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        debug!("Listed {} ({} entries)", path.display(), entries.len());
        Ok(entries)
    }

    fn require_parent(&self, path: &Path) -> ObjectResult<()> {
        let parent_is_dir = path
            .parent()
            .and_then(|parent| fs::metadata(parent).ok())
            .is_some_and(|m| m.is_dir());

        if parent_is_dir {
            Ok(())
        } else {
            Err(ObjectError::not_found(
                "parent_not_found",
                format!("parent directory of {} does not exist", path.display()),
            ))
        }
    }
}

fn existing_metadata(path: &Path) -> ObjectResult<Option<Metadata>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ObjectError::io("stat_error", path, &e)),
    }
}
