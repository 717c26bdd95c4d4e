//! Publish coordinator
//!
//! A page lives as `<name>.page` under the draft root. Publishing copies it
//! byte for byte to the same relative path under the published root;
//! unpublishing deletes that copy. The draft is never modified here.

use log::{error, info};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::RootPaths;
use crate::error::{ObjectError, ObjectResult};
use crate::storage::resolver::stat;
use crate::storage::store::ObjectStore;
use crate::storage::validation::{decode_path, sandboxed_join};

pub const PAGE_SUFFIX: &str = ".page";

/// Append the page suffix unless `name` already carries it.
pub fn page_name(name: &str) -> Cow<'_, str> {
    if name.ends_with(PAGE_SUFFIX) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}{PAGE_SUFFIX}"))
    }
}

#[derive(Debug, Clone)]
pub struct PublishCoordinator {
    draft_root: PathBuf,
    published_root: PathBuf,
    store: ObjectStore,
}

impl PublishCoordinator {
    pub fn new(roots: &RootPaths) -> Self {
        Self {
            draft_root: roots.draft_pages_root(),
            published_root: roots.published_pages_root(),
            store: ObjectStore::new(roots.browsable_root()),
        }
    }

    /// Copy the draft page named by `encoded` into the published branch.
    pub fn publish(&self, encoded: &str) -> ObjectResult<()> {
        let page = decode_page(encoded)?;
        let draft = sandboxed_join(&self.draft_root, &page)?;

        if stat(&draft)?.is_dir() {
            return Err(ObjectError::unprocessable(
                "cannot_publish_dir",
                "the path is a directory, only pages can be published",
            ));
        }

        let published = sandboxed_join(&self.published_root, &page)?;
        copy_page(&draft, &published)?;

        info!("Published page {page}");
        Ok(())
    }

    /// Remove the published copy of the page named by `encoded`.
    pub fn unpublish(&self, encoded: &str) -> ObjectResult<()> {
        let page = decode_page(encoded)?;
        let published = sandboxed_join(&self.published_root, &page)?;

        if stat(&published)?.is_dir() {
            return Err(ObjectError::unprocessable(
                "cannot_unpublish_dir",
                "the path is a directory, only pages can be unpublished",
            ));
        }

        self.store.delete(&published)?;

        info!("Unpublished page {page}");
        Ok(())
    }
}

fn decode_page(encoded: &str) -> ObjectResult<String> {
    let decoded = decode_path(encoded)?;
    Ok(page_name(&decoded).into_owned())
}

/// Copy `source` over `destination`, creating missing destination ancestors.
/// A failed copy may leave a partial destination behind.
fn copy_page(source: &Path, destination: &Path) -> ObjectResult<()> {
    if let Some(folder) = destination.parent() {
        fs::create_dir_all(folder).map_err(|e| {
            error!("Failed to create {}: {}", folder.display(), e);
            ObjectError::io("path_creation_error", folder, &e)
        })?;
    }

    let mut input = File::open(source).map_err(|e| {
        error!("Failed to open draft page {}: {}", source.display(), e);
        ObjectError::io("draft_read_error", source, &e)
    })?;

    let mut output = File::create(destination).map_err(|e| {
        error!("Failed to create published page {}: {}", destination.display(), e);
        ObjectError::io("published_creation_error", destination, &e)
    })?;

    io::copy(&mut input, &mut output).map_err(|e| {
        error!(
            "Failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            e
        );
        ObjectError::io("published_copy_error", destination, &e)
    })?;

    Ok(())
}
