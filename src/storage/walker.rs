//! Tree walker
//!
//! Flattens a directory subtree into the list of files it contains,
//! depth-first in name order. Traversal uses an explicit stack so very deep
//! trees do not grow the call stack.

use log::debug;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::error::ObjectResult;
use crate::storage::object::FileSystemObject;
use crate::storage::resolver::ResolvedPath;
use crate::storage::store::ObjectStore;

/// Where a branch name is matched when excluding it from a browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusionScope {
    /// Any directory or file with the excluded name, at any depth
    #[default]
    AnyDepth,
    /// Only the entry with the excluded name directly under the browsable root
    TopLevel,
}

struct PendingEntry {
    path: PathBuf,
    metadata: Metadata,
    depth: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    store: &'a ObjectStore,
    scope: ExclusionScope,
}

impl<'a> TreeWalker<'a> {
    pub fn new(store: &'a ObjectStore, scope: ExclusionScope) -> Self {
        Self { store, scope }
    }

    /// Collect every file under `target`.
    ///
    /// `max_depth` of 0 means unbounded; otherwise entries deeper than
    /// `max_depth` below `target` are pruned. Entries named `exclude` are
    /// skipped together with everything beneath them. A file target yields
    /// itself.
    pub fn browse(
        &self,
        target: &ResolvedPath,
        max_depth: u32,
        exclude: &str,
    ) -> ObjectResult<Vec<FileSystemObject>> {
        let mut objects = Vec::new();
        let mut pending = vec![PendingEntry {
            path: target.absolute.clone(),
            metadata: target.metadata.clone(),
            depth: 0,
        }];

        while let Some(entry) = pending.pop() {
            if max_depth != 0 && entry.depth > max_depth {
                continue;
            }

            if self.is_excluded(&entry.path, exclude) {
                debug!("Skipping excluded branch {}", entry.path.display());
                continue;
            }

            if !entry.metadata.is_dir() {
                objects.push(self.store.describe(&entry.path, &entry.metadata)?);
                continue;
            }

            if max_depth != 0 && entry.depth == max_depth {
                continue;
            }

            let children = self.store.list(&entry.path)?;
            pending.extend(children.into_iter().rev().map(|child| PendingEntry {
                path: child.path,
                metadata: child.metadata,
                depth: entry.depth + 1,
            }));
        }

        debug!(
            "Browsed {} (max depth {}, excluding {:?}): {} files",
            target.absolute.display(),
            max_depth,
            exclude,
            objects.len()
        );
        Ok(objects)
    }

    fn is_excluded(&self, path: &Path, exclude: &str) -> bool {
        let Ok(relative) = path.strip_prefix(self.store.root()) else {
            return false;
        };
        // the browsable root itself is never a branch
        if relative.as_os_str().is_empty() {
            return false;
        }

        match self.scope {
            ExclusionScope::AnyDepth => path.file_name().is_some_and(|name| name == exclude),
            ExclusionScope::TopLevel => {
                relative.components().count() == 1 && relative.as_os_str() == exclude
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::resolver::PathResolver;
    use std::fs;
    use tempfile::TempDir;

    /// root_file.txt
    /// dir_level_1/file_level_1.txt
    /// dir_level_1/dir_level_2/file_level_2.txt
    /// dir_level_1/dir_level_2/dir_level_3/file_level_3.txt
    /// pages/home.page
    /// pub_pages/home.page
    fn fixture() -> (TempDir, ObjectStore, PathResolver) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("dir_level_1/dir_level_2/dir_level_3")).unwrap();
        fs::create_dir(root.join("pages")).unwrap();
        fs::create_dir(root.join("pub_pages")).unwrap();
        fs::write(root.join("root_file.txt"), "root").unwrap();
        fs::write(root.join("dir_level_1/file_level_1.txt"), "1").unwrap();
        fs::write(root.join("dir_level_1/dir_level_2/file_level_2.txt"), "2").unwrap();
        fs::write(
            root.join("dir_level_1/dir_level_2/dir_level_3/file_level_3.txt"),
            "3",
        )
        .unwrap();
        fs::write(root.join("pages/home.page"), "draft").unwrap();
        fs::write(root.join("pub_pages/home.page"), "published").unwrap();

        let store = ObjectStore::new(root);
        let resolver = PathResolver::new(root);
        (dir, store, resolver)
    }

    fn names(objects: &[FileSystemObject]) -> Vec<String> {
        objects
            .iter()
            .map(|o| format!("{}/{}", o.path, o.name))
            .collect()
    }

    #[test]
    fn test_browse_unbounded_excluding_published() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve(".%2F").unwrap();

        let objects = walker.browse(&target, 0, "pub_pages").unwrap();
        assert_eq!(
            names(&objects),
            vec![
                "dir_level_1/dir_level_2/dir_level_3/file_level_3.txt",
                "dir_level_1/dir_level_2/file_level_2.txt",
                "dir_level_1/file_level_1.txt",
                "pages/home.page",
                "./root_file.txt",
            ]
        );
        assert!(objects.iter().all(|o| o.content.is_none()));
    }

    #[test]
    fn test_browse_excluding_drafts() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve(".%2F").unwrap();

        let objects = walker.browse(&target, 0, "pages").unwrap();
        let names = names(&objects);
        assert!(names.contains(&"pub_pages/home.page".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("pages")));
    }

    #[test]
    fn test_browse_depth_bound() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve(".%2F").unwrap();

        let objects = walker.browse(&target, 1, "pub_pages").unwrap();
        assert_eq!(names(&objects), vec!["./root_file.txt"]);

        let objects = walker.browse(&target, 2, "pub_pages").unwrap();
        assert_eq!(
            names(&objects),
            vec![
                "dir_level_1/file_level_1.txt",
                "pages/home.page",
                "./root_file.txt",
            ]
        );
    }

    #[test]
    fn test_browse_subdirectory() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve("dir_level_1").unwrap();

        let objects = walker.browse(&target, 0, "pub_pages").unwrap();
        assert_eq!(objects.len(), 3);
    }

    #[test]
    fn test_browse_single_file_target() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve("root_file.txt").unwrap();

        let objects = walker.browse(&target, 0, "pub_pages").unwrap();
        assert_eq!(names(&objects), vec!["./root_file.txt"]);
        assert_eq!(objects[0].size, 4);
    }

    #[test]
    fn test_browse_excluded_target_is_empty() {
        let (_dir, store, resolver) = fixture();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);
        let target = resolver.resolve("pages").unwrap();

        assert!(walker.browse(&target, 0, "pages").unwrap().is_empty());
    }

    #[test]
    fn test_exclusion_scope() {
        let (dir, store, resolver) = fixture();
        fs::create_dir(dir.path().join("dir_level_1/pub_pages")).unwrap();
        fs::write(dir.path().join("dir_level_1/pub_pages/nested.txt"), "n").unwrap();
        let target = resolver.resolve(".%2F").unwrap();

        let any_depth = TreeWalker::new(&store, ExclusionScope::AnyDepth)
            .browse(&target, 0, "pub_pages")
            .unwrap();
        assert!(!names(&any_depth).contains(&"dir_level_1/pub_pages/nested.txt".to_string()));

        let top_level = TreeWalker::new(&store, ExclusionScope::TopLevel)
            .browse(&target, 0, "pub_pages")
            .unwrap();
        let top_level = names(&top_level);
        assert!(top_level.contains(&"dir_level_1/pub_pages/nested.txt".to_string()));
        assert!(!top_level.contains(&"pub_pages/home.page".to_string()));
    }

    #[test]
    fn test_browse_empty_directory() {
        let (dir, store, resolver) = fixture();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let walker = TreeWalker::new(&store, ExclusionScope::AnyDepth);

        let target = resolver.resolve("empty").unwrap();
        assert!(walker.browse(&target, 0, "pub_pages").unwrap().is_empty());
    }
}
