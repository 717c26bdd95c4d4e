//! Object model
//!
//! `FileSystemObject` is the API view of one filesystem entry. It is built on
//! demand from an entry's metadata and never stored on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Component, Path};

use crate::error::{ObjectError, ObjectResult};

/// Kind of a filesystem object, `F` or `D` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "F")]
    File,
    #[serde(rename = "D")]
    Directory,
}

impl ObjectType {
    pub fn of(metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            ObjectType::Directory
        } else {
            ObjectType::File
        }
    }
}

/// One file or directory as seen through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemObject {
    /// Base name of the entry
    pub name: String,
    /// Parent directory relative to the browsable root, `.` at the top
    pub path: String,
    /// Size in bytes, 0 for directories
    pub size: u64,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileSystemObject {
    /// Build the view of `absolute`, which must lie under `root`.
    pub fn from_entry(
        root: &Path,
        absolute: &Path,
        metadata: &Metadata,
        content: Option<String>,
    ) -> ObjectResult<Self> {
        let object_type = ObjectType::of(metadata);
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| ObjectError::io("stat_error", absolute, &e))?;

        Ok(Self {
            name: absolute
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: relative_parent(root, absolute)?,
            size: match object_type {
                ObjectType::File => metadata.len(),
                ObjectType::Directory => 0,
            },
            object_type,
            created_at: modified,
            updated_at: modified,
            content: match object_type {
                ObjectType::File => content,
                ObjectType::Directory => None,
            },
        })
    }

    pub fn is_dir(&self) -> bool {
        self.object_type == ObjectType::Directory
    }
}

/// Body of a create request: the desired type and, for files, the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRequest {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(default)]
    pub content: String,
}

impl ObjectRequest {
    pub fn file(content: impl Into<String>) -> Self {
        Self {
            object_type: ObjectType::File,
            content: content.into(),
        }
    }

    pub fn directory() -> Self {
        Self {
            object_type: ObjectType::Directory,
            content: String::new(),
        }
    }
}

/// POSIX path of the parent of `absolute`, relative to `root`.
fn relative_parent(root: &Path, absolute: &Path) -> ObjectResult<String> {
    let relative = absolute.strip_prefix(root).map_err(|_| {
        ObjectError::internal(
            "relativization_error",
            format!(
                "{} is not under {}",
                absolute.display(),
                root.display()
            ),
        )
    })?;

    let parts: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_parent() {
        let root = Path::new("/srv/site");
        assert_eq!(relative_parent(root, Path::new("/srv/site")).unwrap(), ".");
        assert_eq!(
            relative_parent(root, Path::new("/srv/site/a.txt")).unwrap(),
            "."
        );
        assert_eq!(
            relative_parent(root, Path::new("/srv/site/docs/guide/a.txt")).unwrap(),
            "docs/guide"
        );
    }

    #[test]
    fn test_relative_parent_outside_root_is_internal() {
        let err = relative_parent(Path::new("/srv/site"), Path::new("/etc/passwd")).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.code(), "relativization_error");
    }

    #[test]
    fn test_from_entry_directory_has_no_size_or_content() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.txt"), "hello").unwrap();

        let metadata = fs::metadata(&docs).unwrap();
        let object =
            FileSystemObject::from_entry(dir.path(), &docs, &metadata, Some("x".into())).unwrap();

        assert_eq!(object.name, "docs");
        assert_eq!(object.path, ".");
        assert_eq!(object.size, 0);
        assert_eq!(object.object_type, ObjectType::Directory);
        assert_eq!(object.content, None);
        assert_eq!(object.created_at, object.updated_at);
    }

    #[test]
    fn test_timestamps_come_from_mtime() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "abc").unwrap();
        let metadata = fs::metadata(&file).unwrap();
        let expected = DateTime::<Utc>::from(metadata.modified().unwrap());

        let object = FileSystemObject::from_entry(dir.path(), &file, &metadata, None).unwrap();
        assert_eq!(object.updated_at, expected);
        assert_eq!(object.created_at, expected);
        assert_ne!(object.updated_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_wire_format() {
        let request: ObjectRequest = serde_json::from_str(r#"{"type":"D"}"#).unwrap();
        assert_eq!(request, ObjectRequest::directory());

        let request: ObjectRequest =
            serde_json::from_str(r#"{"type":"F","content":"funky soul"}"#).unwrap();
        assert_eq!(request, ObjectRequest::file("funky soul"));

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "abc").unwrap();
        let metadata = fs::metadata(&file).unwrap();
        let object =
            FileSystemObject::from_entry(dir.path(), &file, &metadata, Some("abc".into())).unwrap();

        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["type"], "F");
        assert_eq!(json["size"], 3);
        assert_eq!(json["content"], "abc");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
