//! Path validation
//!
//! Decoding of transport-encoded paths and confinement of decoded paths to
//! a base directory. Nothing here touches the filesystem.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

use crate::error::{ObjectError, ObjectResult};

/// Percent-decode a path received from the transport.
///
/// Malformed escapes, non UTF-8 results and NUL bytes are rejected.
pub fn decode_path(encoded: &str) -> ObjectResult<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(ObjectError::bad_request(
                    "error_decoding_path",
                    format!("invalid escape in {encoded:?} at byte {i}"),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let decoded = percent_decode_str(encoded).decode_utf8().map_err(|e| {
        ObjectError::bad_request(
            "error_decoding_path",
            format!("{encoded:?} does not decode to UTF-8: {e}"),
        )
    })?;

    if decoded.contains('\0') {
        return Err(ObjectError::bad_request(
            "error_decoding_path",
            format!("{encoded:?} contains a NUL byte"),
        ));
    }

    Ok(decoded.into_owned())
}

/// Join a decoded relative path onto `base` without leaving it.
///
/// A leading `/` is treated as relative to `base`, `.` components are
/// dropped and `..` is resolved lexically. Climbing above `base` is
/// rejected before any filesystem access.
pub fn sandboxed_join(base: &Path, decoded: &str) -> ObjectResult<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(decoded).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(ObjectError::bad_request(
                        "path_outside_root",
                        format!("{decoded:?} escapes the root directory"),
                    ));
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut joined = base.to_path_buf();
    joined.extend(parts);
    Ok(joined)
}
