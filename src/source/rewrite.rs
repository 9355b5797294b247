//! Writing transformed records back into their source file.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::SourceDocument;
use crate::error::{QbankError, Result};
use crate::record::QuestionRecord;

const INDENT: &[u8] = b"    ";

/// Canonical text of a record array: pretty JSON, four-space indent,
/// parsed key order, non-ASCII characters written as-is
pub fn serialize_records(records: &[QuestionRecord]) -> Result<String> {
    let value = Value::Array(records.iter().map(|r| Value::Object(r.fields().clone())).collect());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `prefix + serialize_records(records) + suffix`
pub fn render_document(doc: &SourceDocument, records: &[QuestionRecord]) -> Result<String> {
    Ok(doc.splice(&serialize_records(records)?))
}

/// `<path><suffix>`, e.g. `data_A.js.bak`
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Renames the original to its backup name, then writes `contents` in its place.
///
/// Not atomic: if the write fails after the rename, the original survives
/// only under the backup name.
pub fn write_with_backup(path: &Path, contents: &str, backup_suffix: &str) -> Result<PathBuf> {
    let backup = backup_path(path, backup_suffix);
    fs::rename(path, &backup).map_err(|source| QbankError::Backup {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| QbankError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(backup)
}

/// Writes `contents` to a separate output file, creating parent directories
pub fn write_to(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| QbankError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| QbankError::Write {
        path: path.to_path_buf(),
        source,
    })
}
