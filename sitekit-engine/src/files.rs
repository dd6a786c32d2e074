//! Settings files: export targets and import sources.
//!
//! ## `WorkDir::write`: atomic protocol
//!
//! 1. Write the rendered JSON to `<path>.sitekit.tmp`.
//! 2. Rename onto the final path (atomic on POSIX).
//! 3. On rename failure, remove the temp file and report the final path.
//!
//! Sources are either paths relative to the working directory or `data:`
//! URIs (what a browser file picker hands over).

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::error::{io_err, FileError};

/// Where exports land and where imports are read from.
pub trait SettingsFiles {
    /// Names of the `.json` files available for import, sorted.
    fn list(&self) -> Result<Vec<String>, FileError>;

    /// Contents of `source`, a file name or a `data:` URI.
    fn read(&self, source: &str) -> Result<String, FileError>;

    /// Store `contents` under `name` and return where it went.
    fn write(&self, name: &str, contents: &str) -> Result<PathBuf, FileError>;
}

/// A directory on disk, usually the process working directory.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The current working directory.
    pub fn current() -> Result<Self, FileError> {
        let root = std::env::current_dir().map_err(|e| io_err(".", e))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SettingsFiles for WorkDir {
    fn list(&self) -> Result<Vec<String>, FileError> {
        let entries = fs::read_dir(&self.root).map_err(|e| io_err(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.root, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, source: &str) -> Result<String, FileError> {
        if source.starts_with("data:") {
            return decode_data_uri(source);
        }
        let path = self.root.join(source);
        fs::read_to_string(&path).map_err(|e| io_err(path, e))
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf, FileError> {
        let path = self.root.join(name);
        let tmp = PathBuf::from(format!("{}.sitekit.tmp", path.display()));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;

        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }

        tracing::info!("wrote: {}", path.display());
        Ok(path)
    }
}

/// Decode `data:[<mediatype>][;base64],<payload>`.
///
/// Base64 payloads may use either the standard or the URL-safe alphabet,
/// padded or not. Other payloads are percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<String, FileError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FileError::DataUri("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FileError::DataUri("missing ',' before payload".into()))?;

    if header.ends_with(";base64") {
        let normalized: String = payload
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        let bytes = STANDARD_NO_PAD
            .decode(normalized)
            .map_err(|e| FileError::DataUri(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| FileError::DataUri(e.to_string()))
    } else {
        urlencoding::decode(payload)
            .map(|decoded| decoded.into_owned())
            .map_err(|e| FileError::DataUri(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn list_returns_sorted_json_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("schema.3_b.2.json"), "{}").unwrap();
        fs::write(tmp.path().join("policies.3_a.1.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("dir.json")).unwrap();

        let files = WorkDir::new(tmp.path()).list().unwrap();
        assert_eq!(files, vec!["policies.3_a.1.json", "schema.3_b.2.json"]);
    }

    #[test]
    fn write_then_read_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let dir = WorkDir::new(tmp.path());

        let path = dir.write("schema.3_a.1.json", "{\n  \"a\": 1\n}").unwrap();
        assert_eq!(path, tmp.path().join("schema.3_a.1.json"));
        assert!(!tmp.path().join("schema.3_a.1.json.sitekit.tmp").exists());
        assert_eq!(dir.read("schema.3_a.1.json").unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn write_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let dir = WorkDir::new(tmp.path());
        dir.write("a.json", "old").unwrap();
        dir.write("a.json", "new").unwrap();
        assert_eq!(dir.read("a.json").unwrap(), "new");
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let err = WorkDir::new(tmp.path()).read("absent.json").unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn data_uri_variants() {
        // {"a":1} in standard and URL-safe base64, and percent-encoded.
        assert_eq!(
            decode_data_uri("data:application/json;base64,eyJhIjoxfQ==").unwrap(),
            r#"{"a":1}"#
        );
        assert_eq!(decode_data_uri("data:;base64,eyJhIjoxfQ").unwrap(), r#"{"a":1}"#);
        assert_eq!(
            decode_data_uri("data:application/json,%7B%22a%22%3A1%7D").unwrap(),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn data_uri_without_payload_separator_is_rejected() {
        assert!(matches!(
            decode_data_uri("data:application/json;base64"),
            Err(FileError::DataUri(_))
        ));
    }

    #[test]
    fn read_accepts_data_uri() {
        let tmp = TempDir::new().unwrap();
        let dir = WorkDir::new(tmp.path());
        assert_eq!(dir.read("data:;base64,W10=").unwrap(), "[]");
    }
}
