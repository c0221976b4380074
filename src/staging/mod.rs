//! Transient storage for uploaded files
//!
//! Every upload is written to its own uniquely named file inside the staging
//! directory. The returned [`StagedFile`] removes that file when dropped, so
//! cleanup happens on every exit path.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Directory where uploads are staged for the duration of one request
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the staging directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Write `bytes` to a fresh `upload-*` file with a random suffix.
    ///
    /// The client-supplied filename is never part of the path.
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedFile> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;

        debug!(path = %file.path().display(), bytes = bytes.len(), "Upload staged");
        Ok(StagedFile { file })
    }
}

/// A staged upload, deleted when dropped
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_stage_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let staged = area.stage(b"hello").unwrap();
        assert_eq!(fs::read(staged.path()).unwrap(), b"hello");
        assert!(staged.path().starts_with(dir.path()));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let staged = area.stage(b"bytes").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_staged_name_has_upload_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagingArea::new(dir.path()).stage(b"x").unwrap();
        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("upload-"), "unexpected name {}", name);
    }

    #[test]
    fn test_unique_paths() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let a = area.stage(b"same").unwrap();
        let b = area.stage(b"same").unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(entries(dir.path()), 2);
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagingArea::new(dir.path()).stage(b"x").unwrap();
        fs::remove_file(staged.path()).unwrap();
        drop(staged);
    }

    #[test]
    fn test_missing_dir_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("absent"));
        let err = area.stage(b"x").unwrap_err();
        assert!(matches!(err, crate::error::DetectorError::Storage(_)));

        area.ensure_dir().unwrap();
        assert!(area.stage(b"x").is_ok());
    }
}
