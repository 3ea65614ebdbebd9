//! Scoped temporary files for uploaded bytes.
//!
//! External converters need a file-system path, and most of them pick a
//! parser from the file extension, so the upload is written to a uniquely
//! named temp file that keeps the original suffix. The file is owned by a
//! [`StagedFile`] guard: dropping it removes the file, whichever way the
//! conversion ends (success, error, timeout, panic, or the request future
//! being dropped).

use crate::error::ConvertError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Prefix for every staged file name.
pub const STAGED_PREFIX: &str = "office2md-";

/// An uploaded document materialised on disk for the lifetime of the guard.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Path the external converter should read.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `bytes` to a new temp file whose name ends in `extension`.
///
/// `temp_dir` overrides the system temp directory. The data is flushed before
/// returning so another process can read the path immediately.
pub fn stage(
    bytes: &[u8],
    extension: &str,
    temp_dir: Option<&Path>,
) -> Result<StagedFile, ConvertError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGED_PREFIX).suffix(extension);

    let mut file = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(ConvertError::TempFile)?;

    file.write_all(bytes).map_err(ConvertError::TempFile)?;
    file.flush().map_err(ConvertError::TempFile)?;

    debug!(
        "Staged {} bytes at {}",
        bytes.len(),
        file.path().display()
    );
    Ok(StagedFile { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_keeps_suffix_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(b"%PDF-1.7 body", ".pdf", Some(dir.path())).unwrap();

        let name = staged.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(STAGED_PREFIX), "got: {name}");
        assert!(name.ends_with(".pdf"), "got: {name}");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"%PDF-1.7 body");
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage(b"<html></html>", ".html", Some(dir.path())).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = stage(b"a", ".docx", Some(dir.path())).unwrap();
        let b = stage(b"b", ".docx", Some(dir.path())).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn empty_upload_is_staged() {
        let staged = stage(b"", ".xlsx", None).unwrap();
        assert_eq!(std::fs::metadata(staged.path()).unwrap().len(), 0);
    }

    #[test]
    fn missing_dir_is_a_temp_file_error() {
        let err = stage(b"x", ".pdf", Some(Path::new("/definitely/not/a/dir"))).unwrap_err();
        assert!(matches!(err, ConvertError::TempFile(_)));
    }
}
