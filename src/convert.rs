//! The conversion adapter: bytes or a local file in, text out.
//!
//! [`convert_bytes`] is the per-upload contract. It stages the bytes in a
//! scoped temp file carrying the original extension, runs the converter on
//! that path, and lets the guard delete the file on every exit path.
//! [`convert_file`] skips staging for documents already on disk, and
//! [`convert_to_file`] adds an atomic write of the result.

use crate::config::ConverterConfig;
use crate::converter::DocumentConverter;
use crate::error::ConvertError;
use crate::output::ConversionOutput;
use crate::pipeline::{postprocess, staging};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Convert in-memory document bytes.
///
/// # Arguments
/// * `converter` — the external converter to invoke
/// * `bytes`     — raw document bytes
/// * `extension` — lower-cased extension with leading dot (e.g. `".pdf"`),
///   used as the temp-file suffix so the converter can pick a parser
/// * `config`    — temp dir and output cleanup settings
///
/// # Errors
/// [`ConvertError::TempFile`] if staging fails, or whatever the converter
/// returns. The staged file is removed in both cases.
pub async fn convert_bytes(
    converter: &dyn DocumentConverter,
    bytes: &[u8],
    extension: &str,
    config: &ConverterConfig,
) -> Result<ConversionOutput, ConvertError> {
    let start = Instant::now();

    let staged = staging::stage(bytes, extension, config.temp_dir.as_deref())?;
    let result = converter.convert_path(staged.path()).await;
    // Release before inspecting the result: removal never depends on success.
    drop(staged);

    let text_content = finish(result?.text_content, config);
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "{} converted {} bytes to {} chars in {}ms",
        converter.name(),
        bytes.len(),
        text_content.len(),
        duration_ms
    );

    Ok(ConversionOutput {
        text_content,
        input_bytes: bytes.len(),
        duration_ms,
    })
}

/// Convert a document that already exists on disk, without staging.
pub async fn convert_file(
    converter: &dyn DocumentConverter,
    path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionOutput, ConvertError> {
    let start = Instant::now();
    let path = path.as_ref();
    let input_bytes = check_readable(path)?;

    let output = converter.convert_path(path).await?;
    let text_content = finish(output.text_content, config);

    Ok(ConversionOutput {
        text_content,
        input_bytes,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Convert a local document and write the text directly to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    converter: &dyn DocumentConverter,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionOutput, ConvertError> {
    let output = convert_file(converter, input_path, config).await?;
    write_atomic(output_path.as_ref(), &output.text_content).await?;
    Ok(output)
}

/// Write `content` to `path` via a sibling `.tmp` file and a rename.
pub async fn write_atomic(path: &Path, content: &str) -> Result<(), ConvertError> {
    let write_err = |e: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, content).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn finish(text: String, config: &ConverterConfig) -> String {
    if config.clean_output {
        postprocess::clean_text(&text)
    } else {
        text
    }
}

/// Validate that `path` exists and can be opened; return its size.
fn check_readable(path: &Path) -> Result<usize, ConvertError> {
    match std::fs::File::open(path).and_then(|f| f.metadata()) {
        Ok(meta) if meta.is_file() => Ok(meta.len() as usize),
        Ok(_) => Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the staged path and whether it existed during conversion.
    struct Recording {
        reply: Result<String, String>,
        seen: Mutex<Vec<(PathBuf, bool, Vec<u8>)>>,
    }

    impl Recording {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(stderr: &str) -> Self {
            Self {
                reply: Err(stderr.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_path(&self) -> PathBuf {
            self.seen.lock().unwrap().last().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl DocumentConverter for Recording {
        async fn convert_path(&self, path: &Path) -> Result<ConverterOutput, ConvertError> {
            let bytes = std::fs::read(path).unwrap_or_default();
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), path.exists(), bytes));
            match &self.reply {
                Ok(text) => Ok(ConverterOutput {
                    text_content: text.clone(),
                }),
                Err(stderr) => Err(ConvertError::ConverterFailed {
                    program: "recording".into(),
                    status: "exit status: 1".into(),
                    stderr: stderr.clone(),
                }),
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn config_in(dir: &Path) -> ConverterConfig {
        ConverterConfig::builder().temp_dir(dir).build().unwrap()
    }

    #[tokio::test]
    async fn every_supported_extension_converts_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        for ext in [".docx", ".xlsx", ".pptx", ".pdf", ".html", ".htm"] {
            let conv = Recording::ok("# Converted\n");
            let out = convert_bytes(&conv, b"document", ext, &config).await.unwrap();
            assert!(!out.text_content.is_empty());
            assert_eq!(out.input_bytes, 8);

            let seen = conv.seen.lock().unwrap();
            let (path, existed, bytes) = &seen[0];
            assert!(*existed, "staged file must exist while converting");
            assert_eq!(bytes, b"document");
            assert!(path.to_str().unwrap().ends_with(ext));
            assert!(!path.exists(), "staged {ext} file must be removed");
        }
    }

    #[tokio::test]
    async fn failure_still_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let conv = Recording::failing("File is not a zip file");

        let err = convert_bytes(&conv, b"garbage", ".docx", &config_in(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::ConverterFailed { .. }));
        assert!(!conv.last_path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn report_scenario_returns_text_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let conv = Recording::ok("# Report\n...");
        let out = convert_bytes(&conv, b"%PDF-1.4", ".pdf", &config_in(dir.path()))
            .await
            .unwrap();
        assert_eq!(out.text_content, "# Report\n...");
        assert!(conv.last_path().to_str().unwrap().ends_with(".pdf"));
    }

    #[tokio::test]
    async fn clean_output_applies_postprocess() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConverterConfig::builder()
            .temp_dir(dir.path())
            .clean_output(true)
            .build()
            .unwrap();
        let conv = Recording::ok("# A  \r\n\r\nb");
        let out = convert_bytes(&conv, b"x", ".html", &config).await.unwrap();
        assert_eq!(out.text_content, "# A\n\nb\n");
    }

    #[tokio::test]
    async fn convert_file_uses_path_directly() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        std::fs::write(&input, "<h1>Hi</h1>").unwrap();

        let conv = Recording::ok("# Hi\n");
        let out = convert_file(&conv, &input, &ConverterConfig::default())
            .await
            .unwrap();
        assert_eq!(out.text_content, "# Hi\n");
        assert_eq!(out.input_bytes, 11);
        assert_eq!(conv.last_path(), input);
        assert!(input.exists(), "caller's file must not be removed");
    }

    #[tokio::test]
    async fn convert_file_missing_input() {
        let conv = Recording::ok("");
        let err = convert_file(&conv, "/definitely/not/here.pdf", &ConverterConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
        assert!(conv.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn convert_to_file_writes_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("deck.pptx");
        std::fs::write(&input, "pptx").unwrap();
        let out_path = dir.path().join("out").join("deck_converted.md");

        let conv = Recording::ok("## Slide 1\n");
        convert_to_file(&conv, &input, &out_path, &ConverterConfig::default())
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "## Slide 1\n");
        assert!(!tmp_sibling(&out_path).exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        let target = dir.path().join("x_converted.md");
        std::fs::create_dir(&target).unwrap();

        let err = write_atomic(&target, "# X\n").await.unwrap_err();
        assert!(matches!(err, ConvertError::OutputWriteFailed { .. }), "got: {err}");
        assert!(!tmp_sibling(&target).exists());
        assert!(target.is_dir());
    }

    #[test]
    fn tmp_sibling_appends_suffix() {
        assert_eq!(
            tmp_sibling(Path::new("/a/b_converted.md")),
            PathBuf::from("/a/b_converted.md.tmp")
        );
    }
}
