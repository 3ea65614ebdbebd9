//! The external document converter.
//!
//! All real parsing (DOCX/XLSX/PPTX/PDF/HTML) happens in a third-party
//! program. The contract is small: given a path, produce text. The
//! [`DocumentConverter`] trait captures it so the HTTP surface and the CLI
//! receive an explicitly constructed, immutable converter instead of reaching
//! for a global one, and tests can substitute their own.
//!
//! [`CommandConverter`] is the production implementation. It runs
//! `<program> <args...> <path>` (by default `markitdown <path>`) and reads the
//! Markdown from stdout.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Longest stderr excerpt kept in [`ConvertError::ConverterFailed`].
const MAX_STDERR_CHARS: usize = 2000;

/// What a converter returns for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOutput {
    pub text_content: String,
}

/// Anything that can turn a document on disk into Markdown text.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert the document at `path`. The path's extension identifies the
    /// format.
    async fn convert_path(&self, path: &Path) -> Result<ConverterOutput, ConvertError>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &str;
}

/// Runs an external program and captures its stdout.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
    display_name: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        let program = program.into();
        let display_name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            program,
            display_name,
            args,
            timeout,
        }
    }

    /// Build from config, locating the executable when none is configured.
    ///
    /// A configured program, bare name or path, goes through
    /// [`converter_locate::locate`], so `OFFICE2MD_CONVERTER` still wins and
    /// a path must name an executable file.
    pub fn from_config(config: &ConverterConfig) -> Result<Self, ConvertError> {
        let program = match config.program {
            Some(ref p) => converter_locate::locate(&p.to_string_lossy())?,
            None => converter_locate::locate_default()?,
        };
        debug!("Using converter at {}", program.display());
        Ok(Self::new(
            program,
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert_path(&self, path: &Path) -> Result<ConverterOutput, ConvertError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} on {}", self.display_name, path.display());

        let child = cmd.spawn().map_err(|e| ConvertError::ConverterSpawn {
            program: self.display_name.clone(),
            source: e,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ConvertError::ConverterSpawn {
                program: self.display_name.clone(),
                source: e,
            })?,
            Err(_) => {
                warn!(
                    "{} exceeded {}s on {}",
                    self.display_name,
                    self.timeout.as_secs(),
                    path.display()
                );
                return Err(ConvertError::ConverterTimeout {
                    program: self.display_name.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(ConvertError::ConverterFailed {
                program: self.display_name.clone(),
                status: output.status.to_string(),
                stderr: excerpt(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        let text_content =
            String::from_utf8(output.stdout).map_err(|e| ConvertError::InvalidOutput {
                program: self.display_name.clone(),
                detail: e.to_string(),
            })?;

        Ok(ConverterOutput { text_content })
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

/// Trim stderr and keep at most [`MAX_STDERR_CHARS`] characters of its tail,
/// where Python tracebacks put the actual exception.
fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= MAX_STDERR_CHARS {
        return trimmed.to_string();
    }
    let tail: String = trimmed.chars().skip(count - MAX_STDERR_CHARS).collect();
    format!("\u{2026}{tail}")
}
