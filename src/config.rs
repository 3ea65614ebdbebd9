//! Configuration types for document conversion and the upload server.
//!
//! Conversion behaviour is controlled through [`ConverterConfig`] and the HTTP
//! surface through [`ServerConfig`]; both are built via validating builders
//! and fall back to documented defaults for anything the caller leaves unset.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// File extensions accepted by default, without the leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &["docx", "xlsx", "pptx", "pdf", "html", "htm"];

/// Configuration for the per-file conversion pipeline.
///
/// # Example
/// ```rust
/// use office2md::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .program("/usr/local/bin/markitdown")
///     .timeout_secs(120)
///     .build()
///     .unwrap();
/// assert!(config.is_supported(".PDF"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Converter executable. `None` locates `markitdown` via `converter-locate`.
    pub program: Option<PathBuf>,

    /// Extra arguments placed before the input path.
    pub args: Vec<String>,

    /// Per-file converter timeout in seconds. Default: 300.
    pub timeout_secs: u64,

    /// Directory for staged uploads. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Apply the output cleanup rules in [`crate::pipeline::postprocess`].
    /// Default: false, so downloads match the converter output exactly.
    pub clean_output: bool,

    /// Accepted extensions, lower-case, without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout_secs: 300,
            temp_dir: None,
            clean_output: false,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `extension` (with or without the leading dot, any case) is
    /// on the allow-list.
    pub fn is_supported(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        !ext.is_empty() && self.allowed_extensions.iter().any(|a| *a == ext)
    }

    /// The allow-list rendered as an HTML `accept` attribute value.
    pub fn accept_attribute(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.program = Some(program.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    /// Replace the allow-list. Leading dots and case are normalised.
    pub fn allowed_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.allowed_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, ConvertError> {
        let c = &self.config;
        if c.timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "Converter timeout must be ≥ 1 second".into(),
            ));
        }
        if c.allowed_extensions.iter().all(|e| e.is_empty()) {
            return Err(ConvertError::InvalidConfig(
                "At least one file extension must be allowed".into(),
            ));
        }
        if let Some(ref dir) = c.temp_dir {
            if !dir.is_dir() {
                return Err(ConvertError::InvalidConfig(format!(
                    "Temp dir '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

/// Configuration for the upload/render HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address. Default: 127.0.0.1:8501.
    pub bind: SocketAddr,

    /// Maximum request body size in bytes. Default: 200 MiB.
    pub max_upload_bytes: usize,

    /// How many upload sessions keep their results for download. Default: 64.
    pub session_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8501),
            max_upload_bytes: 200 * 1024 * 1024,
            session_capacity: 64,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.bind = addr;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn session_capacity(mut self, n: usize) -> Self {
        self.config.session_capacity = n.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, ConvertError> {
        if self.config.max_upload_bytes == 0 {
            return Err(ConvertError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_list() {
        let c = ConverterConfig::default();
        for ext in [".docx", ".xlsx", ".pptx", ".pdf", ".html", ".htm"] {
            assert!(c.is_supported(ext), "{ext} should be supported");
        }
        assert!(c.is_supported("PDF"));
        assert!(!c.is_supported(".rtf"));
        assert!(!c.is_supported(""));
        assert!(!c.is_supported("."));
    }

    #[test]
    fn accept_attribute_lists_dotted_extensions() {
        let c = ConverterConfig::default();
        assert_eq!(c.accept_attribute(), ".docx,.xlsx,.pptx,.pdf,.html,.htm");
    }

    #[test]
    fn builder_normalises_extensions() {
        let c = ConverterConfig::builder()
            .allowed_extensions([".PDF", "Html"])
            .build()
            .unwrap();
        assert_eq!(c.allowed_extensions, vec!["pdf", "html"]);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ConverterConfig::builder().timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn empty_allow_list_rejected() {
        let err = ConverterConfig::builder()
            .allowed_extensions(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn missing_temp_dir_rejected() {
        let err = ConverterConfig::builder()
            .temp_dir("/definitely/not/a/dir")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn args_accumulate_in_order() {
        let c = ConverterConfig::builder()
            .arg("--use-plugins")
            .args(["-x", "y"])
            .build()
            .unwrap();
        assert_eq!(c.args, vec!["--use-plugins", "-x", "y"]);
    }

    #[test]
    fn server_defaults() {
        let s = ServerConfig::default();
        assert_eq!(s.bind.port(), 8501);
        assert_eq!(s.max_upload_bytes, 200 * 1024 * 1024);
        assert_eq!(ServerConfig::builder().session_capacity(0).build().unwrap().session_capacity, 1);
    }
}
