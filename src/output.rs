//! Conversion results and the downloadable artefacts derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of converting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Text returned by the external converter (Markdown).
    pub text_content: String,
    /// Size of the input document in bytes.
    pub input_bytes: usize,
    /// Wall-clock time spent staging and converting, in milliseconds.
    pub duration_ms: u64,
}

/// The two export flavours offered for every converted file.
///
/// Both carry byte-identical content; only the file name suffix and the
/// declared media type differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `<base>_converted.md`, `text/markdown`
    Markdown,
    /// `<base>_converted.txt`, `text/plain`
    PlainText,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Markdown, ExportFormat::PlainText];

    /// Short URL/CLI token: `md` or `txt`.
    pub fn token(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::PlainText => "txt",
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "_converted.md",
            ExportFormat::PlainText => "_converted.txt",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::PlainText => "text/plain",
        }
    }

    /// Button label shown on the results page.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "Download as Markdown (.md)",
            ExportFormat::PlainText => "Download as Plain Text (.txt)",
        }
    }

    pub fn file_name(self, base_name: &str) -> String {
        format!("{base_name}{}", self.suffix())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "txt" | "text" | "plain" => Ok(ExportFormat::PlainText),
            other => Err(format!("unknown export format '{other}' (expected md or txt)")),
        }
    }
}

/// A ready-to-send download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub file_name: String,
    pub media_type: &'static str,
    pub content: String,
}

impl Download {
    pub fn new(format: ExportFormat, base_name: &str, content: &str) -> Self {
        Self {
            file_name: format.file_name(base_name),
            media_type: format.media_type(),
            content: content.to_string(),
        }
    }
}
