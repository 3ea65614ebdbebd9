//! Uploaded files and the names derived from them.
//!
//! Browsers send whatever file name the user picked; some older ones still
//! prefix a client-side path (`C:\fakepath\report.pdf`). Only the final path
//! component is kept, then split the same way for every caller: the stem
//! becomes the download base name and the last suffix, lower-cased and with
//! its leading dot, picks the temp-file suffix.

use crate::config::ConverterConfig;
use crate::error::ConvertError;

/// One file as received from the upload form or read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> FileName {
        FileName::parse(&self.name)
    }
}

/// A file name split into the parts the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    /// The name as shown to the user (client path prefix removed).
    pub original: String,
    /// File stem, used to name downloads.
    pub base_name: String,
    /// Lower-cased extension with its leading dot, or empty.
    pub extension: String,
}

impl FileName {
    pub fn parse(raw: &str) -> Self {
        let original = raw
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(raw)
            .trim()
            .to_string();

        // A leading dot alone (".bashrc") is part of the stem, not an extension.
        let (base_name, extension) = match original.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < original.len() => (
                original[..idx].to_string(),
                original[idx..].to_ascii_lowercase(),
            ),
            _ => (original.clone(), String::new()),
        };

        Self {
            original,
            base_name,
            extension,
        }
    }

    /// Fail with [`ConvertError::UnsupportedExtension`] unless the extension
    /// is on `config`'s allow-list.
    pub fn ensure_supported(&self, config: &ConverterConfig) -> Result<(), ConvertError> {
        if config.is_supported(&self.extension) {
            Ok(())
        } else {
            Err(ConvertError::UnsupportedExtension {
                name: self.original.clone(),
                extension: self.extension.clone(),
            })
        }
    }
}
