//! # office2md
//!
//! Upload Word, Excel, PowerPoint, PDF or HTML documents and get Markdown
//! back, as a preview and as `.md` / `.txt` downloads.
//!
//! ## Why this crate?
//!
//! Parsing office formats well is a large problem that existing tools such as
//! Microsoft's `markitdown` already solve. This crate does the plumbing around
//! such a tool: it accepts uploads, stages each one as a uniquely named temp
//! file carrying the original extension, runs the external converter on it,
//! removes the temp file whatever happens, and offers the result for
//! download. One bad file never stops the rest of a batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uploads (multipart form or local paths)
//!  │
//!  ├─ 1. Name     split base name / lower-cased extension, check allow-list
//!  ├─ 2. Stage    bytes → scoped temp file (office2md-XXXX.<ext>)
//!  ├─ 3. Convert  `markitdown <path>` → stdout text (with timeout)
//!  ├─ 4. Polish   optional whitespace/invisible-char cleanup
//!  ├─ 5. Release  temp file dropped on every exit path
//!  └─ 6. Output   job status + preview + <base>_converted.{md,txt}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use office2md::{process_batch, CommandConverter, ConverterConfig, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::default();
//!     let converter = CommandConverter::from_config(&config)?;
//!
//!     let uploads = vec![UploadedFile::new("report.pdf", std::fs::read("report.pdf")?)];
//!     for job in process_batch(&converter, &uploads, &config, None).await {
//!         match job.text_content {
//!             Some(text) => println!("{text}"),
//!             None => eprintln!("{}", job.error.map(|e| e.to_string()).unwrap_or_default()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `office2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! office2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, ServerConfig, ServerConfigBuilder};
pub use convert::{convert_bytes, convert_file, convert_to_file, write_atomic};
pub use converter::{CommandConverter, ConverterOutput, DocumentConverter};
pub use error::{ConvertError, JobError};
pub use job::{process_batch, run_job, ConversionJob, JobId, JobStatus};
pub use output::{ConversionOutput, Download, ExportFormat};
pub use pipeline::upload::{FileName, UploadedFile};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{Session, SessionStore};
pub use web::{router, serve, AppState};
