//! Progress-callback trait for per-file batch events.
//!
//! Pass an [`Arc<dyn BatchProgressCallback>`] to
//! [`crate::job::process_batch`] to receive events as each uploaded file is
//! converted. The CLI uses it to drive a terminal spinner; the HTTP surface
//! passes none.
//!
//! # Example
//!
//! ```rust
//! use office2md::BatchProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     failed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {error}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the batch runner as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is handed to the converter.
    fn on_file_start(&self, index: usize, total_files: usize, name: &str) {
        let _ = (index, total_files, name);
    }

    /// Called when a file converted successfully.
    ///
    /// `text_len` is the byte length of the produced text.
    fn on_file_complete(&self, index: usize, total_files: usize, name: &str, text_len: usize) {
        let _ = (index, total_files, name, text_len);
    }

    /// Called when a file failed. `error` is the detailed, developer-facing
    /// description.
    fn on_file_error(&self, index: usize, total_files: usize, name: &str, error: &str) {
        let _ = (index, total_files, name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, "a.pdf");
        cb.on_file_complete(1, 2, "a.pdf", 42);
        cb.on_file_error(2, 2, "b.docx", "bad zip");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_file_start(1, 1, "a.html");
    }
}
