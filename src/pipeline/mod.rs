//! Pipeline stages for upload-to-text conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the external converter can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ staging ──▶ converter ──▶ postprocess
//! (name,     (scoped      (external     (optional
//!  bytes)     temp file)   program)      cleanup)
//! ```
//!
//! 1. [`upload`]  — split the client-supplied file name into base name and
//!    lower-cased extension, and check it against the allow-list
//! 2. [`staging`] — write the bytes to a uniquely named temp file carrying the
//!    original extension; the file is removed when the guard drops
//! 3. [`crate::converter`] — run the external converter on the staged path
//! 4. [`postprocess`] — deterministic whitespace/Unicode cleanup, off by default

pub mod postprocess;
pub mod staging;
pub mod upload;
