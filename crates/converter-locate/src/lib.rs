//! # converter-locate
//!
//! Find the external document-converter executable that `office2md` shells
//! out to, so users do not have to pass an absolute path on every run.
//!
//! ## How it works
//!
//! On a call to [`locate`] (or [`locate_default`]):
//!
//! 1. If `OFFICE2MD_CONVERTER` is set, it must name an executable file; it is
//!    returned as-is.
//! 2. If the program name already contains a path separator, it is checked
//!    directly.
//! 3. Every directory in `PATH` is searched.
//! 4. Well-known user install directories are searched last: `~/.local/bin`
//!    (pip/pipx), `~/.cargo/bin`, `/usr/local/bin` and `/opt/homebrew/bin`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use converter_locate::{locate, locate_default};
//!
//! // The default converter (markitdown), cached after the first hit.
//! let markitdown = locate_default().expect("markitdown not installed");
//!
//! // Any other program.
//! let pandoc = locate("pandoc").expect("pandoc not installed");
//! ```
//!
//! ## Platform notes
//!
//! On Windows the suffixes `.exe`, `.cmd` and `.bat` are tried in that order.
//! On Unix a candidate must be a regular file with at least one execute bit.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable that overrides the search entirely.
pub const ENV_CONVERTER_PATH: &str = "OFFICE2MD_CONVERTER";

/// Program name searched for when the caller does not name one.
pub const DEFAULT_PROGRAM: &str = "markitdown";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by converter-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// The override variable points at something that is not an executable file.
    #[error("{var} is set to '{path}', which is not an executable file")]
    InvalidOverride { var: &'static str, path: PathBuf },

    /// The program was not found in any searched directory.
    #[error("Converter '{program}' not found (searched {} directories)\nInstall it with: pipx install 'markitdown[all]'\nor point OFFICE2MD_CONVERTER at the executable.", .searched.len())]
    NotFound {
        program: String,
        searched: Vec<PathBuf>,
    },
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static DEFAULT_PATH: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Locate [`DEFAULT_PROGRAM`], caching the result for the process lifetime.
///
/// Failures are not cached, so installing the converter while a server is
/// running makes the next call succeed.
pub fn locate_default() -> Result<PathBuf, LocateError> {
    if let Some(path) = DEFAULT_PATH.get() {
        return Ok(path.clone());
    }

    let path = locate(DEFAULT_PROGRAM)?;

    // Ignore the race; both threads resolved the same path.
    let _ = DEFAULT_PATH.set(path.clone());

    Ok(path)
}

/// Locate `program` using the environment override, `PATH` and the
/// well-known install directories.
pub fn locate(program: &str) -> Result<PathBuf, LocateError> {
    locate_with(
        program,
        std::env::var_os(ENV_CONVERTER_PATH),
        &search_dirs(),
    )
}

/// Locate `program` with an explicit override value and search list.
///
/// This is the pure core of [`locate`]; it never reads the environment.
pub fn locate_with(
    program: &str,
    override_path: Option<OsString>,
    dirs: &[PathBuf],
) -> Result<PathBuf, LocateError> {
    if let Some(raw) = override_path.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(raw);
        if is_executable(&path) {
            return Ok(path);
        }
        return Err(LocateError::InvalidOverride {
            var: ENV_CONVERTER_PATH,
            path,
        });
    }

    if has_separator(program) {
        let path = PathBuf::from(program);
        if is_executable(&path) {
            return Ok(path);
        }
        return Err(LocateError::NotFound {
            program: program.to_string(),
            searched: Vec::new(),
        });
    }

    for dir in dirs {
        for name in candidate_names(program) {
            let candidate = dir.join(&name);
            if is_executable(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(LocateError::NotFound {
        program: program.to_string(),
        searched: dirs.to_vec(),
    })
}

/// Directories searched by [`locate`], in order: `PATH` entries, then the
/// well-known user install locations. Duplicates are removed.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();

    if let Some(home) = dirs::home_dir() {
        out.push(home.join(".local").join("bin"));
        out.push(home.join(".cargo").join("bin"));
    }
    out.push(PathBuf::from("/usr/local/bin"));
    out.push(PathBuf::from("/opt/homebrew/bin"));

    let mut seen = std::collections::HashSet::new();
    out.retain(|d| !d.as_os_str().is_empty() && seen.insert(d.clone()));
    out
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn has_separator(program: &str) -> bool {
    program.contains('/') || (cfg!(windows) && program.contains('\\'))
}

fn candidate_names(program: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(program).extension().is_none() {
        ["exe", "cmd", "bat"]
            .iter()
            .map(|ext| format!("{program}.{ext}"))
            .collect()
    } else {
        vec![program.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
