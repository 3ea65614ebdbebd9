//! Post-processing: optional deterministic cleanup of converter output.
//!
//! markitdown stitches several document libraries together, and each leaves
//! its own residue: CRLF line endings from Word, `NaN` in spreadsheet cells
//! that were empty, runs of blank lines where slides had no body, slide
//! markers glued to the previous slide's last line, and zero-width
//! characters copied out of Office documents. The rules here only touch that
//! residue; they never reflow or rewrite content.
//!
//! The pass is off by default (`ConverterConfig::clean_output`) so the
//! downloads stay byte-identical to what the converter printed.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only.
//! Blank lines are collapsed before slide markers get their separating
//! blank line, so the marker rule never produces a run that needs
//! collapsing again.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw converter output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Trim trailing whitespace per line
/// 3. Blank out `NaN` cells in Markdown tables
/// 4. Collapse runs of blank lines to a single blank line
/// 5. Start every `<!-- Slide number: N -->` marker on its own paragraph
/// 6. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 7. Ensure the text ends with exactly one newline
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = blank_nan_cells(&s);
    let s = collapse_blank_lines(&s);
    let s = separate_slides(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Empty spreadsheet cells ──────────────────────────────────────────

/// Spreadsheet sheets go through a dataframe, which prints empty cells as
/// `NaN`. Only whole cells of table rows are touched.
fn blank_nan_cells(input: &str) -> String {
    input
        .lines()
        .map(|line| {
            if line.starts_with('|') && line.ends_with('|') {
                line.split('|')
                    .map(|cell| if cell.trim() == "NaN" { " " } else { cell })
                    .collect::<Vec<_>>()
                    .join("|")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse blank-line runs ─────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 5: Slide markers ────────────────────────────────────────────────────

static RE_SLIDE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\n])\n(<!-- Slide number: \d+ -->)").unwrap());

fn separate_slides(input: &str) -> String {
    RE_SLIDE_MARKER.replace_all(input, "$1\n\n$2").to_string()
}

// ── Rule 6: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 7: Ensure text ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
