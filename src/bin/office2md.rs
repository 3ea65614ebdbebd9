//! CLI binary for office2md.
//!
//! `serve` runs the upload page; `convert` runs the same per-file pipeline
//! over local files and writes `<base>_converted.{md,txt}` next to each other
//! in the output directory.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use office2md::{
    process_batch, write_atomic, web, AppState, BatchProgressCallback, CommandConverter,
    ConverterConfig, Download, ExportFormat, JobStatus, ProgressCallback, ServerConfig,
    UploadedFile,
};
use std::collections::HashSet;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner plus one log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos:>3}/{len}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} file(s)…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        *self.started.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, name: &str, text_len: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}  {}",
            green("✓"),
            index,
            total,
            name,
            dim(&format!("{text_len} chars")),
            self.elapsed(),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep one line per file; the full error is in the log.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 80 {
            let head: String = first_line.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}  {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg),
            self.elapsed(),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the upload page on http://127.0.0.1:8501
  office2md serve

  # Listen on all interfaces with a smaller upload cap
  office2md serve --host 0.0.0.0 --port 8080 --max-upload-mb 50

  # Convert local files into ./out (both .md and .txt)
  office2md convert report.pdf slides.pptx -o out

  # Markdown only, printed to stdout
  office2md convert --stdout page.html

  # Use a specific converter build and a shorter timeout
  office2md --converter ~/venvs/md/bin/markitdown --timeout 60 convert sheet.xlsx

SUPPORTED FORMATS:
  .docx .xlsx .pptx .pdf .html .htm

ENVIRONMENT VARIABLES:
  OFFICE2MD_CONVERTER          Path to the converter executable (checked first)
  OFFICE2MD_CONVERTER_PROGRAM  Converter program name or path (same as --converter)
  RUST_LOG                     Log filter, overrides -v / -q

SETUP:
  pip install 'markitdown[all]'

  The converter is looked up on PATH, then in ~/.local/bin, ~/.cargo/bin,
  /usr/local/bin and /opt/homebrew/bin.
"#;

/// Convert office documents, PDFs and HTML to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "office2md",
    version,
    about = "Convert Word, Excel, PowerPoint, PDF and HTML documents to Markdown",
    long_about = "Convert Word, Excel, PowerPoint, PDF and HTML documents to Markdown and \
plain text, either through a local upload page or directly from the command line. \
All parsing is done by an external converter (markitdown by default).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    converter: ConverterArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "OFFICE2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "OFFICE2MD_QUIET")]
    quiet: bool,

    /// Disable the progress display.
    #[arg(long, global = true, env = "OFFICE2MD_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct ConverterArgs {
    /// Converter program name or path (default: markitdown).
    #[arg(long, global = true, env = "OFFICE2MD_CONVERTER_PROGRAM")]
    converter: Option<PathBuf>,

    /// Extra argument passed to the converter before the file path. Repeatable.
    #[arg(
        long = "converter-arg",
        global = true,
        env = "OFFICE2MD_CONVERTER_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    converter_args: Vec<String>,

    /// Per-file converter timeout in seconds.
    #[arg(long, global = true, env = "OFFICE2MD_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Directory for staged uploads (default: system temp dir).
    #[arg(long, global = true, env = "OFFICE2MD_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Normalise whitespace and strip invisible characters in the output.
    #[arg(long, global = true, env = "OFFICE2MD_CLEAN")]
    clean: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload page.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "OFFICE2MD_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,

        /// Port to listen on.
        #[arg(long, env = "OFFICE2MD_PORT", default_value_t = 8501)]
        port: u16,

        /// Maximum request size in MiB.
        #[arg(long, env = "OFFICE2MD_MAX_UPLOAD_MB", default_value_t = 200)]
        max_upload_mb: usize,

        /// Number of upload sessions kept for download.
        #[arg(long, env = "OFFICE2MD_SESSION_CAPACITY", default_value_t = 64)]
        session_capacity: usize,
    },

    /// Convert local files.
    Convert {
        /// Documents to convert.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory.
        #[arg(short, long, env = "OFFICE2MD_OUTPUT", default_value = ".")]
        output: PathBuf,

        /// Which files to write.
        #[arg(long, value_enum, default_value = "both")]
        format: FormatArg,

        /// Print the converted text to stdout instead of writing files.
        #[arg(long)]
        stdout: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Md,
    Txt,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            FormatArg::Md => &[ExportFormat::Markdown],
            FormatArg::Txt => &[ExportFormat::PlainText],
            FormatArg::Both => &ExportFormat::ALL,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress display replaces INFO-level library logs.
    let show_progress =
        matches!(cli.command, Command::Convert { .. }) && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.converter)?;
    let converter = CommandConverter::from_config(&config)
        .context("Could not find the document converter (install markitdown or pass --converter)")?;

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_mb,
            session_capacity,
        } => {
            let server = ServerConfig::builder()
                .bind(SocketAddr::new(host, port))
                .max_upload_bytes(max_upload_mb.saturating_mul(1024 * 1024))
                .session_capacity(session_capacity)
                .build()
                .context("Invalid server configuration")?;

            if !cli.quiet {
                eprintln!(
                    "{} {}  {}",
                    cyan("◆"),
                    bold(&format!("http://{}", server.bind)),
                    dim(&format!("converter: {}", converter.program().display())),
                );
            }

            let state = AppState::new(Arc::new(converter), config, &server);
            web::serve(state, &server).await.context("Server error")?;
        }

        Command::Convert {
            files,
            output,
            format,
            stdout,
        } => {
            let progress: Option<ProgressCallback> = if show_progress {
                Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
            } else {
                None
            };

            let opts = OutputOpts {
                dir: output,
                formats: format.formats(),
                to_stdout: stdout,
                quiet: cli.quiet,
            };
            let failed =
                run_convert(&converter, &config, &files, &opts, progress.as_ref()).await?;

            if failed > 0 {
                anyhow::bail!(
                    "{} of {} file(s) could not be converted or written",
                    failed,
                    files.len()
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConverterConfig`.
fn build_config(args: &ConverterArgs) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .args(args.converter_args.iter().cloned())
        .timeout_secs(args.timeout)
        .clean_output(args.clean);

    if let Some(ref program) = args.converter {
        builder = builder.program(program.clone());
    }
    if let Some(ref dir) = args.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

struct OutputOpts {
    dir: PathBuf,
    formats: &'static [ExportFormat],
    to_stdout: bool,
    quiet: bool,
}

/// Convert `files` and write or print the results. Returns the failure count.
async fn run_convert(
    converter: &CommandConverter,
    config: &ConverterConfig,
    files: &[PathBuf],
    opts: &OutputOpts,
    progress: Option<&ProgressCallback>,
) -> Result<usize> {
    let mut unreadable = 0;
    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                uploads.push(UploadedFile::new(name, bytes));
            }
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    let jobs = process_batch(converter, &uploads, config, progress).await;
    let chatty = progress.is_none() && !opts.quiet;

    let mut failed = unreadable;
    let mut claimed = HashSet::new();
    for job in &jobs {
        if job.status != JobStatus::Succeeded {
            failed += 1;
            if chatty {
                if let Some(ref e) = job.error {
                    eprintln!("{} {}", red("⚠"), e);
                }
            }
            continue;
        }

        if opts.to_stdout {
            let text = job.text_content.as_deref().unwrap_or_default();
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
            continue;
        }

        let downloads: Vec<Download> = opts
            .formats
            .iter()
            .filter_map(|f| job.download(*f))
            .collect();
        let (paths, n) = claim_paths(&opts.dir, &downloads, &mut claimed);
        if n > 0 {
            warn!(
                "{}: an earlier input already produced {}_converted; writing with suffix -{}",
                job.original_name, job.base_name, n
            );
        }

        let mut write_failed = false;
        for (download, path) in downloads.iter().zip(&paths) {
            match write_atomic(path, &download.content).await {
                Ok(()) => {
                    if chatty {
                        eprintln!("{} {}", green("✔"), path.display());
                    }
                }
                Err(e) => {
                    error!("{} ({}): {}", job.original_name, path.display(), e);
                    write_failed = true;
                }
            }
        }
        if write_failed {
            failed += 1;
        }
    }

    Ok(failed)
}

/// Output paths for one job's downloads, all sharing a `-N` suffix when an
/// earlier job in this run already claimed the plain names. Returns the
/// paths and `N` (0 for the plain names).
fn claim_paths(
    dir: &Path,
    downloads: &[Download],
    claimed: &mut HashSet<PathBuf>,
) -> (Vec<PathBuf>, usize) {
    let mut n = 0;
    loop {
        let paths: Vec<PathBuf> = downloads
            .iter()
            .map(|d| dir.join(numbered(&d.file_name, n)))
            .collect();
        if paths.iter().all(|p| !claimed.contains(p)) {
            claimed.extend(paths.iter().cloned());
            return (paths, n);
        }
        n += 1;
    }
}

/// `report_converted.md` → `report_converted-2.md` for `n = 2`.
fn numbered(file_name: &str, n: usize) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rfind('.') {
        Some(idx) => format!("{}-{}{}", &file_name[..idx], n, &file_name[idx..]),
        None => format!("{file_name}-{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_inserts_before_extension() {
        assert_eq!(numbered("report_converted.md", 0), "report_converted.md");
        assert_eq!(numbered("report_converted.md", 1), "report_converted-1.md");
        assert_eq!(numbered("notes", 3), "notes-3");
    }

    #[test]
    fn clashing_jobs_get_distinct_paths() {
        let dir = Path::new("out");
        let report = [
            Download::new(ExportFormat::Markdown, "report", "a"),
            Download::new(ExportFormat::PlainText, "report", "a"),
        ];
        let mut claimed = HashSet::new();

        let (first, n) = claim_paths(dir, &report, &mut claimed);
        assert_eq!(n, 0);
        assert_eq!(
            first,
            vec![dir.join("report_converted.md"), dir.join("report_converted.txt")]
        );

        let (second, n) = claim_paths(dir, &report, &mut claimed);
        assert_eq!(n, 1);
        assert_eq!(
            second,
            vec![dir.join("report_converted-1.md"), dir.join("report_converted-1.txt")]
        );

        let (third, n) = claim_paths(dir, &report[..1], &mut claimed);
        assert_eq!(n, 2);
        assert_eq!(third, vec![dir.join("report_converted-2.md")]);
    }
}
