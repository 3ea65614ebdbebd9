//! Server-rendered HTML for the single upload page.
//!
//! One page serves both states: the neutral waiting message when nothing has
//! been converted yet, and one result block per job after a submission.

use super::download_path;
use crate::job::{ConversionJob, JobStatus};
use crate::output::ExportFormat;
use crate::session::Session;
use std::fmt::Write;

pub const TITLE: &str = "Universal Document-to-Text Converter";
pub const WAITING: &str = "Waiting for your files... Upload them above to start the magic.";
const FOOTER: &str = "Built with Microsoft MarkItDown &amp; Rust | 2026 Edition";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #1f2328; background: #fff; }
h1 { margin-bottom: 0.25rem; }
form { border: 2px dashed #d0d7de; border-radius: 8px; padding: 1.5rem; margin: 1.5rem 0; }
.info { background: #ddf4ff; border-radius: 6px; padding: 0.75rem 1rem; }
.error { background: #ffebe9; border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }
details { border: 1px solid #d0d7de; border-radius: 6px; padding: 0.5rem 1rem; margin: 1rem 0; }
summary { cursor: pointer; font-weight: 600; }
textarea { width: 100%; height: 300px; font-family: ui-monospace, monospace; margin: 0.75rem 0; box-sizing: border-box; }
.downloads { display: flex; gap: 1rem; }
.downloads a { flex: 1; text-align: center; padding: 0.5rem; border: 1px solid #d0d7de; border-radius: 6px; text-decoration: none; color: inherit; }
#spinner { display: none; margin-top: 1rem; }
#spinner.active { display: block; }
footer { margin-top: 2rem; color: #656d76; font-size: 0.85rem; }
"#;

const SCRIPT: &str = r#"
document.getElementById('upload').addEventListener('submit', function () {
  document.getElementById('spinner').classList.add('active');
});
"#;

/// Render the full page. `session` is `None` before any upload, or when the
/// submission carried no files.
pub fn render(accept: &str, session: Option<&Session>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{TITLE}</title>");
    let _ = writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>");
    let _ = writeln!(html, "<h1>🚀 {TITLE}</h1>");
    html.push_str(
        "<p>Upload <strong>Word, Excel, PPT, PDF, or HTML</strong> files. \
         We'll convert them into clean Markdown instantly.</p>\n",
    );

    let _ = writeln!(
        html,
        "<form id=\"upload\" action=\"/convert\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <label for=\"files\">Drag and drop files here</label><br>\n\
         <input id=\"files\" type=\"file\" name=\"files\" multiple accept=\"{}\">\n\
         <button type=\"submit\">Convert</button>\n\
         <div id=\"spinner\">Processing your files...</div>\n</form>",
        escape_html(accept)
    );

    match session.filter(|s| !s.jobs.is_empty()) {
        Some(session) => {
            html.push_str("<hr>\n");
            for job in session.jobs() {
                render_job(&mut html, session, job);
            }
        }
        None => {
            let _ = writeln!(html, "<div class=\"info\">{WAITING}</div>");
        }
    }

    let _ = writeln!(html, "<hr>\n<footer>{FOOTER}</footer>");
    let _ = writeln!(html, "<script>{SCRIPT}</script>\n</body>\n</html>");
    html
}

fn render_job(html: &mut String, session: &Session, job: &ConversionJob) {
    let name = escape_html(&job.original_name);
    match (job.status, job.text_content.as_deref()) {
        (JobStatus::Succeeded, Some(text)) => {
            let _ = writeln!(
                html,
                "<details open>\n<summary>📄 Preview: {name}</summary>\n\
                 <textarea readonly aria-label=\"Converted Content\">\n{}</textarea>\n\
                 <div class=\"downloads\">",
                escape_html(text)
            );
            for format in ExportFormat::ALL {
                let _ = writeln!(
                    html,
                    "<a href=\"{}\" download=\"{}\">{}</a>",
                    download_path(session.id, job.id, format),
                    escape_html(&format.file_name(&job.base_name)),
                    format.label()
                );
            }
            html.push_str("</div>\n</details>\n");
        }
        _ => {
            let message = job
                .error
                .as_ref()
                .map(|e| escape_html(&e.to_string()))
                .unwrap_or_else(|| format!("Could not read {name}. Please check the format."));
            let _ = writeln!(html, "<div class=\"error\">⚠️ {message}</div>");
        }
    }
}

/// Simple HTML escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{ConversionJob, JobId};
    use crate::pipeline::upload::FileName;

    fn succeeded(id: usize, name: &str, text: &str) -> ConversionJob {
        let mut job = ConversionJob::new(JobId(id), &FileName::parse(name));
        job.status = JobStatus::Succeeded;
        job.text_content = Some(text.to_string());
        job
    }

    fn failed(id: usize, name: &str) -> ConversionJob {
        let mut job = ConversionJob::new(JobId(id), &FileName::parse(name));
        job.status = JobStatus::Failed;
        job.error = Some(crate::error::JobError::new(name));
        job
    }

    #[test]
    fn waiting_state_without_session() {
        let html = render(".pdf,.docx", None);
        assert!(html.contains(WAITING));
        assert!(html.contains(TITLE));
        assert!(html.contains("accept=\".pdf,.docx\""));
        assert!(!html.contains("<details"));
    }

    #[test]
    fn empty_session_is_waiting_state() {
        let session = Session::new(vec![]);
        assert!(render("", Some(&session)).contains(WAITING));
    }

    #[test]
    fn success_and_failure_blocks() {
        let session = Session::new(vec![
            succeeded(0, "report.pdf", "# Report\n..."),
            failed(1, "corrupt.docx"),
        ]);
        let html = render("", Some(&session));

        assert!(!html.contains(WAITING));
        assert!(html.contains("Preview: report.pdf"));
        // A newline right after the opening tag is dropped by browsers.
        assert!(html.contains("\">\n# Report\n...</textarea>"));
        assert!(html.contains(&format!("/download/{}/0/md", session.id)));
        assert!(html.contains(&format!("/download/{}/0/txt", session.id)));
        assert!(html.contains("download=\"report_converted.md\""));
        assert!(html.contains("Download as Markdown (.md)"));
        assert!(html.contains("Download as Plain Text (.txt)"));

        assert!(html.contains("⚠️ Could not read corrupt.docx. Please check the format."));
        assert!(!html.contains(&format!("/download/{}/1/", session.id)));
    }

    #[test]
    fn converted_text_is_escaped() {
        let session = Session::new(vec![succeeded(0, "<b>.html", "<script>alert(1)</script>")]);
        let html = render("", Some(&session));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Preview: &lt;b&gt;.html"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
