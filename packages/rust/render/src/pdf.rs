//! HTML → PDF through Playwright's headless Chromium.
//!
//! Rendering goes through `python -m playwright pdf`. When the playwright
//! package or its browser is missing, it is installed once and the render
//! retried once.

use std::ffi::OsString;
use std::path::Path;

use tracing::{info, instrument, warn};
use url::Url;

use nbpress_shared::{NbpressError, Result};

use crate::process::{ToolCommand, ToolOutput};

const PYTHON_HINT: &str = "A Python 3 interpreter is required to drive playwright";

/// Options for [`render_pdf`].
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Interpreter used for `-m pip` and `-m playwright`.
    pub python: ToolCommand,
    /// Page size, e.g. `A4`.
    pub paper_format: String,
    /// Install playwright + chromium when they are missing.
    pub auto_install: bool,
}

/// How the render went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Whether the install fallback ran.
    pub installed: bool,
}

/// `file://` URL for an existing HTML file.
pub fn html_url(html: &Path) -> Result<Url> {
    let absolute = std::fs::canonicalize(html).map_err(|e| NbpressError::io(html, e))?;
    Url::from_file_path(&absolute).map_err(|()| {
        NbpressError::validation(format!("cannot build file URL for {}", absolute.display()))
    })
}

/// Arguments after the python command.
pub fn playwright_pdf_args(url: &Url, pdf: &Path, paper_format: &str) -> Vec<OsString> {
    vec![
        "-m".into(),
        "playwright".into(),
        "pdf".into(),
        "--paper-format".into(),
        paper_format.into(),
        url.as_str().into(),
        pdf.as_os_str().to_os_string(),
    ]
}

/// Whether a failed render means playwright or its browser is not installed.
pub fn needs_install(output: &ToolOutput) -> bool {
    let text = format!("{}\n{}", output.stderr, output.stdout).to_lowercase();
    text.contains("no module named playwright")
        || text.contains("no module named 'playwright'")
        || text.contains("executable doesn't exist")
        || text.contains("playwright install")
}

/// Render `html` to `pdf`.
///
/// `on_install` is called right before the one-time install fallback.
#[instrument(skip_all, fields(html = %html.display(), pdf = %pdf.display()))]
pub async fn render_pdf(
    opts: &PdfOptions,
    html: &Path,
    pdf: &Path,
    on_install: impl FnOnce(),
) -> Result<RenderOutcome> {
    let url = html_url(html)?;
    let args = playwright_pdf_args(&url, pdf, &opts.paper_format);
    let label = opts.python.display_with(&["-m", "playwright", "pdf"]);

    info!(%url, paper = %opts.paper_format, "converting HTML to PDF using playwright");
    let first = opts.python.run(&args, PYTHON_HINT).await?;

    let installed = if !first.success() && needs_install(&first) {
        if !opts.auto_install {
            return Err(NbpressError::Install(format!(
                "playwright is not installed and auto_install is disabled. Run: {} && {}",
                opts.python.display_with(&["-m", "pip", "install", "playwright"]),
                opts.python.display_with(&["-m", "playwright", "install", "chromium"]),
            )));
        }

        warn!(reason = %first.diagnostics(), "playwright is not installed, installing");
        on_install();
        install_playwright(&opts.python).await?;

        opts.python
            .run(&args, PYTHON_HINT)
            .await?
            .into_result(&label)?;
        true
    } else {
        first.into_result(&label)?;
        false
    };

    if !pdf.exists() {
        return Err(NbpressError::ToolFailed {
            tool: label,
            status: "exit status: 0".into(),
            stderr: format!("expected output {} was not created", pdf.display()),
        });
    }

    info!(installed, "converted to PDF");
    Ok(RenderOutcome { installed })
}

/// `pip install playwright` then `playwright install chromium`.
async fn install_playwright(python: &ToolCommand) -> Result<()> {
    let steps: [&[&str]; 2] = [
        &["-m", "pip", "install", "playwright"],
        &["-m", "playwright", "install", "chromium"],
    ];

    for step in steps {
        let args: Vec<OsString> = step.iter().map(OsString::from).collect();
        let out = python.run(&args, PYTHON_HINT).await?;
        if !out.success() {
            return Err(NbpressError::Install(format!(
                "`{}` failed: {}",
                python.display_with(step),
                out.diagnostics()
            )));
        }
        info!(step = %python.display_with(step), "install step complete");
    }

    Ok(())
}
