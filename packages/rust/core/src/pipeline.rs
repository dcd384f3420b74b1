//! End-to-end `convert` pipeline: notebook → filtered notebook → HTML → PDF.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use nbpress_notebook::FilterSummary;
use nbpress_render::{PdfOptions, ToolCommand};
use nbpress_shared::{AppConfig, ArtifactPaths, NbpressError, Result};

const FILTERED_HINT: &str = "Filtered notebook saved for manual conversion.";
const HTML_HINT: &str =
    "You can manually convert it to PDF by opening it in a browser and printing to PDF.";

/// Configuration for the `convert` pipeline.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Input, intermediate and output files.
    pub paths: ArtifactPaths,
    /// Command providing `nbconvert`.
    pub jupyter_cmd: String,
    /// Python interpreter driving playwright.
    pub python_cmd: String,
    /// Page size for the PDF.
    pub paper_format: String,
    /// Install playwright when missing.
    pub auto_install: bool,
    /// Keep the filtered notebook and HTML after success.
    pub keep_intermediates: bool,
}

impl ConvertConfig {
    /// Build from the loaded app config for the given files.
    pub fn new(paths: ArtifactPaths, app: &AppConfig) -> Self {
        Self {
            paths,
            jupyter_cmd: app.tools.jupyter_cmd.clone(),
            python_cmd: app.tools.python_cmd.clone(),
            paper_format: app.render.paper_format.clone(),
            auto_install: app.render.auto_install,
            keep_intermediates: app.defaults.keep_intermediates,
        }
    }
}

/// Result of the `convert` pipeline.
#[derive(Debug)]
pub struct ConvertResult {
    /// The PDF written.
    pub pdf: PathBuf,
    /// What the filter changed.
    pub summary: FilterSummary,
    /// Whether playwright had to be installed first.
    pub installed_playwright: bool,
    /// Intermediates left on disk on request.
    pub kept: Vec<PathBuf>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for each intermediate left on disk after a failure.
    fn artifact_retained(&self, path: &Path, hint: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &ConvertResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn artifact_retained(&self, _path: &Path, _hint: &str) {}
    fn done(&self, _result: &ConvertResult) {}
}

/// Run the full `convert` pipeline.
///
/// 1. Check the input exists (nothing is written otherwise)
/// 2. Strip code sources into the filtered notebook
/// 3. Convert the filtered notebook to HTML with input hidden
/// 4. Render the HTML to PDF, installing playwright once if needed
/// 5. Delete intermediates, or on failure report the ones left behind
#[instrument(skip_all, fields(input = %config.paths.input.display(), pdf = %config.paths.pdf.display()))]
pub async fn convert(
    config: &ConvertConfig,
    progress: &dyn ProgressReporter,
) -> Result<ConvertResult> {
    let start = Instant::now();
    let paths = &config.paths;

    if !paths.input.is_file() {
        return Err(NbpressError::not_found(&paths.input));
    }
    let jupyter = ToolCommand::parse(&config.jupyter_cmd)?;
    let pdf_opts = PdfOptions {
        python: ToolCommand::parse(&config.python_cmd)?,
        paper_format: config.paper_format.clone(),
        auto_install: config.auto_install,
    };

    info!("starting convert pipeline");

    // --- Phase 1: Filter ---
    progress.phase("Filtering notebook to remove code cells");
    let summary = nbpress_notebook::filter_notebook(&paths.input, &paths.filtered)?;

    // --- Phase 2: Render ---
    let installed = match render(paths, &jupyter, &pdf_opts, progress).await {
        Ok(installed) => installed,
        Err(e) => {
            warn!(error = %e, "conversion failed, keeping intermediates");
            report_retained(paths, progress);
            return Err(e);
        }
    };

    // --- Phase 3: Cleanup ---
    let kept = if config.keep_intermediates {
        paths.intermediates().iter().map(|p| p.to_path_buf()).collect()
    } else {
        remove_intermediates(paths);
        Vec::new()
    };

    let result = ConvertResult {
        pdf: paths.pdf.clone(),
        summary,
        installed_playwright: installed,
        kept,
        elapsed: start.elapsed(),
    };

    info!(
        elapsed_ms = result.elapsed.as_millis() as u64,
        installed, "convert pipeline complete"
    );
    progress.done(&result);

    Ok(result)
}

async fn render(
    paths: &ArtifactPaths,
    jupyter: &ToolCommand,
    pdf_opts: &PdfOptions,
    progress: &dyn ProgressReporter,
) -> Result<bool> {
    if let Some(dir) = paths.pdf.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| NbpressError::io(dir, e))?;
    }

    progress.phase("Converting notebook to HTML");
    nbpress_render::convert_to_html(jupyter, &paths.filtered, &paths.html).await?;

    progress.phase("Converting HTML to PDF using playwright");
    let outcome = nbpress_render::render_pdf(pdf_opts, &paths.html, &paths.pdf, || {
        progress.phase("Installing playwright and chromium");
    })
    .await?;

    Ok(outcome.installed)
}

fn report_retained(paths: &ArtifactPaths, progress: &dyn ProgressReporter) {
    for (path, hint) in [(&paths.filtered, FILTERED_HINT), (&paths.html, HTML_HINT)] {
        if path.exists() {
            progress.artifact_retained(path, hint);
        }
    }
}

fn remove_intermediates(paths: &ArtifactPaths) {
    for path in paths.intermediates() {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove intermediate"),
        }
    }
}

/// Strip code sources from `input` into `output` without rendering.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn strip(input: &Path, output: &Path) -> Result<FilterSummary> {
    if !input.is_file() {
        return Err(NbpressError::not_found(input));
    }
    if same_file(input, output) {
        return Err(NbpressError::validation(format!(
            "refusing to overwrite the input notebook {}",
            input.display()
        )));
    }

    nbpress_notebook::filter_notebook(input, output)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
