//! Shared domain types for a single conversion run.

use std::path::{Path, PathBuf};

/// Suffix appended to the input stem for the filtered notebook.
pub const FILTERED_SUFFIX: &str = "_filtered";

// ---------------------------------------------------------------------------
// ArtifactPaths
// ---------------------------------------------------------------------------

/// Every file a conversion run reads or writes.
///
/// The filtered notebook lives beside the input and the HTML lives beside
/// the PDF, so `a/report.ipynb` → `a/report_filtered.ipynb`, and
/// `out/report.pdf` → `out/report.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Source notebook, never modified.
    pub input: PathBuf,
    /// Notebook with code sources stripped.
    pub filtered: PathBuf,
    /// HTML produced by nbconvert.
    pub html: PathBuf,
    /// Final PDF.
    pub pdf: PathBuf,
}

impl ArtifactPaths {
    /// Derive intermediate paths from the input notebook and output PDF.
    pub fn derive(input: impl Into<PathBuf>, pdf: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let pdf = pdf.into();
        Self {
            filtered: filtered_path(&input),
            html: pdf.with_extension("html"),
            input,
            pdf,
        }
    }

    /// Intermediate files, in the order they are created.
    pub fn intermediates(&self) -> [&Path; 2] {
        [&self.filtered, &self.html]
    }
}

/// `dir/name.ipynb` → `dir/name_filtered.ipynb`.
pub fn filtered_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notebook".to_string());
    input.with_file_name(format!("{stem}{FILTERED_SUFFIX}.ipynb"))
}
