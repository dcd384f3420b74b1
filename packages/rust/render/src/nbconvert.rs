//! Notebook → HTML via `jupyter nbconvert`, with code input hidden.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use nbpress_shared::{NbpressError, Result};

use crate::process::ToolCommand;

const MISSING_HINT: &str = "Please install it with: pip install nbconvert";

/// Arguments after the jupyter command.
///
/// The HTML lands at `html` exactly: nbconvert takes the stem through
/// `--output` and the directory through `--output-dir`.
pub fn nbconvert_args(notebook: &Path, html: &Path) -> Vec<OsString> {
    let stem = html
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("notebook"));

    vec![
        "nbconvert".into(),
        "--to".into(),
        "html".into(),
        "--output".into(),
        stem,
        "--output-dir".into(),
        output_dir(html).into_os_string(),
        notebook.as_os_str().to_os_string(),
        "--TemplateExporter.exclude_input=True".into(),
        "--TemplateExporter.exclude_input_prompt=True".into(),
        "--no-prompt".into(),
    ]
}

fn output_dir(html: &Path) -> PathBuf {
    match html.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Convert `notebook` to HTML at `html`.
#[instrument(skip_all, fields(notebook = %notebook.display(), html = %html.display()))]
pub async fn convert_to_html(jupyter: &ToolCommand, notebook: &Path, html: &Path) -> Result<()> {
    let label = jupyter.display_with(&["nbconvert"]);

    jupyter
        .run(&nbconvert_args(notebook, html), MISSING_HINT)
        .await?
        .into_result(&label)?;

    if !html.exists() {
        return Err(NbpressError::ToolFailed {
            tool: label,
            status: "exit status: 0".into(),
            stderr: format!("expected output {} was not created", html.display()),
        });
    }

    info!("created HTML");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_hide_input_and_target_html() {
        let args = nbconvert_args(Path::new("pipeline2_filtered.ipynb"), Path::new("out/pipeline2.html"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[0], "nbconvert");
        assert_eq!(args[1..3], ["--to", "html"]);
        assert_eq!(args[3..5], ["--output", "pipeline2"]);
        assert_eq!(args[5..7], ["--output-dir", "out"]);
        assert_eq!(args[7], "pipeline2_filtered.ipynb");
        assert!(args.contains(&"--TemplateExporter.exclude_input=True".to_string()));
        assert!(args.contains(&"--TemplateExporter.exclude_input_prompt=True".to_string()));
        assert!(args.contains(&"--no-prompt".to_string()));
    }

    #[test]
    fn bare_html_name_uses_current_dir() {
        assert_eq!(output_dir(Path::new("pipeline2.html")), PathBuf::from("."));
        assert_eq!(output_dir(Path::new("/tmp/x/a.html")), PathBuf::from("/tmp/x"));
    }

    #[tokio::test]
    async fn missing_jupyter_suggests_install() {
        let jupyter = ToolCommand::parse("nbpress-no-such-jupyter-91c2").unwrap();
        let err = convert_to_html(&jupyter, Path::new("a.ipynb"), Path::new("a.html"))
            .await
            .unwrap_err();

        assert!(matches!(err, NbpressError::ToolNotFound { .. }));
        assert!(err.to_string().contains("pip install nbconvert"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_converter_reports_stderr() {
        let jupyter = ToolCommand::parse("sh -c 'echo kernel died >&2; exit 1' jupyter").unwrap();
        let err = convert_to_html(&jupyter, Path::new("a.ipynb"), Path::new("a.html"))
            .await
            .unwrap_err();

        match err {
            NbpressError::ToolFailed { stderr, .. } => assert_eq!(stderr, "kernel died"),
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_without_output_is_failure() {
        let jupyter = ToolCommand::parse("true").unwrap();
        let html = std::env::temp_dir().join(format!("nbpress-{}.html", uuid::Uuid::now_v7()));
        let err = convert_to_html(&jupyter, Path::new("a.ipynb"), &html)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("was not created"));
    }
}
