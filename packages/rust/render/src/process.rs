//! Spawning external tools and capturing their output.

use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};

use tracing::debug;

use nbpress_shared::{NbpressError, Result};

/// An external command: a program plus leading arguments.
///
/// Parsed with shell-style quoting so configs like `uv run python` or
/// `"/opt/my tools/jupyter"` work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    leading_args: Vec<String>,
}

impl ToolCommand {
    /// Parse a configured command string.
    pub fn parse(command: &str) -> Result<Self> {
        let mut words = shlex::split(command)
            .ok_or_else(|| NbpressError::config(format!("unbalanced quotes in command `{command}`")))?
            .into_iter();

        let program = words
            .next()
            .ok_or_else(|| NbpressError::config("tool command must not be empty"))?;

        Ok(Self {
            program,
            leading_args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Human-readable form used in error messages.
    pub fn display_with(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run with `args` appended, capturing stdout and stderr.
    ///
    /// A program that cannot be found becomes [`NbpressError::ToolNotFound`]
    /// carrying `missing_hint`. A non-zero exit is *not* an error here; see
    /// [`ToolOutput::into_result`].
    pub async fn run(&self, args: &[OsString], missing_hint: &str) -> Result<ToolOutput> {
        debug!(program = %self.program, leading = ?self.leading_args, ?args, "running tool");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => NbpressError::ToolNotFound {
                    tool: self.program.clone(),
                    hint: missing_hint.to_string(),
                },
                _ => NbpressError::io(&self.program, e),
            })?;

        let out = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(program = %self.program, status = %out.status, "tool exited");
        Ok(out)
    }
}

/// A finished external process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The most useful text to show on failure: stderr, else stdout.
    pub fn diagnostics(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }

    /// Turn a non-zero exit into [`NbpressError::ToolFailed`] labelled `tool`.
    pub fn into_result(self, tool: &str) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        Err(NbpressError::ToolFailed {
            tool: tool.to_string(),
            status: self.status.to_string(),
            stderr: self.diagnostics().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_quoted() {
        let cmd = ToolCommand::parse("jupyter").unwrap();
        assert_eq!(cmd.program(), "jupyter");
        assert_eq!(cmd.display_with(&["nbconvert"]), "jupyter nbconvert");

        let cmd = ToolCommand::parse(r#"uv run "/opt/my env/python""#).unwrap();
        assert_eq!(cmd.program(), "uv");
        assert_eq!(cmd.display_with(&[]), "uv run /opt/my env/python");
    }

    #[test]
    fn parse_rejects_empty_and_unbalanced() {
        assert!(ToolCommand::parse("   ").is_err());
        assert!(ToolCommand::parse("python \"oops").is_err());
    }

    #[tokio::test]
    async fn missing_program_is_tool_not_found() {
        let cmd = ToolCommand::parse("nbpress-definitely-not-installed-7f3a").unwrap();
        let err = cmd.run(&[], "install it").await.unwrap_err();
        match err {
            NbpressError::ToolNotFound { tool, hint } => {
                assert_eq!(tool, "nbpress-definitely-not-installed-7f3a");
                assert_eq!(hint, "install it");
            }
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_failure() {
        let cmd = ToolCommand::parse("sh -c").unwrap();
        let out = cmd
            .run(&[OsString::from("echo out; echo boom >&2; exit 3")], "")
            .await
            .unwrap();

        assert!(!out.success());
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.diagnostics(), "boom");

        let err = out.into_result("sh").unwrap_err();
        assert!(matches!(err, NbpressError::ToolFailed { ref stderr, .. } if stderr == "boom"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn diagnostics_fall_back_to_stdout() {
        let cmd = ToolCommand::parse("sh -c").unwrap();
        let out = cmd.run(&[OsString::from("echo only-stdout; exit 1")], "").await.unwrap();
        assert_eq!(out.diagnostics(), "only-stdout");
    }
}
