// src/report/tool.rs
//! Diagnostic-report tool runner
//!
//! The report document comes from an external executable that writes its
//! output into a working directory. The engine's only contract with the
//! tool: give it a time budget, and treat a non-zero completion code or a
//! missing expected inner document as a structured failure. The working
//! directory is a scoped temp resource, cleaned up on success and failure
//! paths alike.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use wait_timeout::ChildExt;

/// Placeholder in the argument list replaced by the working directory.
pub const OUTPUT_DIR_TOKEN: &str = "{output_dir}";

/// Configuration for one report-tool invocation.
#[derive(Debug, Clone)]
pub struct ReportToolConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Wall-clock budget for the whole invocation.
    pub timeout: Duration,
    /// Name of the inner document expected in the working directory.
    pub report_file: String,
}

impl ReportToolConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-out".to_string(), OUTPUT_DIR_TOKEN.to_string()],
            timeout: Duration::from_secs(60),
            report_file: "MDMDiagReport.xml".to_string(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_report_file(mut self, report_file: impl Into<String>) -> Self {
        self.report_file = report_file.into();
        self
    }
}

/// Report-tool failures. All of these are recoverable at the call site
/// and map to source-unavailable handling there.
#[derive(Debug, thiserror::Error)]
pub enum ReportToolError {
    #[error("report tool not found: {program}")]
    ProgramNotFound { program: String },

    #[error("failed to launch report tool '{program}': {reason}")]
    LaunchFailed { program: String, reason: String },

    #[error("report tool exceeded its {timeout_ms}ms budget")]
    Timeout { timeout_ms: u64 },

    #[error("report tool exited with code {exit_code}: {stderr}")]
    ToolFailed { exit_code: i32, stderr: String },

    #[error("report tool completed but '{report_file}' was not produced")]
    MissingReport { report_file: String },

    #[error("io error around report tool invocation: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the external diagnostic-report tool and returns the inner
/// document's text.
pub struct ReportTool {
    config: ReportToolConfig,
}

impl ReportTool {
    pub fn new(config: ReportToolConfig) -> Self {
        Self { config }
    }

    /// Invoke the tool once and read back the report document.
    ///
    /// The working directory lives in a [`TempDir`] whose drop removes it
    /// on every exit path, including errors.
    pub fn run(&self) -> Result<String, ReportToolError> {
        let workdir = TempDir::new()?;
        let out_dir = workdir.path().to_string_lossy().to_string();

        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|a| a.replace(OUTPUT_DIR_TOKEN, &out_dir))
            .collect();

        log::debug!(
            "invoking report tool {} with budget {:?}",
            self.config.program.display(),
            self.config.timeout
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ReportToolError::ProgramNotFound {
                        program: self.config.program.display().to_string(),
                    }
                } else {
                    ReportToolError::LaunchFailed {
                        program: self.config.program.display().to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = match child.wait_timeout(self.config.timeout)? {
            Some(status) => status,
            None => {
                // Budget exceeded: reap the process, give up on the run.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReportToolError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                });
            }
        };

        if !status.success() {
            let output = child.wait_with_output()?;
            return Err(ReportToolError::ToolFailed {
                exit_code: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report_path = workdir.path().join(&self.config.report_file);
        if !report_path.is_file() {
            return Err(ReportToolError::MissingReport {
                report_file: self.config.report_file.clone(),
            });
        }

        Ok(std::fs::read_to_string(report_path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_structured_failure() {
        let config = ReportToolConfig::new("/nonexistent/mdm-diag-tool")
            .with_timeout(Duration::from_secs(1));
        let result = ReportTool::new(config).run();

        assert!(matches!(
            result,
            Err(ReportToolError::ProgramNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_structured_failure() {
        let config = ReportToolConfig::new("/bin/sh")
            .with_args(vec!["-c".into(), "echo broken >&2; exit 3".into()])
            .with_timeout(Duration::from_secs(5));
        let result = ReportTool::new(config).run();

        match result {
            Err(ReportToolError::ToolFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_inner_document_is_structured_failure() {
        // Tool succeeds but writes nothing into the working directory.
        let config = ReportToolConfig::new("/bin/sh")
            .with_args(vec!["-c".into(), "true".into()])
            .with_timeout(Duration::from_secs(5));
        let result = ReportTool::new(config).run();

        assert!(matches!(
            result,
            Err(ReportToolError::MissingReport { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_report_is_read_from_working_directory() {
        let config = ReportToolConfig::new("/bin/sh")
            .with_args(vec![
                "-c".into(),
                format!("echo '<Report/>' > {}/MDMDiagReport.xml", OUTPUT_DIR_TOKEN),
            ])
            .with_timeout(Duration::from_secs(5));

        let xml = ReportTool::new(config).run().expect("tool run");
        assert!(xml.contains("<Report/>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_budget_overrun_times_out() {
        let config = ReportToolConfig::new("/bin/sh")
            .with_args(vec!["-c".into(), "sleep 30".into()])
            .with_timeout(Duration::from_millis(100));
        let result = ReportTool::new(config).run();

        assert!(matches!(result, Err(ReportToolError::Timeout { .. })));
    }
}
