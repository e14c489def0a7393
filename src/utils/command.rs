//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::Command;

use serde::Serialize;

use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::shell;

/// Captured output from command execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    pub fn new(stdout: String, stderr: String) -> Self {
        Self { stdout, stderr }
    }
}

/// Result of a finished process. `exit_code` is `None` when the process was
/// terminated by a signal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

impl CommandOutput {
    pub fn new(exit_code: Option<i32>, output: CapturedOutput) -> Self {
        Self { exit_code, output }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes external programs on behalf of stage handlers.
///
/// Implementations only report what happened; deciding whether a non-zero
/// exit is fatal is left to [`run_cmd`].
pub trait CommandRunner {
    fn execute(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs commands as real child processes, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| Error::command_spawn_failed(display_command(program, args), e))?;

        Ok(CommandOutput::new(
            output.status.code(),
            CapturedOutput::new(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
        ))
    }
}

/// Run a command, log its captured output and return trimmed stdout.
///
/// Stdout is logged at INFO and stderr at WARN. A non-zero exit logs the
/// captured stderr at ERROR and returns a `command.failed` error.
pub fn run_cmd(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<String> {
    let command = display_command(program, args);
    tracing::debug!("Running: {}", command);

    let result = runner.execute(program, args, cwd)?;
    let CapturedOutput { stdout, stderr } = result.output.clone();

    if !result.success() {
        tracing::error!("{}", error_text(&result.output));
        return Err(Error::command_failed(CommandFailedDetails {
            command,
            cwd: cwd.map(|d| d.display().to_string()),
            exit_code: result.exit_code,
            stdout,
            stderr,
        }));
    }

    if !stdout.is_empty() {
        tracing::info!("{}", stdout);
    }
    if !stderr.is_empty() {
        tracing::warn!("{}", stderr);
    }

    Ok(stdout)
}

/// Extract error text from captured output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &CapturedOutput) -> String {
    if !output.stderr.trim().is_empty() {
        output.stderr.trim().to_string()
    } else {
        output.stdout.trim().to_string()
    }
}

fn display_command(program: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program);
    parts.extend_from_slice(args);
    shell::quote_args(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    struct Fixed(CommandOutput);

    impl CommandRunner for Fixed {
        fn execute(&self, _: &str, _: &[&str], _: Option<&Path>) -> Result<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn run_cmd_returns_stdout_on_success() {
        let runner = Fixed(CommandOutput::new(
            Some(0),
            CapturedOutput::new("Already up to date.".to_string(), String::new()),
        ));
        let stdout = run_cmd(&runner, "git", &["pull"], None).unwrap();
        assert_eq!(stdout, "Already up to date.");
    }

    #[test]
    fn run_cmd_fails_on_non_zero_exit() {
        let runner = Fixed(CommandOutput::new(
            Some(1),
            CapturedOutput::new(String::new(), "nothing to commit".to_string()),
        ));
        let err = run_cmd(&runner, "git", &["commit", "-m", "Build commit"], None).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandFailed);
        assert_eq!(err.message, "Command failed: git commit -m 'Build commit'");
        assert_eq!(err.stderr(), Some("nothing to commit"));
        assert_eq!(err.details["exitCode"], 1);
    }

    #[test]
    fn signal_termination_is_a_failure() {
        let output = CommandOutput::new(None, CapturedOutput::default());
        assert!(!output.success());
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = CapturedOutput::new("stdout content".to_string(), "stderr content".to_string());
        assert_eq!(error_text(&output), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = CapturedOutput::new("stdout content".to_string(), String::new());
        assert_eq!(error_text(&output), "stdout content");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_streams() {
        let output = SystemRunner
            .execute("sh", &["-c", "echo out; echo err >&2; exit 3"], None)
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.output.stdout, "out");
        assert_eq!(output.output.stderr, "err");
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let err = SystemRunner
            .execute("nonexistent_command_xyz", &[], None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandSpawnFailed);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_honors_cwd() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = SystemRunner.execute("pwd", &[], Some(dir.path())).unwrap();
        let reported = std::fs::canonicalize(&output.output.stdout).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
