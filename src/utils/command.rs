//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Run a command in a specific directory, inheriting stdout so the user can
/// follow long-running tool output. stderr is captured for error reporting.
///
/// Blocks until the command exits; no timeout is applied.
pub fn run_in_streaming(dir: &Path, program: &str, args: &[String]) -> Result<()> {
    let display = display_command(program, args);

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::package_manager_failed(&display, None, format!("Failed to start: {}", e)))?;

    if !output.status.success() {
        return Err(Error::package_manager_failed(
            &display,
            output.status.code(),
            error_text(&output),
        ));
    }

    Ok(())
}

/// Render a command line for logs and error details.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_command_joins_program_and_args() {
        let args = vec!["install".to_string(), "--save-dev".to_string()];
        assert_eq!(display_command("npm", &args), "npm install --save-dev");
    }

    #[test]
    fn run_in_streaming_reports_missing_program() {
        let err = run_in_streaming(Path::new("."), "nonexistent_command_xyz", &[]).unwrap_err();
        assert_eq!(err.code.as_str(), "package_manager.failed");
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = Output {
            status: std::process::ExitStatus::default(),
            stdout: b"stdout content".to_vec(),
            stderr: b"stderr content".to_vec(),
        };
        assert_eq!(error_text(&output), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = Output {
            status: std::process::ExitStatus::default(),
            stdout: b"stdout content".to_vec(),
            stderr: b"".to_vec(),
        };
        assert_eq!(error_text(&output), "stdout content");
    }
}
