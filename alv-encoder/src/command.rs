//! External process runner

use crate::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::debug;

/// A single invocation of an external tool.
///
/// Arguments are passed to the process directly, without a shell, so paths
/// containing spaces or non-ASCII characters need no quoting.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Creates a command for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The command line, for logging
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Runs the command to completion.
    ///
    /// A nonzero exit status becomes [`Error::ExternalTool`] carrying the
    /// trimmed stderr output.
    pub fn run(&self) -> Result<()> {
        debug!(command = %self.command_line(), "running external tool");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::ToolNotFound(self.program.clone()),
                _ => Error::Io(e),
            })?;

        if !output.status.success() {
            return Err(Error::ExternalTool {
                tool: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Checks whether `program` can be spawned with `-version`
pub fn is_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let cmd = ToolCommand::new("ffmpeg")
            .arg("-i")
            .arg("my clip.mp4")
            .args(["-r", "25"]);
        assert_eq!(cmd.command_line(), "ffmpeg -i my clip.mp4 -r 25");
        assert_eq!(cmd.program(), "ffmpeg");
    }

    #[test]
    fn test_missing_program() {
        let err = ToolCommand::new("alv-definitely-missing-tool")
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(ref p) if p == "alv-definitely-missing-tool"));
        assert!(!is_on_path("alv-definitely-missing-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_an_error() {
        let err = ToolCommand::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .run()
            .unwrap_err();
        match err {
            Error::ExternalTool {
                tool,
                status,
                stderr,
            } => {
                assert_eq!(tool, "sh");
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success() {
        ToolCommand::new("sh").args(["-c", "exit 0"]).run().unwrap();
    }
}
