//! External command execution.
//!
//! Command lines are split on whitespace into a program and its arguments.
//! There is no shell interpretation and no quoting: an argument can never
//! contain a space.

use crate::errors::{CommandFailure, JxError};
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Number of trailing stderr lines kept in a build failure.
const STDERR_TAIL_LINES: usize = 20;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Split `line` on whitespace. A blank line is `EmptyCommand`.
    pub fn parse(line: &str) -> Result<Self, JxError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(JxError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Append arguments verbatim, without splitting them.
    pub fn with_args<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a child process is wired to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    /// Inherit stdin, stdout and stderr.
    Interactive,
    /// Capture output; used for builds running behind the spinner.
    Captured,
}

pub trait CommandRunner {
    /// Run `command` in `directory`, failing on spawn errors and non-zero exits.
    fn run(&self, directory: &Path, command: &CommandLine, attach: Attach) -> Result<(), JxError>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, directory: &Path, command: &CommandLine, attach: Attach) -> Result<(), JxError> {
        let failed = |source: CommandFailure| JxError::CommandExecution {
            command: command.to_string(),
            source,
        };
        debug!(command = %command, dir = %directory.display(), ?attach, "executing");

        let mut cmd = Command::new(command.program());
        cmd.args(command.args()).current_dir(directory);

        match attach {
            Attach::Interactive => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| failed(CommandFailure::Spawn(e)))?;
                if !status.success() {
                    return Err(failed(CommandFailure::Exit {
                        status,
                        stderr: String::new(),
                    }));
                }
            }
            Attach::Captured => {
                // Own process group, so a terminal Ctrl-C aimed at the
                // spinner does not also kill the build.
                #[cfg(unix)]
                {
                    use std::os::unix::process::CommandExt;
                    cmd.process_group(0);
                }
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .map_err(|e| failed(CommandFailure::Spawn(e)))?;
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.trim().is_empty() {
                    debug!(command = %command, "stdout:\n{}", stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    debug!(command = %command, "stderr:\n{}", stderr.trim_end());
                }
                if !output.status.success() {
                    return Err(failed(CommandFailure::Exit {
                        status: output.status,
                        stderr: tail(&stderr, STDERR_TAIL_LINES),
                    }));
                }
            }
        }
        Ok(())
    }
}

/// Last `lines` lines of `text`, trimmed.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n").trim().to_string()
}
