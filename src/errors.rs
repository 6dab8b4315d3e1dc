//! Typed error hierarchy for jx.
//!
//! Every failure a lifecycle operation can surface is a `JxError` variant.
//! Variants are grouped by [`ErrorKind`], which the binary uses to tell the
//! user what to do next:
//! - `Validation`: rejected before any state change
//! - `ExternalTool`: git or a build/run command failed; rolls back during install only
//! - `StateConsistency`: the registry file cannot be trusted; fatal
//! - `StaleRecord`: the record points at a missing working copy; left intact
//! - `Environment`: the host is missing something jx needs; fatal at startup

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Broad classification of a [`JxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ExternalTool,
    StateConsistency,
    StaleRecord,
    Environment,
}

/// Errors from the registry, repository gateway, command runner and lifecycle.
#[derive(Debug, Error)]
pub enum JxError {
    #[error("project name is required")]
    NameRequired,

    #[error("'{name}' is not a valid project name")]
    InvalidName { name: String },

    #[error("empty command")]
    EmptyCommand,

    #[error("{name} is already installed")]
    AlreadyInstalled { name: String },

    #[error("{name} is not installed")]
    NotInstalled { name: String },

    #[error("{name} install is invalid: {} does not exist", path.display())]
    InvalidInstall { name: String, path: PathBuf },

    #[error("failed to clone {url} into {}: {source}", path.display())]
    Clone {
        url: String,
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("{} is not a git repository: {source}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("{} has no checked-out commit: {source}", path.display())]
    DetachedOrEmptyRepo {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("failed to fetch {}: {source}", path.display())]
    Fetch {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("`{command}` failed: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: CommandFailure,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read registry at {}: {source}", path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry at {}: {source}", path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write registry at {}: {source}", path.display())]
    RegistryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to find home directory")]
    HomeDirUnavailable,

    #[error("{tool} is required: {source}")]
    MissingTool {
        tool: String,
        #[source]
        source: which::Error,
    },
}

impl JxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JxError::NameRequired
            | JxError::InvalidName { .. }
            | JxError::EmptyCommand
            | JxError::AlreadyInstalled { .. }
            | JxError::NotInstalled { .. } => ErrorKind::Validation,
            JxError::Clone { .. }
            | JxError::NotARepository { .. }
            | JxError::DetachedOrEmptyRepo { .. }
            | JxError::Fetch { .. }
            | JxError::CommandExecution { .. }
            | JxError::Remove { .. } => ErrorKind::ExternalTool,
            JxError::RegistryRead { .. }
            | JxError::RegistryParse { .. }
            | JxError::RegistryWrite { .. } => ErrorKind::StateConsistency,
            JxError::InvalidInstall { .. } => ErrorKind::StaleRecord,
            JxError::HomeDirUnavailable | JxError::MissingTool { .. } => ErrorKind::Environment,
        }
    }
}

/// Why an external command did not succeed.
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("failed to spawn: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{status}{}", stderr_suffix(.stderr))]
    Exit { status: ExitStatus, stderr: String },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
