//! Startup check for external executables jx depends on.

use crate::errors::JxError;
use std::path::PathBuf;
use tracing::debug;

/// Resolve every tool on `PATH`, failing on the first one missing.
pub fn ensure_available<S: AsRef<str>>(tools: &[S]) -> Result<Vec<PathBuf>, JxError> {
    tools
        .iter()
        .map(|tool| {
            let tool = tool.as_ref();
            let path = which::which(tool).map_err(|source| JxError::MissingTool {
                tool: tool.to_string(),
                source,
            })?;
            debug!(tool, path = %path.display(), "found tool");
            Ok(path)
        })
        .collect()
}
