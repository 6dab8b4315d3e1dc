//! `jx run`.

use anyhow::Result;
use jx::registry::Registry;

use super::JxLifecycle;

/// Run in the foreground with the terminal attached. No spinner.
pub fn cmd_run(lifecycle: &JxLifecycle, registry: &Registry, name: &str, args: &[String]) -> Result<()> {
    lifecycle.run(registry, name, args)?;
    Ok(())
}
