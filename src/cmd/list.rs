//! `jx list`.

use anyhow::Result;
use console::style;
use jx::registry::Registry;
use jx::ui::icons::{CHECK, WARN};

const SHORT_REVISION: usize = 7;

pub fn cmd_list(registry: &Registry) -> Result<()> {
    if registry.is_empty() {
        println!("No projects installed.");
        println!("Run 'jx install --git <URL>' to install one.");
        return Ok(());
    }

    for record in registry.iter() {
        let revision = record.revision.to_string();
        let short = &revision[..SHORT_REVISION.min(revision.len())];
        let marker = if record.is_valid() { &CHECK } else { &WARN };
        println!(
            "{}{} {} {}",
            marker,
            style(&record.name).bold(),
            style(short).yellow(),
            style(record.repository_path.display()).dim()
        );
        if !record.is_valid() {
            println!("    working copy is missing; reinstall or uninstall it");
        }
    }
    Ok(())
}
