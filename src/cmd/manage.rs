//! `jx upgrade` and `jx uninstall`.

use anyhow::Result;
use jx::registry::Registry;
use jx::ui::icons::{HAMMER, SPARKLE};
use jx::ui::{Status, with_status};

use super::JxLifecycle;

pub async fn cmd_upgrade(
    lifecycle: JxLifecycle,
    registry: Registry,
    names: Vec<String>,
) -> (Registry, Result<()>) {
    let status = Status::new(format!("Upgrading {}...", names.join(", ")), |done: &Vec<String>| {
        format!("{}Upgraded {}!", HAMMER, done.join(", "))
    });
    let (registry, result) = with_status(status, registry, move |registry: &mut Registry| {
        lifecycle.upgrade(registry, &names)
    })
    .await;
    (registry, result.map(|_| ()).map_err(Into::into))
}

pub async fn cmd_uninstall(
    lifecycle: JxLifecycle,
    registry: Registry,
    names: Vec<String>,
) -> (Registry, Result<()>) {
    let status = Status::new(
        format!("Uninstalling {}...", names.join(", ")),
        |done: &Vec<String>| format!("{}Uninstalled {}!", SPARKLE, done.join(", ")),
    );
    let (registry, result) = with_status(status, registry, move |registry: &mut Registry| {
        lifecycle.uninstall(registry, &names)
    })
    .await;
    (registry, result.map(|_| ()).map_err(Into::into))
}
