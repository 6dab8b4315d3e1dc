//! `jx install`.

use anyhow::{Result, anyhow};
use jx::config::Config;
use jx::lifecycle::InstallRequest;
use jx::registry::{ProjectRecord, Registry};
use jx::ui::icons::ROCKET;
use jx::ui::{Status, with_status};

use super::JxLifecycle;

pub struct InstallArgs {
    pub git: String,
    pub name: Option<String>,
    pub build: Option<String>,
    pub execute: Option<String>,
}

/// Clone into `<app_dir>/<repository name>` and build. The project name
/// defaults to that directory name.
pub async fn cmd_install(
    lifecycle: JxLifecycle,
    config: &Config,
    registry: Registry,
    args: InstallArgs,
) -> (Registry, Result<()>) {
    let Some(directory) = config.project_dir_for_url(&args.git) else {
        return (
            registry,
            Err(anyhow!("cannot derive a project name from '{}'", args.git)),
        );
    };
    let name = match args.name {
        Some(name) => name,
        None => directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    };

    let request = InstallRequest {
        url: args.git,
        directory,
        name,
        build: args.build,
        execute: args.execute,
    };
    let status = Status::new(
        format!("Installing {}...", request.name),
        |record: &ProjectRecord| format!("{}Installed {}!", ROCKET, record.name),
    );

    let (registry, result) = with_status(status, registry, move |registry: &mut Registry| {
        lifecycle.install(registry, request)
    })
    .await;
    (registry, result.map(|_| ()).map_err(Into::into))
}
