//! Project lifecycle: install, run, upgrade and uninstall.
//!
//! Each project moves through `Absent → Installed → (Upgraded* | Absent)`.
//! The [`Lifecycle`] is the only code that mutates the [`Registry`]; the
//! repository gateway and command runner it drives never see it.
//!
//! Failure policy:
//! - `install` is all-or-nothing. Once the clone exists, any later failure
//!   removes the working copy again and the registry is left untouched.
//! - `upgrade` and `uninstall` resolve every name before touching anything,
//!   then process projects strictly in order. The first failure stops the
//!   batch; projects already processed stay processed.
//! - `run` surfaces only structural problems. A child that exits non-zero is
//!   logged and otherwise ignored, since interactive programs exit however
//!   they like.

pub mod defaults;

pub use defaults::{BuildDefaults, directory_name_for_url};

use crate::errors::JxError;
use crate::registry::{ProjectRecord, Registry};
use crate::runner::{Attach, CommandLine, CommandRunner};
use crate::tracker::RepositoryGateway;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything `install` needs to know about a new project.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub url: String,
    /// Where the working copy is cloned.
    pub directory: PathBuf,
    pub name: String,
    /// Build command; `None` or blank selects the wrapper default.
    pub build: Option<String>,
    /// Run command; `None` or blank selects the install-dist launcher.
    pub execute: Option<String>,
}

pub struct Lifecycle<G, R> {
    gateway: G,
    runner: R,
    defaults: BuildDefaults,
}

impl<G: RepositoryGateway, R: CommandRunner> Lifecycle<G, R> {
    pub fn new(gateway: G, runner: R, defaults: BuildDefaults) -> Self {
        Self {
            gateway,
            runner,
            defaults,
        }
    }

    /// Clone, build and register a new project.
    pub fn install(
        &self,
        registry: &mut Registry,
        request: InstallRequest,
    ) -> Result<ProjectRecord, JxError> {
        validate_name(&request.name)?;
        if registry.contains(&request.name) {
            return Err(JxError::AlreadyInstalled { name: request.name });
        }

        let repo = self.gateway.clone_repo(&request.url, &request.directory)?;
        let outcome = self.complete_install(&repo, &request);
        drop(repo);

        match outcome {
            Ok(record) => {
                info!(
                    project = %record.name,
                    revision = %record.revision,
                    path = %record.repository_path.display(),
                    "installed"
                );
                registry.insert(record.clone());
                Ok(record)
            }
            Err(e) => {
                rollback(&request.directory);
                Err(e)
            }
        }
    }

    fn complete_install(
        &self,
        repo: &G::Repo,
        request: &InstallRequest,
    ) -> Result<ProjectRecord, JxError> {
        let revision = self.gateway.head_revision(repo)?;

        let build_command = non_blank(request.build.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.build_command(&request.directory));
        let build = CommandLine::parse(&build_command)?;
        self.runner
            .run(&request.directory, &build, Attach::Captured)?;

        let run_command = non_blank(request.execute.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.defaults
                    .run_command(&request.directory, &request.name)
            });

        Ok(ProjectRecord {
            name: request.name.clone(),
            repository_path: request.directory.clone(),
            source_url: request.url.clone(),
            revision,
            build_command,
            run_command,
        })
    }

    /// Execute an installed project interactively with extra arguments.
    pub fn run<S: AsRef<str>>(
        &self,
        registry: &Registry,
        name: &str,
        args: &[S],
    ) -> Result<(), JxError> {
        let record = registry.get(name).ok_or_else(|| JxError::NotInstalled {
            name: name.to_string(),
        })?;
        if !record.is_valid() {
            return Err(JxError::InvalidInstall {
                name: name.to_string(),
                path: record.repository_path.clone(),
            });
        }
        let command = CommandLine::parse(&record.run_command)?
            .with_args(args.iter().map(|a| a.as_ref().to_string()));

        if let Err(e) = self
            .runner
            .run(&record.repository_path, &command, Attach::Interactive)
        {
            warn!(project = name, error = %e, "program did not exit cleanly");
        }
        Ok(())
    }

    /// Fetch, rebuild and refresh the revision of each named project.
    ///
    /// Returns the resolved names in processing order.
    pub fn upgrade<S: AsRef<str>>(
        &self,
        registry: &mut Registry,
        names: &[S],
    ) -> Result<Vec<String>, JxError> {
        let names = registry.resolve(names)?;

        for name in &names {
            let Some(record) = registry.get(name).cloned() else {
                continue;
            };
            let repo = self.gateway.open(&record.repository_path)?;
            let outcome = self.gateway.fetch(&repo)?;
            debug!(project = %name, ?outcome, "fetched");

            let build = CommandLine::parse(&record.build_command)?;
            self.runner
                .run(&record.repository_path, &build, Attach::Captured)?;

            // The build succeeded, so the project counts as upgraded even if
            // the new revision cannot be read.
            match self.gateway.head_revision(&repo) {
                Ok(revision) => {
                    if let Some(entry) = registry.get_mut(name) {
                        entry.revision = revision;
                    }
                    info!(project = %name, %revision, "upgraded");
                }
                Err(e) => {
                    warn!(project = %name, error = %e, "upgraded, keeping previous revision");
                }
            }
        }
        Ok(names)
    }

    /// Delete the working copy and registry entry of each named project.
    ///
    /// Returns the resolved names in processing order.
    pub fn uninstall<S: AsRef<str>>(
        &self,
        registry: &mut Registry,
        names: &[S],
    ) -> Result<Vec<String>, JxError> {
        let names = registry.resolve(names)?;

        for name in &names {
            let Some(path) = registry.get(name).map(|r| r.repository_path.clone()) else {
                continue;
            };
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(project = %name, path = %path.display(), "working copy already missing");
                }
                Err(source) => return Err(JxError::Remove { path, source }),
            }
            registry.remove(name);
            info!(project = %name, "uninstalled");
        }
        Ok(names)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Project names double as directory names and registry keys.
pub(crate) fn validate_name(name: &str) -> Result<(), JxError> {
    let invalid = name.trim().is_empty()
        || name != name.trim()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(JxError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Remove a partially installed working copy.
fn rollback(directory: &Path) {
    match std::fs::remove_dir_all(directory) {
        Ok(()) => debug!(path = %directory.display(), "rolled back install"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %directory.display(), error = %e, "failed to roll back install");
        }
    }
}
