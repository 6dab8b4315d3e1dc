//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled         |
//! |-----------|--------------------------|
//! | `install` | `Install`                |
//! | `run`     | `Run`                    |
//! | `manage`  | `Upgrade`, `Uninstall`   |
//! | `list`    | `List`                   |
//! | `config`  | `Config`                 |
//!
//! Commands that change the registry take it by value and always hand it
//! back, so `main` can save whatever progress was made before a failure.

pub mod config;
pub mod install;
pub mod list;
pub mod manage;
pub mod run;

pub use config::cmd_config;
pub use install::cmd_install;
pub use list::cmd_list;
pub use manage::{cmd_uninstall, cmd_upgrade};
pub use run::cmd_run;

use jx::lifecycle::Lifecycle;
use jx::runner::ProcessRunner;
use jx::tracker::GitGateway;

/// Lifecycle wired to real git and real processes.
pub type JxLifecycle = Lifecycle<GitGateway, ProcessRunner>;
