use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use jx::config::Config;
use jx::errors::{ErrorKind, JxError};
use jx::jx_config::{self, JxToml};
use jx::lifecycle::Lifecycle;
use jx::runner::ProcessRunner;
use jx::toolchain;
use jx::tracker::GitGateway;
use jx::ui::icons::CROSS;

mod cmd;

#[derive(Parser)]
#[command(name = "jx")]
#[command(version, about = "Install, run, upgrade and uninstall JVM applications from git")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Application directory holding the registry and installed projects (default: ~/.jx)
    #[arg(long, global = true, env = "JX_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone, build and register a project
    Install {
        /// Git URL of the project
        #[arg(short, long)]
        git: String,
        /// Project name (defaults to the repository name)
        #[arg(short, long)]
        name: Option<String>,
        /// Build command (defaults to the Gradle wrapper's installDist)
        #[arg(short, long)]
        build: Option<String>,
        /// Run command (defaults to the installDist launcher script)
        #[arg(short, long)]
        execute: Option<String>,
    },
    /// Run an installed project, passing any further arguments through
    Run {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Fetch and rebuild installed projects
    Upgrade { names: Vec<String> },
    /// Remove installed projects
    Uninstall { names: Vec<String> },
    /// List installed projects
    List,
    /// View, create or validate settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current settings
    Show,
    /// Validate settings and show any warnings
    Validate,
    /// Initialize a default config.toml file
    Init,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("JX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "jx=debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Join the error and its causes, skipping causes whose text an outer
/// message already includes.
fn error_chain(err: &anyhow::Error) -> String {
    let mut out = String::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if out.contains(&message) {
            continue;
        }
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(&message);
    }
    out
}

/// Follow-up advice for failures the user has to repair by hand.
fn hint(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<JxError>()?.kind() {
        ErrorKind::StaleRecord => Some("uninstall the project, then install it again"),
        ErrorKind::StateConsistency => Some("repair or remove the registry file"),
        ErrorKind::Environment => {
            Some("install the missing tool, or adjust JX_REQUIRED_TOOLS or [toolchain] required")
        }
        ErrorKind::Validation | ErrorKind::ExternalTool => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}{}", CROSS, error_chain(&e));
            if let Some(hint) = hint(&e) {
                eprintln!("   {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let settings_path = jx_config::default_settings_path();
    if let Commands::Config { command } = cli.command {
        return cmd::cmd_config(settings_path.as_deref(), command);
    }

    let config = Config::new(cli.home)?;
    let store = config.registry_store();

    if let Commands::List = cli.command {
        return cmd::cmd_list(&store.load()?);
    }

    let settings = match &settings_path {
        Some(path) => JxToml::load_or_default(path)?,
        None => JxToml::default(),
    };
    toolchain::ensure_available(&settings.required_tools())?;

    let registry = store.load()?;
    let lifecycle = Lifecycle::new(
        GitGateway::new(),
        ProcessRunner::new(),
        settings.build_defaults(),
    );

    let (registry, outcome) = match cli.command {
        Commands::Install {
            git,
            name,
            build,
            execute,
        } => {
            let args = cmd::install::InstallArgs {
                git,
                name,
                build,
                execute,
            };
            cmd::cmd_install(lifecycle, &config, registry, args).await
        }
        Commands::Run { name, args } => {
            let outcome = cmd::cmd_run(&lifecycle, &registry, &name, &args);
            (registry, outcome)
        }
        Commands::Upgrade { names } => cmd::cmd_upgrade(lifecycle, registry, names).await,
        Commands::Uninstall { names } => cmd::cmd_uninstall(lifecycle, registry, names).await,
        Commands::List | Commands::Config { .. } => (registry, Ok(())),
    };

    // Persist partial batch progress even when the operation failed.
    let saved = store.save(&registry);
    outcome?;
    saved?;
    Ok(())
}
