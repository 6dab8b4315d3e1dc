//! Settings view and validation commands, `jx config`.

use std::path::Path;

use anyhow::{Result, bail};
use jx::jx_config::JxToml;

use super::super::ConfigCommands;

fn print_settings(toml: &JxToml) {
    println!("[build]");
    println!("  wrapper = \"{}\"", toml.build.wrapper);
    println!("  task = \"{}\"", toml.build.task);
    println!("  install_dir = \"{}\"", toml.build.install_dir.display());
    println!();
    println!("[toolchain]");
    println!("  required = {:?}", toml.toolchain.required);
    println!();
}

pub fn cmd_config(settings_path: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    let Some(config_path) = settings_path else {
        bail!("unable to locate a configuration directory; set JX_CONFIG");
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("jx Settings");
            println!("===========");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                print_settings(&JxToml::load(config_path)?);
            } else {
                println!("No config.toml found at {}", config_path.display());
                println!();
                println!("Using default settings:");
                print_settings(&JxToml::default());
                println!("Run 'jx config init' to create a config.toml file.");
                println!();
            }

            let effective = JxToml::load_or_default(config_path)?.required_tools();
            println!("Effective required tools (with env overrides): {:?}", effective);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating settings...");
            println!();

            if !config_path.exists() {
                println!("No config.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = JxToml::load(config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Settings are valid.");
            } else {
                println!("Settings warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("config.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            JxToml::default().save(config_path)?;

            println!("Created config.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [build] wrapper, task, install_dir");
            println!("  - [toolchain] required");
            println!();
        }
    }

    Ok(())
}
