//! User settings for jx, read from `<config_dir>/jx/config.toml`.
//!
//! Every field has a default, so a missing file and an empty file mean the
//! same thing. The file only tunes defaults; per-project commands given at
//! install time always win.
//!
//! # Configuration File Format
//!
//! ```toml
//! [build]
//! wrapper = "gradlew"
//! task = "installDist"
//! install_dir = "build/install"
//!
//! [toolchain]
//! required = ["java"]
//! ```
//!
//! `JX_CONFIG` points at a different file. `JX_REQUIRED_TOOLS` (comma
//! separated, empty for none) replaces `toolchain.required`.

use crate::lifecycle::BuildDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "JX_CONFIG";
pub const REQUIRED_TOOLS_ENV: &str = "JX_REQUIRED_TOOLS";

/// Default build and launch conventions for projects installed without
/// explicit commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build wrapper script at the repository root (no platform suffix)
    #[serde(default = "default_wrapper")]
    pub wrapper: String,
    /// Task passed to the wrapper
    #[serde(default = "default_task")]
    pub task: String,
    /// Where the task leaves installed distributions, relative to the repository
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
}

fn default_wrapper() -> String {
    BuildDefaults::default().wrapper
}

fn default_task() -> String {
    BuildDefaults::default().task
}

fn default_install_dir() -> PathBuf {
    BuildDefaults::default().install_dir
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            wrapper: default_wrapper(),
            task: default_task(),
            install_dir: default_install_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Executables that must be on PATH before any lifecycle command runs
    #[serde(default = "default_required_tools")]
    pub required: Vec<String>,
}

fn default_required_tools() -> Vec<String> {
    vec!["java".to_string()]
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            required: default_required_tools(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JxToml {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

impl JxToml {
    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Load settings, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }

    pub fn build_defaults(&self) -> BuildDefaults {
        BuildDefaults {
            wrapper: self.build.wrapper.clone(),
            task: self.build.task.clone(),
            install_dir: self.build.install_dir.clone(),
        }
    }

    /// Required tools after applying `JX_REQUIRED_TOOLS`.
    pub fn required_tools(&self) -> Vec<String> {
        match std::env::var(REQUIRED_TOOLS_ENV) {
            Ok(value) => parse_tool_list(&value),
            Err(_) => self.toolchain.required.clone(),
        }
    }

    /// Problems that would make installs misbehave. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.build.wrapper.trim().is_empty() {
            warnings.push("build.wrapper is empty".to_string());
        } else if self.build.wrapper.contains(char::is_whitespace) {
            warnings.push(format!(
                "build.wrapper '{}' contains whitespace and will be split into arguments",
                self.build.wrapper
            ));
        }
        if self.build.task.trim().is_empty() {
            warnings.push("build.task is empty".to_string());
        }
        if self.build.install_dir.is_absolute() {
            warnings.push(format!(
                "build.install_dir '{}' should be relative to the repository",
                self.build.install_dir.display()
            ));
        }
        for tool in &self.toolchain.required {
            if tool.trim().is_empty() {
                warnings.push("toolchain.required contains an empty entry".to_string());
            }
        }

        warnings
    }
}

/// Settings file location: `JX_CONFIG`, else `<config_dir>/jx/config.toml`.
pub fn default_settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("jx").join("config.toml"))
}

fn parse_tool_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tool| !tool.is_empty())
        .map(str::to_string)
        .collect()
}
