//! Default build and run commands for Gradle-style projects.

use std::path::{Path, PathBuf};

/// How to build and launch a project when no explicit commands are given.
///
/// The defaults follow the Gradle `application` plugin: the wrapper script at
/// the repository root runs `installDist`, which produces a launcher script at
/// `build/install/<name>/bin/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDefaults {
    /// Wrapper script name, without platform suffix.
    pub wrapper: String,
    /// Task passed to the wrapper.
    pub task: String,
    /// Directory, relative to the repository, holding installed distributions.
    pub install_dir: PathBuf,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            wrapper: "gradlew".to_string(),
            task: "installDist".to_string(),
            install_dir: PathBuf::from("build").join("install"),
        }
    }
}

impl BuildDefaults {
    /// `<directory>/gradlew installDist`, with `.bat` on Windows.
    pub fn build_command(&self, directory: &Path) -> String {
        let wrapper = directory.join(with_script_suffix(&self.wrapper));
        format!("{} {}", wrapper.display(), self.task)
    }

    /// `<directory>/build/install/<name>/bin/<name>`, with `.bat` on Windows.
    pub fn run_command(&self, directory: &Path, name: &str) -> String {
        directory
            .join(&self.install_dir)
            .join(name)
            .join("bin")
            .join(with_script_suffix(name))
            .display()
            .to_string()
    }
}

fn with_script_suffix(file: &str) -> String {
    if cfg!(windows) {
        format!("{}.bat", file)
    } else {
        file.to_string()
    }
}

/// Directory (and default project) name for a repository URL: its last path
/// segment without extension. `None` when that is not a usable name, such as
/// `.` or `..`, which would point at the application directory itself.
///
/// `git@github.com:c-fraser/echo.git` and `https://github.com/c-fraser/echo`
/// both yield `echo`.
pub fn directory_name_for_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\', ':']).next()?;
    let stem = match base.rfind('.') {
        Some(idx) => &base[..idx],
        None => base,
    };
    super::validate_name(stem).ok()?;
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_command_uses_wrapper_in_directory() {
        let defaults = BuildDefaults::default();
        let cmd = defaults.build_command(Path::new("/home/me/.jx/echo"));
        if cfg!(windows) {
            assert!(cmd.ends_with("gradlew.bat installDist"));
        } else {
            assert_eq!(cmd, "/home/me/.jx/echo/gradlew installDist");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_default_run_command_points_at_install_dist_script() {
        let defaults = BuildDefaults::default();
        assert_eq!(
            defaults.run_command(Path::new("/home/me/.jx/echo"), "echo"),
            "/home/me/.jx/echo/build/install/echo/bin/echo"
        );
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = BuildDefaults {
            wrapper: "mvnw".to_string(),
            task: "package".to_string(),
            install_dir: PathBuf::from("target"),
        };
        let cmd = defaults.build_command(Path::new("/p"));
        assert!(cmd.ends_with(" package"));
        assert!(cmd.contains("mvnw"));
    }

    #[test]
    fn test_directory_name_for_url() {
        assert_eq!(
            directory_name_for_url("git@github.com:c-fraser/echo.git").as_deref(),
            Some("echo")
        );
        assert_eq!(
            directory_name_for_url("https://github.com/c-fraser/echo").as_deref(),
            Some("echo")
        );
        assert_eq!(
            directory_name_for_url("https://github.com/c-fraser/echo.git/").as_deref(),
            Some("echo")
        );
        assert_eq!(
            directory_name_for_url("/tmp/fixtures/my.app.git").as_deref(),
            Some("my.app")
        );
        assert_eq!(directory_name_for_url("git@host:repo.git").as_deref(), Some("repo"));
    }

    #[test]
    fn test_directory_name_for_url_without_name() {
        assert_eq!(directory_name_for_url(""), None);
        assert_eq!(directory_name_for_url("https://example.com/.git"), None);
        assert_eq!(directory_name_for_url("../.."), None);
        assert_eq!(directory_name_for_url("/tmp/origins/echo/sub/.."), None);
        assert_eq!(directory_name_for_url("/tmp/origins/echo/."), None);
        assert_eq!(directory_name_for_url("git@host:.."), None);
    }
}
