//! Persistent registry of installed projects.
//!
//! The registry is a single JSON document, `{"projects": {name: record}}`,
//! loaded once when jx starts and written back once when it exits. An empty
//! registry is never left on disk: saving it removes the file, and the
//! directory as well once it holds nothing else.
//!
//! There is no file locking. Two jx processes racing on the same registry is
//! unsupported.

use crate::errors::JxError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifier of a git commit (a SHA-1 object id).
///
/// Serialized as an array of 20 integers. Compared for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision([u8; 20]);

impl Revision {
    pub const LEN: usize = 20;

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the all-zero revision a record never legitimately carries.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl TryFrom<&[u8]> for Revision {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.try_into()?))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// An installed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Registry key; not stored inside the record itself.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "repository")]
    pub repository_path: PathBuf,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "reference")]
    pub revision: Revision,
    #[serde(rename = "build")]
    pub build_command: String,
    #[serde(rename = "execute")]
    pub run_command: String,
}

impl ProjectRecord {
    /// A record is runnable only while its working copy exists.
    pub fn is_valid(&self) -> bool {
        self.repository_path.is_dir()
    }
}

/// In-memory mapping from project name to record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    projects: BTreeMap<String, ProjectRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ProjectRecord> {
        self.projects.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Insert a record under its own name, replacing any previous entry.
    pub fn insert(&mut self, record: ProjectRecord) -> Option<ProjectRecord> {
        self.projects.insert(record.name.clone(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<ProjectRecord> {
        self.projects.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.projects.values()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Resolve every name against the registry before anything is mutated.
    ///
    /// Fails with `NameRequired` for an empty list and `NotInstalled` for the
    /// first unknown name. Repeated names are collapsed, keeping first-seen order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>, JxError> {
        if names.is_empty() {
            return Err(JxError::NameRequired);
        }
        let mut resolved: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(JxError::NotInstalled {
                    name: name.to_string(),
                });
            }
            if !resolved.iter().any(|n| n == name) {
                resolved.push(name.to_string());
            }
        }
        Ok(resolved)
    }

    /// Restore the `name` field of every record from its map key.
    fn attach_names(&mut self) {
        for (name, record) in self.projects.iter_mut() {
            record.name = name.clone();
        }
    }
}

/// Loads and saves a [`Registry`] at a fixed path.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the registry. Nothing is created on disk.
    ///
    /// A missing file is an empty registry. An unreadable or malformed file is
    /// an error the caller must treat as fatal.
    pub fn load(&self) -> Result<Registry, JxError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no registry file, starting empty");
                return Ok(Registry::new());
            }
            Err(source) => {
                return Err(JxError::RegistryRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let mut registry: Registry =
            serde_json::from_str(&content).map_err(|source| JxError::RegistryParse {
                path: self.path.clone(),
                source,
            })?;
        registry.attach_names();
        debug!(path = %self.path.display(), projects = registry.len(), "loaded registry");
        Ok(registry)
    }

    /// Write the registry back, fully replacing the previous file.
    ///
    /// An empty registry removes the file instead, and the containing directory
    /// too when nothing else is left in it.
    pub fn save(&self, registry: &Registry) -> Result<(), JxError> {
        if registry.is_empty() {
            return self.remove_all();
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let write_err = |source: std::io::Error| JxError::RegistryWrite {
            path: self.path.clone(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(registry).map_err(|e| write_err(e.into()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), projects = registry.len(), "saved registry");
        Ok(())
    }

    fn remove_all(&self) -> Result<(), JxError> {
        let write_err = |source: std::io::Error| JxError::RegistryWrite {
            path: self.path.clone(),
            source,
        };
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_err(e)),
        }
        // Only an empty directory goes; anything else in it is not ours.
        if let Some(dir) = self.path.parent() {
            match std::fs::remove_dir(dir) {
                Ok(()) => {
                    debug!(path = %dir.display(), "registry empty, removed application directory");
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::NotFound | std::io::ErrorKind::DirectoryNotEmpty
                    ) =>
                {
                    debug!(path = %dir.display(), "registry empty, keeping application directory");
                }
                Err(e) => return Err(write_err(e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, root: &Path) -> ProjectRecord {
        ProjectRecord {
            name: name.to_string(),
            repository_path: root.join(name),
            source_url: format!("https://example.com/{}.git", name),
            revision: Revision::new([7; 20]),
            build_command: "./gradlew installDist".to_string(),
            run_command: format!("./build/install/{0}/bin/{0}", name),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty_and_creates_nothing() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join(".jx/config.json"));
        let registry = store.load().unwrap();
        assert!(registry.is_empty());
        assert!(!dir.path().join(".jx").exists());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join(".jx/config.json"));
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        registry.insert(record("greet", dir.path()));

        store.save(&registry).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, registry);
        assert_eq!(loaded.get("echo").unwrap().name, "echo");
        assert_eq!(loaded.get("greet").unwrap().revision, Revision::new([7; 20]));
    }

    #[test]
    fn test_save_uses_original_document_shape() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("config.json"));
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        store.save(&registry).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let entry = &raw["projects"]["echo"];
        assert!(entry["repository"].is_string());
        assert_eq!(entry["url"], "https://example.com/echo.git");
        assert_eq!(entry["reference"].as_array().unwrap().len(), Revision::LEN);
        assert_eq!(entry["build"], "./gradlew installDist");
        assert!(entry["execute"].is_string());
        assert!(entry.get("name").is_none());
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("config.json"));
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        registry.insert(record("greet", dir.path()));
        store.save(&registry).unwrap();

        registry.remove("greet");
        store.save(&registry).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.contains("greet"));
    }

    #[test]
    fn test_save_empty_removes_file_and_directory() {
        let dir = tempdir().unwrap();
        let app_dir = dir.path().join(".jx");
        let store = RegistryStore::new(app_dir.join("config.json"));
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        store.save(&registry).unwrap();
        assert!(store.path().exists());

        registry.remove("echo");
        store.save(&registry).unwrap();
        assert!(!store.path().exists());
        assert!(!app_dir.exists());

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_empty_keeps_directory_with_other_files() {
        let dir = tempdir().unwrap();
        let app_dir = dir.path().join("work");
        let store = RegistryStore::new(app_dir.join("config.json"));
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        store.save(&registry).unwrap();
        std::fs::write(app_dir.join("important.txt"), "keep me").unwrap();
        std::fs::create_dir_all(app_dir.join("other-project")).unwrap();

        store.save(&Registry::new()).unwrap();

        assert!(!store.path().exists());
        assert!(app_dir.join("important.txt").exists());
        assert!(app_dir.join("other-project").is_dir());
    }

    #[test]
    fn test_save_empty_without_anything_on_disk() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("missing/config.json"));
        store.save(&Registry::new()).unwrap();
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = RegistryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, JxError::RegistryParse { .. }));
    }

    #[test]
    fn test_load_accepts_document_without_projects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(RegistryStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_requires_names() {
        let registry = Registry::new();
        let names: [&str; 0] = [];
        assert!(matches!(
            registry.resolve(&names),
            Err(JxError::NameRequired)
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_name() {
        let dir = tempdir().unwrap();
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        let err = registry.resolve(&["echo", "missing"]).unwrap_err();
        match err {
            JxError::NotInstalled { name } => assert_eq!(name, "missing"),
            other => panic!("Expected NotInstalled, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_collapses_duplicates_in_order() {
        let dir = tempdir().unwrap();
        let mut registry = Registry::new();
        registry.insert(record("echo", dir.path()));
        registry.insert(record("greet", dir.path()));
        let resolved = registry.resolve(&["greet", "echo", "greet"]).unwrap();
        assert_eq!(resolved, vec!["greet".to_string(), "echo".to_string()]);
    }

    #[test]
    fn test_revision_display_and_emptiness() {
        let mut bytes = [0u8; 20];
        assert!(Revision::new(bytes).is_empty());
        bytes[0] = 0xab;
        bytes[19] = 0x01;
        let rev = Revision::new(bytes);
        assert!(!rev.is_empty());
        let hex = rev.to_string();
        assert_eq!(hex.len(), 40);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("01"));
    }

    #[test]
    fn test_revision_from_wrong_length_slice_fails() {
        assert!(Revision::try_from(&[1u8, 2, 3][..]).is_err());
        assert!(Revision::try_from(&[1u8; 20][..]).is_ok());
    }
}
