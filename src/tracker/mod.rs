//! Repository gateway: clone, open, fetch and inspect version-controlled
//! working copies.
//!
//! The lifecycle talks to repositories only through [`RepositoryGateway`],
//! so tests can wrap or replace the git-backed [`GitGateway`].

pub mod git;

pub use git::GitGateway;

use crate::errors::JxError;
use crate::registry::Revision;
use std::path::Path;

/// Result of synchronizing a working copy with its remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Nothing new on the remote. Not an error.
    UpToDate,
    /// The checked-out branch moved to a newer commit.
    Updated,
}

pub trait RepositoryGateway {
    type Repo;

    /// Materialize a full working copy of `url` at `destination`.
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<Self::Repo, JxError>;

    /// Attach to an existing working copy.
    fn open(&self, path: &Path) -> Result<Self::Repo, JxError>;

    /// The currently checked-out commit.
    fn head_revision(&self, repo: &Self::Repo) -> Result<Revision, JxError>;

    /// Synchronize remote history into the working copy.
    fn fetch(&self, repo: &Self::Repo) -> Result<FetchOutcome, JxError>;
}
