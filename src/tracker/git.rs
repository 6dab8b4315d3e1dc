use super::{FetchOutcome, RepositoryGateway};
use crate::errors::JxError;
use crate::registry::Revision;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Branch, Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository};
use std::path::Path;
use tracing::{debug, info, warn};

const REMOTE: &str = "origin";

/// Credential attempts before giving up, so a rejected key cannot loop forever.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// [`RepositoryGateway`] backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitGateway;

impl GitGateway {
    pub fn new() -> Self {
        Self
    }

    fn fetch_options<'a>() -> FetchOptions<'a> {
        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            if allowed.contains(CredentialType::SSH_KEY) {
                return Cred::ssh_key_from_agent(username.unwrap_or("git"));
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                let config = git2::Config::open_default()?;
                return Cred::credential_helper(&config, url, username);
            }
            Cred::default()
        });
        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options
    }

    /// Move the checked-out branch to its freshly fetched upstream.
    fn fast_forward(repo: &Repository) -> Result<FetchOutcome, git2::Error> {
        let head = repo.head()?;
        if !head.is_branch() {
            debug!("HEAD is detached, nothing to fast-forward");
            return Ok(FetchOutcome::UpToDate);
        }
        let Some(branch_ref) = head.name().map(str::to_string) else {
            return Ok(FetchOutcome::UpToDate);
        };
        let upstream = match Branch::wrap(head).upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                debug!(branch = %branch_ref, "branch has no upstream");
                return Ok(FetchOutcome::UpToDate);
            }
            Err(e) => return Err(e),
        };
        let Some(target) = upstream.get().target() else {
            return Ok(FetchOutcome::UpToDate);
        };
        let incoming = repo.find_annotated_commit(target)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(FetchOutcome::UpToDate);
        }
        if !analysis.is_fast_forward() {
            return Err(git2::Error::from_str(&format!(
                "{} has diverged from its upstream",
                branch_ref
            )));
        }

        let mut reference = repo.find_reference(&branch_ref)?;
        reference.set_target(target, "jx: fast-forward")?;
        repo.set_head(&branch_ref)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        info!(branch = %branch_ref, revision = %target, "fast-forwarded");
        Ok(FetchOutcome::Updated)
    }
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

impl RepositoryGateway for GitGateway {
    type Repo = Repository;

    fn clone_repo(&self, url: &str, destination: &Path) -> Result<Repository, JxError> {
        let clone_err = |source: git2::Error| JxError::Clone {
            url: url.to_string(),
            path: destination.to_path_buf(),
            source,
        };
        let existed = destination.exists();
        if existed && !is_empty_dir(destination) {
            return Err(clone_err(git2::Error::from_str(
                "destination exists and is not an empty directory",
            )));
        }

        if let Some(parent) = destination.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            return Err(clone_err(git2::Error::from_str(&format!(
                "cannot create {}: {}",
                parent.display(),
                e
            ))));
        }

        debug!(url, path = %destination.display(), "cloning");
        match RepoBuilder::new()
            .fetch_options(Self::fetch_options())
            .clone(url, destination)
        {
            Ok(repo) => Ok(repo),
            Err(source) => {
                if !existed
                    && let Err(e) = std::fs::remove_dir_all(destination)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    warn!(path = %destination.display(), error = %e, "failed to clean up partial clone");
                }
                Err(clone_err(source))
            }
        }
    }

    fn open(&self, path: &Path) -> Result<Repository, JxError> {
        Repository::open(path).map_err(|source| JxError::NotARepository {
            path: path.to_path_buf(),
            source,
        })
    }

    fn head_revision(&self, repo: &Repository) -> Result<Revision, JxError> {
        let head_err = |source: git2::Error| JxError::DetachedOrEmptyRepo {
            path: repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf(),
            source,
        };
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(head_err)?;
        Revision::try_from(commit.id().as_bytes())
            .map_err(|_| head_err(git2::Error::from_str("unsupported object id length")))
    }

    fn fetch(&self, repo: &Repository) -> Result<FetchOutcome, JxError> {
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        let fetch_err = |source: git2::Error| JxError::Fetch {
            path: path.clone(),
            source,
        };
        let mut remote = repo.find_remote(REMOTE).map_err(fetch_err)?;
        let refspecs: [&str; 0] = [];
        remote
            .fetch(&refspecs, Some(&mut Self::fetch_options()), None)
            .map_err(fetch_err)?;
        drop(remote);
        Self::fast_forward(repo).map_err(fetch_err)
    }
}
