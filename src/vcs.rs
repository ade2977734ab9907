//! Version-control capability used by `git_clone` actions.
use std::collections::BTreeSet;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Config, Cred, CredentialType, Direction, FetchOptions, Remote, RemoteCallbacks, Repository,
};

/// Remote tracked by clones created here.
const ORIGIN: &str = "origin";

/// Attempts per credential request before giving up.
const MAX_AUTH_ATTEMPTS: usize = 3;

/// Branches advertised by a remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRefs {
    /// The branch the remote's `HEAD` points at, if it advertises one.
    pub default: Option<String>,
    /// Short names of every advertised branch.
    pub branches: BTreeSet<String>,
}

/// Outcome of fast-forwarding a local branch to its remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastForward {
    /// Nothing to do.
    UpToDate,
    /// The branch moved forward.
    Updated,
    /// A merge would be required; nothing was changed.
    Diverged,
}

/// Git operations needed to clone and update repositories.
#[cfg_attr(test, mockall::automock)]
pub trait Vcs: Send + Sync {
    /// List the branches of the remote at `url` without cloning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote cannot be reached.
    fn remote_branches(&self, url: &str) -> Result<RemoteRefs, git2::Error>;

    /// Clone `url` into `dest` with `branch` checked out.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails or the branch does not exist.
    fn clone_repo(&self, url: &str, dest: &Path, branch: &str) -> Result<(), git2::Error>;

    /// Whether `path` is the root of a git repository.
    fn is_repository(&self, path: &Path) -> bool;

    /// URL of the `origin` remote of the repository at `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened.
    fn remote_url(&self, repo: &Path) -> Result<Option<String>, git2::Error>;

    /// Short name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns an error if `HEAD` is detached or unborn.
    fn current_branch(&self, repo: &Path) -> Result<String, git2::Error>;

    /// Fetch `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    fn fetch(&self, repo: &Path) -> Result<(), git2::Error>;

    /// Fast-forward `branch` to `origin/<branch>` and check it out.
    ///
    /// Uncommitted changes to files the update leaves alone are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if either reference is missing, or if the checkout
    /// would overwrite local changes. The branch is not moved in that case.
    fn fast_forward(&self, repo: &Path, branch: &str) -> Result<FastForward, git2::Error>;
}

/// [`Vcs`] backed by libgit2.
///
/// Authentication uses the SSH agent for SSH remotes and the configured git
/// credential helper for HTTPS remotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitVcs;

impl GitVcs {
    fn callbacks<'a>() -> RemoteCallbacks<'a> {
        let config = Config::open_default().ok();
        let mut attempts = 0_usize;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            attempts += 1;
            if attempts > MAX_AUTH_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            if allowed.contains(CredentialType::SSH_KEY) {
                return Cred::ssh_key_from_agent(username.unwrap_or("git"));
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
                && let Some(config) = &config
            {
                return Cred::credential_helper(config, url, username);
            }
            Cred::default()
        });
        callbacks
    }

    fn fetch_options<'a>() -> FetchOptions<'a> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(Self::callbacks());
        options
    }
}

impl Vcs for GitVcs {
    fn remote_branches(&self, url: &str) -> Result<RemoteRefs, git2::Error> {
        let mut remote = Remote::create_detached(url)?;
        let connection = remote.connect_auth(Direction::Fetch, Some(Self::callbacks()), None)?;

        let branches: BTreeSet<String> = connection
            .list()?
            .iter()
            .filter_map(|head| head.name().strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect();
        let default = connection
            .default_branch()
            .ok()
            .and_then(|buf| buf.as_str().map(str::to_string))
            .and_then(|name| name.strip_prefix("refs/heads/").map(str::to_string))
            .filter(|name| branches.contains(name));

        tracing::debug!(url, ?default, count = branches.len(), "listed remote branches");
        Ok(RemoteRefs { default, branches })
    }

    fn clone_repo(&self, url: &str, dest: &Path, branch: &str) -> Result<(), git2::Error> {
        tracing::debug!(url, dest = %dest.display(), branch, "cloning");
        RepoBuilder::new()
            .branch(branch)
            .fetch_options(Self::fetch_options())
            .clone(url, dest)?;
        Ok(())
    }

    fn is_repository(&self, path: &Path) -> bool {
        Repository::open(path).is_ok()
    }

    fn remote_url(&self, repo: &Path) -> Result<Option<String>, git2::Error> {
        let repo = Repository::open(repo)?;
        let url = match repo.find_remote(ORIGIN) {
            Ok(remote) => remote.url().map(str::to_string),
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(e),
        };
        Ok(url)
    }

    fn current_branch(&self, repo: &Path) -> Result<String, git2::Error> {
        let repo = Repository::open(repo)?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(git2::Error::from_str("HEAD is detached"));
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))
    }

    fn fetch(&self, repo: &Path) -> Result<(), git2::Error> {
        let repo = Repository::open(repo)?;
        let mut remote = repo.find_remote(ORIGIN)?;
        tracing::debug!(url = remote.url().unwrap_or_default(), "fetching");
        remote.fetch(&[] as &[&str], Some(&mut Self::fetch_options()), None)
    }

    fn fast_forward(&self, repo: &Path, branch: &str) -> Result<FastForward, git2::Error> {
        let repo = Repository::open(repo)?;
        let upstream = repo.find_reference(&format!("refs/remotes/{ORIGIN}/{branch}"))?;
        let upstream = repo.reference_to_annotated_commit(&upstream)?;
        let (analysis, _) = repo.merge_analysis(&[&upstream])?;

        if analysis.is_up_to_date() {
            return Ok(FastForward::UpToDate);
        }
        if !analysis.is_fast_forward() {
            return Ok(FastForward::Diverged);
        }

        // Local edits that the update would touch make the checkout fail
        // before the branch moves.
        let target = repo.find_commit(upstream.id())?;
        repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;

        let refname = format!("refs/heads/{branch}");
        let mut local = repo.find_reference(&refname)?;
        local.set_target(upstream.id(), "dotdot: fast-forward")?;
        repo.set_head(&refname)?;
        Ok(FastForward::Updated)
    }
}
