//! The working tree handle: read-only queries plus staging and commit.

use std::path::Path;

use git2::{Oid, Repository};
use tracing::debug;

use crate::error::AutoCommitError;

use super::diff::{ChangeDiff, collect_diff, resolve_head_tree};
use super::status::{RepositoryStatus, read_status};

/// A git working tree.
pub struct Workspace {
    repo: Repository,
}

impl Workspace {
    /// Open the working tree containing `path`.
    ///
    /// Searches parent directories like `git` does. Fails with
    /// [`AutoCommitError::NotARepository`] if `path` is not inside a
    /// non-bare repository.
    pub fn open(path: &Path) -> Result<Self, AutoCommitError> {
        let repo = Repository::discover(path).map_err(|e| {
            debug!("Repository discovery failed for {}: {}", path.display(), e);
            AutoCommitError::NotARepository(path.to_path_buf())
        })?;

        if repo.is_bare() {
            return Err(AutoCommitError::NotARepository(path.to_path_buf()));
        }

        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn status(&self) -> Result<RepositoryStatus, AutoCommitError> {
        read_status(&self.repo)
    }

    pub fn diff(&self) -> Result<ChangeDiff, AutoCommitError> {
        collect_diff(&self.repo)
    }

    /// Stage `paths` (relative to the working tree root).
    ///
    /// Paths that no longer exist on disk are removed from the index, like
    /// `git add` does for deletions.
    pub fn stage(&self, paths: &[String]) -> Result<(), AutoCommitError> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| AutoCommitError::CommitFailure("repository has no working tree".into()))?;
        let mut index = self.repo.index().map_err(commit_failure)?;

        for path in paths {
            let rel = Path::new(path);
            if workdir.join(rel).exists() {
                index.add_path(rel).map_err(commit_failure)?;
            } else {
                index.remove_path(rel).map_err(commit_failure)?;
            }
        }

        index.write().map_err(commit_failure)?;
        Ok(())
    }

    /// Commit the current index on HEAD.
    ///
    /// Works on an unborn branch, in which case the commit has no parent.
    pub fn commit(&self, message: &str) -> Result<Oid, AutoCommitError> {
        let mut index = self.repo.index().map_err(commit_failure)?;
        let tree_id = index.write_tree().map_err(commit_failure)?;
        let tree = self.repo.find_tree(tree_id).map_err(commit_failure)?;

        let sig = self.repo.signature().map_err(|e| {
            AutoCommitError::CommitFailure(format!(
                "missing user.name or user.email in git config: {}",
                e.message()
            ))
        })?;

        let parent = match resolve_head_tree(&self.repo) {
            Ok(Some(_)) => Some(
                self.repo
                    .head()
                    .and_then(|h| h.peel_to_commit())
                    .map_err(commit_failure)?,
            ),
            Ok(None) => None,
            Err(e) => return Err(AutoCommitError::CommitFailure(e.to_string())),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(commit_failure)
    }

    /// Stage `paths` then commit them with `message`.
    pub fn stage_and_commit(&self, paths: &[String], message: &str) -> Result<Oid, AutoCommitError> {
        self.stage(paths)?;
        self.commit(message)
    }
}

fn commit_failure(e: git2::Error) -> AutoCommitError {
    AutoCommitError::CommitFailure(e.message().to_string())
}
