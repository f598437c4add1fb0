//! Working tree status partitioned into the categories the tool reasons about.

use std::collections::BTreeSet;

use git2::{Repository, Status, StatusOptions};

use crate::error::AutoCommitError;

/// A rename recorded in the index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenamedPath {
    pub from: String,
    pub to: String,
}

/// Relative paths of pending changes, by category.
///
/// A path can appear in more than one category: a modification that was
/// staged shows up in both `staged` and `modified`, a new file added to the
/// index in both `staged` and `created`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub staged: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub created: BTreeSet<String>,
    pub renamed: BTreeSet<RenamedPath>,
    pub not_added: BTreeSet<String>,
    pub conflicted: BTreeSet<String>,
}

impl RepositoryStatus {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.created.is_empty()
            && self.renamed.is_empty()
            && self.not_added.is_empty()
            && self.conflicted.is_empty()
    }

    /// Paths the commit step stages: staged ∪ modified ∪ deleted ∪ not-added.
    ///
    /// Conflicted paths are never included, so a conflicted-only tree yields
    /// an empty list even though it is not clean.
    pub fn files_to_commit(&self) -> Vec<String> {
        let union: BTreeSet<&String> = self
            .staged
            .iter()
            .chain(&self.modified)
            .chain(&self.deleted)
            .chain(&self.not_added)
            .collect();
        union.into_iter().cloned().collect()
    }

    /// Record one status entry.
    pub(crate) fn record(&mut self, path: &str, status: Status, head_to_index_old: Option<&str>) {
        let path = path.to_string();

        if status.is_conflicted() {
            self.conflicted.insert(path);
            return;
        }

        if status.is_index_new() {
            self.created.insert(path.clone());
            self.staged.insert(path.clone());
        }
        if status.is_index_modified() || status.is_index_typechange() {
            self.modified.insert(path.clone());
            self.staged.insert(path.clone());
        }
        if status.is_index_deleted() {
            self.deleted.insert(path.clone());
            self.staged.insert(path.clone());
        }
        if status.is_index_renamed() {
            if let Some(from) = head_to_index_old {
                self.renamed.insert(RenamedPath {
                    from: from.to_string(),
                    to: path.clone(),
                });
            }
            self.staged.insert(path.clone());
        }

        if status.is_wt_new() {
            self.not_added.insert(path.clone());
        }
        if status.is_wt_modified() || status.is_wt_typechange() {
            self.modified.insert(path.clone());
        }
        if status.is_wt_deleted() {
            self.deleted.insert(path);
        }
    }
}

/// Read the current status of the working tree.
///
/// Untracked directories are expanded to individual files and ignored files
/// are skipped.
pub fn read_status(repo: &Repository) -> Result<RepositoryStatus, AutoCommitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts)).map_err(AutoCommitError::Vcs)?;

    let mut status = RepositoryStatus::default();
    for entry in statuses.iter() {
        let flags = entry.status();
        let old_path = entry
            .head_to_index()
            .and_then(|d| d.old_file().path().map(|p| p.to_string_lossy().to_string()));

        // Renamed entries report the new path here.
        let path = match entry.path() {
            Some(p) => p.to_string(),
            None => String::from_utf8_lossy(entry.path_bytes()).to_string(),
        };

        if path.is_empty() {
            continue;
        }

        status.record(&path, flags, old_path.as_deref());
    }

    Ok(status)
}
