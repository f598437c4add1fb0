//! Diff collection from the working tree using git2.

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::AutoCommitError;

/// Maximum characters of diff text sent to the model.
pub const MAX_DIFF_CHARS: usize = 100_000;

/// Appended to the diff when it was cut at [`MAX_DIFF_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n... [diff truncated]";

/// Unified diff text for all pending changes, capped at [`MAX_DIFF_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDiff {
    text: String,
    truncated: bool,
}

impl ChangeDiff {
    /// Apply the size policy to raw diff text.
    ///
    /// Text longer than [`MAX_DIFF_CHARS`] characters is cut to exactly that
    /// many characters and the marker is appended.
    pub fn new(raw: String) -> Self {
        match raw.char_indices().nth(MAX_DIFF_CHARS) {
            Some((cut, _)) => {
                let mut text = raw;
                text.truncate(cut);
                text.push_str(TRUNCATION_MARKER);
                Self {
                    text,
                    truncated: true,
                }
            }
            None => Self {
                text: raw,
                truncated: false,
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, AutoCommitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(AutoCommitError::Vcs(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(AutoCommitError::Vcs)?;
    Ok(Some(tree))
}

/// Collect the working tree diff (staged + unstaged + untracked).
///
/// Staged changes come first, then unstaged changes including the content of
/// untracked files. Collection stops as soon as the text is long enough to be
/// truncated.
pub fn collect_diff(repo: &Repository) -> Result<ChangeDiff, AutoCommitError> {
    let head_tree = resolve_head_tree(repo)?;

    let staged_diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(AutoCommitError::Vcs)?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    let unstaged_diff = repo
        .diff_index_to_workdir(None, Some(&mut opts))
        .map_err(AutoCommitError::Vcs)?;

    let mut text = String::new();
    let mut chars = 0usize;
    append_diff_text(&staged_diff, &mut text, &mut chars);
    append_diff_text(&unstaged_diff, &mut text, &mut chars);

    let diff = ChangeDiff::new(text);
    debug!(
        "Collected diff: {} chars, truncated={}",
        diff.text().chars().count(),
        diff.is_truncated()
    );
    Ok(diff)
}

/// Append unified diff text, stopping once past the size limit.
fn append_diff_text(diff: &Diff<'_>, text: &mut String, chars: &mut usize) {
    if *chars > MAX_DIFF_CHARS {
        return;
    }

    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if *chars > MAX_DIFF_CHARS {
            return false;
        }

        let content = String::from_utf8_lossy(line.content());

        // Include the origin character for context
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
            *chars += 1;
        }
        text.push_str(&content);
        *chars += content.chars().count();

        true
    }) {
        // Aborting the callback surfaces as a user error; only warn on real failures.
        if e.code() != ErrorCode::User {
            warn!("Failed to collect diff text: {e}");
        }
    }
}
