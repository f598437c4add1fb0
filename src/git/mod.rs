//! Working tree inspection and commit operations.

pub mod diff;
pub mod status;
pub mod workspace;

pub use diff::{ChangeDiff, MAX_DIFF_CHARS, TRUNCATION_MARKER, collect_diff};
pub use status::{RenamedPath, RepositoryStatus, read_status};
pub use workspace::Workspace;
