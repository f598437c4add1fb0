//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use git_auto_commit::commit::Confirmation;
use git_auto_commit::error::AutoCommitError;
use git_auto_commit::llm::{
    Choice, CompletionClient, CompletionRequest, CompletionResponse, RemoteFailure,
};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, with an
    /// identity configured so commits can be written.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repo root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Add a file to the index without committing.
    pub fn stage(&self, relative: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(relative)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Stage the given files and commit them. Returns the commit OID.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> Oid {
        for (name, content) in files {
            self.write(name, content);
            self.stage(name);
        }

        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Leave `name` (a top-level file) in an unresolved merge conflict.
    ///
    /// Commits a base version, diverges it on a `side` branch and on HEAD,
    /// then merges `side` into HEAD so the index holds conflict entries.
    pub fn merge_conflict(&self, name: &str) {
        let base = self.commit_files(&[(name, "base\n")], "feat: base");
        let base_commit = self.repo.find_commit(base).expect("Failed to find base commit");

        let blob = self.repo.blob(b"theirs\n").expect("Failed to write blob");
        let base_tree = base_commit.tree().expect("Failed to get base tree");
        let mut builder = self
            .repo
            .treebuilder(Some(&base_tree))
            .expect("Failed to create tree builder");
        builder.insert(name, blob, 0o100644).expect("Failed to insert blob");
        let tree_id = builder.write().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let theirs = self
            .repo
            .commit(Some("refs/heads/side"), &sig, &sig, "fix: theirs", &tree, &[&base_commit])
            .expect("Failed to commit side branch");

        self.commit_files(&[(name, "ours\n")], "fix: ours");

        let annotated = self
            .repo
            .find_annotated_commit(theirs)
            .expect("Failed to annotate side commit");
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.allow_conflicts(true).conflict_style_merge(true).force();
        self.repo
            .merge(&[&annotated], None, Some(&mut checkout))
            .expect("Failed to merge side branch");

        assert!(
            self.repo.index().expect("Failed to get index").has_conflicts(),
            "merge should leave conflicts"
        );
    }

    /// Message of the commit HEAD points to, if any.
    pub fn head_message(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        let commit = head.peel_to_commit().ok()?;
        commit.message().map(str::to_string)
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        let Ok(mut walk) = self.repo.revwalk() else {
            return 0;
        };
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }

    /// Number of entries in the index.
    pub fn index_len(&self) -> usize {
        self.repo.index().expect("Failed to get index").len()
    }

    /// Paths changed in the HEAD commit relative to its parent.
    pub fn head_paths(&self) -> Vec<String> {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("HEAD commit");
        let tree = commit.tree().expect("HEAD tree");
        let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .expect("Failed to diff HEAD");
        let mut paths: Vec<String> = diff
            .deltas()
            .filter_map(|d| {
                d.new_file()
                    .path()
                    .or_else(|| d.old_file().path())
                    .map(|p| p.to_string_lossy().to_string())
            })
            .collect();
        paths.sort();
        paths
    }
}

/// Completion client that replays a fixed answer and records what it was sent.
#[derive(Clone)]
pub struct ScriptedClient {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Clone)]
enum Reply {
    Choices(Vec<String>),
    Failure(RemoteFailure),
    Hang,
}

impl ScriptedClient {
    /// Answer with a single choice.
    pub fn replying(text: &str) -> Self {
        Self::with_reply(Reply::Choices(vec![text.to_string()]))
    }

    /// Answer with an empty choice list.
    pub fn empty() -> Self {
        Self::with_reply(Reply::Choices(Vec::new()))
    }

    pub fn failing(failure: RemoteFailure) -> Self {
        Self::with_reply(Reply::Failure(failure))
    }

    /// Never answer within any reasonable deadline.
    pub fn hanging() -> Self {
        Self::with_reply(Reply::Hang)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of every request sent.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }

    /// Shared call counter, readable after the client has been moved.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, RemoteFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        match &self.reply {
            Reply::Choices(texts) => Ok(CompletionResponse {
                choices: texts.iter().map(|t| Choice { text: t.clone() }).collect(),
            }),
            Reply::Failure(failure) => Err(failure.clone()),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(CompletionResponse::default())
            }
        }
    }
}

/// Confirmation that answers with a fixed line and counts how often it was asked.
pub struct ScriptedConfirmation {
    answer: String,
    asked: Arc<AtomicUsize>,
}

impl ScriptedConfirmation {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            asked: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn asked(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.asked)
    }
}

impl Confirmation for ScriptedConfirmation {
    fn ask(&mut self, _prompt: &str) -> Result<String, AutoCommitError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}
