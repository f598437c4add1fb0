//! git-auto-commit - generate a conventional commit message for the pending
//! changes with an LLM, then stage and commit them.
//!
//! # Overview
//!
//! The working-tree status and diff are collected with libgit2, sent to an
//! OpenAI-compatible chat completions service, and the single-line reply is
//! validated as `feat: ...` or `fix: ...` before anything is staged.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod i18n;
pub mod llm;

// Re-export commonly used types
pub use commit::{CommitMessage, CommitOptions, ConfirmationMode, Orchestrator, Outcome};
pub use config::{Config, ConfigStore};
pub use error::{AutoCommitError, ConfigError};
pub use i18n::Language;
pub use llm::{ChatCompletionsClient, CompletionClient, CompletionInvoker};
