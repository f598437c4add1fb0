//! Error types for git-auto-commit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::i18n::{Language, Msg, tr};

/// Errors from config file operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// Every way a single invocation can fail.
///
/// All variants are terminal for the current run; nothing is retried.
#[derive(Error, Debug)]
pub enum AutoCommitError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("No changes to commit (working tree is clean)")]
    NoPendingChanges,

    #[error("No files to commit")]
    NoFilesToCommit,

    #[error("Completion request timed out after {0} ms")]
    Timeout(u64),

    #[error("Completion request rejected as too large: {0}")]
    PayloadTooLarge(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Completion returned no choices")]
    EmptyCompletion,

    #[error("Commit message has an invalid format: {0:?}")]
    InvalidFormat(String),

    #[error("Failed to commit: {0}")]
    CommitFailure(String),

    #[error("No API key configured")]
    MissingCredential,

    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("Git operation failed: {0}")]
    Vcs(#[source] git2::Error),

    #[error("Failed to read confirmation: {0}")]
    Confirmation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AutoCommitError {
    /// Render the error for the console in `lang`.
    ///
    /// The fixed part comes from the message table; any underlying detail
    /// (remote message, git error) is appended as-is.
    pub fn localized(&self, lang: Language) -> String {
        match self {
            AutoCommitError::NotARepository(_) => tr(lang, Msg::NotARepository).to_string(),
            AutoCommitError::NoPendingChanges => tr(lang, Msg::NoPendingChanges).to_string(),
            AutoCommitError::NoFilesToCommit => tr(lang, Msg::NoFilesToCommit).to_string(),
            AutoCommitError::Timeout(_) => tr(lang, Msg::Timeout).to_string(),
            AutoCommitError::PayloadTooLarge(_) => tr(lang, Msg::PayloadTooLarge).to_string(),
            AutoCommitError::RemoteService(detail) => {
                format!("{}{}", tr(lang, Msg::RemoteServiceError), detail)
            }
            AutoCommitError::EmptyCompletion => tr(lang, Msg::EmptyCompletion).to_string(),
            AutoCommitError::InvalidFormat(raw) => {
                format!("{}{}", tr(lang, Msg::InvalidFormat), raw)
            }
            AutoCommitError::CommitFailure(detail) => {
                format!("{}{}", tr(lang, Msg::CommitFailure), detail)
            }
            AutoCommitError::MissingCredential => tr(lang, Msg::MissingCredential).to_string(),
            AutoCommitError::UnknownSubcommand(name) => {
                format!("{}{}", tr(lang, Msg::UnknownSubcommand), name)
            }
            AutoCommitError::Vcs(e) => format!("{}{}", tr(lang, Msg::VcsFailure), e.message()),
            AutoCommitError::Confirmation(detail) => {
                format!("{}{}", tr(lang, Msg::ConfirmationFailed), detail)
            }
            AutoCommitError::Config(e) => format!("{}{}", tr(lang, Msg::ConfigFailure), e),
        }
    }
}
