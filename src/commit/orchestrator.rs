//! The commit flow: analyze, generate, confirm, commit.
//!
//! ```text
//! Idle -> Analyzing -> Generating -> AwaitingConfirmation -> Committing -> Done
//!            \______________\_______________\____________________\-> Failed
//! ```
//!
//! The orchestrator is the only place that prints outcomes and chooses the
//! process exit code.

use std::fmt;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use dialoguer::Input;
use git2::Oid;
use tracing::debug;

use crate::commit::message::CommitMessage;
use crate::commit::prompt::build_prompt;
use crate::error::AutoCommitError;
use crate::git::{RepositoryStatus, Workspace};
use crate::i18n::{Language, Msg, tr};
use crate::llm::{CompletionClient, CompletionInvoker};

/// Per-invocation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub language: Language,
}

/// Whether to ask before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMode {
    Interactive,
    AutoConfirm,
}

/// Source of the single line of confirmation input.
pub trait Confirmation {
    fn ask(&mut self, prompt: &str) -> Result<String, AutoCommitError>;
}

/// Reads the answer from the terminal, or from stdin when it is not a TTY.
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn ask(&mut self, prompt: &str) -> Result<String, AutoCommitError> {
        if std::io::stdin().is_terminal() {
            return Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| AutoCommitError::Confirmation(e.to_string()));
        }

        println!("{}", prompt);
        read_answer(&mut std::io::stdin().lock())
    }
}

/// Read one line of confirmation input.
///
/// End of input means nobody answered, which is an error rather than the
/// empty answer that proceeds.
pub fn read_answer<R: BufRead>(reader: &mut R) -> Result<String, AutoCommitError> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| AutoCommitError::Confirmation(e.to_string()))?;
    if read == 0 {
        return Err(AutoCommitError::Confirmation(
            "input closed before an answer was given".to_string(),
        ));
    }
    Ok(line)
}

/// Only an explicit `n`/`N` declines; anything else, including an empty
/// line, proceeds with the commit.
pub fn is_declined(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("n")
}

/// Open the working tree at `path` and require pending changes.
///
/// The same checks the flow starts with, without generating anything.
pub fn check_repository(path: &Path) -> Result<(), AutoCommitError> {
    let status = Workspace::open(path)?.status()?;
    if status.is_clean() {
        return Err(AutoCommitError::NoPendingChanges);
    }
    Ok(())
}

/// Orchestration stage, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Analyzing,
    Generating,
    AwaitingConfirmation,
    Committing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How an invocation ended.
#[derive(Debug)]
pub enum Outcome {
    Committed {
        oid: Oid,
        message: CommitMessage,
        files: Vec<String>,
    },
    /// The user declined at the confirmation prompt. Nothing was staged.
    Cancelled,
    Failed(AutoCommitError),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Committed { .. } | Outcome::Cancelled => 0,
            Outcome::Failed(_) => 1,
        }
    }
}

/// Outcome plus the line printed for it.
#[derive(Debug)]
pub struct InvocationResult {
    pub outcome: Outcome,
    pub exit_code: u8,
    pub line: String,
}

impl InvocationResult {
    pub fn new(outcome: Outcome, language: Language) -> Self {
        let line = match &outcome {
            Outcome::Committed { .. } => tr(language, Msg::CommitSucceeded).to_string(),
            Outcome::Cancelled => tr(language, Msg::CommitCancelled).to_string(),
            Outcome::Failed(err) => error_line(err, language),
        };
        Self {
            exit_code: outcome.exit_code(),
            outcome,
            line,
        }
    }

    /// Print the line: errors to stderr, everything else to stdout.
    pub fn emit(&self) {
        if matches!(self.outcome, Outcome::Failed(_)) {
            eprintln!("{}", self.line);
        } else {
            println!("{}", self.line);
        }
    }
}

/// `"Error: " + message`, with the prefix in `language`.
pub fn error_line(err: &AutoCommitError, language: Language) -> String {
    format!("{}{}", tr(language, Msg::ErrorPrefix), err.localized(language))
}

/// Runs one invocation of the commit flow.
pub struct Orchestrator<C, P> {
    workdir: PathBuf,
    invoker: CompletionInvoker<C>,
    options: CommitOptions,
    mode: ConfirmationMode,
    confirmation: P,
    stage: Stage,
}

impl<C: CompletionClient, P: Confirmation> Orchestrator<C, P> {
    pub fn new(
        workdir: impl Into<PathBuf>,
        invoker: CompletionInvoker<C>,
        options: CommitOptions,
        mode: ConfirmationMode,
        confirmation: P,
    ) -> Self {
        Self {
            workdir: workdir.into(),
            invoker,
            options,
            mode,
            confirmation,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the flow, print the outcome line, and return it.
    pub async fn run(&mut self) -> InvocationResult {
        let outcome = match self.execute().await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Invocation failed in {}: {}", self.stage, err);
                self.transition(Stage::Failed);
                Outcome::Failed(err)
            }
        };

        let result = InvocationResult::new(outcome, self.options.language);
        result.emit();
        result
    }

    async fn execute(&mut self) -> Result<Outcome, AutoCommitError> {
        let lang = self.options.language;

        // ── Analyzing ──
        self.transition(Stage::Analyzing);
        self.notice(Msg::CheckingRepository);
        let workspace = Workspace::open(&self.workdir)?;

        self.notice(Msg::FetchingStatus);
        let status = workspace.status()?;
        if status.is_clean() {
            return Err(AutoCommitError::NoPendingChanges);
        }

        self.notice(Msg::FetchingDiff);
        let diff = workspace.diff()?;
        if diff.is_truncated() {
            self.notice(Msg::DiffTruncated);
        }

        // ── Generating ──
        self.transition(Stage::Generating);
        self.notice(Msg::BuildingPrompt);
        let prompt = build_prompt(&status, &diff, lang);

        self.notice(Msg::WaitingForResponse);
        let raw = self.invoker.invoke(&prompt).await?;
        let message = CommitMessage::parse(&raw)?;
        debug!("Accepted {} message: {}", message.kind(), message.description());

        print_plan(&status, &message, lang);

        let files = status.files_to_commit();
        if files.is_empty() {
            return Err(AutoCommitError::NoFilesToCommit);
        }

        // ── AwaitingConfirmation ──
        if self.mode == ConfirmationMode::Interactive {
            self.transition(Stage::AwaitingConfirmation);
            let answer = self.confirmation.ask(tr(lang, Msg::ConfirmCommit))?;
            if is_declined(&answer) {
                self.transition(Stage::Done);
                return Ok(Outcome::Cancelled);
            }
        }

        // ── Committing ──
        self.transition(Stage::Committing);
        let oid = workspace.stage_and_commit(&files, message.as_str())?;
        debug!("Created commit {} with {} file(s)", oid, files.len());

        self.transition(Stage::Done);
        Ok(Outcome::Committed {
            oid,
            message,
            files,
        })
    }

    fn transition(&mut self, next: Stage) {
        debug!("Stage {} -> {}", self.stage, next);
        self.stage = next;
    }

    fn notice(&self, msg: Msg) {
        println!("{}", tr(self.options.language, msg));
    }
}

/// Show the files about to be committed and the generated message.
fn print_plan(status: &RepositoryStatus, message: &CommitMessage, lang: Language) {
    println!("{}", tr(lang, Msg::FilesToCommit));

    let groups = [
        (Msg::StagedFiles, &status.staged),
        (Msg::ModifiedFiles, &status.modified),
        (Msg::DeletedFiles, &status.deleted),
        (Msg::UntrackedFiles, &status.not_added),
    ];
    for (heading, files) in groups {
        if files.is_empty() {
            continue;
        }
        println!("{}", tr(lang, heading));
        for file in files {
            println!("  {}", file);
        }
    }

    println!("{}{}", tr(lang, Msg::GeneratedMessage), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Choice, CompletionResponse, RemoteFailure};
    use crate::llm::client::MockCompletionClient;
    use git2::Repository;

    struct Answer(&'static str);

    impl Confirmation for Answer {
        fn ask(&mut self, _prompt: &str) -> Result<String, AutoCommitError> {
            Ok(self.0.to_string())
        }
    }

    /// Fails the test if the flow ever asks.
    struct NeverAsked;

    impl Confirmation for NeverAsked {
        fn ask(&mut self, prompt: &str) -> Result<String, AutoCommitError> {
            panic!("confirmation should not be requested: {prompt}");
        }
    }

    fn repo_with_untracked_file() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        std::fs::write(dir.path().join("loader.rs"), "fn load() {}\n").unwrap();
        dir
    }

    fn replying(text: &'static str) -> CompletionInvoker<MockCompletionClient> {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().returning(move |_| {
            Ok(CompletionResponse {
                choices: vec![Choice {
                    text: text.to_string(),
                }],
            })
        });
        CompletionInvoker::new(mock)
    }

    fn never_called() -> CompletionInvoker<MockCompletionClient> {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().never();
        CompletionInvoker::new(mock)
    }

    fn options(language: Language) -> CommitOptions {
        CommitOptions { language }
    }

    #[test]
    fn test_read_answer_returns_line() {
        let mut input = std::io::Cursor::new("n\n");
        assert_eq!(read_answer(&mut input).unwrap(), "n\n");
    }

    #[test]
    fn test_read_answer_empty_line_is_an_answer() {
        let mut input = std::io::Cursor::new("\n");
        let answer = read_answer(&mut input).unwrap();
        assert!(!is_declined(&answer));
    }

    #[test]
    fn test_read_answer_closed_input_is_error() {
        let mut input = std::io::Cursor::new("");
        assert!(matches!(
            read_answer(&mut input),
            Err(AutoCommitError::Confirmation(_))
        ));
    }

    #[test]
    fn test_check_repository() {
        let plain = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_repository(plain.path()),
            Err(AutoCommitError::NotARepository(_))
        ));

        let clean = tempfile::tempdir().unwrap();
        Repository::init(clean.path()).unwrap();
        assert!(matches!(
            check_repository(clean.path()),
            Err(AutoCommitError::NoPendingChanges)
        ));

        let dirty = repo_with_untracked_file();
        assert!(check_repository(dirty.path()).is_ok());
    }

    #[test]
    fn test_is_declined_only_for_n() {
        assert!(is_declined("n"));
        assert!(is_declined("N"));
        assert!(is_declined(" n\n"));
        assert!(!is_declined(""));
        assert!(!is_declined("y"));
        assert!(!is_declined("no"));
        assert!(!is_declined("anything"));
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(Outcome::Cancelled.exit_code(), 0);
        assert_eq!(Outcome::Failed(AutoCommitError::NoPendingChanges).exit_code(), 1);
    }

    #[test]
    fn test_error_line_prefix_is_localized() {
        let err = AutoCommitError::NoPendingChanges;
        assert_eq!(error_line(&err, Language::En), "Error: No changes detected to commit");
        assert_eq!(error_line(&err, Language::Zh), "错误：没有检测到需要提交的变更");
    }

    #[tokio::test]
    async fn test_not_a_repository_skips_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            never_called(),
            options(Language::En),
            ConfirmationMode::AutoConfirm,
            NeverAsked,
        );

        let result = orchestrator.run().await;
        assert!(matches!(
            result.outcome,
            Outcome::Failed(AutoCommitError::NotARepository(_))
        ));
        assert_eq!(result.exit_code, 1);
        assert_eq!(orchestrator.stage(), Stage::Failed);
    }

    #[tokio::test]
    async fn test_auto_confirm_commits_without_asking() {
        let dir = repo_with_untracked_file();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            replying("feat: add config loader"),
            options(Language::En),
            ConfirmationMode::AutoConfirm,
            NeverAsked,
        );

        let result = orchestrator.run().await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.line, "Commit successful!");
        match result.outcome {
            Outcome::Committed { message, files, .. } => {
                assert_eq!(message.as_str(), "feat: add config loader");
                assert_eq!(files, vec!["loader.rs".to_string()]);
            }
            other => panic!("Expected Committed, got {:?}", other),
        }
        assert_eq!(orchestrator.stage(), Stage::Done);
    }

    #[tokio::test]
    async fn test_interactive_empty_answer_proceeds() {
        let dir = repo_with_untracked_file();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            replying("fix: 修复配置加载"),
            options(Language::Zh),
            ConfirmationMode::Interactive,
            Answer(""),
        );

        let result = orchestrator.run().await;
        assert!(matches!(result.outcome, Outcome::Committed { .. }));
        assert_eq!(result.line, "提交成功！");
    }

    #[tokio::test]
    async fn test_interactive_decline_cancels() {
        let dir = repo_with_untracked_file();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            replying("feat: add loader"),
            options(Language::En),
            ConfirmationMode::Interactive,
            Answer("N"),
        );

        let result = orchestrator.run().await;
        assert!(matches!(result.outcome, Outcome::Cancelled));
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.line, "Commit cancelled");

        let repo = Repository::open(dir.path()).unwrap();
        assert!(repo.head().is_err(), "no commit should exist");
        assert!(repo.index().unwrap().is_empty(), "nothing should be staged");
    }

    /// Confirmation backed by a reader with nothing left to read.
    struct ClosedInput;

    impl Confirmation for ClosedInput {
        fn ask(&mut self, _prompt: &str) -> Result<String, AutoCommitError> {
            read_answer(&mut std::io::Cursor::new(""))
        }
    }

    #[tokio::test]
    async fn test_closed_confirmation_input_never_commits() {
        let dir = repo_with_untracked_file();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            replying("feat: add loader"),
            options(Language::En),
            ConfirmationMode::Interactive,
            ClosedInput,
        );

        let result = orchestrator.run().await;
        assert!(matches!(
            result.outcome,
            Outcome::Failed(AutoCommitError::Confirmation(_))
        ));
        assert_eq!(result.exit_code, 1);

        let repo = Repository::open(dir.path()).unwrap();
        assert!(repo.head().is_err(), "no commit should exist");
        assert!(repo.index().unwrap().is_empty(), "nothing should be staged");
    }

    #[tokio::test]
    async fn test_invalid_completion_never_reaches_git() {
        let dir = repo_with_untracked_file();
        let mut orchestrator = Orchestrator::new(
            dir.path(),
            replying("Sure! Here is a commit message: add loader"),
            options(Language::En),
            ConfirmationMode::AutoConfirm,
            NeverAsked,
        );

        let result = orchestrator.run().await;
        assert!(matches!(
            result.outcome,
            Outcome::Failed(AutoCommitError::InvalidFormat(_))
        ));
        let repo = Repository::open(dir.path()).unwrap();
        assert!(repo.index().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported_verbatim() {
        let dir = repo_with_untracked_file();
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(RemoteFailure::http(500, "upstream exploded")));

        let mut orchestrator = Orchestrator::new(
            dir.path(),
            CompletionInvoker::new(mock),
            options(Language::En),
            ConfirmationMode::AutoConfirm,
            NeverAsked,
        );

        let result = orchestrator.run().await;
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.line, "Error: AI service error: upstream exploded");
    }
}
