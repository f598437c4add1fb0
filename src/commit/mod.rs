//! AI-generated commit messages: prompt, validation, and the commit flow.

pub mod message;
pub mod orchestrator;
pub mod prompt;

pub use message::{CommitKind, CommitMessage};
pub use orchestrator::{
    CommitOptions, Confirmation, ConfirmationMode, InvocationResult, Orchestrator, Outcome, Stage,
    TerminalConfirmation, check_repository, error_line, is_declined, read_answer,
};
pub use prompt::{Prompt, build_prompt};
