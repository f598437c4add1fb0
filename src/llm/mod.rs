//! Remote completion service access.

pub mod client;
pub mod invoker;

pub use client::{
    ChatCompletionsClient, Choice, CompletionClient, CompletionRequest, CompletionResponse,
    RemoteFailure,
};
pub use invoker::{CompletionInvoker, DEFAULT_DEADLINE_MS, classify_failure};
