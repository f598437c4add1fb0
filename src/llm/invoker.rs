//! Deadline-bound completion calls with failure classification.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::commit::prompt::Prompt;
use crate::config::DEFAULT_MODEL;
use crate::error::AutoCommitError;

use super::client::{
    CompletionClient, CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, RemoteFailure,
};

/// Default deadline for a completion (120 seconds).
pub const DEFAULT_DEADLINE_MS: u64 = 120_000;

/// Hints in a 400 response that the request was rejected for its size.
const SIZE_HINTS: &[&str] = &[
    "too large",
    "too long",
    "maximum context",
    "exceed",
    "length",
];

/// Sends prompts to a [`CompletionClient`] and returns the raw text of the
/// first choice.
pub struct CompletionInvoker<C> {
    client: C,
    model: String,
    temperature: f32,
    max_tokens: u32,
    deadline: Duration,
}

impl<C: CompletionClient> CompletionInvoker<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The deadline in whole milliseconds, saturating at `u64::MAX`.
    pub fn deadline_ms(&self) -> u64 {
        u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX)
    }

    /// Run one completion.
    ///
    /// The remote call races the deadline; when the deadline wins the call is
    /// dropped and [`AutoCommitError::Timeout`] is returned. The remote side
    /// may keep generating. No retries.
    pub async fn invoke(&self, prompt: &Prompt) -> Result<String, AutoCommitError> {
        let request = CompletionRequest {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Requesting completion: model={}, prompt={} chars, deadline={:?}",
            request.model,
            request.user.chars().count(),
            self.deadline
        );

        let response = timeout(self.deadline, self.client.complete(&request))
            .await
            .map_err(|_| AutoCommitError::Timeout(self.deadline_ms()))?
            .map_err(classify_failure)?;

        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or(AutoCommitError::EmptyCompletion)?;

        debug!("Completion returned: {:?}", first.text);
        Ok(first.text)
    }
}

/// Map a remote failure onto the error taxonomy.
///
/// 413 is always too large; a 400 counts as too large when its message
/// mentions a size or length limit.
pub fn classify_failure(failure: RemoteFailure) -> AutoCommitError {
    let too_large = match failure.status {
        Some(413) => true,
        Some(400) => {
            let lower = failure.message.to_lowercase();
            SIZE_HINTS.iter().any(|hint| lower.contains(hint))
        }
        _ => false,
    };

    if too_large {
        warn!("Completion rejected as too large: {}", failure);
        AutoCommitError::PayloadTooLarge(failure.message)
    } else {
        warn!("Completion failed: {}", failure);
        AutoCommitError::RemoteService(failure.message)
    }
}
