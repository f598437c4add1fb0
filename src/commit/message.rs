//! Commit message validation.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::AutoCommitError;

/// `<type>: <description>` on a single line.
static MESSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(feat|fix): (.+)$").expect("commit message pattern is valid")
});

/// The change types the generator may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// New capability or new file.
    Feat,
    /// Repair or improvement of existing behavior.
    Fix,
}

impl CommitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitKind::Feat => "feat",
            CommitKind::Fix => "fix",
        }
    }
}

impl fmt::Display for CommitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, single-line commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    kind: CommitKind,
    text: String,
}

impl CommitMessage {
    /// Validate raw completion text.
    ///
    /// The text is trimmed, then must match `^(feat|fix): .+$`. Length is not
    /// checked.
    pub fn parse(raw: &str) -> Result<Self, AutoCommitError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(AutoCommitError::InvalidFormat(raw.to_string()));
        }

        let captures = MESSAGE_PATTERN
            .captures(text)
            .ok_or_else(|| AutoCommitError::InvalidFormat(text.to_string()))?;

        let kind = match &captures[1] {
            "feat" => CommitKind::Feat,
            _ => CommitKind::Fix,
        };

        Ok(Self {
            kind,
            text: text.to_string(),
        })
    }

    pub fn kind(&self) -> CommitKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The part after `<type>: `.
    pub fn description(&self) -> &str {
        &self.text[self.kind.as_str().len() + 2..]
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
