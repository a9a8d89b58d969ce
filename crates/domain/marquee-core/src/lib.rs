use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod error;

pub use error::{RefreshError, RefreshErrorKind};

/// Fixed identity of the single logical "current title" record.
pub const CURRENT_TITLE_KEY: &str = "current";

/// A validated title value. Construction rejects empty and
/// whitespace-only input so downstream layers never persist a blank
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, RefreshError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RefreshError::invalid("fetched title is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted form of the current title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleRecord {
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

impl TitleRecord {
    pub fn new(title: Title) -> Self {
        Self {
            text: title.into_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Result of one orchestration attempt. Either the store was updated
/// (`Success`) or it was left untouched (`Failure`) - never partially
/// applied.
#[derive(Debug)]
pub enum RefreshOutcome {
    Success,
    Failure(RefreshError),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Success)
    }
}
