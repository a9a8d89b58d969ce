/// Broad classification of a refresh failure. Callers that need to react
/// differently to abandonment (cancellation, deadline) than to genuine
/// remote/storage failures branch on this instead of widening the outcome
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshErrorKind {
    Remote,
    Storage,
    Invalid,
    Cancelled,
    Timeout,
}

/// Single failure type produced at the orchestrator boundary. Transport
/// and persistence causes both collapse into this; the underlying error is
/// kept as `source` for logging.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RefreshError {
    message: String,
    kind: RefreshErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RefreshError {
    pub fn remote(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            message: "unable to refresh title".into(),
            kind: RefreshErrorKind::Remote,
            source: Some(cause.into()),
        }
    }

    pub fn storage(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            message: "unable to refresh title".into(),
            kind: RefreshErrorKind::Storage,
            source: Some(cause.into()),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: RefreshErrorKind::Invalid,
            source: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            message: "refresh cancelled".into(),
            kind: RefreshErrorKind::Cancelled,
            source: None,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            message: "unable to refresh title".into(),
            kind: RefreshErrorKind::Timeout,
            source: None,
        }
    }

    pub fn kind(&self) -> RefreshErrorKind {
        self.kind
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == RefreshErrorKind::Cancelled
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_share_the_user_facing_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = RefreshError::remote(io);
        assert_eq!(err.message(), "unable to refresh title");
        assert_eq!(err.kind(), RefreshErrorKind::Remote);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cancelled_is_distinguishable() {
        assert!(RefreshError::cancelled().is_cancelled());
        assert!(!RefreshError::timed_out().is_cancelled());
    }
}
