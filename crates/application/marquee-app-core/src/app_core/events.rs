pub type AttemptId = uuid::Uuid;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Refresh lifecycle
    RefreshStarted {
        attempt: AttemptId,
    },
    RefreshSucceeded {
        attempt: AttemptId,
    },
    RefreshFailed {
        attempt: AttemptId,
        message: String,
    },
    RefreshCancelled {
        attempt: AttemptId,
    },

    // Store observation
    TitleChanged(Option<String>),

    // Tap counter
    TapRecorded,
    TapDisplayReady {
        label: String,
    },
}
