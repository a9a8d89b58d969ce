/// Commands the UI boundary can issue.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// The user tapped: bumps the tap counter and starts a refresh.
    UserAction,
    /// The UI displayed the pending error and is done with it.
    AcknowledgeError,
}
