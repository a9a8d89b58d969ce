use crate::app_core::AttemptId;

/// A consume-once value. `peek` never clears; `consume` returns the value
/// and resets the cell so the same error is not redelivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneShot<T>(Option<T>);

impl<T> OneShot<T> {
    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn peek(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn consume(&mut self) -> Option<T> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Transient UI state owned by the coordinator. Rebuilt, not restored, on
/// recreation; `title_text` is re-derived from the durable store through
/// the title feed.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub title_text: Option<String>,
    pub is_loading: bool,
    pub pending_error: OneShot<String>,
    pub tap_count: u64,
    pub tap_label: Option<String>,

    /// Identity of the in-flight refresh attempt; terminal events from any
    /// other attempt are stale and ignored.
    pub current_attempt: Option<AttemptId>,
}
