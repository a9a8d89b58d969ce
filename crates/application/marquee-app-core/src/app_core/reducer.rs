use crate::domain::AppState;

use super::events::DomainEvent;

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::RefreshStarted { attempt } => {
            state.current_attempt = Some(attempt);
            state.is_loading = true;
        }

        DomainEvent::RefreshSucceeded { attempt } => {
            if state.current_attempt == Some(attempt) {
                state.current_attempt = None;
                state.is_loading = false;
            }
        }

        DomainEvent::RefreshFailed { attempt, message } => {
            if state.current_attempt == Some(attempt) {
                state.current_attempt = None;
                state.is_loading = false;
                state.pending_error.set(message);
            }
        }

        DomainEvent::RefreshCancelled { attempt } => {
            // Abandonment is not an error; just stop showing the spinner.
            if state.current_attempt == Some(attempt) {
                state.current_attempt = None;
                state.is_loading = false;
            }
        }

        DomainEvent::TitleChanged(text) => state.title_text = text,

        DomainEvent::TapRecorded => state.tap_count += 1,

        DomainEvent::TapDisplayReady { label } => state.tap_label = Some(label),
    }
    state
}
