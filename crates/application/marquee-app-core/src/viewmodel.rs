use crate::domain::AppState;

/// Display-ready projection of the four UI observables.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleScreenVm {
    pub title_text: String,
    pub show_loading: bool,
    pub tap_label: String,
    /// Peeked, not consumed: the UI acknowledges through the coordinator
    /// once it has shown the notice.
    pub error_banner: Option<String>,
}

pub fn title_screen_vm(state: &AppState) -> TitleScreenVm {
    TitleScreenVm {
        title_text: state
            .title_text
            .clone()
            .unwrap_or_else(|| "No title yet".into()),
        show_loading: state.is_loading,
        tap_label: state
            .tap_label
            .clone()
            .unwrap_or_else(|| "0 taps".into()),
        error_banner: state.pending_error.peek().cloned(),
    }
}
