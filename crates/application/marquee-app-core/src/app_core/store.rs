use std::sync::{Arc, Mutex};

use crate::domain::AppState;

use super::{events::DomainEvent, reducer::reduce};

#[derive(Clone, Default)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> AppState {
        self.inner.lock().unwrap().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.inner.lock().unwrap();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    /// Non-destructive look at the pending one-shot error.
    pub fn peek_error(&self) -> Option<String> {
        self.inner.lock().unwrap().pending_error.peek().cloned()
    }

    /// Takes the pending error, clearing it. Idempotent: a second call
    /// returns `None`.
    pub fn consume_error(&self) -> Option<String> {
        self.inner.lock().unwrap().pending_error.consume()
    }
}
