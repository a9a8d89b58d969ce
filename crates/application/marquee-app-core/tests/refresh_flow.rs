use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use marquee_app_core::{
    Coordinator, RefreshOrchestrator, RemoteTitlePort, TitleStorePort, WatchedTitleStore,
};
use marquee_core::{RefreshErrorKind, RefreshOutcome, Title};

/// Remote fake returning scripted responses in order.
struct ScriptedRemote {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedRemote {
    fn ok(value: &str) -> Self {
        Self::script(vec![Ok(value.to_string())])
    }

    fn failing(message: &str) -> Self {
        Self::script(vec![Err(message.to_string())])
    }

    fn script(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl RemoteTitlePort for ScriptedRemote {
    async fn fetch_next_title(&self) -> anyhow::Result<String> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }
}

/// Remote fake that only resumes the caller after an explicit trigger.
struct GatedRemote {
    release: Notify,
    value: String,
}

impl GatedRemote {
    fn new(value: &str) -> Self {
        Self {
            release: Notify::new(),
            value: value.to_string(),
        }
    }
}

#[async_trait]
impl RemoteTitlePort for GatedRemote {
    async fn fetch_next_title(&self) -> anyhow::Result<String> {
        self.release.notified().await;
        Ok(self.value.clone())
    }
}

/// In-memory store recording every insert, for `nextInsertedOrNull`-style
/// probes.
#[derive(Default)]
struct RecordingStore {
    rows: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn last_inserted(&self) -> Option<String> {
        self.rows.lock().unwrap().last().cloned()
    }

    fn insert_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl TitleStorePort for RecordingStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.last_inserted())
    }

    fn upsert(&self, title: &Title) -> anyhow::Result<()> {
        self.rows.lock().unwrap().push(title.as_str().to_string());
        Ok(())
    }
}

type TestCoordinator<R> = Coordinator<R, WatchedTitleStore<RecordingStore>>;

fn build_coordinator<R: RemoteTitlePort>(
    remote: R,
) -> (TestCoordinator<R>, Arc<RecordingStore>) {
    let raw = Arc::new(RecordingStore::default());
    let watched = Arc::new(WatchedTitleStore::new(raw.clone()).unwrap());
    let feed = watched.feed();
    let orchestrator = RefreshOrchestrator::new(Arc::new(remote), watched);
    let coordinator = Coordinator::new(orchestrator, feed, tokio::runtime::Handle::current());
    (coordinator, raw)
}

/// Drives the coordinator until `done` holds or a real-time budget runs
/// out. Only used in tests running on the real clock.
async fn settle_until<R: RemoteTitlePort>(
    coordinator: &mut TestCoordinator<R>,
    done: impl Fn(&marquee_app_core::AppState) -> bool,
) {
    for _ in 0..400 {
        coordinator.tick();
        if done(&coordinator.store.state()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("coordinator did not reach expected state in time");
}

/// Yield-only settling for paused-clock tests, so virtual time never
/// moves underneath the assertions.
async fn settle_yields<R: RemoteTitlePort>(coordinator: &mut TestCoordinator<R>) {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
    coordinator.tick();
}

// --- Orchestrator contract ---

#[tokio::test]
async fn successful_refresh_persists_the_fetched_title() {
    let raw = Arc::new(RecordingStore::default());
    let orchestrator = RefreshOrchestrator::new(Arc::new(ScriptedRemote::ok("OK")), raw.clone());

    let outcome = orchestrator.refresh(&CancellationToken::new()).await;
    assert!(outcome.is_success());
    assert_eq!(raw.last_inserted().as_deref(), Some("OK"));
    assert_eq!(raw.insert_count(), 1, "exactly one write per refresh");
}

#[tokio::test]
async fn failed_fetch_leaves_the_store_untouched() {
    let raw = Arc::new(RecordingStore::default());
    let orchestrator =
        RefreshOrchestrator::new(Arc::new(ScriptedRemote::failing("connection reset")), raw.clone());

    match orchestrator.refresh(&CancellationToken::new()).await {
        RefreshOutcome::Failure(err) => {
            assert_eq!(err.message(), "unable to refresh title");
            assert_eq!(err.kind(), RefreshErrorKind::Remote);
        }
        RefreshOutcome::Success => panic!("expected failure"),
    }
    assert_eq!(raw.insert_count(), 0, "no partial write on failure");
}

#[tokio::test]
async fn blank_fetched_title_is_rejected_without_a_write() {
    let raw = Arc::new(RecordingStore::default());
    let orchestrator = RefreshOrchestrator::new(Arc::new(ScriptedRemote::ok("   ")), raw.clone());

    match orchestrator.refresh(&CancellationToken::new()).await {
        RefreshOutcome::Failure(err) => assert_eq!(err.kind(), RefreshErrorKind::Invalid),
        RefreshOutcome::Success => panic!("expected failure"),
    }
    assert_eq!(raw.insert_count(), 0);
}

#[tokio::test]
async fn cancelling_mid_fetch_prevents_the_persist() {
    let remote = Arc::new(GatedRemote::new("OK"));
    let raw = Arc::new(RecordingStore::default());
    let orchestrator = Arc::new(RefreshOrchestrator::new(remote.clone(), raw.clone()));

    let token = CancellationToken::new();
    let worker = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let token = token.clone();
        async move { orchestrator.refresh(&token).await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    let outcome = worker.await.unwrap();
    match outcome {
        RefreshOutcome::Failure(err) => assert!(err.is_cancelled()),
        RefreshOutcome::Success => panic!("expected cancellation"),
    }

    // Even if the remote resolves afterwards, nothing may be written.
    remote.release.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(raw.insert_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn elapsed_time_budget_resolves_to_failure() {
    let raw = Arc::new(RecordingStore::default());
    let orchestrator =
        RefreshOrchestrator::new(Arc::new(GatedRemote::new("never delivered")), raw.clone());

    // Paused clock: the runtime advances straight to the deadline once
    // everything is blocked on time.
    let outcome = orchestrator
        .refresh_with_deadline(&CancellationToken::new(), Duration::from_secs(5))
        .await;

    match outcome {
        RefreshOutcome::Failure(err) => assert_eq!(err.kind(), RefreshErrorKind::Timeout),
        RefreshOutcome::Success => panic!("expected timeout"),
    }
    assert_eq!(raw.insert_count(), 0);
}

// --- Coordinator contract ---

#[tokio::test]
async fn loading_flag_spans_the_whole_refresh() {
    let remote = Arc::new(GatedRemote::new("OK"));
    let (mut coordinator, raw) = {
        let raw = Arc::new(RecordingStore::default());
        let watched = Arc::new(WatchedTitleStore::new(raw.clone()).unwrap());
        let feed = watched.feed();
        let orchestrator = RefreshOrchestrator::new(remote.clone(), watched);
        (
            Coordinator::new(orchestrator, feed, tokio::runtime::Handle::current()),
            raw,
        )
    };

    assert!(!coordinator.store.state().is_loading);

    coordinator.on_user_action();
    settle_until(&mut coordinator, |s| s.is_loading).await;
    assert!(coordinator.store.state().is_loading);

    remote.release.notify_one();
    // The title emission rides the feed pump, so wait for both the flag
    // and the re-derived text.
    settle_until(&mut coordinator, |s| {
        !s.is_loading && s.title_text.is_some()
    })
    .await;

    let state = coordinator.store.state();
    assert_eq!(state.title_text.as_deref(), Some("OK"));
    assert!(state.pending_error.is_empty());
    assert_eq!(raw.last_inserted().as_deref(), Some("OK"));
}

#[tokio::test]
async fn failed_refresh_surfaces_a_one_shot_error() {
    let (mut coordinator, raw) = build_coordinator(ScriptedRemote::failing("boom"));

    coordinator.on_user_action();
    settle_until(&mut coordinator, |s| !s.pending_error.is_empty()).await;

    let state = coordinator.store.state();
    assert!(!state.is_loading, "loading cleared on the failure path");
    assert_eq!(raw.insert_count(), 0);

    // peek (viewmodel) does not consume
    assert_eq!(
        coordinator.store.peek_error().as_deref(),
        Some("unable to refresh title")
    );
    assert_eq!(
        coordinator.store.consume_error().as_deref(),
        Some("unable to refresh title")
    );

    // acknowledge is idempotent
    coordinator.acknowledge_error();
    coordinator.acknowledge_error();
    assert_eq!(coordinator.store.peek_error(), None);
}

#[tokio::test]
async fn shutdown_mid_refresh_stops_all_work_and_writes() {
    let remote = Arc::new(GatedRemote::new("too late"));
    let raw = Arc::new(RecordingStore::default());
    let watched = Arc::new(WatchedTitleStore::new(raw.clone()).unwrap());
    let feed = watched.feed();
    let orchestrator = RefreshOrchestrator::new(remote.clone(), watched);
    let mut coordinator =
        Coordinator::new(orchestrator, feed, tokio::runtime::Handle::current());

    coordinator.on_user_action();
    settle_until(&mut coordinator, |s| s.is_loading).await;

    coordinator.shutdown();
    assert!(coordinator.is_shut_down());

    remote.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    coordinator.tick();

    assert_eq!(raw.insert_count(), 0, "no store mutation after cancellation");
    let state = coordinator.store.state();
    assert_eq!(state.tap_label, None, "no state change published after shutdown");
    assert_eq!(state.title_text, None);
}

#[tokio::test(start_paused = true)]
async fn rapid_taps_queue_independent_delayed_updates() {
    // Fail the refreshes instantly so only tap timers occupy the clock.
    let (mut coordinator, _raw) = build_coordinator(ScriptedRemote::script(vec![
        Err("offline".into()),
        Err("offline".into()),
    ]));

    coordinator.on_user_action();
    settle_yields(&mut coordinator).await;
    assert_eq!(coordinator.store.state().tap_count, 1);
    assert_eq!(coordinator.store.state().tap_label, None);

    tokio::time::advance(Duration::from_millis(500)).await;
    settle_yields(&mut coordinator).await;

    coordinator.on_user_action();
    settle_yields(&mut coordinator).await;
    assert_eq!(coordinator.store.state().tap_count, 2);

    // First tap's delay elapses; its label shows the count captured at
    // its own trigger time, not the current count.
    tokio::time::advance(Duration::from_millis(500)).await;
    settle_yields(&mut coordinator).await;
    assert_eq!(coordinator.store.state().tap_label.as_deref(), Some("1 taps"));

    tokio::time::advance(Duration::from_millis(500)).await;
    settle_yields(&mut coordinator).await;
    assert_eq!(coordinator.store.state().tap_label.as_deref(), Some("2 taps"));
}

#[test]
fn coordinator_runs_on_the_shared_background_runtime() {
    let raw = Arc::new(RecordingStore::default());
    let watched = Arc::new(WatchedTitleStore::new(raw.clone()).unwrap());
    let feed = watched.feed();
    let orchestrator = RefreshOrchestrator::new(Arc::new(ScriptedRemote::ok("OK")), watched);

    let mut coordinator =
        Coordinator::with_background_runtime(orchestrator, feed).expect("background runtime");
    coordinator.on_user_action();

    for _ in 0..400 {
        coordinator.tick();
        let state = coordinator.store.state();
        if state.title_text.as_deref() == Some("OK") && !state.is_loading {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("background refresh did not complete");
}
