pub mod adapters;
pub mod app_core;
pub mod async_runtime;
pub mod coordinator;
pub mod domain;
pub mod feed;
pub mod job;
pub mod orchestrator;
pub mod ports;
pub mod viewmodel;

pub use app_core::*;
pub use coordinator::Coordinator;
pub use domain::{AppState, OneShot};
pub use feed::{SubscriptionId, TitleFeed, TitleSubscription, WatchedTitleStore};
pub use job::{JobResult, RefreshJob};
pub use orchestrator::RefreshOrchestrator;
pub use ports::{RemoteTitlePort, TitleStorePort};
pub use viewmodel::{title_screen_vm, TitleScreenVm};
