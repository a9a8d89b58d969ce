use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use tokio_util::sync::CancellationToken;

use marquee_app_core::adapters::RedbStoreAdapter;
use marquee_app_core::{JobResult, RefreshJob, RefreshOrchestrator};
use marquee_core::RefreshOutcome;
use marquee_infra::TitleEndpoint;
use marquee_persistence::{RedbTitleStore, TitleStore};

type CliOrchestrator = RefreshOrchestrator<TitleEndpoint, RedbStoreAdapter>;

fn build_orchestrator(endpoint_url: String, data_dir: Utf8PathBuf) -> anyhow::Result<CliOrchestrator> {
    let client = marquee_infra::default_http_client().context("Failed to build HTTP client")?;
    let endpoint = TitleEndpoint::new(client, endpoint_url);
    let store = RedbStoreAdapter::new(data_dir);
    Ok(RefreshOrchestrator::new(Arc::new(endpoint), Arc::new(store)))
}

pub async fn cmd_show(data_dir: Utf8PathBuf) -> anyhow::Result<()> {
    match RedbTitleStore::new().load_title(&data_dir)? {
        Some(rec) => println!("{}  (updated {})", rec.text, rec.updated_at.to_rfc3339()),
        None => println!("No title stored yet."),
    }
    Ok(())
}

/// One interactive refresh; Ctrl-C cancels it cooperatively.
pub async fn cmd_refresh(
    endpoint_url: String,
    data_dir: Utf8PathBuf,
    timeout_secs: u64,
) -> anyhow::Result<RefreshOutcome> {
    println!(":: Refreshing title...");
    println!("   Endpoint: {}", endpoint_url);
    println!("   Data dir: {}", data_dir);

    let orchestrator = build_orchestrator(endpoint_url, data_dir.clone())?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        }
    });

    let outcome = orchestrator
        .refresh_with_deadline(&cancel, Duration::from_secs(timeout_secs))
        .await;

    match &outcome {
        RefreshOutcome::Success => {
            if let Some(rec) = RedbTitleStore::new().load_title(&data_dir)? {
                println!(":: Title is now: {}", rec.text);
            }
        }
        RefreshOutcome::Failure(err) => {
            println!(":: Refresh failed: {err}");
        }
    }
    Ok(outcome)
}

/// Job-manager entry point: never errors, encodes the result in the
/// returned `JobResult`.
pub async fn cmd_job(endpoint_url: String, data_dir: Utf8PathBuf) -> JobResult {
    let orchestrator = match build_orchestrator(endpoint_url, data_dir) {
        Ok(o) => Arc::new(o),
        Err(err) => {
            tracing::error!(error = %err, "job setup failed");
            return JobResult::Failure;
        }
    };

    RefreshJob::new(orchestrator).execute().await
}
