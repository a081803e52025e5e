//! Storyteller Engine - renders a vault snapshot to timeline JSON.
//!
//! Reads the snapshot named by `STORYTELLER_VAULT`, runs conflict detection
//! and the timeline builder, and prints `{ conflicts, summary, timeline }` to
//! stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyteller_engine::app::{App, Repositories};
use storyteller_engine::infrastructure::{
    clock::SystemClock, config::EngineConfig, nominatim::NominatimClient,
    snapshot::VaultSnapshot,
};
use storyteller_engine::use_cases::TimelineRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyteller_engine=info,storyteller_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(vault = %config.vault_path.display(), "Starting Storyteller Engine");

    let snapshot = VaultSnapshot::load(&config.vault_path)
        .await
        .with_context(|| format!("loading vault {}", config.vault_path.display()))?;
    let store = Arc::new(snapshot.into_store().await);

    let geocoder = Arc::new(NominatimClient::new(
        &config.geocoder_url,
        &config.user_agent,
        config.geocoder_timeout_secs,
    ));
    let app = App::new(
        Repositories::in_memory(store),
        geocoder,
        Arc::new(SystemClock::new()),
    );

    let report = app.use_cases.location_hierarchy.validate_hierarchy().await?;
    for issue in &report.errors {
        tracing::warn!(%issue, "Location hierarchy issue");
    }

    let view = app
        .use_cases
        .timeline
        .refresh
        .execute(TimelineRequest {
            reference_date: config.reference_date,
            ..TimelineRequest::default()
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
