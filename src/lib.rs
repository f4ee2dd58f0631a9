// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod collect;
pub mod config;
pub mod keyword;
pub mod metrics;
pub mod orchestrator;
pub mod store;
pub mod synthesis;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use crate::api::{router, AppState};
pub use crate::collect::{Aggregator, CollectedData};
pub use crate::config::AppConfig;
pub use crate::keyword::{Keyword, KeywordError};
pub use crate::orchestrator::{AnalyzeError, AnalyzeOutcome, Orchestrator};

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines;
/// `RUST_LOG` overrides the default filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,collect=info,analyze=info,synthesis=info,store=info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Build the full application from `AppConfig::load()`.
pub async fn app() -> Result<Router> {
    let cfg = AppConfig::load().context("loading configuration")?;
    app_with_config(cfg).await
}

/// Wire clients, pipeline and routes from an explicit configuration.
pub async fn app_with_config(cfg: AppConfig) -> Result<Router> {
    tracing::info!(credentials = ?cfg.credentials, "building application");

    let http = collect::providers::build_http_client(cfg.request_timeout())
        .context("building HTTP client")?;

    let aggregator = Arc::new(Aggregator::from_config(&cfg, http.clone()));
    let synthesizer = synthesis::build_synthesizer(&cfg, http.clone());
    let store = store::build_store(&cfg, http);

    let orchestrator = Arc::new(
        Orchestrator::new(aggregator, synthesizer, store).with_synthesis_budget(cfg.synthesis_budget()),
    );
    let state = AppState::new(orchestrator).with_list_limit(cfg.reports.list_limit);

    let metrics = crate::metrics::Metrics::init(&cfg)?;
    Ok(router(state).merge(metrics.router()))
}
