// src/store/mod.rs
//! Report persistence behind the `ReportStore` trait.

pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::collect::{NewsItem, TrendData};
use crate::config::AppConfig;
use crate::synthesis::AnalysisResult;

pub use memory::MemoryReportStore;
pub use postgrest::PostgrestReportStore;

/// A stored analysis. Immutable once created; a re-analysis creates a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub keyword: String,
    pub analysis_result: AnalysisResult,
    #[serde(default)]
    pub trend_data: TrendData,
    #[serde(default)]
    pub news_data: Vec<NewsItem>,
    /// Rows written by older clients may carry no timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub keyword: String,
    pub analysis_result: AnalysisResult,
    pub trend_data: TrendData,
    pub news_data: Vec<NewsItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub keyword: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Report> for ReportSummary {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id,
            keyword: r.keyword.clone(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("report not found")]
    NotFound,
    #[error("store returned HTTP {status}")]
    Http { status: u16 },
    #[error("store transport error: {0}")]
    Transport(String),
    #[error("store payload could not be decoded: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::Http { .. } => "http",
            StoreError::Transport(_) => "transport",
            StoreError::Decode(_) => "decode",
        }
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, report: NewReport) -> Result<Report, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Report, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    /// Newest first, at most `limit` entries.
    async fn list(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError>;

    fn backend_name(&self) -> &'static str;
}

pub type DynReportStore = Arc<dyn ReportStore>;

/// Supabase when both URL and key are present, otherwise the in-process store.
pub fn build_store(cfg: &AppConfig, http: reqwest::Client) -> DynReportStore {
    match &cfg.credentials.supabase {
        Some(sb) => {
            tracing::info!(target: "store", "using Supabase report store");
            Arc::new(PostgrestReportStore::new(http, sb.url.clone(), sb.anon_key.clone()))
        }
        None => {
            tracing::warn!(target: "store", "Supabase not configured, reports are kept in memory");
            Arc::new(MemoryReportStore::new())
        }
    }
}
