// src/collect/types.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keyword::Keyword;

/// Why a single source contributed nothing to a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceFailure {
    #[error("timed out after {}ms", .budget.as_millis())]
    Timeout { budget: Duration },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {status}")]
    Http { status: u16, body: String },
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
    #[error("payload did not match schema: {0}")]
    Decode(String),
    #[error("adapter task aborted: {0}")]
    Aborted(String),
}

impl SourceFailure {
    /// Stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceFailure::Timeout { .. } => "timeout",
            SourceFailure::Transport(_) => "transport",
            SourceFailure::Http { .. } => "http",
            SourceFailure::UnexpectedFormat(_) => "unexpected_format",
            SourceFailure::Decode(_) => "decode",
            SourceFailure::Aborted(_) => "aborted",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceFailure::Timeout { .. })
    }
}

/// Tagged outcome of one adapter call. Adapters never return anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    Success(T),
    Failure(SourceFailure),
}

impl<T> SourceResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success(_))
    }

    pub fn failure(&self) -> Option<&SourceFailure> {
        match self {
            SourceResult::Failure(f) => Some(f),
            SourceResult::Success(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SourceResult<U> {
        match self {
            SourceResult::Success(v) => SourceResult::Success(f(v)),
            SourceResult::Failure(e) => SourceResult::Failure(e),
        }
    }

    /// Collapse to the value, or the given empty default on failure.
    pub fn unwrap_or(self, empty: T) -> T {
        match self {
            SourceResult::Success(v) => v,
            SourceResult::Failure(_) => empty,
        }
    }
}

impl<T> From<Result<T, SourceFailure>> for SourceResult<T> {
    fn from(r: Result<T, SourceFailure>) -> Self {
        match r {
            Ok(v) => SourceResult::Success(v),
            Err(e) => SourceResult::Failure(e),
        }
    }
}

/// One point of a relative-interest series (0..=100 on both providers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub at: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBundle {
    pub provider: String,
    pub time_unit: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// `None` when the provider's date could not be parsed; such items sort last.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// One external data provider behind a normalized, non-throwing interface.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn fetch(&self, keyword: &Keyword) -> SourceResult<Self::Output>;
    fn name(&self) -> &'static str;
}
