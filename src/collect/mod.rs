// src/collect/mod.rs
//! Multi-source collection: concurrent fan-out to every source adapter, each under
//! its own timeout, settled independently into one `CollectedData`.

pub mod guard;
pub mod merge;
pub mod normalize;
pub mod providers;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::collect::guard::{guard_adapter, DEFAULT_SOURCE_BUDGET};
use crate::collect::merge::{merge_news, DEFAULT_NEWS_CAP};
use crate::collect::providers::{
    GoogleTrendsAdapter, NaverDataLabAdapter, NaverNewsAdapter, NewsApiAdapter,
};
use crate::config::AppConfig;
use crate::keyword::Keyword;

pub use crate::collect::types::{
    NewsItem, SourceAdapter, SourceFailure, SourceResult, TrendBundle, TrendPoint,
};

pub type TrendAdapter = Arc<dyn SourceAdapter<Output = Option<TrendBundle>>>;
pub type NewsAdapter = Arc<dyn SourceAdapter<Output = Vec<NewsItem>>>;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collect_source_failures_total",
            "Source calls that contributed an empty default, by source and reason."
        );
        describe_histogram!("collect_duration_ms", "Wall-clock time of one collection run.");
        describe_histogram!("collect_news_items", "News items left after merge.");
    });
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    #[serde(default)]
    pub naver: Option<TrendBundle>,
    #[serde(default)]
    pub google: Option<TrendBundle>,
}

/// Everything collected for one keyword. `news` is deduplicated, newest first, capped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedData {
    pub trends: TrendData,
    pub news: Vec<NewsItem>,
}

/// Wait budget per source class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBudgets {
    pub trend: Duration,
    pub news: Duration,
}

impl SourceBudgets {
    pub fn uniform(budget: Duration) -> Self {
        Self {
            trend: budget,
            news: budget,
        }
    }

    pub fn max(&self) -> Duration {
        self.trend.max(self.news)
    }
}

impl Default for SourceBudgets {
    fn default() -> Self {
        Self::uniform(DEFAULT_SOURCE_BUDGET)
    }
}

pub struct Aggregator {
    naver: TrendAdapter,
    google: TrendAdapter,
    /// Source-priority order for the merge: earlier lists win title ties.
    news: Vec<NewsAdapter>,
    budgets: SourceBudgets,
    news_cap: usize,
}

impl Aggregator {
    pub fn new(
        naver: TrendAdapter,
        google: TrendAdapter,
        news: Vec<NewsAdapter>,
        budgets: SourceBudgets,
    ) -> Self {
        Self {
            naver,
            google,
            news,
            budgets,
            news_cap: DEFAULT_NEWS_CAP,
        }
    }

    pub fn with_news_cap(mut self, cap: usize) -> Self {
        self.news_cap = cap;
        self
    }

    /// Production wiring: the four HTTP adapters sharing one client.
    pub fn from_config(cfg: &AppConfig, http: reqwest::Client) -> Self {
        let creds = &cfg.credentials;
        let naver: TrendAdapter = Arc::new(NaverDataLabAdapter::new(http.clone(), creds.naver.clone()));
        let google: TrendAdapter = Arc::new(GoogleTrendsAdapter::new(http.clone(), &cfg.sources));
        let news: Vec<NewsAdapter> = vec![
            Arc::new(NewsApiAdapter::new(
                http.clone(),
                creds.news_api_key.clone(),
                cfg.sources.language.clone(),
                cfg.sources.newsapi_page_size,
            )),
            Arc::new(NaverNewsAdapter::new(
                http,
                creds.naver.clone(),
                cfg.sources.naver_news_display,
            )),
        ];
        Self::new(naver, google, news, SourceBudgets::uniform(cfg.source_budget()))
            .with_news_cap(cfg.news.cap)
    }

    pub fn budgets(&self) -> SourceBudgets {
        self.budgets
    }

    /// Fan out to every source and wait for all of them to settle. Never fails:
    /// a failed source contributes its empty default.
    pub async fn collect(&self, keyword: &Keyword) -> CollectedData {
        ensure_metrics_described();
        let t0 = Instant::now();

        let naver = guard_adapter(self.naver.clone(), keyword.clone(), self.budgets.trend);
        let google = guard_adapter(self.google.clone(), keyword.clone(), self.budgets.trend);
        let news = futures::future::join_all(self.news.iter().map(|adapter| {
            let name = adapter.name();
            let fut = guard_adapter(adapter.clone(), keyword.clone(), self.budgets.news);
            async move { (name, fut.await) }
        }));

        let (naver, google, news) = tokio::join!(naver, google, news);

        let trends = TrendData {
            naver: settle(self.naver.name(), naver, None),
            google: settle(self.google.name(), google, None),
        };
        let lists: Vec<Vec<NewsItem>> = news
            .into_iter()
            .map(|(name, result)| settle(name, result, Vec::new()))
            .collect();
        let news = merge_news(lists, self.news_cap);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("collect_duration_ms").record(ms);
        histogram!("collect_news_items").record(news.len() as f64);
        tracing::info!(
            target: "collect",
            keyword_id = %keyword.anon_id(),
            has_naver = trends.naver.is_some(),
            has_google = trends.google.is_some(),
            news = news.len(),
            elapsed_ms = ms as u64,
            "data collection completed"
        );

        CollectedData { trends, news }
    }
}

/// Keep a success, or log the failure and fall back to the source's empty value.
fn settle<T>(source: &'static str, result: SourceResult<T>, empty: T) -> T {
    match result {
        SourceResult::Success(v) => v,
        SourceResult::Failure(failure) => {
            if failure.is_timeout() {
                tracing::warn!(target: "collect", source, reason = %failure, "source timed out");
            } else {
                tracing::warn!(target: "collect", source, reason = %failure, "source failed");
            }
            counter!(
                "collect_source_failures_total",
                "source" => source,
                "reason" => failure.kind()
            )
            .increment(1);
            empty
        }
    }
}
