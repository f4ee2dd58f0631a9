// tests/common/mod.rs
//
// Stub adapters, synthesizers and stores shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use bizspark::collect::{
    Aggregator, CollectedData, NewsAdapter, NewsItem, SourceAdapter, SourceBudgets, SourceFailure,
    SourceResult, TrendAdapter, TrendBundle, TrendPoint,
};
use bizspark::keyword::Keyword;
use bizspark::store::{
    MemoryReportStore, NewReport, Report, ReportStore, ReportSummary, StoreError,
};
use bizspark::synthesis::{AnalysisResult, MockSynthesizer, SynthesisError, Synthesizer};

/// Adapter returning a canned result after an optional (tokio) sleep, counting calls.
pub struct Stub<T> {
    pub name: &'static str,
    pub result: SourceResult<T>,
    pub delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl<T> Stub<T> {
    pub fn new(name: &'static str, result: SourceResult<T>) -> Self {
        Self {
            name,
            result,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn counting(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }
}

#[async_trait]
impl<T> SourceAdapter for Stub<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    async fn fetch(&self, _keyword: &Keyword) -> SourceResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub fn bundle(provider: &str, n: usize) -> TrendBundle {
    let base = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();
    TrendBundle {
        provider: provider.to_string(),
        time_unit: "month".to_string(),
        points: (0..n)
            .map(|i| TrendPoint {
                at: base + chrono::Duration::days(30 * i as i64),
                value: (i * 10) as f64,
            })
            .collect(),
    }
}

pub fn news(title: &str, hours_ago: Option<i64>) -> NewsItem {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    NewsItem {
        title: title.to_string(),
        description: format!("{title} summary"),
        url: format!("https://news.example/{}", title.replace(' ', "-")),
        published_at: hours_ago.map(|h| base - chrono::Duration::hours(h)),
    }
}

pub fn transport_failure<T>() -> SourceResult<T> {
    SourceResult::Failure(SourceFailure::Transport("connection reset".into()))
}

pub struct Sources {
    pub naver: TrendAdapter,
    pub google: TrendAdapter,
    pub news: Vec<NewsAdapter>,
}

impl Sources {
    pub fn aggregator(self, budgets: SourceBudgets) -> Aggregator {
        Aggregator::new(self.naver, self.google, self.news, budgets)
    }
}

/// Four healthy sources, all counting into `calls`.
pub fn healthy_sources(calls: &Arc<AtomicUsize>) -> Sources {
    Sources {
        naver: Arc::new(Stub::new("naver", SourceResult::Success(Some(bundle("naver", 12)))).counting(calls.clone())),
        google: Arc::new(Stub::new("google", SourceResult::Success(Some(bundle("google", 52)))).counting(calls.clone())),
        news: vec![
            Arc::new(
                Stub::new(
                    "newsapi",
                    SourceResult::Success(vec![news("pet health boom", Some(1)), news("vet tech", Some(5))]),
                )
                .counting(calls.clone()),
            ),
            Arc::new(
                Stub::new(
                    "naver_news",
                    SourceResult::Success(vec![news("pet health boom", Some(2)), news("반려동물 보험", Some(3))]),
                )
                .counting(calls.clone()),
            ),
        ],
    }
}

/// Four sources that all fail in different ways.
pub fn failing_sources(calls: &Arc<AtomicUsize>) -> Sources {
    Sources {
        naver: Arc::new(
            Stub::new(
                "naver",
                SourceResult::Failure(SourceFailure::Http { status: 401, body: "unauthorized".into() }),
            )
            .counting(calls.clone()),
        ),
        google: Arc::new(
            Stub::new(
                "google",
                SourceResult::Failure(SourceFailure::UnexpectedFormat("html".into())),
            )
            .counting(calls.clone()),
        ),
        news: vec![
            Arc::new(Stub::<Vec<NewsItem>>::new("newsapi", transport_failure()).counting(calls.clone())),
            Arc::new(
                Stub::<Vec<NewsItem>>::new("naver_news", SourceResult::Success(vec![]))
                    .delayed(Duration::from_secs(30))
                    .counting(calls.clone()),
            ),
        ],
    }
}

/// Synthesizer that always fails with the given error, counting calls.
pub struct FailingSynth {
    pub error: SynthesisError,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Synthesizer for FailingSynth {
    async fn synthesize(
        &self,
        _keyword: &Keyword,
        _data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Mock synthesizer that also records what it was handed.
#[derive(Default)]
pub struct RecordingSynth {
    pub seen: std::sync::Mutex<Vec<CollectedData>>,
}

#[async_trait]
impl Synthesizer for RecordingSynth {
    async fn synthesize(
        &self,
        keyword: &Keyword,
        data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        self.seen.lock().unwrap().push(data.clone());
        Ok(MockSynthesizer::analysis_for(keyword, data))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Store whose writes always fail; reads delegate to an empty memory store.
#[derive(Default)]
pub struct FailingStore {
    pub creates: AtomicUsize,
    inner: MemoryReportStore,
}

#[async_trait]
impl ReportStore for FailingStore {
    async fn create(&self, _report: NewReport) -> Result<Report, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Http { status: 503 })
    }

    async fn get(&self, id: Uuid) -> Result<Report, StoreError> {
        self.inner.get(id).await
    }

    async fn delete(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Transport("connection refused".into()))
    }

    async fn list(&self, _limit: usize) -> Result<Vec<ReportSummary>, StoreError> {
        Err(StoreError::Transport("connection refused".into()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
