// src/orchestrator.rs
//! One analysis request end to end:
//! Validating -> Collecting -> Synthesizing -> Persisting -> Done,
//! with FailedSynthesis and DegradedPersist as the other terminal states.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::collect::{Aggregator, CollectedData};
use crate::keyword::{Keyword, KeywordError};
use crate::store::{DynReportStore, NewReport};
use crate::synthesis::{AnalysisResult, DynSynthesizer, SynthesisError};

pub const DEFAULT_SYNTHESIS_BUDGET: Duration = Duration::from_secs(60);

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "analyze_requests_total",
            "Analysis requests by terminal state (done, degraded_persist, failed_synthesis, invalid)."
        );
        describe_histogram!("synthesis_duration_ms", "Time spent in the synthesis step.");
        describe_counter!(
            "synthesis_model_fallbacks_total",
            "Times a missing model made synthesis move to the next one."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Collecting,
    Synthesizing,
    Persisting,
    Done,
    FailedSynthesis,
    DegradedPersist,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Collecting => "collecting",
            Stage::Synthesizing => "synthesizing",
            Stage::Persisting => "persisting",
            Stage::Done => "done",
            Stage::FailedSynthesis => "failed_synthesis",
            Stage::DegradedPersist => "degraded_persist",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error(transparent)]
    Validation(#[from] KeywordError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Successful terminal states. `Degraded` carries the analysis inline because
/// it could not be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Done { report_id: Uuid },
    Degraded { analysis: AnalysisResult },
}

pub struct Orchestrator {
    aggregator: Arc<Aggregator>,
    synthesizer: DynSynthesizer,
    store: DynReportStore,
    synthesis_budget: Duration,
}

impl Orchestrator {
    pub fn new(aggregator: Arc<Aggregator>, synthesizer: DynSynthesizer, store: DynReportStore) -> Self {
        Self {
            aggregator,
            synthesizer,
            store,
            synthesis_budget: DEFAULT_SYNTHESIS_BUDGET,
        }
    }

    pub fn with_synthesis_budget(mut self, budget: Duration) -> Self {
        self.synthesis_budget = budget;
        self
    }

    pub fn store(&self) -> &DynReportStore {
        &self.store
    }

    /// Run the pipeline for the raw `keyword` field of a request body.
    pub async fn analyze(&self, raw_keyword: Option<&Value>) -> Result<AnalyzeOutcome, AnalyzeError> {
        ensure_metrics_described();
        let t0 = Instant::now();

        let keyword = match Keyword::from_json(raw_keyword) {
            Ok(k) => k,
            Err(e) => {
                tracing::info!(target: "analyze", stage = Stage::Validating.as_str(), error = %e, "keyword rejected");
                counter!("analyze_requests_total", "outcome" => "invalid").increment(1);
                return Err(e.into());
            }
        };
        let kid = keyword.anon_id();
        transition(&kid, Stage::Collecting, t0);

        let collected = self.aggregator.collect(&keyword).await;
        transition(&kid, Stage::Synthesizing, t0);

        let analysis = match self.synthesize(&keyword, &collected).await {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(
                    target: "analyze",
                    keyword_id = %kid,
                    stage = Stage::FailedSynthesis.as_str(),
                    provider = self.synthesizer.provider_name(),
                    reason = e.kind(),
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "analysis failed"
                );
                counter!("analyze_requests_total", "outcome" => Stage::FailedSynthesis.as_str()).increment(1);
                return Err(e.into());
            }
        };
        transition(&kid, Stage::Persisting, t0);

        let new_report = NewReport {
            keyword: keyword.as_str().to_string(),
            analysis_result: analysis,
            trend_data: collected.trends,
            news_data: collected.news,
            created_at: Utc::now(),
        };
        // Kept so the degraded path can still hand the analysis back.
        let analysis = new_report.analysis_result.clone();

        match self.store.create(new_report).await {
            Ok(report) => {
                tracing::info!(
                    target: "analyze",
                    keyword_id = %kid,
                    stage = Stage::Done.as_str(),
                    report_id = %report.id,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "analysis stored"
                );
                counter!("analyze_requests_total", "outcome" => Stage::Done.as_str()).increment(1);
                Ok(AnalyzeOutcome::Done { report_id: report.id })
            }
            Err(e) => {
                tracing::warn!(
                    target: "analyze",
                    keyword_id = %kid,
                    stage = Stage::DegradedPersist.as_str(),
                    backend = self.store.backend_name(),
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "report not stored, returning analysis inline"
                );
                counter!("analyze_requests_total", "outcome" => Stage::DegradedPersist.as_str()).increment(1);
                Ok(AnalyzeOutcome::Degraded { analysis })
            }
        }
    }

    async fn synthesize(
        &self,
        keyword: &Keyword,
        collected: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        let t = Instant::now();
        let budget = self.synthesis_budget;
        let result = tokio::time::timeout(budget, self.synthesizer.synthesize(keyword, collected))
            .await
            .unwrap_or(Err(SynthesisError::Timeout { budget }));
        histogram!("synthesis_duration_ms").record(t.elapsed().as_secs_f64() * 1_000.0);
        result
    }
}

fn transition(keyword_id: &str, stage: Stage, t0: Instant) {
    tracing::info!(
        target: "analyze",
        keyword_id,
        stage = stage.as_str(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "stage"
    );
}
