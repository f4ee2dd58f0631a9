// src/synthesis/mod.rs
//! AI synthesis: collected data in, structured `AnalysisResult` out.
//!
//! Providers sit behind the `Synthesizer` trait so the pipeline and the tests
//! can swap the Gemini client for a deterministic mock or a disabled stub.

pub mod analysis;
pub mod gemini;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use thiserror::Error;

use crate::collect::CollectedData;
use crate::config::AppConfig;
use crate::keyword::Keyword;

pub use analysis::{
    AnalysisResult, BusinessIdea, BusinessModel, BusinessModelOption, Competitor, CopilotPrompt,
    MarketOverview, Risk, Roadmap, TargetCustomers, ANALYSIS_SCHEMA_VERSION,
};
pub use gemini::GeminiSynthesizer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("no AI provider configured")]
    NotConfigured,
    #[error("model {model} not found")]
    ModelNotFound { model: String },
    #[error("provider returned HTTP {status}")]
    Http { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("synthesis exceeded {}ms", .budget.as_millis())]
    Timeout { budget: Duration },
    #[error("model output is not a valid analysis: {0}")]
    Unparseable(String),
    #[error("model returned no text")]
    EmptyResponse,
}

impl SynthesisError {
    /// Low-cardinality label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SynthesisError::NotConfigured => "not_configured",
            SynthesisError::ModelNotFound { .. } => "model_not_found",
            SynthesisError::Http { .. } => "http",
            SynthesisError::Transport(_) => "transport",
            SynthesisError::Timeout { .. } => "timeout",
            SynthesisError::Unparseable(_) => "unparseable",
            SynthesisError::EmptyResponse => "empty_response",
        }
    }
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        keyword: &Keyword,
        data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError>;

    fn provider_name(&self) -> &'static str;
}

pub type DynSynthesizer = Arc<dyn Synthesizer>;

/// Used when no API key is configured.
pub struct DisabledSynthesizer;

#[async_trait]
impl Synthesizer for DisabledSynthesizer {
    async fn synthesize(
        &self,
        _keyword: &Keyword,
        _data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        Err(SynthesisError::NotConfigured)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic analysis built from the keyword and collected counts; no network.
pub struct MockSynthesizer;

impl MockSynthesizer {
    pub fn analysis_for(keyword: &Keyword, data: &CollectedData) -> AnalysisResult {
        let kw = keyword.as_str();
        let headline = data
            .news
            .first()
            .map(|n| n.title.clone())
            .unwrap_or_else(|| "no recent coverage".to_string());
        let week = |n: u8| vec![format!("Day 1-2: {kw} week {n} (mock)")];

        AnalysisResult {
            schema_version: ANALYSIS_SCHEMA_VERSION,
            key_insights: vec![
                format!("{kw}: {} news items collected", data.news.len()),
                format!("latest headline: {headline}"),
            ],
            market_overview: MarketOverview {
                definition: format!("{kw} market (mock)"),
                market_size: "unknown".into(),
                trend: if data.trends.naver.is_some() || data.trends.google.is_some() {
                    "trend data available".into()
                } else {
                    "no trend data".into()
                },
            },
            target_customers: TargetCustomers {
                core_group: None,
                segments: vec!["early adopters".into()],
                pain_points: vec!["time".into()],
            },
            competitors: vec![Competitor {
                name: "Incumbent (mock)".into(),
                strength: "brand".into(),
                weakness: "price".into(),
                ..Default::default()
            }],
            business_ideas: vec![BusinessIdea {
                title: format!("{kw} assistant"),
                kind: "SaaS/디지털".into(),
                description: "mock idea".into(),
                usp: "speed".into(),
                target_customer: "early adopters".into(),
                physical_touchpoint: None,
            }],
            mvp_features: vec!["landing page".into()],
            business_model: BusinessModel {
                options: vec![BusinessModelOption {
                    kind: "subscription".into(),
                    pricing: "9,900 KRW / month".into(),
                    rationale: "mock".into(),
                }],
            },
            roadmap: Roadmap {
                week1: week(1),
                week2: week(2),
                week3: week(3),
                week4: week(4),
            },
            risks: vec![Risk {
                risk: "demand".into(),
                solution: "validate early".into(),
                action_plan: None,
            }],
            ai_copilot_prompts: Vec::new(),
        }
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        keyword: &Keyword,
        data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        Ok(Self::analysis_for(keyword, data))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// * `AI_TEST_MODE=mock` gives the mock.
/// * No Gemini key gives the disabled stub.
/// * Otherwise Gemini with the configured model chain.
pub fn build_synthesizer(cfg: &AppConfig, http: reqwest::Client) -> DynSynthesizer {
    if cfg.credentials.ai_test_mode.as_deref() == Some("mock") {
        tracing::info!(target: "synthesis", "AI_TEST_MODE=mock, using mock synthesizer");
        return Arc::new(MockSynthesizer);
    }
    match &cfg.credentials.gemini_api_key {
        Some(key) => Arc::new(GeminiSynthesizer::new(
            http,
            key.clone(),
            cfg.synthesis.models.clone(),
        )),
        None => {
            tracing::warn!(target: "synthesis", "GEMINI_API_KEY not set, synthesis disabled");
            Arc::new(DisabledSynthesizer)
        }
    }
}

/// Pull the JSON object out of model text: a ```json fence wins, else the span
/// from the first `{` to the last `}`, else the trimmed text itself.
pub fn extract_json(text: &str) -> &str {
    static JSON_FENCE: OnceCell<Regex> = OnceCell::new();
    let fence = JSON_FENCE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fence regex"));
    if let Some(c) = fence.captures(text).and_then(|c| c.get(1)) {
        return c.as_str().trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

/// Parse model text into an analysis.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, SynthesisError> {
    if text.trim().is_empty() {
        return Err(SynthesisError::EmptyResponse);
    }
    serde_json::from_str(extract_json(text)).map_err(|e| SynthesisError::Unparseable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    fn kw() -> Keyword {
        Keyword::parse("반려동물 헬스케어").unwrap()
    }

    #[test]
    fn extract_prefers_fence() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nthanks {not json}";
        assert_eq!(extract_json(text), "{\"a\": 1}");
    }

    #[test]
    fn extract_falls_back_to_outer_braces() {
        assert_eq!(extract_json("sure! {\"a\": {\"b\": 2}} done"), "{\"a\": {\"b\": 2}}");
        assert_eq!(extract_json("  nothing here "), "nothing here");
    }

    #[test]
    fn parse_roundtrips_mock_output_and_rejects_garbage() {
        let data = CollectedData::default();
        let expected = MockSynthesizer::analysis_for(&kw(), &data);
        let text = format!("```json\n{}\n```", serde_json::to_string(&expected).unwrap());
        assert_eq!(parse_analysis(&text).unwrap(), expected);

        assert!(matches!(parse_analysis("I cannot help"), Err(SynthesisError::Unparseable(_))));
        assert_eq!(parse_analysis("  "), Err(SynthesisError::EmptyResponse));
    }

    #[tokio::test]
    async fn factory_honours_test_mode_and_missing_key() {
        let mut cfg = AppConfig::default();
        cfg.credentials = Credentials {
            ai_test_mode: Some("mock".into()),
            ..Default::default()
        };
        let s = build_synthesizer(&cfg, reqwest::Client::new());
        assert_eq!(s.provider_name(), "mock");
        assert!(s.synthesize(&kw(), &CollectedData::default()).await.is_ok());

        cfg.credentials = Credentials::default();
        let s = build_synthesizer(&cfg, reqwest::Client::new());
        assert_eq!(s.provider_name(), "disabled");
        assert_eq!(
            s.synthesize(&kw(), &CollectedData::default()).await,
            Err(SynthesisError::NotConfigured)
        );

        cfg.credentials.gemini_api_key = Some("k".into());
        assert_eq!(build_synthesizer(&cfg, reqwest::Client::new()).provider_name(), "gemini");
    }
}
