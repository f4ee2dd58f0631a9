// src/synthesis/gemini.rs
//! Gemini `generateContent` client with an ordered model chain.
//!
//! A model that the API reports as missing (HTTP 404) is skipped and the next
//! one is tried. Any other failure ends the attempt right away.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::collect::CollectedData;
use crate::keyword::Keyword;
use crate::synthesis::prompt::build_analysis_prompt;
use crate::synthesis::{parse_analysis, AnalysisResult, SynthesisError, Synthesizer};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub struct GeminiSynthesizer {
    http: reqwest::Client,
    api_key: String,
    models: Vec<String>,
    base_url: String,
}

impl GeminiSynthesizer {
    pub fn new(http: reqwest::Client, api_key: String, models: Vec<String>) -> Self {
        Self {
            http,
            api_key,
            models,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, SynthesisError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                response_mime_type: "application/json",
            },
        };

        let resp = self
            .http
            .post(format!("{}/v1beta/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SynthesisError::ModelNotFound {
                model: model.to_string(),
            });
        }
        if !status.is_success() {
            let snippet: String = resp.text().await.unwrap_or_default().chars().take(300).collect();
            tracing::warn!(target: "synthesis", model, status = status.as_u16(), body = %snippet, "Gemini request failed");
            return Err(SynthesisError::Http {
                status: status.as_u16(),
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| SynthesisError::Unparseable(e.to_string()))?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Synthesizer for GeminiSynthesizer {
    async fn synthesize(
        &self,
        keyword: &Keyword,
        data: &CollectedData,
    ) -> Result<AnalysisResult, SynthesisError> {
        let prompt = build_analysis_prompt(keyword, data);
        let mut last = SynthesisError::NotConfigured;

        for model in &self.models {
            tracing::debug!(target: "synthesis", model = %model, "trying model");
            match self.generate(model, &prompt).await {
                Ok(text) => {
                    let analysis = parse_analysis(&text);
                    match &analysis {
                        Ok(_) => tracing::info!(target: "synthesis", model = %model, "analysis generated"),
                        Err(e) => tracing::warn!(target: "synthesis", model = %model, error = %e, "model output rejected"),
                    }
                    return analysis;
                }
                Err(e @ SynthesisError::ModelNotFound { .. }) => {
                    tracing::warn!(target: "synthesis", model = %model, "model not found, trying next");
                    counter!("synthesis_model_fallbacks_total").increment(1);
                    last = e;
                }
                Err(e) => {
                    tracing::warn!(target: "synthesis", model = %model, error = %e, "synthesis failed");
                    return Err(e);
                }
            }
        }
        Err(last)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
