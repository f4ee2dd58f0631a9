// src/collect/providers/google_trends.rs
//! Google Trends interest-over-time via the public explore/widgetdata endpoints.
//!
//! Two calls: `explore` hands out a TIMESERIES widget (request + token), then
//! `widgetdata/multiline` returns the series. Both bodies carry the `)]}'`
//! anti-XSSI prefix.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::collect::normalize::parse_unix_secs;
use crate::collect::providers::{decode_json, read_body};
use crate::collect::types::{SourceAdapter, SourceFailure, SourceResult, TrendBundle, TrendPoint};
use crate::config::SourcesConfig;
use crate::keyword::Keyword;

pub const GOOGLE_TRENDS_BASE: &str = "https://trends.google.com";
const SOURCE: &str = "google_trends";

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<f64>,
}

pub struct GoogleTrendsAdapter {
    http: reqwest::Client,
    enabled: bool,
    geo: String,
    hl: String,
    tz: i32,
    base_url: String,
}

impl GoogleTrendsAdapter {
    pub fn new(http: reqwest::Client, cfg: &SourcesConfig) -> Self {
        Self {
            http,
            enabled: cfg.google_trends_enabled,
            geo: cfg.geo.clone(),
            hl: cfg.hl.clone(),
            tz: cfg.tz_offset_minutes,
            base_url: GOOGLE_TRENDS_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn explore_request(&self, keyword: &Keyword) -> String {
        json!({
            "comparisonItem": [
                { "keyword": keyword.as_str(), "geo": self.geo, "time": "today 12-m" }
            ],
            "category": 0,
            "property": ""
        })
        .to_string()
    }

    /// Pull the TIMESERIES widget's request and token out of an explore body.
    fn parse_explore(body: &str) -> Result<(String, String), SourceFailure> {
        let resp: ExploreResponse = decode_json(SOURCE, strip_xssi_prefix(body))?;
        let widget = resp
            .widgets
            .into_iter()
            .find(|w| w.id == "TIMESERIES")
            .ok_or_else(|| SourceFailure::Decode("no TIMESERIES widget in explore".into()))?;
        let token = widget
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceFailure::Decode("TIMESERIES widget without token".into()))?;
        Ok((widget.request.to_string(), token))
    }

    pub fn parse_multiline(body: &str) -> Result<Option<TrendBundle>, SourceFailure> {
        let resp: MultilineResponse = decode_json(SOURCE, strip_xssi_prefix(body))?;
        let points: Vec<TrendPoint> = resp
            .default
            .timeline_data
            .into_iter()
            .filter_map(|p| {
                let value = *p.value.first()?;
                parse_unix_secs(&p.time).map(|at| TrendPoint { at, value })
            })
            .collect();
        if points.is_empty() {
            return Ok(None);
        }
        Ok(Some(TrendBundle {
            provider: SOURCE.to_string(),
            time_unit: "week".to_string(),
            points,
        }))
    }

    async fn fetch_inner(&self, keyword: &Keyword) -> Result<Option<TrendBundle>, SourceFailure> {
        let tz = self.tz.to_string();
        let explore = self
            .http
            .get(format!("{}/trends/api/explore", self.base_url))
            .query(&[
                ("hl", self.hl.as_str()),
                ("tz", tz.as_str()),
                ("req", self.explore_request(keyword).as_str()),
            ]);
        let (widget_req, token) = Self::parse_explore(&read_body(SOURCE, explore).await?)?;

        let multiline = self
            .http
            .get(format!("{}/trends/api/widgetdata/multiline", self.base_url))
            .query(&[
                ("hl", self.hl.as_str()),
                ("tz", tz.as_str()),
                ("req", widget_req.as_str()),
                ("token", token.as_str()),
            ]);
        Self::parse_multiline(&read_body(SOURCE, multiline).await?)
    }
}

/// Drop the `)]}'` / `)]}',` guard line Google prepends to JSON responses.
pub(crate) fn strip_xssi_prefix(body: &str) -> &str {
    let trimmed = body.trim_start();
    match trimmed.strip_prefix(")]}'") {
        Some(rest) => rest.trim_start_matches(',').trim_start(),
        None => trimmed,
    }
}

#[async_trait]
impl SourceAdapter for GoogleTrendsAdapter {
    type Output = Option<TrendBundle>;

    async fn fetch(&self, keyword: &Keyword) -> SourceResult<Option<TrendBundle>> {
        if !self.enabled {
            tracing::debug!(target: SOURCE, "disabled by configuration");
            return SourceResult::Success(None);
        }
        let result = self.fetch_inner(keyword).await;
        if let Ok(bundle) = &result {
            tracing::debug!(
                target: SOURCE,
                points = bundle.as_ref().map_or(0, |b| b.points.len()),
                "trends data received"
            );
        }
        result.into()
    }

    fn name(&self) -> &'static str {
        SOURCE
    }
}
