// src/collect/providers/naver_datalab.rs
use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::collect::normalize::parse_ymd;
use crate::collect::providers::{decode_json, read_body};
use crate::collect::types::{SourceAdapter, SourceFailure, SourceResult, TrendBundle, TrendPoint};
use crate::config::NaverCredentials;
use crate::keyword::Keyword;

pub const NAVER_OPENAPI_BASE: &str = "https://openapi.naver.com";
const SOURCE: &str = "naver";

#[derive(Debug, Deserialize)]
struct DataLabResponse {
    #[serde(rename = "timeUnit", default)]
    time_unit: String,
    #[serde(default)]
    results: Vec<DataLabResult>,
}

#[derive(Debug, Deserialize)]
struct DataLabResult {
    #[serde(default)]
    data: Vec<DataLabPoint>,
}

#[derive(Debug, Deserialize)]
struct DataLabPoint {
    period: String,
    ratio: f64,
}

/// Naver DataLab search-trend ratios for the last 12 months, monthly buckets.
pub struct NaverDataLabAdapter {
    http: reqwest::Client,
    credentials: Option<NaverCredentials>,
    base_url: String,
}

impl NaverDataLabAdapter {
    pub fn new(http: reqwest::Client, credentials: Option<NaverCredentials>) -> Self {
        Self {
            http,
            credentials,
            base_url: NAVER_OPENAPI_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(keyword: &Keyword, today: NaiveDate) -> serde_json::Value {
        let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
        json!({
            "startDate": start.format("%Y-%m-%d").to_string(),
            "endDate": today.format("%Y-%m-%d").to_string(),
            "timeUnit": "month",
            "keywordGroups": [
                { "groupName": keyword.as_str(), "keywords": [keyword.as_str()] }
            ],
        })
    }

    /// Normalize a DataLab response body. An empty series is "no data", not an error.
    pub fn parse_body(body: &str) -> Result<Option<TrendBundle>, SourceFailure> {
        let resp: DataLabResponse = decode_json(SOURCE, body)?;
        let points: Vec<TrendPoint> = resp
            .results
            .into_iter()
            .next()
            .map(|r| r.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| {
                parse_ymd(&p.period).map(|at| TrendPoint {
                    at,
                    value: p.ratio,
                })
            })
            .collect();

        if points.is_empty() {
            return Ok(None);
        }
        let time_unit = if resp.time_unit.is_empty() {
            "month".to_string()
        } else {
            resp.time_unit
        };
        Ok(Some(TrendBundle {
            provider: SOURCE.to_string(),
            time_unit,
            points,
        }))
    }
}

#[async_trait]
impl SourceAdapter for NaverDataLabAdapter {
    type Output = Option<TrendBundle>;

    async fn fetch(&self, keyword: &Keyword) -> SourceResult<Option<TrendBundle>> {
        let Some(creds) = &self.credentials else {
            tracing::warn!(target: SOURCE, "API keys not configured, skipping trends fetch");
            return SourceResult::Success(None);
        };

        let req = self
            .http
            .post(format!("{}/v1/datalab/search", self.base_url))
            .header("X-Naver-Client-Id", &creds.client_id)
            .header("X-Naver-Client-Secret", &creds.client_secret)
            .json(&Self::request_body(keyword, Utc::now().date_naive()));

        let result = async {
            let body = read_body(SOURCE, req).await?;
            Self::parse_body(&body)
        }
        .await;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_window_is_twelve_months() {
        let kw = Keyword::parse("펫 보험").unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let body = NaverDataLabAdapter::request_body(&kw, today);
        assert_eq!(body["startDate"], "2024-03-31");
        assert_eq!(body["endDate"], "2025-03-31");
        assert_eq!(body["timeUnit"], "month");
        assert_eq!(body["keywordGroups"][0]["keywords"][0], "펫 보험");
    }

    #[test]
    fn parses_series_and_skips_bad_periods() {
        let body = r#"{
            "startDate":"2024-03-01","endDate":"2025-03-01","timeUnit":"month",
            "results":[{"title":"펫 보험","keywords":["펫 보험"],"data":[
                {"period":"2024-03-01","ratio":41.5},
                {"period":"garbage","ratio":10},
                {"period":"2024-04-01","ratio":100}
            ]}]
        }"#;
        let bundle = NaverDataLabAdapter::parse_body(body).unwrap().unwrap();
        assert_eq!(bundle.provider, "naver");
        assert_eq!(bundle.time_unit, "month");
        assert_eq!(bundle.points.len(), 2);
        assert_eq!(bundle.points[1].value, 100.0);
    }

    #[test]
    fn empty_results_are_absent_data() {
        let body = r#"{"startDate":"x","endDate":"y","timeUnit":"month","results":[]}"#;
        assert_eq!(NaverDataLabAdapter::parse_body(body).unwrap(), None);
    }

    #[tokio::test]
    async fn missing_credentials_is_success_none() {
        let adapter = NaverDataLabAdapter::new(reqwest::Client::new(), None)
            .with_base_url("http://127.0.0.1:9");
        let kw = Keyword::parse("펫 보험").unwrap();
        assert_eq!(adapter.fetch(&kw).await, SourceResult::Success(None));
    }
}
