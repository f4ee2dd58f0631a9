// src/store/postgrest.rs
//! Supabase `reports` table through the PostgREST HTTP interface.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::store::{NewReport, Report, ReportStore, ReportSummary, StoreError};

const TABLE_PATH: &str = "/rest/v1/reports";

pub struct PostgrestReportStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestReportStore {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn table(&self) -> String {
        format!("{}{TABLE_PATH}", self.base_url)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> Result<String, StoreError> {
        let resp = self.authed(req).send().await.map_err(|e| {
            tracing::error!(target: "store", op, error = %e, "Supabase request failed");
            StoreError::Transport(e.to_string())
        })?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            let snippet: String = body.chars().take(300).collect();
            tracing::error!(target: "store", op, status = status.as_u16(), body = %snippet, "Supabase returned an error");
            return Err(StoreError::Http {
                status: status.as_u16(),
            });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReportStore for PostgrestReportStore {
    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        let req = self
            .http
            .post(self.table())
            .header("Prefer", "return=representation")
            .json(&report);
        let body = self.send("create", req).await?;
        let rows: Vec<Report> = Self::decode(&body)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn get(&self, id: Uuid) -> Result<Report, StoreError> {
        let filter = format!("eq.{id}");
        let req = self
            .http
            .get(self.table())
            .query(&[("id", filter.as_str()), ("select", "*")]);
        let body = self.send("get", req).await?;
        let rows: Vec<Report> = Self::decode(&body)?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let filter = format!("eq.{id}");
        let req = self.http.delete(self.table()).query(&[("id", filter.as_str())]);
        self.send("delete", req).await.map(|_| ())
    }

    async fn list(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError> {
        let limit = limit.to_string();
        let req = self.http.get(self.table()).query(&[
            ("select", "id,keyword,created_at"),
            // Undated rows sort after every dated one.
            ("order", "created_at.desc.nullslast"),
            ("limit", limit.as_str()),
        ]);
        let body = self.send("list", req).await?;
        Self::decode(&body)
    }

    fn backend_name(&self) -> &'static str {
        "postgrest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_postgrest_timestamps() {
        let body = r#"[{"id":"7d9f3c5e-1b2a-4c3d-8e9f-0a1b2c3d4e5f","keyword":"반려동물",
                        "created_at":"2025-02-27T08:15:00.123456+00:00"}]"#;
        let rows: Vec<ReportSummary> = PostgrestReportStore::decode(body).unwrap();
        assert_eq!(rows[0].keyword, "반려동물");
        assert_eq!(rows[0].created_at.map(|t| t.timestamp()), Some(1_740_644_100));
    }

    #[test]
    fn full_row_with_null_timestamp_decodes() {
        let keyword = crate::keyword::Keyword::parse("반려동물").unwrap();
        let analysis = crate::synthesis::MockSynthesizer::analysis_for(
            &keyword,
            &crate::collect::CollectedData::default(),
        );
        let body = serde_json::json!([{
            "id": "7d9f3c5e-1b2a-4c3d-8e9f-0a1b2c3d4e5f",
            "keyword": "반려동물",
            "analysis_result": analysis,
            "news_data": [],
            "created_at": null
        }])
        .to_string();
        let rows: Vec<Report> = PostgrestReportStore::decode(&body).unwrap();
        assert_eq!(rows[0].created_at, None);
        assert!(rows[0].trend_data.naver.is_none());
    }

    #[test]
    fn table_url_has_no_double_slash() {
        let s = PostgrestReportStore::new(reqwest::Client::new(), "https://x.supabase.co/", "k");
        assert_eq!(s.table(), "https://x.supabase.co/rest/v1/reports");
    }
}
