// src/collect/providers/naver_news.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::collect::normalize::{normalize_text, parse_rfc2822};
use crate::collect::providers::naver_datalab::NAVER_OPENAPI_BASE;
use crate::collect::providers::{decode_json, read_body};
use crate::collect::types::{NewsItem, SourceAdapter, SourceFailure, SourceResult};
use crate::config::NaverCredentials;
use crate::keyword::Keyword;

const SOURCE: &str = "naver_news";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    pub_date: String,
}

/// Naver news search, sorted by date. Titles arrive with `<b>` highlights and
/// HTML entities, both removed here.
pub struct NaverNewsAdapter {
    http: reqwest::Client,
    credentials: Option<NaverCredentials>,
    display: u32,
    base_url: String,
}

impl NaverNewsAdapter {
    pub fn new(http: reqwest::Client, credentials: Option<NaverCredentials>, display: u32) -> Self {
        Self {
            http,
            credentials,
            display,
            base_url: NAVER_OPENAPI_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn parse_body(body: &str) -> Result<Vec<NewsItem>, SourceFailure> {
        let resp: SearchResponse = decode_json(SOURCE, body)?;
        let Some(items) = resp.items else {
            tracing::warn!(target: SOURCE, "invalid news response format");
            return Err(SourceFailure::Decode("missing items array".into()));
        };
        Ok(items
            .into_iter()
            .filter_map(|it| {
                let title = normalize_text(&it.title);
                if title.is_empty() {
                    return None;
                }
                Some(NewsItem {
                    title,
                    description: normalize_text(&it.description),
                    url: it.link,
                    published_at: parse_rfc2822(&it.pub_date),
                })
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for NaverNewsAdapter {
    type Output = Vec<NewsItem>;

    async fn fetch(&self, keyword: &Keyword) -> SourceResult<Vec<NewsItem>> {
        let Some(creds) = &self.credentials else {
            tracing::warn!(target: SOURCE, "API keys not configured, skipping news fetch");
            return SourceResult::Success(Vec::new());
        };

        let display = self.display.to_string();
        let req = self
            .http
            .get(format!("{}/v1/search/news.json", self.base_url))
            .header("X-Naver-Client-Id", &creds.client_id)
            .header("X-Naver-Client-Secret", &creds.client_secret)
            .query(&[
                ("query", keyword.as_str()),
                ("display", display.as_str()),
                ("sort", "date"),
            ]);

        let result = async {
            let body = read_body(SOURCE, req).await?;
            Self::parse_body(&body)
        }
        .await;

        if let Ok(items) = &result {
            tracing::debug!(target: SOURCE, items = items.len(), "news data received");
        }
        result.into()
    }

    fn name(&self) -> &'static str {
        SOURCE
    }
}
