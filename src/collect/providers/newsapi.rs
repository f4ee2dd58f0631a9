// src/collect/providers/newsapi.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::collect::normalize::{normalize_text, parse_rfc3339};
use crate::collect::providers::{decode_json, read_body};
use crate::collect::types::{NewsItem, SourceAdapter, SourceFailure, SourceResult};
use crate::keyword::Keyword;

pub const NEWSAPI_BASE: &str = "https://newsapi.org";
const SOURCE: &str = "newsapi";
// Placeholder NewsAPI returns for articles pulled by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

/// NewsAPI `/v2/everything`, newest first.
pub struct NewsApiAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    language: String,
    page_size: u32,
    base_url: String,
}

impl NewsApiAdapter {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        language: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            api_key,
            language: language.into(),
            page_size,
            base_url: NEWSAPI_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn parse_body(body: &str, limit: usize) -> Result<Vec<NewsItem>, SourceFailure> {
        let resp: EverythingResponse = decode_json(SOURCE, body)?;
        if resp.status != "ok" {
            let msg = resp.message.unwrap_or_else(|| format!("status={}", resp.status));
            tracing::warn!(target: SOURCE, message = %msg, "API reported an error");
            return Err(SourceFailure::Decode(msg));
        }

        let items = resp
            .articles
            .into_iter()
            .filter_map(|a| {
                let title = normalize_text(a.title.as_deref().unwrap_or_default());
                if title.is_empty() || title == REMOVED_TITLE {
                    return None;
                }
                Some(NewsItem {
                    title,
                    description: normalize_text(a.description.as_deref().unwrap_or_default()),
                    url: a.url.unwrap_or_default(),
                    published_at: a.published_at.as_deref().and_then(parse_rfc3339),
                })
            })
            .take(limit)
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    type Output = Vec<NewsItem>;

    async fn fetch(&self, keyword: &Keyword) -> SourceResult<Vec<NewsItem>> {
        let Some(key) = &self.api_key else {
            tracing::debug!(target: SOURCE, "no API key configured, skipping news fetch");
            return SourceResult::Success(Vec::new());
        };

        let page_size = self.page_size.to_string();
        let req = self
            .http
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", key)
            .query(&[
                ("q", keyword.as_str()),
                ("language", self.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ]);

        let limit = self.page_size as usize;
        let result = async {
            let body = read_body(SOURCE, req).await?;
            Self::parse_body(&body, limit)
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
