// src/collect/providers/mod.rs
//! Concrete source adapters plus the HTTP plumbing they share.

pub mod google_trends;
pub mod naver_datalab;
pub mod naver_news;
pub mod newsapi;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::collect::normalize::looks_like_markup;
use crate::collect::types::SourceFailure;

pub use google_trends::GoogleTrendsAdapter;
pub use naver_datalab::NaverDataLabAdapter;
pub use naver_news::NaverNewsAdapter;
pub use newsapi::NewsApiAdapter;

const LOG_BODY_CHARS: usize = 500;

/// Shared outbound client for all providers. The request timeout bounds work that
/// keeps running after the collection guard has stopped waiting.
pub fn build_http_client(request_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("bizspark/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(request_timeout)
        .build()
}

fn truncate_for_log(body: &str) -> String {
    body.chars().take(LOG_BODY_CHARS).collect()
}

/// Send a request and return the body of a 2xx response.
/// Transport and status errors are logged here with the provider name.
pub(crate) async fn read_body(
    source: &'static str,
    req: reqwest::RequestBuilder,
) -> Result<String, SourceFailure> {
    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(target: "collect", source, error = %e, "provider transport error");
            return Err(SourceFailure::Transport(e.to_string()));
        }
    };

    let status = resp.status();
    let body = resp.text().await.map_err(|e| {
        tracing::warn!(target: "collect", source, status = status.as_u16(), error = %e, "provider body read failed");
        SourceFailure::Transport(e.to_string())
    })?;

    if !status.is_success() {
        let snippet = truncate_for_log(&body);
        tracing::warn!(
            target: "collect",
            source,
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or(""),
            body = %snippet,
            "provider HTTP error"
        );
        return Err(SourceFailure::Http {
            status: status.as_u16(),
            body: snippet,
        });
    }
    Ok(body)
}

/// Parse a provider body as JSON, rejecting markup disguised as a success.
pub(crate) fn decode_json<T: DeserializeOwned>(
    source: &'static str,
    body: &str,
) -> Result<T, SourceFailure> {
    if looks_like_markup(body) {
        tracing::warn!(
            target: "collect",
            source,
            body = %truncate_for_log(body),
            "provider returned markup instead of JSON"
        );
        return Err(SourceFailure::UnexpectedFormat(
            "markup payload where JSON was expected".to_string(),
        ));
    }
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(target: "collect", source, error = %e, "provider JSON did not match schema");
        SourceFailure::Decode(e.to_string())
    })
}
