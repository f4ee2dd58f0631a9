// src/config/mod.rs
//! Application configuration.
//!
//! Tunables come from an optional TOML file; credentials come only from the
//! environment (`.env` is loaded by the binary in development):
//!
//! 1) $BIZSPARK_CONFIG_PATH (must exist when set)
//! 2) config/bizspark.toml
//! 3) built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "BIZSPARK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/bizspark.toml";

pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.5-flash", "gemini-2.5-pro", "gemini-1.5-flash"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub news: NewsConfig,
    pub synthesis: SynthesisConfig,
    pub reports: ReportsConfig,
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Per-source collection budget (Timeout Guard).
    pub timeout_ms: u64,
    /// reqwest timeout; bounds detached calls after the guard gives up.
    pub request_timeout_ms: u64,
    pub google_trends_enabled: bool,
    pub geo: String,
    pub hl: String,
    /// Google Trends `tz` parameter, minutes west of UTC (KST = -540).
    pub tz_offset_minutes: i32,
    pub language: String,
    pub newsapi_page_size: u32,
    pub naver_news_display: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            request_timeout_ms: 10_000,
            google_trends_enabled: true,
            geo: "KR".to_string(),
            hl: "ko".to_string(),
            tz_offset_minutes: -540,
            language: "ko".to_string(),
            newsapi_page_size: 10,
            naver_news_display: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub cap: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self { cap: 15 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Tried in order; only a "model not found" answer moves to the next one.
    pub models: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub list_limit: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { list_limit: 100 }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct NaverCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseCredentials {
    pub url: String,
    pub anon_key: String,
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub naver: Option<NaverCredentials>,
    pub news_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub supabase: Option<SupabaseCredentials>,
    /// `AI_TEST_MODE=mock` swaps the synthesizer for a deterministic one.
    pub ai_test_mode: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Blank values count as absent: missing configuration disables a source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let naver = match (get("NAVER_CLIENT_ID"), get("NAVER_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(NaverCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };
        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseCredentials {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        Self {
            naver,
            news_api_key: get("NEWS_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            supabase,
            ai_test_mode: get("AI_TEST_MODE").map(|v| v.to_ascii_lowercase()),
        }
    }
}

// Never print secrets; only which ones are present.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("naver", &self.naver.is_some())
            .field("news_api_key", &self.news_api_key.is_some())
            .field("gemini_api_key", &self.gemini_api_key.is_some())
            .field("supabase", &self.supabase.is_some())
            .field("ai_test_mode", &self.ai_test_mode)
            .finish()
    }
}

impl AppConfig {
    /// Resolve the config file per the module docs, then read credentials from env.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::from_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.credentials = Credentials::from_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        let d = SourcesConfig::default();
        if self.sources.timeout_ms == 0 {
            self.sources.timeout_ms = d.timeout_ms;
        }
        if self.sources.request_timeout_ms == 0 {
            self.sources.request_timeout_ms = d.request_timeout_ms;
        }
        self.sources.newsapi_page_size = self.sources.newsapi_page_size.clamp(1, 100);
        self.sources.naver_news_display = self.sources.naver_news_display.clamp(1, 100);

        self.synthesis.models.retain(|m| !m.trim().is_empty());
        if self.synthesis.models.is_empty() {
            self.synthesis.models = SynthesisConfig::default().models;
        }
        if self.synthesis.timeout_ms == 0 {
            self.synthesis.timeout_ms = SynthesisConfig::default().timeout_ms;
        }
        self.reports.list_limit = self.reports.list_limit.clamp(1, 100);
    }

    pub fn source_budget(&self) -> Duration {
        Duration::from_millis(self.sources.timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.sources.request_timeout_ms)
    }

    pub fn synthesis_budget(&self) -> Duration {
        Duration::from_millis(self.synthesis.timeout_ms)
    }
}
