// src/keyword.rs
//! Validated search keyword. Collection and synthesis only ever see a `Keyword`,
//! never a raw request string.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const MIN_KEYWORD_CHARS: usize = 2;
pub const MAX_KEYWORD_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword is missing")]
    Missing,
    #[error("keyword must be a string")]
    NotAString,
    #[error("keyword must be 2-50 characters, got {len}")]
    Length { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Trim and length-check a raw string. Length counts characters, not bytes,
    /// so Hangul keywords are measured the way users type them.
    pub fn parse(raw: &str) -> Result<Self, KeywordError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KeywordError::Missing);
        }
        let len = trimmed.chars().count();
        if !(MIN_KEYWORD_CHARS..=MAX_KEYWORD_CHARS).contains(&len) {
            return Err(KeywordError::Length { len });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Validate the `keyword` field of a JSON request body.
    pub fn from_json(value: Option<&Value>) -> Result<Self, KeywordError> {
        match value {
            None | Some(Value::Null) => Err(KeywordError::Missing),
            Some(Value::String(s)) => Self::parse(s),
            Some(_) => Err(KeywordError::NotAString),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short anonymized id for logs; raw keywords stay out of info-level output.
    pub fn anon_id(&self) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(self.0.as_bytes());
        let mut out = String::with_capacity(12);
        for b in digest.iter().take(6) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
