// src/collect/normalize.rs
//! Text and timestamp normalization shared by all providers.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

const MAX_TEXT_CHARS: usize = 1000;

/// Decode HTML entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    // Naver wraps matches in <b>..</b> and escapes them; decode first so escaped
    // tags are stripped too.
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}

/// True when a body that should be JSON is actually markup (HTML error page, XML).
pub fn looks_like_markup(body: &str) -> bool {
    body.trim_start_matches('\u{FEFF}').trim_start().starts_with('<')
}

/// Naver pubDate: "Mon, 14 Oct 2024 10:00:00 +0900".
pub fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond()))
}

/// NewsAPI publishedAt: "2025-02-27T08:15:00Z".
pub fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// DataLab period: "2025-02-01" (start of the bucket, UTC midnight).
pub fn parse_ymd(ts: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(ts.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Google Trends timelineData.time: unix seconds as a string.
pub fn parse_unix_secs(ts: &str) -> Option<DateTime<Utc>> {
    ts.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strips_naver_bold_and_entities() {
        let s = "&lt;b&gt;반려동물&lt;/b&gt; 헬스케어 시장 &quot;급성장&quot;";
        assert_eq!(normalize_text(s), r#"반려동물 헬스케어 시장 "급성장""#);
        let s2 = "<b>펫</b>&nbsp;&nbsp;테크  ";
        assert_eq!(normalize_text(s2), "펫 테크");
    }

    #[test]
    fn keeps_comparison_signs() {
        assert_eq!(normalize_text("a < b and c > d"), "a < b and c > d");
    }

    #[test]
    fn caps_length() {
        let s = "x".repeat(5_000);
        assert_eq!(normalize_text(&s).chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn markup_detection() {
        assert!(looks_like_markup("<!DOCTYPE html><html>"));
        assert!(looks_like_markup("\n  <html>"));
        assert!(!looks_like_markup(r#"{"items":[]}"#));
        assert!(!looks_like_markup(""));
    }

    #[test]
    fn date_formats_map_to_utc() {
        let expect = Utc.with_ymd_and_hms(2024, 10, 14, 1, 0, 0).unwrap();
        assert_eq!(parse_rfc2822("Mon, 14 Oct 2024 10:00:00 +0900"), Some(expect));
        assert_eq!(parse_rfc3339("2024-10-14T01:00:00Z"), Some(expect));
        assert_eq!(parse_unix_secs("1728867600"), Some(expect));
        assert_eq!(
            parse_ymd("2024-10-14"),
            Some(Utc.with_ymd_and_hms(2024, 10, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_rfc2822("yesterday"), None);
        assert_eq!(parse_rfc3339(""), None);
    }
}
