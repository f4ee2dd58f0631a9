// src/collect/merge.rs
use std::collections::HashSet;

use crate::collect::types::NewsItem;

pub const DEFAULT_NEWS_CAP: usize = 15;

/// Merge news lists given in source-priority order.
///
/// First occurrence of a title wins, the result is sorted newest first (undated
/// items last) with a stable sort so ties keep concatenation order, then capped.
pub fn merge_news(lists: Vec<Vec<NewsItem>>, cap: usize) -> Vec<NewsItem> {
    let total: usize = lists.iter().map(Vec::len).sum();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut out = Vec::with_capacity(total);

    for item in lists.into_iter().flatten() {
        if seen.insert(item.title.clone()) {
            out.push(item);
        }
    }

    // Option<DateTime> orders None below Some, so reversing puts undated items last.
    out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    out.truncate(cap);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(title: &str, url: &str, hours_ago: Option<i64>) -> NewsItem {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        NewsItem {
            title: title.into(),
            description: String::new(),
            url: url.into(),
            published_at: hours_ago.map(|h| base - Duration::hours(h)),
        }
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(merge_news(vec![], 15).is_empty());
        assert!(merge_news(vec![vec![], vec![]], 15).is_empty());
    }

    #[test]
    fn exact_title_match_only() {
        let out = merge_news(
            vec![vec![item("Pet care", "a", Some(1)), item("pet care", "b", Some(2))]],
            15,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn equal_timestamps_keep_concatenation_order() {
        let out = merge_news(
            vec![
                vec![item("first", "a", Some(3))],
                vec![item("second", "b", Some(3))],
            ],
            15,
        );
        let titles: Vec<_> = out.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn cap_zero_yields_nothing() {
        assert!(merge_news(vec![vec![item("x", "a", Some(1))]], 0).is_empty());
    }
}
