// src/synthesis/prompt.rs
//! Prompt assembly for the analysis model. Only a compact trend summary and the
//! newest few headlines are sent to keep the prompt small.

use serde::Serialize;

use crate::collect::{CollectedData, NewsItem};
use crate::keyword::Keyword;

pub const PROMPT_NEWS_LIMIT: usize = 5;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub has_naver: bool,
    pub has_google: bool,
    pub naver_data_points: usize,
    pub google_data_points: usize,
}

impl TrendSummary {
    pub fn of(data: &CollectedData) -> Self {
        let naver = data.trends.naver.as_ref();
        let google = data.trends.google.as_ref();
        Self {
            has_naver: naver.is_some(),
            has_google: google.is_some(),
            naver_data_points: naver.map_or(0, |b| b.points.len()),
            google_data_points: google.map_or(0, |b| b.points.len()),
        }
    }
}

const SCHEMA_HINT: &str = r#"{
  "keyInsights": ["market insight", "target customer insight", "business item insight"],
  "marketOverview": {"definition": "", "marketSize": "", "trend": ""},
  "targetCustomers": {"coreGroup": "", "segments": [""], "painPoints": [""]},
  "competitors": [{"name": "", "serviceScope": "", "priceRange": "", "coreUSP": "", "strength": "", "weakness": ""}],
  "businessIdeas": [{"title": "", "type": "SaaS/디지털 | HaaS/제품 | 서비스/콘텐츠", "description": "", "usp": "", "targetCustomer": "", "physicalTouchpoint": ""}],
  "mvpFeatures": [""],
  "businessModel": {"options": [{"type": "", "pricing": "", "rationale": ""}]},
  "roadmap": {"week1": ["Day 1-2: "], "week2": [""], "week3": [""], "week4": [""]},
  "risks": [{"risk": "", "solution": "", "actionPlan": ""}],
  "aiCopilotPrompts": [{"category": "시장 진입 | 제품 구체화 | 리스크 완화", "title": "", "prompt": ""}]
}"#;

pub fn build_analysis_prompt(keyword: &Keyword, data: &CollectedData) -> String {
    let summary = serde_json::to_string(&TrendSummary::of(data)).unwrap_or_else(|_| "{}".into());
    let news: Vec<&NewsItem> = data.news.iter().take(PROMPT_NEWS_LIMIT).collect();
    let news_json = serde_json::to_string_pretty(&news).unwrap_or_else(|_| "[]".into());

    format!(
        "You are a market analyst and startup strategy consultant with ten years of experience \
         in the Korean market.\n\n\
         [Input]\n\
         Keyword: {keyword}\n\
         Trend data summary: {summary}\n\
         Latest news (up to {PROMPT_NEWS_LIMIT}): {news_json}\n\n\
         [Task]\n\
         Using the data above, write a concrete, actionable business analysis in Korean.\n\
         - Use real, existing companies and services as competitors; never placeholders.\n\
         - Provide three business ideas covering SaaS/디지털, HaaS/제품 and 서비스/콘텐츠.\n\
         - Propose at least two business models, at least one of them not a SaaS subscription.\n\
         - Give a day-by-day 4-week roadmap and risk action plans with metrics and timelines.\n\
         - Respond with valid JSON only, no other text, using exactly this shape:\n\
         {SCHEMA_HINT}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{TrendBundle, TrendData, TrendPoint};
    use chrono::Utc;

    fn news(n: usize) -> Vec<NewsItem> {
        (0..n)
            .map(|i| NewsItem {
                title: format!("headline-{i}"),
                description: String::new(),
                url: format!("https://n/{i}"),
                published_at: None,
            })
            .collect()
    }

    #[test]
    fn summary_counts_points() {
        let data = CollectedData {
            trends: TrendData {
                naver: Some(TrendBundle {
                    provider: "naver".into(),
                    time_unit: "month".into(),
                    points: vec![TrendPoint { at: Utc::now(), value: 1.0 }; 12],
                }),
                google: None,
            },
            news: vec![],
        };
        assert_eq!(
            TrendSummary::of(&data),
            TrendSummary {
                has_naver: true,
                has_google: false,
                naver_data_points: 12,
                google_data_points: 0,
            }
        );
    }

    #[test]
    fn prompt_limits_news_and_names_keyword() {
        let data = CollectedData {
            trends: TrendData::default(),
            news: news(8),
        };
        let kw = Keyword::parse("반려동물 헬스케어").unwrap();
        let p = build_analysis_prompt(&kw, &data);
        assert!(p.contains("Keyword: 반려동물 헬스케어"));
        assert!(p.contains("headline-4"));
        assert!(!p.contains("headline-5"));
        assert!(p.contains("\"hasNaver\":false"));
    }
}
