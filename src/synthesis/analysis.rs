// src/synthesis/analysis.rs
//! Structured analysis document returned by the synthesis step.
//!
//! Older reports were produced without some fields; those are `Option` or
//! defaulted here instead of being probed for by consumers.

use serde::{Deserialize, Serialize};

pub const ANALYSIS_SCHEMA_VERSION: u32 = 2;

fn default_schema_version() -> u32 {
    ANALYSIS_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub key_insights: Vec<String>,
    pub market_overview: MarketOverview,
    pub target_customers: TargetCustomers,
    pub competitors: Vec<Competitor>,
    pub business_ideas: Vec<BusinessIdea>,
    pub mvp_features: Vec<String>,
    pub business_model: BusinessModel,
    pub roadmap: Roadmap,
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub ai_copilot_prompts: Vec<CopilotPrompt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub market_size: String,
    #[serde(default)]
    pub trend: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCustomers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_group: Option<String>,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(rename = "coreUSP", default, skip_serializing_if = "Option::is_none")]
    pub core_usp: Option<String>,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub weakness: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdea {
    pub title: String,
    /// "SaaS/디지털" | "HaaS/제품" | "서비스/콘텐츠"; kept as text so new kinds parse.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usp: String,
    #[serde(default)]
    pub target_customer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_touchpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessModel {
    #[serde(default)]
    pub options: Vec<BusinessModelOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessModelOption {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub pricing: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default)]
    pub week1: Vec<String>,
    #[serde(default)]
    pub week2: Vec<String>,
    #[serde(default)]
    pub week3: Vec<String>,
    #[serde(default)]
    pub week4: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub risk: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopilotPrompt {
    #[serde(default)]
    pub category: String,
    pub title: String,
    pub prompt: String,
}
