//! Marketing plan data model.
//!
//! A plan always carries all six sections. Stored documents that omit a
//! section or a field deserialize to the empty default, so callers never see
//! an uninitialized section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// SWOT buckets, each a free-text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Swot {
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Competitor {
    pub name: String,
    pub analysis: String,
}

/// Step 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SituationAnalysis {
    pub mission: String,
    pub resources: String,
    pub offerings: String,
    pub previous_results: String,
    pub business_relationships: String,
    pub swot: Swot,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerPersona {
    pub name: String,
    pub description: String,
}

/// Step 2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MarketsAndCustomers {
    pub market_definition: String,
    pub market_share: String,
    pub consumer_analysis: String,
    pub business_analysis: String,
    pub target_markets: String,
    pub customer_personas: Vec<CustomerPersona>,
}

/// Step 3: segmentation, targeting, positioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Stp {
    pub segmentation: String,
    pub targeting: String,
    pub positioning: String,
}

/// Overall strategic direction chosen in step 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Growth,
    Maintenance,
    Retrenchment,
}

impl Direction {
    pub const ALL: [Direction; 3] = [
        Direction::Growth,
        Direction::Maintenance,
        Direction::Retrenchment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Growth => "Growth",
            Direction::Maintenance => "Maintenance",
            Direction::Retrenchment => "Retrenchment",
        }
    }
}

/// A SMART objective paired with the KPI that measures it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Objective {
    pub objective: String,
    pub kpi: String,
}

/// Step 4.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DirectionAndObjectives {
    #[serde(deserialize_with = "blank_as_none")]
    pub direction: Option<Direction>,
    pub mission_statement: String,
    pub vision_statement: String,
    pub marketing_objectives: String,
    pub financial_objectives: String,
    pub societal_objectives: String,
    pub customer_service: String,
    pub internal_marketing: String,
    pub objectives: Vec<Objective>,
}

/// Attention/Interest/Desire/Action copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AidaCopy {
    pub attention: String,
    pub interest: String,
    pub desire: String,
    pub action: String,
}

/// Step 5: the 4Ps plus AIDA copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StrategiesAndPrograms {
    pub product: String,
    pub pricing: String,
    pub place: String,
    pub promotion: String,
    pub aida_copy: AidaCopy,
}

/// Step 6.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricsAndControl {
    pub kpis: String,
    pub control_process: String,
    pub budget: String,
    pub contingency: String,
}

/// The six-section plan plus its title and creation time.
///
/// `Default` yields an all-empty plan stamped at the Unix epoch, which keeps
/// fixtures deterministic; [`MarketingPlan::new`] stamps the current time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketingPlan {
    pub title: String,
    #[serde(rename = "step1_situationAnalysis")]
    pub situation_analysis: SituationAnalysis,
    #[serde(rename = "step2_marketsAndCustomers")]
    pub markets_and_customers: MarketsAndCustomers,
    #[serde(rename = "step3_stp")]
    pub stp: Stp,
    #[serde(rename = "step4_directionAndObjectives")]
    pub direction_and_objectives: DirectionAndObjectives,
    #[serde(rename = "step5_strategiesAndPrograms")]
    pub strategies_and_programs: StrategiesAndPrograms,
    #[serde(rename = "step6_metricsAndControl")]
    pub metrics_and_control: MetricsAndControl,
    pub created_at: DateTime<Utc>,
}

impl MarketingPlan {
    /// Fresh plan with every field empty, stamped now.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_at: Utc::now(),
            ..Self::default()
        }
    }
}

/// The form posts an empty string when no direction is picked.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Direction>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Direction(Direction),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Direction(direction)) => Ok(Some(direction)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => Err(serde::de::Error::custom(format!(
            "unknown direction '{text}' (expected Growth, Maintenance or Retrenchment)"
        ))),
    }
}
