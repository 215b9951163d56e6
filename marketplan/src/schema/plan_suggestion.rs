//! Whole-plan suggestion shapes.
//!
//! Response sections are optional and every field defaults to empty so a
//! partial response can still be merged: anything absent or empty leaves
//! the plan untouched. Output produced by the gateway has already passed
//! the strict output schema, which requires every field.

use serde::{Deserialize, Serialize};

use super::validation::{Rules, Validate, ValidationError};
use crate::core::plan::{AidaCopy, Competitor, CustomerPersona, Objective};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSuggestionRequest {
    /// Business, products/services and target market, in the owner's words.
    pub business_description: String,
}

impl Validate for PlanSuggestionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Rules::new("plan suggestion request")
            .required("businessDescription", &self.business_description)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SituationSuggestions {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketsSuggestions {
    pub target_markets: Vec<String>,
    pub customer_personas: Vec<CustomerPersona>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StpSuggestions {
    pub segmentation: Vec<String>,
    pub targeting: String,
    pub positioning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionSuggestions {
    pub mission_statement: String,
    pub vision_statement: String,
    pub objectives: Vec<Objective>,
}

/// The 4Ps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketingMix {
    pub product: Vec<String>,
    pub price: Vec<String>,
    pub place: Vec<String>,
    pub promotion: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategySuggestions {
    pub marketing_mix: MarketingMix,
    pub aida_copy: AidaCopy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricsSuggestions {
    pub kpis: Vec<String>,
    pub control_processes: Vec<String>,
}

/// AI-authored content for every plan section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanSuggestionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situation_analysis: Option<SituationSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markets_and_customers: Option<MarketsSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stp: Option<StpSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_and_objectives: Option<DirectionSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategies_and_programs: Option<StrategySuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_and_control: Option<MetricsSuggestions>,
}
