//! Shared error and key types for plan store operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Addresses one of the six plan sections.
///
/// Serialized names match the document keys used by the plan store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKey {
    #[serde(rename = "step1_situationAnalysis")]
    SituationAnalysis,
    #[serde(rename = "step2_marketsAndCustomers")]
    MarketsAndCustomers,
    #[serde(rename = "step3_stp")]
    Stp,
    #[serde(rename = "step4_directionAndObjectives")]
    DirectionAndObjectives,
    #[serde(rename = "step5_strategiesAndPrograms")]
    StrategiesAndPrograms,
    #[serde(rename = "step6_metricsAndControl")]
    MetricsAndControl,
}

impl SectionKey {
    /// All sections in wizard order.
    pub const ALL: [SectionKey; 6] = [
        SectionKey::SituationAnalysis,
        SectionKey::MarketsAndCustomers,
        SectionKey::Stp,
        SectionKey::DirectionAndObjectives,
        SectionKey::StrategiesAndPrograms,
        SectionKey::MetricsAndControl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::SituationAnalysis => "step1_situationAnalysis",
            SectionKey::MarketsAndCustomers => "step2_marketsAndCustomers",
            SectionKey::Stp => "step3_stp",
            SectionKey::DirectionAndObjectives => "step4_directionAndObjectives",
            SectionKey::StrategiesAndPrograms => "step5_strategiesAndPrograms",
            SectionKey::MetricsAndControl => "step6_metricsAndControl",
        }
    }

    /// Zero-based position in the wizard.
    pub fn index(self) -> usize {
        match self {
            SectionKey::SituationAnalysis => 0,
            SectionKey::MarketsAndCustomers => 1,
            SectionKey::Stp => 2,
            SectionKey::DirectionAndObjectives => 3,
            SectionKey::StrategiesAndPrograms => 4,
            SectionKey::MetricsAndControl => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-facing title shown in navigation and sent to the model.
    pub fn title(self) -> &'static str {
        match self {
            SectionKey::SituationAnalysis => "Situation Analysis",
            SectionKey::MarketsAndCustomers => "Markets & Customers",
            SectionKey::Stp => "Segmentation, Targeting, and Positioning (STP)",
            SectionKey::DirectionAndObjectives => "Direction & Objectives",
            SectionKey::StrategiesAndPrograms => "Strategies & Programs",
            SectionKey::MetricsAndControl => "Metrics & Control",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the document key (`step3_stp`) or the one-based step number (`3`).
impl FromStr for SectionKey {
    type Err = PlanError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Ok(step) = raw.parse::<usize>() {
            return step
                .checked_sub(1)
                .and_then(SectionKey::from_index)
                .ok_or_else(|| PlanError::UnknownSection(raw.to_string()));
        }
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == raw)
            .ok_or_else(|| PlanError::UnknownSection(raw.to_string()))
    }
}

/// Errors from plan store operations.
///
/// These are caller mistakes (bad addresses or values). Store operations
/// never leave a half-applied plan behind: on error the input plan is the
/// only plan that exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("unknown field '{path}' in {section}")]
    UnknownField { section: SectionKey, path: String },
    #[error("index {index} out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("'{path}' is not a list")]
    NotAList { path: String },
    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },
    #[error("step {0} is out of range (expected 1-6)")]
    StepOutOfRange(usize),
}
