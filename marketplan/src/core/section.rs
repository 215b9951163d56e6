//! Section-level access to a plan.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::plan::{
    DirectionAndObjectives, MarketingPlan, MarketsAndCustomers, MetricsAndControl,
    SituationAnalysis, StrategiesAndPrograms, Stp,
};
use crate::core::types::SectionKey;

/// One plan section, tagged with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "fields")]
pub enum PlanSection {
    #[serde(rename = "step1_situationAnalysis")]
    SituationAnalysis(SituationAnalysis),
    #[serde(rename = "step2_marketsAndCustomers")]
    MarketsAndCustomers(MarketsAndCustomers),
    #[serde(rename = "step3_stp")]
    Stp(Stp),
    #[serde(rename = "step4_directionAndObjectives")]
    DirectionAndObjectives(DirectionAndObjectives),
    #[serde(rename = "step5_strategiesAndPrograms")]
    StrategiesAndPrograms(StrategiesAndPrograms),
    #[serde(rename = "step6_metricsAndControl")]
    MetricsAndControl(MetricsAndControl),
}

impl PlanSection {
    pub fn key(&self) -> SectionKey {
        match self {
            PlanSection::SituationAnalysis(_) => SectionKey::SituationAnalysis,
            PlanSection::MarketsAndCustomers(_) => SectionKey::MarketsAndCustomers,
            PlanSection::Stp(_) => SectionKey::Stp,
            PlanSection::DirectionAndObjectives(_) => SectionKey::DirectionAndObjectives,
            PlanSection::StrategiesAndPrograms(_) => SectionKey::StrategiesAndPrograms,
            PlanSection::MetricsAndControl(_) => SectionKey::MetricsAndControl,
        }
    }

    /// The section's fields as a JSON object (camelCase keys).
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            PlanSection::SituationAnalysis(s) => serde_json::to_value(s),
            PlanSection::MarketsAndCustomers(s) => serde_json::to_value(s),
            PlanSection::Stp(s) => serde_json::to_value(s),
            PlanSection::DirectionAndObjectives(s) => serde_json::to_value(s),
            PlanSection::StrategiesAndPrograms(s) => serde_json::to_value(s),
            PlanSection::MetricsAndControl(s) => serde_json::to_value(s),
        }
    }

    /// Rebuild a section of kind `key` from a JSON object.
    pub fn from_value(key: SectionKey, value: Value) -> serde_json::Result<Self> {
        Ok(match key {
            SectionKey::SituationAnalysis => {
                PlanSection::SituationAnalysis(serde_json::from_value(value)?)
            }
            SectionKey::MarketsAndCustomers => {
                PlanSection::MarketsAndCustomers(serde_json::from_value(value)?)
            }
            SectionKey::Stp => PlanSection::Stp(serde_json::from_value(value)?),
            SectionKey::DirectionAndObjectives => {
                PlanSection::DirectionAndObjectives(serde_json::from_value(value)?)
            }
            SectionKey::StrategiesAndPrograms => {
                PlanSection::StrategiesAndPrograms(serde_json::from_value(value)?)
            }
            SectionKey::MetricsAndControl => {
                PlanSection::MetricsAndControl(serde_json::from_value(value)?)
            }
        })
    }
}

/// Read one section. Never fails: sections are always initialized.
pub fn get_section(plan: &MarketingPlan, key: SectionKey) -> PlanSection {
    match key {
        SectionKey::SituationAnalysis => {
            PlanSection::SituationAnalysis(plan.situation_analysis.clone())
        }
        SectionKey::MarketsAndCustomers => {
            PlanSection::MarketsAndCustomers(plan.markets_and_customers.clone())
        }
        SectionKey::Stp => PlanSection::Stp(plan.stp.clone()),
        SectionKey::DirectionAndObjectives => {
            PlanSection::DirectionAndObjectives(plan.direction_and_objectives.clone())
        }
        SectionKey::StrategiesAndPrograms => {
            PlanSection::StrategiesAndPrograms(plan.strategies_and_programs.clone())
        }
        SectionKey::MetricsAndControl => {
            PlanSection::MetricsAndControl(plan.metrics_and_control.clone())
        }
    }
}

/// Return a copy of `plan` with one section swapped out.
pub fn with_section(plan: &MarketingPlan, section: PlanSection) -> MarketingPlan {
    let mut next = plan.clone();
    match section {
        PlanSection::SituationAnalysis(s) => next.situation_analysis = s,
        PlanSection::MarketsAndCustomers(s) => next.markets_and_customers = s,
        PlanSection::Stp(s) => next.stp = s,
        PlanSection::DirectionAndObjectives(s) => next.direction_and_objectives = s,
        PlanSection::StrategiesAndPrograms(s) => next.strategies_and_programs = s,
        PlanSection::MetricsAndControl(s) => next.metrics_and_control = s,
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_section_on_default_plan_returns_empty_section() {
        let plan = MarketingPlan::default();
        for key in SectionKey::ALL {
            let section = get_section(&plan, key);
            assert_eq!(section.key(), key);
        }
        assert_eq!(
            get_section(&plan, SectionKey::Stp),
            PlanSection::Stp(Stp::default())
        );
    }

    #[test]
    fn with_section_replaces_only_that_section() {
        let plan = MarketingPlan::default();
        let stp = Stp {
            positioning: "The friendliest roaster in town".to_string(),
            ..Stp::default()
        };
        let next = with_section(&plan, PlanSection::Stp(stp.clone()));
        assert_eq!(next.stp, stp);
        assert_eq!(
            MarketingPlan {
                stp: Stp::default(),
                ..next
            },
            plan
        );
    }

    #[test]
    fn value_round_trip_preserves_key() {
        let section = get_section(&MarketingPlan::default(), SectionKey::DirectionAndObjectives);
        let value = section.to_value().expect("to value");
        let back = PlanSection::from_value(SectionKey::DirectionAndObjectives, value)
            .expect("from value");
        assert_eq!(back, section);
    }
}
