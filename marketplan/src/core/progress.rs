//! Section completeness and the sidebar progress indicator.

use serde::Serialize;

use crate::core::plan::MarketingPlan;
use crate::core::types::SectionKey;

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether a section holds enough content to count as done.
pub fn is_section_complete(plan: &MarketingPlan, key: SectionKey) -> bool {
    match key {
        SectionKey::SituationAnalysis => {
            let s = &plan.situation_analysis;
            filled(&s.mission) && filled(&s.swot.strengths)
        }
        SectionKey::MarketsAndCustomers => {
            let s = &plan.markets_and_customers;
            (filled(&s.market_definition) && filled(&s.consumer_analysis))
                || filled(&s.target_markets)
        }
        SectionKey::Stp => {
            let s = &plan.stp;
            filled(&s.segmentation) && filled(&s.targeting) && filled(&s.positioning)
        }
        SectionKey::DirectionAndObjectives => {
            let s = &plan.direction_and_objectives;
            filled(&s.marketing_objectives) || s.objectives.iter().any(|o| filled(&o.objective))
        }
        SectionKey::StrategiesAndPrograms => {
            let s = &plan.strategies_and_programs;
            filled(&s.product) && filled(&s.pricing) && filled(&s.place) && filled(&s.promotion)
        }
        SectionKey::MetricsAndControl => {
            let s = &plan.metrics_and_control;
            filled(&s.kpis) && filled(&s.control_process)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub key: SectionKey,
    pub step: usize,
    pub title: &'static str,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub sections: Vec<SectionProgress>,
}

impl Progress {
    /// Whole-number percentage, rounded down.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.completed * 100 / self.total
    }
}

pub fn progress(plan: &MarketingPlan) -> Progress {
    let sections: Vec<SectionProgress> = SectionKey::ALL
        .iter()
        .map(|&key| SectionProgress {
            key,
            step: key.index() + 1,
            title: key.title(),
            complete: is_section_complete(plan, key),
        })
        .collect();
    Progress {
        completed: sections.iter().filter(|s| s.complete).count(),
        total: sections.len(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::Objective;

    #[test]
    fn default_plan_has_nothing_complete() {
        let plan = MarketingPlan::default();
        for key in SectionKey::ALL {
            assert!(!is_section_complete(&plan, key), "{key}");
        }
        let p = progress(&plan);
        assert_eq!(p.completed, 0);
        assert_eq!(p.total, 6);
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn situation_needs_mission_and_strengths() {
        let mut plan = MarketingPlan::default();
        plan.situation_analysis.mission = "Serve".to_string();
        assert!(!is_section_complete(&plan, SectionKey::SituationAnalysis));
        plan.situation_analysis.swot.strengths = "   ".to_string();
        assert!(!is_section_complete(&plan, SectionKey::SituationAnalysis));
        plan.situation_analysis.swot.strengths = "- Fast".to_string();
        assert!(is_section_complete(&plan, SectionKey::SituationAnalysis));
    }

    #[test]
    fn markets_accepts_either_analysis_pair_or_target_markets() {
        let mut plan = MarketingPlan::default();
        plan.markets_and_customers.market_definition = "Coffee".to_string();
        assert!(!is_section_complete(&plan, SectionKey::MarketsAndCustomers));
        plan.markets_and_customers.consumer_analysis = "Commuters".to_string();
        assert!(is_section_complete(&plan, SectionKey::MarketsAndCustomers));

        let mut other = MarketingPlan::default();
        other.markets_and_customers.target_markets = "- Students".to_string();
        assert!(is_section_complete(&other, SectionKey::MarketsAndCustomers));
    }

    #[test]
    fn direction_accepts_structured_objectives() {
        let mut plan = MarketingPlan::default();
        plan.direction_and_objectives.objectives = vec![Objective {
            objective: String::new(),
            kpi: "Revenue".to_string(),
        }];
        assert!(!is_section_complete(&plan, SectionKey::DirectionAndObjectives));
        plan.direction_and_objectives.objectives[0].objective = "Grow 10%".to_string();
        assert!(is_section_complete(&plan, SectionKey::DirectionAndObjectives));
    }

    #[test]
    fn progress_counts_complete_sections() {
        let mut plan = MarketingPlan::default();
        plan.metrics_and_control.kpis = "CAC".to_string();
        plan.metrics_and_control.control_process = "Monthly review".to_string();
        plan.stp.segmentation = "Age".to_string();
        plan.stp.targeting = "25-34".to_string();
        plan.stp.positioning = "Premium".to_string();

        let p = progress(&plan);
        assert_eq!(p.completed, 2);
        assert_eq!(p.percent(), 33);
        assert!(p.sections[2].complete);
        assert_eq!(p.sections[5].step, 6);
        assert!(!p.sections[0].complete);
    }
}
