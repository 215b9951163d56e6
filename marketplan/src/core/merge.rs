//! Overlay AI suggestions onto a plan.

use crate::core::plan::MarketingPlan;
use crate::schema::plan_suggestion::PlanSuggestionResponse;

/// Render a suggestion list as plan text, one `- item` line per entry.
///
/// Blank entries are skipped; an all-blank list renders as the empty string.
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn overlay_text(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}

fn overlay_list(target: &mut String, items: &[String]) {
    let rendered = bullet_list(items);
    if !rendered.is_empty() {
        *target = rendered;
    }
}

fn overlay_entries<T: Clone>(target: &mut Vec<T>, items: &[T]) {
    if !items.is_empty() {
        *target = items.to_vec();
    }
}

/// Return `plan` with every present suggestion applied.
///
/// A suggestion is present when its section exists in the response and the
/// field is non-empty. Present fields replace the plan's value; everything
/// else keeps the plan's value. The result is built in one pass over a copy,
/// so callers either get the fully merged plan or keep the old one.
pub fn merge_suggestions(plan: &MarketingPlan, response: &PlanSuggestionResponse) -> MarketingPlan {
    let mut next = plan.clone();

    if let Some(s) = &response.situation_analysis {
        let target = &mut next.situation_analysis;
        overlay_list(&mut target.swot.strengths, &s.strengths);
        overlay_list(&mut target.swot.weaknesses, &s.weaknesses);
        overlay_list(&mut target.swot.opportunities, &s.opportunities);
        overlay_list(&mut target.swot.threats, &s.threats);
        overlay_entries(&mut target.competitors, &s.competitors);
    }

    if let Some(s) = &response.markets_and_customers {
        let target = &mut next.markets_and_customers;
        overlay_list(&mut target.target_markets, &s.target_markets);
        overlay_entries(&mut target.customer_personas, &s.customer_personas);
    }

    if let Some(s) = &response.stp {
        let target = &mut next.stp;
        overlay_list(&mut target.segmentation, &s.segmentation);
        overlay_text(&mut target.targeting, &s.targeting);
        overlay_text(&mut target.positioning, &s.positioning);
    }

    if let Some(s) = &response.direction_and_objectives {
        let target = &mut next.direction_and_objectives;
        overlay_text(&mut target.mission_statement, &s.mission_statement);
        overlay_text(&mut target.vision_statement, &s.vision_statement);
        overlay_entries(&mut target.objectives, &s.objectives);
    }

    if let Some(s) = &response.strategies_and_programs {
        let target = &mut next.strategies_and_programs;
        overlay_list(&mut target.product, &s.marketing_mix.product);
        overlay_list(&mut target.pricing, &s.marketing_mix.price);
        overlay_list(&mut target.place, &s.marketing_mix.place);
        overlay_list(&mut target.promotion, &s.marketing_mix.promotion);
        overlay_text(&mut target.aida_copy.attention, &s.aida_copy.attention);
        overlay_text(&mut target.aida_copy.interest, &s.aida_copy.interest);
        overlay_text(&mut target.aida_copy.desire, &s.aida_copy.desire);
        overlay_text(&mut target.aida_copy.action, &s.aida_copy.action);
    }

    if let Some(s) = &response.metrics_and_control {
        let target = &mut next.metrics_and_control;
        overlay_list(&mut target.kpis, &s.kpis);
        overlay_list(&mut target.control_process, &s.control_processes);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::{Competitor, Objective};
    use crate::schema::plan_suggestion::{
        DirectionSuggestions, SituationSuggestions, StpSuggestions,
    };

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bullet_list_skips_blank_entries() {
        assert_eq!(bullet_list(&strings(&["Fresh", " ", "Local "])), "- Fresh\n- Local");
        assert_eq!(bullet_list(&strings(&["", "  "])), "");
        assert_eq!(bullet_list(&[]), "");
    }

    #[test]
    fn present_fields_replace_and_absent_fields_survive() {
        let mut plan = MarketingPlan::default();
        plan.situation_analysis.mission = "Roast the best coffee".to_string();
        plan.situation_analysis.swot.weaknesses = "Small team".to_string();
        plan.stp.positioning = "Hand-made".to_string();
        plan.metrics_and_control.budget = "$2k".to_string();

        let response = PlanSuggestionResponse {
            situation_analysis: Some(SituationSuggestions {
                strengths: strings(&["Single-origin beans"]),
                competitors: vec![Competitor {
                    name: "BigBrew".to_string(),
                    analysis: "Cheap, bland".to_string(),
                }],
                ..SituationSuggestions::default()
            }),
            stp: Some(StpSuggestions {
                targeting: "Home baristas".to_string(),
                ..StpSuggestions::default()
            }),
            ..PlanSuggestionResponse::default()
        };

        let merged = merge_suggestions(&plan, &response);

        assert_eq!(merged.situation_analysis.swot.strengths, "- Single-origin beans");
        assert_eq!(merged.situation_analysis.competitors.len(), 1);
        assert_eq!(merged.stp.targeting, "Home baristas");

        assert_eq!(merged.situation_analysis.mission, "Roast the best coffee");
        assert_eq!(merged.situation_analysis.swot.weaknesses, "Small team");
        assert_eq!(merged.stp.positioning, "Hand-made");
        assert_eq!(merged.metrics_and_control, plan.metrics_and_control);
        assert_eq!(merged.title, plan.title);
        assert_eq!(merged.created_at, plan.created_at);
    }

    #[test]
    fn empty_response_is_identity() {
        let mut plan = MarketingPlan::new("Plan");
        plan.direction_and_objectives.objectives = vec![Objective {
            objective: "Grow".to_string(),
            kpi: "Revenue".to_string(),
        }];
        assert_eq!(
            merge_suggestions(&plan, &PlanSuggestionResponse::default()),
            plan
        );
    }

    #[test]
    fn empty_objective_list_keeps_existing_objectives() {
        let mut plan = MarketingPlan::default();
        plan.direction_and_objectives.objectives = vec![Objective {
            objective: "Grow".to_string(),
            kpi: "Revenue".to_string(),
        }];
        let response = PlanSuggestionResponse {
            direction_and_objectives: Some(DirectionSuggestions {
                mission_statement: "Delight every cup".to_string(),
                ..DirectionSuggestions::default()
            }),
            ..PlanSuggestionResponse::default()
        };
        let merged = merge_suggestions(&plan, &response);
        assert_eq!(merged.direction_and_objectives.objectives.len(), 1);
        assert_eq!(
            merged.direction_and_objectives.mission_statement,
            "Delight every cup"
        );
    }
}
