//! Plain-text export of a whole plan.
//!
//! The layout is fixed: a title line, then one banner-delimited block per
//! step in wizard order. Every field appears under a fixed label and empty
//! values print as `Not specified`, so the output is total over any plan and
//! byte-identical for equal plans.

use std::fmt::Write as _;

use crate::core::plan::MarketingPlan;

pub const NOT_SPECIFIED: &str = "Not specified";

const RULE: &str = "========================================";

fn banner(out: &mut String, step: usize, title: &str) {
    let _ = write!(out, "{RULE}\nSTEP {step}: {title}\n{RULE}\n\n");
}

/// `label: value`, with multi-line values moved below the label and
/// indented two columns past the label.
fn field(out: &mut String, indent: &str, label: &str, value: &str) {
    let value = value.trim();
    let pad = " ".repeat(indent.len() + 2);
    if value.is_empty() {
        let _ = writeln!(out, "{indent}{label}: {NOT_SPECIFIED}");
    } else if value.contains('\n') {
        let _ = writeln!(out, "{indent}{label}:");
        for line in value.lines() {
            let _ = writeln!(out, "{pad}{}", line.trim_end());
        }
    } else {
        let _ = writeln!(out, "{indent}{label}: {value}");
    }
}

fn block(out: &mut String, label: &str, value: &str) {
    field(out, "", label, value);
    out.push('\n');
}

fn pair(head: &str, tail: &str) -> Option<String> {
    match (head.trim(), tail.trim()) {
        ("", "") => None,
        (head, "") => Some(head.to_string()),
        ("", tail) => Some(tail.to_string()),
        (head, tail) => Some(format!("{head}: {tail}")),
    }
}

/// Labelled list; entries that are blank on both sides are skipped.
fn list(out: &mut String, label: &str, entries: impl IntoIterator<Item = Option<String>>) {
    let _ = writeln!(out, "{label}:");
    let mut any = false;
    for entry in entries.into_iter().flatten() {
        any = true;
        let _ = writeln!(out, "  - {}", entry.replace('\n', " "));
    }
    if !any {
        let _ = writeln!(out, "  - {NOT_SPECIFIED}");
    }
    out.push('\n');
}

pub fn generate_summary_text(plan: &MarketingPlan) -> String {
    let mut out = String::new();
    let title = match plan.title.trim() {
        "" => "Untitled",
        title => title,
    };
    let _ = write!(out, "MARKETING PLAN: {title}\n\n");

    let s1 = &plan.situation_analysis;
    banner(&mut out, 1, "SITUATION ANALYSIS");
    block(&mut out, "Mission", &s1.mission);
    block(&mut out, "Resources", &s1.resources);
    block(&mut out, "Offerings", &s1.offerings);
    block(&mut out, "Previous Results", &s1.previous_results);
    block(&mut out, "Business Relationships", &s1.business_relationships);
    out.push_str("SWOT Analysis:\n");
    field(&mut out, "  - ", "Strengths", &s1.swot.strengths);
    field(&mut out, "  - ", "Weaknesses", &s1.swot.weaknesses);
    field(&mut out, "  - ", "Opportunities", &s1.swot.opportunities);
    field(&mut out, "  - ", "Threats", &s1.swot.threats);
    out.push('\n');
    list(
        &mut out,
        "Competitors",
        s1.competitors.iter().map(|c| pair(&c.name, &c.analysis)),
    );

    let s2 = &plan.markets_and_customers;
    banner(&mut out, 2, "MARKETS & CUSTOMERS");
    block(&mut out, "Market Definition", &s2.market_definition);
    block(&mut out, "Market Share", &s2.market_share);
    block(&mut out, "Consumer Market Analysis", &s2.consumer_analysis);
    block(&mut out, "Business Market Analysis", &s2.business_analysis);
    block(&mut out, "Target Markets", &s2.target_markets);
    list(
        &mut out,
        "Customer Personas",
        s2.customer_personas
            .iter()
            .map(|p| pair(&p.name, &p.description)),
    );

    let s3 = &plan.stp;
    banner(&mut out, 3, "SEGMENTATION, TARGETING, POSITIONING");
    block(&mut out, "Segmentation", &s3.segmentation);
    block(&mut out, "Targeting", &s3.targeting);
    block(&mut out, "Positioning", &s3.positioning);

    let s4 = &plan.direction_and_objectives;
    banner(&mut out, 4, "DIRECTION & OBJECTIVES");
    block(
        &mut out,
        "Strategic Direction",
        s4.direction.map(|d| d.as_str()).unwrap_or_default(),
    );
    block(&mut out, "Mission Statement", &s4.mission_statement);
    block(&mut out, "Vision Statement", &s4.vision_statement);
    block(&mut out, "Marketing Objectives", &s4.marketing_objectives);
    block(&mut out, "Financial Objectives", &s4.financial_objectives);
    block(&mut out, "Societal Objectives", &s4.societal_objectives);
    block(&mut out, "Customer Service", &s4.customer_service);
    block(&mut out, "Internal Marketing", &s4.internal_marketing);
    list(
        &mut out,
        "SMART Objectives",
        s4.objectives.iter().map(|o| {
            let kpi = o.kpi.trim();
            match (o.objective.trim(), kpi) {
                ("", "") => None,
                (objective, "") => Some(objective.to_string()),
                (objective, kpi) => Some(format!("{objective} (KPI: {kpi})")),
            }
        }),
    );

    let s5 = &plan.strategies_and_programs;
    banner(&mut out, 5, "STRATEGIES & PROGRAMS (THE 4 Ps)");
    block(&mut out, "Product", &s5.product);
    block(&mut out, "Price", &s5.pricing);
    block(&mut out, "Place", &s5.place);
    block(&mut out, "Promotion", &s5.promotion);
    out.push_str("AIDA Copy:\n");
    field(&mut out, "  - ", "Attention", &s5.aida_copy.attention);
    field(&mut out, "  - ", "Interest", &s5.aida_copy.interest);
    field(&mut out, "  - ", "Desire", &s5.aida_copy.desire);
    field(&mut out, "  - ", "Action", &s5.aida_copy.action);
    out.push('\n');

    let s6 = &plan.metrics_and_control;
    banner(&mut out, 6, "METRICS & CONTROL");
    block(&mut out, "KPIs & Metrics", &s6.kpis);
    block(&mut out, "Control Process", &s6.control_process);
    block(&mut out, "Budget", &s6.budget);
    field(&mut out, "", "Contingency Plans", &s6.contingency);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::{Competitor, Direction};

    /// Scalar fields plus one placeholder per empty list.
    const EMPTY_PLAN_PLACEHOLDERS: usize = 10 + 6 + 3 + 9 + 8 + 4;

    #[test]
    fn empty_plan_prints_placeholder_for_every_field() {
        let text = generate_summary_text(&MarketingPlan::default());
        assert!(text.starts_with("MARKETING PLAN: Untitled\n\n"));
        assert_eq!(text.matches(NOT_SPECIFIED).count(), EMPTY_PLAN_PLACEHOLDERS);
        for step in 1..=6 {
            assert!(text.contains(&format!("STEP {step}: ")), "step {step}");
        }
        assert!(text.ends_with("Contingency Plans: Not specified\n"));
    }

    #[test]
    fn filled_fields_replace_placeholders() {
        let mut plan = MarketingPlan::new("Coffee Co");
        plan.situation_analysis.mission = "Great coffee".to_string();
        plan.direction_and_objectives.direction = Some(Direction::Growth);
        plan.situation_analysis.competitors = vec![Competitor {
            name: "BigBrew".to_string(),
            analysis: "Cheap".to_string(),
        }];

        let text = generate_summary_text(&plan);
        assert!(text.starts_with("MARKETING PLAN: Coffee Co\n\n"));
        assert!(text.contains("Mission: Great coffee\n\n"));
        assert!(text.contains("Strategic Direction: Growth\n"));
        assert!(text.contains("Competitors:\n  - BigBrew: Cheap\n"));
        assert_eq!(
            text.matches(NOT_SPECIFIED).count(),
            EMPTY_PLAN_PLACEHOLDERS - 3
        );
    }

    #[test]
    fn multiline_values_are_indented_under_label() {
        let mut plan = MarketingPlan::default();
        plan.situation_analysis.swot.strengths = "- Fresh\n- Local".to_string();
        plan.strategies_and_programs.product = "- Beans\n- Mugs".to_string();

        let text = generate_summary_text(&plan);
        assert!(text.contains("  - Strengths:\n      - Fresh\n      - Local\n"));
        assert!(text.contains("Product:\n  - Beans\n  - Mugs\n\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let mut plan = MarketingPlan::default();
        plan.stp.targeting = "Students".to_string();
        assert_eq!(generate_summary_text(&plan), generate_summary_text(&plan.clone()));
    }
}
