//! Prompt rendering for each generation use case.

use minijinja::{Environment, context};

use crate::schema::copy::CopyRequest;
use crate::schema::plan_suggestion::PlanSuggestionRequest;
use crate::schema::section_suggestion::SectionSuggestionRequest;

const COPY_TEMPLATE: &str = include_str!("prompts/copy.md");
const PLAN_SUGGESTIONS_TEMPLATE: &str = include_str!("prompts/plan_suggestions.md");
const SECTION_SUGGESTION_TEMPLATE: &str = include_str!("prompts/section_suggestion.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("copy", COPY_TEMPLATE)
            .expect("copy template should be valid");
        env.add_template("plan_suggestions", PLAN_SUGGESTIONS_TEMPLATE)
            .expect("plan suggestions template should be valid");
        env.add_template("section_suggestion", SECTION_SUGGESTION_TEMPLATE)
            .expect("section suggestion template should be valid");
        Self { env }
    }

    pub fn render_copy(&self, request: &CopyRequest) -> Result<String, minijinja::Error> {
        self.env.get_template("copy")?.render(context! {
            product_name => request.product_name.trim(),
            product_description => request.product_description.trim(),
            target_audience => request.target_audience.trim(),
        })
    }

    pub fn render_plan_suggestions(
        &self,
        request: &PlanSuggestionRequest,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("plan_suggestions")?.render(context! {
            business_description => request.business_description.trim(),
        })
    }

    pub fn render_section_suggestion(
        &self,
        request: &SectionSuggestionRequest,
    ) -> Result<String, minijinja::Error> {
        let content = &request.existing_content;
        self.env.get_template("section_suggestion")?.render(context! {
            section_title => request.section_title.trim(),
            existing_content => (!content.is_empty()).then(|| content.render()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::section_suggestion::ExistingContent;
    use serde_json::json;

    #[test]
    fn copy_prompt_includes_product_details() {
        let prompt = PromptEngine::new()
            .render_copy(&CopyRequest {
                product_name: " Widget ".to_string(),
                product_description: "A useful widget for home organization".to_string(),
                target_audience: "busy parents".to_string(),
            })
            .expect("render");
        assert!(prompt.contains("- Name: Widget\n"));
        assert!(prompt.contains("busy parents"));
        assert!(prompt.contains("3 to 5 short, punchy headlines"));
    }

    #[test]
    fn plan_prompt_includes_description() {
        let prompt = PromptEngine::new()
            .render_plan_suggestions(&PlanSuggestionRequest {
                business_description: "A neighborhood coffee roaster".to_string(),
            })
            .expect("render");
        assert!(prompt.contains("A neighborhood coffee roaster"));
    }

    #[test]
    fn section_prompt_switches_on_existing_content() {
        let engine = PromptEngine::new();
        let empty = engine
            .render_section_suggestion(&SectionSuggestionRequest {
                section_title: "Targeting".to_string(),
                existing_content: ExistingContent::default(),
            })
            .expect("render");
        assert!(empty.contains("has not written anything yet"));
        assert!(empty.contains("starting draft"));

        let structured = engine
            .render_section_suggestion(&SectionSuggestionRequest {
                section_title: "SWOT".to_string(),
                existing_content: ExistingContent::from_value(json!({
                    "weaknesses": "Small team",
                    "strengths": "Fresh beans"
                })),
            })
            .expect("render");
        assert!(structured.contains("\"strengths\": \"Fresh beans\""));
        assert!(structured.contains("improvements"));
        let strengths = structured.find("strengths").expect("strengths");
        let weaknesses = structured.find("weaknesses").expect("weaknesses");
        assert!(strengths < weaknesses);

        let blank = engine
            .render_section_suggestion(&SectionSuggestionRequest {
                section_title: "Competitors".to_string(),
                existing_content: ExistingContent::from_value(json!([])),
            })
            .expect("render");
        assert!(blank.contains("starting draft"));
        assert!(!blank.contains("improvements"));
    }
}
