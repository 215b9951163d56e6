//! End-to-end generation scenarios with a scripted model.
//!
//! Exercises the gateway and plan builder together: prompts go out, replies
//! come back through schema checks, and the plan is merged or left alone.

use std::sync::Arc;

use marketplan::builder::{PlanBuilder, PlanSync};
use marketplan::core::progress::is_section_complete;
use marketplan::core::types::SectionKey;
use marketplan::gateway::{Gateway, GenerationError, ModelError};
use marketplan::io::store::{DocumentStore, MemoryStore, PlanKey};
use marketplan::test_support::{
    COFFEE_DESCRIPTION, ScriptedModelClient, coffee_plan_reply, section_reply,
    widget_copy_reply, widget_copy_request,
};
use serde_json::json;

#[test]
fn widget_copy_has_every_part() {
    let gateway = Gateway::new(ScriptedModelClient::replying(widget_copy_reply()));
    let copy = gateway
        .generate_copy(&widget_copy_request())
        .expect("copy");

    assert!(!copy.facebook_ad.headline.is_empty());
    assert!(!copy.facebook_ad.body.is_empty());
    assert!(copy.google_ads.headlines.len() >= 3);
    assert!(copy.google_ads.descriptions.len() >= 2);
    assert!(!copy.landing_page.hero_title.is_empty());
    assert!(!copy.landing_page.hero_subtitle.is_empty());
    assert!(!copy.email.subject.is_empty());
    assert!(!copy.email.body.is_empty());

    let requests = gateway.client().requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Widget"));
    assert!(requests[0].prompt.contains("busy parents"));
}

#[test]
fn copy_missing_headlines_is_rejected() {
    let mut reply = widget_copy_reply();
    reply["googleAds"]["headlines"] = json!([]);
    let gateway = Gateway::new(ScriptedModelClient::replying(reply));

    let err = gateway.generate_copy(&widget_copy_request()).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidOutput { .. }), "{err}");
}

/// Verifies a generated plan is merged into every section and pushed to the store.
#[test]
fn generated_plan_fills_all_sections() {
    let store = Arc::new(MemoryStore::new());
    let key = PlanKey::new("app", "user", "plan-1");
    let mut builder =
        marketplan_builder(PlanSync::new(store.clone(), key.clone()), COFFEE_DESCRIPTION);
    builder
        .edit(SectionKey::SituationAnalysis, "mission", json!("Roast with care"))
        .expect("edit");
    let gateway = Gateway::new(ScriptedModelClient::replying(coffee_plan_reply()));

    builder.generate_plan(&gateway).expect("generate");

    let plan = builder.plan();
    assert_eq!(plan.situation_analysis.mission, "Roast with care");
    assert_eq!(plan.situation_analysis.competitors[0].name, "BigBrew");
    assert!(plan.markets_and_customers.target_markets.contains("Home baristas"));
    assert_eq!(plan.stp.targeting, "Home baristas who value traceability.");
    assert_eq!(
        plan.direction_and_objectives.objectives[0].kpi,
        "Active subscriptions"
    );
    assert_eq!(
        plan.strategies_and_programs.aida_copy.action,
        "Start your first box today."
    );
    assert!(plan.metrics_and_control.kpis.contains("Subscription churn"));
    for key in SectionKey::ALL {
        assert!(is_section_complete(plan, key), "{key} incomplete");
    }

    let stored = store.get(&key).expect("get").expect("stored");
    assert_eq!(&stored, builder.plan());
}

#[test]
fn model_failure_leaves_plan_unchanged() {
    let mut builder = marketplan_builder(
        PlanSync::new(Arc::new(MemoryStore::new()), PlanKey::new("app", "user", "p")),
        COFFEE_DESCRIPTION,
    );
    builder
        .edit(SectionKey::Stp, "targeting", json!("Students"))
        .expect("edit");
    let before = builder.plan().clone();
    let gateway = Gateway::new(ScriptedModelClient::failing(ModelError::Service {
        status: 500,
        message: "overloaded".to_string(),
    }));

    let err = builder.generate_plan(&gateway).unwrap_err();
    assert!(matches!(err, GenerationError::Failed { .. }));
    assert_eq!(err.user_message(), "Failed to generate suggestions.");
    assert_eq!(builder.plan(), &before);
}

#[test]
fn blank_description_is_refused_before_the_model() {
    let mut builder = PlanBuilder::default();
    let gateway = Gateway::new(ScriptedModelClient::replying(coffee_plan_reply()));

    let err = builder.generate_plan(&gateway).unwrap_err();
    assert!(matches!(err, GenerationError::Validation(_)));
    assert_eq!(gateway.client().call_count(), 0);
}

#[test]
fn field_suggestion_never_mutates_the_plan() {
    let mut builder = PlanBuilder::default();
    builder
        .edit(SectionKey::Stp, "positioning", json!("Premium"))
        .expect("edit");
    let before = builder.plan().clone();
    let gateway = Gateway::new(ScriptedModelClient::replying(section_reply(
        "Name the farms you buy from.",
    )));

    let text = builder
        .suggest_for_field(&gateway, SectionKey::Stp, Some("positioning"))
        .expect("suggest");

    assert_eq!(text, "Name the farms you buy from.");
    assert_eq!(builder.plan(), &before);
    let prompt = &gateway.client().requests()[0].prompt;
    assert!(prompt.contains("Positioning"));
    assert!(prompt.contains("Premium"));
}

fn marketplan_builder(sync: PlanSync, description: &str) -> PlanBuilder {
    let mut builder = PlanBuilder::default().with_sync(sync);
    builder.set_business_description(description);
    builder
}
