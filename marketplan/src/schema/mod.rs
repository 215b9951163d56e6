//! Request and response shapes for each generation use case.
//!
//! Requests are validated field by field before dispatch ([`Validate`]);
//! model output is checked against the JSON Schemas in `schemas/`
//! ([`OutputSchema`]) before it is deserialized into a response type.

pub mod copy;
pub mod output;
pub mod plan_suggestion;
pub mod section_suggestion;
pub mod validation;

pub use copy::{CopyRequest, CopyResponse, EmailCopy, FacebookAd, GoogleAds, LandingPage};
pub use output::{COPY_OUTPUT, OutputSchema, PLAN_SUGGESTIONS_OUTPUT, SECTION_SUGGESTION_OUTPUT};
pub use plan_suggestion::{
    DirectionSuggestions, MarketingMix, MarketsSuggestions, MetricsSuggestions,
    PlanSuggestionRequest, PlanSuggestionResponse, SituationSuggestions, StpSuggestions,
    StrategySuggestions,
};
pub use section_suggestion::{ExistingContent, SectionSuggestionRequest, SectionSuggestionResponse};
pub use validation::{Constraint, FieldViolation, Validate, ValidationError};
