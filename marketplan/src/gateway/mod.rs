//! Generation gateway: typed requests in, schema-checked replies out.
//!
//! Every call follows the same steps: validate the request, render the
//! use case's prompt, submit prompt and output schema to the [`ModelClient`],
//! check the reply against the output schema and deserialize it. There is a
//! single attempt per call; no retries and no caching.

pub mod client;
pub mod http;
pub mod prompt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

pub use client::{ModelClient, ModelError, ModelRequest};
pub use http::HttpModelClient;
pub use prompt::PromptEngine;

use crate::schema::copy::{CopyRequest, CopyResponse};
use crate::schema::output::{
    COPY_OUTPUT, OutputSchema, PLAN_SUGGESTIONS_OUTPUT, SECTION_SUGGESTION_OUTPUT,
};
use crate::schema::plan_suggestion::{PlanSuggestionRequest, PlanSuggestionResponse};
use crate::schema::section_suggestion::{SectionSuggestionRequest, SectionSuggestionResponse};
use crate::schema::validation::{Validate, ValidationError};

/// The three generation use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    Copy,
    PlanSuggestions,
    SectionSuggestion,
}

impl UseCase {
    pub fn as_str(self) -> &'static str {
        match self {
            UseCase::Copy => "copy",
            UseCase::PlanSuggestions => "plan_suggestions",
            UseCase::SectionSuggestion => "section_suggestion",
        }
    }

    fn output_schema(self) -> OutputSchema {
        match self {
            UseCase::Copy => COPY_OUTPUT,
            UseCase::PlanSuggestions => PLAN_SUGGESTIONS_OUTPUT,
            UseCase::SectionSuggestion => SECTION_SUGGESTION_OUTPUT,
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            UseCase::Copy => "Sorry, I couldn't generate copy at this time. Please try again.",
            UseCase::PlanSuggestions => "Failed to generate suggestions.",
            UseCase::SectionSuggestion => "Sorry, I couldn't get suggestions at this time.",
        }
    }
}

pub const INVALID_OUTPUT_MESSAGE: &str = "The AI returned an empty or invalid result.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("render {} prompt: {message}", .use_case.as_str())]
    Prompt { use_case: UseCase, message: String },
    #[error("{} generation failed: {source}", .use_case.as_str())]
    Failed {
        use_case: UseCase,
        #[source]
        source: ModelError,
    },
    #[error("{} output rejected: {}", .use_case.as_str(), .problems.join("; "))]
    InvalidOutput {
        use_case: UseCase,
        problems: Vec<String>,
    },
}

impl GenerationError {
    /// One sentence suitable for showing to the person using the app.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(err) => err.to_string(),
            GenerationError::Prompt { use_case, .. } | GenerationError::Failed { use_case, .. } => {
                use_case.failure_message().to_string()
            }
            GenerationError::InvalidOutput { .. } => INVALID_OUTPUT_MESSAGE.to_string(),
        }
    }
}

/// Front door to the generative model.
pub struct Gateway<C> {
    client: C,
    prompts: PromptEngine,
}

impl<C: ModelClient> Gateway<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            prompts: PromptEngine::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    #[instrument(skip_all, fields(use_case = "copy"))]
    pub fn generate_copy(&self, request: &CopyRequest) -> Result<CopyResponse, GenerationError> {
        request.validate()?;
        let prompt = self
            .prompts
            .render_copy(request)
            .map_err(|err| prompt_error(UseCase::Copy, &err))?;
        self.invoke(UseCase::Copy, prompt)
    }

    #[instrument(skip_all, fields(use_case = "plan_suggestions"))]
    pub fn generate_plan_suggestions(
        &self,
        request: &PlanSuggestionRequest,
    ) -> Result<PlanSuggestionResponse, GenerationError> {
        request.validate()?;
        let prompt = self
            .prompts
            .render_plan_suggestions(request)
            .map_err(|err| prompt_error(UseCase::PlanSuggestions, &err))?;
        self.invoke(UseCase::PlanSuggestions, prompt)
    }

    #[instrument(skip_all, fields(use_case = "section_suggestion", section = %request.section_title))]
    pub fn suggest_for_section(
        &self,
        request: &SectionSuggestionRequest,
    ) -> Result<SectionSuggestionResponse, GenerationError> {
        request.validate()?;
        let prompt = self
            .prompts
            .render_section_suggestion(request)
            .map_err(|err| prompt_error(UseCase::SectionSuggestion, &err))?;
        self.invoke(UseCase::SectionSuggestion, prompt)
    }

    fn invoke<T: DeserializeOwned>(
        &self,
        use_case: UseCase,
        prompt: String,
    ) -> Result<T, GenerationError> {
        let schema = use_case.output_schema();
        let request = ModelRequest {
            name: schema.name,
            prompt,
            output_schema: schema,
        };
        debug!(prompt_bytes = request.prompt.len(), "submitting prompt");

        let reply = self.client.generate(&request).map_err(|err| {
            warn!(error = %err, "model call failed");
            if err.is_output_error() {
                GenerationError::InvalidOutput {
                    use_case,
                    problems: vec![err.to_string()],
                }
            } else {
                GenerationError::Failed {
                    use_case,
                    source: err,
                }
            }
        })?;

        let parsed = check_reply(use_case, &schema, reply).inspect_err(|err| {
            warn!(error = %err, "model output rejected");
        })?;
        info!("generation succeeded");
        Ok(parsed)
    }
}

fn prompt_error(use_case: UseCase, err: &minijinja::Error) -> GenerationError {
    GenerationError::Prompt {
        use_case,
        message: err.to_string(),
    }
}

fn check_reply<T: DeserializeOwned>(
    use_case: UseCase,
    schema: &OutputSchema,
    reply: Value,
) -> Result<T, GenerationError> {
    let invalid = |problems: Vec<String>| GenerationError::InvalidOutput { use_case, problems };
    if reply.is_null() || reply.as_object().is_some_and(serde_json::Map::is_empty) {
        return Err(invalid(vec!["empty reply".to_string()]));
    }
    schema.check(&reply).map_err(invalid)?;
    serde_json::from_value(reply).map_err(|err| invalid(vec![err.to_string()]))
}
