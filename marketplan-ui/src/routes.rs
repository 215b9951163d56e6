//! HTTP route handlers for the planner API.
//!
//! Handlers lock the session only to read or apply state. Model calls run on
//! a blocking thread with the lock released; their results are applied when
//! they arrive, even if the plan was edited in the meantime.

use anyhow::anyhow;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post};
use marketplan::builder::SuggestError;
use marketplan::core::plan::MarketingPlan;
use marketplan::core::progress::Progress;
use marketplan::core::steps::{StepView, steps};
use marketplan::core::types::{PlanError, SectionKey};
use marketplan::gateway::{Gateway, GenerationError, ModelClient};
use marketplan::project::Project;
use marketplan::schema::copy::{CopyRequest, CopyResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::state::{AppState, ChangeEvent};

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/steps", get(list_steps))
        .route("/plan", get(get_plan).post(new_plan))
        .route("/plan/field", patch(edit_field))
        .route("/plan/items", post(append_item).delete(remove_item))
        .route("/plan/generate", post(generate_plan))
        .route("/plan/summary", get(get_summary))
        .route("/plan/progress", get(get_progress))
        .route("/sections/{key}/suggest", post(suggest_for_section))
        .route("/copy", post(generate_copy))
        .route("/wizard/step", get(get_step).put(change_step))
}

/// Error body: `{"error": "...", "details": [...]}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Vec<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        error!(error = %format!("{err:#}"), "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message, "details": self.details });
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: "invalid request body".to_string(),
            details: vec![rejection.body_text()],
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match &err {
            GenerationError::Validation(validation) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: validation.to_string(),
                details: validation
                    .violations
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            GenerationError::Prompt { .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.user_message(),
                details: vec![err.to_string()],
            },
            GenerationError::Failed { .. } | GenerationError::InvalidOutput { .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: err.user_message(),
                details: vec![err.to_string()],
            },
        }
    }
}

impl From<SuggestError> for ApiError {
    fn from(err: SuggestError) -> Self {
        match err {
            SuggestError::Plan(err) => err.into(),
            SuggestError::NotSuggestable { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            SuggestError::Generation(err) => err.into(),
        }
    }
}

/// Run one model call on a blocking thread with a fresh client.
async fn with_model<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Gateway<Box<dyn ModelClient>>) -> Result<T, GenerationError> + Send + 'static,
{
    let factory = state.client_factory.clone();
    tokio::task::spawn_blocking(move || {
        let client = factory().map_err(ApiError::internal)?;
        call(&Gateway::new(client)).map_err(ApiError::from)
    })
    .await
    .map_err(|err| ApiError::internal(anyhow!(err)))?
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanView {
    plan_id: String,
    plan: MarketingPlan,
    current_step: usize,
    business_description: String,
    progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    persistence_warning: Option<String>,
}

fn plan_view(project: &Project) -> PlanView {
    let builder = &project.builder;
    PlanView {
        plan_id: project
            .plan_key()
            .map(|key| key.plan_id.clone())
            .unwrap_or_default(),
        plan: builder.plan().clone(),
        current_step: builder.current_step(),
        business_description: builder.business_description().to_string(),
        progress: builder.progress(),
        persistence_warning: builder.persistence_warning().map(str::to_string),
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let project = state.project.lock().await;
    let store = project
        .builder
        .sync()
        .map(|sync| sync.store().backend())
        .unwrap_or("none");
    Json(json!({ "status": "ok", "store": store }))
}

/// GET /api/steps - the six step descriptors with their field specs.
async fn list_steps() -> Json<Vec<StepView>> {
    Json(steps())
}

async fn get_plan(State(state): State<AppState>) -> Json<PlanView> {
    Json(plan_view(&*state.project.lock().await))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct NewPlan {
    title: String,
}

/// POST /api/plan - start a new, empty plan.
async fn new_plan(
    State(state): State<AppState>,
    Json(body): Json<NewPlan>,
) -> Result<Json<PlanView>, ApiError> {
    let mut project = state.project.lock().await;
    let key = project
        .start_new_plan(body.title)
        .map_err(ApiError::internal)?
        .clone();
    info!(plan_id = %key.plan_id, "started new plan");
    state.remember(&project);
    crate::sse::bridge_store_updates(&state, &project);
    state.notify(ChangeEvent::PlanChanged);
    state.notify(ChangeEvent::StepChanged);
    Ok(Json(plan_view(&project)))
}

#[derive(Deserialize)]
struct FieldEdit {
    section: SectionKey,
    path: String,
    value: Value,
}

/// PATCH /api/plan/field - set one field.
async fn edit_field(
    State(state): State<AppState>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<PlanView>, ApiError> {
    let mut project = state.project.lock().await;
    project.builder.edit(edit.section, &edit.path, edit.value)?;
    Ok(Json(plan_view(&project)))
}

#[derive(Deserialize)]
struct ListItem {
    section: SectionKey,
    path: String,
    #[serde(default)]
    index: Option<usize>,
}

/// POST /api/plan/items - append an empty item to a list field.
async fn append_item(
    State(state): State<AppState>,
    Json(item): Json<ListItem>,
) -> Result<Json<PlanView>, ApiError> {
    let mut project = state.project.lock().await;
    project.builder.append_item(item.section, &item.path)?;
    Ok(Json(plan_view(&project)))
}

/// DELETE /api/plan/items - remove the item at `index` from a list field.
async fn remove_item(
    State(state): State<AppState>,
    Json(item): Json<ListItem>,
) -> Result<Json<PlanView>, ApiError> {
    let index = item
        .index
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "index is required"))?;
    let mut project = state.project.lock().await;
    project.builder.remove_item(item.section, &item.path, index)?;
    Ok(Json(plan_view(&project)))
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GeneratePlan {
    business_description: Option<String>,
}

/// POST /api/plan/generate - fill every section from the business description.
async fn generate_plan(
    State(state): State<AppState>,
    Json(body): Json<GeneratePlan>,
) -> Result<Json<PlanView>, ApiError> {
    let request = {
        let mut project = state.project.lock().await;
        if let Some(description) = body.business_description {
            project.builder.set_business_description(description);
            state.remember(&project);
        }
        project.builder.plan_request()
    };

    let response = with_model(&state, move |gateway| {
        gateway.generate_plan_suggestions(&request)
    })
    .await?;

    let mut project = state.project.lock().await;
    project.builder.apply_suggestions(&response);
    info!("applied plan suggestions");
    Ok(Json(plan_view(&project)))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SuggestBody {
    path: Option<String>,
}

#[derive(Serialize)]
struct Suggestion {
    suggestions: String,
}

/// POST /api/sections/{key}/suggest - advice for one field or a whole section.
async fn suggest_for_section(
    State(state): State<AppState>,
    Path(key): Path<SectionKey>,
    Json(body): Json<SuggestBody>,
) -> Result<Json<Suggestion>, ApiError> {
    let request = {
        let project = state.project.lock().await;
        project.builder.section_request(key, body.path.as_deref())?
    };
    let response = with_model(&state, move |gateway| gateway.suggest_for_section(&request)).await?;
    Ok(Json(Suggestion {
        suggestions: response.suggestions,
    }))
}

/// POST /api/copy - ad, landing page and email copy.
async fn generate_copy(
    State(state): State<AppState>,
    payload: Result<Json<CopyRequest>, JsonRejection>,
) -> Result<Json<CopyResponse>, ApiError> {
    let Json(request) = payload?;
    let copy = with_model(&state, move |gateway| gateway.generate_copy(&request)).await?;
    Ok(Json(copy))
}

async fn get_summary(State(state): State<AppState>) -> String {
    state.project.lock().await.builder.summary()
}

async fn get_progress(State(state): State<AppState>) -> Json<Progress> {
    Json(state.project.lock().await.builder.progress())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepState {
    step: usize,
    is_first: bool,
    is_last: bool,
    view: StepView,
}

fn step_state(project: &Project) -> StepState {
    let builder = &project.builder;
    StepState {
        step: builder.current_step(),
        is_first: builder.is_first_step(),
        is_last: builder.is_last_step(),
        view: builder.current_view(),
    }
}

async fn get_step(State(state): State<AppState>) -> Json<StepState> {
    Json(step_state(&*state.project.lock().await))
}

/// `"next"`, `"previous"` or `{"go": <zero-based step>}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum StepChange {
    Next,
    Previous,
    Go(usize),
}

/// PUT /api/wizard/step - move through the wizard.
async fn change_step(
    State(state): State<AppState>,
    Json(change): Json<StepChange>,
) -> Result<Json<StepState>, ApiError> {
    let mut project = state.project.lock().await;
    match change {
        StepChange::Next => {
            project.builder.next();
        }
        StepChange::Previous => {
            project.builder.previous();
        }
        StepChange::Go(step) => project.builder.go_to(step)?,
    }
    state.remember(&project);
    state.notify(ChangeEvent::StepChanged);
    Ok(Json(step_state(&project)))
}
