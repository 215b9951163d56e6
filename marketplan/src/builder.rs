//! Wizard orchestration: current step, business description and plan.
//!
//! [`PlanBuilder`] owns the plan value. Edits go through the pure store
//! functions in [`crate::core`]; a successful edit replaces the plan and, with
//! a [`PlanSync`] attached, is pushed to the document store. Store failures
//! are logged and remembered but never roll the plan back.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::field_update::{append_item, read_field, remove_item, update_field};
use crate::core::merge::merge_suggestions;
use crate::core::plan::MarketingPlan;
use crate::core::progress::{Progress, progress};
use crate::core::section::{PlanSection, get_section};
use crate::core::steps::{StepView, step_view};
use crate::core::summary::generate_summary_text;
use crate::core::types::{PlanError, SectionKey};
use crate::gateway::{Gateway, GenerationError, ModelClient};
use crate::io::store::{DocumentStore, PlanKey};
use crate::schema::plan_suggestion::{PlanSuggestionRequest, PlanSuggestionResponse};
use crate::schema::section_suggestion::{ExistingContent, SectionSuggestionRequest};

/// Index of the last wizard step.
pub const LAST_STEP: usize = SectionKey::ALL.len() - 1;

/// Best-effort link between a builder and a stored document.
#[derive(Clone)]
pub struct PlanSync {
    store: Arc<dyn DocumentStore>,
    key: PlanKey,
}

impl PlanSync {
    pub fn new(store: Arc<dyn DocumentStore>, key: PlanKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &PlanKey {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Stored plan for this key, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<MarketingPlan> {
        match self.store.get(&self.key) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(kind = "persistence_failure", key = %self.key, error = %err, "could not load stored plan");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("'{path}' in {section} does not offer suggestions")]
    NotSuggestable { section: SectionKey, path: String },
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub struct PlanBuilder {
    current_step: usize,
    business_description: String,
    plan: MarketingPlan,
    sync: Option<PlanSync>,
    persistence_warning: Option<String>,
}

impl PlanBuilder {
    pub fn new(plan: MarketingPlan) -> Self {
        Self {
            current_step: 0,
            business_description: String::new(),
            plan,
            sync: None,
            persistence_warning: None,
        }
    }

    pub fn with_sync(mut self, sync: PlanSync) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn sync(&self) -> Option<&PlanSync> {
        self.sync.as_ref()
    }

    pub fn plan(&self) -> &MarketingPlan {
        &self.plan
    }

    /// Last store failure, cleared by the next successful push.
    pub fn persistence_warning(&self) -> Option<&str> {
        self.persistence_warning.as_deref()
    }

    // Navigation.

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_key(&self) -> SectionKey {
        SectionKey::ALL[self.current_step]
    }

    pub fn current_view(&self) -> StepView {
        step_view(self.current_key())
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == LAST_STEP
    }

    /// Advance one step; stays put on the last step.
    pub fn next(&mut self) -> usize {
        self.current_step = (self.current_step + 1).min(LAST_STEP);
        self.current_step
    }

    /// Go back one step; stays put on the first step.
    pub fn previous(&mut self) -> usize {
        self.current_step = self.current_step.saturating_sub(1);
        self.current_step
    }

    pub fn go_to(&mut self, step: usize) -> Result<(), PlanError> {
        if step > LAST_STEP {
            return Err(PlanError::StepOutOfRange(step));
        }
        self.current_step = step;
        Ok(())
    }

    // Business description.

    pub fn business_description(&self) -> &str {
        &self.business_description
    }

    pub fn set_business_description(&mut self, text: impl Into<String>) {
        self.business_description = text.into();
    }

    // Editing.

    pub fn section(&self, key: SectionKey) -> PlanSection {
        get_section(&self.plan, key)
    }

    pub fn read(&self, key: SectionKey, path: &str) -> Result<Value, PlanError> {
        read_field(&self.plan, key, path)
    }

    #[instrument(skip(self, value), fields(section = %key))]
    pub fn edit(&mut self, key: SectionKey, path: &str, value: Value) -> Result<(), PlanError> {
        let next = update_field(&self.plan, key, path, value)?;
        self.commit(next);
        Ok(())
    }

    pub fn append_item(&mut self, key: SectionKey, list_path: &str) -> Result<(), PlanError> {
        let next = append_item(&self.plan, key, list_path)?;
        self.commit(next);
        Ok(())
    }

    pub fn remove_item(
        &mut self,
        key: SectionKey,
        list_path: &str,
        index: usize,
    ) -> Result<(), PlanError> {
        let next = remove_item(&self.plan, key, list_path, index)?;
        self.commit(next);
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let mut next = self.plan.clone();
        next.title = title.into();
        self.commit(next);
    }

    /// Start over with an empty plan; the wizard returns to step one.
    pub fn new_plan(&mut self, title: impl Into<String>) {
        self.current_step = 0;
        self.commit(MarketingPlan::new(title));
    }

    /// Adopt a plan that came from elsewhere (e.g. a store update) without
    /// pushing it back.
    pub fn replace_plan(&mut self, plan: MarketingPlan) {
        self.plan = plan;
    }

    // Generation.

    pub fn plan_request(&self) -> PlanSuggestionRequest {
        PlanSuggestionRequest {
            business_description: self.business_description.clone(),
        }
    }

    /// Merge a whole-plan suggestion response into the plan.
    pub fn apply_suggestions(&mut self, response: &PlanSuggestionResponse) {
        let next = merge_suggestions(&self.plan, response);
        self.commit(next);
    }

    /// Generate suggestions for every section and merge them.
    ///
    /// Requires a business description. On failure the plan is unchanged.
    pub fn generate_plan<C: ModelClient>(
        &mut self,
        gateway: &Gateway<C>,
    ) -> Result<(), GenerationError> {
        let response = gateway.generate_plan_suggestions(&self.plan_request())?;
        self.apply_suggestions(&response);
        info!("merged plan suggestions");
        Ok(())
    }

    /// Build the request for a per-field suggestion.
    ///
    /// With `path`, the field must be one the step view marks as
    /// suggestable; without, the whole section is sent as structured content.
    pub fn section_request(
        &self,
        key: SectionKey,
        path: Option<&str>,
    ) -> Result<SectionSuggestionRequest, SuggestError> {
        let Some(path) = path else {
            let fields = self.section(key).to_value().map_err(|err| PlanError::InvalidValue {
                path: key.to_string(),
                reason: err.to_string(),
            })?;
            return Ok(SectionSuggestionRequest {
                section_title: key.title().to_string(),
                existing_content: ExistingContent::from_value(fields),
            });
        };

        let view = step_view(key);
        let spec = view
            .field(path)
            .filter(|spec| spec.suggest)
            .ok_or_else(|| SuggestError::NotSuggestable {
                section: key,
                path: path.to_string(),
            })?;
        let current = self.read(key, path)?;
        Ok(SectionSuggestionRequest {
            section_title: format!("{}: {}", key.title(), spec.label),
            existing_content: ExistingContent::from_value(current),
        })
    }

    /// Ask the model how to improve one field (or a whole section).
    ///
    /// Returns the suggestion text; the plan is never modified.
    pub fn suggest_for_field<C: ModelClient>(
        &self,
        gateway: &Gateway<C>,
        key: SectionKey,
        path: Option<&str>,
    ) -> Result<String, SuggestError> {
        let request = self.section_request(key, path)?;
        let response = gateway.suggest_for_section(&request)?;
        Ok(response.suggestions)
    }

    // Read-only views.

    pub fn summary(&self) -> String {
        generate_summary_text(&self.plan)
    }

    pub fn progress(&self) -> Progress {
        progress(&self.plan)
    }

    fn commit(&mut self, plan: MarketingPlan) {
        self.plan = plan;
        let Some(sync) = &self.sync else {
            return;
        };
        match sync.store.put(&sync.key, &self.plan) {
            Ok(()) => {
                debug!(key = %sync.key, "plan synced");
                self.persistence_warning = None;
            }
            Err(err) => {
                warn!(kind = "persistence_failure", key = %sync.key, error = %err, "plan not saved; keeping in-memory copy");
                self.persistence_warning = Some(err.to_string());
            }
        }
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new(MarketingPlan::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::{MemoryStore, PersistenceError};
    use serde_json::json;
    use std::sync::mpsc::Receiver;

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }

        fn get(&self, _key: &PlanKey) -> Result<Option<MarketingPlan>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".to_string()))
        }

        fn put(&self, _key: &PlanKey, _plan: &MarketingPlan) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("offline".to_string()))
        }

        fn subscribe(&self, _key: &PlanKey) -> Receiver<MarketingPlan> {
            std::sync::mpsc::channel().1
        }
    }

    fn key() -> PlanKey {
        PlanKey::new("app", "user", "plan")
    }

    #[test]
    fn navigation_is_clamped() {
        let mut builder = PlanBuilder::default();
        assert!(builder.is_first_step());
        assert_eq!(builder.previous(), 0);
        for _ in 0..10 {
            builder.next();
        }
        assert!(builder.is_last_step());
        assert_eq!(builder.current_key(), SectionKey::MetricsAndControl);
        assert_eq!(builder.go_to(6), Err(PlanError::StepOutOfRange(6)));
        builder.go_to(2).expect("go to");
        assert_eq!(builder.current_view().key, SectionKey::Stp);
    }

    #[test]
    fn edits_are_pushed_to_the_store() {
        let store = Arc::new(MemoryStore::new());
        let mut builder =
            PlanBuilder::default().with_sync(PlanSync::new(store.clone(), key()));

        builder
            .edit(SectionKey::SituationAnalysis, "mission", json!("Our mission is X"))
            .expect("edit");

        let stored = store.get(&key()).expect("get").expect("stored");
        assert_eq!(stored.situation_analysis.mission, "Our mission is X");
        assert!(builder.persistence_warning().is_none());
    }

    #[test]
    fn store_failure_keeps_the_edit() {
        let mut builder =
            PlanBuilder::default().with_sync(PlanSync::new(Arc::new(BrokenStore), key()));
        builder
            .edit(SectionKey::Stp, "targeting", json!("Students"))
            .expect("edit");

        assert_eq!(builder.plan().stp.targeting, "Students");
        assert!(builder.persistence_warning().is_some_and(|w| w.contains("offline")));
        assert!(builder.sync().expect("sync").load().is_none());
    }

    #[test]
    fn failed_edit_leaves_plan_unchanged() {
        let mut builder = PlanBuilder::default();
        let before = builder.plan().clone();
        assert!(builder.edit(SectionKey::Stp, "nope", json!("x")).is_err());
        assert_eq!(builder.plan(), &before);
    }

    #[test]
    fn field_request_uses_labels_and_current_text() {
        let mut builder = PlanBuilder::default();
        builder
            .edit(SectionKey::Stp, "positioning", json!("Premium"))
            .expect("edit");

        let request = builder
            .section_request(SectionKey::Stp, Some("positioning"))
            .expect("request");
        assert_eq!(
            request.section_title,
            "Segmentation, Targeting, and Positioning (STP): Positioning"
        );
        assert_eq!(
            request.existing_content,
            ExistingContent::Text("Premium".to_string())
        );
    }

    #[test]
    fn list_field_request_is_structured() {
        let builder = PlanBuilder::default();
        let request = builder
            .section_request(SectionKey::SituationAnalysis, Some("competitors"))
            .expect("request");
        assert!(matches!(
            request.existing_content,
            ExistingContent::Structured(_)
        ));

        let whole = builder
            .section_request(SectionKey::MetricsAndControl, None)
            .expect("request");
        assert_eq!(whole.section_title, "Metrics & Control");
        assert!(matches!(whole.existing_content, ExistingContent::Structured(_)));
    }

    /// Verifies an untouched list or section asks for a starting draft.
    #[test]
    fn blank_content_requests_a_starting_draft() {
        let builder = PlanBuilder::default();
        let engine = crate::gateway::prompt::PromptEngine::new();
        for path in [Some("competitors"), None] {
            let request = builder
                .section_request(SectionKey::SituationAnalysis, path)
                .expect("request");
            assert!(request.existing_content.is_empty(), "{path:?}");
            let prompt = engine
                .render_section_suggestion(&request)
                .expect("render");
            assert!(prompt.contains("starting draft"), "{path:?}");
            assert!(!prompt.contains("improvements"), "{path:?}");
        }
    }

    #[test]
    fn non_suggestable_fields_are_refused() {
        let builder = PlanBuilder::default();
        let err = builder
            .section_request(SectionKey::DirectionAndObjectives, Some("direction"))
            .unwrap_err();
        assert!(matches!(err, SuggestError::NotSuggestable { .. }));
    }

    #[test]
    fn new_plan_resets_step_and_content() {
        let mut builder = PlanBuilder::default();
        builder.go_to(4).expect("go to");
        builder.set_title("Old");
        builder
            .edit(SectionKey::Stp, "targeting", json!("Students"))
            .expect("edit");

        builder.new_plan("Fresh");
        assert_eq!(builder.current_step(), 0);
        assert_eq!(builder.plan().title, "Fresh");
        assert!(builder.plan().stp.targeting.is_empty());
    }
}
