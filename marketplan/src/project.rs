//! A planner project on disk: config, session and the plan being edited.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::builder::{PlanBuilder, PlanSync};
use crate::core::plan::MarketingPlan;
use crate::io::config::{PlannerConfig, StoreBackend, load_config};
use crate::io::identity::{Identity, new_plan_id, resolve_identity};
use crate::io::init::MarketplanPaths;
use crate::io::session::{Session, load_session, write_session};
use crate::io::store::{DocumentStore, PlanKey, is_safe_id, open_store};

pub struct Project {
    pub paths: MarketplanPaths,
    pub config: PlannerConfig,
    pub identity: Identity,
    pub builder: PlanBuilder,
}

impl Project {
    /// Load `.marketplan/` under `root` and open the configured store.
    pub fn open(root: &Path) -> Result<Self> {
        let paths = MarketplanPaths::new(root);
        let config = load_config(&paths.config_path)?;
        if config.persistence.backend == StoreBackend::Memory {
            warn!("persistence.backend is \"memory\"; plans are not kept after exit");
        }
        let store = open_store(&config, &paths);
        Self::with_store(paths, config, store)
    }

    /// Like [`Project::open`], with an already opened store.
    pub fn with_store(
        paths: MarketplanPaths,
        config: PlannerConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        let session = load_session(&paths.session_path)?.unwrap_or_default();
        let identity = resolve_identity(&config.identity, session.user_id.as_deref());
        let plan_id = if session.plan_id.is_empty() {
            new_plan_id()
        } else if !is_safe_id(&session.plan_id) {
            warn!(plan_id = %session.plan_id, "ignoring unusable plan id in session");
            new_plan_id()
        } else {
            session.plan_id.clone()
        };
        debug!(user_id = %identity.user_id, %plan_id, backend = store.backend(), "opening plan");

        let sync = PlanSync::new(
            store,
            PlanKey::new(&config.app_id, &identity.user_id, plan_id),
        );
        let plan = sync.load().unwrap_or_else(|| MarketingPlan::new(""));
        let mut builder = PlanBuilder::new(plan).with_sync(sync);
        if builder.go_to(session.current_step).is_err() {
            warn!(step = session.current_step, "ignoring stored step out of range");
        }
        builder.set_business_description(session.business_description);

        Ok(Self {
            paths,
            config,
            identity,
            builder,
        })
    }

    fn sync(&self) -> Result<&PlanSync> {
        self.builder
            .sync()
            .context("plan is not attached to a store")
    }

    pub fn plan_key(&self) -> Result<&PlanKey> {
        Ok(self.sync()?.key())
    }

    /// Session capturing the current identity, plan and wizard position.
    pub fn session(&self) -> Result<Session> {
        Ok(Session {
            user_id: self
                .identity
                .is_anonymous()
                .then(|| self.identity.user_id.clone()),
            plan_id: self.plan_key()?.plan_id.clone(),
            current_step: self.builder.current_step(),
            business_description: self.builder.business_description().to_string(),
        })
    }

    pub fn save_session(&self) -> Result<()> {
        write_session(&self.paths.session_path, &self.session()?)
    }

    /// Switch to a fresh, empty plan under a new plan id. The previous plan
    /// stays in the store; the business description carries over.
    pub fn start_new_plan(&mut self, title: impl Into<String>) -> Result<&PlanKey> {
        let sync = self.sync()?;
        let key = sync.key();
        let next = PlanKey::new(&key.app_id, &key.user_id, new_plan_id());
        let store = sync.store().clone();
        let description = self.builder.business_description().to_string();

        self.builder =
            PlanBuilder::new(MarketingPlan::new("")).with_sync(PlanSync::new(store, next));
        self.builder.set_business_description(description);
        self.builder.new_plan(title);
        self.plan_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SectionKey;
    use crate::io::file_store::FileStore;
    use crate::io::store::MemoryStore;
    use serde_json::json;

    fn open_in(root: &Path, store: Arc<dyn DocumentStore>) -> Project {
        Project::with_store(MarketplanPaths::new(root), PlannerConfig::default(), store)
            .expect("open project")
    }

    /// Verifies a saved session brings back the same plan, step and description.
    #[test]
    fn session_round_trip_reopens_the_same_plan() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

        let mut first = open_in(temp.path(), store.clone());
        first
            .builder
            .edit(SectionKey::Stp, "targeting", json!("Students"))
            .expect("edit");
        first.builder.go_to(2).expect("go to");
        first.builder.set_business_description("Campus coffee cart");
        first.save_session().expect("save");

        let second = open_in(temp.path(), store);
        assert_eq!(second.plan_key().expect("key"), first.plan_key().expect("key"));
        assert_eq!(second.builder.plan().stp.targeting, "Students");
        assert_eq!(second.builder.current_step(), 2);
        assert_eq!(second.builder.business_description(), "Campus coffee cart");
    }

    /// Verifies a tampered session cannot steer writes outside the store.
    #[test]
    fn unsafe_session_plan_id_is_replaced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = MarketplanPaths::new(temp.path());
        write_session(
            &paths.session_path,
            &Session {
                plan_id: "../../../escaped".to_string(),
                ..Session::default()
            },
        )
        .expect("write session");
        let store = Arc::new(FileStore::open(&temp.path().join("plans")).expect("store"));

        let mut project =
            Project::with_store(paths, PlannerConfig::default(), store).expect("open project");
        let key = project.plan_key().expect("key").clone();
        assert!(key.plan_id.starts_with("plan-"), "{key}");

        project.builder.set_title("x");
        assert_eq!(project.builder.persistence_warning(), None);
        assert!(!temp.path().join("escaped.json").exists());
    }

    #[test]
    fn new_plan_gets_a_new_id_and_keeps_the_old_one() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mut project = open_in(temp.path(), store.clone());
        project.builder.set_title("First");
        let old = project.plan_key().expect("key").clone();

        let new = project.start_new_plan("Second").expect("new plan").clone();

        assert_ne!(old.plan_id, new.plan_id);
        assert_eq!(project.builder.plan().title, "Second");
        assert_eq!(store.get(&old).expect("get").expect("old plan").title, "First");
    }
}
