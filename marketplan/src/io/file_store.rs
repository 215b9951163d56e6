//! JSON file store: one document per plan under `<dir>/<app>/<user>/<plan>.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, instrument};

use super::store::{DocumentStore, PersistenceError, PlanKey, Subscribers};
use crate::core::plan::MarketingPlan;
use crate::schema::output::compile_schema;

const PLAN_SCHEMA: &str = include_str!("../../schemas/plan/v1.schema.json");

pub struct FileStore {
    dir: PathBuf,
    schema: Validator,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, PersistenceError> {
        fs::create_dir_all(dir).map_err(|err| {
            PersistenceError::Unavailable(format!("create {}: {err}", dir.display()))
        })?;
        let document: Value = serde_json::from_str(PLAN_SCHEMA)?;
        let schema = compile_schema(&document)
            .map_err(|err| PersistenceError::Unavailable(format!("plan schema: {err}")))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            schema,
            subscribers: Subscribers::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Document path for `key`; keys whose ids would leave the store
    /// directory are refused.
    pub fn path_for(&self, key: &PlanKey) -> Result<PathBuf, PersistenceError> {
        if let Some(component) = key.unsafe_component() {
            return Err(PersistenceError::Unavailable(format!(
                "{component} is not a usable path component in key {key}"
            )));
        }
        Ok(self
            .dir
            .join(&key.app_id)
            .join(&key.user_id)
            .join(format!("{}.json", key.plan_id)))
    }

    fn validate(&self, path: &Path, document: &Value) -> Result<(), PersistenceError> {
        let corrupt = |reason: String| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };
        if self.schema.is_valid(document) {
            return Ok(());
        }
        let messages = self
            .schema
            .iter_errors(document)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        Err(corrupt(messages.join("; ")))
    }
}

impl DocumentStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    #[instrument(skip_all, fields(%key))]
    fn get(&self, key: &PlanKey) -> Result<Option<MarketingPlan>, PersistenceError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            debug!("no stored plan");
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).map_err(|source| PersistenceError::Read {
            path: path.clone(),
            source,
        })?;
        let document: Value =
            serde_json::from_str(&contents).map_err(|err| PersistenceError::Corrupt {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        self.validate(&path, &document)?;
        let plan = serde_json::from_value(document).map_err(|err| PersistenceError::Corrupt {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        Ok(Some(plan))
    }

    #[instrument(skip_all, fields(%key))]
    fn put(&self, key: &PlanKey, plan: &MarketingPlan) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let mut buf = serde_json::to_string_pretty(plan)?;
        buf.push('\n');
        super::write_atomic(&path, &buf).map_err(|err| PersistenceError::Write {
            path: path.clone(),
            message: format!("{err:#}"),
        })?;
        debug!(path = %path.display(), "stored plan");
        self.subscribers.notify(key, plan);
        Ok(())
    }

    fn subscribe(&self, key: &PlanKey) -> Receiver<MarketingPlan> {
        self.subscribers.subscribe(key)
    }

    fn location(&self, key: &PlanKey) -> Option<PathBuf> {
        self.path_for(key).ok()
    }
}
