//! Plan document storage.
//!
//! [`DocumentStore`] is the persistence boundary: plans are addressed by
//! [`PlanKey`] and stores push every accepted `put` to subscribers of that
//! key. Persistence is best-effort for callers; the in-memory plan stays the
//! source of truth when a store fails.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::config::{PlannerConfig, StoreBackend};
use super::file_store::FileStore;
use super::init::MarketplanPaths;
use crate::core::plan::MarketingPlan;

/// Address of one stored plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub app_id: String,
    pub user_id: String,
    pub plan_id: String,
}

impl PlanKey {
    pub fn new(
        app_id: impl Into<String>,
        user_id: impl Into<String>,
        plan_id: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            user_id: user_id.into(),
            plan_id: plan_id.into(),
        }
    }
}

/// Whether `id` can be used as a single path component.
pub fn is_safe_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains(['/', '\\', '\0']) && id != "." && id != ".."
}

impl PlanKey {
    /// Name of the first component that is not a safe path segment.
    pub fn unsafe_component(&self) -> Option<&'static str> {
        [
            ("app_id", &self.app_id),
            ("user_id", &self.user_id),
            ("plan_id", &self.plan_id),
        ]
        .into_iter()
        .find(|(_, id)| !is_safe_id(id))
        .map(|(name, _)| name)
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_id, self.user_id, self.plan_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("stored plan {path} is invalid: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("serialize plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    fn get(&self, key: &PlanKey) -> Result<Option<MarketingPlan>, PersistenceError>;

    /// Store `plan` under `key`, replacing any previous version, and notify
    /// subscribers of `key`.
    fn put(&self, key: &PlanKey, plan: &MarketingPlan) -> Result<(), PersistenceError>;

    /// Receive every plan subsequently put under `key`.
    fn subscribe(&self, key: &PlanKey) -> Receiver<MarketingPlan>;

    /// File holding the document for `key`, for stores backed by files.
    fn location(&self, _key: &PlanKey) -> Option<PathBuf> {
        None
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-key subscriber lists shared by store implementations.
#[derive(Default)]
pub struct Subscribers {
    senders: Mutex<HashMap<PlanKey, Vec<Sender<MarketingPlan>>>>,
}

impl Subscribers {
    pub fn subscribe(&self, key: &PlanKey) -> Receiver<MarketingPlan> {
        let (tx, rx) = mpsc::channel();
        lock(&self.senders).entry(key.clone()).or_default().push(tx);
        rx
    }

    /// Send `plan` to every live subscriber of `key`, dropping closed ones.
    pub fn notify(&self, key: &PlanKey, plan: &MarketingPlan) {
        let mut senders = lock(&self.senders);
        if let Some(list) = senders.get_mut(key) {
            list.retain(|tx| tx.send(plan.clone()).is_ok());
            debug!(%key, subscribers = list.len(), "notified subscribers");
            if list.is_empty() {
                senders.remove(key);
            }
        }
    }
}

/// Process-local store; the default backend.
#[derive(Default)]
pub struct MemoryStore {
    plans: Mutex<HashMap<PlanKey, MarketingPlan>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &PlanKey) -> Result<Option<MarketingPlan>, PersistenceError> {
        Ok(lock(&self.plans).get(key).cloned())
    }

    fn put(&self, key: &PlanKey, plan: &MarketingPlan) -> Result<(), PersistenceError> {
        lock(&self.plans).insert(key.clone(), plan.clone());
        self.subscribers.notify(key, plan);
        Ok(())
    }

    fn subscribe(&self, key: &PlanKey) -> Receiver<MarketingPlan> {
        self.subscribers.subscribe(key)
    }
}

/// Open the configured store.
///
/// A file store that cannot be opened degrades to [`MemoryStore`] with a
/// warning; the planner keeps working without persistence.
pub fn open_store(config: &PlannerConfig, paths: &MarketplanPaths) -> Arc<dyn DocumentStore> {
    match config.persistence.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => {
            let dir = paths.resolve(&config.persistence.dir);
            match FileStore::open(&dir) {
                Ok(store) => Arc::new(store),
                Err(err) => {
                    warn!(error = %err, dir = %dir.display(), "file store unavailable; plans will not be persisted");
                    Arc::new(MemoryStore::new())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::PersistenceConfig;

    fn key() -> PlanKey {
        PlanKey::new("app", "user", "plan-1")
    }

    #[test]
    fn memory_store_round_trips_and_isolates_keys() {
        let store = MemoryStore::new();
        let plan = MarketingPlan::new("Coffee");
        store.put(&key(), &plan).expect("put");

        assert_eq!(store.get(&key()).expect("get"), Some(plan));
        assert_eq!(
            store
                .get(&PlanKey::new("app", "other-user", "plan-1"))
                .expect("get"),
            None
        );
    }

    #[test]
    fn subscribers_receive_puts_for_their_key_only() {
        let store = MemoryStore::new();
        let rx = store.subscribe(&key());

        let mut plan = MarketingPlan::default();
        plan.title = "First".to_string();
        store.put(&key(), &plan).expect("put");
        store
            .put(&PlanKey::new("app", "user", "plan-2"), &MarketingPlan::default())
            .expect("put other");

        assert_eq!(rx.try_recv().expect("update").title, "First");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let store = MemoryStore::new();
        drop(store.subscribe(&key()));
        store.put(&key(), &MarketingPlan::default()).expect("put");
        assert!(lock(&store.subscribers.senders).is_empty());
    }

    #[test]
    fn unusable_file_store_falls_back_to_memory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write");

        let config = PlannerConfig {
            persistence: PersistenceConfig {
                backend: StoreBackend::File,
                dir: blocker.join("plans"),
            },
            ..PlannerConfig::default()
        };
        let store = open_store(&config, &MarketplanPaths::new(temp.path()));
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.location(&key()), None);
    }
}
