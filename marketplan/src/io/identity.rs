//! Per-session user identity used to namespace stored plans.

use rand::Rng;
use tracing::{debug, warn};

use super::config::IdentityConfig;
use super::store::is_safe_id;

/// Environment override for the user id.
pub const USER_ID_ENV: &str = "MARKETPLAN_USER_ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Config,
    Environment,
    /// An anonymous id generated by an earlier session.
    Remembered,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub source: IdentitySource,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(
            self.source,
            IdentitySource::Remembered | IdentitySource::Anonymous
        )
    }
}

/// Resolve the user id: config, then `MARKETPLAN_USER_ID`, then the
/// remembered anonymous id, then a fresh anonymous id.
pub fn resolve_identity(config: &IdentityConfig, remembered: Option<&str>) -> Identity {
    resolve_with(config, std::env::var(USER_ID_ENV).ok(), remembered)
}

fn usable(id: &str) -> bool {
    is_safe_id(id)
}

fn resolve_with(
    config: &IdentityConfig,
    env_value: Option<String>,
    remembered: Option<&str>,
) -> Identity {
    if usable(&config.user_id) {
        return Identity {
            user_id: config.user_id.clone(),
            source: IdentitySource::Config,
        };
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        if usable(&value) {
            return Identity {
                user_id: value.trim().to_string(),
                source: IdentitySource::Environment,
            };
        }
        warn!(env = USER_ID_ENV, "ignoring user id with path separators");
    }
    if let Some(id) = remembered.filter(|id| usable(id)) {
        return Identity {
            user_id: id.to_string(),
            source: IdentitySource::Remembered,
        };
    }
    let user_id = anonymous_id();
    debug!(%user_id, "generated anonymous identity");
    Identity {
        user_id,
        source: IdentitySource::Anonymous,
    }
}

/// `anon-` followed by 16 lowercase hex digits.
pub fn anonymous_id() -> String {
    format!("anon-{:016x}", rand::thread_rng().r#gen::<u64>())
}

/// `plan-` followed by 8 lowercase hex digits.
pub fn new_plan_id() -> String {
    format!("plan-{:08x}", rand::thread_rng().r#gen::<u32>())
}
