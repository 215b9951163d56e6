//! CLI session state (`.marketplan/session.json`).
//!
//! Each CLI invocation is a separate process, so the pieces of the wizard
//! that live outside the plan document (who is editing, which plan, which
//! step, the business description) are remembered here between commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Session {
    /// Anonymous user id generated by an earlier session, if any.
    pub user_id: Option<String>,
    pub plan_id: String,
    /// Zero-based wizard step.
    pub current_step: usize,
    pub business_description: String,
}

/// Load the session, or `None` when no session has been written yet.
pub fn load_session(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    debug!(path = %path.display(), "loading session");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read session {}", path.display()))?;
    let session = serde_json::from_str(&contents)
        .with_context(|| format!("parse session {}", path.display()))?;
    Ok(Some(session))
}

/// Atomically write the session (temp file + rename).
pub fn write_session(path: &Path, session: &Session) -> Result<()> {
    debug!(path = %path.display(), plan_id = %session.plan_id, step = session.current_step, "writing session");
    let mut buf = serde_json::to_string_pretty(session)?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
