//! Model client abstraction.
//!
//! The [`ModelClient`] trait decouples the gateway from the hosted model
//! backend. Tests use scripted clients that return predetermined replies
//! without touching the network.

use serde_json::Value;

use crate::schema::output::OutputSchema;

/// Parameters for one model invocation.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Use-case name, forwarded as the structured-output schema name.
    pub name: &'static str,
    /// Fully rendered prompt text.
    pub prompt: String,
    /// JSON Schema the reply must conform to.
    pub output_schema: OutputSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model client misconfigured: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
    #[error("model service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },
    #[error("model returned an empty reply")]
    Empty,
    #[error("model reply is not valid JSON: {0}")]
    InvalidJson(String),
}

impl ModelError {
    /// Whether the reply arrived but was unusable, as opposed to no reply at all.
    pub fn is_output_error(&self) -> bool {
        matches!(self, ModelError::Empty | ModelError::InvalidJson(_))
    }
}

/// A backend that turns a prompt plus output schema into a JSON reply.
pub trait ModelClient: Send + Sync {
    fn generate(&self, request: &ModelRequest) -> Result<Value, ModelError>;
}

impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    fn generate(&self, request: &ModelRequest) -> Result<Value, ModelError> {
        (**self).generate(request)
    }
}

impl<T: ModelClient + ?Sized> ModelClient for &T {
    fn generate(&self, request: &ModelRequest) -> Result<Value, ModelError> {
        (**self).generate(request)
    }
}
