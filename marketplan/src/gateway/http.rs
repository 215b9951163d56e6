//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::client::{ModelClient, ModelError, ModelRequest};
use crate::io::config::ModelConfig;

/// Longest slice of an error body kept in [`ModelError::Service`].
const ERROR_BODY_LIMIT: usize = 200;

/// Blocking HTTP client for `{endpoint}/v1/chat/completions`.
///
/// Structured output is requested through `response_format.json_schema`, so
/// the reply's message content is expected to be one JSON document.
pub struct HttpModelClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl HttpModelClient {
    /// Build a client from config, reading the API key from `api_key_env`.
    ///
    /// A missing key is not an error here: local OpenAI-compatible servers
    /// accept unauthenticated requests.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build model HTTP client")?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            debug!(env = %config.api_key_env, "no model API key set");
        }
        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    fn body(&self, request: &ModelRequest) -> Result<Value, ModelError> {
        let schema = request.output_schema.value().map_err(ModelError::Config)?;
        Ok(json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.name,
                    "strict": true,
                    "schema": schema,
                },
            },
        }))
    }
}

impl ModelClient for HttpModelClient {
    #[instrument(skip_all, fields(name = request.name, model = %self.model))]
    fn generate(&self, request: &ModelRequest) -> Result<Value, ModelError> {
        let mut builder = self.client.post(&self.url).json(&self.body(request)?);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|err| {
            if err.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::Transport(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            warn!(status = status.as_u16(), "model service error");
            return Err(ModelError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Value = response
            .json()
            .map_err(|err| ModelError::InvalidJson(format!("response envelope: {err}")))?;
        parse_completion(&envelope)
    }
}

/// Extract the JSON document from a chat-completions response envelope.
fn parse_completion(envelope: &Value) -> Result<Value, ModelError> {
    let content = envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(ModelError::Empty);
    }
    serde_json::from_str(content).map_err(|err| ModelError::InvalidJson(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::output::SECTION_SUGGESTION_OUTPUT;

    fn config() -> ModelConfig {
        ModelConfig {
            endpoint: "http://localhost:9/".to_string(),
            model: "test-model".to_string(),
            api_key_env: "MARKETPLAN_TEST_UNSET_KEY".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn completion_content_is_parsed_as_json() {
        let envelope = json!({
            "choices": [{ "message": { "content": "{\"suggestions\": \"Add a loyalty card\"}" } }]
        });
        let value = parse_completion(&envelope).expect("parse");
        assert_eq!(value["suggestions"], "Add a loyalty card");
    }

    #[test]
    fn blank_or_missing_content_is_empty() {
        let blank = json!({ "choices": [{ "message": { "content": "  " } }] });
        assert_eq!(parse_completion(&blank), Err(ModelError::Empty));
        assert_eq!(parse_completion(&json!({})), Err(ModelError::Empty));
    }

    #[test]
    fn non_json_content_is_invalid() {
        let envelope = json!({ "choices": [{ "message": { "content": "Sure! Here you go" } }] });
        assert!(matches!(
            parse_completion(&envelope),
            Err(ModelError::InvalidJson(_))
        ));
    }

    #[test]
    fn request_body_carries_schema_and_prompt() {
        let client = HttpModelClient::from_config(&config()).expect("client");
        assert_eq!(client.url, "http://localhost:9/v1/chat/completions");
        assert!(client.api_key.is_none());

        let body = client
            .body(&ModelRequest {
                name: SECTION_SUGGESTION_OUTPUT.name,
                prompt: "hello".to_string(),
                output_schema: SECTION_SUGGESTION_OUTPUT,
            })
            .expect("body");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "section_suggestion"
        );
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"][0],
            "suggestions"
        );
    }
}
