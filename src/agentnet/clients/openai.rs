//! The `OpenAIClient` struct implements `ClientWrapper` for OpenAI's Chat Completions API and
//! any endpoint speaking the same protocol.
//!
//! When a [`ChoiceSchema`] is passed to `send_message`, the request carries a strict
//! `json_schema` response format so the model can only answer with one of the schema's labels.
//! Token usage of the latest call is kept for `get_last_usage()`.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentnet::clients::openai::{Model, OpenAIClient};
//! use agentnet::client_wrapper::{ClientWrapper, Message};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = OpenAIClient::from_env(Model::GPT41Nano.as_str()).unwrap();
//!     let reply = client
//!         .send_message(&[Message::system("You are terse."), Message::user("Hello!")], None)
//!         .await
//!         .unwrap();
//!     println!("Assistant: {}", reply.content);
//!
//!     if let Some(usage) = client.get_last_usage().await {
//!         println!("input: {}, output: {}", usage.input_tokens, usage.output_tokens);
//!     }
//! }
//! ```

use async_trait::async_trait;
use log::error;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

use crate::agentnet::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
use crate::agentnet::http_client_pool::get_or_create_client;
use crate::agentnet::schema::ChoiceSchema;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Commonly used model identifiers. Any other name can be passed as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    GPT4o,
    GPT4oMini,
    GPT41,
    GPT41Mini,
    GPT41Nano,
    O4Mini,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::GPT4o => "gpt-4o",
            Model::GPT4oMini => "gpt-4o-mini",
            Model::GPT41 => "gpt-4.1",
            Model::GPT41Mini => "gpt-4.1-mini",
            Model::GPT41Nano => "gpt-4.1-nano",
            Model::O4Mini => "o4-mini",
        }
    }
}

/// Failures specific to the chat-completions transport.
#[derive(Debug)]
pub enum ClientError {
    /// `OPENAI_API_KEY` is unset or empty.
    MissingApiKey,
    /// The endpoint answered with a non-success status.
    Api { status: u16, body: String },
    /// The response body did not have the expected chat-completion shape.
    MalformedResponse(String),
    Http(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::MissingApiKey => write!(f, "{} is not set", API_KEY_ENV),
            ClientError::Api { status, body } => {
                write!(f, "OpenAI API error (status {}): {}", status, body)
            }
            ClientError::MalformedResponse(msg) => write!(f, "Malformed completion: {}", msg),
            ClientError::Http(err) => write!(f, "HTTP error: {}", err),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

/// Client wrapper for OpenAI compatible Chat Completions endpoints.
pub struct OpenAIClient {
    api_key: String,
    model: String,
    base_url: String,
    token_usage: Mutex<Option<TokenUsage>>,
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::new_with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Target a custom OpenAI compatible base URL (e.g. a self-hosted gateway).
    pub fn new_with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        OpenAIClient {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_usage: Mutex::new(None),
        }
    }

    /// Read `OPENAI_API_KEY` and, when present, `OPENAI_BASE_URL`.
    pub fn from_env(model: &str) -> Result<Self, ClientError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new_with_base_url(&api_key, model, &base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_completion(&self, body: &Value) -> Result<Value, ClientError> {
        let http = get_or_create_client(&self.base_url)?;
        let response = http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    async fn send_message(
        &self,
        messages: &[Message],
        response_format: Option<&ChoiceSchema>,
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let body = build_request_body(&self.model, messages, response_format);
        let completion = match self.post_completion(&body).await {
            Ok(completion) => completion,
            Err(err) => {
                error!("OpenAIClient::send_message(...): OpenAI API Error: {}", err);
                return Err(Box::new(err));
            }
        };

        let (content, usage) = parse_completion(&completion)?;
        if let Ok(mut slot) = self.token_usage.lock() {
            *slot = usage;
        }
        Ok(Message::new(Role::Assistant, content))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}

/// Chat-completions request body for `messages`, with a strict `json_schema` response format
/// when `schema` is given.
pub fn build_request_body(
    model: &str,
    messages: &[Message],
    schema: Option<&ChoiceSchema>,
) -> Value {
    let formatted: Vec<Value> = messages
        .iter()
        .map(|msg| {
            let mut entry = json!({
                "role": msg.role.as_str(),
                "content": &*msg.content,
            });
            if let Some(name) = msg.name.as_deref().and_then(sanitize_name) {
                entry["name"] = Value::String(name);
            }
            entry
        })
        .collect();

    let mut body = json!({
        "model": model,
        "messages": formatted,
    });
    if let Some(schema) = schema {
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "strict": true,
                "schema": schema.to_json_schema(),
            }
        });
    }
    body
}

/// Content of the first choice plus reported usage.
pub fn parse_completion(completion: &Value) -> Result<(String, Option<TokenUsage>), ClientError> {
    let message = completion
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ClientError::MalformedResponse("no choices in response".to_string()))?;

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(ClientError::MalformedResponse(format!(
            "model refused: {}",
            refusal
        )));
    }
    let content = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::MalformedResponse("choice has no content".to_string()))?;

    let usage = completion.get("usage").map(|u| {
        let field = |name: &str| u.get(name).and_then(Value::as_u64).unwrap_or(0) as usize;
        TokenUsage {
            input_tokens: field("prompt_tokens"),
            output_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    });
    Ok((content.to_string(), usage))
}

// The API only accepts `^[a-zA-Z0-9_-]{1,64}$` for participant names.
fn sanitize_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_request_has_no_response_format() {
        let body = build_request_body(
            "gpt-4o-mini",
            &[Message::system("be brief"), Message::user("hi")],
            None,
        );
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("response_format").is_none());
        assert!(body["messages"][1].get("name").is_none());
    }

    #[test]
    fn test_schema_becomes_strict_json_schema() {
        let schema = ChoiceSchema::new("route_decision", "next", ["Writer", "FINISH"]);
        let body = build_request_body("gpt-4o", &[Message::user("who?")], Some(&schema));
        let format = &body["response_format"];
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "route_decision");
        assert_eq!(format["json_schema"]["strict"], true);
        assert_eq!(
            format["json_schema"]["schema"]["properties"]["next"]["enum"],
            json!(["Writer", "FINISH"])
        );
    }

    #[test]
    fn test_agent_names_are_sanitized() {
        let body = build_request_body(
            "gpt-4o",
            &[Message::from_agent("Research Lead", "notes")],
            None,
        );
        assert_eq!(body["messages"][0]["role"], "assistant");
        assert_eq!(body["messages"][0]["name"], "Research_Lead");
    }

    #[test]
    fn test_parse_completion_reads_content_and_usage() {
        let completion = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"next\":\"FINISH\"}" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        });
        let (content, usage) = parse_completion(&completion).unwrap();
        assert_eq!(content, "{\"next\":\"FINISH\"}");
        assert_eq!(
            usage,
            Some(TokenUsage {
                input_tokens: 12,
                output_tokens: 5,
                total_tokens: 17
            })
        );
    }

    #[test]
    fn test_parse_completion_rejects_empty_choices() {
        let err = parse_completion(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_completion_surfaces_refusals() {
        let completion = json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that" } }]
        });
        let err = parse_completion(&completion).unwrap_err();
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_api_error_display_includes_status() {
        let err = ClientError::Api {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "OpenAI API error (status 429): rate limited");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OpenAIClient::new_with_base_url("k", "m", "http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
        assert_eq!(client.model_name(), "m");
    }
}
