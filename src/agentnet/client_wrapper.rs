//! A `ClientWrapper` is a wrapper around a specific LLM chat service.
//!
//! It provides a common interface for sending a list of [`Message`]s and getting the
//! assistant's reply back. It does not keep track of the conversation; that is the job of an
//! [`AgentSession`](crate::session::AgentSession) owned by an [`Agent`](crate::Agent).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::agentnet::schema::ChoiceSchema;

/// Represents the possible roles for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Set by the developer to steer the model's responses.
    System,
    /// A message sent by a human user (or app user).
    User,
    /// Content generated by a model in response to earlier messages.
    Assistant,
    /// Output produced by a tool invocation.
    Tool,
}

impl Role {
    /// Wire name of the role as used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a role name outside `{system, user, assistant, tool}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRole(pub String);

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid role: {}", self.0)
    }
}

impl Error for InvalidRole {}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Represents a generic message exchanged with an LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message. Stored as `Arc<str>` so cloning is cheap.
    pub content: Arc<str>,
    /// Name of the agent that produced the message, if any.
    pub name: Option<String>,
}

impl Message {
    /// Create an anonymous message with the given role.
    pub fn new(role: Role, content: impl AsRef<str>) -> Self {
        Self {
            role,
            content: Arc::from(content.as_ref()),
            name: None,
        }
    }

    pub fn system(content: impl AsRef<str>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl AsRef<str>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant message attributed to the named agent.
    pub fn from_agent(name: impl Into<String>, content: impl AsRef<str>) -> Self {
        Self {
            role: Role::Assistant,
            content: Arc::from(content.as_ref()),
            name: Some(name.into()),
        }
    }

    /// Attach (or replace) the author name (builder pattern).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Trait defining the interface to interact with various LLM services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Send the messages to the LLM and get the assistant's reply.
    ///
    /// When `response_format` is given, the reply content must be a JSON object satisfying
    /// that schema. Implementations that cannot enforce it should still request it and leave
    /// validation to [`ChoiceSchema::parse`].
    async fn send_message(
        &self,
        messages: &[Message],
        response_format: Option<&ChoiceSchema>,
    ) -> Result<Message, Box<dyn Error + Send + Sync>>;

    /// Model identifier injected into every request.
    fn model_name(&self) -> &str;

    /// Usage reported by the *last* `send_message()` call.
    async fn get_last_usage(&self) -> Option<TokenUsage> {
        self.usage_slot()
            .and_then(|slot| slot.lock().ok().and_then(|u| u.clone()))
    }

    /// Clients that track usage return their slot here.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}
