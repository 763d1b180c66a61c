//! Agent System
//!
//! An [`Agent`] is a named entity wrapping a single LLM endpoint (a [`ClientWrapper`]) and
//! its own [`AgentSession`]. Agents can be used:
//! - standalone, through [`Agent::chat`], which keeps a running conversation in the session
//! - inside an [`AgentNetwork`](crate::network::AgentNetwork), which invokes them through
//!   [`Agent::generate`] with a context assembled fresh for every turn
//!
//! Both calls optionally take a [`ChoiceSchema`]; the reply is then validated against it and
//! the chosen label is returned in [`AgentResponse::choice`].
//!
//! # Example
//!
//! ```rust,no_run
//! use agentnet::Agent;
//! use agentnet::clients::openai::OpenAIClient;
//! use std::sync::Arc;
//!
//! # async {
//! let mut agent = Agent::new("Researcher", Arc::new(OpenAIClient::new("key", "gpt-4o-mini")))
//!     .with_system_prompt("You research topics and report key facts.");
//!
//! let reply = agent.chat("What is a B-tree?", None).await.unwrap();
//! println!("{}", reply.content);
//! # };
//! ```

use log::{debug, error};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::agentnet::client_wrapper::{ClientWrapper, Message, TokenUsage};
use crate::agentnet::event::{AgentEvent, EventHandler};
use crate::agentnet::schema::ChoiceSchema;
use crate::agentnet::session::AgentSession;

/// Longest description derived from a system prompt.
const DESCRIPTION_MAX_CHARS: usize = 120;

/// Reply produced by [`Agent::chat`] or [`Agent::generate`].
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Raw reply text.
    pub content: String,
    /// Validated label when a [`ChoiceSchema`] was requested.
    pub choice: Option<String>,
    /// Usage reported by the client for this call, if any.
    pub tokens_used: Option<TokenUsage>,
}

/// An LLM-backed participant with a name, a model, and its own message log.
pub struct Agent {
    /// Identifier used for registration and routing. Must be non-empty inside a network.
    pub name: String,
    session: AgentSession,
    client: Arc<dyn ClientWrapper>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model())
            .field("session_len", &self.session.len())
            .finish()
    }
}

impl Agent {
    pub fn new(name: impl Into<String>, client: Arc<dyn ClientWrapper>) -> Self {
        Self {
            name: name.into(),
            session: AgentSession::new(),
            client,
            event_handler: None,
        }
    }

    /// Set the system instruction (builder pattern).
    pub fn with_system_prompt(mut self, prompt: impl AsRef<str>) -> Self {
        self.session.set_system_prompt(prompt);
        self
    }

    pub fn set_system_prompt(&mut self, prompt: impl AsRef<str>) {
        self.session.set_system_prompt(prompt);
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn set_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.event_handler = Some(handler);
    }

    /// Model identifier of the underlying client.
    pub fn model(&self) -> &str {
        self.client.model_name()
    }

    pub fn client(&self) -> &Arc<dyn ClientWrapper> {
        &self.client
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AgentSession {
        &mut self.session
    }

    /// The first `system` message of the session.
    pub fn system_prompt(&self) -> Option<&Message> {
        self.session.system_prompt()
    }

    /// One-line summary of what this agent does, taken from its system prompt.
    ///
    /// ```
    /// # use agentnet::Agent;
    /// # use agentnet::client_wrapper::{ClientWrapper, Message};
    /// # use agentnet::schema::ChoiceSchema;
    /// # use std::sync::Arc;
    /// # struct Noop;
    /// # #[async_trait::async_trait]
    /// # impl ClientWrapper for Noop {
    /// #     async fn send_message(&self, _: &[Message], _: Option<&ChoiceSchema>)
    /// #         -> Result<Message, Box<dyn std::error::Error + Send + Sync>> { unimplemented!() }
    /// #     fn model_name(&self) -> &str { "noop" }
    /// # }
    /// let agent = Agent::new("Writer", Arc::new(Noop))
    ///     .with_system_prompt("\nYou turn research notes into prose.\nKeep it short.");
    /// assert_eq!(agent.description(), "You turn research notes into prose.");
    /// ```
    pub fn description(&self) -> String {
        let line = self
            .system_prompt()
            .and_then(|m| m.content.lines().map(str::trim).find(|l| !l.is_empty()))
            .map(str::to_string);
        match line {
            Some(line) if line.chars().count() > DESCRIPTION_MAX_CHARS => {
                let cut: String = line.chars().take(DESCRIPTION_MAX_CHARS).collect();
                format!("{}...", cut.trim_end())
            }
            Some(line) => line,
            None => "No description provided.".to_string(),
        }
    }

    /// Send `prompt` as a user message on this agent's session and record the reply.
    pub async fn chat(
        &mut self,
        prompt: &str,
        schema: Option<&ChoiceSchema>,
    ) -> Result<AgentResponse, Box<dyn Error + Send + Sync>> {
        self.session.begin();
        self.session.push(Message::user(prompt));
        let response = match self.generate(self.session.messages(), schema).await {
            Ok(response) => response,
            Err(err) => {
                self.session.end(Some(err.as_ref()));
                return Err(err);
            }
        };
        self.session
            .push(Message::from_agent(self.name.clone(), &response.content));
        self.session.end(None);
        Ok(response)
    }

    /// Invoke the model with an explicit context. The session is left untouched.
    ///
    /// When `schema` is given the reply must satisfy it; a reply outside the schema is
    /// returned as an error rather than truncated or coerced.
    pub async fn generate(
        &self,
        context: &[Message],
        schema: Option<&ChoiceSchema>,
    ) -> Result<AgentResponse, Box<dyn Error + Send + Sync>> {
        self.emit(AgentEvent::CallStarted {
            agent_name: self.name.clone(),
            context_len: context.len(),
            structured: schema.is_some(),
        })
        .await;
        debug!(
            "Agent '{}' calling model '{}' with {} messages",
            self.name,
            self.model(),
            context.len()
        );

        let reply = match self.client.send_message(context, schema).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("Agent '{}' model call failed: {}", self.name, err);
                self.emit(AgentEvent::CallFailed {
                    agent_name: self.name.clone(),
                    error: err.to_string(),
                })
                .await;
                return Err(err);
            }
        };

        let choice = match schema {
            Some(schema) => match schema.parse(&reply.content) {
                Ok(choice) => Some(choice),
                Err(err) => {
                    error!("Agent '{}' reply failed schema '{}': {}", self.name, schema.name, err);
                    self.emit(AgentEvent::CallFailed {
                        agent_name: self.name.clone(),
                        error: err.to_string(),
                    })
                    .await;
                    return Err(Box::new(err));
                }
            },
            None => None,
        };

        let tokens_used = self.client.get_last_usage().await;
        self.emit(AgentEvent::CallCompleted {
            agent_name: self.name.clone(),
            tokens_used: tokens_used.clone(),
            response_length: reply.content.len(),
        })
        .await;

        Ok(AgentResponse {
            content: reply.content.to_string(),
            choice,
            tokens_used,
        })
    }

    async fn emit(&self, event: AgentEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_agent_event(&event).await;
        }
    }
}
