//! Single-shot classification routing.
//!
//! A [`StaticRouter`] renders a prompt template with the input, asks a classification agent
//! to pick one label from a closed set (enforced by a [`ChoiceSchema`]), and hands the
//! original input to the [`RouteHandler`] registered under that label. It never looks at a
//! [`NetworkState`](crate::NetworkState); a whole [`AgentNetwork`] can however be a handler.
//!
//! ```rust,no_run
//! use agentnet::{Agent, StaticRouter};
//! use agentnet::static_router::FnHandler;
//! use agentnet::clients::openai::OpenAIClient;
//! use std::sync::Arc;
//!
//! # async {
//! let classifier = Agent::new("Triage", Arc::new(OpenAIClient::new("key", "gpt-4o-mini")));
//! let mut router = StaticRouter::with_labels(
//!     classifier,
//!     ["billing", "technical"],
//!     "Classify this support ticket: {input}",
//! );
//! router
//!     .add_route("billing", FnHandler::new(|ticket: &str| Ok(format!("billing <- {}", ticket))))
//!     .add_route("technical", FnHandler::new(|ticket: &str| Ok(format!("tech <- {}", ticket))));
//!
//! let answer = router.run("I was charged twice").await.unwrap();
//! # };
//! ```

use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::agentnet::agent::Agent;
use crate::agentnet::client_wrapper::Message;
use crate::agentnet::context::render_template;
use crate::agentnet::error::NetworkError;
use crate::agentnet::event::{EventHandler, NetworkEvent};
use crate::agentnet::network::AgentNetwork;
use crate::agentnet::schema::ChoiceSchema;

/// Target a [`StaticRouter`] delegates to.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Process the original input and return the final answer.
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Adapter turning a synchronous closure into a [`RouteHandler`].
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&str) -> Result<String, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> RouteHandler for FnHandler<F>
where
    F: Fn(&str) -> Result<String, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        (self.func)(input)
    }
}

#[async_trait]
impl<T: RouteHandler + ?Sized> RouteHandler for Arc<T> {
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).run(input).await
    }
}

/// A single agent answering in its own running session.
#[async_trait]
impl RouteHandler for Mutex<Agent> {
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut agent = self.lock().await;
        Ok(agent.chat(input, None).await?.content)
    }
}

/// A whole network run; the handler's answer is the run's `result`.
#[async_trait]
impl RouteHandler for Mutex<AgentNetwork> {
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut network = self.lock().await;
        let state = network.run(input).await?;
        Ok(state.result.clone().unwrap_or_default())
    }
}

/// Label-to-handler dispatch driven by one upfront classification.
pub struct StaticRouter {
    agent: Agent,
    schema: ChoiceSchema,
    prompt_template: String,
    routes: HashMap<String, Box<dyn RouteHandler>>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl StaticRouter {
    /// `prompt_template` may contain `{input}` placeholders.
    pub fn new(agent: Agent, schema: ChoiceSchema, prompt_template: impl Into<String>) -> Self {
        Self {
            agent,
            schema,
            prompt_template: prompt_template.into(),
            routes: HashMap::new(),
            event_handler: None,
        }
    }

    /// Router whose schema is a single `route` field over `labels`.
    pub fn with_labels<I, S>(agent: Agent, labels: I, prompt_template: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            agent,
            ChoiceSchema::new("route", "route", labels),
            prompt_template,
        )
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.agent.set_event_handler(Arc::clone(&handler));
        self.event_handler = Some(handler);
        self
    }

    /// Register (or replace) the handler for `label`.
    pub fn add_route(
        &mut self,
        label: impl Into<String>,
        handler: impl RouteHandler + 'static,
    ) -> &mut Self {
        let label = label.into();
        if !self.schema.contains(&label) {
            warn!("Route '{}' is not a label the classifier can choose", label);
        }
        self.routes.insert(label, Box::new(handler));
        self
    }

    pub fn has_route(&self, label: &str) -> bool {
        self.routes.contains_key(label)
    }

    pub fn schema(&self) -> &ChoiceSchema {
        &self.schema
    }

    /// Classify `input` and delegate it to the chosen handler.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::UnknownRoute`] when the chosen label has no handler
    /// - [`NetworkError::Collaborator`] when classification or the handler fails
    pub async fn run(&self, input: &str) -> Result<String, NetworkError> {
        info!("Starting routing with input: {}", input);
        let label = self.classify(input).await?;
        info!("Chosen route: {}", label);
        self.dispatch(&label, input).await
    }

    /// Ask the classification agent for a label.
    pub async fn classify(&self, input: &str) -> Result<String, NetworkError> {
        let mut context = Vec::with_capacity(2);
        if let Some(system) = self.agent.system_prompt() {
            context.push(system.clone());
        }
        context.push(Message::user(render_template(&self.prompt_template, input)));

        let response = self.agent.generate(&context, Some(&self.schema)).await?;
        response.choice.ok_or_else(|| {
            NetworkError::Collaborator("classifier returned no structured choice".into())
        })
    }

    /// Run the handler registered for `label` with `input` and return its answer verbatim.
    pub async fn dispatch(&self, label: &str, input: &str) -> Result<String, NetworkError> {
        let handler = self
            .routes
            .get(label)
            .ok_or_else(|| NetworkError::UnknownRoute(label.to_string()))?;
        if let Some(events) = &self.event_handler {
            events
                .on_network_event(&NetworkEvent::RouteSelected {
                    label: label.to_string(),
                })
                .await;
        }
        handler.run(input).await.map_err(NetworkError::Collaborator)
    }
}
