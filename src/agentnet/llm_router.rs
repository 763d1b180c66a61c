//! LLM-driven routing.
//!
//! An [`LLMRouter`] asks a dedicated routing agent to pick the next agent of a network run.
//! The set of answers the model may give is fixed when the router is built: the names of the
//! agents registered at that moment plus the finish label. The model is held to that set by
//! a [`ChoiceSchema`], and the validated label is mapped onto a
//! [`RouteDecision`](crate::router::RouteDecision).
//!
//! Unlike task agents, the routing agent sees the full transcript on every decision; it needs
//! the whole history to judge whether the request is complete.
//!
//! ```rust,no_run
//! use agentnet::{Agent, AgentNetwork, LLMRouter};
//! use agentnet::clients::openai::OpenAIClient;
//! use std::sync::Arc;
//!
//! # async {
//! let client = || Arc::new(OpenAIClient::new("key", "gpt-4o-mini"));
//! let mut network = AgentNetwork::new();
//! let researcher = Agent::new("Researcher", client()).with_system_prompt("Finds facts.");
//! let writer = Agent::new("Writer", client()).with_system_prompt("Writes prose.");
//! network.add_agent(researcher).unwrap();
//! network.add_agent(writer).unwrap();
//!
//! // Build after registration: later additions are not routable.
//! let router = LLMRouter::new(Agent::new("Supervisor", client()), &network);
//! network.set_router(router);
//! network.set_entry_point("Researcher").unwrap();
//! # };
//! ```

use async_trait::async_trait;
use log::info;
use std::error::Error;

use crate::agentnet::agent::Agent;
use crate::agentnet::client_wrapper::Message;
use crate::agentnet::network::AgentNetwork;
use crate::agentnet::router::{RouteSet, Router};
use crate::agentnet::schema::ChoiceSchema;
use crate::agentnet::state::NetworkState;

/// Name of the structured response requested from the routing model.
pub const ROUTE_SCHEMA_NAME: &str = "route_decision";
/// Field of the structured response carrying the chosen label.
pub const ROUTE_FIELD: &str = "next";

/// Router backed by a routing agent constrained to a closed set of agent names.
pub struct LLMRouter {
    agent: Agent,
    routes: RouteSet,
    schema: ChoiceSchema,
}

impl std::fmt::Debug for LLMRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMRouter")
            .field("agent", &self.agent.name)
            .field("routes", &self.routes)
            .finish()
    }
}

impl LLMRouter {
    /// Build a router over the agents currently registered in `network`, using the
    /// network's configured finish label.
    pub fn new(routing_agent: Agent, network: &AgentNetwork) -> Self {
        let finish_label = network.config().finish_label.clone();
        Self::from_agents(routing_agent, network.agents(), &finish_label)
    }

    /// Build a router over an explicit list of agents.
    ///
    /// The routing agent's system prompt is replaced by one synthesized from the agents'
    /// own system prompts.
    pub fn from_agents<'a, I>(mut routing_agent: Agent, agents: I, finish_label: &str) -> Self
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut described: Vec<(String, String)> = agents
            .into_iter()
            .filter(|agent| agent.name != finish_label)
            .map(|agent| (agent.name.clone(), agent.description()))
            .collect();
        described.sort_by(|a, b| a.0.cmp(&b.0));
        described.dedup_by(|a, b| a.0 == b.0);

        let routes = RouteSet::new(described.iter().map(|(name, _)| name.clone()), finish_label)
            .with_field(ROUTE_FIELD);
        let schema = routes.schema(ROUTE_SCHEMA_NAME);
        routing_agent.set_system_prompt(routing_system_prompt(&described, finish_label));

        Self {
            agent: routing_agent,
            routes,
            schema,
        }
    }

    pub fn routing_agent(&self) -> &Agent {
        &self.agent
    }

    pub fn route_set(&self) -> &RouteSet {
        &self.routes
    }

    pub fn schema(&self) -> &ChoiceSchema {
        &self.schema
    }

    /// The synthesized instructions given to the routing model.
    pub fn system_prompt(&self) -> &str {
        self.agent
            .system_prompt()
            .map(|m| &*m.content)
            .unwrap_or_default()
    }

    /// Ask the routing model for the next agent. `None` means the run should finish.
    ///
    /// Model failures and replies outside the schema are returned unchanged; nothing is
    /// retried.
    pub async fn decide(
        &self,
        state: &NetworkState,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let context = self.decision_context(state);
        let response = self.agent.generate(&context, Some(&self.schema)).await?;
        let label = response
            .choice
            .ok_or("routing agent returned no structured choice")?;
        let decision = self.routes.decide(&label)?;
        info!("LLMRouter '{}' decided: {:?}", self.agent.name, decision);
        Ok(decision.into_next_agent())
    }

    /// System prompt, then the whole transcript, then the question.
    fn decision_context(&self, state: &NetworkState) -> Vec<Message> {
        let mut context = Vec::with_capacity(state.messages.len() + 2);
        if let Some(system) = self.agent.system_prompt() {
            context.push(system.clone());
        }
        context.extend(state.messages.iter().cloned());
        context.push(Message::user(format!(
            "Given the conversation above, who should act next? Select one of: {}.",
            self.routes.labels().join(", ")
        )));
        context
    }
}

#[async_trait]
impl Router for LLMRouter {
    async fn route(
        &self,
        state: &NetworkState,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        self.decide(state).await
    }
}

fn routing_system_prompt(agents: &[(String, String)], finish_label: &str) -> String {
    let mut prompt = String::from(
        "You are a supervisor routing work between a team of agents. \
         You never answer the user's request yourself; you only decide which agent acts next.\n\n\
         Agents:\n",
    );
    for (name, description) in agents {
        prompt.push_str(&format!("- {}: {}\n", name, description));
    }
    prompt.push_str(&format!(
        "\nReply with a JSON object whose \"{}\" field is the name of the next agent. \
         Reply with \"{}\" only when the last message in the conversation fully satisfies \
         the original request.",
        ROUTE_FIELD, finish_label
    ));
    prompt
}
