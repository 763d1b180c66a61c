//! Multi-agent network orchestration.
//!
//! An [`AgentNetwork`] owns a registry of [`Agent`]s, an installed [`Router`], and the
//! [`NetworkState`] of the current run. [`AgentNetwork::run`] alternates between invoking the
//! current agent and asking the router who goes next, until the router finishes or the round
//! budget runs out.
//!
//! ```text
//! run(input)
//!   ├─ seed transcript: [user: input]
//!   └─ while next_agent_name is set and rounds < max_rounds
//!        ├─ context = system prompt + transcript[0] + transcript[last]
//!        ├─ reply   = agent.generate(context)
//!        ├─ transcript.push(assistant(agent): reply)
//!        └─ next_agent_name = router.route(state)
//! ```
//!
//! Agents only see the bounded context described in [`context`](crate::context); the full
//! transcript accumulates in [`NetworkState::messages`] and is what routers inspect.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentnet::{Agent, AgentNetwork, NetworkState};
//! use agentnet::clients::openai::OpenAIClient;
//! use std::sync::Arc;
//!
//! # async {
//! let client = || Arc::new(OpenAIClient::new("key", "gpt-4o-mini"));
//!
//! let mut network = AgentNetwork::new();
//! network.add_agent(Agent::new("Researcher", client()).with_system_prompt("Research.")).unwrap();
//! network.add_agent(Agent::new("Writer", client()).with_system_prompt("Write.")).unwrap();
//! network.set_router_fn(|state: &NetworkState| match state.last_message()?.name.as_deref() {
//!     Some("Researcher") => Some("Writer".to_string()),
//!     _ => None,
//! });
//! network.set_entry_point("Researcher").unwrap();
//!
//! let state = network.run("summarize topic T").await.unwrap();
//! println!("{}", state.result.as_deref().unwrap_or_default());
//! # };
//! ```

use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::agentnet::agent::Agent;
use crate::agentnet::client_wrapper::Message;
use crate::agentnet::config::NetworkConfig;
use crate::agentnet::context::context_for;
use crate::agentnet::error::NetworkError;
use crate::agentnet::event::{EventHandler, NetworkEvent};
use crate::agentnet::router::{FnRouter, Router};
use crate::agentnet::state::NetworkState;

/// Registry of agents plus the routing strategy and state of a run.
pub struct AgentNetwork {
    agents: HashMap<String, Agent>,
    router: Option<Box<dyn Router>>,
    entry_point: Option<String>,
    state: NetworkState,
    config: NetworkConfig,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Default for AgentNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentNetwork {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            router: None,
            entry_point: None,
            state: NetworkState::new(),
            config: NetworkConfig::default(),
            event_handler: None,
        }
    }

    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an [`EventHandler`] (builder pattern).
    ///
    /// The handler receives [`NetworkEvent`]s from `run()` and is propagated to every agent
    /// already registered or added later.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        for agent in self.agents.values_mut() {
            agent.set_event_handler(Arc::clone(&handler));
        }
        self.event_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Register an agent under its name.
    ///
    /// Fails when the name is empty. Registering a second agent under an existing name
    /// replaces the first one.
    pub fn add_agent(&mut self, mut agent: Agent) -> Result<(), NetworkError> {
        if agent.name.trim().is_empty() {
            return Err(NetworkError::configuration(
                "Agent in a network must have a name.",
            ));
        }
        if let Some(handler) = &self.event_handler {
            agent.set_event_handler(Arc::clone(handler));
        }
        let name = agent.name.clone();
        if self.agents.insert(name.clone(), agent).is_some() {
            warn!("Agent: {} was already registered; replacing it", name);
        }
        info!("Agent: {} added to the network", name);
        Ok(())
    }

    pub fn remove_agent(&mut self, name: &str) -> Option<Agent> {
        self.agents.remove(name)
    }

    pub fn get_agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    pub fn get_agent_mut(&mut self, name: &str) -> Option<&mut Agent> {
        self.agents.get_mut(name)
    }

    /// Registered agents, in no particular order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Registered names, sorted.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Install the routing strategy. Replaces any previously installed router.
    pub fn set_router(&mut self, router: impl Router + 'static) {
        self.router = Some(Box::new(router));
        info!("Router has been set.");
    }

    /// Install a plain function as the router.
    pub fn set_router_fn<F>(&mut self, func: F)
    where
        F: Fn(&NetworkState) -> Option<String> + Send + Sync + 'static,
    {
        self.set_router(FnRouter::new(func));
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn has_router(&self) -> bool {
        self.router.is_some()
    }

    /// Choose the agent that takes the first turn of every run.
    pub fn set_entry_point(&mut self, agent_name: &str) -> Result<(), NetworkError> {
        if !self.agents.contains_key(agent_name) {
            return Err(NetworkError::Configuration(format!(
                "Entry point agent: {} not found in the network.",
                agent_name
            )));
        }
        self.entry_point = Some(agent_name.to_string());
        self.state.next_agent_name = self.entry_point.clone();
        info!("Network entry point set to {}", agent_name);
        Ok(())
    }

    /// State of the current (or last) run. Still meaningful after `run` failed.
    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn into_state(self) -> NetworkState {
        self.state
    }

    /// Run with the configured round budget ([`NetworkConfig::max_rounds`]).
    pub async fn run(&mut self, initial_input: &str) -> Result<&NetworkState, NetworkError> {
        let max_rounds = self.config.max_rounds;
        self.run_with_max_rounds(initial_input, max_rounds).await
    }

    /// Run the network on `initial_input` for at most `max_rounds` agent turns.
    ///
    /// The transcript and result of any previous run are discarded; every run begins at the
    /// entry point set with [`set_entry_point`](Self::set_entry_point), so a network can be
    /// run repeatedly.
    ///
    /// Exhausting the budget is not an error: the run ends with
    /// [`NetworkConfig::round_limit_result`] as its `result`. When the router finishes,
    /// `result` is the content of the last transcript entry.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::Configuration`] when no router or entry point is set
    /// - [`NetworkError::UnknownAgent`] when the router names an unregistered agent
    /// - [`NetworkError::Collaborator`] when a model call or the router itself fails
    pub async fn run_with_max_rounds(
        &mut self,
        initial_input: &str,
        max_rounds: usize,
    ) -> Result<&NetworkState, NetworkError> {
        let router = self.router.as_deref().ok_or_else(|| {
            NetworkError::configuration("Router must be set before running the network")
        })?;
        let entry_point = self.entry_point.clone().ok_or_else(|| {
            NetworkError::configuration("Entry point must be set before running the network")
        })?;

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        self.state.messages.clear();
        self.state.next_agent_name = Some(entry_point.clone());
        self.state.result = None;
        self.state.rounds = 0;
        self.state.started_at = Some(started_at);
        self.state.finished_at = None;
        self.state.messages.push(Message::user(initial_input));

        info!(
            "Network run {} started at {} with {} agents",
            run_id,
            entry_point,
            self.agents.len()
        );
        emit(
            &self.event_handler,
            NetworkEvent::RunStarted {
                run_id: run_id.clone(),
                entry_point,
                agent_count: self.agents.len(),
                max_rounds,
            },
        )
        .await;

        while let Some(current_name) = self.state.next_agent_name.clone() {
            if self.state.rounds >= max_rounds {
                break;
            }
            let round = self.state.rounds + 1;
            let agent = self
                .agents
                .get(&current_name)
                .ok_or_else(|| NetworkError::UnknownAgent(current_name.clone()))?;

            info!("-------- Running Agent: {} --------", current_name);
            let context = context_for(agent, &self.state.messages);
            emit(
                &self.event_handler,
                NetworkEvent::AgentTurnStarted {
                    run_id: run_id.clone(),
                    round,
                    agent_name: current_name.clone(),
                    context_len: context.len(),
                },
            )
            .await;

            let response = agent.generate(&context, None).await?;
            let response_length = response.content.len();
            self.state
                .messages
                .push(Message::from_agent(current_name.clone(), response.content));
            self.state.rounds = round;
            emit(
                &self.event_handler,
                NetworkEvent::AgentTurnCompleted {
                    run_id: run_id.clone(),
                    round,
                    agent_name: current_name,
                    response_length,
                },
            )
            .await;

            let next = router.route(&self.state).await?;
            info!("Router decision: next agent is {:?}", next);
            self.state.next_agent_name = next.clone();
            emit(
                &self.event_handler,
                NetworkEvent::RouterDecided {
                    run_id: run_id.clone(),
                    round,
                    next_agent: next.clone(),
                },
            )
            .await;

            if let Some(name) = next {
                if !self.agents.contains_key(&name) {
                    return Err(NetworkError::UnknownAgent(name));
                }
            }
        }

        let stopped_by_round_limit = self.state.next_agent_name.is_some();
        if stopped_by_round_limit {
            warn!(
                "--- Network Finished: Reached maximum number of rounds ({}) ---",
                max_rounds
            );
            self.state.result = Some(self.config.round_limit_result.clone());
        } else {
            info!("--- Network Finished ---");
            self.state.result = self.state.last_message().map(|m| m.content.to_string());
        }

        let finished_at = Utc::now();
        self.state.finished_at = Some(finished_at);
        emit(
            &self.event_handler,
            NetworkEvent::RunCompleted {
                run_id,
                rounds: self.state.rounds,
                stopped_by_round_limit,
                elapsed_ms: (finished_at - started_at).num_milliseconds(),
            },
        )
        .await;

        Ok(&self.state)
    }
}

async fn emit(handler: &Option<Arc<dyn EventHandler>>, event: NetworkEvent) {
    if let Some(handler) = handler {
        handler.on_network_event(&event).await;
    }
}
