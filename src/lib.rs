//! # agentnet
//!
//! agentnet coordinates several LLM-backed agents around one user request. A run hands the
//! request to an entry-point agent, records every reply in a shared transcript, and after each
//! turn asks a router who acts next, until the router says the request is done or the round
//! budget runs out.
//!
//! The crate provides:
//!
//! * **Agents**: [`Agent`] pairs a name and a system instruction with a [`ClientWrapper`]
//! * **Networks**: [`AgentNetwork`] owns the agent registry, the installed [`Router`], and the
//!   [`NetworkState`] of the current run
//! * **Routers**: plain functions via [`FnRouter`], or an [`LLMRouter`] that asks a supervisor
//!   model to choose among the registered agents under a closed-set structured response
//! * **Classification routing**: [`StaticRouter`] picks one handler upfront from a label set and
//!   delegates the whole request to it
//! * **Providers**: an OpenAI compatible [`clients::openai::OpenAIClient`]
//!
//! ## Bounded context
//!
//! Agents never see the whole transcript. Each turn an agent receives its own system
//! instruction, the original request, and the most recent transcript entry, so the cost of a
//! call does not grow with the length of the run. Routers see everything.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agentnet::{Agent, AgentNetwork, LLMRouter};
//! use agentnet::clients::openai::OpenAIClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     agentnet::init_logger();
//!     let client = || -> Result<_, Box<dyn std::error::Error>> {
//!         Ok(Arc::new(OpenAIClient::from_env("gpt-4o-mini")?))
//!     };
//!
//!     let mut network = AgentNetwork::new();
//!     network.add_agent(
//!         Agent::new("Researcher", client()?).with_system_prompt("You gather facts."),
//!     )?;
//!     network.add_agent(
//!         Agent::new("Writer", client()?).with_system_prompt("You write the final answer."),
//!     )?;
//!
//!     let router = LLMRouter::new(Agent::new("Supervisor", client()?), &network);
//!     network.set_router(router);
//!     network.set_entry_point("Researcher")?;
//!
//!     let state = network.run("Summarize the history of the transistor").await?;
//!     println!("{}", state.result.as_deref().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// ```rust
/// agentnet::init_logger();
/// agentnet::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `agentnet` module.
pub mod agentnet;

// Re-exporting key items for easier external access.
pub use agentnet::agent;
pub use agentnet::agent::{Agent, AgentResponse};
pub use agentnet::client_wrapper;
pub use agentnet::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
pub use agentnet::clients;
pub use agentnet::config;
pub use agentnet::config::NetworkConfig;
pub use agentnet::context;
pub use agentnet::error;
pub use agentnet::error::NetworkError;
pub use agentnet::event;
pub use agentnet::event::{AgentEvent, EventHandler, NetworkEvent};
pub use agentnet::http_client_pool;
pub use agentnet::llm_router;
pub use agentnet::llm_router::LLMRouter;
pub use agentnet::network;
pub use agentnet::network::AgentNetwork;
pub use agentnet::router;
pub use agentnet::router::{FnRouter, RouteDecision, RouteSet, Router};
pub use agentnet::schema;
pub use agentnet::schema::{ChoiceSchema, SchemaError};
pub use agentnet::session;
pub use agentnet::session::AgentSession;
pub use agentnet::state;
pub use agentnet::state::NetworkState;
pub use agentnet::static_router;
pub use agentnet::static_router::{FnHandler, RouteHandler, StaticRouter};
