//! Agent and network event system.
//!
//! Implement [`EventHandler`] to receive real-time notifications about:
//!
//! - **Model calls**: when each agent sends to and receives from its LLM
//! - **Network lifecycle**: run start/end, each agent turn, each router decision
//! - **Static dispatch**: which label a [`StaticRouter`](crate::static_router::StaticRouter)
//!   picked
//!
//! Both trait methods have default no-op implementations. A handler registered on an
//! [`AgentNetwork`](crate::network::AgentNetwork) is propagated to every agent added
//! afterwards, so both event kinds arrive through one callback.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentnet::event::{AgentEvent, EventHandler, NetworkEvent};
//! use async_trait::async_trait;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn on_agent_event(&self, event: &AgentEvent) {
//!         if let AgentEvent::CallCompleted { agent_name, response_length, .. } = event {
//!             println!("{} replied with {} chars", agent_name, response_length);
//!         }
//!     }
//!     async fn on_network_event(&self, event: &NetworkEvent) {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::agentnet::client_wrapper::TokenUsage;

/// Events emitted by an [`Agent`](crate::Agent) around each model call.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// Fired before the request goes out.
    CallStarted {
        agent_name: String,
        /// Number of messages in the request context.
        context_len: usize,
        /// `true` when a structured response was requested.
        structured: bool,
    },

    /// Fired after a successful reply.
    CallCompleted {
        agent_name: String,
        tokens_used: Option<TokenUsage>,
        response_length: usize,
    },

    /// Fired when the client (or schema validation) failed.
    CallFailed { agent_name: String, error: String },
}

/// Events emitted by networks and routers.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// `run()` validated its configuration and seeded the transcript.
    RunStarted {
        run_id: String,
        entry_point: String,
        agent_count: usize,
        max_rounds: usize,
    },

    /// An agent is about to be invoked.
    AgentTurnStarted {
        run_id: String,
        round: usize,
        agent_name: String,
        context_len: usize,
    },

    /// The agent's reply was appended to the transcript.
    AgentTurnCompleted {
        run_id: String,
        round: usize,
        agent_name: String,
        response_length: usize,
    },

    /// The router picked the next agent, or `None` to finish.
    RouterDecided {
        run_id: String,
        round: usize,
        next_agent: Option<String>,
    },

    /// The run ended, either because the router finished or the round budget ran out.
    RunCompleted {
        run_id: String,
        rounds: usize,
        stopped_by_round_limit: bool,
        elapsed_ms: i64,
    },

    /// A static router classified its input under `label`.
    RouteSelected { label: String },
}

/// Callback receiving [`AgentEvent`]s and [`NetworkEvent`]s.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_agent_event(&self, _event: &AgentEvent) {}

    async fn on_network_event(&self, _event: &NetworkEvent) {}
}
