// src/agentnet/mod.rs

pub mod agent;
pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod http_client_pool;
pub mod llm_router;
pub mod network;
pub mod router;
pub mod schema;
pub mod session;
pub mod state;
pub mod static_router;

// Let's explicitly export the network types so they don't have to be reached through their
// modules.
pub use agent::Agent;
pub use network::AgentNetwork;
pub use state::NetworkState;
