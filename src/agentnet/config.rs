//! Configuration for agent networks.
//!
//! [`NetworkConfig`] is a plain struct built in code; there is no file format to parse.
//!
//! ```rust
//! use agentnet::NetworkConfig;
//!
//! let config = NetworkConfig::default().with_max_rounds(4);
//! assert_eq!(config.max_rounds, 4);
//! assert_eq!(config.finish_label, "FINISH");
//! ```

/// Result text used when a run exhausts its round budget.
pub const ROUND_LIMIT_RESULT: &str = "Network stopped due to reaching max rounds.";

/// Label an [`LLMRouter`](crate::llm_router::LLMRouter) model returns to end a run.
pub const FINISH_LABEL: &str = "FINISH";

/// Default number of agent turns per run.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Settings shared by an [`AgentNetwork`](crate::network::AgentNetwork) and the routers built
/// against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Round budget used by [`AgentNetwork::run`](crate::network::AgentNetwork::run).
    pub max_rounds: usize,
    /// `result` of a run that stopped on the round budget.
    pub round_limit_result: String,
    /// Terminate sentinel offered to the routing model alongside agent names.
    pub finish_label: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_limit_result: ROUND_LIMIT_RESULT.to_string(),
            finish_label: FINISH_LABEL.to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_round_limit_result(mut self, text: impl Into<String>) -> Self {
        self.round_limit_result = text.into();
        self
    }

    pub fn with_finish_label(mut self, label: impl Into<String>) -> Self {
        self.finish_label = label.into();
        self
    }
}
