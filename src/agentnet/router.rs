//! Routing contract between an [`AgentNetwork`](crate::network::AgentNetwork) and the strategy
//! that picks the next agent.
//!
//! After every agent turn the network hands its [`NetworkState`] to the installed [`Router`]
//! and gets back the name of the next agent, or `None` to finish. Any type implementing
//! [`Router`] can be installed; plain functions are wrapped in [`FnRouter`].
//!
//! ```rust
//! use agentnet::router::FnRouter;
//! use agentnet::NetworkState;
//!
//! // Hand every request to the Writer once, then stop.
//! let router = FnRouter::new(|state: &NetworkState| {
//!     let last = state.last_message()?;
//!     (last.name.as_deref() != Some("Writer")).then(|| "Writer".to_string())
//! });
//! # let _ = router;
//! ```

use async_trait::async_trait;
use std::error::Error;

use crate::agentnet::schema::{ChoiceSchema, SchemaError};
use crate::agentnet::state::NetworkState;

/// Strategy that selects the next agent of a network run.
#[async_trait]
pub trait Router: Send + Sync {
    /// Name of the next agent, or `None` to terminate the run.
    ///
    /// Implementations must only return names registered in the network they route for.
    async fn route(
        &self,
        state: &NetworkState,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;
}

/// Adapter turning `Fn(&NetworkState) -> Option<String>` into a [`Router`].
pub struct FnRouter<F> {
    func: F,
}

impl<F> FnRouter<F>
where
    F: Fn(&NetworkState) -> Option<String> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Router for FnRouter<F>
where
    F: Fn(&NetworkState) -> Option<String> + Send + Sync,
{
    async fn route(
        &self,
        state: &NetworkState,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        Ok((self.func)(state))
    }
}

/// Outcome of a routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Continue with the named agent.
    Agent(String),
    /// The request is satisfied.
    Finish,
}

impl RouteDecision {
    /// The router-contract view: `Some(name)` to continue, `None` to stop.
    pub fn into_next_agent(self) -> Option<String> {
        match self {
            RouteDecision::Agent(name) => Some(name),
            RouteDecision::Finish => None,
        }
    }
}

/// Closed set of route outcomes fixed at construction: a list of agent names plus the
/// finish label, answered through a single response field (`route` unless changed with
/// [`RouteSet::with_field`]).
///
/// Decisions are only ever produced by [`RouteSet::decide`], which rejects labels outside
/// the set, so a [`RouteDecision::Agent`] always names a member.
///
/// ```
/// use agentnet::router::{RouteDecision, RouteSet};
///
/// let set = RouteSet::new(["Researcher", "Writer"], "FINISH");
/// assert_eq!(set.decide("FINISH").unwrap(), RouteDecision::Finish);
/// assert_eq!(set.decide("Writer").unwrap(), RouteDecision::Agent("Writer".into()));
/// assert!(set.decide("Editor").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSet {
    agents: Vec<String>,
    finish_label: String,
    field: String,
}

/// Response field used by [`RouteSet::new`].
pub const DEFAULT_ROUTE_FIELD: &str = "route";

impl RouteSet {
    /// Agent names are sorted and deduplicated. A name equal to the finish label is dropped;
    /// the label always means "finish".
    pub fn new<I, S>(agents: I, finish_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let finish_label = finish_label.into();
        let mut agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .filter(|name| *name != finish_label)
            .collect();
        agents.sort();
        agents.dedup();
        Self {
            agents,
            finish_label,
            field: DEFAULT_ROUTE_FIELD.to_string(),
        }
    }

    /// Name the response field carrying the label (builder pattern).
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn finish_label(&self) -> &str {
        &self.finish_label
    }

    /// All labels a model may answer with: agent names, then the finish label.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = self.agents.clone();
        labels.push(self.finish_label.clone());
        labels
    }

    /// One-field schema constraining [`RouteSet::field`] to [`RouteSet::labels`].
    pub fn schema(&self, name: impl Into<String>) -> ChoiceSchema {
        ChoiceSchema::new(name, self.field.clone(), self.labels())
    }

    pub fn decide(&self, label: &str) -> Result<RouteDecision, SchemaError> {
        if label == self.finish_label {
            return Ok(RouteDecision::Finish);
        }
        if self.agents.iter().any(|a| a == label) {
            return Ok(RouteDecision::Agent(label.to_string()));
        }
        Err(SchemaError::OutOfSet {
            field: self.field.clone(),
            value: label.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_router_forwards_the_closure_result() {
        let router = FnRouter::new(|state: &NetworkState| {
            if state.messages.len() < 2 {
                Some("A".to_string())
            } else {
                None
            }
        });
        let mut state = NetworkState::new();
        assert_eq!(router.route(&state).await.unwrap(), Some("A".to_string()));
        state.messages.push(crate::agentnet::client_wrapper::Message::user("x"));
        state.messages.push(crate::agentnet::client_wrapper::Message::user("y"));
        assert_eq!(router.route(&state).await.unwrap(), None);
    }

    #[test]
    fn route_set_never_treats_finish_as_an_agent() {
        let set = RouteSet::new(["B", "A", "FINISH", "A"], "FINISH");
        assert_eq!(set.agents(), &["A".to_string(), "B".to_string()]);
        assert_eq!(set.labels(), vec!["A", "B", "FINISH"]);
        assert_eq!(set.decide("FINISH").unwrap().into_next_agent(), None);
    }

    #[test]
    fn schema_matches_labels() {
        let set = RouteSet::new(["A"], "DONE").with_field("next");
        let schema = set.schema("route");
        assert_eq!(schema.field, "next");
        assert!(schema.contains("A"));
        assert!(schema.contains("DONE"));
        assert!(!schema.contains("FINISH"));
    }

    #[test]
    fn out_of_set_error_names_the_configured_field() {
        let set = RouteSet::new(["A"], "FINISH").with_field("next");
        match set.decide("Z") {
            Err(SchemaError::OutOfSet { field, value }) => {
                assert_eq!(field, "next");
                assert_eq!(value, "Z");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
        assert!(matches!(
            RouteSet::new(["A"], "FINISH").decide("Z"),
            Err(SchemaError::OutOfSet { ref field, .. }) if field == DEFAULT_ROUTE_FIELD
        ));
    }
}
