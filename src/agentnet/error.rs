//! Error taxonomy for agent networks and routers.

use std::error::Error;
use std::fmt;

/// Errors returned by [`AgentNetwork`](crate::network::AgentNetwork),
/// [`LLMRouter`](crate::llm_router::LLMRouter) and
/// [`StaticRouter`](crate::static_router::StaticRouter).
///
/// None of these are retried. When `run` fails, the network's state as mutated up to the
/// failure point is still available through
/// [`AgentNetwork::state`](crate::network::AgentNetwork::state).
///
/// ```
/// use agentnet::error::NetworkError;
///
/// let err = NetworkError::UnknownAgent("Editor".into());
/// assert_eq!(err.to_string(), "Router directed to an unknown agent: Editor");
/// ```
#[derive(Debug)]
pub enum NetworkError {
    /// Missing router or entry point, an unnamed agent, or an entry point that is not
    /// registered.
    Configuration(String),

    /// The router named an agent that is not in the registry.
    UnknownAgent(String),

    /// A static router classified the input under a label with no registered handler.
    UnknownRoute(String),

    /// A model call, schema validation, or route handler failed. The original error is kept
    /// untouched and exposed through [`Error::source`].
    Collaborator(Box<dyn Error + Send + Sync>),
}

impl NetworkError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        NetworkError::Configuration(msg.into())
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            NetworkError::UnknownAgent(name) => {
                write!(f, "Router directed to an unknown agent: {}", name)
            }
            NetworkError::UnknownRoute(label) => write!(f, "Unknown route: {}", label),
            NetworkError::Collaborator(err) => write!(f, "{}", err),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetworkError::Collaborator(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<Box<dyn Error + Send + Sync>> for NetworkError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        NetworkError::Collaborator(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn collaborator_errors_pass_through_unchanged() {
        let inner: Box<dyn Error + Send + Sync> =
            Box::new(io::Error::new(io::ErrorKind::Other, "model unavailable"));
        let err = NetworkError::from(inner);
        assert_eq!(err.to_string(), "model unavailable");
        assert!(err.source().is_some());
    }

    #[test]
    fn configuration_errors_have_no_source() {
        let err = NetworkError::configuration("Router must be set before running the network");
        assert!(err.source().is_none());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
