//! Shared run state of an [`AgentNetwork`](crate::network::AgentNetwork).

use chrono::{DateTime, Utc};

use crate::agentnet::client_wrapper::Message;

/// Transcript and control pointer shared across one network run.
///
/// This is a plain record: every invariant (the target names a registered agent, the first
/// message is the original request) is maintained by the network, not here.
#[derive(Debug, Clone, Default)]
pub struct NetworkState {
    /// Append-only transcript of the run, in canonical order.
    pub messages: Vec<Message>,
    /// Agent that runs next. `None` means the run is finished.
    pub next_agent_name: Option<String>,
    /// Final output, set once when the run completes.
    pub result: Option<String>,
    /// Number of agent turns completed in the current run.
    pub rounds: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl NetworkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, including the entry point.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The request that started the run.
    pub fn original_request(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages produced by the named agent, in order.
    pub fn messages_from<'a>(
        &'a self,
        agent_name: &'a str,
    ) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages
            .iter()
            .filter(move |m| m.name.as_deref() == Some(agent_name))
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        let state = NetworkState::new();
        assert!(state.messages.is_empty());
        assert!(state.next_agent_name.is_none());
        assert!(state.result.is_none());
        assert!(!state.is_finished());
    }

    #[test]
    fn reset_clears_target_and_transcript() {
        let mut state = NetworkState::new();
        state.messages.push(Message::user("go"));
        state.messages.push(Message::from_agent("A", "one"));
        state.messages.push(Message::from_agent("B", "two"));
        state.next_agent_name = Some("A".into());
        assert_eq!(state.messages_from("A").count(), 1);
        assert_eq!(&*state.original_request().unwrap().content, "go");

        state.reset();
        assert!(state.messages.is_empty());
        assert!(state.next_agent_name.is_none());
    }
}
