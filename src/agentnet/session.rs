//! Per-agent message log.
//!
//! An [`AgentSession`] is the ordered conversation an [`Agent`](crate::Agent) keeps when it
//! is used directly through [`Agent::chat`](crate::Agent::chat). Its first `system` entry is
//! the agent's system instruction, which networks and routers read when building context.

use log::{debug, error, info};
use std::error::Error;
use std::fmt;

use crate::agentnet::client_wrapper::{InvalidRole, Message, Role};

/// Errors raised by [`AgentSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Role name outside `{system, user, assistant, tool}`.
    InvalidRole(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidRole(role) => write!(f, "Invalid role: {}", role),
        }
    }
}

impl Error for SessionError {}

impl From<InvalidRole> for SessionError {
    fn from(err: InvalidRole) -> Self {
        SessionError::InvalidRole(err.0)
    }
}

/// Ordered, mutable message log scoped to a single agent.
#[derive(Debug, Clone, Default)]
pub struct AgentSession {
    messages: Vec<Message>,
}

impl AgentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with a system instruction.
    pub fn with_system_prompt(prompt: impl AsRef<str>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Mark the start of a unit of work on this session.
    pub fn begin(&self) {
        info!("Starting agent session...");
    }

    /// Mark the end of a unit of work. Pass the error that aborted it, if any.
    pub fn end(&self, error: Option<&dyn Error>) {
        info!("Ending agent session...");
        if let Some(err) = error {
            error!("Error occurred: {}", err);
        }
    }

    /// Append a message given its role name, e.g. `"user"`.
    ///
    /// ```
    /// use agentnet::session::{AgentSession, SessionError};
    ///
    /// let mut session = AgentSession::new();
    /// session.add_message("user", "hello").unwrap();
    /// assert_eq!(
    ///     session.add_message("narrator", "..."),
    ///     Err(SessionError::InvalidRole("narrator".into()))
    /// );
    /// assert_eq!(session.len(), 1);
    /// ```
    pub fn add_message(
        &mut self,
        role: &str,
        content: impl AsRef<str>,
    ) -> Result<(), SessionError> {
        let role: Role = role.parse()?;
        self.push(Message::new(role, content));
        Ok(())
    }

    pub fn push(&mut self, message: Message) {
        debug!("Adding message: {} - {}", message.role, message.content);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replace the whole log.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// The first `system` entry, if any.
    pub fn system_prompt(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::System)
    }

    /// Replace the system instruction, keeping the rest of the log.
    pub fn set_system_prompt(&mut self, prompt: impl AsRef<str>) {
        match self.messages.iter_mut().find(|m| m.role == Role::System) {
            Some(existing) => *existing = Message::system(prompt),
            None => self.messages.insert(0, Message::system(prompt)),
        }
    }

    pub fn clear(&mut self) {
        info!("Clearing agent session memory...");
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_first_system_entry() {
        let mut session = AgentSession::new();
        session.add_message("user", "hi").unwrap();
        session.add_message("system", "be brief").unwrap();
        session.add_message("system", "ignored").unwrap();
        assert_eq!(&*session.system_prompt().unwrap().content, "be brief");
    }

    #[test]
    fn set_system_prompt_replaces_or_prepends() {
        let mut session = AgentSession::new();
        session.add_message("user", "hi").unwrap();
        session.set_system_prompt("v1");
        assert_eq!(session.messages()[0].role, Role::System);
        session.set_system_prompt("v2");
        assert_eq!(session.len(), 2);
        assert_eq!(&*session.system_prompt().unwrap().content, "v2");
    }

    #[test]
    fn clear_empties_the_log() {
        let mut session = AgentSession::with_system_prompt("x");
        session.clear();
        assert!(session.is_empty());
        assert!(session.system_prompt().is_none());
    }
}
