//! Bounded context assembly and prompt templating.
//!
//! Agents in a network never see the whole transcript. Each turn gets, in order:
//!
//! 1. the agent's own system instruction, if it has one
//! 2. the original request (always the first transcript entry)
//! 3. the most recent transcript entry, only when the transcript holds more than one entry
//!
//! so a call carries at most three messages no matter how long the run has been.

use crate::agentnet::agent::Agent;
use crate::agentnet::client_wrapper::Message;

/// Upper bound on the length of a context built by [`build_context`].
pub const MAX_CONTEXT_MESSAGES: usize = 3;

/// Assemble the context for one turn from a system instruction and the shared transcript.
///
/// ```
/// use agentnet::client_wrapper::Message;
/// use agentnet::context::build_context;
///
/// let transcript = vec![
///     Message::user("summarize topic T"),
///     Message::from_agent("Researcher", "notes"),
///     Message::from_agent("Critic", "too long"),
/// ];
/// let context = build_context(Some(&Message::system("You write.")), &transcript);
/// let contents: Vec<&str> = context.iter().map(|m| &*m.content).collect();
/// assert_eq!(contents, ["You write.", "summarize topic T", "too long"]);
/// ```
pub fn build_context(system: Option<&Message>, transcript: &[Message]) -> Vec<Message> {
    let mut context = Vec::with_capacity(MAX_CONTEXT_MESSAGES);
    if let Some(system) = system {
        context.push(system.clone());
    }
    if let Some(first) = transcript.first() {
        context.push(first.clone());
    }
    if transcript.len() > 1 {
        if let Some(last) = transcript.last() {
            context.push(last.clone());
        }
    }
    context
}

/// [`build_context`] using the agent's session system prompt.
pub fn context_for(agent: &Agent, transcript: &[Message]) -> Vec<Message> {
    build_context(agent.system_prompt(), transcript)
}

/// Substitute every `{input}` placeholder in `template`.
pub fn render_template(template: &str, input: &str) -> String {
    template.replace("{input}", input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agentnet::client_wrapper::Role;

    #[test]
    fn first_turn_sees_system_and_request_only() {
        let transcript = vec![Message::user("go")];
        let context = build_context(Some(&Message::system("sys")), &transcript);
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].role, Role::System);
        assert_eq!(&*context[1].content, "go");
    }

    #[test]
    fn missing_system_prompt_is_skipped() {
        let transcript = vec![Message::user("go"), Message::from_agent("A", "done")];
        let context = build_context(None, &transcript);
        assert_eq!(context.len(), 2);
        assert_eq!(context[1].name.as_deref(), Some("A"));
    }

    #[test]
    fn long_transcripts_stay_bounded() {
        let mut transcript = vec![Message::user("request")];
        for i in 1..50 {
            transcript.push(Message::from_agent("A", format!("turn {}", i)));
        }
        assert_eq!(transcript.len(), 50);

        let context = build_context(Some(&Message::system("sys")), &transcript);
        assert_eq!(context.len(), MAX_CONTEXT_MESSAGES);
        assert_eq!(&*context[1].content, "request");
        assert_eq!(&*context[2].content, "turn 49");
    }

    #[test]
    fn render_replaces_all_placeholders() {
        assert_eq!(
            render_template("Classify: {input}\nAgain: {input}", "refund please"),
            "Classify: refund please\nAgain: refund please"
        );
    }
}
