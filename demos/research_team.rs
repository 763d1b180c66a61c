//! Research Team Demo
//!
//! A Researcher gathers facts, a Writer turns them into prose, and a Supervisor model decides
//! after every turn who acts next or whether the request is done. A triage classifier in
//! front decides whether a question deserves the team or a single quick answer.
//!
//! To run this example, set your key (and optionally an OpenAI compatible endpoint):
//! export OPENAI_API_KEY=your_openai_key
//! export OPENAI_BASE_URL=http://localhost:11434/v1 (optional)
//!
//! Then run: cargo run --example research_team -- "How do tides work?"

use agentnet::clients::openai::{Model, OpenAIClient};
use agentnet::event::{EventHandler, NetworkEvent};
use agentnet::{Agent, AgentNetwork, LLMRouter, NetworkConfig, StaticRouter};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

struct Progress;

#[async_trait]
impl EventHandler for Progress {
    async fn on_network_event(&self, event: &NetworkEvent) {
        match event {
            NetworkEvent::AgentTurnStarted { round, agent_name, .. } => {
                println!("[round {}] {} is working...", round, agent_name)
            }
            NetworkEvent::RouterDecided { next_agent: Some(next), .. } => {
                println!("  supervisor -> {}", next)
            }
            NetworkEvent::RouterDecided {
                next_agent: None, ..
            } => println!("  supervisor -> done"),
            NetworkEvent::RouteSelected { label } => println!("triage -> {}", label),
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    agentnet::init_logger();
    println!("=== agentnet Research Team ===\n");

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Explain how tides work and why there are two a day.".to_string());
    let client = || -> Result<Arc<OpenAIClient>, Box<dyn std::error::Error>> {
        Ok(Arc::new(OpenAIClient::from_env(Model::GPT41Mini.as_str())?))
    };

    let mut team = AgentNetwork::new()
        .with_config(NetworkConfig::default().with_max_rounds(6))
        .with_event_handler(Arc::new(Progress));
    team.add_agent(Agent::new("Researcher", client()?).with_system_prompt(
        "You collect accurate, relevant facts for the request as a short bullet list. \
         You do not write prose.",
    ))?;
    team.add_agent(Agent::new("Writer", client()?).with_system_prompt(
        "You turn research notes into a clear answer of two or three paragraphs.",
    ))?;
    let supervisor = LLMRouter::new(Agent::new("Supervisor", client()?), &team);
    team.set_router(supervisor);
    team.set_entry_point("Researcher")?;

    let triage = Agent::new("Triage", client()?)
        .with_system_prompt("You decide how much effort a question needs.");
    let mut router = StaticRouter::with_labels(
        triage,
        ["quick", "research"],
        "Answer \"quick\" if this can be answered in one sentence from common knowledge, \
         otherwise \"research\".\n\nQuestion: {input}",
    )
    .with_event_handler(Arc::new(Progress));
    router
        .add_route(
            "quick",
            Mutex::new(
                Agent::new("Oracle", client()?).with_system_prompt("Answer in one sentence."),
            ),
        )
        .add_route("research", Mutex::new(team));

    let answer = router.run(&question).await?;
    println!("\n=== Answer ===\n{}", answer);
    Ok(())
}
