use agentnet::client_wrapper::{ClientWrapper, Message, Role};
use agentnet::event::{EventHandler, NetworkEvent};
use agentnet::schema::ChoiceSchema;
use agentnet::static_router::{FnHandler, RouteHandler, StaticRouter};
use agentnet::{Agent, AgentNetwork, NetworkError, NetworkState};
use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct MockClient {
    response: String,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockClient {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(MockClient {
            response: response.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    async fn send_message(
        &self,
        messages: &[Message],
        _response_format: Option<&ChoiceSchema>,
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(Message::new(Role::Assistant, self.response.as_str()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Handler that tags its output and counts invocations.
struct CountingHandler {
    tag: &'static str,
    calls: AtomicUsize,
}

impl CountingHandler {
    fn new(tag: &'static str) -> Arc<Self> {
        Arc::new(CountingHandler {
            tag,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RouteHandler for CountingHandler {
    async fn run(&self, input: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{}", self.tag, input))
    }
}

fn classifier(reply: &str) -> (Agent, Arc<MockClient>) {
    let client = MockClient::new(reply);
    let agent = Agent::new("Classifier", client.clone()).with_system_prompt("You classify.");
    (agent, client)
}

#[tokio::test]
async fn test_dispatches_to_the_chosen_label() {
    let (agent, _) = classifier(r#"{"route":"X"}"#);
    let x = CountingHandler::new("x");
    let y = CountingHandler::new("y");
    let mut router = StaticRouter::with_labels(agent, ["X", "Y"], "Classify: {input}");
    router.add_route("X", x.clone()).add_route("Y", y.clone());

    let answer = router.run("hello").await.unwrap();
    assert_eq!(answer, "x:hello");
    assert_eq!(x.calls.load(Ordering::SeqCst), 1);
    assert_eq!(y.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_other_label_reaches_other_handler() {
    let (agent, _) = classifier(r#"{"route":"Y"}"#);
    let mut router = StaticRouter::with_labels(agent, ["X", "Y"], "{input}");
    router
        .add_route("X", FnHandler::new(|_: &str| Ok("wrong".to_string())))
        .add_route("Y", FnHandler::new(|input: &str| Ok(input.to_uppercase())));

    assert_eq!(router.run("hello").await.unwrap(), "HELLO");
}

#[tokio::test]
async fn test_label_without_handler_is_unknown_route() {
    let (agent, _) = classifier(r#"{"route":"Z"}"#);
    let mut router = StaticRouter::with_labels(agent, ["X", "Y", "Z"], "{input}");
    router
        .add_route("X", CountingHandler::new("x"))
        .add_route("Y", CountingHandler::new("y"));

    match router.run("hello").await.unwrap_err() {
        NetworkError::UnknownRoute(label) => assert_eq!(label, "Z"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(matches!(
        router.dispatch("W", "hello").await,
        Err(NetworkError::UnknownRoute(_))
    ));
}

#[tokio::test]
async fn test_reply_outside_schema_fails_classification() {
    let (agent, _) = classifier(r#"{"route":"Q"}"#);
    let mut router = StaticRouter::with_labels(agent, ["X"], "{input}");
    let x = CountingHandler::new("x");
    router.add_route("X", x.clone());

    assert!(matches!(
        router.run("hello").await,
        Err(NetworkError::Collaborator(_))
    ));
    assert_eq!(x.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_prompt_template_is_rendered_for_the_classifier() {
    let (agent, client) = classifier(r#"{"route":"X"}"#);
    let mut router = StaticRouter::with_labels(agent, ["X"], "Ticket: {input}\nPick one.");
    router.add_route("X", CountingHandler::new("x"));

    router.run("refund please").await.unwrap();
    router.run("again").await.unwrap();

    let requests = client.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.len(), 2);
        assert_eq!(&*request[0].content, "You classify.");
    }
    assert_eq!(&*requests[0][1].content, "Ticket: refund please\nPick one.");
    assert_eq!(&*requests[1][1].content, "Ticket: again\nPick one.");
}

#[tokio::test]
async fn test_agent_and_network_handlers() {
    let (agent, _) = classifier(r#"{"route":"solo"}"#);
    let solo = Arc::new(tokio::sync::Mutex::new(Agent::new(
        "Solo",
        MockClient::new("solo answer"),
    )));

    let mut team = AgentNetwork::new();
    team.add_agent(Agent::new("Lead", MockClient::new("team answer"))).unwrap();
    team.set_router_fn(|_: &NetworkState| None);
    team.set_entry_point("Lead").unwrap();

    let mut router = StaticRouter::with_labels(agent, ["solo", "team"], "{input}");
    router
        .add_route("solo", solo.clone())
        .add_route("team", tokio::sync::Mutex::new(team));

    assert_eq!(router.run("question").await.unwrap(), "solo answer");
    assert_eq!(solo.lock().await.session().len(), 2);

    assert_eq!(router.dispatch("team", "question").await.unwrap(), "team answer");
}

#[derive(Default)]
struct Labels {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EventHandler for Labels {
    async fn on_network_event(&self, event: &NetworkEvent) {
        if let NetworkEvent::RouteSelected { label } = event {
            self.seen.lock().unwrap().push(label.clone());
        }
    }
}

#[tokio::test]
async fn test_selected_route_is_reported() {
    let (agent, _) = classifier(r#"{"route":"X"}"#);
    let labels = Arc::new(Labels::default());
    let mut router =
        StaticRouter::with_labels(agent, ["X"], "{input}").with_event_handler(labels.clone());
    router.add_route("X", CountingHandler::new("x"));

    router.run("hello").await.unwrap();
    assert_eq!(*labels.seen.lock().unwrap(), vec!["X".to_string()]);
}

#[tokio::test]
async fn test_network_handler_serves_repeated_dispatches() {
    let (agent, _) = classifier(r#"{"route":"team"}"#);
    let mut team = AgentNetwork::new();
    team.add_agent(Agent::new("Lead", MockClient::new("team answer"))).unwrap();
    team.set_router_fn(|_: &NetworkState| None);
    team.set_entry_point("Lead").unwrap();

    let mut router = StaticRouter::with_labels(agent, ["team"], "{input}");
    router.add_route("team", tokio::sync::Mutex::new(team));

    assert_eq!(router.run("q1").await.unwrap(), "team answer");
    assert_eq!(router.run("q2").await.unwrap(), "team answer");
}

#[tokio::test]
async fn test_route_outside_the_label_set_is_still_registered() {
    let (agent, _) = classifier(r#"{"route":"X"}"#);
    let mut router = StaticRouter::with_labels(agent, ["X"], "{input}");
    let manual = CountingHandler::new("manual");
    router
        .add_route("X", CountingHandler::new("x"))
        .add_route("manual", manual.clone());

    assert!(router.has_route("manual"));
    assert!(!router.schema().contains("manual"));
    assert_eq!(router.dispatch("manual", "hi").await.unwrap(), "manual:hi");
    assert_eq!(manual.calls.load(Ordering::SeqCst), 1);
}
