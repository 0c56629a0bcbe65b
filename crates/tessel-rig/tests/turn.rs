use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tessel_core::execution::InMemoryIntake;
use tessel_core::flow::{FlowDefinition, FlowInput, InMemoryFlowRepository, InputType};
use tessel_core::resource::{ReleaseFn, Scoped};
use tessel_core::task::TaskRegistry;
use tessel_core::{Error, ErrorKind, FlowAction, Label, Labels, Result, RunContext, TaskAction};
use tessel_rig::TurnBuilder;
use tessel_rig::retrieval::{
    Embedder, InMemoryVectorStoreProvider, RetrievalComposer, RetrievalConfig, RetrievedContent,
    Retriever, RetrieverProvider, StoredDocument,
};
use tessel_rig::tool::{ToolBinder, ToolInvocationRequest};
use uuid::Uuid;

struct AxisEmbedder;

#[async_trait::async_trait]
impl Embedder for AxisEmbedder {
    fn dimensions(&self) -> usize {
        2
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        Ok(if text.contains("refund") {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        })
    }
}

struct WebSearch;

#[async_trait::async_trait]
impl Retriever for WebSearch {
    fn name(&self) -> &str {
        "web"
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        Ok(vec![RetrievedContent::new(format!("web result for {query}"), 0.3)])
    }
}

/// Counts how many web search clients were released.
struct WebSearchProvider {
    released: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl RetrieverProvider for WebSearchProvider {
    async fn build(&self) -> Result<Scoped<Arc<dyn Retriever>>> {
        let released = self.released.clone();
        let retriever: Arc<dyn Retriever> = Arc::new(WebSearch);
        Ok(Scoped::new(
            "web_search",
            retriever,
            ReleaseFn::new(move || {
                released.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ))
    }
}

fn binder(intake: &InMemoryIntake) -> ToolBinder {
    let flows: InMemoryFlowRepository = [FlowDefinition::new("support", "escalate")
        .with_description("Escalates a ticket to a human agent.")
        .with_input(FlowInput::new("ticket", InputType::String))
        .with_input(FlowInput::new("priority", InputType::Int).with_defaults(3))]
    .into_iter()
    .collect();

    ToolBinder::new(TaskRegistry::with_builtins().unwrap())
        .with_flows(flows)
        .with_intake(intake.clone())
}

fn retrieval(released: &Arc<AtomicUsize>) -> RetrievalComposer {
    let documents = vec![
        StoredDocument::new("Refunds take five days.", vec![1.0, 0.0]),
        StoredDocument::new("Shipping is free.", vec![0.0, 1.0]),
    ];

    RetrievalComposer::new(RetrievalConfig::default().with_max_results(1))
        .with_embedding(AxisEmbedder, InMemoryVectorStoreProvider::new(documents))
        .with_retriever_provider(WebSearchProvider {
            released: released.clone(),
        })
}

fn context() -> RunContext {
    RunContext::new()
        .with_execution(Uuid::now_v7(), "support", "assistant")
        .with_labels(Labels::from(vec![Label::new("channel", "chat")]))
}

#[tokio::test]
async fn turn_serves_tools_and_retrieval() {
    let intake = InMemoryIntake::new();
    let released = Arc::new(AtomicUsize::new(0));

    let turn = TurnBuilder::new(binder(&intake))
        .with_action(TaskAction::new("answer", "core.return").with_parameter("format", "..."))
        .with_action(FlowAction::explicit("support", "escalate").with_label("source", "bot"))
        .with_retrieval(retrieval(&released))
        .with_context(context())
        .build()
        .await
        .unwrap();

    assert_eq!(turn.tools().len(), 2);
    assert_eq!(turn.rig_tools().len(), 2);
    assert_eq!(turn.context().resources().len(), 2);

    let specs = turn.tools().specifications();
    let answer = specs[0].name().to_string();
    let escalate = specs[1].name().to_string();
    assert!(specs[0].parameters().has_property("format"));
    assert!(specs[1].parameters().has_property("inputs"));

    let outcome = turn
        .run(async {
            let answered = turn
                .call(&ToolInvocationRequest::new(
                    &answer,
                    json!({ "format": "Five days." }),
                    "call_1",
                ))
                .await?;
            assert_eq!(answered.output.to_value(), json!({ "value": "Five days." }));

            let escalated = turn
                .call(&ToolInvocationRequest::new(
                    &escalate,
                    json!(r#"{"inputs": {"ticket": "T-42"}}"#),
                    "call_2",
                ))
                .await?;
            assert_eq!(escalated.output.to_value()["state"], "CREATED");

            let results = turn.retrieve("refund policy").await?;
            let contents: Vec<_> = results.iter().map(|r| r.content.as_str()).collect();
            assert_eq!(
                contents,
                ["Refunds take five days.", "web result for refund policy"]
            );
            Ok(())
        })
        .await;

    outcome.unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(turn.context().resources().is_empty());

    let submitted = intake.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].inputs["ticket"], "T-42");
    assert!(!submitted[0].inputs.contains_key("priority"));
    assert_eq!(submitted[0].labels.get("channel"), Some("chat"));
    assert_eq!(submitted[0].labels.get("source"), Some("bot"));
}

#[tokio::test]
async fn failing_tool_call_aborts_and_releases() {
    let intake = InMemoryIntake::new();
    let released = Arc::new(AtomicUsize::new(0));

    let turn = TurnBuilder::new(binder(&intake))
        .with_action(FlowAction::explicit("support", "escalate"))
        .with_retrieval(retrieval(&released))
        .with_context(context())
        .build()
        .await
        .unwrap();
    let escalate = turn.tools().specifications()[0].name().to_string();

    let error = turn
        .run(turn.call(&ToolInvocationRequest::new(&escalate, json!({}), "call_1")))
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::MissingInput);
    assert_eq!(error.field.as_deref(), Some("ticket"));
    assert!(intake.is_empty());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

struct Unavailable;

#[async_trait::async_trait]
impl RetrieverProvider for Unavailable {
    async fn build(&self) -> Result<Scoped<Arc<dyn Retriever>>> {
        Err(Error::retrieval("search index is offline"))
    }
}

#[tokio::test]
async fn failed_build_releases_opened_resources() {
    let intake = InMemoryIntake::new();
    let released = Arc::new(AtomicUsize::new(0));
    let ctx = context();

    let error = TurnBuilder::new(binder(&intake))
        .with_action(TaskAction::new("answer", "core.return"))
        .with_retrieval(retrieval(&released).with_retriever_provider(Unavailable))
        .with_context(ctx.clone())
        .build()
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Retrieval);
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(ctx.resources().is_empty());
}

#[tokio::test]
async fn build_rejects_misconfiguration() {
    let intake = InMemoryIntake::new();

    let error = TurnBuilder::new(binder(&intake))
        .with_action(FlowAction::explicit("support", "unknown"))
        .build()
        .await
        .unwrap_err();
    assert!(error.is_configuration());

    let error = TurnBuilder::new(binder(&intake))
        .with_retrieval(RetrievalComposer::default())
        .build()
        .await
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::RetrievalConfiguration);
}
