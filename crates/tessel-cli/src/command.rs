//! Command implementations.

use anyhow::Context;
use rig::prelude::EmbeddingsClient;
use rig::providers::openai;
use serde::Serialize;
use tessel_core::execution::InMemoryIntake;
use tessel_core::task::TaskRegistry;
use tessel_core::{Labels, RunContext};
use tessel_nats::{NatsClient, NatsExecutionIntake};
use tessel_rig::retrieval::{InMemoryVectorStoreProvider, RetrievalComposer, RigEmbedder};
use tessel_rig::tool::{ToolBinder, ToolInvocationRequest};
use tessel_rig::{Turn, TurnBuilder};

use crate::TRACING_TARGET_CLI;
use crate::config::{CallArgs, Cli, RetrieveArgs, Toolkit};

/// Where flow executions go.
enum Intake {
    Nats(NatsClient),
    DryRun(InMemoryIntake),
}

async fn binder(cli: &Cli, toolkit: &Toolkit) -> anyhow::Result<(ToolBinder, Intake)> {
    let tasks = TaskRegistry::with_builtins().context("failed to register builtin tasks")?;
    let binder = ToolBinder::new(tasks).with_flows(toolkit.flow_repository());

    match cli.nats.config() {
        Some(config) => {
            let client = NatsClient::connect(config)
                .await
                .context("failed to connect to NATS")?;
            let intake = NatsExecutionIntake::new(&client)
                .await
                .context("failed to prepare the execution stream")?;
            Ok((binder.with_intake(intake), Intake::Nats(client)))
        }
        None => {
            tracing::warn!(
                target: TRACING_TARGET_CLI,
                "NATS is not configured, flow executions are not submitted"
            );
            let intake = InMemoryIntake::new();
            Ok((binder.with_intake(intake.clone()), Intake::DryRun(intake)))
        }
    }
}

impl Intake {
    async fn close(self) -> anyhow::Result<()> {
        match self {
            Self::Nats(client) => client.close().await.context("failed to flush NATS"),
            Self::DryRun(intake) => {
                for record in intake.submitted() {
                    let record = serde_json::to_string(&record)?;
                    tracing::info!(
                        target: TRACING_TARGET_CLI,
                        record = %record,
                        "Execution not submitted (dry run)"
                    );
                }
                Ok(())
            }
        }
    }
}

/// Closes the intake, then returns `outcome` whether it failed or not.
async fn close_after<T>(intake: Intake, outcome: anyhow::Result<T>) -> anyhow::Result<T> {
    intake.close().await?;
    outcome
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn build(builder: TurnBuilder, toolkit: &Toolkit) -> anyhow::Result<Turn> {
    builder
        .with_actions(toolkit.actions.iter().cloned())
        .build()
        .await
        .context("failed to assemble the turn")
}

/// Prints the specifications of all configured tools.
pub async fn tools(cli: &Cli, toolkit: Toolkit) -> anyhow::Result<()> {
    let (binder, intake) = binder(cli, &toolkit).await?;
    let turn = build(TurnBuilder::new(binder), &toolkit).await?;

    print_json(&turn.tools().specifications())?;
    let finished = turn.finish().await.map_err(anyhow::Error::from);
    close_after(intake, finished).await
}

/// Performs one tool call and prints the response.
pub async fn call(cli: &Cli, toolkit: Toolkit, args: &CallArgs) -> anyhow::Result<()> {
    let arguments: serde_json::Value =
        serde_json::from_str(&args.arguments).context("--arguments must be valid JSON")?;

    let (binder, intake) = binder(cli, &toolkit).await?;
    let context = RunContext::new().with_labels(Labels::from(args.labels.clone()));
    let turn = build(TurnBuilder::new(binder).with_context(context), &toolkit).await?;

    let request = ToolInvocationRequest::new(&args.tool, arguments, "cli");
    let response = turn
        .run(turn.call(&request))
        .await
        .with_context(|| format!("tool '{}' failed", args.tool));

    let response = close_after(intake, response).await?;
    print_json(&response)
}

/// Queries the toolkit documents and prints the results.
pub async fn retrieve(cli: &Cli, toolkit: Toolkit, args: &RetrieveArgs) -> anyhow::Result<()> {
    let api_key = cli
        .embedding
        .openai_api_key
        .as_deref()
        .context("an OpenAI API key is required to embed the query")?;

    let client = openai::Client::new(api_key)
        .map_err(|e| anyhow::anyhow!("failed to create the OpenAI client: {e}"))?;
    let model: openai::EmbeddingModel = client.embedding_model_with_ndims(
        cli.embedding.embedding_model.as_str(),
        cli.embedding.embedding_dimensions,
    );

    let composer = RetrievalComposer::new(cli.retrieval.clone()).with_embedding(
        RigEmbedder::new(model),
        InMemoryVectorStoreProvider::new(toolkit.documents.clone()),
    );

    let turn = TurnBuilder::new(ToolBinder::new(TaskRegistry::new()))
        .with_retrieval(composer)
        .build()
        .await
        .context("failed to assemble the turn")?;

    let results = turn
        .run(turn.retrieve(&args.query))
        .await
        .context("retrieval failed")?;

    print_json(&results)
}
