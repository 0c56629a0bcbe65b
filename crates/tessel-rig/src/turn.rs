//! Assembly of one conversation turn.

use std::future::Future;

use tessel_core::{ActionDefinition, Error, Result, RunContext};

use crate::TRACING_TARGET;
use crate::retrieval::{ComposedRetriever, RetrievalComposer, RetrievedContent, Retriever};
use crate::tool::{RigTool, ToolBinder, ToolInvocationRequest, ToolResponse, ToolSet};

/// Builder binding the tools and retrieval sources of a turn.
#[derive(Debug, Clone)]
pub struct TurnBuilder {
    binder: ToolBinder,
    actions: Vec<ActionDefinition>,
    retrieval: Option<RetrievalComposer>,
    context: RunContext,
}

impl TurnBuilder {
    /// Creates a builder binding actions with `binder`.
    pub fn new(binder: ToolBinder) -> Self {
        Self {
            binder,
            actions: Vec::new(),
            retrieval: None,
            context: RunContext::new(),
        }
    }

    /// Adds an action to expose as a tool.
    pub fn with_action(mut self, action: impl Into<ActionDefinition>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Adds actions to expose as tools.
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ActionDefinition>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Sets the retrieval sources.
    pub fn with_retrieval(mut self, composer: RetrievalComposer) -> Self {
        self.retrieval = Some(composer);
        self
    }

    /// Sets the context of the invoking execution.
    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }

    /// Binds all tools and composes retrieval.
    ///
    /// On failure, resources already opened for the turn are released before
    /// the error is returned.
    #[tracing::instrument(
        target = TRACING_TARGET,
        skip_all,
        fields(action_count = self.actions.len(), retrieval = self.retrieval.is_some())
    )]
    pub async fn build(self) -> Result<Turn> {
        let resources = self.context.resources().clone();

        let assembled = async {
            let tools = self.binder.bind_all(&self.actions).await?;
            let retriever = match &self.retrieval {
                Some(composer) => Some(composer.compose(&resources).await?),
                None => None,
            };
            Ok::<_, Error>((tools, retriever))
        }
        .await;

        match assembled {
            Ok((tools, retriever)) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    tool_count = tools.len(),
                    "Turn assembled"
                );
                Ok(Turn {
                    tools,
                    retriever,
                    context: self.context,
                })
            }
            Err(error) => {
                if let Err(release) = resources.release_all().await {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %release,
                        "Failed to release resources of an incomplete turn"
                    );
                }
                Err(error)
            }
        }
    }
}

/// The tools and retriever of one conversation turn.
///
/// Tool specifications and the composed retriever are built once; the chat
/// loop then calls them any number of times. Resources opened for the turn
/// live in the context's resource scope and are released by [`Turn::run`] or
/// [`Turn::finish`].
#[derive(Debug, Clone)]
pub struct Turn {
    tools: ToolSet,
    retriever: Option<ComposedRetriever>,
    context: RunContext,
}

impl Turn {
    /// Returns the bound tools.
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Returns the composed retriever, if retrieval is configured.
    pub fn retriever(&self) -> Option<&ComposedRetriever> {
        self.retriever.as_ref()
    }

    /// Returns the context tool calls run in.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Returns the tools as rig tools.
    pub fn rig_tools(&self) -> Vec<RigTool> {
        self.tools.rig_tools(&self.context)
    }

    /// Executes one tool call issued by the model.
    pub async fn call(&self, request: &ToolInvocationRequest) -> Result<ToolResponse> {
        self.tools.invoke(request, &self.context).await
    }

    /// Queries the composed retriever.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedContent>> {
        let retriever = self.retriever.as_ref().ok_or_else(|| {
            Error::retrieval_configuration("no retrieval source is configured for this turn")
        })?;
        retriever.retrieve(query).await
    }

    /// Runs `future` and releases the turn's resources afterwards, whether it
    /// succeeds, fails or panics.
    pub async fn run<T, Fut>(&self, future: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.context.resources().scope(future).await
    }

    /// Releases the turn's resources.
    pub async fn finish(self) -> Result<()> {
        self.context.resources().release_all().await
    }
}
