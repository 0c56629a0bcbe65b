//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while binding or invoking tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Static configuration is invalid (detected at bind time).
    Configuration,
    /// The action type cannot be exposed as a tool.
    UnsupportedAction,
    /// No retrieval source was configured, or sources are incompatible.
    RetrievalConfiguration,
    /// Tool call arguments are malformed or invalid.
    InvalidArguments,
    /// A required parameter or input is missing after merging.
    MissingInput,
    /// A referenced tool or flow does not exist.
    NotFound,
    /// The underlying action failed while running.
    Execution,
    /// The execution intake rejected a submission.
    Submission,
    /// A retrieval source failed to answer a query.
    Retrieval,
    /// Serialization/deserialization error.
    Serialization,
}

/// Coarse grouping of [`ErrorKind`]s.
///
/// None of the categories are retried by this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Fatal bind-time errors.
    Configuration,
    /// Call-time errors caused by the arguments of a tool call.
    Argument,
    /// Call-time errors raised while running or submitting an action.
    Execution,
}

impl ErrorKind {
    /// Returns the category this kind belongs to.
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::Configuration | Self::UnsupportedAction | Self::RetrievalConfiguration => {
                ErrorCategory::Configuration
            }
            Self::InvalidArguments | Self::MissingInput | Self::NotFound => {
                ErrorCategory::Argument
            }
            Self::Execution | Self::Submission | Self::Retrieval | Self::Serialization => {
                ErrorCategory::Execution
            }
        }
    }
}

/// A structured error type for tool binding and invocation.
#[derive(Debug, Error)]
#[error(
    "{}{}{}",
    kind.as_ref(),
    field.as_ref().map(|f| format!(" ({f})")).unwrap_or_default(),
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Name of the offending parameter, input or label, if any.
    pub field: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            field: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds an already boxed source error to this error.
    pub fn with_boxed_source(mut self, source: BoxedError) -> Self {
        self.source = Some(source);
        self
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(message)
    }

    /// Creates an unsupported action error.
    pub fn unsupported_action(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedAction).with_message(message)
    }

    /// Creates a retrieval configuration error.
    pub fn retrieval_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RetrievalConfiguration).with_message(message)
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments).with_message(message)
    }

    /// Creates a missing input error naming the absent field.
    pub fn missing_input(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(ErrorKind::MissingInput)
            .with_message(format!("required value '{field}' was not provided"))
            .with_field(field)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound).with_message(message)
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Execution).with_message(message)
    }

    /// Creates a submission error.
    pub fn submission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Submission).with_message(message)
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retrieval).with_message(message)
    }

    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this error was raised while binding.
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization)
            .with_message(error.to_string())
            .with_source(error)
    }
}
