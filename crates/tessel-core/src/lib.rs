#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod action;
mod context;
mod error;
pub mod execution;
pub mod flow;
pub mod label;
pub mod resource;
pub mod task;

pub use action::{ActionDefinition, FlowAction, ParameterSchema, Parameters, TaskAction};
pub use context::RunContext;
pub use error::{BoxedError, Error, ErrorCategory, ErrorKind, Result};
pub use label::{Label, Labels};

/// Tracing target for the core library.
pub const TRACING_TARGET: &str = "tessel_core";

/// Tracing target for turn-scoped resource handling.
pub const TRACING_TARGET_RESOURCE: &str = "tessel_core::resource";
