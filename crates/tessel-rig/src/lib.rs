#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod placeholder;
pub mod retrieval;
pub mod schema;
pub mod tool;
mod turn;

pub use tessel_core::{Error, ErrorKind, Result};
pub use turn::{Turn, TurnBuilder};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "tessel_rig";

/// Tracing target for tool binding and invocation.
pub const TRACING_TARGET_TOOL: &str = "tessel_rig::tool";

/// Tracing target for retrieval.
pub const TRACING_TARGET_RETRIEVAL: &str = "tessel_rig::retrieval";
