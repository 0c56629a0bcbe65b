#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS connection operations.
pub const TRACING_TARGET_CONNECTION: &str = "tessel_nats::connection";

/// Tracing target for execution submissions.
pub const TRACING_TARGET_INTAKE: &str = "tessel_nats::intake";

mod client;
mod config;
mod error;
mod intake;

pub use async_nats::jetstream;
pub use client::NatsClient;
pub use config::NatsConfig;
pub use error::{Error, Result};
pub use intake::NatsExecutionIntake;
