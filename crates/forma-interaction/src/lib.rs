//! Provider boundary for forma.
//!
//! Hosts the OpenAI implementation of the `ModelGateway` port and the
//! fire-and-forget telemetry sink. Nothing in here is reachable from the
//! domain layer; `forma-application` wires these into the session engine.

pub mod instructions;
pub mod openai_gateway;
pub mod telemetry;

pub use openai_gateway::OpenAiGateway;
pub use telemetry::{TurnRecord, WebhookSink};
