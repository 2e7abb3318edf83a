//! Use-case layer for forma.
//!
//! Owns the per-session turn pipeline: gateway call, state transition,
//! blueprint synthesis, consistency check, transcript append. One
//! `SessionEngine` per session; sessions share no mutable state.

pub mod consistency;
pub mod engine;

pub use consistency::ConsistencyChecker;
pub use engine::{SessionEngine, TurnOutput, TurnResult};
