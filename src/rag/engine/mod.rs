//! RAG engine orchestration module.

pub mod core;

pub use core::{GroundedAnswer, RagBackends, RagEngine};
