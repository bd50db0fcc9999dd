//! Prompt construction modules.

pub mod context_builder;
pub mod personas;

pub use context_builder::{PromptParts, build_prompt, enforce_budget};
pub use personas::Persona;
