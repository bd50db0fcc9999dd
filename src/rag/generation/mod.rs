//! Completion model modules.

pub mod generator;

pub use generator::{GenerateFuture, Generator, OllamaGenerator, chunk_generated};
