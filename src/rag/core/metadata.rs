//! Metadata carried by each stored record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored record.
///
/// The chunk text lives here, alongside provenance fields, so that a search
/// hit carries everything the prompt builder needs without a second lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// The literal chunk text used for keyword matching and prompting.
    pub text: String,
    /// Source document name, if known.
    pub source: Option<String>,
    /// Position of this chunk within its source document.
    pub chunk_index: Option<usize>,
    /// Ingestion timestamp.
    pub created_at: DateTime<Utc>,
    /// Arbitrary caller-supplied tags.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl RecordMetadata {
    /// Create metadata for a chunk of text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            chunk_index: None,
            created_at: Utc::now(),
            extra: HashMap::new(),
        }
    }

    /// Attach the source document name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the chunk position within its source document.
    #[must_use]
    pub const fn with_chunk_index(mut self, index: usize) -> Self {
        self.chunk_index = Some(index);
        self
    }

    /// Attach caller-supplied tags.
    #[must_use]
    pub fn with_extra(mut self, extra: HashMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}
