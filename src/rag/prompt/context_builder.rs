//! Generation prompt assembly from retrieved passages.

use crate::rag::core::record::ScoredResult;
use crate::rag::prompt::personas::Persona;

/// Prompt parts before formatting.
#[derive(Clone, Debug)]
pub struct PromptParts {
    /// Persona instruction to lead with.
    pub persona: Persona,
    /// Retrieved passages, best first.
    pub passages: Vec<ScoredResult>,
    /// The user question.
    pub question: String,
}

/// Enforce the context budget by dropping the lowest-ranked passages.
#[must_use]
pub fn enforce_budget(mut parts: PromptParts, max_context_chars: usize) -> PromptParts {
    while !parts.passages.is_empty() && context_len(&parts.passages) > max_context_chars {
        parts.passages.pop();
    }
    parts
}

fn context_len(passages: &[ScoredResult]) -> usize {
    let newlines = passages.len().saturating_sub(1);
    passages
        .iter()
        .map(|p| p.metadata.text.chars().count())
        .sum::<usize>()
        + newlines
}

/// Build the generation prompt.
///
/// With passages present the prompt carries a context block; without any,
/// the question is asked directly under the persona instruction.
#[must_use]
pub fn build_prompt(parts: &PromptParts) -> String {
    let persona = parts.persona.instruction();
    if parts.passages.is_empty() {
        return format!("{persona}\n\nQuestion: {}\n\nAnswer:", parts.question);
    }

    let mut context = String::new();
    for (i, passage) in parts.passages.iter().enumerate() {
        if i > 0 {
            context.push('\n');
        }
        context.push_str(&passage.metadata.text);
    }

    format!(
        "{persona}\n\nContext from documents:\n{context}\n\nQuestion: {}\n\nAnswer:",
        parts.question
    )
}
