//! Context and prompt assembly.
//!
//! Retrieved chunks are rendered into a plain-text context block, which is
//! then wrapped with the persona's instructions and the visitor's question.

use crate::constants::CONTEXT_SEPARATOR;
use crate::knowledge::{AssistantPersona, KnowledgeChunk};

/// Placeholder context used when nothing was retrieved.
pub fn no_context_placeholder(owner: &str) -> String {
    format!("No specific information found. Provide a general helpful response about {owner}.")
}

/// Render one chunk as `[CATEGORY] Title:\nContent`.
pub fn render_chunk(chunk: &KnowledgeChunk) -> String {
    format!(
        "[{}] {}:\n{}",
        chunk.category.as_str().to_uppercase(),
        chunk.title,
        chunk.content
    )
}

/// Render `chunks`, in order, into a context block.
///
/// Returns the placeholder for `owner` when `chunks` is empty.
pub fn build_context<'a, I>(chunks: I, owner: &str) -> String
where
    I: IntoIterator<Item = &'a KnowledgeChunk>,
{
    let rendered: Vec<String> = chunks.into_iter().map(render_chunk).collect();
    if rendered.is_empty() {
        return no_context_placeholder(owner);
    }
    rendered.join(CONTEXT_SEPARATOR)
}

/// Build the prompt sent to the model for one user turn.
pub fn build_prompt(persona: &AssistantPersona, context: &str, query: &str) -> String {
    format!(
        "{}\n\n## Retrieved Context (Use this information to answer):\n{}\n\n## User Question:\n{}\n\n## Your Response as {}:",
        persona.system_prompt, context, query, persona.name
    )
}
