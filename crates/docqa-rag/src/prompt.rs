use docqa_core::types::Chunk;

/// Separator between context passages.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Fill the grounded-answer template.
pub fn rag_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant that provides accurate and informative responses.

Use the following context to answer the question. If the context doesn't contain enough information to answer completely, say so and provide what information you can based on your general knowledge.

Context:
{context}

Question: {question}

Instructions:
- Be concise but comprehensive
- Cite relevant parts of the context when applicable
- If context is insufficient, clearly state this limitation
- Provide helpful and accurate information like Google Gemini would

Answer:"
    )
}

/// Prompt used when chunks exist but no retriever could be built.
pub fn fallback_prompt(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}")
}

pub fn join_context(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}
