use thiserror::Error;

/// Upstream generation failures, tagged with the operation that issued the call.
/// The provider's message is kept verbatim.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Error calling LLM: {0}")]
    Llm(String),

    #[error("Error generating summary: {0}")]
    Summary(String),

    #[error("Error reading document: {0}")]
    Document(String),
}
