pub mod content_filter;
pub mod error;
pub mod extractor;
pub mod llm_client;
pub mod normalizer;
pub mod prompt;

pub use content_filter::ContentFilter;
pub use error::ExtractorError;
pub use extractor::EntityExtractor;
pub use llm_client::{
    GeminiClient, GenerationClient, GenerationResponse, HarmBlockThreshold, HarmCategory,
    SafetySetting, SamplingConfig,
};
pub use normalizer::ResponseNormalizer;
pub use prompt::PromptBuilder;
