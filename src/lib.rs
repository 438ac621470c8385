pub mod config;
pub mod core;
pub mod handlers;
pub mod utils;

pub use self::config::Configuration;
pub use self::core::{EntityExtractor, ExtractorError, GenerationClient, SafetySetting, SamplingConfig};
pub use self::handlers::{DocumentInput, DocumentProcessor};
