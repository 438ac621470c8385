use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::LlmSettings;
use crate::core::content_filter::ContentFilter;
use crate::core::error::ExtractorError;
use crate::core::llm_client::{GeminiClient, GenerationClient, SafetySetting, SamplingConfig};
use crate::core::normalizer::ResponseNormalizer;
use crate::core::prompt::PromptBuilder;
use crate::handlers::DocumentInput;

/// Entity extraction and summarization over a single generation client.
///
/// Holds no mutable state: the client handle and the safety settings are fixed
/// at construction and reused for every call.
pub struct EntityExtractor {
    client: Arc<dyn GenerationClient>,
    safety_settings: Vec<SafetySetting>,
}

impl EntityExtractor {
    /// Builds a Gemini-backed extractor. `settings.api_key` is ignored in favor
    /// of `api_key`.
    pub fn new(
        api_key: String,
        settings: &LlmSettings,
        safety_settings: Option<Vec<SafetySetting>>,
    ) -> anyhow::Result<Self> {
        let client = GeminiClient::new(
            settings.base_url.clone(),
            api_key,
            settings.model.clone(),
            settings.timeout,
        )?;

        Ok(Self::with_client(Arc::new(client), safety_settings))
    }

    /// Custom safety settings replace the defaults entirely.
    pub fn with_client(
        client: Arc<dyn GenerationClient>,
        safety_settings: Option<Vec<SafetySetting>>,
    ) -> Self {
        Self {
            client,
            safety_settings: safety_settings.unwrap_or_else(SafetySetting::defaults),
        }
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }

    /// Returns the filtered JSON object as a string. When the model output is not
    /// valid JSON the normalized text is returned unchanged.
    pub async fn extract_entities(
        &self,
        document: impl Into<DocumentInput>,
        entity_types: &[String],
    ) -> Result<String, ExtractorError> {
        let start_time = Instant::now();
        let text = document
            .into()
            .into_text()
            .map_err(|e| ExtractorError::Document(format!("{:#}", e)))?;

        info!("Extracting {} entity types", entity_types.len());

        let prompt = PromptBuilder::build_extraction_prompt(&text, entity_types);
        debug!("Prompt sent to LLM:\n{}", prompt);

        let response = self.client
            .generate(&prompt, &SamplingConfig::EXTRACTION, &self.safety_settings)
            .await
            .map_err(|e| {
                warn!("LLM extraction failed: {:#}", e);
                ExtractorError::Llm(format!("{:#}", e))
            })?;

        debug!("Raw LLM response:\n{}", response.text);

        let normalized = ResponseNormalizer::normalize_extraction(&response.text);
        let result = ContentFilter::apply(&normalized);

        info!("Extraction completed in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(result)
    }

    pub async fn summarize(
        &self,
        document: impl Into<DocumentInput>,
        max_length_words: Option<u32>,
    ) -> Result<String, ExtractorError> {
        let start_time = Instant::now();
        let text = document
            .into()
            .into_text()
            .map_err(|e| ExtractorError::Document(format!("{:#}", e)))?;

        let prompt = PromptBuilder::build_summary_prompt(&text, max_length_words);
        debug!("Summary prompt sent to LLM:\n{}", prompt);

        let response = self.client
            .generate(&prompt, &SamplingConfig::SUMMARY, &self.safety_settings)
            .await
            .map_err(|e| {
                warn!("Summary generation failed: {:#}", e);
                ExtractorError::Summary(format!("{:#}", e))
            })?;

        debug!("Raw summary response:\n{}", response.text);

        let summary = ResponseNormalizer::normalize_summary(&response.text);

        info!(
            "Summary of {} words generated in {:.2}s",
            summary.split_whitespace().count(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(summary)
    }
}
