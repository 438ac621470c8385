use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Result, Context};

use crate::core::llm_client::SafetySetting;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub llm_settings: LlmSettings,
    /// Replaces the built-in safety settings when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub summary: SummarySettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_entity_types")]
    pub entity_types: Vec<String>,
}

impl ExtractionSettings {
    /// Configured entity types with repeats removed.
    pub fn unique_entity_types(&self) -> Vec<String> {
        dedupe_entity_types(&self.entity_types)
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self { entity_types: default_entity_types() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Word limit for summaries; `0` means no limit.
    #[serde(default = "default_max_length_words")]
    pub max_length_words: u32,
}

impl SummarySettings {
    pub fn limit(&self) -> Option<u32> {
        word_limit(self.max_length_words)
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self { max_length_words: default_max_length_words() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { directory: default_output_directory() }
    }
}

fn default_version() -> String { "1.0".to_string() }
fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_max_length_words() -> u32 { 200 }
fn default_output_directory() -> String { ".".to_string() }

fn default_entity_types() -> Vec<String> {
    ["Name", "Date", "Address", "Phone Number"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// `0` is the "no limit" marker.
pub fn word_limit(max_length_words: u32) -> Option<u32> {
    (max_length_words > 0).then_some(max_length_words)
}

/// One entity type per line. Lines are trimmed, blanks dropped, and repeats
/// removed keeping the first occurrence.
pub fn parse_entity_types(input: &str) -> Vec<String> {
    dedupe_entity_types(input.lines())
}

/// Trims each name, drops blanks and keeps the first occurrence of repeats, in
/// the order given.
pub fn dedupe_entity_types<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entity_types: Vec<String> = Vec::new();

    for name in names {
        let trimmed = name.as_ref().trim();
        if !trimmed.is_empty() && !entity_types.iter().any(|e| e == trimmed) {
            entity_types.push(trimmed.to_string());
        }
    }

    entity_types
}

impl Configuration {
    /// Load configuration from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm_settings.model.trim().is_empty() {
            anyhow::bail!("No model defined in llm_settings");
        }

        if self.llm_settings.base_url.trim().is_empty() {
            anyhow::bail!("No base URL defined in llm_settings");
        }

        if self.llm_settings.timeout == 0 {
            anyhow::bail!("llm_settings.timeout must be greater than zero");
        }

        if self.extraction.entity_types.iter().any(|e| e.trim().is_empty()) {
            anyhow::bail!("Entity types must not be blank");
        }

        Ok(())
    }

    pub fn example() -> Self {
        Configuration {
            name: "PDF Entity Extractor".to_string(),
            description: "Extract entities from or summarize PDF documents".to_string(),
            version: default_version(),
            llm_settings: LlmSettings::default(),
            safety_settings: Some(SafetySetting::defaults()),
            extraction: ExtractionSettings::default(),
            summary: SummarySettings::default(),
            output: OutputSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm_client::{HarmBlockThreshold, HarmCategory};
    use std::io::Write;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: invoices").unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        assert_eq!(config.name, "invoices");
        assert_eq!(config.llm_settings.model, "gemini-1.5-flash");
        assert_eq!(config.llm_settings.timeout, 120);
        assert!(config.safety_settings.is_none());
        assert_eq!(config.extraction.entity_types, vec!["Name", "Date", "Address", "Phone Number"]);
        assert_eq!(config.summary.limit(), Some(200));
        config.validate().unwrap();
    }

    #[test]
    fn test_json_config_with_custom_safety_settings() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "name": "contracts",
                "safety_settings": [
                    {{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH"}}
                ],
                "summary": {{"max_length_words": 0}}
            }}"#
        )
        .unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        assert_eq!(
            config.safety_settings,
            Some(vec![SafetySetting::new(HarmCategory::Harassment, HarmBlockThreshold::BlockOnlyHigh)])
        );
        assert_eq!(config.summary.limit(), None);
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Configuration::example()).unwrap();
        let config: Configuration = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(config.safety_settings, Some(SafetySetting::defaults()));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_blank_entity_type() {
        let mut config = Configuration::example();
        config.extraction.entity_types.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Configuration::example();
        config.llm_settings.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_entity_types() {
        let parsed = parse_entity_types("Name\n  Date \n\nName\nPhone Number\n");
        assert_eq!(parsed, vec!["Name", "Date", "Phone Number"]);
        assert!(parse_entity_types("\n \n").is_empty());
    }

    #[test]
    fn test_configured_entity_types_are_deduplicated() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: invoices\nextraction:\n  entity_types: [Name, Date, Name, \" Date \"]").unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.extraction.unique_entity_types(), vec!["Name", "Date"]);

        let prompt = crate::core::PromptBuilder::build_extraction_prompt(
            "text",
            &config.extraction.unique_entity_types(),
        );
        assert!(prompt.contains("Extract these entities: Name, Date\n"));
    }

    #[test]
    fn test_dedupe_entity_types_keeps_first_occurrence() {
        let names = vec!["Phone Number".to_string(), "Email".to_string(), "Phone Number".to_string()];
        assert_eq!(dedupe_entity_types(&names), vec!["Phone Number", "Email"]);
    }

    #[test]
    fn test_word_limit() {
        assert_eq!(word_limit(0), None);
        assert_eq!(word_limit(150), Some(150));
    }
}
