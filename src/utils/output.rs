use anyhow::{Result, Context};
use std::path::{Path, PathBuf};

pub const EXTRACTION_FILE_NAME: &str = "extracted_entities.json";
pub const SUMMARY_FILE_NAME: &str = "summary.txt";

/// Re-indents an extraction result for display and download. Fails when the
/// model output never became valid JSON.
pub fn pretty_entities(entities_json: &str) -> Result<String> {
    let entities: serde_json::Value = serde_json::from_str(entities_json)
        .with_context(|| format!("Error extracting entities: model output is not valid JSON: {}", entities_json))?;

    serde_json::to_string_pretty(&entities)
        .context("Failed to serialize entities")
}

pub async fn write_extraction(directory: &Path, entities_json: &str) -> Result<PathBuf> {
    let content = pretty_entities(entities_json)?;
    write_payload(directory, EXTRACTION_FILE_NAME, &content).await
}

pub async fn write_summary(directory: &Path, summary: &str) -> Result<PathBuf> {
    write_payload(directory, SUMMARY_FILE_NAME, summary).await
}

async fn write_payload(directory: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(directory).await
        .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;

    let path = directory.join(file_name);
    tokio::fs::write(&path, content).await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
