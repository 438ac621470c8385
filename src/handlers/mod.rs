use anyhow::{Result, Context};
use async_trait::async_trait;
use std::path::Path;
use std::collections::HashMap;

/// Either text that is ready to prompt with, or an in-memory PDF upload.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    Text(String),
    PdfBytes(Vec<u8>),
}

impl DocumentInput {
    pub fn into_text(self) -> Result<String> {
        match self {
            DocumentInput::Text(text) => Ok(text),
            DocumentInput::PdfBytes(bytes) => extract_text_from_pdf(&bytes),
        }
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        DocumentInput::Text(text)
    }
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        DocumentInput::Text(text.to_string())
    }
}

/// Page texts are concatenated, each followed by a newline. A document with no
/// pages yields an empty string.
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .with_context(|| "Failed to extract text from PDF")?;

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages.iter().map(|page| format!("{}\n", page)).collect()
}

#[async_trait]
pub trait DocumentHandler: Send + Sync {
    async fn extract_text(&self, source: &str) -> Result<String>;
    async fn get_metadata(&self, source: &str) -> Result<HashMap<String, String>>;
}

pub struct PdfHandler;

#[async_trait]
impl DocumentHandler for PdfHandler {
    async fn extract_text(&self, source: &str) -> Result<String> {
        let bytes = tokio::fs::read(source).await
            .with_context(|| format!("Failed to read PDF file: {}", source))?;

        extract_text_from_pdf(&bytes)
    }

    async fn get_metadata(&self, source: &str) -> Result<HashMap<String, String>> {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.to_string());
        metadata.insert("type".to_string(), "pdf".to_string());

        if let Ok(meta) = tokio::fs::metadata(source).await {
            metadata.insert("size".to_string(), meta.len().to_string());
        }

        Ok(metadata)
    }
}

pub struct TextHandler;

#[async_trait]
impl DocumentHandler for TextHandler {
    async fn extract_text(&self, source: &str) -> Result<String> {
        let bytes = tokio::fs::read(source).await
            .with_context(|| format!("Failed to read text file: {}", source))?;

        Ok(decode_text(&bytes, source))
    }

    async fn get_metadata(&self, source: &str) -> Result<HashMap<String, String>> {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.to_string());
        metadata.insert("type".to_string(), "text".to_string());

        if let Ok(meta) = tokio::fs::metadata(source).await {
            metadata.insert("size".to_string(), meta.len().to_string());
        }

        Ok(metadata)
    }
}

fn decode_text(bytes: &[u8], source: &str) -> String {
    let encoding = if let Some((enc, _)) = encoding_rs::Encoding::for_bom(bytes) {
        enc
    } else {
        encoding_rs::UTF_8
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!("Encoding errors detected in file: {}", source);
    }

    text.into_owned()
}

pub struct DocumentProcessor {
    handlers: HashMap<String, Box<dyn DocumentHandler>>,
}

impl DocumentProcessor {
    pub fn new() -> Self {
        let mut handlers: HashMap<String, Box<dyn DocumentHandler>> = HashMap::new();

        handlers.insert("pdf".to_string(), Box::new(PdfHandler));
        handlers.insert("txt".to_string(), Box::new(TextHandler));

        Self { handlers }
    }

    pub async fn process(&self, source: &str) -> Result<ProcessedDocument> {
        let handler = self.get_handler(source)?;

        let text = handler.extract_text(source).await?;
        let metadata = handler.get_metadata(source).await?;

        Ok(ProcessedDocument {
            source: source.to_string(),
            text,
            metadata,
        })
    }

    fn get_handler(&self, source: &str) -> Result<&dyn DocumentHandler> {
        let extension = Path::new(source)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "txt".to_string());

        self.handlers.get(&extension)
            .or_else(|| self.handlers.get("txt"))
            .map(|handler| handler.as_ref())
            .ok_or_else(|| anyhow::anyhow!("No handler found for file type: {}", extension))
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub source: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl ProcessedDocument {
    /// One-line description for display, e.g. `report.pdf (pdf, 2048 bytes)`.
    pub fn describe(&self) -> String {
        let kind = self.metadata.get("type").map(String::as_str).unwrap_or("unknown");
        match self.metadata.get("size") {
            Some(size) => format!("{} ({}, {} bytes)", self.source, kind, size),
            None => format!("{} ({})", self.source, kind),
        }
    }
}
