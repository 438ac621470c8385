use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Sampling parameters forwarded to the generation API on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl SamplingConfig {
    /// Greedy-equivalent sampling so repeated extractions of the same input are stable.
    pub const EXTRACTION: SamplingConfig = SamplingConfig {
        temperature: 0.0,
        top_p: 1.0,
        top_k: 1,
    };

    pub const SUMMARY: SamplingConfig = SamplingConfig {
        temperature: 0.2,
        top_p: 0.95,
        top_k: 40,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// A category/threshold pair telling the provider what to block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self { category, threshold }
    }

    /// Harassment, hate speech, sexual content and dangerous content, all at
    /// `BLOCK_MEDIUM_AND_ABOVE`.
    pub fn defaults() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting::new(category, HarmBlockThreshold::BlockMediumAndAbove))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
}

/// The single network-facing boundary: one prompt in, raw model text out.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        safety_settings: &[SafetySetting],
    ) -> Result<GenerationResponse>;
}

// --- Gemini wire format ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a SamplingConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        safety_settings: &[SafetySetting],
    ) -> Result<GenerationResponse> {
        let start_time = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: sampling,
            safety_settings,
        };

        debug!("Sending request to Gemini model {}: {:?}", self.model, sampling);

        let response = self.client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, error_text);
        }

        let completion: GenerateContentResponse = response.json().await
            .context("Failed to parse Gemini response")?;

        let candidate = match completion.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = completion.prompt_feedback.and_then(|f| f.block_reason);
                match reason {
                    Some(reason) => anyhow::bail!("Prompt blocked: {}", reason),
                    None => anyhow::bail!("No candidates in response"),
                }
            }
        };

        let text = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        debug!("Gemini responded in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(GenerationResponse { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
        GeminiClient::new(server.url(), "test-key".to_string(), "gemini-1.5-flash".to_string(), 5).unwrap()
    }

    #[test]
    fn test_default_safety_settings() {
        let defaults = SafetySetting::defaults();
        assert_eq!(defaults.len(), 4);
        assert!(defaults.iter().all(|s| s.threshold == HarmBlockThreshold::BlockMediumAndAbove));
        let categories: Vec<HarmCategory> = defaults.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                HarmCategory::Harassment,
                HarmCategory::HateSpeech,
                HarmCategory::SexuallyExplicit,
                HarmCategory::DangerousContent,
            ]
        );
    }

    #[test]
    fn test_safety_setting_wire_names() {
        let value = serde_json::to_value(SafetySetting::new(
            HarmCategory::HateSpeech,
            HarmBlockThreshold::BlockOnlyHigh,
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_ONLY_HIGH"})
        );
    }

    #[tokio::test]
    async fn test_generate_sends_sampling_and_safety() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {"temperature": 0.0, "topP": 1.0, "topK": 1},
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{"content": {"parts": [{"text": "{\"A\": "}, {"text": "1}"}]}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let safety = vec![SafetySetting::new(
            HarmCategory::Harassment,
            HarmBlockThreshold::BlockMediumAndAbove,
        )];
        let response = client
            .generate("hello", &SamplingConfig::EXTRACTION, &safety)
            .await
            .unwrap();

        assert_eq!(response.text, "{\"A\": 1}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Quota exceeded for project")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .generate("hello", &SamplingConfig::SUMMARY, &SafetySetting::defaults())
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("429"));
        assert!(message.contains("Quota exceeded for project"));
    }

    #[tokio::test]
    async fn test_generate_reports_block_reason() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .generate("hello", &SamplingConfig::EXTRACTION, &[])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Prompt blocked: SAFETY"));
    }
}
