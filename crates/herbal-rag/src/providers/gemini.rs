//! Gemini client for text generation via the Generative Language API
//!
//! One `GeminiClient` is bound to one API key. `GeminiSessionFactory` shares a
//! single HTTP connection pool across sessions so rebuilding a session after a
//! credential rotation is cheap.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::generation::Credential;
use crate::providers::llm::{LlmProvider, ProviderError, SessionFactory};

/// Gemini client bound to a single credential
pub struct GeminiClient {
    http: reqwest::Client,
    credential: Credential,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client for `credential` using an existing HTTP client
    pub fn new(http: reqwest::Client, config: &LlmConfig, credential: Credential) -> Self {
        Self {
            http,
            credential,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config
                .model
                .trim_start_matches("models/")
                .to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Map a non-success HTTP response onto the structured provider error
fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let message = format!("Gemini generation failed ({}): {}", status, body);

    let resource_exhausted = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.status.as_deref() == Some("RESOURCE_EXHAUSTED"))
        .unwrap_or(false);

    if status == StatusCode::TOO_MANY_REQUESTS || resource_exhausted {
        ProviderError::QuotaExceeded(message)
    } else {
        ProviderError::Failed(message)
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    status: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Failed(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("Failed to parse Gemini response: {}", e)))?;

        gen_response
            .into_text()
            .ok_or_else(|| ProviderError::Failed("No text in Gemini response".to_string()))
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Creates `GeminiClient` sessions that share one HTTP client
pub struct GeminiSessionFactory {
    http: reqwest::Client,
    config: LlmConfig,
}

impl GeminiSessionFactory {
    /// Create a factory from config
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

impl SessionFactory for GeminiSessionFactory {
    fn create_session(&self, credential: &Credential) -> Arc<dyn LlmProvider> {
        Arc::new(GeminiClient::new(
            self.http.clone(),
            &self.config,
            credential.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit_status() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_quota());
    }

    #[test]
    fn test_classify_resource_exhausted_body() {
        let body = r#"{"error":{"code":403,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(classify_failure(StatusCode::FORBIDDEN, body).is_quota());
    }

    #[test]
    fn test_classify_other_failures() {
        let body = r#"{"error":{"code":400,"message":"bad","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(!err.is_quota());
        assert!(err.message().contains("400"));

        assert!(!classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "not json").is_quota());
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let mut config = LlmConfig::default();
        config.model = "models/gemini-1.5-flash".to_string();
        config.base_url = "https://example.test/".to_string();
        let client = GeminiClient::new(reqwest::Client::new(), &config, Credential::new("k"));

        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Gừng "},{"text":"chống viêm"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Gừng chống viêm"));

        let blocked: GenerateResponse = serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }
}
