//! Gemini `generateContent` client used as the voice-phishing classifier.

use super::client::{build_prompt, AnalysisOutcome, Analyzer, EMPTY_RESULT_MESSAGE};
use super::error::AnalysisError;
use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
    generation_config: GenerationConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        if config.api_key.trim().is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
            client,
        })
    }

    /// Send the prompt and return the model's text.
    ///
    /// The key travels in a header and URLs are stripped from transport
    /// errors, so failure messages never carry credentials.
    async fn generate(&self, prompt: String) -> Result<String, AnalysisError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: self.generation_config.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.without_url().to_string()))?;

        body.text().ok_or(AnalysisError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl Analyzer for GeminiClient {
    #[instrument(skip_all, fields(chars = text.chars().count()))]
    async fn analyze(&self, text: &str) -> AnalysisOutcome {
        let prompt = build_prompt(text);

        let result = match tokio::time::timeout(self.timeout, self.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(verdict) => {
                info!("Classification received ({} chars)", verdict.chars().count());
                AnalysisOutcome::Verdict(verdict)
            }
            Err(AnalysisError::EmptyResponse) => {
                error!("Classifier returned no text");
                AnalysisOutcome::Failure(EMPTY_RESULT_MESSAGE.to_string())
            }
            Err(e) => {
                error!("Classification failed: {}", e);
                AnalysisOutcome::Failure(format!("오류가 발생했습니다: {}", e))
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_generation_config() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some("hello".to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.9,
                top_k: 1,
                top_p: 1.0,
                max_output_tokens: 2048,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["topK"], 1);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "위험: "}, {"text": "사기 의심"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("위험: 사기 의심"));
    }

    #[test]
    fn test_response_without_text() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(blocked.text(), None);

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            GeminiClient::new(&config),
            Err(AnalysisError::MissingApiKey)
        ));
    }
}
