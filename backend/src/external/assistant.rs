//! Gemini client for the farmer-facing assistant

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssistantConfig;

/// Assistant upstream failures
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Gemini API key was rejected")]
    Auth,

    #[error("Gemini rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    Upstream(String),
}

/// Client for the Generative Language `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    models: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
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
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client, or `None` when no API key is configured
    pub fn from_config(config: &AssistantConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            models: config.candidate_models.clone(),
        }))
    }

    /// Generate a reply, trying each candidate model in turn
    pub async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let mut last_error = None;

        for model in &self.models {
            match self.generate_with(model, prompt).await {
                Ok(text) => return Ok(text),
                // every model shares the key, no point trying the rest
                Err(AssistantError::Auth) => return Err(AssistantError::Auth),
                Err(e) => {
                    tracing::warn!("Gemini model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AssistantError::Upstream("no candidate models configured".into())))
    }

    async fn generate_with(&self, model: &str, prompt: &str) -> Result<String, AssistantError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Upstream(format!("Request failed: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AssistantError::Auth),
            StatusCode::TOO_MANY_REQUESTS => return Err(AssistantError::RateLimited),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AssistantError::Upstream(format!(
                    "API returned {}: {}",
                    status, body
                )));
            }
            _ => {}
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Upstream(format!("Failed to parse response: {}", e)))?;

        let text = reply_text(data);
        if text.is_empty() {
            return Err(AssistantError::Upstream("empty response".into()));
        }
        Ok(text)
    }
}

/// Concatenate the text parts of every candidate
fn reply_text(data: GenerateResponse) -> String {
    data.candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> AssistantConfig {
        AssistantConfig {
            api_key: key.map(str::to_string),
            base_url: "http://localhost:9/v1beta/".to_string(),
            candidate_models: vec!["models/gemini-1.5-flash".to_string()],
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_no_key_means_no_client() {
        assert!(GeminiClient::from_config(&config(None)).unwrap().is_none());
        assert!(GeminiClient::from_config(&config(Some("\"\""))).unwrap().is_none());
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let client = GeminiClient::from_config(&config(Some("k"))).unwrap().unwrap();
        assert_eq!(client.base_url, "http://localhost:9/v1beta");
        assert_eq!(client.api_key, "k");
    }

    #[test]
    fn test_response_text_parts_are_joined() {
        let data: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Revise "},{"text":"sus hojas."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(data), "Revise sus hojas.");

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(reply_text(blocked), "");
    }
}
