use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::TranscribeError;
use super::service::{ServiceError, SpeechService};
use crate::audio::AudioPayload;
use crate::config::{Config, API_KEY_ENV};

/// generateContent client for the Gemini API
pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiService {
    /// Build the service from configuration.
    ///
    /// A missing credential is a configuration error, reported distinctly
    /// from any network or service failure. The rest of the application
    /// still loads; only the transcription path is unavailable.
    pub fn from_config(cfg: &Config) -> Result<Self, TranscribeError> {
        let api_key = Config::api_key().ok_or(TranscribeError::MissingCredential(API_KEY_ENV))?;
        Ok(Self::new(
            api_key,
            cfg.service.model.clone(),
            cfg.service.endpoint.clone(),
        ))
    }

    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        debug!("Sending generateContent request to model {}", self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .reduce(|mut acc, text| {
                        acc.push_str(&text);
                        acc
                    })
            })
            .ok_or(ServiceError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl SpeechService for GeminiService {
    async fn generate_from_audio(
        &self,
        payload: &AudioPayload,
        instruction: &str,
    ) -> Result<String, ServiceError> {
        let data = base64::engine::general_purpose::STANDARD.encode(payload.bytes());
        let parts = vec![
            Part::inline_data(payload.mime_type(), data),
            Part::text(instruction),
        ];
        self.generate(parts).await
    }

    async fn generate_from_text(&self, prompt: &str) -> Result<String, ServiceError> {
        self.generate(vec![Part::text(prompt)]).await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
