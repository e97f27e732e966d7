use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Seam between the analyzer and the generation backend so retry and parsing
/// logic can be exercised against scripted clients in tests.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Failures from the generation backend. `RateLimited` is the only transient
/// kind; everything else is terminal for a single analysis request.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("generation API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected generation response: {0}")]
    Parse(String),
}

/// Minimal client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let start = std::time::Instant::now();
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "Gemini request failed");
                GenerationError::Network(err.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let message = response.text().await.unwrap_or_default();
            warn!("Gemini rate limit hit");
            return Err(GenerationError::RateLimited(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %message, "Gemini API error");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| GenerationError::Parse(err.to_string()))?;

        let text = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                GenerationError::Parse("response carried no candidate text".to_string())
            })?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini generateContent"
        );

        Ok(text)
    }
}
