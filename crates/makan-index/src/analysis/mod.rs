//! Transcript analysis: one prompt to the generation backend, retried on
//! rate limits with exponential backoff, parsed into an [`AnalysisReport`].

mod client;
mod parser;
mod retry;
mod router;

pub use client::{GeminiClient, GenerationError, GenerativeClient};
pub use parser::{strip_code_fences, AnalysisReport};
pub use retry::{RetryDecision, RetryState, MAX_ATTEMPTS};
pub use router::analysis_router;

use chrono::{Local, NaiveDate};
use tracing::warn;

/// Drives one analysis: prompt construction, the bounded retry loop, and
/// response parsing. Holds no state across calls.
pub struct TranscriptAnalyzer<C> {
    client: C,
    budget: u32,
}

impl<C> TranscriptAnalyzer<C>
where
    C: GenerativeClient,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            budget: MAX_ATTEMPTS,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_budget(client: C, budget: u32) -> Self {
        Self { client, budget }
    }

    pub async fn analyze(&self, transcript: &str) -> Result<AnalysisReport, AnalysisError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(AnalysisError::MissingTranscript);
        }

        let prompt = build_prompt(transcript, Local::now().date_naive());
        let mut retry = RetryState::new(self.budget);

        let raw = loop {
            match self.client.generate(&prompt).await {
                Ok(text) => break text,
                Err(GenerationError::RateLimited(message)) => {
                    let failed = retry.attempt();
                    match retry.on_rate_limit() {
                        RetryDecision::RetryAfter(delay) => {
                            warn!(
                                attempt = failed,
                                wait_secs = delay.as_secs(),
                                "rate limit hit, backing off"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::GiveUp => {
                            return Err(AnalysisError::RateLimitExhausted(message));
                        }
                    }
                }
                Err(other) => return Err(AnalysisError::Generation(other)),
            }
        };

        parser::parse_report(&raw).map_err(AnalysisError::MalformedReport)
    }
}

/// Fixed instruction template. The current date doubles as the fallback
/// review date when the transcript never mentions one.
fn build_prompt(transcript: &str, today: NaiveDate) -> String {
    format!(
        r#"You are an expert food review analyst. Extract the following details from the video transcript provided below.

Return ONLY a raw JSON object (no markdown, no code blocks) with this structure:
{{
    "score": number, // Extracted score (0.0 to 10.0). Look for "I give this a 8.5", "Score: 7", etc. If unsure/not found, return 0.
    "keypoints": ["string", "string", "string"], // 3 short, punchy highlights (max 10 words each). Focus on taste, texture, price, or unique features.
    "review_date": "YYYY-MM-DD" // Estimated date if mentioned (e.g., "Visited on Christmas 2024"), otherwise use today's date "{today}".
}}

Transcript:
{transcript}"#,
        today = today.format("%Y-%m-%d"),
        transcript = transcript,
    )
}

/// Error raised by the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("transcript is required")]
    MissingTranscript,
    #[error("no API key provided and none configured on the server")]
    MissingApiKey,
    #[error(
        "rate limit exceeded after {MAX_ATTEMPTS} attempts; wait a moment and try again, or check your API quota ({0})"
    )]
    RateLimitExhausted(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("could not parse analysis response: {0}")]
    MalformedReport(#[source] serde_json::Error),
}
