use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use makan_index::analysis::{
    AnalysisError, GenerationError, GenerativeClient, TranscriptAnalyzer,
};

/// Replays a scripted sequence of backend responses and counts calls. The
/// inner state is shared so assertions keep working after the client moves
/// into the analyzer.
#[derive(Clone)]
struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().expect("call mutex poisoned")
    }
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().expect("call mutex poisoned") += 1;
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Parse("script exhausted".to_string())))
    }
}

fn report_json() -> String {
    r#"{"score": 8.5, "keypoints": ["Crispy skin", "Worth the queue", "Cheap for KL"], "review_date": "2024-12-25"}"#
        .to_string()
}

fn rate_limited() -> Result<String, GenerationError> {
    Err(GenerationError::RateLimited("quota exceeded".to_string()))
}

#[tokio::test(start_paused = true)]
async fn recovers_after_two_rate_limits_with_doubling_backoff() {
    let client = ScriptedClient::new(vec![rate_limited(), rate_limited(), Ok(report_json())]);
    let analyzer = TranscriptAnalyzer::new(client.clone());

    let started = tokio::time::Instant::now();
    let report = analyzer
        .analyze("crispy roast duck, I give this a 8.5")
        .await
        .expect("third attempt succeeds");

    // 1s after the first limit, 2s after the second.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(client.calls(), 3);
    assert_eq!(report.score, 8.5);
    assert_eq!(report.keypoints.len(), 3);
    assert_eq!(
        report.review_date,
        NaiveDate::from_ymd_opt(2024, 12, 25).expect("valid date")
    );
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_three_rate_limited_attempts() {
    let client = ScriptedClient::new(vec![rate_limited(), rate_limited(), rate_limited()]);
    let analyzer = TranscriptAnalyzer::new(client.clone());

    let err = analyzer
        .analyze("some transcript")
        .await
        .expect_err("budget exhausted");

    assert!(matches!(err, AnalysisError::RateLimitExhausted(_)));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn fenced_json_response_still_parses() {
    let fenced = format!("```json\n{}\n```", report_json());
    let client = ScriptedClient::new(vec![Ok(fenced)]);
    let analyzer = TranscriptAnalyzer::new(client);

    let report = analyzer.analyze("short clip").await.expect("parses");
    assert_eq!(report.score, 8.5);
}

#[tokio::test]
async fn terminal_api_error_is_not_retried() {
    let client = ScriptedClient::new(vec![Err(GenerationError::Api {
        status: 500,
        message: "internal".to_string(),
    })]);
    let analyzer = TranscriptAnalyzer::new(client.clone());

    let err = analyzer.analyze("transcript").await.expect_err("terminal");
    assert!(matches!(err, AnalysisError::Generation(_)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn blank_transcript_never_reaches_the_backend() {
    let client = ScriptedClient::new(Vec::new());
    let analyzer = TranscriptAnalyzer::new(client.clone());

    let err = analyzer.analyze("   \n ").await.expect_err("rejected");
    assert!(matches!(err, AnalysisError::MissingTranscript));
    assert_eq!(client.calls(), 0);
}
