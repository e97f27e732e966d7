use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::client::GeminiClient;
use super::{AnalysisError, GenerationError, TranscriptAnalyzer};
use crate::config::GeminiConfig;

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    transcript: String,
    /// Caller-supplied key; the configured server key is the fallback.
    #[serde(default)]
    api_key: Option<String>,
}

/// Router builder for the transcript analysis endpoint. A fresh client is
/// built per request because the credential can differ per request.
pub fn analysis_router(config: GeminiConfig) -> Router {
    Router::new()
        .route("/api/v1/analyze", post(analyze_handler))
        .with_state(Arc::new(config))
}

async fn analyze_handler(
    State(config): State<Arc<GeminiConfig>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    if request.transcript.trim().is_empty() {
        return error_response(AnalysisError::MissingTranscript);
    }

    let api_key = request
        .api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.api_key.clone());
    let Some(api_key) = api_key else {
        return error_response(AnalysisError::MissingApiKey);
    };

    let client = GeminiClient::new(api_key, config.base_url.clone(), config.model.clone());
    let analyzer = TranscriptAnalyzer::new(client);

    match analyzer.analyze(&request.transcript).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AnalysisError) -> Response {
    let status = match &err {
        AnalysisError::MissingTranscript | AnalysisError::MissingApiKey => StatusCode::BAD_REQUEST,
        AnalysisError::RateLimitExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
        // Upstream API failures keep their original status where it is a
        // valid code; transport and response-shape failures are gateway
        // errors from the caller's point of view.
        AnalysisError::Generation(GenerationError::Api { status, .. }) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        AnalysisError::Generation(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::MalformedReport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %err, "transcript analysis failed");
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn config_without_key() -> GeminiConfig {
        GeminiConfig {
            api_key: None,
            model: "gemini-1.5-flash-8b".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
        }
    }

    async fn post_json(app: Router, payload: serde_json::Value) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/analyze")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response")
    }

    #[tokio::test]
    async fn blank_transcript_is_rejected_before_any_call() {
        let app = analysis_router(config_without_key());
        let response = post_json(app, json!({ "transcript": "   " })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_key_is_rejected_before_any_call() {
        let app = analysis_router(config_without_key());
        let response = post_json(app, json!({ "transcript": "decent mee goreng" })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_api_status_is_passed_through() {
        let response = error_response(AnalysisError::Generation(GenerationError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = error_response(AnalysisError::Generation(GenerationError::Network(
            "connection refused".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
