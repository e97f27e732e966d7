//! Server-verified admin sessions.
//!
//! The directory's write surface used to be gated by a password comparison in
//! the browser with a persisted "is admin" flag. Here the password check and
//! the session live on the server: a successful login mints an opaque token,
//! and every mutating route presents it as a bearer credential. This is still
//! a single shared password, not an account system.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Issued admin tokens plus the configured password. `None` password means
/// the admin surface is disabled entirely.
pub struct AdminSessions {
    password: Option<String>,
    tokens: Mutex<HashSet<String>>,
}

impl AdminSessions {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Verify the password and mint a session token.
    pub fn login(&self, attempt: &str) -> Result<String, AuthError> {
        let expected = self.password.as_deref().ok_or(AuthError::Disabled)?;
        if attempt != expected {
            return Err(AuthError::InvalidPassword);
        }

        let token = Uuid::new_v4().to_string();
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone());
        Ok(token)
    }

    pub fn revoke(&self, token: &str) {
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }

    pub fn is_authorized(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .contains(token)
    }

    /// Check the `Authorization: Bearer <token>` header against the issued
    /// sessions.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingSession)?;
        if self.is_authorized(token) {
            Ok(())
        } else {
            Err(AuthError::MissingSession)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("admin access is not configured on this server")]
    Disabled,
    #[error("incorrect password")]
    InvalidPassword,
    #[error("admin session required")]
    MissingSession,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InvalidPassword | AuthError::MissingSession => StatusCode::UNAUTHORIZED,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

/// Router builder exposing login/logout for the admin panel.
pub fn admin_router(sessions: Arc<AdminSessions>) -> Router {
    Router::new()
        .route("/api/v1/admin/login", post(login_handler))
        .route("/api/v1/admin/logout", post(logout_handler))
        .with_state(sessions)
}

async fn login_handler(
    State(sessions): State<Arc<AdminSessions>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match sessions.login(&request.password) {
        Ok(token) => {
            info!("admin session issued");
            (StatusCode::OK, Json(json!({ "token": token }))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn logout_handler(State(sessions): State<Arc<AdminSessions>>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        sessions.revoke(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_configured_password() {
        let sessions = AdminSessions::new(None);
        assert!(matches!(sessions.login("anything"), Err(AuthError::Disabled)));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let sessions = AdminSessions::new(Some("sedap".to_string()));
        assert!(matches!(
            sessions.login("tak-sedap"),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[test]
    fn issued_token_authorizes_until_revoked() {
        let sessions = AdminSessions::new(Some("sedap".to_string()));
        let token = sessions.login("sedap").expect("login succeeds");
        assert!(sessions.is_authorized(&token));

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().expect("header value"),
        );
        assert!(sessions.authorize(&headers).is_ok());

        sessions.revoke(&token);
        assert!(sessions.authorize(&headers).is_err());
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let sessions = AdminSessions::new(Some("sedap".to_string()));
        assert!(matches!(
            sessions.authorize(&HeaderMap::new()),
            Err(AuthError::MissingSession)
        ));
    }
}
