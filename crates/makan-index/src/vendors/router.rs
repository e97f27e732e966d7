use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::domain::{Region, Vendor, VendorPatch};
use super::listing::{ListingQuery, SortOrder};
use super::repository::RepositoryError;
use super::service::{VendorService, VendorServiceError};
use crate::auth::AdminSessions;

pub struct VendorRouterState<R> {
    service: Arc<VendorService<R>>,
    sessions: Arc<AdminSessions>,
}

impl<R> Clone for VendorRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

/// Router builder for the vendor catalogue. Reads are open; mutations
/// require an admin session.
pub fn vendor_router<R>(service: Arc<VendorService<R>>, sessions: Arc<AdminSessions>) -> Router
where
    R: super::repository::VendorRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/vendors",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/vendors/search", get(search_handler::<R>))
        .route(
            "/api/v1/vendors/:id",
            get(fetch_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(VendorRouterState { service, sessions })
}

/// Query-string mirror of [`ListingQuery`]; every parameter is optional and
/// falls back to the sentinel ("no constraint") value.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingParams {
    text: Option<String>,
    state: Option<Region>,
    min_score: Option<f64>,
    sort: Option<SortOrder>,
    page: Option<usize>,
}

impl From<ListingParams> for ListingQuery {
    fn from(params: ListingParams) -> Self {
        ListingQuery {
            text: params.text.unwrap_or_default(),
            state: params.state,
            min_score: params.min_score.unwrap_or(0.0),
            sort: params.sort.unwrap_or_default(),
            page: params.page.unwrap_or(1),
        }
    }
}

async fn list_handler<R>(State(state): State<VendorRouterState<R>>) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    match state.service.list() {
        Ok(vendors) => (StatusCode::OK, Json(vendors)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn search_handler<R>(
    State(state): State<VendorRouterState<R>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    let query = ListingQuery::from(params);
    match state.service.page(&query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn fetch_handler<R>(
    State(state): State<VendorRouterState<R>>,
    Path(id): Path<String>,
) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    match state.service.get(&id) {
        Ok(vendor) => (StatusCode::OK, Json(vendor)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_handler<R>(
    State(state): State<VendorRouterState<R>>,
    headers: HeaderMap,
    Json(vendor): Json<Vendor>,
) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    if let Err(err) = state.sessions.authorize(&headers) {
        return err.into_response();
    }

    match state.service.create(vendor) {
        Ok(vendor) => {
            info!(id = %vendor.id, "vendor created");
            let payload = json!({ "message": "vendor added", "vendor": vendor });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn update_handler<R>(
    State(state): State<VendorRouterState<R>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<VendorPatch>,
) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    if let Err(err) = state.sessions.authorize(&headers) {
        return err.into_response();
    }

    match state.service.update(&id, patch) {
        Ok(vendor) => {
            info!(id = %vendor.id, "vendor updated");
            let payload = json!({ "message": "vendor updated", "vendor": vendor });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn delete_handler<R>(
    State(state): State<VendorRouterState<R>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: super::repository::VendorRepository + 'static,
{
    if let Err(err) = state.sessions.authorize(&headers) {
        return err.into_response();
    }

    match state.service.delete(&id) {
        Ok(vendor) => {
            info!(id = %vendor.id, "vendor deleted");
            let payload = json!({ "message": "vendor deleted", "vendor": vendor });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: VendorServiceError) -> Response {
    let status = match &err {
        VendorServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VendorServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        VendorServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        VendorServiceError::Repository(RepositoryError::Storage(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
