//! Map-link coordinate extraction and reverse geocoding.
//!
//! Google Maps share links carry the place pin as `!3d<lat>!4d<lng>` and the
//! viewport centre as `@<lat>,<lng>`. The pin is the place itself, so it wins
//! when both are present.

use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::vendors::Region;

lazy_static! {
    static ref PIN_REGEX: Regex =
        Regex::new(r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").expect("pin regex");
    static ref VIEWPORT_REGEX: Regex =
        Regex::new(r"@(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").expect("viewport regex");
}

const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("makan-index/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Pull the place coordinates out of a Google Maps URL, if any.
pub fn extract_coordinates(maps_url: &str) -> Option<Coordinates> {
    let captures = PIN_REGEX
        .captures(maps_url)
        .or_else(|| VIEWPORT_REGEX.captures(maps_url))?;
    let latitude = captures[1].parse().ok()?;
    let longitude = captures[2].parse().ok()?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("no coordinates found in the supplied maps url")]
    NoCoordinates,
    #[error("reverse geocode lookup failed: {0}")]
    Lookup(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

/// Result of resolving a maps link: the pin plus whatever the geocoder knows.
#[derive(Debug, Serialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub state: Option<Region>,
}

/// Look up the address and state for a coordinate pair via Nominatim.
pub async fn reverse_geocode(coords: Coordinates) -> Result<ResolvedLocation, GeoError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(GeoError::Lookup)?;
    let url = format!(
        "{NOMINATIM_BASE}/reverse?lat={}&lon={}&format=json",
        coords.latitude, coords.longitude
    );
    debug!(%url, "reverse geocoding");
    let payload: NominatimReverse = client
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(GeoError::Lookup)?
        .error_for_status()
        .map_err(GeoError::Lookup)?
        .json()
        .await
        .map_err(GeoError::Lookup)?;

    let state = payload
        .address
        .and_then(|address| address.state)
        .and_then(|name| Region::from_geocoded(&name));
    Ok(ResolvedLocation {
        latitude: coords.latitude,
        longitude: coords.longitude,
        address: payload.display_name,
        state,
    })
}

#[derive(Debug, Deserialize)]
struct ResolveParams {
    maps_url: String,
}

pub fn geo_router() -> Router {
    Router::new().route("/api/v1/geo/resolve", get(resolve_handler))
}

async fn resolve_handler(Query(params): Query<ResolveParams>) -> Response {
    let Some(coords) = extract_coordinates(&params.maps_url) else {
        return error_response(GeoError::NoCoordinates);
    };
    match reverse_geocode(coords).await {
        Ok(location) => (StatusCode::OK, Json(location)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: GeoError) -> Response {
    let status = match err {
        GeoError::NoCoordinates => StatusCode::BAD_REQUEST,
        GeoError::Lookup(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
