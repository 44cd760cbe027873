//! Read API - contacts, stations and the merged GeoJSON collection

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::aggregate::{Aggregator, Category};
use crate::store::StoreError;

#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored feature is not valid JSON: {0}")]
    Feature(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Read request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Box<RawValue>>,
}

/// Build the HTTP router over an aggregator
pub fn router(aggregator: Arc<Aggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    // `get` would also answer HEAD by running the (pruning) read
    Router::new()
        .route("/contacts", get(list_contacts).head(not_found).fallback(not_found))
        .route("/stations", get(list_stations).head(not_found).fallback(not_found))
        .route("/geojson", get(geojson).head(not_found).fallback(not_found))
        .fallback(not_found)
        .layer(cors)
        .with_state(aggregator)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "invalid request" })),
    )
}

async fn list_contacts(
    State(aggregator): State<Arc<Aggregator>>,
) -> Result<Json<BTreeMap<&'static str, BTreeMap<String, Box<RawValue>>>>, ApiError> {
    list(&aggregator, Category::Contacts)
}

async fn list_stations(
    State(aggregator): State<Arc<Aggregator>>,
) -> Result<Json<BTreeMap<&'static str, BTreeMap<String, Box<RawValue>>>>, ApiError> {
    list(&aggregator, Category::Stations)
}

/// `{"<category>": {key: feature, ...}}`
fn list(
    aggregator: &Aggregator,
    category: Category,
) -> Result<Json<BTreeMap<&'static str, BTreeMap<String, Box<RawValue>>>>, ApiError> {
    let entries = aggregator
        .list_category(category)?
        .into_iter()
        .map(|(key, feature)| Ok((key, RawValue::from_string(feature)?)))
        .collect::<Result<BTreeMap<_, _>, ApiError>>()?;

    Ok(Json(BTreeMap::from([(category.index(), entries)])))
}

async fn geojson(
    State(aggregator): State<Arc<Aggregator>>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let features = aggregator
        .geojson()?
        .into_iter()
        .map(RawValue::from_string)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(FeatureCollection {
        kind: "FeatureCollection",
        features,
    }))
}
