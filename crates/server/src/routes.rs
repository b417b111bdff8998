//! HTTP routes for the annotation store API.
//!
//! Wire contract (shared with the client crate):
//!
//! - `GET  /api/{segment}/{key}` -> `{ <field>: payload }`; absent records
//!   answer an empty payload with 200, not an HTTP error
//! - `POST /api/{segment}/{key}` -> `{ "status": "saved", <field>, url, timestamp }`
//! - `DELETE /api/{segment}/{key}` -> `{ "status": "deleted", "id": key }`

use crate::error::ApiError;
use crate::storage::FileStore;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use urlmark_core::ArtifactKind;

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    note: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DrawingRequest {
    #[serde(default)]
    drawing: Option<Value>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Build the API router over a file store.
pub fn router(store: Arc<FileStore>) -> Router {
    Router::new()
        .route(
            &format!("/api/{}/:key", ArtifactKind::Note.segment()),
            get(get_note).post(save_note).delete(delete_note),
        )
        .route(
            &format!("/api/{}/:key", ArtifactKind::Drawing.segment()),
            get(get_drawing).post(save_drawing).delete(delete_drawing),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

async fn get_note(State(store): State<Arc<FileStore>>, Path(key): Path<String>) -> Result<Json<Value>, ApiError> {
    let note = store.read_note(&key).await?.unwrap_or_default();
    Ok(Json(json!({ "note": note })))
}

async fn save_note(
    State(store): State<Arc<FileStore>>, Path(key): Path<String>, Json(req): Json<NoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let timestamp = req.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    store.write_note(&key, &req.note, &req.url).await?;
    tracing::debug!(key, url = %req.url, "note saved");
    Ok(Json(json!({
        "status": "saved",
        "note": req.note,
        "url": req.url,
        "timestamp": timestamp,
    })))
}

async fn delete_note(State(store): State<Arc<FileStore>>, Path(key): Path<String>) -> Result<Json<Value>, ApiError> {
    store.delete_note(&key).await?;
    tracing::debug!(key, "note deleted");
    Ok(Json(json!({ "status": "deleted", "id": key })))
}

async fn get_drawing(State(store): State<Arc<FileStore>>, Path(key): Path<String>) -> Result<Json<Value>, ApiError> {
    let drawing = store.read_drawing(&key).await?;
    Ok(Json(json!({ "drawing": drawing })))
}

async fn save_drawing(
    State(store): State<Arc<FileStore>>, Path(key): Path<String>, Json(req): Json<DrawingRequest>,
) -> Result<Json<Value>, ApiError> {
    let timestamp = req.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let scene = req.drawing.unwrap_or_else(|| json!({}));
    store.write_drawing(&key, &scene).await?;
    tracing::debug!(key, url = %req.url, "drawing saved");
    Ok(Json(json!({
        "status": "saved",
        "drawing": scene,
        "url": req.url,
        "timestamp": timestamp,
    })))
}

async fn delete_drawing(State(store): State<Arc<FileStore>>, Path(key): Path<String>) -> Result<Json<Value>, ApiError> {
    store.delete_drawing(&key).await?;
    tracing::debug!(key, "drawing deleted");
    Ok(Json(json!({ "status": "deleted", "id": key })))
}
