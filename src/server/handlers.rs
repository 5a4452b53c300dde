use std::sync::Arc;

use axum::extract::State;
use bytes::Bytes;
use tracing::warn;

use crate::protocol::{self, Mutation};
use crate::server::error::ApiError;
use crate::store::Store;

/// `POST /<table>/add` — one entry per body line
pub async fn add(State(store): State<Arc<Store>>, body: Bytes) -> Result<&'static str, ApiError> {
    mutate(&store, Mutation::Add, &body)
}

/// `POST /<table>/del` — one key per body line
pub async fn del(State(store): State<Arc<Store>>, body: Bytes) -> Result<&'static str, ApiError> {
    mutate(&store, Mutation::Del, &body)
}

fn mutate(store: &Store, mutation: Mutation, body: &[u8]) -> Result<&'static str, ApiError> {
    protocol::apply_body(body, mutation, store).map_err(|e| {
        warn!(?mutation, path = %store.path().display(), "rejected request body: {}", e);
        ApiError::from(e)
    })?;
    Ok("OK")
}

/// `GET /<table>/get` — the whole table, one entry per line
pub async fn get(State(store): State<Arc<Store>>) -> String {
    protocol::render(&store)
}

/// `POST /<table>/save` — write the table to its backing file
pub async fn save(State(store): State<Arc<Store>>) -> Result<&'static str, ApiError> {
    tokio::task::spawn_blocking(move || store.save())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok("OK")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
