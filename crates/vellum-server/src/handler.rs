use std::io;

use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use futures::{future, stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;
use tokio_util::io::{ReaderStream, StreamReader};

use vellum_collate::Collator;

use crate::error::{ServerError, ServerResult};

/// Capacity of the pipe between a collation task and its response body.
const PIPE_CAPACITY: usize = 64 * 1024;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub collator: Collator,
}

#[derive(Debug, Deserialize)]
pub struct CollationParams {
    pub artifacts: Option<String>,
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /artifacts`: every key, sorted.
pub async fn list_artifacts(State(state): State<AppState>) -> ServerResult<Json<Vec<String>>> {
    let mut keys = state.collator.list_artifacts().await?;
    keys.sort();
    Ok(Json(keys))
}

/// `GET /artifacts/:key`: the raw bytes of one artifact.
pub async fn show_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    stream_collation(state.collator, vec![key]).await
}

/// `PUT /artifacts/:key`: store the request body, streamed.
pub async fn store_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Body,
) -> ServerResult<StatusCode> {
    let chunks = body.into_data_stream().map_err(io::Error::other);
    let mut reader = StreamReader::new(chunks);
    state.collator.store_artifact(&key, &mut reader).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /artifacts/:key`
pub async fn remove_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<StatusCode> {
    state.collator.remove_artifact(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /collation?artifacts=k1,k2,...`: the listed artifacts concatenated
/// in order.
pub async fn collate_artifacts(
    State(state): State<AppState>,
    Query(params): Query<CollationParams>,
) -> ServerResult<Response> {
    let keys = parse_artifact_list(params.artifacts.as_deref())?;
    stream_collation(state.collator, keys).await
}

/// Split the comma-separated `artifacts` parameter into an ordered key list.
pub fn parse_artifact_list(raw: Option<&str>) -> ServerResult<Vec<String>> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(raw.split(',').map(str::to_string).collect()),
        _ => Err(ServerError::InvalidRequest(
            "missing artifacts parameter".to_string(),
        )),
    }
}

/// Stream the collation of `keys` as the response body.
///
/// Every key is measured first so a missing artifact is reported as a 404
/// before the status line goes out. The artifacts are then pulled in a
/// separate task through an in-memory pipe. If pulling fails after the
/// response has started (a key removed in the meantime), the body stream
/// ends with an error and the connection is cut instead of completing
/// normally.
async fn stream_collation(collator: Collator, keys: Vec<String>) -> ServerResult<Response> {
    collator.measure_artifacts(&keys).await?;

    let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = collator.collate(&keys, &mut writer).await;
        drop(writer);
        if let Err(e) = &outcome {
            tracing::error!(?keys, error = %e, "collation aborted after response started");
        }
        let _ = done_tx.send(outcome.map(|_| ()));
    });

    let trailer = stream::once(async move {
        match done_rx.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(Err::<Bytes, io::Error>(io::Error::other(e))),
            Err(_) => Some(Err(io::Error::other("collation task ended unexpectedly"))),
        }
    })
    .filter_map(future::ready);

    let body = Body::from_stream(ReaderStream::new(reader).chain(trailer));
    Ok(body.into_response())
}

/// Fallback for paths no route matches.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

/// Fallback for a known path requested with an unsupported method.
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
