//! HTTP routes and request/response mapping.
//!
//! Read endpoints are open; every write endpoint requires the shared auth
//! key as a `key` query parameter. Engine outcomes map to HTTP as: found →
//! 200 with body, absent on read → 204 empty, unknown id on write → 422,
//! bad key → 403.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::SojournConfig;
use crate::history::store::SqliteStore;
use crate::history::timeline::Timeline;
use crate::history::types::{BlogPost, NewTrip, Stay, StayPatch};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<rusqlite::Connection>>,
    pub config: Arc<SojournConfig>,
}

/// Build the full route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/history", get(complete_history).post(add_trip))
        .route("/history/current", get(current))
        .route("/history/next", get(next))
        .route("/history/at", get(at_time))
        .route("/history/period", get(period))
        .route("/history/previous", get(previous))
        .route("/history/{id}", patch(update_stay))
        .route(
            "/history/{id}/blog",
            put(attach_blog_post).delete(remove_blog_post),
        )
        .route("/history/{id}/map", put(attach_map))
        .route("/blog/latest", get(latest_blog_post))
        .route("/version", get(version))
        .with_state(state)
}

/// Errors a handler can surface to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid authentication key for this request")]
    InvalidKey,
    #[error("no stay with id {0} exists, so nothing was updated")]
    UnknownStay(i64),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidKey => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
            Self::UnknownStay(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
                    .into_response()
            }
        }
    }
}

/// Run engine work on the blocking pool with the shared connection.
/// Lock poisoning surfaces as an internal error, per the rest of the stack.
async fn run<T, F>(state: AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Timeline<SqliteStore<'_>>) -> anyhow::Result<T> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    let result = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        let timeline = Timeline::new(SqliteStore::new(&conn));
        f(&timeline)
    })
    .await
    .map_err(|e| anyhow::anyhow!("db task failed: {e}"))?;

    result.map_err(ApiError::from)
}

fn check_key(state: &AppState, key: &str) -> Result<(), ApiError> {
    if key != state.config.server.auth_key {
        return Err(ApiError::InvalidKey);
    }
    Ok(())
}

/// 200 with a JSON body, or 204 when there is nothing to report.
fn found_or_empty<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Deserialize)]
struct KeyQuery {
    key: String,
}

#[derive(Deserialize)]
struct DateQuery {
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct PeriodQuery {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

#[derive(Deserialize)]
struct MapRequest {
    url: String,
}

// ── Read endpoints ───────────────────────────────────────────────────────────

async fn complete_history(State(state): State<AppState>) -> Result<Json<Vec<Stay>>, ApiError> {
    let stays = run(state, |t| t.complete_history()).await?;
    Ok(Json(stays))
}

async fn current(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stay = run(state, |t| t.current(Utc::now())).await?;
    Ok(found_or_empty(stay))
}

async fn next(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stay = run(state, |t| t.next(Utc::now())).await?;
    Ok(found_or_empty(stay))
}

async fn at_time(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Response, ApiError> {
    let stay = run(state, move |t| t.at_time(query.date)).await?;
    Ok(found_or_empty(stay))
}

async fn period(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<Stay>>, ApiError> {
    let stays = run(state, move |t| t.period(query.from, query.to)).await?;
    Ok(Json(stays))
}

async fn previous(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Response, ApiError> {
    let stay = run(state, move |t| t.previous(query.date)).await?;
    Ok(found_or_empty(stay))
}

async fn latest_blog_post(State(state): State<AppState>) -> Result<Response, ApiError> {
    let post = run(state, |t| t.latest_blog_post()).await?;
    Ok(found_or_empty(post))
}

/// Reports the running crate version, handy for checking a deploy took.
async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ── Write endpoints ──────────────────────────────────────────────────────────

async fn add_trip(
    State(state): State<AppState>,
    Query(auth): Query<KeyQuery>,
    Json(trip): Json<NewTrip>,
) -> Result<StatusCode, ApiError> {
    check_key(&state, &auth.key)?;
    run(state, move |t| t.add_trip(trip)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_stay(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(auth): Query<KeyQuery>,
    Json(patch): Json<StayPatch>,
) -> Result<StatusCode, ApiError> {
    check_key(&state, &auth.key)?;
    let found = run(state, move |t| t.update_stay(id, patch)).await?;
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownStay(id))
    }
}

async fn attach_blog_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(auth): Query<KeyQuery>,
    Json(post): Json<BlogPost>,
) -> Result<StatusCode, ApiError> {
    check_key(&state, &auth.key)?;
    let found = run(state, move |t| t.attach_blog_post(id, &post.url, &post.name)).await?;
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownStay(id))
    }
}

async fn remove_blog_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(auth): Query<KeyQuery>,
) -> Result<StatusCode, ApiError> {
    check_key(&state, &auth.key)?;
    let found = run(state, move |t| t.remove_blog_post(id)).await?;
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownStay(id))
    }
}

async fn attach_map(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(auth): Query<KeyQuery>,
    Json(body): Json<MapRequest>,
) -> Result<StatusCode, ApiError> {
    check_key(&state, &auth.key)?;
    let found = run(state, move |t| t.attach_map(id, &body.url)).await?;
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownStay(id))
    }
}
