use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Path, Request, State, rejection::PathRejection},
    http::StatusCode,
    routing::get,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Movie, MovieId},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/movies",
            get(list_movies).post(create_movie).put(update_movie).delete(delete_movie),
        )
        .route("/movies/{id}", get(get_movie))
        .with_state(state)
}

/// JSON body extractor that reports every decode failure as
/// [`AppError::InvalidPayload`]. No `Content-Type` is required.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|err| {
            debug!(error = %err, "failed to read request body");
            AppError::InvalidPayload
        })?;

        serde_json::from_slice(&body).map(Payload).map_err(|err| {
            debug!(error = %err, "rejected request payload");
            AppError::InvalidPayload
        })
    }
}

pub async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.store.find_all().await?;
    Ok(Json(movies))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Movie>> {
    let Path(raw_id) = raw_id.map_err(|err| {
        debug!(error = %err, "rejected movie id segment");
        AppError::InvalidMovieId
    })?;
    let id: MovieId = raw_id.parse()?;
    // Lookup failures of any kind read as a bad id to the client.
    let movie = state.store.find_by_id(id).await.map_err(|err| {
        warn!(%id, error = %err, "movie lookup failed");
        AppError::InvalidMovieId
    })?;
    Ok(Json(movie))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Payload(movie): Payload<Movie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let fields = movie.fields();
    let id = state.store.insert(fields.clone()).await?;
    debug!(%id, "created movie");
    Ok((StatusCode::CREATED, Json(Movie::with_id(id, fields))))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Payload(movie): Payload<Movie>,
) -> AppResult<Json<Value>> {
    let matched = match movie.id {
        Some(id) => state.store.replace_fields(id, movie.fields()).await?,
        None => 0,
    };
    debug!(id = ?movie.id, matched, "update movie");

    if matched < 1 {
        return Ok(Json(json!({ "status": "no op" })));
    }
    Ok(Json(json!({ "result": "success" })))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Payload(movie): Payload<Movie>,
) -> AppResult<Json<Value>> {
    let deleted = match movie.id {
        Some(id) => state.store.delete(id).await?,
        None => 0,
    };
    debug!(id = ?movie.id, deleted, "delete movie");

    if deleted < 1 {
        return Ok(Json(json!({ "result": "no op" })));
    }
    Ok(Json(json!({ "result": "success" })))
}
