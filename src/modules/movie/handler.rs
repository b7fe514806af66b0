use super::dto::{ListMoviesQuery, MovieListResponse};
use super::model::MovieRecord;
use super::service::MovieService;
use crate::common::response::{ApiError, ApiSuccess, ErrorBody};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

const SAVED: &str = "Movie data saved successfully";

/// Store a movie
///
/// The body may be any JSON object. The server assigns the `id`.
#[utoipa::path(
    post,
    path = "/movies",
    request_body(content = String, content_type = "application/json", description = "Any JSON object"),
    responses(
        (status = 200, description = "Movie stored", body = String, content_type = "text/plain"),
        (status = 400, description = "Body is not a JSON object", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Movies"
)]
pub async fn create_movie(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    info!("Adding new movie");

    match MovieService::create(state, &body).await {
        Ok(_) => (StatusCode::OK, SAVED).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie details", body = MovieRecord),
        (status = 400, description = "Missing id", body = ErrorBody),
        (status = 404, description = "Movie not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Movies"
)]
pub async fn get_movie(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting movie details");

    match MovieService::get(state, &id).await {
        Ok(movie) => ApiSuccess(movie, StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List movies
///
/// Without parameters every movie is returned, or `{"message": ...}` when
/// there are none. With `limit` and/or `cursor` a page is returned instead.
#[utoipa::path(
    get,
    path = "/movies",
    params(ListMoviesQuery),
    responses(
        (status = 200, description = "Movies, an empty indicator, or a page", body = MovieListResponse),
        (status = 400, description = "Invalid pagination parameters", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> impl IntoResponse {
    info!("Getting all movies");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable query string");
            return ApiError(rejection.body_text(), StatusCode::BAD_REQUEST).into_response();
        }
    };

    match MovieService::list(state, query).await {
        Ok(movies) => ApiSuccess(movies, StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
