use crate::state::AppState;
use axum::routing::get;
use axum::Router;

pub mod dto;
pub mod handler;
pub mod model;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(handler::list_movies).post(handler::create_movie))
        .route("/movies/{id}", get(handler::get_movie))
}
