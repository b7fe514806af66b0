use super::dto::{ListMoviesQuery, MovieListResponse, MoviePage};
use super::model::MovieRecord;
use crate::common::error::AppError;
use crate::common::response::MessageBody;
use crate::common::timeout::bounded;
use crate::infrastructure::db::Document;
use crate::infrastructure::StorageResult;
use crate::state::AppState;
use serde_json::Value;
use tracing::{info, warn};
use validator::Validate;

const NOT_JSON: &str = "Movie data must be sent as JSON";
const NOT_AN_OBJECT: &str = "Movie data must be a JSON object";
const ID_REQUIRED: &str = "The movie id is required to find it";
const NOT_FOUND: &str = "Movie not found";
const NO_MOVIES: &str = "No movies available";
const SAVE_FAILED: &str = "Failed to save movie data";
const READ_FAILED: &str = "Failed to retrieve movie data";

pub struct MovieService;

impl MovieService {
    pub async fn create(state: AppState, body: &[u8]) -> Result<MovieRecord, AppError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Movie data is not valid JSON");
            AppError::malformed(NOT_JSON)
        })?;

        let Value::Object(fields) = value else {
            warn!("Movie data is not a JSON object");
            return Err(AppError::malformed(NOT_AN_OBJECT));
        };

        let record = MovieRecord::new(fields);

        bounded(
            state.config.store_timeout,
            "insert movie",
            state.documents.insert(&record.id, &record.to_document()),
        )
        .await
        .map_err(AppError::storage(SAVE_FAILED))?;

        info!(id = %record.id, "Movie data saved");
        Ok(record)
    }

    pub async fn get(state: AppState, id: &str) -> Result<MovieRecord, AppError> {
        // The id is looked up exactly as given.
        if id.trim().is_empty() {
            warn!("Movie lookup without an id");
            return Err(AppError::validation(ID_REQUIRED));
        }

        let document = bounded(
            state.config.store_timeout,
            "find movie",
            state.documents.find_by_id(id),
        )
        .await
        .map_err(AppError::storage(READ_FAILED))?;

        match document {
            Some(document) => {
                let record = MovieRecord::from_document(document).map_err(AppError::storage(READ_FAILED))?;
                info!(id = %record.id, "Movie retrieved");
                Ok(record)
            }
            None => {
                info!(id, "Movie not found");
                Err(AppError::NotFound(NOT_FOUND.to_string()))
            }
        }
    }

    pub async fn list(state: AppState, query: ListMoviesQuery) -> Result<MovieListResponse, AppError> {
        query.validate().map_err(|e| {
            warn!(error = %e, "Invalid pagination parameters");
            AppError::Validation(e.to_string())
        })?;

        if !query.is_paginated() {
            let documents = bounded(
                state.config.store_timeout,
                "list movies",
                state.documents.list_all(),
            )
            .await
            .map_err(AppError::storage(READ_FAILED))?;

            let movies = into_records(documents).map_err(AppError::storage(READ_FAILED))?;
            info!(count = movies.len(), "Movies retrieved");

            if movies.is_empty() {
                return Ok(MovieListResponse::Empty(MessageBody::new(NO_MOVIES)));
            }
            return Ok(MovieListResponse::All(movies));
        }

        let limit = query.page_size();
        let documents = bounded(
            state.config.store_timeout,
            "list movies",
            state.documents.list_after(query.cursor.as_deref(), limit),
        )
        .await
        .map_err(AppError::storage(READ_FAILED))?;

        let items = into_records(documents).map_err(AppError::storage(READ_FAILED))?;
        let next_cursor = match items.last() {
            Some(last) if items.len() == limit as usize => Some(last.id.clone()),
            _ => None,
        };
        info!(count = items.len(), has_more = next_cursor.is_some(), "Movie page retrieved");

        Ok(MovieListResponse::Page(MoviePage { items, next_cursor }))
    }
}

fn into_records(documents: Vec<Document>) -> StorageResult<Vec<MovieRecord>> {
    documents.into_iter().map(MovieRecord::from_document).collect()
}
