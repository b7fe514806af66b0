use super::model::MovieRecord;
use crate::common::response::MessageBody;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Without parameters the whole collection is returned.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMoviesQuery {
    /// Page size, enables pagination.
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<u32>,
    /// `nextCursor` from the previous page.
    pub cursor: Option<String>,
}

impl ListMoviesQuery {
    pub fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.cursor.is_some()
    }

    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub items: Vec<MovieRecord>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MovieListResponse {
    All(Vec<MovieRecord>),
    Empty(MessageBody),
    Page(MoviePage),
}
