use crate::common::response::{ErrorBody, MessageBody};
use crate::modules::movie::dto::{MovieListResponse, MoviePage};
use crate::modules::movie::model::MovieRecord;
use crate::modules::upload::dto::UploadResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::upload::handler::upload_file,
        crate::modules::movie::handler::create_movie,
        crate::modules::movie::handler::get_movie,
        crate::modules::movie::handler::list_movies,
    ),
    components(
        schemas(
            UploadResponse,
            MovieRecord,
            MoviePage,
            MovieListResponse,
            MessageBody,
            ErrorBody,
        )
    ),
    tags(
        (name = "Upload", description = "File uploads to blob storage"),
        (name = "Movies", description = "Movie records")
    )
)]
pub struct ApiDoc;
