use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Uploads are streamed, so axum's fixed 2MB extractor limit is replaced by
/// a configurable cap on the whole request body.
pub fn create_app(state: AppState) -> Router {
    let max_body = state.config.max_upload_bytes;

    crate::routes::configure_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}
