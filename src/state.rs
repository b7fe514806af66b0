use crate::config::settings::AppConfig;
use crate::infrastructure::db::DocumentStore;
use crate::infrastructure::storage::BlobStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blobs: Arc<dyn BlobStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            blobs,
            documents,
        }
    }
}
