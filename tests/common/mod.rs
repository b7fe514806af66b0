//! In-memory stores and app wiring shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use futures_util::StreamExt;
use movie_catalog::app::create_app;
use movie_catalog::config::settings::AppConfig;
use movie_catalog::infrastructure::db::{Document, DocumentStore};
use movie_catalog::infrastructure::storage::s3::blob_url;
use movie_catalog::infrastructure::storage::{BlobStore, ByteStream, ContainerAccess};
use movie_catalog::infrastructure::{StorageError, StorageResult};
use movie_catalog::state::AppState;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const PUBLIC_URL: &str = "http://blobs.test";

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Container {
    access: Option<ContainerAccess>,
    blobs: HashMap<String, StoredBlob>,
}

#[derive(Default)]
pub struct InMemoryBlobStore {
    containers: Mutex<HashMap<String, Container>>,
    create_calls: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn container_access(&self, container: &str) -> Option<ContainerAccess> {
        self.containers.lock().unwrap().get(container).and_then(|c| c.access)
    }

    pub fn blob(&self, container: &str, name: &str) -> Option<StoredBlob> {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .and_then(|c| c.blobs.get(name).cloned())
    }

    pub fn container_count(&self) -> usize {
        self.containers.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("blob store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        self.check()?;
        Ok(self.containers.lock().unwrap().contains_key(container))
    }

    async fn create_container(&self, container: &str, access: ContainerAccess) -> StorageResult<()> {
        self.check()?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut containers = self.containers.lock().unwrap();
        let entry = containers.entry(container.to_string()).or_default();
        entry.access = Some(access);
        Ok(())
    }

    async fn upload_stream(
        &self,
        container: &str,
        name: &str,
        content_type: &str,
        mut body: ByteStream<'_>,
    ) -> StorageResult<String> {
        self.check()?;
        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk?);
        }

        let mut containers = self.containers.lock().unwrap();
        let entry = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::Backend(format!("no such container: {container}")))?;
        entry.blobs.insert(
            name.to_string(),
            StoredBlob {
                content_type: content_type.to_string(),
                data,
            },
        );

        let base = Url::parse(PUBLIC_URL).expect("valid test url");
        Ok(blob_url(&base, container, name))
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<BTreeMap<String, Document>>,
    failing: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Document> {
        self.documents.lock().unwrap().values().cloned().collect()
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("document store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, id: &str, document: &Document) -> StorageResult<()> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        if documents.contains_key(id) {
            return Err(StorageError::Backend(format!("duplicate id {id}")));
        }
        documents.insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Document>> {
        self.check()?;
        Ok(self.documents.lock().unwrap().get(id).cloned())
    }

    async fn list_all(&self) -> StorageResult<Vec<Document>> {
        self.check()?;
        Ok(self.all())
    }

    async fn list_after(&self, cursor: Option<&str>, limit: u32) -> StorageResult<Vec<Document>> {
        self.check()?;
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| cursor.is_none_or(|c| id.as_str() > c))
            .take(limit as usize)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

pub fn test_config() -> AppConfig {
    let vars = HashMap::from([
        ("STORAGE_ENDPOINT", "http://localhost:9000"),
        ("STORAGE_ACCESS_KEY", "test"),
        ("STORAGE_SECRET_KEY", "test-secret"),
        ("STORAGE_PUBLIC_URL", PUBLIC_URL),
        ("DATABASE_URL", "postgres://localhost/unused"),
        ("STORE_TIMEOUT_SECS", "2"),
    ]);
    let lookup = |key: &str| vars.get(key).map(|v| v.to_string());
    AppConfig::from_lookup(&lookup).expect("valid test config")
}

pub struct TestApp {
    pub server: TestServer,
    pub blobs: Arc<InMemoryBlobStore>,
    pub documents: Arc<InMemoryDocumentStore>,
}

pub fn spawn_app() -> TestApp {
    let blobs = Arc::new(InMemoryBlobStore::default());
    let documents = Arc::new(InMemoryDocumentStore::default());
    let state = AppState::new(test_config(), blobs.clone(), documents.clone());

    let server = TestServer::new(create_app(state).into_make_service())
        .expect("Failed to create test server");

    TestApp {
        server,
        blobs,
        documents,
    }
}
