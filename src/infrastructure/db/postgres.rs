use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::db::{Document, DocumentStore};
use crate::infrastructure::{StorageError, StorageResult};
use async_trait::async_trait;
use sqlx::types::Json;
use tracing::info;

/// Documents stored as JSONB rows in a single table.
///
/// The table name comes from configuration and has already been checked to
/// be a plain identifier; caller-supplied values are always bound.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
    table: String,
    insert_sql: String,
    find_sql: String,
    list_all_sql: String,
    list_after_sql: String,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
            insert_sql: format!("INSERT INTO {table} (id, document) VALUES ($1, $2)"),
            find_sql: format!("SELECT document FROM {table} WHERE id = $1"),
            list_all_sql: format!("SELECT document FROM {table} ORDER BY id"),
            list_after_sql: format!(
                "SELECT document FROM {table} WHERE ($1::TEXT IS NULL OR id > $1) ORDER BY id LIMIT $2"
            ),
        }
    }

    /// Creates the backing table if it does not exist yet.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table
        );

        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(db_failure("create table"))?;

        info!(table = %self.table, "Document table ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, id: &str, document: &Document) -> StorageResult<()> {
        sqlx::query(&self.insert_sql)
            .bind(id)
            .bind(Json(document))
            .execute(&self.pool)
            .await
            .map_err(db_failure("insert document"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Document>> {
        let document = sqlx::query_scalar::<_, Json<Document>>(&self.find_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_failure("find document"))?;

        Ok(document.map(|Json(doc)| doc))
    }

    async fn list_all(&self) -> StorageResult<Vec<Document>> {
        let documents = sqlx::query_scalar::<_, Json<Document>>(&self.list_all_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_failure("list documents"))?;

        Ok(documents.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn list_after(&self, cursor: Option<&str>, limit: u32) -> StorageResult<Vec<Document>> {
        let documents = sqlx::query_scalar::<_, Json<Document>>(&self.list_after_sql)
            .bind(cursor)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_failure("list documents"))?;

        Ok(documents.into_iter().map(|Json(doc)| doc).collect())
    }
}

fn db_failure(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| StorageError::Backend(format!("{operation}: {e}"))
}
