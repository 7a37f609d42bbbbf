use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use super::{validate_segment, CollectionPath, DocumentStore, StoreError};
use crate::models::{fields_from_value, merge_top_level, Fields, Record};

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoreError::Backend(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: String,
}

/// Document store backed by a single SQLite table of JSON payloads.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(init_db(path).await?))
    }

    fn decode(row: DocumentRow) -> Result<Record, StoreError> {
        let value: serde_json::Value = serde_json::from_str(&row.data)?;
        let fields = fields_from_value(value).ok_or_else(|| {
            StoreError::Decode(format!("document {} is not a JSON object", row.id))
        })?;
        Ok(Record::from_document(row.id, fields))
    }

    fn encode(data: &Fields) -> Result<String, StoreError> {
        // The id lives in its own column.
        let mut data = data.clone();
        data.remove("id");
        Ok(serde_json::to_string(&data)?)
    }
}

impl DocumentStore for SqliteDocumentStore {
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Record>, StoreError> {
        let rows: Vec<DocumentRow> =
            sqlx::query_as("SELECT id, data FROM documents WHERE collection = ? ORDER BY seq")
                .bind(path.to_string())
                .fetch_all(&self.pool)
                .await?;

        tracing::debug!(path = %path, count = rows.len(), "listed documents");
        rows.into_iter().map(Self::decode).collect()
    }

    async fn create(&self, path: &CollectionPath, data: &Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(path.to_string())
        .bind(&id)
        .bind(Self::encode(data)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(path = %path, id = %id, "created document");
        Ok(id)
    }

    async fn set(&self, path: &CollectionPath, id: &str, data: &Fields) -> Result<(), StoreError> {
        validate_segment(id)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (collection, id) DO UPDATE
            SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(path.to_string())
        .bind(id)
        .bind(Self::encode(data)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: &Fields,
    ) -> Result<(), StoreError> {
        validate_segment(id)?;
        let collection = path.to_string();
        let mut tx = self.pool.begin().await?;

        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
                .bind(&collection)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let mut record = match row {
            Some(row) => Self::decode(row)?,
            None => {
                return Err(StoreError::NotFound {
                    path: collection,
                    id: id.to_string(),
                })
            }
        };
        merge_top_level(&mut record.fields, patch);

        sqlx::query("UPDATE documents SET data = ?, updated_at = ? WHERE collection = ? AND id = ?")
            .bind(Self::encode(&record.fields)?)
            .bind(Utc::now().to_rfc3339())
            .bind(&collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        validate_segment(id)?;
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(path.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    async fn setup() -> (SqliteDocumentStore, TempDir) {
        let temp_dir = tempdir().unwrap();
        let store = SqliteDocumentStore::open(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn fields(value: serde_json::Value) -> Fields {
        fields_from_value(value).unwrap()
    }

    fn path(p: &str) -> CollectionPath {
        CollectionPath::parse(p).unwrap()
    }

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let temp_dir = tempdir().unwrap();
        let pool = init_db(&temp_dir.path().join("nested").join("test.db"))
            .await
            .unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["documents"]);
    }

    #[tokio::test]
    async fn test_create_then_list_in_insertion_order() {
        let (store, _temp) = setup().await;
        let appointments = path("appointments");

        let first = store
            .create(&appointments, &fields(json!({"title": "First"})))
            .await
            .unwrap();
        let second = store
            .create(&appointments, &fields(json!({"title": "Second"})))
            .await
            .unwrap();

        let records = store.list(&appointments).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first);
        assert_eq!(records[0].get_str("title"), Some("First"));
        assert_eq!(records[1].id, second);
    }

    #[tokio::test]
    async fn test_list_tags_store_id_over_payload_id() {
        let (store, _temp) = setup().await;
        let providers = path("service-providers");

        // Raw insert so the payload itself carries a conflicting id.
        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("service-providers")
        .bind("real-id")
        .bind(r#"{"id": "payload-id", "name": "Ann"}"#)
        .bind("2025-01-01T00:00:00Z")
        .bind("2025-01-01T00:00:00Z")
        .execute(&store.pool)
        .await
        .unwrap();

        let records = store.list(&providers).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "real-id");
        assert!(records[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (store, _temp) = setup().await;

        store
            .create(&path("users/u1/appointments"), &fields(json!({"title": "Mine"})))
            .await
            .unwrap();
        store
            .create(&path("users/u2/appointments"), &fields(json!({"title": "Theirs"})))
            .await
            .unwrap();

        let mine = store.list(&path("users/u1/appointments")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].get_str("title"), Some("Mine"));
        assert!(store.list(&path("appointments")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_top_level() {
        let (store, _temp) = setup().await;
        let providers = path("service-providers");
        store
            .set(
                &providers,
                "u1",
                &fields(json!({"name": "Ann", "service": {"name": "Haircut", "price": 20}})),
            )
            .await
            .unwrap();

        store
            .update(&providers, "u1", &fields(json!({"service": {"price": 25}})))
            .await
            .unwrap();

        let records = store.list(&providers).await.unwrap();
        assert_eq!(records[0].get_str("name"), Some("Ann"));
        assert_eq!(records[0].get("service"), Some(&json!({"price": 25})));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let (store, _temp) = setup().await;

        let result = store
            .update(&path("service-providers"), "ghost", &fields(json!({"a": 1})))
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_set_overwrites_and_keeps_position() {
        let (store, _temp) = setup().await;
        let providers = path("service-providers");
        store.set(&providers, "a", &fields(json!({"v": 1}))).await.unwrap();
        store.set(&providers, "b", &fields(json!({"v": 2}))).await.unwrap();

        store.set(&providers, "a", &fields(json!({"v": 3}))).await.unwrap();

        let records = store.list(&providers).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records[0].get("v"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_delete_removes_and_tolerates_missing() {
        let (store, _temp) = setup().await;
        let appointments = path("appointments");
        let id = store
            .create(&appointments, &fields(json!({"title": "x"})))
            .await
            .unwrap();

        store.delete(&appointments, &id).await.unwrap();
        store.delete(&appointments, &id).await.unwrap();

        assert!(store.list(&appointments).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_document_id_rejected() {
        let (store, _temp) = setup().await;

        let result = store.delete(&path("appointments"), "../x").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }
}
