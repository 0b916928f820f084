//! services/sync/src/adapters/remote.rs
//!
//! This module contains the remote store adapter, which is the concrete
//! implementation of the `RemoteDocumentStore` port from the `core` crate.
//! It persists documents in PostgreSQL using `sqlx`: one row per document,
//! keyed by `(collection, doc_id)`, with the field set in a `JSONB` column.
//!
//! Timestamps (`created_at`, `updated_at` and any `touch`ed field) are always
//! assigned by the database with `NOW()`, never by the client clock.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use studymate_core::ports::{FieldMap, PortError, PortResult, RemoteDocumentStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A PostgreSQL adapter that implements the `RemoteDocumentStore` port.
#[derive(Clone)]
pub struct PgRemoteStore {
    pool: PgPool,
}

impl PgRemoteStore {
    /// Creates a new `PgRemoteStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    fields: serde_json::Value,
}

impl DocumentRecord {
    fn to_domain(self) -> FieldMap {
        match self.fields {
            serde_json::Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }
}

//=========================================================================================
// `RemoteDocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteDocumentStore for PgRemoteStore {
    async fn write(&self, collection: &str, id: &str, fields: FieldMap) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO documents (collection, doc_id, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, doc_id) \
             DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()",
        )
        .bind(collection)
        .bind(id)
        .bind(serde_json::Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: FieldMap) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3, updated_at = NOW() \
             WHERE collection = $1 AND doc_id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(serde_json::Value::Object(fields))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Document {}/{} not found",
                collection, id
            )));
        }
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> PortResult<FieldMap> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT fields FROM documents WHERE collection = $1 AND doc_id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Document {}/{} not found", collection, id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        // Deleting a missing document is idempotent, so the affected-row
        // count is deliberately ignored.
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND doc_id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }

    async fn touch(&self, collection: &str, id: &str, field: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO documents (collection, doc_id, fields) \
             VALUES ($1, $2, jsonb_build_object($3::text, to_jsonb(NOW()))) \
             ON CONFLICT (collection, doc_id) \
             DO UPDATE SET fields = documents.fields || jsonb_build_object($3::text, to_jsonb(NOW())), \
                           updated_at = NOW()",
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }
}
