//! services/dashboard/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. Documents live as JSONB rows
//! in PostgreSQL and are accessed with `sqlx`.

use async_trait::async_trait;
use pregnancy_tracker_core::ports::{Document, DocumentStore, PortError, PortResult};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    fields: Json<Value>,
}

impl DocumentRecord {
    fn to_domain(self, collection: &str, id: &str) -> PortResult<Document> {
        match self.fields.0 {
            Value::Object(map) => Ok(map),
            other => Err(PortError::Unexpected(format!(
                "Document {}/{} is not an object: {}",
                collection, id, other
            ))),
        }
    }
}

/// Connection-level failures are transient; anything else is a defect.
fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => PortError::Network(e.to_string()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT fields FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| PortError::NotFound(format!("Document {}/{} not found", collection, id)))?;

        record.to_domain(collection, id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Document, merge: bool) -> PortResult<()> {
        // `||` on JSONB objects is a top-level union where the right side wins.
        let sql = if merge {
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id)
             DO UPDATE SET fields = documents.fields || EXCLUDED.fields, updated_at = NOW()"
        } else {
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id)
             DO UPDATE SET fields = EXCLUDED.fields, updated_at = NOW()"
        };

        sqlx::query(sql)
            .bind(collection)
            .bind(id)
            .bind(Json(Value::Object(fields)))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

//=========================================================================================
// Unconfigured Store
//=========================================================================================

/// Stands in for the store when no backend is configured; every call fails
/// with `PortError::StoreUnavailable`.
#[derive(Clone, Copy, Default)]
pub struct UnconfiguredStore;

#[async_trait]
impl DocumentStore for UnconfiguredStore {
    async fn get(&self, _collection: &str, _id: &str) -> PortResult<Document> {
        Err(PortError::StoreUnavailable)
    }

    async fn set(&self, _collection: &str, _id: &str, _fields: Document, _merge: bool) -> PortResult<()> {
        Err(PortError::StoreUnavailable)
    }
}
