//! crates/pregnancy_tracker_core/src/memory.rs
//!
//! An in-process `DocumentStore`. Backs the `memory` storage backend and the tests.

use crate::ports::{Document, DocumentStore, PortError, PortResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> PortResult<Document> {
        self.documents
            .read()
            .await
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("{}/{}", collection, id)))
    }

    async fn set(&self, collection: &str, id: &str, fields: Document, merge: bool) -> PortResult<()> {
        let mut documents = self.documents.write().await;
        let key = (collection.to_string(), id.to_string());
        match documents.get_mut(&key) {
            Some(existing) if merge => existing.extend(fields),
            _ => {
                documents.insert(key, fields);
            }
        }
        Ok(())
    }
}
