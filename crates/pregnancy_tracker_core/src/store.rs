//! crates/pregnancy_tracker_core/src/store.rs
//!
//! The profile store adapter: a stateless gateway between [`Profile`] values
//! and the per-identity document in the `profiles` collection.

use crate::domain::{Identity, Profile, ProfileUpdate, PROFILES_COLLECTION};
use crate::ports::{Document, DocumentStore, PortError, PortResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ProfileStoreAdapter {
    store: Arc<dyn DocumentStore>,
    timeout: Option<Duration>,
}

impl ProfileStoreAdapter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Bounds every remote call; an elapsed call fails with `PortError::Network`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetches the profile for `identity`, or `PortError::NotFound`.
    pub async fn load(&self, identity: &Identity) -> PortResult<Profile> {
        let document = self
            .bounded(self.store.get(PROFILES_COLLECTION, identity.as_str()))
            .await?;
        serde_json::from_value(Value::Object(document)).map_err(|e| {
            PortError::Unexpected(format!("Malformed profile for {}: {}", identity, e))
        })
    }

    /// Creates the document with `defaults` plus a creation timestamp.
    ///
    /// This is a replacing write, so callers must have confirmed via [`load`]
    /// that no document exists yet.
    ///
    /// [`load`]: ProfileStoreAdapter::load
    pub async fn initialize(&self, identity: &Identity, defaults: &Profile) -> PortResult<()> {
        let mut fields = to_document(defaults)?;
        fields.insert("createdAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        self.bounded(
            self.store
                .set(PROFILES_COLLECTION, identity.as_str(), fields, false),
        )
        .await
    }

    /// Merges the populated fields of `update` into the stored document and
    /// stamps `updatedAt`. Untouched fields are left as they are.
    pub async fn merge_write(&self, identity: &Identity, update: &ProfileUpdate) -> PortResult<()> {
        let mut fields = to_document(update)?;
        fields.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        self.bounded(
            self.store
                .set(PROFILES_COLLECTION, identity.as_str(), fields, true),
        )
        .await
    }

    async fn bounded<T>(&self, call: impl Future<Output = PortResult<T>>) -> PortResult<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                PortError::Network(format!("Store call timed out after {:?}", limit))
            })?,
            None => call.await,
        }
    }
}

fn to_document<T: Serialize>(value: &T) -> PortResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PortError::Unexpected(format!(
            "Expected an object, got {}",
            other
        ))),
        Err(e) => Err(PortError::Unexpected(e.to_string())),
    }
}
