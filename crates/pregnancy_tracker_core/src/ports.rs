//! crates/pregnancy_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete identity provider and document database.

use crate::domain::{Credentials, Identity, SessionStatus};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The backend was never configured. Permanent for the process lifetime.
    #[error("Storage backend is not configured")]
    StoreUnavailable,
    /// Transient failure talking to a backend.
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The field map of a stored document.
pub type Document = Map<String, Value>;

/// A keyed document store with merge-capable writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document, or `PortError::NotFound` when none exists.
    async fn get(&self, collection: &str, id: &str) -> PortResult<Document>;

    /// Writes `fields`. With `merge` the fields are unioned into any existing
    /// document at the top level; without it the document is replaced.
    async fn set(&self, collection: &str, id: &str, fields: Document, merge: bool)
        -> PortResult<()>;
}

/// Stream of session states: the state at subscription time, then every transition.
pub type SessionEvents = mpsc::UnboundedReceiver<SessionStatus>;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> PortResult<Identity>;

    async fn sign_out(&self) -> PortResult<()>;

    /// Returns `None` when the authentication backend is not configured.
    async fn subscribe(&self) -> Option<SessionEvents>;
}
