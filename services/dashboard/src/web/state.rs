//! services/dashboard/src/web/state.rs
//!
//! Defines the application's shared and connection-specific states.

use crate::adapters::{AccountDirectory, PasswordAuthAdapter, UnconfiguredStore};
use crate::config::{Config, StoreBackend};
use pregnancy_tracker_core::lookup::GuidanceTables;
use pregnancy_tracker_core::ports::DocumentStore;
use pregnancy_tracker_core::session::SessionTracker;
use pregnancy_tracker_core::store::ProfileStoreAdapter;
use pregnancy_tracker_core::sync::ProfileSynchronizer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: ProfileStoreAdapter,
    /// `None` when no document store is configured.
    pub accounts: Option<AccountDirectory>,
    pub guidance: Arc<GuidanceTables>,
}

impl AppState {
    /// Wires the adapters around `store`; `None` runs the service without persistence.
    pub fn new(
        config: Arc<Config>,
        store: Option<Arc<dyn DocumentStore>>,
        guidance: GuidanceTables,
    ) -> Self {
        let accounts = store.clone().map(AccountDirectory::new);
        let store = store.unwrap_or_else(|| Arc::new(UnconfiguredStore));
        let mut profiles = ProfileStoreAdapter::new(store);
        if let Some(timeout) = config.store_timeout {
            profiles = profiles.with_timeout(timeout);
        }
        Self {
            config,
            profiles,
            accounts,
            guidance: Arc::new(guidance),
        }
    }

    pub fn store_label(&self) -> &'static str {
        match self.config.store_backend {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Memory => "memory",
            StoreBackend::Unconfigured => "unconfigured",
        }
    }
}

//=========================================================================================
// DashboardSession (Specific to One WebSocket Connection)
//=========================================================================================

/// Everything owned by a single dashboard connection: its own sign-in state and
/// the synchronizer holding that user's profile.
pub struct DashboardSession {
    pub auth: Arc<PasswordAuthAdapter>,
    pub sync: ProfileSynchronizer,
    /// Stops the task that feeds session transitions into the synchronizer.
    pub cancellation_token: CancellationToken,
}

impl DashboardSession {
    /// Creates the per-connection services and starts following the session.
    pub async fn start(app_state: &AppState) -> Self {
        let auth = Arc::new(PasswordAuthAdapter::new(app_state.accounts.clone()));
        let tracker = SessionTracker::connect(auth.as_ref()).await;
        let sync = ProfileSynchronizer::new(app_state.profiles.clone());
        let cancellation_token = CancellationToken::new();

        let follower = sync.clone();
        let token = cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = follower.follow(tracker) => {}
            }
        });

        Self {
            auth,
            sync,
            cancellation_token,
        }
    }

    pub fn close(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.close();
    }
}
