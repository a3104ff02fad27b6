//! services/dashboard/src/adapters/auth.rs
//!
//! A per-connection authentication service. Each dashboard connection signs in
//! independently; the adapter checks credentials against the account directory
//! and fans session transitions out to its subscribers.

use crate::adapters::accounts::AccountDirectory;
use async_trait::async_trait;
use pregnancy_tracker_core::domain::{Credentials, Identity, SessionStatus};
use pregnancy_tracker_core::ports::{AuthService, PortError, PortResult, SessionEvents};
use tokio::sync::{mpsc, Mutex};
use tracing::info;

struct AuthSession {
    current: SessionStatus,
    subscribers: Vec<mpsc::UnboundedSender<SessionStatus>>,
}

/// An adapter that implements the `AuthService` port with email/password accounts.
pub struct PasswordAuthAdapter {
    accounts: Option<AccountDirectory>,
    session: Mutex<AuthSession>,
}

impl PasswordAuthAdapter {
    /// `None` means no account store is configured; sign-in then always fails
    /// and subscribers are told the backend is unavailable.
    pub fn new(accounts: Option<AccountDirectory>) -> Self {
        Self {
            accounts,
            session: Mutex::new(AuthSession {
                current: SessionStatus::Absent,
                subscribers: Vec::new(),
            }),
        }
    }

    async fn transition(&self, status: SessionStatus) {
        let mut session = self.session.lock().await;
        if session.current == status {
            return;
        }
        session.current = status.clone();
        session
            .subscribers
            .retain(|subscriber| subscriber.send(status.clone()).is_ok());
    }
}

#[async_trait]
impl AuthService for PasswordAuthAdapter {
    async fn sign_in(&self, credentials: &Credentials) -> PortResult<Identity> {
        let accounts = self
            .accounts
            .as_ref()
            .ok_or_else(|| PortError::Auth("Sign-in is not available".to_string()))?;

        let identity = accounts.verify(credentials).await.map_err(|e| match e {
            PortError::Auth(_) => e,
            other => PortError::Auth(other.to_string()),
        })?;

        info!("Signed in as {}", identity);
        self.transition(SessionStatus::Present(identity.clone())).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.transition(SessionStatus::Absent).await;
        Ok(())
    }

    async fn subscribe(&self) -> Option<SessionEvents> {
        self.accounts.as_ref()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = self.session.lock().await;
        tx.send(session.current.clone()).ok()?;
        session.subscribers.push(tx);
        Some(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pregnancy_tracker_core::MemoryDocumentStore;
    use std::sync::Arc;

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "ana@example.com".to_string(),
            password: password.to_string(),
        }
    }

    async fn adapter_with_account() -> (PasswordAuthAdapter, Identity) {
        let accounts = AccountDirectory::new(Arc::new(MemoryDocumentStore::new()));
        let identity = accounts.register(&credentials("correct horse")).await.unwrap();
        (PasswordAuthAdapter::new(Some(accounts)), identity)
    }

    #[tokio::test]
    async fn subscription_sees_initial_state_and_transitions() {
        let (auth, identity) = adapter_with_account().await;
        let mut events = auth.subscribe().await.unwrap();
        assert_eq!(events.recv().await, Some(SessionStatus::Absent));

        assert_eq!(auth.sign_in(&credentials("correct horse")).await.unwrap(), identity);
        assert_eq!(events.recv().await, Some(SessionStatus::Present(identity)));

        auth.sign_out().await.unwrap();
        assert_eq!(events.recv().await, Some(SessionStatus::Absent));
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_prior_state() {
        let (auth, _) = adapter_with_account().await;
        let mut events = auth.subscribe().await.unwrap();
        assert_eq!(events.recv().await, Some(SessionStatus::Absent));

        let result = auth.sign_in(&credentials("wrong password")).await;
        assert!(matches!(result, Err(PortError::Auth(_))));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unconfigured_adapter_has_no_session_stream() {
        let auth = PasswordAuthAdapter::new(None);
        assert!(auth.subscribe().await.is_none());
        assert!(matches!(
            auth.sign_in(&credentials("correct horse")).await,
            Err(PortError::Auth(_))
        ));
    }
}
