//! crates/pregnancy_tracker_core/src/session.rs
//!
//! The session tracker: follows the authentication service and reports the
//! current identity plus every transition between identities.

use crate::domain::SessionStatus;
use crate::ports::{AuthService, SessionEvents};
use tracing::{info, warn};

pub struct SessionTracker {
    events: Option<SessionEvents>,
    current: SessionStatus,
}

impl SessionTracker {
    /// Subscribes to `auth`. An unconfigured authentication backend yields a
    /// tracker that reports `Absent` and never transitions.
    pub async fn connect(auth: &dyn AuthService) -> Self {
        let events = auth.subscribe().await;
        if events.is_none() {
            warn!("Authentication backend not configured; running signed out.");
        }
        Self {
            events,
            current: SessionStatus::Absent,
        }
    }

    pub fn current(&self) -> &SessionStatus {
        &self.current
    }

    pub fn is_degraded(&self) -> bool {
        self.events.is_none()
    }

    /// Waits for the next change of identity state.
    ///
    /// Repeats of the current state are swallowed. Returns `None` once the
    /// authentication service has gone away, and immediately when degraded.
    pub async fn next_transition(&mut self) -> Option<SessionStatus> {
        let events = self.events.as_mut()?;
        while let Some(status) = events.recv().await {
            if status == self.current {
                continue;
            }
            match &status {
                SessionStatus::Present(identity) => info!("Session started for {}", identity),
                SessionStatus::Absent => info!("Session ended."),
            }
            self.current = status.clone();
            return Some(status);
        }
        self.events = None;
        None
    }
}
