//! crates/pregnancy_tracker_core/src/sync.rs
//!
//! The profile synchronizer: owns the canonical in-memory [`Profile`] for the
//! active identity, applies mutations optimistically and reconciles them with
//! the remote document through merge-writes.
//!
//! Every identity transition bumps a generation counter. Remote calls capture
//! the generation they were issued under and their completions are dropped
//! when it no longer matches, so a late load or write can never touch the
//! profile of a different (or signed-out) session.

use crate::domain::{
    Identity, Profile, ProfileUpdate, ReflectionEntry, SessionStatus, Severity, SymptomEntry,
};
use crate::ports::{PortError, PortResult};
use crate::session::SessionTracker;
use crate::store::ProfileStoreAdapter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const LOCAL_ONLY_STATUS: &str = "Cloud storage is not configured; changes are kept on this device only.";

//=========================================================================================
// Public State Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Unauthenticated,
    Loading,
    Synced,
    Saving,
}

/// A consistent copy of everything the synchronizer exposes.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot {
    pub state: SyncState,
    pub identity: Option<Identity>,
    pub profile: Profile,
    /// Human-readable outcome of the last failed remote call, if any.
    pub status: Option<String>,
    pub local_only: bool,
}

/// Handle to a merge-write issued by a mutation.
///
/// Dropping it detaches the write; it still runs to completion.
pub struct PendingWrite(JoinHandle<()>);

impl PendingWrite {
    /// Waits until the write has resolved and its outcome has been recorded.
    pub async fn settled(self) {
        if let Err(e) = self.0.await {
            error!("Profile write task failed: {}", e);
        }
    }
}

//=========================================================================================
// Internal State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unauthenticated,
    Loading,
    Ready,
}

struct Inner {
    generation: u64,
    identity: Option<Identity>,
    profile: Profile,
    phase: Phase,
    in_flight: usize,
    local_only: bool,
    status: Option<String>,
}

impl Inner {
    fn state(&self) -> SyncState {
        match self.phase {
            Phase::Unauthenticated => SyncState::Unauthenticated,
            Phase::Loading => SyncState::Loading,
            Phase::Ready if self.in_flight > 0 => SyncState::Saving,
            Phase::Ready => SyncState::Synced,
        }
    }

    /// Discards everything tied to the previous identity.
    fn reset(&mut self, identity: Option<Identity>, phase: Phase) {
        self.generation += 1;
        self.identity = identity;
        self.profile = Profile::default();
        self.phase = phase;
        self.in_flight = 0;
        self.local_only = false;
        self.status = None;
    }
}

struct Shared {
    inner: Mutex<Inner>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

//=========================================================================================
// The Synchronizer
//=========================================================================================

#[derive(Clone)]
pub struct ProfileSynchronizer {
    store: ProfileStoreAdapter,
    shared: Arc<Shared>,
}

impl ProfileSynchronizer {
    pub fn new(store: ProfileStoreAdapter) -> Self {
        let (revision, _) = watch::channel(0);
        let inner = Inner {
            generation: 0,
            identity: None,
            profile: Profile::default(),
            phase: Phase::Unauthenticated,
            in_flight: 0,
            local_only: false,
            status: None,
        };
        Self {
            store,
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                revision,
            }),
        }
    }

    /// A receiver that observes a new value after every visible change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub async fn state(&self) -> SyncState {
        self.shared.inner.lock().await.state()
    }

    pub async fn profile(&self) -> Profile {
        self.shared.inner.lock().await.profile.clone()
    }

    pub async fn snapshot(&self) -> ProfileSnapshot {
        let inner = self.shared.inner.lock().await;
        ProfileSnapshot {
            state: inner.state(),
            identity: inner.identity.clone(),
            profile: inner.profile.clone(),
            status: inner.status.clone(),
            local_only: inner.local_only,
        }
    }

    //-------------------------------------------------------------------------------------
    // Session Handling
    //-------------------------------------------------------------------------------------

    /// Drives the synchronizer from `tracker` until the tracker stops.
    ///
    /// Identity bookkeeping runs inline so transitions are applied in order;
    /// the remote load for a new identity runs as its own task.
    pub async fn follow(&self, mut tracker: SessionTracker) {
        while let Some(status) = tracker.next_transition().await {
            if let Some((generation, identity)) = self.begin_session(status).await {
                let this = self.clone();
                tokio::spawn(async move { this.load_session(generation, identity).await });
            }
        }
        debug!("Session tracker closed; synchronizer stops following.");
    }

    /// Applies one session state and, for a new identity, waits for its profile to load.
    pub async fn apply_session(&self, status: SessionStatus) {
        if let Some((generation, identity)) = self.begin_session(status).await {
            self.load_session(generation, identity).await;
        }
    }

    async fn begin_session(&self, status: SessionStatus) -> Option<(u64, Identity)> {
        let begun = {
            let mut inner = self.shared.inner.lock().await;
            match status {
                SessionStatus::Absent => {
                    if inner.phase == Phase::Unauthenticated {
                        return None;
                    }
                    info!("Signed out; discarding profile.");
                    inner.reset(None, Phase::Unauthenticated);
                    None
                }
                SessionStatus::Present(identity) => {
                    if inner.identity.as_ref() == Some(&identity) {
                        return None;
                    }
                    info!("Loading profile for {}", identity);
                    inner.reset(Some(identity.clone()), Phase::Loading);
                    Some((inner.generation, identity))
                }
            }
        };
        self.shared.notify();
        begun
    }

    async fn load_session(&self, generation: u64, identity: Identity) {
        let outcome = self.load_or_initialize(&identity).await;

        {
            let mut inner = self.shared.inner.lock().await;
            if inner.generation != generation {
                debug!("Ignoring profile load for {} from a previous session.", identity);
                return;
            }
            inner.phase = Phase::Ready;
            match outcome {
                Ok(profile) => inner.profile = profile,
                Err(PortError::StoreUnavailable) => {
                    warn!("Profile store unavailable; running local-only.");
                    inner.local_only = true;
                    inner.status = Some(LOCAL_ONLY_STATUS.to_string());
                }
                Err(e) => {
                    // The remote lists were never seen, so a merge-write of the
                    // local ones would replace them. Keep this session offline.
                    error!("Failed to load profile for {}: {}", identity, e);
                    inner.local_only = true;
                    inner.status = Some(format!(
                        "Couldn't load your profile ({}); changes are kept on this device only.",
                        e
                    ));
                }
            }
        }
        self.shared.notify();
    }

    async fn load_or_initialize(&self, identity: &Identity) -> PortResult<Profile> {
        match self.store.load(identity).await {
            Ok(profile) => Ok(profile),
            Err(PortError::NotFound(_)) => {
                let defaults = Profile::default();
                self.store.initialize(identity, &defaults).await?;
                info!("Created a new profile for {}", identity);
                Ok(defaults)
            }
            Err(e) => Err(e),
        }
    }

    //-------------------------------------------------------------------------------------
    // Mutations
    //-------------------------------------------------------------------------------------

    /// Stores `week` as given. Range checks belong to the caller.
    pub async fn set_pregnancy_week(&self, week: i32) -> Option<PendingWrite> {
        self.mutate(|profile, _| {
            profile.pregnancy_week = week;
            Some(ProfileUpdate {
                pregnancy_week: Some(week),
                ..Default::default()
            })
        })
        .await
    }

    pub async fn add_symptom_entry(
        &self,
        symptom: impl Into<String>,
        severity: Severity,
        note: Option<String>,
    ) -> Option<PendingWrite> {
        let symptom = symptom.into();
        self.mutate(|profile, now| {
            profile.push_symptom(SymptomEntry::new(symptom, severity, note, now));
            Some(ProfileUpdate {
                symptoms: Some(profile.symptoms.clone()),
                ..Default::default()
            })
        })
        .await
    }

    /// Stores `weeks` as given; it is expected to be one of 1, 2 or 4.
    pub async fn set_reminder_frequency(&self, weeks: u32) -> Option<PendingWrite> {
        self.mutate(|profile, _| {
            profile.reminder_frequency_weeks = weeks;
            Some(ProfileUpdate {
                reminder_frequency_weeks: Some(weeks),
                ..Default::default()
            })
        })
        .await
    }

    pub async fn set_custom_notes(&self, text: impl Into<String>) -> Option<PendingWrite> {
        let text = text.into();
        self.mutate(|profile, _| {
            profile.custom_notes = text.clone();
            Some(ProfileUpdate {
                custom_notes: Some(text),
                ..Default::default()
            })
        })
        .await
    }

    /// Appends a reflection. Blank text is rejected without touching the store.
    pub async fn add_reflection(&self, text: &str) -> Option<PendingWrite> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.mutate(|profile, now| {
            profile.push_reflection(ReflectionEntry::new(text, now));
            Some(ProfileUpdate {
                reflections: Some(profile.reflections.clone()),
                ..Default::default()
            })
        })
        .await
    }

    /// Applies `apply` to the canonical profile and issues a merge-write of the
    /// update it returns. A no-op unless a profile is loaded.
    async fn mutate<F>(&self, apply: F) -> Option<PendingWrite>
    where
        F: FnOnce(&mut Profile, DateTime<Utc>) -> Option<ProfileUpdate>,
    {
        let write = {
            let mut inner = self.shared.inner.lock().await;
            if inner.phase != Phase::Ready {
                debug!("Ignoring profile change while {:?}", inner.state());
                return None;
            }
            let identity = inner.identity.clone()?;
            let update = apply(&mut inner.profile, Utc::now())?;
            if inner.local_only {
                None
            } else {
                inner.in_flight += 1;
                Some((identity, inner.generation, update))
            }
        };
        self.shared.notify();

        let (identity, generation, update) = write?;
        let this = self.clone();
        Some(PendingWrite(tokio::spawn(async move {
            let result = this.store.merge_write(&identity, &update).await;
            this.finish_write(generation, result).await;
        })))
    }

    async fn finish_write(&self, generation: u64, result: PortResult<()>) {
        {
            let mut inner = self.shared.inner.lock().await;
            if inner.generation != generation {
                debug!("Ignoring profile write completion from a previous session.");
                return;
            }
            inner.in_flight = inner.in_flight.saturating_sub(1);
            match result {
                Ok(()) => inner.status = None,
                Err(PortError::StoreUnavailable) => {
                    warn!("Profile store unavailable; running local-only.");
                    inner.local_only = true;
                    inner.status = Some(LOCAL_ONLY_STATUS.to_string());
                }
                Err(e) => {
                    error!("Failed to save profile changes: {}", e);
                    inner.status = Some(format!("Couldn't save your changes: {}", e));
                }
            }
        }
        self.shared.notify();
    }
}
