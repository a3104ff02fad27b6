//! services/dashboard/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser dashboard and the
//! server. Every message is a JSON text frame tagged by `type`.

use chrono::{DateTime, Utc};
use pregnancy_tracker_core::derived::DerivedView;
use pregnancy_tracker_core::domain::Severity;
use pregnancy_tracker_core::lookup::GuidanceTables;
use pregnancy_tracker_core::sync::{ProfileSnapshot, SyncState};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SignIn { email: String, password: String },

    SignOut,

    SetPregnancyWeek { week: i32 },

    /// Logs a symptom. `note` may be omitted.
    AddSymptom {
        symptom: String,
        severity: Severity,
        #[serde(default)]
        note: Option<String>,
    },

    SetReminderFrequency { weeks: u32 },

    SetCustomNotes { notes: String },

    AddReflection { text: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full dashboard state. Sent on connect and after every change.
    Snapshot {
        #[serde(flatten)]
        snapshot: ProfileSnapshot,
        /// Presentation values; absent while signed out.
        derived: Option<DerivedView>,
    },

    /// A request could not be carried out. The connection stays usable.
    Error { message: String },
}

impl ServerMessage {
    pub fn snapshot(snapshot: ProfileSnapshot, tables: &GuidanceTables, now: DateTime<Utc>) -> Self {
        let derived = match snapshot.state {
            SyncState::Unauthenticated => None,
            _ => Some(DerivedView::compute(&snapshot.profile, tables, now)),
        };
        ServerMessage::Snapshot { snapshot, derived }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
