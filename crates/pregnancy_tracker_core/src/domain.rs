//! crates/pregnancy_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! The serde attributes describe the persisted document shape; nothing in here
//! knows which backend stores it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of the document collection holding one profile per identity.
pub const PROFILES_COLLECTION: &str = "profiles";

/// Upper bound on retained symptom entries; older entries fall off on insert.
pub const MAX_SYMPTOM_ENTRIES: usize = 20;

pub const DEFAULT_PREGNANCY_WEEK: i32 = 4;
pub const DEFAULT_REMINDER_FREQUENCY: u32 = 4;
pub const FULL_TERM_WEEK: i32 = 40;

/// Note stored on a symptom entry when the user leaves it blank.
pub const NO_NOTES: &str = "No notes";

/// Opaque, stable handle for a signed-in user, issued by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a user is currently signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Absent,
    Present(Identity),
}

impl SessionStatus {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionStatus::Absent => None,
            SessionStatus::Present(identity) => Some(identity),
        }
    }
}

/// Email/password pair handed to the authentication service.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// Keeps passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Strong,
}

/// A single logged symptom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub id: Uuid,
    pub symptom: String,
    pub severity: Severity,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl SymptomEntry {
    /// Builds a fresh entry stamped with `now`. A blank note becomes [`NO_NOTES`].
    pub fn new(
        symptom: impl Into<String>,
        severity: Severity,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| NO_NOTES.to_string());
        Self {
            id: Uuid::new_v4(),
            symptom: symptom.into(),
            severity,
            note,
            timestamp: now,
        }
    }
}

/// A free-text daily reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ReflectionEntry {
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: now,
        }
    }
}

/// The canonical per-user tracking record.
///
/// Every field falls back to its default when a stored document lacks it, so
/// documents written by older clients still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub pregnancy_week: i32,
    /// Most recent first, never longer than [`MAX_SYMPTOM_ENTRIES`].
    pub symptoms: Vec<SymptomEntry>,
    #[serde(rename = "reminderFrequency")]
    pub reminder_frequency_weeks: u32,
    pub custom_notes: String,
    /// Insertion order, uncapped.
    pub reflections: Vec<ReflectionEntry>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            pregnancy_week: DEFAULT_PREGNANCY_WEEK,
            symptoms: Vec::new(),
            reminder_frequency_weeks: DEFAULT_REMINDER_FREQUENCY,
            custom_notes: String::new(),
            reflections: Vec::new(),
        }
    }
}

impl Profile {
    /// Prepends `entry` and drops whatever falls past the cap.
    pub fn push_symptom(&mut self, entry: SymptomEntry) {
        self.symptoms.insert(0, entry);
        self.symptoms.truncate(MAX_SYMPTOM_ENTRIES);
    }

    pub fn push_reflection(&mut self, entry: ReflectionEntry) {
        self.reflections.push(entry);
    }
}

/// A partial profile: only the populated fields are written by a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregnancy_week: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<SymptomEntry>>,
    #[serde(rename = "reminderFrequency", skip_serializing_if = "Option::is_none")]
    pub reminder_frequency_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflections: Option<Vec<ReflectionEntry>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_symptom_keeps_newest_first_and_caps_length() {
        let mut profile = Profile::default();
        let now = Utc::now();
        for i in 0..25 {
            profile.push_symptom(SymptomEntry::new(
                format!("kind-{i}"),
                Severity::Mild,
                None,
                now,
            ));
        }
        assert_eq!(profile.symptoms.len(), MAX_SYMPTOM_ENTRIES);
        assert_eq!(profile.symptoms[0].symptom, "kind-24");
        assert_eq!(profile.symptoms[19].symptom, "kind-5");
    }

    #[test]
    fn blank_note_becomes_sentinel() {
        let entry = SymptomEntry::new("nausea", Severity::Strong, Some("   ".into()), Utc::now());
        assert_eq!(entry.note, NO_NOTES);
        let entry = SymptomEntry::new("nausea", Severity::Strong, Some(" after lunch ".into()), Utc::now());
        assert_eq!(entry.note, "after lunch");
    }

    #[test]
    fn profile_loads_with_missing_fields() {
        let profile: Profile =
            serde_json::from_value(serde_json::json!({ "pregnancyWeek": 18 })).unwrap();
        assert_eq!(profile.pregnancy_week, 18);
        assert_eq!(profile.reminder_frequency_weeks, DEFAULT_REMINDER_FREQUENCY);
        assert!(profile.symptoms.is_empty());
        assert_eq!(profile.custom_notes, "");
    }

    #[test]
    fn update_serializes_only_changed_fields() {
        let update = ProfileUpdate {
            reminder_frequency_weeks: Some(2),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({ "reminderFrequency": 2 }));
    }
}
