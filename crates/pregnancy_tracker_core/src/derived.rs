//! crates/pregnancy_tracker_core/src/derived.rs
//!
//! Pure functions turning a profile and the guidance tables into the values a
//! dashboard displays. Outputs depend only on (profile, now, tables).

use crate::domain::{Profile, SymptomEntry, FULL_TERM_WEEK};
use crate::lookup::{DietBooster, GuidanceTables, Trimester, TrimesterGuidance};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Number of most recent symptom entries that drive diet boosters.
pub const RECENT_SYMPTOM_WINDOW: usize = 4;

pub fn trimester_for(week: i32) -> Trimester {
    if week <= 13 {
        Trimester::First
    } else if week <= 27 {
        Trimester::Second
    } else {
        Trimester::Third
    }
}

/// `round(week / 40 * 100)`, clamped to 0..=100.
pub fn progress_percent(week: i32) -> u8 {
    let percent = (f64::from(week) / f64::from(FULL_TERM_WEEK) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// `now` plus `weeks`, or `None` when the result falls outside chrono's range.
fn weeks_after(now: DateTime<Utc>, weeks: i64) -> Option<DateTime<Utc>> {
    now.checked_add_signed(Duration::try_weeks(weeks)?)
}

/// `None` when the stored frequency is too large to represent as a date.
pub fn next_reminder(now: DateTime<Utc>, frequency_weeks: u32) -> Option<DateTime<Utc>> {
    weeks_after(now, i64::from(frequency_weeks))
}

/// Estimated due date; `None` once full term has been reached or when the
/// date would be out of range.
pub fn due_date(now: DateTime<Utc>, week: i32) -> Option<DateTime<Utc>> {
    if week >= FULL_TERM_WEEK {
        return None;
    }
    weeks_after(now, i64::from(FULL_TERM_WEEK) - i64::from(week))
}

/// Distinct symptom kinds among the most recent entries, most recent first.
pub fn recent_symptom_kinds(symptoms: &[SymptomEntry]) -> Vec<String> {
    let mut kinds: Vec<String> = Vec::new();
    for entry in symptoms.iter().take(RECENT_SYMPTOM_WINDOW) {
        if !kinds.contains(&entry.symptom) {
            kinds.push(entry.symptom.clone());
        }
    }
    kinds
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveBooster {
    pub symptom: String,
    #[serde(flatten)]
    pub booster: DietBooster,
}

/// The library entries for `kinds`. Kinds missing from the library are skipped.
pub fn active_boosters(kinds: &[String], tables: &GuidanceTables) -> Vec<ActiveBooster> {
    kinds
        .iter()
        .filter_map(|kind| {
            tables.booster_for(kind).map(|booster| ActiveBooster {
                symptom: kind.clone(),
                booster: booster.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub trimester: Trimester,
    pub guidance: TrimesterGuidance,
    pub progress_percent: u8,
    pub next_reminder: Option<DateTime<Utc>>,
    pub reminder_label: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub recent_symptoms: Vec<String>,
    pub diet_boosters: Vec<ActiveBooster>,
}

impl DerivedView {
    pub fn compute(profile: &Profile, tables: &GuidanceTables, now: DateTime<Utc>) -> Self {
        let trimester = trimester_for(profile.pregnancy_week);
        let recent_symptoms = recent_symptom_kinds(&profile.symptoms);
        let diet_boosters = active_boosters(&recent_symptoms, tables);
        Self {
            trimester,
            guidance: tables.guidance_for(trimester).clone(),
            progress_percent: progress_percent(profile.pregnancy_week),
            next_reminder: next_reminder(now, profile.reminder_frequency_weeks),
            reminder_label: tables
                .reminder_label(profile.reminder_frequency_weeks)
                .map(str::to_string),
            due_date: due_date(now, profile.pregnancy_week),
            recent_symptoms,
            diet_boosters,
        }
    }
}
