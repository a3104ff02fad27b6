//! crates/pregnancy_tracker_core/src/lookup.rs
//!
//! Static, read-only guidance content: trimester guidance, the symptom library
//! (symptom kind -> dietary boosters) and reminder-frequency labels.
//!
//! The tables are supplied once at startup, either from the built-in content or
//! from an operator-provided JSON file, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimesterGuidance {
    pub title: String,
    pub focus: String,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimesterTable {
    pub first: TrimesterGuidance,
    pub second: TrimesterGuidance,
    pub third: TrimesterGuidance,
}

/// Foods suggested while a symptom is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietBooster {
    pub label: String,
    pub foods: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Failed to read guidance tables: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse guidance tables: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceTables {
    pub trimesters: TrimesterTable,
    pub symptom_library: BTreeMap<String, DietBooster>,
    pub reminder_labels: BTreeMap<u32, String>,
}

impl GuidanceTables {
    /// Loads the tables from a JSON file with the same shape as [`GuidanceTables`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn guidance_for(&self, trimester: Trimester) -> &TrimesterGuidance {
        match trimester {
            Trimester::First => &self.trimesters.first,
            Trimester::Second => &self.trimesters.second,
            Trimester::Third => &self.trimesters.third,
        }
    }

    pub fn booster_for(&self, symptom: &str) -> Option<&DietBooster> {
        self.symptom_library.get(symptom)
    }

    pub fn reminder_label(&self, weeks: u32) -> Option<&str> {
        self.reminder_labels.get(&weeks).map(String::as_str)
    }

    pub fn symptom_kinds(&self) -> impl Iterator<Item = &str> {
        self.symptom_library.keys().map(String::as_str)
    }

    /// The content shipped with the service.
    pub fn builtin() -> Self {
        let trimesters = TrimesterTable {
            first: guidance(
                "First trimester",
                "Folate, iron and steady energy",
                &[
                    "Eat small, frequent meals to keep nausea in check",
                    "Keep taking a prenatal vitamin with folic acid",
                    "Sip water throughout the day",
                ],
            ),
            second: guidance(
                "Second trimester",
                "Calcium, protein and omega-3s",
                &[
                    "Add a serving of dairy or fortified alternatives to each meal",
                    "Include oily fish or walnuts a couple of times a week",
                    "Keep up gentle daily movement",
                ],
            ),
            third: guidance(
                "Third trimester",
                "Fibre, iron and rest",
                &[
                    "Favour whole grains and leafy greens for digestion",
                    "Pair iron-rich foods with vitamin C",
                    "Plan rest breaks and keep your hospital bag ready",
                ],
            ),
        };

        let symptom_library = [
            ("nausea", "Nausea relief", &["Ginger tea", "Plain crackers", "Cold fruit"][..]),
            ("fatigue", "Energy support", &["Lentils", "Spinach", "Oats"][..]),
            ("heartburn", "Gentle on the stomach", &["Yoghurt", "Bananas", "Oatmeal"][..]),
            ("cramps", "Muscle support", &["Bananas", "Almonds", "Avocado"][..]),
            ("headache", "Hydration boost", &["Water", "Cucumber", "Watermelon"][..]),
            ("constipation", "Fibre boost", &["Prunes", "Pears", "Chia seeds"][..]),
            ("swelling", "Fluid balance", &["Potatoes", "Beans", "Leafy greens"][..]),
            ("insomnia", "Calm evenings", &["Warm milk", "Cherries", "Pumpkin seeds"][..]),
        ]
        .into_iter()
        .map(|(kind, label, foods)| {
            (
                kind.to_string(),
                DietBooster {
                    label: label.to_string(),
                    foods: foods.iter().map(|f| f.to_string()).collect(),
                },
            )
        })
        .collect();

        let reminder_labels = [(1, "Weekly"), (2, "Every 2 weeks"), (4, "Monthly")]
            .into_iter()
            .map(|(weeks, label)| (weeks, label.to_string()))
            .collect();

        Self {
            trimesters,
            symptom_library,
            reminder_labels,
        }
    }
}

fn guidance(title: &str, focus: &str, tips: &[&str]) -> TrimesterGuidance {
    TrimesterGuidance {
        title: title.to_string(),
        focus: focus.to_string(),
        tips: tips.iter().map(|t| t.to_string()).collect(),
    }
}
