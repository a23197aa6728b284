//! Practice history log entries and tolerant loading.
//!
//! History files are JSON arrays written by the app:
//!
//! ```json
//! [{"activityId": "morning-flow", "completedAt": "2026-03-02T07:15:00+01:00",
//!   "durationMinutes": 20, "preMood": 2, "moodImprovement": 1.5}]
//! ```
//!
//! Records that do not deserialize are skipped rather than failing the
//! whole file.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::Deserializer;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, HistoryError};

/// One completed practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub activity_id: String,

    /// Completion time in the user's local offset. Entries without it are
    /// ignored by every aggregate.
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,

    /// Session length. Missing, null or non-numeric values read as `None`
    /// and are left out of the average duration.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_minutes: Option<f64>,

    /// Self-reported mood before the practice
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_mood: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub mood_improvement: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub energy_improvement: Option<f64>,
}

impl HistoryEntry {
    pub fn new(
        activity_id: impl Into<String>,
        completed_at: DateTime<FixedOffset>,
        duration_minutes: impl Into<f64>,
    ) -> Self {
        Self {
            activity_id: activity_id.into(),
            completed_at: Some(completed_at),
            duration_minutes: Some(duration_minutes.into()),
            pre_mood: None,
            mood_improvement: None,
            energy_improvement: None,
        }
    }

    pub fn with_pre_mood(mut self, pre_mood: f64) -> Self {
        self.pre_mood = Some(pre_mood);
        self
    }

    pub fn with_mood_improvement(mut self, improvement: f64) -> Self {
        self.mood_improvement = Some(improvement);
        self
    }

    /// Whether the entry can take part in statistics.
    pub fn is_valid(&self) -> bool {
        self.completed_at.is_some() && !self.activity_id.trim().is_empty()
    }

    /// Duration usable in averages: present, finite and not negative.
    pub fn usable_duration(&self) -> Option<f64> {
        self.duration_minutes
            .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
    }
}

/// Accept any JSON value, keeping only numbers.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Result of loading a history file.
#[derive(Debug, Clone, Default)]
pub struct HistoryLoad {
    pub entries: Vec<HistoryEntry>,
    /// Records that could not be read as entries
    pub skipped: usize,
}

/// Parse a JSON history array, skipping records that fail to deserialize.
///
/// # Errors
///
/// Returns an error if the text is not JSON or the top-level value is not
/// an array.
pub fn parse_history_json(content: &str) -> Result<HistoryLoad, HistoryError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| HistoryError::Parse(e.to_string()))?;

    let records = match value {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(_) => return Err(HistoryError::NotAnArray("an object")),
        serde_json::Value::String(_) => return Err(HistoryError::NotAnArray("a string")),
        serde_json::Value::Number(_) => return Err(HistoryError::NotAnArray("a number")),
        serde_json::Value::Bool(_) => return Err(HistoryError::NotAnArray("a boolean")),
        serde_json::Value::Null => return Err(HistoryError::NotAnArray("null")),
    };

    let mut load = HistoryLoad {
        entries: Vec::with_capacity(records.len()),
        skipped: 0,
    };

    for (position, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<HistoryEntry>(record) {
            Ok(entry) => load.entries.push(entry),
            Err(err) => {
                tracing::warn!(position, error = %err, "skipping unreadable history record");
                load.skipped += 1;
            }
        }
    }

    Ok(load)
}

/// Read and parse a history file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array.
pub fn load_history(path: impl AsRef<Path>) -> Result<HistoryLoad, CoreError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let load = parse_history_json(&content)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        entries = load.entries.len(),
        skipped = load.skipped,
        "history loaded"
    );
    Ok(load)
}
