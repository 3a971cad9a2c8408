//! Refill and reminder models derived from medicine entities.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Wall-clock format used for reminder datetimes.
pub const REMINDER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Calendar date format used for start and refill dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Named daily intake slot. Variants are declared in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    /// Fixed anchor time before any food offset is applied.
    pub fn anchor(&self) -> NaiveTime {
        let (hour, minute) = match self {
            TimeSlot::Morning => (8, 0),
            TimeSlot::Afternoon => (13, 0),
            TimeSlot::Evening => (18, 0),
            TimeSlot::Night => (21, 0),
        };
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }

    /// Map a timing token to its slot ("bedtime" shares the night anchor).
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.to_lowercase();
        if lower.contains("morning") {
            Some(TimeSlot::Morning)
        } else if lower.contains("afternoon") {
            Some(TimeSlot::Afternoon)
        } else if lower.contains("evening") {
            Some(TimeSlot::Evening)
        } else if lower.contains("night") || lower.contains("bedtime") {
            Some(TimeSlot::Night)
        } else {
            None
        }
    }
}

/// Refill estimate for one medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefillInfo {
    /// Canonical medicine name
    pub medicine: String,
    /// Doses per day (always >= 1)
    pub daily_frequency: u32,
    /// Course length in days (always >= 1)
    pub duration_days: u32,
    /// daily_frequency x duration_days
    pub total_quantity_needed: u32,
    /// Start date + duration_days, as YYYY-MM-DD
    pub refill_due_date: String,
}

/// A single dated dose reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderEvent {
    /// Canonical medicine name
    pub medicine: String,
    /// Absolute time as YYYY-MM-DD HH:MM
    pub datetime: String,
    /// Joined dosage tokens
    pub dosage: String,
    /// Joined food instructions
    pub instruction: String,
}

/// Adherence status of a stored reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Taken,
    Skipped,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Taken => "taken",
            ReminderStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ReminderStatus::Pending),
            "taken" => Some(ReminderStatus::Taken),
            "skipped" => Some(ReminderStatus::Skipped),
            _ => None,
        }
    }
}
