//! Parse results and stored prescription records.

use serde::{Deserialize, Serialize};

use super::medicine::MedicineEntity;
use super::schedule::{RefillInfo, ReminderEvent, ReminderStatus};

/// Everything produced by one parse call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedPrescription {
    /// Medicines in discovery order
    pub medicines: Vec<MedicineEntity>,
    /// The text that was parsed, echoed back
    pub raw_text: String,
    /// One refill estimate per medicine
    pub refill_info: Vec<RefillInfo>,
    /// Reminders for all medicines, grouped by medicine
    pub reminders: Vec<ReminderEvent>,
}

impl ParsedPrescription {
    /// Get the refill estimate for a medicine by name.
    pub fn refill_for(&self, medicine: &str) -> Option<&RefillInfo> {
        self.refill_info.iter().find(|r| r.medicine == medicine)
    }

    /// Get all reminders for a medicine by name.
    pub fn reminders_for<'a>(&'a self, medicine: &'a str) -> impl Iterator<Item = &'a ReminderEvent> + 'a {
        self.reminders.iter().filter(move |r| r.medicine == medicine)
    }
}

/// A saved medicine with its refill summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMedicine {
    /// Local UUID
    pub id: String,
    /// The extracted entity
    pub entity: MedicineEntity,
    /// Total units needed for the course (0 if no refill info was saved)
    pub total_quantity: u32,
    /// Refill due date, if known
    pub refill_due_date: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl StoredMedicine {
    /// Create a new stored medicine record.
    pub fn new(entity: MedicineEntity, refill: Option<&RefillInfo>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity,
            total_quantity: refill.map(|r| r.total_quantity_needed).unwrap_or(0),
            refill_due_date: refill.map(|r| r.refill_due_date.clone()),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A saved reminder belonging to one stored medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredReminder {
    /// Local UUID
    pub id: String,
    /// Owning medicine
    pub medicine_id: String,
    /// YYYY-MM-DD HH:MM
    pub datetime: String,
    pub status: ReminderStatus,
    pub instruction: Option<String>,
    pub dosage: Option<String>,
}

impl StoredReminder {
    /// Create a pending reminder for a saved medicine.
    pub fn new(medicine_id: &str, event: &ReminderEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medicine_id: medicine_id.to_string(),
            datetime: event.datetime.clone(),
            status: ReminderStatus::Pending,
            instruction: non_empty(&event.instruction),
            dosage: non_empty(&event.dosage),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
