//! Rx-Scan Core Library
//!
//! Turns free-form prescription text into structured medicines, refill
//! estimates and a calendar of dosing reminders.
//!
//! # Architecture
//!
//! ```text
//! Image ──► TextRecognizer ──┐
//!                            ▼
//! Text ───────────────► line walk ──► Noise Filter ──► Name Matcher
//!                                                          │
//!                                              Pattern Library (same line
//!                                              and following lines)
//!                                                          │
//!                                                  Entity Accumulator
//!                                                  (merge by name, dedup)
//!                                                          │
//!                                   ┌──────────────────────┴───────────┐
//!                                   ▼                                  ▼
//!                         Frequency × Duration               Slots × Days + food offset
//!                           = Refill estimate                    = Reminders
//! ```
//!
//! # Modules
//!
//! - [`extract`]: noise filter, fuzzy name matcher, field patterns, accumulator
//! - [`schedule`]: frequency and duration inference, refills, reminders
//! - [`pipeline`]: end-to-end parser with the image recognition seam
//! - [`config`]: parser tunables loaded from JSON
//! - [`models`]: domain types (MedicineEntity, RefillInfo, ReminderEvent, ...)
//! - [`db`]: SQLite store for saved medicines and reminders

pub mod config;
pub mod db;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod schedule;

// Re-export commonly used types
pub use config::{ConfigError, ParserConfig};
pub use db::{Database, DbError};
pub use extract::{EntityExtractor, NameMatcher, NoiseFilter, PatternLibrary};
pub use models::{
    FieldKind, MedicineEntity, ParsedPrescription, RefillInfo, ReminderEvent, ReminderStatus,
    StoredMedicine, StoredReminder, TimeSlot,
};
pub use pipeline::{ParseInput, PipelineError, PrescriptionParser, RecognitionError, TextRecognizer};
pub use schedule::{calculate_refill, estimate_duration_days, estimate_frequency, ReminderScheduler};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

static DEFAULT_PARSER: Lazy<PrescriptionParser> = Lazy::new(PrescriptionParser::new);

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RxScanError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recognition error: {0}")]
    RecognitionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<DbError> for RxScanError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => RxScanError::NotFound(what),
            DbError::Constraint(msg) => RxScanError::InvalidInput(msg),
            other => RxScanError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PipelineError> for RxScanError {
    fn from(e: PipelineError) -> Self {
        match e {
            input @ PipelineError::Input(_) => RxScanError::InvalidInput(input.to_string()),
            PipelineError::Recognition(inner) => RxScanError::RecognitionError(inner.to_string()),
            PipelineError::Config(inner) => RxScanError::ConfigError(inner.to_string()),
        }
    }
}

impl From<ConfigError> for RxScanError {
    fn from(e: ConfigError) -> Self {
        RxScanError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RxScanError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RxScanError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a prescription store at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<RxScanCore>, RxScanError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(RxScanCore::new(db, PrescriptionParser::new())))
}

/// Open a store whose parser is tuned by a JSON config.
#[uniffi::export]
pub fn open_store_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<RxScanCore>, RxScanError> {
    let config = ParserConfig::from_json_str(&config_json)?;
    let parser = PrescriptionParser::from_config(config)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(RxScanCore::new(db, parser)))
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<RxScanCore>, RxScanError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(RxScanCore::new(db, PrescriptionParser::new())))
}

/// Parse prescription text without a store.
///
/// `start_date` is YYYY-MM-DD; today is used when it is absent or malformed.
#[uniffi::export]
pub fn parse_text(
    text: String,
    extra_names: Vec<String>,
    start_date: Option<String>,
) -> Result<FfiParseResult, RxScanError> {
    let input = ParseInput {
        text: Some(text),
        start_date,
        extra_names,
        ..ParseInput::default()
    };
    Ok(DEFAULT_PARSER.parse(input)?.into())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Parser plus thread-safe store, for FFI.
#[derive(uniffi::Object)]
pub struct RxScanCore {
    db: Arc<Mutex<Database>>,
    parser: PrescriptionParser,
}

impl RxScanCore {
    fn new(db: Database, parser: PrescriptionParser) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            parser,
        }
    }
}

#[uniffi::export]
impl RxScanCore {
    // =========================================================================
    // Parsing
    // =========================================================================

    /// Parse text, also matching every medicine name already saved.
    pub fn parse_text(
        &self,
        text: String,
        start_date: Option<String>,
    ) -> Result<FfiParseResult, RxScanError> {
        let known = self.db.lock()?.known_medicine_names()?;
        let input = ParseInput {
            text: Some(text),
            start_date,
            extra_names: known,
            ..ParseInput::default()
        };
        Ok(self.parser.parse(input)?.into())
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Save a parse result. Reminders start out pending.
    pub fn save(&self, result: FfiParseResult) -> Result<Vec<FfiStoredMedicine>, RxScanError> {
        let medicines: Vec<MedicineEntity> = result.medicines.into_iter().map(Into::into).collect();
        let refill_info: Vec<RefillInfo> = result.refill_info.into_iter().map(Into::into).collect();
        let reminders: Vec<ReminderEvent> = result.reminders.into_iter().map(Into::into).collect();

        let mut db = self.db.lock()?;
        let saved = db.save_prescription(&medicines, &refill_info, &reminders)?;
        Ok(saved.into_iter().map(Into::into).collect())
    }

    /// List saved medicines in insertion order.
    pub fn list_medicines(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<FfiStoredMedicine>, RxScanError> {
        let db = self.db.lock()?;
        let medicines = db.list_medicines(skip, limit)?;
        Ok(medicines.into_iter().map(Into::into).collect())
    }

    /// Get a saved medicine by ID.
    pub fn get_medicine(&self, id: String) -> Result<Option<FfiStoredMedicine>, RxScanError> {
        let db = self.db.lock()?;
        Ok(db.get_medicine(&id)?.map(Into::into))
    }

    /// Get reminders for a saved medicine.
    pub fn reminders_for_medicine(
        &self,
        medicine_id: String,
    ) -> Result<Vec<FfiStoredReminder>, RxScanError> {
        let db = self.db.lock()?;
        let reminders = db.reminders_for_medicine(&medicine_id)?;
        Ok(reminders.into_iter().map(Into::into).collect())
    }

    /// Pending reminders due at or before a YYYY-MM-DD HH:MM time.
    pub fn pending_reminders_before(
        &self,
        datetime: String,
    ) -> Result<Vec<FfiStoredReminder>, RxScanError> {
        let db = self.db.lock()?;
        let reminders = db.pending_reminders_before(&datetime)?;
        Ok(reminders.into_iter().map(Into::into).collect())
    }

    /// Mark a reminder "pending", "taken" or "skipped".
    pub fn set_reminder_status(&self, id: String, status: String) -> Result<(), RxScanError> {
        let status = ReminderStatus::parse(&status)
            .ok_or_else(|| RxScanError::InvalidInput(format!("Unknown reminder status: {}", status)))?;
        let db = self.db.lock()?;
        db.set_reminder_status(&id, status)?;
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medicine entity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicine {
    pub name: String,
    pub dosage: Vec<String>,
    pub timing: Vec<String>,
    pub duration: Vec<String>,
    pub food_instruction: Vec<String>,
}

impl From<MedicineEntity> for FfiMedicine {
    fn from(entity: MedicineEntity) -> Self {
        Self {
            name: entity.name,
            dosage: entity.dosage,
            timing: entity.timing,
            duration: entity.duration,
            food_instruction: entity.food_instruction,
        }
    }
}

impl From<FfiMedicine> for MedicineEntity {
    fn from(medicine: FfiMedicine) -> Self {
        MedicineEntity {
            name: medicine.name,
            dosage: medicine.dosage,
            timing: medicine.timing,
            duration: medicine.duration,
            food_instruction: medicine.food_instruction,
        }
    }
}

/// FFI-safe refill estimate.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRefillInfo {
    pub medicine: String,
    pub daily_frequency: u32,
    pub duration_days: u32,
    pub total_quantity_needed: u32,
    pub refill_due_date: String,
}

impl From<RefillInfo> for FfiRefillInfo {
    fn from(info: RefillInfo) -> Self {
        Self {
            medicine: info.medicine,
            daily_frequency: info.daily_frequency,
            duration_days: info.duration_days,
            total_quantity_needed: info.total_quantity_needed,
            refill_due_date: info.refill_due_date,
        }
    }
}

impl From<FfiRefillInfo> for RefillInfo {
    fn from(info: FfiRefillInfo) -> Self {
        RefillInfo {
            medicine: info.medicine,
            daily_frequency: info.daily_frequency,
            duration_days: info.duration_days,
            total_quantity_needed: info.total_quantity_needed,
            refill_due_date: info.refill_due_date,
        }
    }
}

/// FFI-safe reminder event.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReminder {
    pub medicine: String,
    pub datetime: String,
    pub dosage: String,
    pub instruction: String,
}

impl From<ReminderEvent> for FfiReminder {
    fn from(event: ReminderEvent) -> Self {
        Self {
            medicine: event.medicine,
            datetime: event.datetime,
            dosage: event.dosage,
            instruction: event.instruction,
        }
    }
}

impl From<FfiReminder> for ReminderEvent {
    fn from(event: FfiReminder) -> Self {
        ReminderEvent {
            medicine: event.medicine,
            datetime: event.datetime,
            dosage: event.dosage,
            instruction: event.instruction,
        }
    }
}

/// FFI-safe parse result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParseResult {
    pub medicines: Vec<FfiMedicine>,
    pub raw_text: String,
    pub refill_info: Vec<FfiRefillInfo>,
    pub reminders: Vec<FfiReminder>,
}

impl From<ParsedPrescription> for FfiParseResult {
    fn from(parsed: ParsedPrescription) -> Self {
        Self {
            medicines: parsed.medicines.into_iter().map(Into::into).collect(),
            raw_text: parsed.raw_text,
            refill_info: parsed.refill_info.into_iter().map(Into::into).collect(),
            reminders: parsed.reminders.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe saved medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoredMedicine {
    pub id: String,
    pub medicine: FfiMedicine,
    pub total_quantity: u32,
    pub refill_due_date: Option<String>,
    pub created_at: String,
}

impl From<StoredMedicine> for FfiStoredMedicine {
    fn from(stored: StoredMedicine) -> Self {
        Self {
            id: stored.id,
            medicine: stored.entity.into(),
            total_quantity: stored.total_quantity,
            refill_due_date: stored.refill_due_date,
            created_at: stored.created_at,
        }
    }
}

/// FFI-safe saved reminder.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoredReminder {
    pub id: String,
    pub medicine_id: String,
    pub datetime: String,
    pub status: String,
    pub instruction: Option<String>,
    pub dosage: Option<String>,
}

impl From<StoredReminder> for FfiStoredReminder {
    fn from(reminder: StoredReminder) -> Self {
        Self {
            id: reminder.id,
            medicine_id: reminder.medicine_id,
            datetime: reminder.datetime,
            status: reminder.status.as_str().to_string(),
            instruction: reminder.instruction,
            dosage: reminder.dosage,
        }
    }
}
