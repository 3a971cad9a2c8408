//! Reminder timetable generation.
//!
//! Each medicine gets one reminder per (day, slot) pair across its course.
//! Slots come from explicit timing tokens when present, otherwise they are
//! inferred from the dosage. Food instructions shift every anchor by a fixed
//! offset: "before" food moves it earlier, "after" food moves it later.

use std::collections::BTreeSet;

use chrono::{Days, Duration, NaiveDate};
use tracing::debug;

use super::duration::estimate_duration_days;
use super::frequency::{keywords_in, split_dose_slots, split_dose_time_slots};
use crate::models::{MedicineEntity, ReminderEvent, TimeSlot, REMINDER_DATETIME_FORMAT};

/// Minutes a food instruction shifts the anchor time.
pub const DEFAULT_FOOD_OFFSET_MINUTES: i64 = 30;

/// Largest accepted food offset (12 hours).
pub const MAX_FOOD_OFFSET_MINUTES: i64 = 720;

/// Slots named by timing tokens.
pub fn explicit_slots(timing: &[String]) -> BTreeSet<TimeSlot> {
    timing.iter().filter_map(|t| TimeSlot::from_token(t)).collect()
}

/// Slots implied by dosage tokens, as a union across tokens.
pub fn infer_slots(dosage: &[String]) -> BTreeSet<TimeSlot> {
    let mut slots = BTreeSet::new();
    for token in dosage {
        if let Some(split) = split_dose_slots(token) {
            slots.extend(split_dose_time_slots(&split));
            continue;
        }
        for keyword in keywords_in(token) {
            slots.extend(keyword.default_slots());
        }
    }
    slots
}

/// The slots a medicine is taken at, in chronological order.
pub fn resolve_slots(entity: &MedicineEntity) -> Vec<TimeSlot> {
    let explicit = explicit_slots(&entity.timing);
    if !explicit.is_empty() {
        return explicit.into_iter().collect();
    }
    infer_slots(&entity.dosage).into_iter().collect()
}

/// Signed anchor shift for a set of food instructions.
///
/// "before" takes precedence when both directions appear.
pub fn food_offset_minutes(food_instruction: &[String], magnitude: i64) -> i64 {
    let mentions = |word: &str| {
        food_instruction
            .iter()
            .any(|f| f.to_lowercase().contains(word))
    };
    if mentions("before") {
        -magnitude
    } else if mentions("after") {
        magnitude
    } else {
        0
    }
}

/// Expands medicine entities into dated reminder events.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    food_offset_minutes: i64,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self {
            food_offset_minutes: DEFAULT_FOOD_OFFSET_MINUTES,
        }
    }

    /// Use a different food offset magnitude, clamped to
    /// `MAX_FOOD_OFFSET_MINUTES`.
    pub fn with_food_offset(mut self, minutes: i64) -> Self {
        self.food_offset_minutes = minutes.unsigned_abs().min(MAX_FOOD_OFFSET_MINUTES as u64) as i64;
        self
    }

    pub fn food_offset(&self) -> i64 {
        self.food_offset_minutes
    }

    /// Reminders for one medicine, ordered by day then slot.
    pub fn schedule(&self, entity: &MedicineEntity, start: NaiveDate) -> Vec<ReminderEvent> {
        let slots = resolve_slots(entity);
        if slots.is_empty() {
            debug!(medicine = %entity.name, "no time slots, skipping reminders");
            return Vec::new();
        }

        let days = estimate_duration_days(&entity.duration);
        let offset = Duration::minutes(food_offset_minutes(
            &entity.food_instruction,
            self.food_offset_minutes,
        ));
        let dosage = entity.dosage_description();
        let instruction = entity.instruction_description();

        let mut events = Vec::with_capacity(slots.len() * days as usize);
        for day in 0..days {
            let Some(date) = start.checked_add_days(Days::new(u64::from(day))) else {
                break;
            };
            for slot in &slots {
                let Some(at) = date.and_time(slot.anchor()).checked_add_signed(offset) else {
                    debug!(medicine = %entity.name, %date, "reminder time out of range, skipping");
                    continue;
                };
                events.push(ReminderEvent {
                    medicine: entity.name.clone(),
                    datetime: at.format(REMINDER_DATETIME_FORMAT).to_string(),
                    dosage: dosage.clone(),
                    instruction: instruction.clone(),
                });
            }
        }
        events
    }

    /// Reminders for every medicine, grouped by medicine in input order.
    pub fn schedule_all(&self, entities: &[MedicineEntity], start: NaiveDate) -> Vec<ReminderEvent> {
        entities
            .iter()
            .flat_map(|entity| self.schedule(entity, start))
            .collect()
    }
}
