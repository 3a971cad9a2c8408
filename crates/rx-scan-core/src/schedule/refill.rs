//! Refill quantity and due-date calculation.

use chrono::{Days, NaiveDate};

use super::duration::estimate_duration_days;
use super::frequency::estimate_frequency;
use crate::models::{MedicineEntity, RefillInfo, DATE_FORMAT};

/// Compute the refill estimate for one medicine starting on `start`.
pub fn calculate_refill(entity: &MedicineEntity, start: NaiveDate) -> RefillInfo {
    let daily_frequency = estimate_frequency(&entity.dosage);
    let duration_days = estimate_duration_days(&entity.duration);
    let due = start
        .checked_add_days(Days::new(u64::from(duration_days)))
        .unwrap_or(NaiveDate::MAX);

    RefillInfo {
        medicine: entity.name.clone(),
        daily_frequency,
        duration_days,
        total_quantity_needed: daily_frequency.saturating_mul(duration_days),
        refill_due_date: due.format(DATE_FORMAT).to_string(),
    }
}

/// One refill estimate per medicine, in input order.
pub fn calculate_refills(entities: &[MedicineEntity], start: NaiveDate) -> Vec<RefillInfo> {
    entities
        .iter()
        .map(|entity| calculate_refill(entity, start))
        .collect()
}
