//! Reminder database operations.

use rusqlite::params;

use super::{Database, DbError, DbResult};
use crate::models::{ReminderStatus, StoredReminder};

impl Database {
    /// All reminders for a medicine, earliest first.
    pub fn reminders_for_medicine(&self, medicine_id: &str) -> DbResult<Vec<StoredReminder>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medicine_id, datetime, status, instruction, dosage
            FROM reminders
            WHERE medicine_id = ?
            ORDER BY datetime, rowid
            "#,
        )?;

        let rows = stmt.query_map([medicine_id], ReminderRow::from_row)?;

        let mut reminders = Vec::new();
        for row in rows {
            reminders.push(row?.try_into()?);
        }
        Ok(reminders)
    }

    /// Pending reminders due at or before `datetime` (YYYY-MM-DD HH:MM).
    pub fn pending_reminders_before(&self, datetime: &str) -> DbResult<Vec<StoredReminder>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medicine_id, datetime, status, instruction, dosage
            FROM reminders
            WHERE status = 'pending' AND datetime <= ?
            ORDER BY datetime, rowid
            "#,
        )?;

        let rows = stmt.query_map([datetime], ReminderRow::from_row)?;

        let mut reminders = Vec::new();
        for row in rows {
            reminders.push(row?.try_into()?);
        }
        Ok(reminders)
    }

    /// Record whether a reminder was taken or skipped.
    pub fn set_reminder_status(&self, id: &str, status: ReminderStatus) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            "UPDATE reminders SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("reminder {}", id)));
        }
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
struct ReminderRow {
    id: String,
    medicine_id: String,
    datetime: String,
    status: String,
    instruction: Option<String>,
    dosage: Option<String>,
}

impl ReminderRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReminderRow {
            id: row.get(0)?,
            medicine_id: row.get(1)?,
            datetime: row.get(2)?,
            status: row.get(3)?,
            instruction: row.get(4)?,
            dosage: row.get(5)?,
        })
    }
}

impl TryFrom<ReminderRow> for StoredReminder {
    type Error = DbError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let status = ReminderStatus::parse(&row.status).ok_or_else(|| {
            DbError::Constraint(format!("Unknown reminder status: {}", row.status))
        })?;

        Ok(StoredReminder {
            id: row.id,
            medicine_id: row.medicine_id,
            datetime: row.datetime,
            status,
            instruction: row.instruction,
            dosage: row.dosage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MedicineEntity, ReminderEvent};

    fn event(medicine: &str, datetime: &str) -> ReminderEvent {
        ReminderEvent {
            medicine: medicine.into(),
            datetime: datetime.into(),
            dosage: "BD".into(),
            instruction: "after food".into(),
        }
    }

    fn setup_db() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();
        let saved = db
            .save_prescription(
                &[MedicineEntity::new("Amoxicillin")],
                &[],
                &[
                    event("Amoxicillin", "2024-03-01 21:30"),
                    event("Amoxicillin", "2024-03-01 08:30"),
                    event("Amoxicillin", "2024-03-02 08:30"),
                ],
            )
            .unwrap();
        let id = saved[0].id.clone();
        (db, id)
    }

    #[test]
    fn test_reminders_ordered_by_time() {
        let (db, medicine_id) = setup_db();
        let reminders = db.reminders_for_medicine(&medicine_id).unwrap();
        let times: Vec<&str> = reminders.iter().map(|r| r.datetime.as_str()).collect();
        assert_eq!(
            times,
            vec!["2024-03-01 08:30", "2024-03-01 21:30", "2024-03-02 08:30"]
        );
        assert!(reminders.iter().all(|r| r.status == ReminderStatus::Pending));
        assert_eq!(reminders[0].instruction.as_deref(), Some("after food"));
    }

    #[test]
    fn test_set_status_and_pending_query() {
        let (db, medicine_id) = setup_db();
        let reminders = db.reminders_for_medicine(&medicine_id).unwrap();

        db.set_reminder_status(&reminders[0].id, ReminderStatus::Taken)
            .unwrap();
        db.set_reminder_status(&reminders[1].id, ReminderStatus::Skipped)
            .unwrap();

        let due = db.pending_reminders_before("2024-03-02 09:00").unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].datetime, "2024-03-02 08:30");

        let early = db.pending_reminders_before("2024-03-02 08:00").unwrap();
        assert!(early.is_empty());

        let updated = db.reminders_for_medicine(&medicine_id).unwrap();
        assert_eq!(updated[0].status, ReminderStatus::Taken);
        assert_eq!(updated[1].status, ReminderStatus::Skipped);
    }

    #[test]
    fn test_unknown_reminder() {
        let (db, _) = setup_db();
        assert!(matches!(
            db.set_reminder_status("missing", ReminderStatus::Taken),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_check_constraint() {
        let (db, medicine_id) = setup_db();
        let result = db.conn().execute(
            "INSERT INTO reminders (id, medicine_id, datetime, status) VALUES ('x', ?1, '2024-03-03 08:00', 'missed')",
            [&medicine_id],
        );
        assert!(result.is_err());
    }
}
