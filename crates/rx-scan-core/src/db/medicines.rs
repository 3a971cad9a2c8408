//! Medicine database operations.

use std::collections::HashSet;

use rusqlite::{params, OptionalExtension, Transaction};
use tracing::debug;

use super::{Database, DbError, DbResult};
use crate::models::{
    MedicineEntity, RefillInfo, ReminderEvent, StoredMedicine, StoredReminder,
};

impl Database {
    /// Save parsed medicines with their refill estimates and reminders.
    ///
    /// Refill info and reminders are attached by medicine name. Everything is
    /// written in one transaction.
    pub fn save_prescription(
        &mut self,
        medicines: &[MedicineEntity],
        refill_info: &[RefillInfo],
        reminders: &[ReminderEvent],
    ) -> DbResult<Vec<StoredMedicine>> {
        if medicines.is_empty() {
            return Err(DbError::Constraint(
                "a prescription needs at least one medicine".into(),
            ));
        }

        let tx = self.conn.transaction()?;
        let mut saved = Vec::with_capacity(medicines.len());
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut reminder_count = 0;

        for entity in medicines {
            let refill = refill_info.iter().find(|r| r.medicine == entity.name);
            let stored = StoredMedicine::new(entity.clone(), refill);
            insert_medicine(&tx, &stored)?;

            // Reminders belong to the first medicine carrying their name.
            if claimed.insert(entity.name.as_str()) {
                for event in reminders.iter().filter(|r| r.medicine == entity.name) {
                    insert_reminder(&tx, &StoredReminder::new(&stored.id, event))?;
                    reminder_count += 1;
                }
            }
            saved.push(stored);
        }

        tx.commit()?;
        debug!(
            medicines = saved.len(),
            reminders = reminder_count,
            "saved prescription"
        );
        Ok(saved)
    }

    /// List saved medicines in insertion order.
    pub fn list_medicines(&self, skip: u32, limit: u32) -> DbResult<Vec<StoredMedicine>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, dosage, timing, duration, food_instruction,
                   total_quantity, refill_due_date, created_at
            FROM medicines
            ORDER BY rowid
            LIMIT ?1 OFFSET ?2
            "#,
        )?;

        let rows = stmt.query_map(params![limit, skip], MedicineRow::from_row)?;

        let mut medicines = Vec::new();
        for row in rows {
            medicines.push(row?.try_into()?);
        }
        Ok(medicines)
    }

    /// Get a medicine by ID.
    pub fn get_medicine(&self, id: &str) -> DbResult<Option<StoredMedicine>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, dosage, timing, duration, food_instruction,
                       total_quantity, refill_due_date, created_at
                FROM medicines
                WHERE id = ?
                "#,
                [id],
                MedicineRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Distinct saved medicine names, alphabetically.
    pub fn known_medicine_names(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT name FROM medicines ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Count saved medicines.
    pub fn medicine_count(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn insert_medicine(tx: &Transaction<'_>, medicine: &StoredMedicine) -> DbResult<()> {
    let entity = &medicine.entity;
    tx.execute(
        r#"
        INSERT INTO medicines (
            id, name, dosage, timing, duration, food_instruction,
            total_quantity, refill_due_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            medicine.id,
            entity.name,
            serde_json::to_string(&entity.dosage)?,
            serde_json::to_string(&entity.timing)?,
            serde_json::to_string(&entity.duration)?,
            serde_json::to_string(&entity.food_instruction)?,
            medicine.total_quantity,
            medicine.refill_due_date,
            medicine.created_at,
        ],
    )?;
    Ok(())
}

fn insert_reminder(tx: &Transaction<'_>, reminder: &StoredReminder) -> DbResult<()> {
    tx.execute(
        r#"
        INSERT INTO reminders (id, medicine_id, datetime, status, instruction, dosage)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            reminder.id,
            reminder.medicine_id,
            reminder.datetime,
            reminder.status.as_str(),
            reminder.instruction,
            reminder.dosage,
        ],
    )?;
    Ok(())
}

/// Intermediate row struct for database mapping.
struct MedicineRow {
    id: String,
    name: String,
    dosage: String,
    timing: String,
    duration: String,
    food_instruction: String,
    total_quantity: u32,
    refill_due_date: Option<String>,
    created_at: String,
}

impl MedicineRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(MedicineRow {
            id: row.get(0)?,
            name: row.get(1)?,
            dosage: row.get(2)?,
            timing: row.get(3)?,
            duration: row.get(4)?,
            food_instruction: row.get(5)?,
            total_quantity: row.get(6)?,
            refill_due_date: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<MedicineRow> for StoredMedicine {
    type Error = DbError;

    fn try_from(row: MedicineRow) -> Result<Self, Self::Error> {
        Ok(StoredMedicine {
            id: row.id,
            entity: MedicineEntity {
                name: row.name,
                dosage: serde_json::from_str(&row.dosage)?,
                timing: serde_json::from_str(&row.timing)?,
                duration: serde_json::from_str(&row.duration)?,
                food_instruction: serde_json::from_str(&row.food_instruction)?,
            },
            total_quantity: row.total_quantity,
            refill_due_date: row.refill_due_date,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;

    fn paracetamol() -> (MedicineEntity, RefillInfo, Vec<ReminderEvent>) {
        let mut med = MedicineEntity::new("Paracetamol");
        med.push(FieldKind::Dosage, "500mg");
        med.push(FieldKind::Dosage, "1-0-1");
        med.push(FieldKind::Duration, "5 days");
        let refill = RefillInfo {
            medicine: "Paracetamol".into(),
            daily_frequency: 2,
            duration_days: 5,
            total_quantity_needed: 10,
            refill_due_date: "2024-01-06".into(),
        };
        let reminders = vec![
            ReminderEvent {
                medicine: "Paracetamol".into(),
                datetime: "2024-01-01 08:00".into(),
                dosage: "500mg, 1-0-1".into(),
                instruction: String::new(),
            },
            ReminderEvent {
                medicine: "Paracetamol".into(),
                datetime: "2024-01-01 21:00".into(),
                dosage: "500mg, 1-0-1".into(),
                instruction: String::new(),
            },
        ];
        (med, refill, reminders)
    }

    #[test]
    fn test_save_and_get_medicine() {
        let mut db = Database::open_in_memory().unwrap();
        let (med, refill, reminders) = paracetamol();

        let saved = db
            .save_prescription(&[med.clone()], &[refill], &reminders)
            .unwrap();
        assert_eq!(saved.len(), 1);

        let retrieved = db.get_medicine(&saved[0].id).unwrap().unwrap();
        assert_eq!(retrieved.entity, med);
        assert_eq!(retrieved.total_quantity, 10);
        assert_eq!(retrieved.refill_due_date.as_deref(), Some("2024-01-06"));
        assert_eq!(db.reminders_for_medicine(&saved[0].id).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_prescription_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.save_prescription(&[], &[], &[]),
            Err(DbError::Constraint(_))
        ));
        assert_eq!(db.medicine_count().unwrap(), 0);
    }

    #[test]
    fn test_medicine_without_refill_info() {
        let mut db = Database::open_in_memory().unwrap();
        let saved = db
            .save_prescription(&[MedicineEntity::new("Aspirin")], &[], &[])
            .unwrap();
        let retrieved = db.get_medicine(&saved[0].id).unwrap().unwrap();
        assert_eq!(retrieved.total_quantity, 0);
        assert!(retrieved.refill_due_date.is_none());
    }

    #[test]
    fn test_list_medicines_paging() {
        let mut db = Database::open_in_memory().unwrap();
        let meds: Vec<MedicineEntity> = ["Aspirin", "Metformin", "Insulin"]
            .iter()
            .map(|n| MedicineEntity::new(*n))
            .collect();
        db.save_prescription(&meds, &[], &[]).unwrap();

        let all = db.list_medicines(0, 100).unwrap();
        let names: Vec<&str> = all.iter().map(|m| m.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Metformin", "Insulin"]);

        let page = db.list_medicines(1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].entity.name, "Metformin");
    }

    #[test]
    fn test_known_names_are_distinct() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_prescription(&[MedicineEntity::new("Zyrtec")], &[], &[])
            .unwrap();
        db.save_prescription(
            &[MedicineEntity::new("Zyrtec"), MedicineEntity::new("Crocin")],
            &[],
            &[],
        )
        .unwrap();

        assert_eq!(
            db.known_medicine_names().unwrap(),
            vec!["Crocin".to_string(), "Zyrtec".to_string()]
        );
    }

    #[test]
    fn test_get_missing_medicine() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_medicine("nope").unwrap().is_none());
    }
}
