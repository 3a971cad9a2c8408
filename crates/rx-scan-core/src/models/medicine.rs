//! Medicine entity models produced by the extraction walk.

use serde::{Deserialize, Serialize};

/// The four detail fields collected for each medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dosage,
    Timing,
    Duration,
    FoodInstruction,
}

impl FieldKind {
    /// All fields, in output order.
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Dosage,
        FieldKind::Timing,
        FieldKind::Duration,
        FieldKind::FoodInstruction,
    ];

    /// Whether extracted values for this field are lowercased.
    pub fn lowercases_values(&self) -> bool {
        matches!(self, FieldKind::Timing | FieldKind::FoodInstruction)
    }
}

/// A medicine recognised in prescription text, with its extracted details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicineEntity {
    /// Canonical dictionary spelling
    pub name: String,
    /// Strengths, forms, split-dose notation and frequency abbreviations
    pub dosage: Vec<String>,
    /// Named day-parts (morning, night, ...)
    pub timing: Vec<String>,
    /// Course length tokens ("5 days", "for 1 week", "till finished")
    pub duration: Vec<String>,
    /// Meal relation ("after food", "empty stomach")
    pub food_instruction: Vec<String>,
}

impl MedicineEntity {
    /// Create an entity with no details yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Values collected for a field.
    pub fn field(&self, kind: FieldKind) -> &[String] {
        match kind {
            FieldKind::Dosage => &self.dosage,
            FieldKind::Timing => &self.timing,
            FieldKind::Duration => &self.duration,
            FieldKind::FoodInstruction => &self.food_instruction,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut Vec<String> {
        match kind {
            FieldKind::Dosage => &mut self.dosage,
            FieldKind::Timing => &mut self.timing,
            FieldKind::Duration => &mut self.duration,
            FieldKind::FoodInstruction => &mut self.food_instruction,
        }
    }

    /// Append a raw value to a field. Duplicates are removed by [`dedup_fields`].
    ///
    /// [`dedup_fields`]: MedicineEntity::dedup_fields
    pub fn push(&mut self, kind: FieldKind, value: impl Into<String>) {
        self.field_mut(kind).push(value.into());
    }

    /// Union another entity's fields into this one (names are not compared).
    pub fn absorb(&mut self, other: MedicineEntity) {
        self.dosage.extend(other.dosage);
        self.timing.extend(other.timing);
        self.duration.extend(other.duration);
        self.food_instruction.extend(other.food_instruction);
        self.dedup_fields();
    }

    /// Remove repeated values, keeping the first occurrence of each.
    pub fn dedup_fields(&mut self) {
        for kind in FieldKind::ALL {
            let values = self.field_mut(kind);
            let mut seen = std::collections::HashSet::new();
            values.retain(|v| seen.insert(v.clone()));
        }
    }

    /// Dosage tokens joined for display on a reminder.
    pub fn dosage_description(&self) -> String {
        self.dosage.join(", ")
    }

    /// Food instructions joined for display on a reminder.
    pub fn instruction_description(&self) -> String {
        self.food_instruction.join(", ")
    }
}
