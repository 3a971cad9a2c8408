//! Stateful line walk that groups extracted details under medicines.

use tracing::debug;

use crate::models::MedicineEntity;

/// Walk state: either before the first medicine or collecting for one.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WalkState {
    #[default]
    Idle,
    InMedicine(MedicineEntity),
}

/// Accumulates medicine entities across a line walk.
///
/// `open` seals any current entity before starting a new one; `finish` seals
/// the last one and runs the deduplication post-pass.
#[derive(Debug, Default)]
pub struct EntityAccumulator {
    state: WalkState,
    sealed: Vec<MedicineEntity>,
}

impl EntityAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal the open entity (if any) and start a new one.
    pub fn open(&mut self, name: &str) {
        self.flush();
        debug!(name, "opening medicine");
        self.state = WalkState::InMedicine(MedicineEntity::new(name));
    }

    /// Seal the open entity (if any) and return to idle.
    pub fn flush(&mut self) {
        if let WalkState::InMedicine(entity) = std::mem::take(&mut self.state) {
            debug!(name = %entity.name, "sealing medicine");
            self.sealed.push(entity);
        }
    }

    /// The entity currently collecting details.
    pub fn current_mut(&mut self) -> Option<&mut MedicineEntity> {
        match &mut self.state {
            WalkState::InMedicine(entity) => Some(entity),
            WalkState::Idle => None,
        }
    }

    pub fn state(&self) -> &WalkState {
        &self.state
    }

    /// Entities sealed so far, in discovery order (before deduplication).
    pub fn sealed(&self) -> &[MedicineEntity] {
        &self.sealed
    }

    /// Seal the last entity and return deduplicated results.
    pub fn finish(mut self) -> Vec<MedicineEntity> {
        self.flush();
        merge_by_name(self.sealed)
    }
}

/// Deduplicate field values, then merge repeated names into their first
/// occurrence (first position preserved).
pub fn merge_by_name(entities: Vec<MedicineEntity>) -> Vec<MedicineEntity> {
    let mut merged: Vec<MedicineEntity> = Vec::with_capacity(entities.len());
    for mut entity in entities {
        entity.dedup_fields();
        match merged.iter_mut().find(|m| m.name == entity.name) {
            Some(first) => {
                debug!(name = %entity.name, "merging repeated medicine");
                first.absorb(entity);
            }
            None => merged.push(entity),
        }
    }
    merged
}
