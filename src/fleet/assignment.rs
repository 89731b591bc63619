use std::collections::BTreeMap;

use serde::Serialize;

use crate::aptitude::Aptitude;
use crate::error::EngineError;
use crate::officer::Officer;

/// Fixed number of officer slots in one fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSlots {
    slots: Vec<Option<Officer>>,
}

impl FleetSlots {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Officer> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Officer> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Assigned officers with their slot index.
    pub fn assigned(&self) -> impl Iterator<Item = (usize, &Officer)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, officer)| officer.as_ref().map(|officer| (slot, officer)))
    }

    /// Places `officer`, returning whoever held the slot. Callers check first.
    pub(crate) fn place(&mut self, slot: usize, officer: Officer) -> Option<Officer> {
        self.slots.get_mut(slot).and_then(|entry| entry.replace(officer))
    }

    pub(crate) fn take(&mut self, slot: usize) -> Option<Officer> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}

/// Checks binding `candidate` into `slot`. The officer currently in `slot` is
/// ignored, since it is the one being replaced.
pub fn check_assignment(
    candidate: &Officer,
    slot: usize,
    slots: &FleetSlots,
    aptitudes: &BTreeMap<String, Aptitude>,
) -> Result<(), EngineError> {
    if slot >= slots.len() {
        return Err(EngineError::InvalidSlot {
            slot,
            slots: slots.len(),
        });
    }
    let candidate_aptitude = aptitudes
        .get(&candidate.aptitude)
        .ok_or_else(|| EngineError::UnknownAptitude(candidate.aptitude.clone()))?;

    for (other_slot, existing) in slots.assigned().filter(|(other, _)| *other != slot) {
        if existing.id == candidate.id {
            return Err(EngineError::DuplicateOfficer {
                officer: candidate.id.clone(),
                slot: other_slot,
            });
        }
        if existing.aptitude == candidate.aptitude {
            return Err(EngineError::DuplicateAptitudeAssignment {
                candidate: candidate.id.clone(),
                existing: existing.id.clone(),
                aptitude: candidate.aptitude.clone(),
            });
        }
        let Some(existing_aptitude) = aptitudes.get(&existing.aptitude) else {
            continue;
        };
        if let Some(category) = candidate_aptitude
            .categories
            .iter()
            .find(|category| existing_aptitude.categories.contains(category))
        {
            return Err(EngineError::DuplicateCategoryAssignment {
                candidate: candidate.id.clone(),
                existing: existing.id.clone(),
                category: category.clone(),
            });
        }
    }
    Ok(())
}

pub fn can_assign(
    candidate: &Officer,
    slot: usize,
    slots: &FleetSlots,
    aptitudes: &BTreeMap<String, Aptitude>,
) -> bool {
    check_assignment(candidate, slot, slots, aptitudes).is_ok()
}
