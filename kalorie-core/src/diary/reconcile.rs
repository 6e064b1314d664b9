//! Brings a [`DiarySurface`] in line with authoritative diary entries.

use std::collections::HashSet;

use serde::Serialize;

use super::surface::{DiarySurface, MealGroup};
use crate::models::{DiaryEntry, EntryId, MealType};

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Rendered ids that were detached because the backend no longer has them
    pub removed: Vec<EntryId>,
    /// One group per meal type, in display order
    pub groups: Vec<MealGroup>,
}

impl ReconcileReport {
    pub fn total_kcal(&self) -> f64 {
        self.groups.iter().map(|g| g.subtotal_kcal).sum()
    }

    pub fn group(&self, meal_type: MealType) -> Option<&MealGroup> {
        self.groups.iter().find(|g| g.meal_type == meal_type)
    }
}

/// Groups entries by meal, one group for every meal type.
///
/// Repeated ids keep only their first occurrence.
pub fn group_entries(entries: &[DiaryEntry]) -> Vec<MealGroup> {
    let unique = dedup_by_id(entries);
    MealType::ALL
        .iter()
        .map(|meal| {
            let members = unique
                .iter()
                .filter(|e| e.meal_type == *meal)
                .map(|&e| e.clone())
                .collect();
            MealGroup::new(*meal, members)
        })
        .collect()
}

/// Detaches rendered entries missing from `entries`, then re-renders every
/// meal section. Running it twice with the same entries changes nothing the
/// second time.
pub fn reconcile(surface: &mut dyn DiarySurface, entries: &[DiaryEntry]) -> ReconcileReport {
    let authoritative: HashSet<EntryId> = entries.iter().map(|e| e.id).collect();

    let mut removed = Vec::new();
    for id in surface.rendered_entry_ids() {
        if !authoritative.contains(&id) && !removed.contains(&id) {
            surface.detach_entry(id);
            removed.push(id);
        }
    }

    let groups = group_entries(entries);
    for group in &groups {
        surface.render_meal(group);
    }

    if !removed.is_empty() {
        tracing::debug!(?removed, "detached stale diary entries");
    }
    ReconcileReport { removed, groups }
}

fn dedup_by_id(entries: &[DiaryEntry]) -> Vec<&DiaryEntry> {
    let mut seen = HashSet::new();
    entries.iter().filter(|e| seen.insert(e.id)).collect()
}
