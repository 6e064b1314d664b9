//! The rendered side of the diary.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{DiaryEntry, EntryId, MealType};

/// Global listeners registered per rendered entry by its swipe gesture
/// (pointer move and pointer up are tracked outside the element).
pub const LISTENERS_PER_ENTRY: usize = 2;

/// Horizontal offset (percent of the element width) and opacity of a
/// rendered entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryVisual {
    pub offset_percent: f64,
    pub opacity: f64,
}

impl EntryVisual {
    pub const RESTING: EntryVisual = EntryVisual {
        offset_percent: 0.0,
        opacity: 1.0,
    };

    /// Slid fully out to the left.
    pub const DISMISSED: EntryVisual = EntryVisual {
        offset_percent: -100.0,
        opacity: 0.0,
    };
}

impl Default for EntryVisual {
    fn default() -> Self {
        EntryVisual::RESTING
    }
}

/// Entries of one meal and their calorie subtotal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealGroup {
    pub meal_type: MealType,
    pub entries: Vec<DiaryEntry>,
    pub subtotal_kcal: f64,
}

impl MealGroup {
    pub fn new(meal_type: MealType, entries: Vec<DiaryEntry>) -> Self {
        let subtotal_kcal = entries.iter().map(|e| e.calories).sum();
        Self {
            meal_type,
            entries,
            subtotal_kcal,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Operations reconciliation needs from whatever renders the diary.
pub trait DiarySurface: Send {
    /// Ids of every rendered entry, in display order.
    fn rendered_entry_ids(&self) -> Vec<EntryId>;

    /// Removes the element for `id` and releases its global listeners.
    fn detach_entry(&mut self, id: EntryId);

    /// Re-renders one meal section from `group`.
    fn render_meal(&mut self, group: &MealGroup);

    fn set_entry_visual(&mut self, id: EntryId, visual: EntryVisual);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEntry {
    pub entry: DiaryEntry,
    pub visual: EntryVisual,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedMeal {
    pub entries: Vec<RenderedEntry>,
    pub subtotal_kcal: f64,
}

/// A [`DiarySurface`] that keeps the rendered tree in memory.
///
/// Tracks the global listener registrations of every element so leaks are
/// observable.
#[derive(Debug, Default)]
pub struct InMemorySurface {
    sections: HashMap<MealType, RenderedMeal>,
    global_listeners: usize,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, meal_type: MealType) -> Option<&RenderedMeal> {
        self.sections.get(&meal_type)
    }

    pub fn subtotal(&self, meal_type: MealType) -> f64 {
        self.sections
            .get(&meal_type)
            .map(|s| s.subtotal_kcal)
            .unwrap_or(0.0)
    }

    pub fn visual(&self, id: EntryId) -> Option<EntryVisual> {
        self.find(id).map(|r| r.visual)
    }

    pub fn rendered_count(&self) -> usize {
        self.sections.values().map(|s| s.entries.len()).sum()
    }

    pub fn global_listener_count(&self) -> usize {
        self.global_listeners
    }

    fn find(&self, id: EntryId) -> Option<&RenderedEntry> {
        self.sections
            .values()
            .flat_map(|s| s.entries.iter())
            .find(|r| r.entry.id == id)
    }

    fn release(&mut self, count: usize) {
        self.global_listeners = self
            .global_listeners
            .saturating_sub(count * LISTENERS_PER_ENTRY);
    }
}

impl DiarySurface for InMemorySurface {
    fn rendered_entry_ids(&self) -> Vec<EntryId> {
        MealType::ALL
            .iter()
            .filter_map(|meal| self.sections.get(meal))
            .flat_map(|s| s.entries.iter().map(|r| r.entry.id))
            .collect()
    }

    fn detach_entry(&mut self, id: EntryId) {
        let mut removed = 0;
        for section in self.sections.values_mut() {
            let before = section.entries.len();
            section.entries.retain(|r| r.entry.id != id);
            removed += before - section.entries.len();
        }
        self.release(removed);
    }

    fn render_meal(&mut self, group: &MealGroup) {
        let previous = self.sections.remove(&group.meal_type).unwrap_or_default();
        let mut kept: HashMap<EntryId, EntryVisual> = previous
            .entries
            .iter()
            .map(|r| (r.entry.id, r.visual))
            .collect();

        let mut entries = Vec::with_capacity(group.entries.len());
        let mut created = 0;
        for entry in &group.entries {
            let visual = match kept.remove(&entry.id) {
                Some(visual) => visual,
                None => {
                    created += 1;
                    EntryVisual::RESTING
                }
            };
            entries.push(RenderedEntry {
                entry: entry.clone(),
                visual,
            });
        }

        // elements of this section that did not survive the re-render
        self.release(kept.len());
        self.global_listeners += created * LISTENERS_PER_ENTRY;

        self.sections.insert(
            group.meal_type,
            RenderedMeal {
                entries,
                subtotal_kcal: group.subtotal_kcal,
            },
        );
    }

    fn set_entry_visual(&mut self, id: EntryId, visual: EntryVisual) {
        for section in self.sections.values_mut() {
            if let Some(rendered) = section.entries.iter_mut().find(|r| r.entry.id == id) {
                rendered.visual = visual;
            }
        }
    }
}
