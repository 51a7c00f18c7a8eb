//! Selection store: the resolved answer for each completed dimension.
//!
//! Map order is irrelevant; every ordered view is driven by the agenda's
//! dimension sequence.

use std::collections::HashMap;

use super::error::{WizardError, WizardResult};
use crate::models::{Dimension, DimensionStatus, Selection};

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: HashMap<String, Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the selection for `dimension_id`.
    pub fn record(&mut self, dimension_id: &str, text: &str, is_edited: bool) {
        self.entries.insert(
            dimension_id.to_string(),
            Selection {
                selected_option_text: text.to_string(),
                is_edited,
            },
        );
    }

    /// Drop the selection of `target_id` and of every dimension after it.
    ///
    /// The target itself is cleared because it becomes active again, and an
    /// active dimension never carries a selection.
    pub fn clear_from(&mut self, dimensions: &[Dimension], target_id: &str) -> WizardResult<()> {
        let index = dimensions
            .iter()
            .position(|d| d.id == target_id)
            .ok_or_else(|| WizardError::dimension_not_found(target_id))?;

        for dimension in &dimensions[index..] {
            self.entries.remove(&dimension.id);
        }
        Ok(())
    }

    pub fn get(&self, dimension_id: &str) -> Option<&Selection> {
        self.entries.get(dimension_id)
    }

    /// Completed dimensions paired with their selection, in agenda order.
    pub fn all_in_order<'a>(&'a self, dimensions: &'a [Dimension]) -> Vec<(&'a Dimension, &'a Selection)> {
        dimensions
            .iter()
            .filter(|d| d.status == DimensionStatus::Done)
            .filter_map(|d| self.entries.get(&d.id).map(|s| (d, s)))
            .collect()
    }

    /// Selected texts keyed by dimension id, passed as context to option generation.
    pub fn prior_texts(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(id, s)| (id.clone(), s.selected_option_text.clone()))
            .collect()
    }

    pub fn entries(&self) -> &HashMap<String, Selection> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
