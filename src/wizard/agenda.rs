//! Agenda engine: the ordered dimension sequence and its status machine.
//!
//! Statuses follow a single rule: every dimension before the active one is
//! `Done`, the active one is `Active`, and everything after it is `Todo`.
//! After the last dimension is advanced none is active.

use std::collections::HashSet;

use uuid::Uuid;

use super::error::{WizardError, WizardResult};
use crate::models::{Dimension, DimensionInput, DimensionStatus};

/// Smallest agenda the user may confirm or shrink to.
pub const MIN_AGENDA_SIZE: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct Agenda {
    dimensions: Vec<Dimension>,
    confirmed: bool,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the agenda. The first dimension becomes active.
    pub fn initialize(&mut self, inputs: Vec<DimensionInput>) -> WizardResult<()> {
        if inputs.is_empty() {
            return Err(WizardError::EmptyAgenda);
        }

        let mut seen = HashSet::new();
        let mut dimensions = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let dimension = into_dimension(input, index)?;
            if !seen.insert(dimension.id.clone()) {
                return Err(WizardError::validation(format!(
                    "Duplicate dimension id '{}'",
                    dimension.id
                )));
            }
            dimensions.push(dimension);
        }

        self.dimensions = dimensions;
        self.confirmed = false;
        Ok(())
    }

    /// Freeze the structure; afterwards only statuses change.
    pub fn confirm(&mut self) -> WizardResult<()> {
        if self.dimensions.len() < MIN_AGENDA_SIZE {
            return Err(WizardError::MinimumAgendaSize {
                min: MIN_AGENDA_SIZE,
                actual: self.dimensions.len(),
            });
        }
        self.confirmed = true;
        Ok(())
    }

    /// Mark `from_id` done and activate the next dimension.
    ///
    /// Returns the id of the newly active dimension, or `None` once the
    /// agenda is complete.
    pub fn advance(&mut self, from_id: &str) -> WizardResult<Option<String>> {
        let index = self.require_index(from_id)?;
        if self.dimensions[index].status != DimensionStatus::Active {
            return Err(WizardError::NotActive(from_id.to_string()));
        }

        self.confirmed = true;
        self.dimensions[index].status = DimensionStatus::Done;

        match self.dimensions.get_mut(index + 1) {
            Some(next) => {
                next.status = DimensionStatus::Active;
                Ok(Some(next.id.clone()))
            }
            None => Ok(None),
        }
    }

    /// Make `target_id` active again, discarding forward progress.
    pub fn rewind_to(&mut self, target_id: &str) -> WizardResult<()> {
        let target = self.require_index(target_id)?;
        self.set_active_index(target);
        Ok(())
    }

    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> WizardResult<()> {
        self.ensure_editable()?;
        let len = self.dimensions.len();
        if from_index >= len || to_index >= len {
            return Err(WizardError::validation(format!(
                "Index out of range (agenda has {} dimensions)",
                len
            )));
        }

        let dimension = self.dimensions.remove(from_index);
        self.dimensions.insert(to_index, dimension);
        self.set_active_index(0);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> WizardResult<Dimension> {
        self.ensure_editable()?;
        let index = self.require_index(id)?;
        if self.dimensions.len() <= MIN_AGENDA_SIZE {
            return Err(WizardError::MinimumAgendaSize {
                min: MIN_AGENDA_SIZE,
                actual: self.dimensions.len() - 1,
            });
        }

        let removed = self.dimensions.remove(index);
        self.set_active_index(0);
        Ok(removed)
    }

    /// Insert a dimension at `index` (clamped to the end). Returns its id.
    pub fn insert(&mut self, input: DimensionInput, index: usize) -> WizardResult<String> {
        self.ensure_editable()?;
        let index = index.min(self.dimensions.len());
        let dimension = into_dimension(input, index)?;
        if self.index_of(&dimension.id).is_some() {
            return Err(WizardError::validation(format!(
                "Duplicate dimension id '{}'",
                dimension.id
            )));
        }

        let id = dimension.id.clone();
        self.dimensions.insert(index, dimension);
        self.set_active_index(0);
        Ok(id)
    }

    pub fn rename(&mut self, id: &str, name: &str, description: &str) -> WizardResult<()> {
        self.ensure_editable()?;
        let index = self.require_index(id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WizardError::validation("Dimension name cannot be empty"));
        }

        let dimension = &mut self.dimensions[index];
        dimension.name = name.to_string();
        dimension.description = description.trim().to_string();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.dimensions.clear();
        self.confirmed = false;
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn get(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.id == id)
    }

    pub fn active(&self) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.status == DimensionStatus::Active)
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// True when every dimension is done.
    pub fn is_complete(&self) -> bool {
        !self.dimensions.is_empty()
            && self
                .dimensions
                .iter()
                .all(|d| d.status == DimensionStatus::Done)
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn to_inputs(&self) -> Vec<DimensionInput> {
        self.dimensions.iter().map(DimensionInput::from).collect()
    }

    fn require_index(&self, id: &str) -> WizardResult<usize> {
        self.index_of(id)
            .ok_or_else(|| WizardError::dimension_not_found(id))
    }

    fn ensure_editable(&self) -> WizardResult<()> {
        if self.confirmed {
            Err(WizardError::AgendaFrozen)
        } else {
            Ok(())
        }
    }

    fn set_active_index(&mut self, active: usize) {
        for (index, dimension) in self.dimensions.iter_mut().enumerate() {
            dimension.status = match index.cmp(&active) {
                std::cmp::Ordering::Less => DimensionStatus::Done,
                std::cmp::Ordering::Equal => DimensionStatus::Active,
                std::cmp::Ordering::Greater => DimensionStatus::Todo,
            };
        }
    }
}

fn into_dimension(input: DimensionInput, index: usize) -> WizardResult<Dimension> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(WizardError::validation("Dimension name cannot be empty"));
    }

    let id = match input.id.trim() {
        "" => format!("custom-{}", Uuid::new_v4()),
        id => id.to_string(),
    };

    Ok(Dimension {
        id,
        name: name.to_string(),
        description: input.description.trim().to_string(),
        status: if index == 0 {
            DimensionStatus::Active
        } else {
            DimensionStatus::Todo
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(ids: &[&str]) -> Vec<DimensionInput> {
        ids.iter()
            .map(|id| DimensionInput::new(*id, id.to_uppercase(), format!("About {}", id)))
            .collect()
    }

    fn statuses(agenda: &Agenda) -> Vec<DimensionStatus> {
        agenda.dimensions().iter().map(|d| d.status).collect()
    }

    #[test]
    fn initialize_activates_only_the_first_dimension() {
        for n in 1..=8 {
            let ids: Vec<String> = (0..n).map(|i| format!("d{}", i)).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut agenda = Agenda::new();
            agenda.initialize(inputs(&refs)).unwrap();

            let active = statuses(&agenda)
                .iter()
                .filter(|s| **s == DimensionStatus::Active)
                .count();
            assert_eq!(active, 1);
            assert_eq!(agenda.dimensions()[0].status, DimensionStatus::Active);
            assert_eq!(
                statuses(&agenda)
                    .iter()
                    .filter(|s| **s == DimensionStatus::Todo)
                    .count(),
                n - 1
            );
        }
    }

    #[test]
    fn initialize_rejects_empty_agenda() {
        let mut agenda = Agenda::new();
        assert_eq!(agenda.initialize(vec![]), Err(WizardError::EmptyAgenda));
    }

    #[test]
    fn initialize_rejects_duplicate_ids() {
        let mut agenda = Agenda::new();
        let err = agenda.initialize(inputs(&["a", "a"])).unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn initialize_assigns_ids_to_blank_inputs() {
        let mut agenda = Agenda::new();
        agenda
            .initialize(vec![DimensionInput::new("", "Audience", "")])
            .unwrap();
        assert!(agenda.dimensions()[0].id.starts_with("custom-"));
    }

    #[test]
    fn advancing_every_dimension_completes_the_agenda() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c", "d"])).unwrap();

        let mut steps = 0;
        while let Some(active) = agenda.active().map(|d| d.id.clone()) {
            agenda.advance(&active).unwrap();
            steps += 1;
        }

        assert_eq!(steps, 4);
        assert!(agenda.is_complete());
        assert!(agenda.active().is_none());
    }

    #[test]
    fn advance_returns_next_active_id() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b"])).unwrap();

        assert_eq!(agenda.advance("a").unwrap(), Some("b".to_string()));
        assert_eq!(agenda.advance("b").unwrap(), None);
    }

    #[test]
    fn advance_rejects_non_active_dimension() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b"])).unwrap();

        assert_eq!(
            agenda.advance("b"),
            Err(WizardError::NotActive("b".to_string()))
        );
        assert!(matches!(
            agenda.advance("zzz"),
            Err(WizardError::NotFound { .. })
        ));
    }

    #[test]
    fn rewind_resets_statuses_around_target() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c", "d"])).unwrap();
        agenda.advance("a").unwrap();
        agenda.advance("b").unwrap();
        agenda.advance("c").unwrap();

        agenda.rewind_to("b").unwrap();

        assert_eq!(
            statuses(&agenda),
            vec![
                DimensionStatus::Done,
                DimensionStatus::Active,
                DimensionStatus::Todo,
                DimensionStatus::Todo
            ]
        );
    }

    #[test]
    fn rewind_is_idempotent() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();
        agenda.advance("a").unwrap();
        agenda.advance("b").unwrap();

        agenda.rewind_to("a").unwrap();
        let first = statuses(&agenda);
        agenda.rewind_to("a").unwrap();

        assert_eq!(statuses(&agenda), first);
    }

    #[test]
    fn remove_enforces_minimum_size() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c", "d"])).unwrap();

        agenda.remove("d").unwrap();
        assert_eq!(
            agenda.remove("c"),
            Err(WizardError::MinimumAgendaSize { min: 3, actual: 2 })
        );
        assert_eq!(agenda.len(), 3);
    }

    #[test]
    fn reorder_moves_dimension_and_reactivates_first() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();

        agenda.reorder(2, 0).unwrap();

        let ids: Vec<&str> = agenda.dimensions().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(agenda.active().unwrap().id, "c");
    }

    #[test]
    fn reorder_rejects_out_of_range_index() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();
        assert!(matches!(
            agenda.reorder(0, 3),
            Err(WizardError::Validation(_))
        ));
    }

    #[test]
    fn insert_clamps_index_and_rejects_duplicates() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();

        let id = agenda
            .insert(DimensionInput::new("z", "Zed", ""), 99)
            .unwrap();
        assert_eq!(id, "z");
        assert_eq!(agenda.dimensions().last().unwrap().id, "z");

        assert!(agenda
            .insert(DimensionInput::new("a", "Again", ""), 0)
            .is_err());
    }

    #[test]
    fn rename_updates_name_and_description() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();

        agenda.rename("b", "  Pricing  ", "How it makes money").unwrap();
        let b = agenda.get("b").unwrap();
        assert_eq!(b.name, "Pricing");
        assert_eq!(b.description, "How it makes money");

        assert!(agenda.rename("b", "   ", "").is_err());
    }

    #[test]
    fn editing_is_rejected_after_confirmation() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b", "c"])).unwrap();
        agenda.confirm().unwrap();

        assert_eq!(agenda.remove("a"), Err(WizardError::AgendaFrozen));
        assert_eq!(agenda.reorder(0, 1), Err(WizardError::AgendaFrozen));
        assert_eq!(agenda.rename("a", "x", ""), Err(WizardError::AgendaFrozen));
    }

    #[test]
    fn confirm_requires_minimum_size() {
        let mut agenda = Agenda::new();
        agenda.initialize(inputs(&["a", "b"])).unwrap();
        assert_eq!(
            agenda.confirm(),
            Err(WizardError::MinimumAgendaSize { min: 3, actual: 2 })
        );
    }
}
