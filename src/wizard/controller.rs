//! Navigation controller: the idea-shaping wizard state machine.
//!
//! Every synchronous operation is one transaction on `&mut Wizard`. Calls
//! to a generator are split in two halves around the await: `begin_*`
//! validates, marks the operation in flight and hands out a [`Ticket`];
//! `finish_*` checks the ticket against the current generation token and
//! applies the result or discards it as stale.

use std::collections::HashMap;

use uuid::Uuid;

use super::agenda::{Agenda, MIN_AGENDA_SIZE};
use super::derive::{derive_master_prompt, derive_project_summary};
use super::error::{Operation, WizardError, WizardResult};
use super::selections::SelectionStore;
use crate::llm::{GenerationResult, OptionsRequest};
use crate::models::{
    Brief, Decision, DimensionInput, DimensionOption, DimensionStatus, WizardStep, WizardView,
};

/// Proof that an external call was started, checked when its result lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    operation: Operation,
    token: u64,
    dimension_id: Option<String>,
}

impl Ticket {
    pub(super) fn new(operation: Operation, token: u64, dimension_id: Option<String>) -> Self {
        Self {
            operation,
            token,
            dimension_id,
        }
    }

    pub(super) fn token(&self) -> u64 {
        self.token
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn dimension_id(&self) -> Option<&str> {
        self.dimension_id.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    id: Uuid,
    step: WizardStep,
    initial_idea: String,
    agenda: Agenda,
    selections: SelectionStore,
    current_dimension_id: Option<String>,
    options: Vec<DimensionOption>,
    master_prompt: String,
    project_summary: String,
    last_error: Option<String>,
    /// Operation class → token of the call currently in flight.
    in_flight: HashMap<Operation, u64>,
    /// Generation token, bumped by every mutation.
    epoch: u64,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        let mut wizard = Self {
            id,
            step: WizardStep::CollectingIdea,
            initial_idea: String::new(),
            agenda: Agenda::new(),
            selections: SelectionStore::new(),
            current_dimension_id: None,
            options: Vec::new(),
            master_prompt: String::new(),
            project_summary: String::new(),
            last_error: None,
            in_flight: HashMap::new(),
            epoch: 0,
        };
        wizard.recompute();
        wizard
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn initial_idea(&self) -> &str {
        &self.initial_idea
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn current_dimension_id(&self) -> Option<&str> {
        self.current_dimension_id.as_deref()
    }

    pub fn options(&self) -> &[DimensionOption] {
        &self.options
    }

    pub fn master_prompt(&self) -> &str {
        &self.master_prompt
    }

    pub fn project_summary(&self) -> &str {
        &self.project_summary
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        self.in_flight.contains_key(&operation)
    }

    pub fn view(&self) -> WizardView {
        let mut loading: Vec<String> = self
            .in_flight
            .keys()
            .map(|op| op.as_str().to_string())
            .collect();
        loading.sort();

        WizardView {
            id: self.id,
            step: self.step,
            initial_idea: self.initial_idea.clone(),
            dimensions: self.agenda.dimensions().to_vec(),
            current_dimension_id: self.current_dimension_id.clone(),
            selections: self.selections.entries().clone(),
            options: self.options.clone(),
            master_prompt: self.master_prompt.clone(),
            project_summary: self.project_summary.clone(),
            last_error: self.last_error.clone(),
            loading,
        }
    }

    // ============================================================
    // Idea submission
    // ============================================================

    /// Start generating an agenda for `idea`.
    pub fn begin_submit_idea(&mut self, idea: &str) -> WizardResult<Ticket> {
        if idea.trim().is_empty() {
            return Err(WizardError::validation("Idea cannot be empty"));
        }
        self.ensure_step(
            &[WizardStep::CollectingIdea, WizardStep::ReviewingAgenda],
            "collecting_idea or reviewing_agenda",
        )?;
        self.begin(Operation::SubmitIdea, None)
    }

    /// Apply the agenda generator's answer for a ticket from [`Self::begin_submit_idea`].
    pub fn finish_submit_idea(
        &mut self,
        ticket: Ticket,
        idea: &str,
        result: GenerationResult<Vec<DimensionInput>>,
    ) -> WizardResult<()> {
        let dimensions = self.settle(&ticket, result)?;
        if dimensions.is_empty() {
            return Err(self.record_failure(WizardError::Generation(
                "Agenda generator returned no dimensions".to_string(),
            )));
        }

        let mut agenda = Agenda::new();
        if let Err(e) = agenda.initialize(dimensions) {
            return Err(self.record_failure(WizardError::Generation(format!(
                "Agenda generator returned an invalid agenda: {}",
                e
            ))));
        }

        self.agenda = agenda;
        self.initial_idea = idea.trim().to_string();
        self.selections.clear();
        self.options.clear();
        self.current_dimension_id = None;
        self.transition(WizardStep::ReviewingAgenda);
        tracing::debug!(
            "Wizard {} generated an agenda of {} dimensions",
            self.id,
            self.agenda.len()
        );
        Ok(())
    }

    // ============================================================
    // Agenda review
    // ============================================================

    pub fn insert_dimension(&mut self, input: DimensionInput, index: Option<usize>) -> WizardResult<String> {
        self.ensure_step(&[WizardStep::ReviewingAgenda], "reviewing_agenda")?;
        let index = index.unwrap_or(self.agenda.len());
        let id = self.agenda.insert(input, index)?;
        self.touch();
        Ok(id)
    }

    pub fn remove_dimension(&mut self, id: &str) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::ReviewingAgenda], "reviewing_agenda")?;
        self.agenda.remove(id)?;
        self.touch();
        Ok(())
    }

    pub fn rename_dimension(&mut self, id: &str, name: &str, description: &str) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::ReviewingAgenda], "reviewing_agenda")?;
        self.agenda.rename(id, name, description)?;
        self.touch();
        Ok(())
    }

    pub fn reorder_dimensions(&mut self, from_index: usize, to_index: usize) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::ReviewingAgenda], "reviewing_agenda")?;
        self.agenda.reorder(from_index, to_index)?;
        self.touch();
        Ok(())
    }

    /// Freeze the agenda and start with its first dimension.
    pub fn confirm_agenda(&mut self, edited: Option<Vec<DimensionInput>>) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::ReviewingAgenda], "reviewing_agenda")?;

        let inputs = edited.unwrap_or_else(|| self.agenda.to_inputs());
        if inputs.len() < MIN_AGENDA_SIZE {
            return Err(WizardError::MinimumAgendaSize {
                min: MIN_AGENDA_SIZE,
                actual: inputs.len(),
            });
        }

        let mut agenda = Agenda::new();
        agenda.initialize(inputs)?;
        agenda.confirm()?;

        self.current_dimension_id = agenda.active().map(|d| d.id.clone());
        self.agenda = agenda;
        self.selections.clear();
        self.options.clear();
        self.transition(WizardStep::SelectingDimension);
        Ok(())
    }

    // ============================================================
    // Options
    // ============================================================

    /// Start generating options for the active dimension (initial load or reroll).
    pub fn begin_load_options(&mut self, extra_context: Option<String>) -> WizardResult<(Ticket, OptionsRequest)> {
        self.ensure_step(&[WizardStep::SelectingDimension], "selecting_dimension")?;
        let dimension = self
            .current_dimension_id
            .as_deref()
            .and_then(|id| self.agenda.get(id))
            .ok_or_else(|| WizardError::validation("No dimension is active"))?;

        let request = OptionsRequest {
            initial_idea: self.initial_idea.clone(),
            dimension_name: dimension.name.clone(),
            prior_selections: self.selections.prior_texts(),
            extra_context: extra_context.filter(|c| !c.trim().is_empty()),
        };
        let dimension_id = dimension.id.clone();

        let ticket = self.begin(Operation::LoadOptions, Some(dimension_id))?;
        Ok((ticket, request))
    }

    /// Replace the current options with a generator answer.
    pub fn finish_load_options(
        &mut self,
        ticket: Ticket,
        result: GenerationResult<Vec<DimensionOption>>,
    ) -> WizardResult<()> {
        let options = self.settle(&ticket, result)?;
        if options.is_empty() {
            return Err(self.record_failure(WizardError::Generation(
                "Option generator returned no options".to_string(),
            )));
        }

        self.options = options
            .into_iter()
            .map(|o| DimensionOption { is_edited: false, ..o })
            .collect();
        self.touch();
        tracing::debug!(
            "Wizard {} loaded {} options for '{}'",
            self.id,
            self.options.len(),
            ticket.dimension_id().unwrap_or_default()
        );
        Ok(())
    }

    /// Rewrite the text of one option.
    pub fn edit_option(&mut self, option_id: &str, text: &str) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::SelectingDimension], "selecting_dimension")?;
        let text = text.trim();
        if text.is_empty() {
            return Err(WizardError::validation("Option text cannot be empty"));
        }

        let option = self
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or_else(|| WizardError::NotFound {
                kind: "Option",
                id: option_id.to_string(),
            })?;
        option.text = text.to_string();
        option.is_edited = true;
        self.touch();
        Ok(())
    }

    // ============================================================
    // Selection and navigation
    // ============================================================

    /// Record the answer for the current dimension and move on.
    pub fn select_option(&mut self, dimension_id: &str, text: &str, is_edited: bool) -> WizardResult<()> {
        self.ensure_step(&[WizardStep::SelectingDimension], "selecting_dimension")?;
        if self.current_dimension_id.as_deref() != Some(dimension_id) {
            return Err(WizardError::NotActive(dimension_id.to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(WizardError::validation("Selection text cannot be empty"));
        }

        let next = self.agenda.advance(dimension_id)?;
        self.selections.record(dimension_id, text, is_edited);
        self.options.clear();
        self.current_dimension_id = next;

        match &self.current_dimension_id {
            Some(next) => {
                tracing::debug!("Wizard {} answered '{}', next '{}'", self.id, dimension_id, next);
                self.touch();
            }
            None => self.transition(WizardStep::Brief),
        }
        Ok(())
    }

    /// Revisit a completed dimension, discarding it and every later answer.
    pub fn navigate_to(&mut self, dimension_id: &str) -> WizardResult<()> {
        self.ensure_step(
            &[WizardStep::SelectingDimension, WizardStep::Brief],
            "selecting_dimension or brief",
        )?;
        let dimension = self
            .agenda
            .get(dimension_id)
            .ok_or_else(|| WizardError::dimension_not_found(dimension_id))?;
        if dimension.status != DimensionStatus::Done {
            return Err(WizardError::NotRevisitable(dimension_id.to_string()));
        }

        self.selections.clear_from(self.agenda.dimensions(), dimension_id)?;
        self.agenda.rewind_to(dimension_id)?;
        self.current_dimension_id = Some(dimension_id.to_string());
        self.options.clear();
        self.transition(WizardStep::SelectingDimension);
        Ok(())
    }

    /// Give up on a call whose result will never be applied. Frees the
    /// in-flight slot if `ticket` still holds it; state is otherwise untouched.
    pub fn abandon(&mut self, ticket: &Ticket) {
        if self.in_flight.get(&ticket.operation) == Some(&ticket.token) {
            self.in_flight.remove(&ticket.operation);
            tracing::debug!("Wizard {} abandoned {}", self.id, ticket.operation);
        }
    }

    /// Discard everything and return to idea collection.
    pub fn start_over(&mut self) {
        self.step = WizardStep::CollectingIdea;
        self.initial_idea.clear();
        self.agenda.clear();
        self.selections.clear();
        self.current_dimension_id = None;
        self.options.clear();
        self.last_error = None;
        self.in_flight.clear();
        self.touch();
        tracing::debug!("Wizard {} reset", self.id);
    }

    /// The terminal artifact, available once every dimension is answered.
    pub fn brief(&self) -> WizardResult<Brief> {
        self.ensure_step(&[WizardStep::Brief], "brief")?;
        let decisions = self
            .selections
            .all_in_order(self.agenda.dimensions())
            .into_iter()
            .map(|(dimension, selection)| Decision {
                dimension_id: dimension.id.clone(),
                name: dimension.name.clone(),
                text: selection.selected_option_text.clone(),
                is_edited: selection.is_edited,
            })
            .collect();

        Ok(Brief {
            initial_idea: self.initial_idea.clone(),
            decisions,
            master_prompt: self.master_prompt.clone(),
            project_summary: self.project_summary.clone(),
        })
    }

    // ============================================================
    // Bookkeeping
    // ============================================================

    fn ensure_step(&self, allowed: &[WizardStep], expected: &str) -> WizardResult<()> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WizardError::InvalidStep {
                expected: expected.to_string(),
                actual: self.step.to_string(),
            })
        }
    }

    fn begin(&mut self, operation: Operation, dimension_id: Option<String>) -> WizardResult<Ticket> {
        if self.in_flight.contains_key(&operation) {
            return Err(WizardError::Busy(operation));
        }
        self.in_flight.insert(operation, self.epoch);
        tracing::debug!("Wizard {} started {}", self.id, operation);
        Ok(Ticket::new(operation, self.epoch, dimension_id))
    }

    /// Release the in-flight slot of `ticket` and vet its result.
    ///
    /// A result whose ticket no longer matches the current generation token
    /// (or current dimension) is discarded without touching state.
    fn settle<T>(&mut self, ticket: &Ticket, result: GenerationResult<T>) -> WizardResult<T> {
        if self.in_flight.get(&ticket.operation) == Some(&ticket.token) {
            self.in_flight.remove(&ticket.operation);
        }

        let dimension_moved = ticket.operation == Operation::LoadOptions
            && ticket.dimension_id != self.current_dimension_id;
        if ticket.token != self.epoch || dimension_moved {
            tracing::warn!(
                "Wizard {} discarded a stale {} response",
                self.id,
                ticket.operation
            );
            return Err(WizardError::StaleResponse(ticket.operation));
        }

        result.map_err(|e| self.record_failure(WizardError::from(e)))
    }

    fn record_failure(&mut self, error: WizardError) -> WizardError {
        tracing::warn!("Wizard {} external call failed: {}", self.id, error);
        self.last_error = Some(error.user_message());
        error
    }

    fn transition(&mut self, step: WizardStep) {
        if self.step != step {
            tracing::debug!("Wizard {}: {} -> {}", self.id, self.step, step);
        }
        self.step = step;
        self.touch();
    }

    /// Bump the generation token and recompute derived text.
    fn touch(&mut self) {
        self.epoch += 1;
        self.last_error = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        let ordered = self.selections.all_in_order(self.agenda.dimensions());
        self.master_prompt = derive_master_prompt(&self.initial_idea, &ordered);
        self.project_summary = derive_project_summary(&self.initial_idea, &ordered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;

    fn agenda(ids: &[&str]) -> Vec<DimensionInput> {
        ids.iter()
            .map(|id| DimensionInput::new(*id, *id, format!("About {}", id)))
            .collect()
    }

    fn options(texts: &[&str]) -> Vec<DimensionOption> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| DimensionOption {
                id: format!("option-{}", i + 1),
                text: text.to_string(),
                is_edited: false,
            })
            .collect()
    }

    fn reviewing(ids: &[&str]) -> Wizard {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_submit_idea("Recipe app").unwrap();
        wizard
            .finish_submit_idea(ticket, "Recipe app", Ok(agenda(ids)))
            .unwrap();
        wizard
    }

    fn selecting(ids: &[&str]) -> Wizard {
        let mut wizard = reviewing(ids);
        wizard.confirm_agenda(None).unwrap();
        wizard
    }

    fn statuses(wizard: &Wizard) -> Vec<DimensionStatus> {
        wizard.agenda().dimensions().iter().map(|d| d.status).collect()
    }

    #[test]
    fn new_wizard_collects_an_idea() {
        let wizard = Wizard::new();
        assert_eq!(wizard.step(), WizardStep::CollectingIdea);
        assert_eq!(wizard.master_prompt(), "Software Idea: \n\nSelections:\n");
        assert!(wizard.agenda().is_empty());
    }

    #[test]
    fn blank_idea_is_rejected() {
        let mut wizard = Wizard::new();
        let err = wizard.begin_submit_idea("   ").unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
        assert!(!wizard.is_in_flight(Operation::SubmitIdea));
    }

    #[test]
    fn submitted_idea_moves_to_agenda_review() {
        let wizard = reviewing(&["a", "b", "c"]);
        assert_eq!(wizard.step(), WizardStep::ReviewingAgenda);
        assert_eq!(wizard.initial_idea(), "Recipe app");
        assert_eq!(wizard.master_prompt(), "Software Idea: Recipe app\n\nSelections:\n");
        assert_eq!(wizard.project_summary(), "Recipe app\n\n");
        assert_eq!(wizard.current_dimension_id(), None);
        assert!(!wizard.is_in_flight(Operation::SubmitIdea));
    }

    #[test]
    fn second_submission_while_in_flight_is_busy() {
        let mut wizard = Wizard::new();
        let _ticket = wizard.begin_submit_idea("one").unwrap();
        let err = wizard.begin_submit_idea("two").unwrap_err();
        assert_eq!(err, WizardError::Busy(Operation::SubmitIdea));
        assert_eq!(wizard.view().loading, vec!["submit_idea".to_string()]);
    }

    #[test]
    fn failed_submission_leaves_state_and_allows_retry() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_submit_idea("Recipe app").unwrap();
        let err = wizard
            .finish_submit_idea(
                ticket,
                "Recipe app",
                Err(GenerationError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
            )
            .unwrap_err();

        assert!(matches!(err, WizardError::Generation(_)));
        assert_eq!(wizard.step(), WizardStep::CollectingIdea);
        assert!(wizard.agenda().is_empty());
        assert!(wizard.last_error().is_some());

        let ticket = wizard.begin_submit_idea("Recipe app").unwrap();
        wizard
            .finish_submit_idea(ticket, "Recipe app", Ok(agenda(&["a", "b", "c"])))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::ReviewingAgenda);
        assert!(wizard.last_error().is_none());
    }

    #[test]
    fn missing_credentials_become_configuration_errors() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_submit_idea("x").unwrap();
        let err = wizard
            .finish_submit_idea(ticket, "x", Err(GenerationError::MissingCredentials("OPENAI_API_KEY")))
            .unwrap_err();
        assert!(matches!(err, WizardError::Configuration(_)));
    }

    #[test]
    fn empty_generated_agenda_is_a_generation_error() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_submit_idea("x").unwrap();
        let err = wizard.finish_submit_idea(ticket, "x", Ok(vec![])).unwrap_err();
        assert!(matches!(err, WizardError::Generation(_)));
        assert_eq!(wizard.step(), WizardStep::CollectingIdea);
    }

    #[test]
    fn start_over_invalidates_in_flight_calls() {
        let mut wizard = Wizard::new();
        let stale = wizard.begin_submit_idea("old").unwrap();
        wizard.start_over();

        let fresh = wizard.begin_submit_idea("new").unwrap();
        let err = wizard
            .finish_submit_idea(stale, "old", Ok(agenda(&["a", "b", "c"])))
            .unwrap_err();
        assert_eq!(err, WizardError::StaleResponse(Operation::SubmitIdea));
        assert_eq!(wizard.step(), WizardStep::CollectingIdea);
        assert!(wizard.is_in_flight(Operation::SubmitIdea));

        wizard
            .finish_submit_idea(fresh, "new", Ok(agenda(&["x", "y", "z"])))
            .unwrap();
        assert_eq!(wizard.initial_idea(), "new");
    }

    #[test]
    fn abandon_frees_the_slot_for_a_retry() {
        let mut wizard = Wizard::new();
        let dropped = wizard.begin_submit_idea("idea").unwrap();
        wizard.abandon(&dropped);
        assert!(!wizard.is_in_flight(Operation::SubmitIdea));

        let retry = wizard.begin_submit_idea("idea").unwrap();
        // An older ticket must not release the newer call
        wizard.abandon(&dropped);
        assert!(wizard.is_in_flight(Operation::SubmitIdea));

        wizard
            .finish_submit_idea(retry, "idea", Ok(agenda(&["a", "b", "c"])))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::ReviewingAgenda);
    }

    #[test]
    fn agenda_edits_only_during_review() {
        let mut wizard = reviewing(&["a", "b", "c", "d"]);
        wizard.remove_dimension("d").unwrap();
        wizard.rename_dimension("a", "Audience", "Who uses it").unwrap();
        wizard.reorder_dimensions(0, 2).unwrap();
        let id = wizard
            .insert_dimension(DimensionInput::new("", "Pricing", ""), Some(1))
            .unwrap();
        assert!(id.starts_with("custom-"));
        assert_eq!(wizard.agenda().len(), 4);

        wizard.confirm_agenda(None).unwrap();
        let err = wizard.remove_dimension("b").unwrap_err();
        assert!(matches!(err, WizardError::InvalidStep { .. }));
    }

    #[test]
    fn confirm_requires_three_dimensions() {
        let mut wizard = reviewing(&["a", "b", "c"]);
        let err = wizard.confirm_agenda(Some(agenda(&["a", "b"]))).unwrap_err();
        assert_eq!(err, WizardError::MinimumAgendaSize { min: 3, actual: 2 });
        assert_eq!(wizard.step(), WizardStep::ReviewingAgenda);
    }

    #[test]
    fn confirm_uses_the_edited_list() {
        let mut wizard = reviewing(&["a", "b", "c"]);
        wizard
            .confirm_agenda(Some(agenda(&["c", "b", "a", "e"])))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::SelectingDimension);
        assert_eq!(wizard.current_dimension_id(), Some("c"));
        assert!(wizard.agenda().is_confirmed());
        assert_eq!(wizard.agenda().len(), 4);
    }

    #[test]
    fn options_replace_previous_ones_and_reset_edits() {
        let mut wizard = selecting(&["a", "b", "c"]);
        let (ticket, request) = wizard.begin_load_options(None).unwrap();
        assert_eq!(request.dimension_name, "a");
        wizard
            .finish_load_options(ticket, Ok(options(&["x", "y"])))
            .unwrap();
        wizard.edit_option("option-1", "x, but better").unwrap();
        assert!(wizard.options()[0].is_edited);

        let (ticket, request) = wizard
            .begin_load_options(Some("more playful".to_string()))
            .unwrap();
        assert_eq!(request.extra_context.as_deref(), Some("more playful"));
        let mut rerolled = options(&["p", "q", "r"]);
        rerolled[0].is_edited = true;
        wizard.finish_load_options(ticket, Ok(rerolled)).unwrap();

        assert_eq!(wizard.options().len(), 3);
        assert!(wizard.options().iter().all(|o| !o.is_edited));
    }

    #[test]
    fn editing_an_option_requires_text() {
        let mut wizard = selecting(&["a", "b", "c"]);
        let (ticket, _) = wizard.begin_load_options(None).unwrap();
        wizard.finish_load_options(ticket, Ok(options(&["x"]))).unwrap();

        assert!(matches!(
            wizard.edit_option("option-1", "  "),
            Err(WizardError::Validation(_))
        ));
        assert!(matches!(
            wizard.edit_option("missing", "text"),
            Err(WizardError::NotFound { .. })
        ));
    }

    #[test]
    fn options_for_a_dimension_left_behind_are_discarded() {
        let mut wizard = selecting(&["a", "b", "c"]);
        let (ticket, _) = wizard.begin_load_options(None).unwrap();
        wizard.select_option("a", "typed by hand", true).unwrap();

        let err = wizard
            .finish_load_options(ticket, Ok(options(&["late"])))
            .unwrap_err();
        assert_eq!(err, WizardError::StaleResponse(Operation::LoadOptions));
        assert!(wizard.options().is_empty());
        assert_eq!(wizard.current_dimension_id(), Some("b"));
        assert!(!wizard.is_in_flight(Operation::LoadOptions));
    }

    #[test]
    fn failed_option_load_keeps_state_and_records_error() {
        let mut wizard = selecting(&["a", "b", "c"]);
        let (ticket, _) = wizard.begin_load_options(None).unwrap();
        let err = wizard
            .finish_load_options(ticket, Err(GenerationError::Timeout(std::time::Duration::from_secs(60))))
            .unwrap_err();

        assert!(matches!(err, WizardError::Generation(_)));
        assert!(wizard.last_error().is_some());
        assert!(!wizard.is_in_flight(Operation::LoadOptions));
        assert_eq!(wizard.current_dimension_id(), Some("a"));
    }

    #[test]
    fn select_advances_and_recomputes() {
        let mut wizard = selecting(&["a", "b", "c"]);
        wizard.select_option("a", "x", false).unwrap();

        assert_eq!(
            statuses(&wizard),
            vec![DimensionStatus::Done, DimensionStatus::Active, DimensionStatus::Todo]
        );
        assert_eq!(wizard.current_dimension_id(), Some("b"));
        assert!(wizard.master_prompt().contains("a: x"));
    }

    #[test]
    fn select_rejects_inactive_dimension_and_blank_text() {
        let mut wizard = selecting(&["a", "b", "c"]);
        assert_eq!(
            wizard.select_option("b", "x", false).unwrap_err(),
            WizardError::NotActive("b".to_string())
        );
        assert!(matches!(
            wizard.select_option("a", " ", false),
            Err(WizardError::Validation(_))
        ));
        assert!(wizard.selections().is_empty());
    }

    #[test]
    fn answering_every_dimension_produces_a_brief() {
        let mut wizard = selecting(&["a", "b", "c"]);
        assert!(matches!(wizard.brief(), Err(WizardError::InvalidStep { .. })));

        wizard.select_option("a", "x", false).unwrap();
        wizard.select_option("b", "y", true).unwrap();
        wizard.select_option("c", "z", false).unwrap();

        assert_eq!(wizard.step(), WizardStep::Brief);
        assert_eq!(wizard.current_dimension_id(), None);
        assert!(wizard.agenda().active().is_none());

        let brief = wizard.brief().unwrap();
        assert_eq!(brief.decisions.len(), 3);
        assert_eq!(brief.decisions[1].text, "y");
        assert!(brief.decisions[1].is_edited);
        assert_eq!(
            brief.master_prompt,
            "Software Idea: Recipe app\n\nSelections:\na: x\nb: y\nc: z"
        );
    }

    #[test]
    fn navigating_back_discards_later_answers() {
        let mut wizard = selecting(&["a", "b", "c"]);
        wizard.select_option("a", "x", false).unwrap();
        wizard.navigate_to("a").unwrap();

        assert_eq!(
            statuses(&wizard),
            vec![DimensionStatus::Active, DimensionStatus::Todo, DimensionStatus::Todo]
        );
        assert!(wizard.selections().is_empty());
        assert!(!wizard.master_prompt().contains("a: x"));

        wizard.select_option("a", "y", true).unwrap();
        assert!(wizard.master_prompt().contains("a: y"));
        assert!(!wizard.master_prompt().contains("a: x"));
        assert!(wizard.selections().get("a").unwrap().is_edited);
    }

    #[test]
    fn navigating_from_the_brief_reopens_selection() {
        let mut wizard = selecting(&["a", "b", "c"]);
        for (id, text) in [("a", "x"), ("b", "y"), ("c", "z")] {
            wizard.select_option(id, text, false).unwrap();
        }

        wizard.navigate_to("b").unwrap();
        assert_eq!(wizard.step(), WizardStep::SelectingDimension);
        let kept: Vec<_> = wizard.selections().entries().keys().cloned().collect();
        assert_eq!(kept, vec!["a".to_string()]);
    }

    #[test]
    fn only_completed_dimensions_can_be_revisited() {
        let mut wizard = selecting(&["a", "b", "c"]);
        wizard.select_option("a", "x", false).unwrap();

        assert_eq!(
            wizard.navigate_to("c").unwrap_err(),
            WizardError::NotRevisitable("c".to_string())
        );
        assert!(matches!(
            wizard.navigate_to("nope"),
            Err(WizardError::NotFound { .. })
        ));
    }

    #[test]
    fn start_over_resets_everything() {
        let mut wizard = selecting(&["a", "b", "c"]);
        wizard.select_option("a", "x", false).unwrap();
        wizard.start_over();

        assert_eq!(wizard.step(), WizardStep::CollectingIdea);
        assert!(wizard.agenda().is_empty());
        assert!(wizard.selections().is_empty());
        assert_eq!(wizard.initial_idea(), "");
        assert_eq!(wizard.master_prompt(), "Software Idea: \n\nSelections:\n");
    }
}
