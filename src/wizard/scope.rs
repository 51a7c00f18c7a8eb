//! Legacy scope-document wizard.
//!
//! A four-step flow: a prompt yields scope questions, the user includes or
//! dismisses each one, and the included questions are drafted into a
//! [`ScopeDocument`] grouped by category.

use uuid::Uuid;

use super::controller::Ticket;
use super::error::{Operation, WizardError, WizardResult};
use crate::llm::GenerationResult;
use crate::models::{EditDraftInput, Idea, ScopeDocument, ScopeStep, ScopeView};

const TITLE_LIMIT: usize = 50;
const TITLE_SUFFIX: &str = " Scope Document";

/// Derive a document title from the prompt.
///
/// Takes the prompt up to its first `.` when that occurs within the first
/// 50 characters, otherwise the first 50 characters.
pub fn draft_title(prompt: &str) -> String {
    let prompt = prompt.trim();
    let end = match prompt.chars().position(|c| c == '.') {
        Some(index) if index > 0 => index.min(TITLE_LIMIT),
        _ => TITLE_LIMIT,
    };
    let head: String = prompt.chars().take(end).collect();
    format!("{}{}", head.trim_end(), TITLE_SUFFIX)
}

#[derive(Debug, Clone)]
pub struct ScopeWizard {
    id: Uuid,
    step: ScopeStep,
    prompt: String,
    pending: Vec<Idea>,
    included: Vec<Idea>,
    document: Option<ScopeDocument>,
    last_error: Option<String>,
    in_flight: Option<u64>,
    epoch: u64,
}

impl Default for ScopeWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeWizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: ScopeStep::InitialPrompt,
            prompt: String::new(),
            pending: Vec::new(),
            included: Vec::new(),
            document: None,
            last_error: None,
            in_flight: None,
            epoch: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> ScopeStep {
        self.step
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn pending(&self) -> &[Idea] {
        &self.pending
    }

    pub fn included(&self) -> &[Idea] {
        &self.included
    }

    pub fn document(&self) -> Option<&ScopeDocument> {
        self.document.as_ref()
    }

    pub fn view(&self) -> ScopeView {
        ScopeView {
            id: self.id,
            step: self.step,
            prompt: self.prompt.clone(),
            pending: self.pending.clone(),
            included: self.included.clone(),
            document: self.document.clone(),
            last_error: self.last_error.clone(),
            loading: self.in_flight.is_some(),
        }
    }

    pub fn begin_submit_prompt(&mut self, prompt: &str) -> WizardResult<Ticket> {
        if prompt.trim().is_empty() {
            return Err(WizardError::validation("Prompt cannot be empty"));
        }
        self.ensure_step(ScopeStep::InitialPrompt)?;
        if self.in_flight.is_some() {
            return Err(WizardError::Busy(Operation::SubmitPrompt));
        }
        self.in_flight = Some(self.epoch);
        Ok(Ticket::new(Operation::SubmitPrompt, self.epoch, None))
    }

    pub fn finish_submit_prompt(
        &mut self,
        ticket: Ticket,
        prompt: &str,
        result: GenerationResult<Vec<Idea>>,
    ) -> WizardResult<()> {
        if self.in_flight == Some(ticket.token()) {
            self.in_flight = None;
        }
        if ticket.token() != self.epoch {
            tracing::warn!("Scope session {} discarded a stale response", self.id);
            return Err(WizardError::StaleResponse(Operation::SubmitPrompt));
        }

        let ideas = match result {
            Ok(ideas) if ideas.is_empty() => {
                return Err(self.record_failure(WizardError::Generation(
                    "Idea generator returned no questions".to_string(),
                )))
            }
            Ok(ideas) => ideas,
            Err(e) => return Err(self.record_failure(e.into())),
        };

        self.prompt = prompt.trim().to_string();
        self.pending = ideas
            .into_iter()
            .map(|idea| Idea { saved: false, ..idea })
            .collect();
        self.included.clear();
        self.document = None;
        self.last_error = None;
        self.move_to(ScopeStep::ReviewQuestions);
        Ok(())
    }

    /// Free the in-flight slot of a call that will never finish.
    pub fn abandon(&mut self, ticket: &Ticket) {
        if self.in_flight == Some(ticket.token()) {
            self.in_flight = None;
            tracing::debug!("Scope session {} abandoned a prompt submission", self.id);
        }
    }

    /// Move a pending idea into the scope.
    pub fn include(&mut self, idea_id: &str) -> WizardResult<()> {
        self.ensure_step(ScopeStep::ReviewQuestions)?;
        let mut idea = self.take_pending(idea_id)?;
        idea.saved = true;
        self.included.push(idea);
        self.epoch += 1;
        Ok(())
    }

    pub fn dismiss(&mut self, idea_id: &str) -> WizardResult<()> {
        self.ensure_step(ScopeStep::ReviewQuestions)?;
        self.take_pending(idea_id)?;
        self.epoch += 1;
        Ok(())
    }

    /// Build the draft document from the included ideas.
    pub fn draft(&mut self) -> WizardResult<()> {
        self.ensure_step(ScopeStep::ReviewQuestions)?;
        if self.included.is_empty() {
            return Err(WizardError::validation(
                "Include at least one question before drafting",
            ));
        }

        self.document = Some(ScopeDocument::new(
            draft_title(&self.prompt),
            self.prompt.clone(),
            self.included.clone(),
        ));
        self.move_to(ScopeStep::DraftScope);
        Ok(())
    }

    pub fn edit_draft(&mut self, input: EditDraftInput) -> WizardResult<()> {
        self.ensure_step(ScopeStep::DraftScope)?;
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| WizardError::validation("No draft to edit"))?;

        if let Some(title) = input.title {
            document.title = title;
        }
        if let Some(description) = input.description {
            document.description = description;
        }
        self.epoch += 1;
        Ok(())
    }

    pub fn finalize(&mut self) -> WizardResult<()> {
        self.ensure_step(ScopeStep::DraftScope)?;
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| WizardError::validation("No draft to finalize"))?;
        if document.title.trim().is_empty() {
            return Err(WizardError::validation("Title cannot be empty"));
        }
        if document.description.trim().is_empty() {
            return Err(WizardError::validation("Description cannot be empty"));
        }
        self.move_to(ScopeStep::FinalDocument);
        Ok(())
    }

    /// One step backward; a no-op on the first step.
    pub fn back(&mut self) {
        let previous = match self.step {
            ScopeStep::InitialPrompt => return,
            ScopeStep::ReviewQuestions => ScopeStep::InitialPrompt,
            ScopeStep::DraftScope => ScopeStep::ReviewQuestions,
            ScopeStep::FinalDocument => ScopeStep::DraftScope,
        };
        self.move_to(previous);
    }

    pub fn start_over(&mut self) {
        let (id, epoch) = (self.id, self.epoch);
        *self = Self::new();
        self.id = id;
        self.epoch = epoch + 1;
        tracing::debug!("Scope session {} reset", self.id);
    }

    /// The finished document, available once finalized.
    pub fn final_document(&self) -> WizardResult<&ScopeDocument> {
        self.ensure_step(ScopeStep::FinalDocument)?;
        self.document
            .as_ref()
            .ok_or_else(|| WizardError::validation("No final document"))
    }

    fn take_pending(&mut self, idea_id: &str) -> WizardResult<Idea> {
        let index = self
            .pending
            .iter()
            .position(|i| i.id == idea_id)
            .ok_or_else(|| WizardError::NotFound {
                kind: "Idea",
                id: idea_id.to_string(),
            })?;
        Ok(self.pending.remove(index))
    }

    fn ensure_step(&self, expected: ScopeStep) -> WizardResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidStep {
                expected: expected.to_string(),
                actual: self.step.to_string(),
            })
        }
    }

    fn record_failure(&mut self, error: WizardError) -> WizardError {
        tracing::warn!("Scope session {} external call failed: {}", self.id, error);
        self.last_error = Some(error.user_message());
        error
    }

    fn move_to(&mut self, step: ScopeStep) {
        tracing::debug!("Scope session {}: {} -> {}", self.id, self.step, step);
        self.step = step;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use crate::models::IdeaType;

    fn idea(id: &str, idea_type: IdeaType) -> Idea {
        Idea {
            id: id.to_string(),
            content: format!("Question {}", id),
            idea_type,
            saved: false,
        }
    }

    fn reviewing() -> ScopeWizard {
        let mut scope = ScopeWizard::new();
        let ticket = scope.begin_submit_prompt("Offline sync. For field teams").unwrap();
        scope
            .finish_submit_prompt(
                ticket,
                "Offline sync. For field teams",
                Ok(vec![
                    idea("1", IdeaType::Feature),
                    idea("2", IdeaType::UseCase),
                    idea("3", IdeaType::Consideration),
                    idea("4", IdeaType::Feature),
                ]),
            )
            .unwrap();
        scope
    }

    #[test]
    fn title_stops_at_first_period() {
        assert_eq!(draft_title("Offline sync. For field teams"), "Offline sync Scope Document");
    }

    #[test]
    fn title_is_capped_at_fifty_characters() {
        let prompt = "a".repeat(80);
        assert_eq!(draft_title(&prompt), format!("{} Scope Document", "a".repeat(50)));

        let late_period = format!("{}. tail", "b".repeat(60));
        assert_eq!(draft_title(&late_period), format!("{} Scope Document", "b".repeat(50)));
    }

    #[test]
    fn leading_period_is_ignored() {
        assert_eq!(draft_title(".net migration"), ".net migration Scope Document");
    }

    #[test]
    fn prompt_yields_pending_questions() {
        let scope = reviewing();
        assert_eq!(scope.step(), ScopeStep::ReviewQuestions);
        assert_eq!(scope.pending().len(), 4);
        assert!(scope.included().is_empty());
    }

    #[test]
    fn failed_prompt_stays_on_first_step() {
        let mut scope = ScopeWizard::new();
        let ticket = scope.begin_submit_prompt("x").unwrap();
        let err = scope
            .finish_submit_prompt(ticket, "x", Err(GenerationError::Malformed("nope".to_string())))
            .unwrap_err();
        assert!(matches!(err, WizardError::Generation(_)));
        assert_eq!(scope.step(), ScopeStep::InitialPrompt);
        assert!(scope.view().last_error.is_some());
        assert!(!scope.view().loading);
    }

    #[test]
    fn abandoned_prompt_can_be_resubmitted() {
        let mut scope = ScopeWizard::new();
        let ticket = scope.begin_submit_prompt("x").unwrap();
        assert!(matches!(scope.begin_submit_prompt("x"), Err(WizardError::Busy(_))));

        scope.abandon(&ticket);
        assert!(!scope.view().loading);
        assert!(scope.begin_submit_prompt("x").is_ok());
    }

    #[test]
    fn include_and_dismiss_move_ideas_out_of_pending() {
        let mut scope = reviewing();
        scope.include("2").unwrap();
        scope.dismiss("3").unwrap();

        assert_eq!(scope.pending().len(), 2);
        assert_eq!(scope.included().len(), 1);
        assert!(scope.included()[0].saved);
        assert!(matches!(scope.include("3"), Err(WizardError::NotFound { .. })));
    }

    #[test]
    fn draft_requires_an_included_idea() {
        let mut scope = reviewing();
        assert!(matches!(scope.draft(), Err(WizardError::Validation(_))));
    }

    #[test]
    fn draft_groups_included_ideas() {
        let mut scope = reviewing();
        for id in ["4", "2", "1"] {
            scope.include(id).unwrap();
        }
        scope.draft().unwrap();

        let document = scope.document().unwrap();
        assert_eq!(document.title, "Offline sync Scope Document");
        assert_eq!(document.description, "Offline sync. For field teams");
        assert_eq!(document.item_count(), 3);
        let features: Vec<_> = document.categories[&IdeaType::Feature]
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(features, vec!["4", "1"]);
    }

    #[test]
    fn finalize_requires_title_and_description() {
        let mut scope = reviewing();
        scope.include("1").unwrap();
        scope.draft().unwrap();
        scope
            .edit_draft(EditDraftInput {
                title: Some("  ".to_string()),
                description: None,
            })
            .unwrap();
        assert!(matches!(scope.finalize(), Err(WizardError::Validation(_))));

        scope
            .edit_draft(EditDraftInput {
                title: Some("Sync".to_string()),
                description: None,
            })
            .unwrap();
        scope.finalize().unwrap();
        assert_eq!(scope.final_document().unwrap().title, "Sync");
    }

    #[test]
    fn back_walks_one_step_and_stops_at_the_start() {
        let mut scope = reviewing();
        scope.include("1").unwrap();
        scope.draft().unwrap();

        scope.back();
        assert_eq!(scope.step(), ScopeStep::ReviewQuestions);
        scope.back();
        assert_eq!(scope.step(), ScopeStep::InitialPrompt);
        scope.back();
        assert_eq!(scope.step(), ScopeStep::InitialPrompt);
    }

    #[test]
    fn start_over_keeps_the_session_id() {
        let mut scope = reviewing();
        let id = scope.id();
        scope.start_over();
        assert_eq!(scope.id(), id);
        assert_eq!(scope.step(), ScopeStep::InitialPrompt);
        assert!(scope.pending().is_empty());
    }
}
