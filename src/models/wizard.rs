use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dimension::{Dimension, DimensionInput, DimensionOption, Selection};
use super::idea::{Idea, ScopeDocument};

/// Position of the idea-shaping wizard.
///
/// `CollectingIdea → ReviewingAgenda → SelectingDimension → Brief`.
/// `ReviewingAgenda` can only be re-entered before the first selection;
/// `SelectingDimension` is re-entered from `Brief` by navigating back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    CollectingIdea,
    ReviewingAgenda,
    SelectingDimension,
    Brief,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectingIdea => "collecting_idea",
            Self::ReviewingAgenda => "reviewing_agenda",
            Self::SelectingDimension => "selecting_dimension",
            Self::Brief => "brief",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a wizard session returned to clients after every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardView {
    pub id: Uuid,
    pub step: WizardStep,
    pub initial_idea: String,
    pub dimensions: Vec<Dimension>,
    pub current_dimension_id: Option<String>,
    pub selections: HashMap<String, Selection>,
    pub options: Vec<DimensionOption>,
    pub master_prompt: String,
    pub project_summary: String,
    /// Last external failure, cleared by the next successful call.
    pub last_error: Option<String>,
    /// Operations with an external call outstanding.
    pub loading: Vec<String>,
}

/// One answered dimension in the brief.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub dimension_id: String,
    pub name: String,
    pub text: String,
    pub is_edited: bool,
}

/// The terminal artifact of a completed wizard run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brief {
    pub initial_idea: String,
    pub decisions: Vec<Decision>,
    pub master_prompt: String,
    pub project_summary: String,
}

/// Input for submitting the initial idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitIdeaInput {
    pub idea: String,
}

/// Input for confirming the agenda. When `dimensions` is absent the agenda
/// as edited in place is confirmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmAgendaInput {
    pub dimensions: Option<Vec<DimensionInput>>,
}

/// Input for (re)generating options. `extra_context` steers a reroll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOptionsInput {
    pub extra_context: Option<String>,
}

/// Input for rewriting an option's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOptionInput {
    pub text: String,
}

/// Input for revisiting a completed dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateInput {
    pub dimension_id: String,
}

/// Position of the legacy scope-document wizard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStep {
    InitialPrompt,
    ReviewQuestions,
    DraftScope,
    FinalDocument,
}

impl ScopeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialPrompt => "initial_prompt",
            Self::ReviewQuestions => "review_questions",
            Self::DraftScope => "draft_scope",
            Self::FinalDocument => "final_document",
        }
    }
}

impl std::fmt::Display for ScopeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a scope-document session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeView {
    pub id: Uuid,
    pub step: ScopeStep,
    pub prompt: String,
    /// Ideas not yet included or dismissed.
    pub pending: Vec<Idea>,
    pub included: Vec<Idea>,
    pub document: Option<ScopeDocument>,
    pub last_error: Option<String>,
    pub loading: bool,
}

/// Input for submitting the scope prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPromptInput {
    pub prompt: String,
}
