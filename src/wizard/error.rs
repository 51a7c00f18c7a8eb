//! Error types for the wizard engines.

use thiserror::Error;

use crate::llm::GenerationError;

/// Operation classes that may have one external call in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SubmitIdea,
    LoadOptions,
    SubmitPrompt,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitIdea => "submit_idea",
            Self::LoadOptions => "load_options",
            Self::SubmitPrompt => "submit_prompt",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the agenda engine, selection store and controllers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Agenda must contain at least one dimension")]
    EmptyAgenda,

    #[error("Agenda must contain at least {min} dimensions (got {actual})")]
    MinimumAgendaSize { min: usize, actual: usize },

    #[error("{0}")]
    Validation(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Operation not allowed in step '{actual}' (expected {expected})")]
    InvalidStep { expected: String, actual: String },

    #[error("Dimension '{0}' is not active")]
    NotActive(String),

    #[error("Agenda can no longer be edited once selection has started")]
    AgendaFrozen,

    #[error("Dimension '{0}' is not completed and cannot be revisited")]
    NotRevisitable(String),

    #[error("A {0} request is already in progress")]
    Busy(Operation),

    #[error("Discarded a stale {0} response")]
    StaleResponse(Operation),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation failed: {0}")]
    Generation(String),
}

impl WizardError {
    pub fn dimension_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Dimension",
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Message shown to the user for a failed external call.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(_) => {
                "The generation service is not configured. Check the API credentials.".to_string()
            }
            Self::Generation(msg) => format!("{}. Please try again.", msg.trim_end_matches('.')),
            other => other.to_string(),
        }
    }
}

impl From<GenerationError> for WizardError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::MissingCredentials(var) => {
                Self::Configuration(format!("{} is not set", var))
            }
            other => Self::Generation(other.to_string()),
        }
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
