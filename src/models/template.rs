use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable documentation template.
///
/// `content` is a Markdown skeleton whose headings the generated document
/// must keep; `description` holds the instructions telling the model how to
/// turn free-form user input into that structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    /// Instructions for how to process user input with this template.
    pub description: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a new template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
}

/// Input for updating an existing template. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}
