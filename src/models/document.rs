use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated document kept in history.
///
/// History is append-only from the user's point of view: entries are saved
/// and deleted but never edited. `template_id` is absent for documents that
/// did not come from a template, such as saved wizard briefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHistory {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for saving a document to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentInput {
    pub title: String,
    pub content: String,
    pub template_id: Option<Uuid>,
}

/// Input for generating documentation from a stored template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDocumentInput {
    pub template_id: Uuid,
    pub input: String,
}

/// A freshly generated, not yet saved document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    /// Suggested title, `"{template name} - {date}"`.
    pub title: String,
    pub content: String,
    pub template_id: Uuid,
}
