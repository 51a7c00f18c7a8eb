use serde::{Deserialize, Serialize};

/// One topic the wizard resolves before producing the brief.
///
/// Dimensions live in an ordered agenda. The position in that sequence is
/// the canonical traversal order, and `id` is the stable key that joins a
/// dimension to its [`Selection`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: DimensionStatus,
}

/// Progress of a single dimension.
///
/// - `Todo`: not reached yet
/// - `Active`: the dimension currently being answered (at most one)
/// - `Done`: answered; a selection exists for it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Todo,
    Active,
    Done,
}

/// A dimension as produced by the agenda generator or edited by the user,
/// before the agenda engine assigns it a status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionInput {
    /// Kebab-case identifier. Blank ids are replaced on insertion.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl DimensionInput {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<&Dimension> for DimensionInput {
    fn from(d: &Dimension) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            description: d.description.clone(),
        }
    }
}

/// A candidate answer for the active dimension.
///
/// Options are transient: they are regenerated on every visit or reroll and
/// never persisted. `is_edited` flips only when the user rewrites the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_edited: bool,
}

/// The resolved answer for a completed dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub selected_option_text: String,
    pub is_edited: bool,
}

/// Input for recording a selection on the active dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOptionInput {
    pub dimension_id: String,
    pub text: String,
    #[serde(default)]
    pub is_edited: bool,
}

/// Input for renaming a dimension during agenda review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameDimensionInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Input for inserting a dimension during agenda review.
/// `index` defaults to the end of the agenda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertDimensionInput {
    #[serde(flatten)]
    pub dimension: DimensionInput,
    pub index: Option<usize>,
}

/// Input for moving a dimension during agenda review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderDimensionsInput {
    pub from_index: usize,
    pub to_index: usize,
}
