use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A generated scope question from the legacy scope-document flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Idea {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub idea_type: IdeaType,
    /// Set once the user includes the idea in the scope.
    #[serde(default)]
    pub saved: bool,
}

/// Category tag of an [`Idea`].
///
/// The declaration order is the canonical category order used when a scope
/// document groups its items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IdeaType {
    UseCase,
    Feature,
    Consideration,
}

impl IdeaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UseCase => "use_case",
            Self::Feature => "feature",
            Self::Consideration => "consideration",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "use_case" => Some(Self::UseCase),
            "feature" => Some(Self::Feature),
            "consideration" => Some(Self::Consideration),
            _ => None,
        }
    }

    /// Section heading used in exported documents, e.g. `USE CASE`.
    pub fn heading(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    pub fn from_heading(heading: &str) -> Option<Self> {
        Self::from_str(&heading.trim().to_lowercase().replace(' ', "_"))
    }
}

/// The artifact of the legacy scope-document wizard.
///
/// `categories` always mirrors `included_items` grouped by type; items keep
/// their inclusion order inside a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeDocument {
    pub title: String,
    pub description: String,
    pub included_items: Vec<Idea>,
    pub categories: BTreeMap<IdeaType, Vec<Idea>>,
}

impl ScopeDocument {
    pub fn new(title: impl Into<String>, description: impl Into<String>, included_items: Vec<Idea>) -> Self {
        let categories = group_by_type(&included_items);
        Self {
            title: title.into(),
            description: description.into(),
            included_items,
            categories,
        }
    }

    pub fn item_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Group ideas by category, preserving order within each category.
pub fn group_by_type(ideas: &[Idea]) -> BTreeMap<IdeaType, Vec<Idea>> {
    let mut groups: BTreeMap<IdeaType, Vec<Idea>> = BTreeMap::new();
    for idea in ideas {
        groups.entry(idea.idea_type).or_default().push(idea.clone());
    }
    groups
}

/// Input for editing a drafted scope document. Absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditDraftInput {
    pub title: Option<String>,
    pub description: Option<String>,
}
