use serde::{Deserialize, Serialize};

/// Placeholder token the mockup generator puts in `html` for image `index`.
pub fn image_placeholder(index: usize) -> String {
    format!("{{{{IMAGE_{}}}}}", index)
}

/// Output of the mockup generator.
///
/// Each `image_prompts[i]` describes an image that replaces the
/// [`image_placeholder`] token `i` inside `html`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MockupResult {
    pub html: String,
    pub explanation: String,
    #[serde(default)]
    pub image_prompts: Vec<String>,
}

/// Input for the mockup studio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMockupInput {
    pub description: String,
    /// Reference images as `data:<mime>;base64,<data>` URLs.
    #[serde(default)]
    pub images: Vec<String>,
}
