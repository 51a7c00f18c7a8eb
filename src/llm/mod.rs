//! External generation gateways.
//!
//! The wizard engines only depend on the [`Generator`] and [`ImageGenerator`]
//! traits. [`OpenAiClient`] and [`GeminiClient`] are the production
//! implementations; [`Resilient`] wraps either with a timeout and retry policy.

mod error;
pub mod gemini;
pub mod openai;
pub mod parse;
mod prompts;
mod retry;

use std::collections::HashMap;

use async_trait::async_trait;

pub use error::{GenerationError, GenerationResult};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use retry::{with_retry, Resilient, RetryPolicy};

use crate::models::{DimensionInput, DimensionOption, Idea, MockupResult};

/// Context for generating candidate answers for one dimension.
#[derive(Debug, Clone, Default)]
pub struct OptionsRequest {
    pub initial_idea: String,
    pub dimension_name: String,
    /// Already selected answers keyed by dimension id.
    pub prior_selections: HashMap<String, String>,
    /// Extra guidance supplied with a reroll.
    pub extra_context: Option<String>,
}

/// Input for HTML mockup generation.
#[derive(Debug, Clone, Default)]
pub struct MockupRequest {
    pub description: String,
    /// Reference images as data URLs.
    pub images: Vec<String>,
    /// Text description of the images from the vision model.
    pub image_analysis: Option<String>,
}

/// Input for template-driven documentation generation.
#[derive(Debug, Clone, Default)]
pub struct DocumentationRequest {
    pub template_name: String,
    pub instructions: String,
    pub skeleton: String,
    pub user_input: String,
}

/// Text generation backed by a chat-completion model.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Ordered agenda of dimensions for an idea.
    async fn generate_agenda(&self, initial_idea: &str) -> GenerationResult<Vec<DimensionInput>>;

    /// Candidate answers for the active dimension.
    async fn generate_options(&self, request: &OptionsRequest) -> GenerationResult<Vec<DimensionOption>>;

    /// Scope questions for the legacy scope-document flow.
    async fn generate_ideas(&self, prompt: &str) -> GenerationResult<Vec<Idea>>;

    async fn generate_mockup(&self, request: &MockupRequest) -> GenerationResult<MockupResult>;

    /// Markdown document following a template.
    async fn generate_documentation(&self, request: &DocumentationRequest) -> GenerationResult<String>;
}

/// Image generation and image understanding.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the image as a `data:<mime>;base64,<data>` URL.
    async fn generate_image(&self, prompt: &str) -> GenerationResult<String>;

    /// Describe reference images for design generation.
    async fn analyze_images(&self, images: &[String], context: &str) -> GenerationResult<String>;
}
