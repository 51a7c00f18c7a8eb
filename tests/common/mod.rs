#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use idea_shaper::llm::{
    DocumentationRequest, GenerationError, GenerationResult, Generator, ImageGenerator,
    MockupRequest, OptionsRequest,
};
use idea_shaper::models::*;

/// Scripted generator for driving the wizards without a network.
pub struct FakeGenerator {
    agenda: Vec<DimensionInput>,
    failures: Mutex<u32>,
    pub option_requests: Mutex<Vec<OptionsRequest>>,
    pub documentation_requests: Mutex<Vec<DocumentationRequest>>,
}

impl FakeGenerator {
    /// Agenda with one dimension per name; ids are the lowercased names.
    pub fn with_agenda(names: &[&str]) -> Self {
        Self {
            agenda: names
                .iter()
                .map(|n| DimensionInput::new(n.to_lowercase(), *n, format!("About {}", n)))
                .collect(),
            failures: Mutex::new(0),
            option_requests: Mutex::new(Vec::new()),
            documentation_requests: Mutex::new(Vec::new()),
        }
    }

    /// Make the next `count` calls fail with an upstream error.
    pub fn fail_next(&self, count: u32) {
        *self.failures.lock().unwrap() = count;
    }

    pub fn last_options_request(&self) -> OptionsRequest {
        self.option_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no options request recorded")
    }

    fn check_failure(&self) -> GenerationResult<()> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(GenerationError::Api {
                status: 400,
                message: "upstream rejected the request".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::with_agenda(&["Platform", "Audience", "Monetization"])
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate_agenda(&self, _initial_idea: &str) -> GenerationResult<Vec<DimensionInput>> {
        self.check_failure()?;
        Ok(self.agenda.clone())
    }

    async fn generate_options(&self, request: &OptionsRequest) -> GenerationResult<Vec<DimensionOption>> {
        self.check_failure()?;
        self.option_requests.lock().unwrap().push(request.clone());
        Ok((1..=3)
            .map(|n| DimensionOption {
                id: format!("option-{}", n),
                text: format!("{} choice {}", request.dimension_name, n),
                is_edited: false,
            })
            .collect())
    }

    async fn generate_ideas(&self, prompt: &str) -> GenerationResult<Vec<Idea>> {
        self.check_failure()?;
        let idea = |id: &str, content: String, idea_type| Idea {
            id: id.to_string(),
            content,
            idea_type,
            saved: false,
        };
        Ok(vec![
            idea("idea-1", format!("Who uses {}?", prompt), IdeaType::UseCase),
            idea("idea-2", "Offline mode".to_string(), IdeaType::Feature),
            idea("idea-3", "Data retention".to_string(), IdeaType::Consideration),
        ])
    }

    async fn generate_mockup(&self, request: &MockupRequest) -> GenerationResult<MockupResult> {
        self.check_failure()?;
        Ok(MockupResult {
            html: format!("<h1>{}</h1><img src=\"{{{{IMAGE_0}}}}\">", request.description),
            explanation: request
                .image_analysis
                .clone()
                .unwrap_or_else(|| "Simple layout".to_string()),
            image_prompts: vec!["hero banner".to_string()],
        })
    }

    async fn generate_documentation(&self, request: &DocumentationRequest) -> GenerationResult<String> {
        self.check_failure()?;
        self.documentation_requests.lock().unwrap().push(request.clone());
        Ok(format!("# {}\n\n\n\nBody for {}\n", request.template_name, request.user_input))
    }
}

/// Image generator returning deterministic data URLs.
#[derive(Default)]
pub struct FakeImages;

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, prompt: &str) -> GenerationResult<String> {
        Ok(format!("data:image/png;base64,{}", prompt.replace(' ', "-")))
    }

    async fn analyze_images(&self, images: &[String], _context: &str) -> GenerationResult<String> {
        Ok(format!("{} reference images", images.len()))
    }
}

/// Generator whose calls never complete, for dropping requests mid-flight.
pub struct HangingGenerator;

#[async_trait]
impl Generator for HangingGenerator {
    async fn generate_agenda(&self, _initial_idea: &str) -> GenerationResult<Vec<DimensionInput>> {
        futures::future::pending().await
    }

    async fn generate_options(&self, _request: &OptionsRequest) -> GenerationResult<Vec<DimensionOption>> {
        futures::future::pending().await
    }

    async fn generate_ideas(&self, _prompt: &str) -> GenerationResult<Vec<Idea>> {
        futures::future::pending().await
    }

    async fn generate_mockup(&self, _request: &MockupRequest) -> GenerationResult<MockupResult> {
        futures::future::pending().await
    }

    async fn generate_documentation(&self, _request: &DocumentationRequest) -> GenerationResult<String> {
        futures::future::pending().await
    }
}
