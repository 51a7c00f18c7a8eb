//! OpenAI chat-completions implementation of [`Generator`].

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse::{parse_listing, parse_structured_response};
use super::prompts;
use super::{
    DocumentationRequest, GenerationError, GenerationResult, Generator, MockupRequest,
    OptionsRequest,
};
use crate::models::{DimensionInput, DimensionOption, Idea, IdeaType, MockupResult};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano-2025-04-14";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default)]
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawIdea {
    #[serde(rename = "type")]
    idea_type: String,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMockup {
    html: String,
    #[serde(default)]
    explanation: String,
    #[serde(default, alias = "image_prompts")]
    image_prompts: Vec<String>,
}

/// Chat-completions client.
///
/// A missing API key is not an error until a call is made, so the service
/// starts without credentials and reports a configuration error per call.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(
        &self,
        system: &str,
        user: MessageContent,
        temperature: f32,
        max_tokens: u32,
    ) -> GenerationResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredentials("OPENAI_API_KEY"))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        tracing::debug!("POST {}/chat/completions (model {})", self.base_url, self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Malformed(format!("chat response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerationError::Empty("content"))
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate_agenda(&self, initial_idea: &str) -> GenerationResult<Vec<DimensionInput>> {
        let content = self
            .chat(
                prompts::AGENDA_SYSTEM,
                MessageContent::Text(initial_idea.to_string()),
                0.7,
                1500,
            )
            .await?;

        let dimensions: Vec<DimensionInput> = parse_listing(&content)?;
        if dimensions.is_empty() {
            return Err(GenerationError::Empty("agenda dimensions"));
        }
        Ok(dimensions)
    }

    async fn generate_options(&self, request: &OptionsRequest) -> GenerationResult<Vec<DimensionOption>> {
        let content = self
            .chat(
                prompts::OPTIONS_SYSTEM,
                MessageContent::Text(prompts::options_user(request)),
                0.8,
                1000,
            )
            .await?;

        let raw: Vec<RawOption> = parse_listing(&content)?;
        let options = normalize_options(raw);
        if options.is_empty() {
            return Err(GenerationError::Empty("options"));
        }
        Ok(options)
    }

    async fn generate_ideas(&self, prompt: &str) -> GenerationResult<Vec<Idea>> {
        let content = self
            .chat(
                prompts::IDEAS_SYSTEM,
                MessageContent::Text(prompt.to_string()),
                0.8,
                1500,
            )
            .await?;

        let raw: Vec<RawIdea> = parse_listing(&content)?;
        let ideas = raw
            .into_iter()
            .map(|r| {
                let idea_type = IdeaType::from_str(r.idea_type.trim()).ok_or_else(|| {
                    GenerationError::Malformed(format!("unknown idea type '{}'", r.idea_type))
                })?;
                Ok(Idea {
                    id: format!("idea-{}", Uuid::new_v4()),
                    content: r.content.trim().to_string(),
                    idea_type,
                    saved: false,
                })
            })
            .collect::<GenerationResult<Vec<_>>>()?;

        if ideas.is_empty() {
            return Err(GenerationError::Empty("ideas"));
        }
        Ok(ideas)
    }

    async fn generate_mockup(&self, request: &MockupRequest) -> GenerationResult<MockupResult> {
        let mut parts = vec![ContentPart::Text {
            text: prompts::mockup_user(request),
        }];
        parts.extend(request.images.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.clone() },
        }));

        let content = self
            .chat(prompts::MOCKUP_SYSTEM, MessageContent::Parts(parts), 0.7, 4000)
            .await?;

        let raw: RawMockup = parse_structured_response(&content)?;
        if raw.html.trim().is_empty() {
            return Err(GenerationError::Empty("mockup html"));
        }
        Ok(MockupResult {
            html: raw.html,
            explanation: raw.explanation,
            image_prompts: raw.image_prompts,
        })
    }

    async fn generate_documentation(&self, request: &DocumentationRequest) -> GenerationResult<String> {
        self.chat(
            prompts::DOCUMENTATION_SYSTEM,
            MessageContent::Text(prompts::documentation_user(request)),
            0.7,
            2000,
        )
        .await
    }
}

/// Drop blank options and give every survivor a unique id. Blank or
/// repeated ids fall back to `option-N`, bumped past any id already taken.
fn normalize_options(raw: Vec<RawOption>) -> Vec<DimensionOption> {
    let mut used = HashSet::new();
    raw.into_iter()
        .filter(|o| !o.text.trim().is_empty())
        .enumerate()
        .map(|(i, o)| {
            let mut id = o.id.trim().to_string();
            if id.is_empty() || used.contains(&id) {
                let mut n = i + 1;
                id = format!("option-{}", n);
                while used.contains(&id) {
                    n += 1;
                    id = format!("option-{}", n);
                }
            }
            used.insert(id.clone());
            DimensionOption {
                id,
                text: o.text.trim().to_string(),
                is_edited: false,
            }
        })
        .collect()
}
