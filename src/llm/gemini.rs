//! Gemini implementation of [`ImageGenerator`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts;
use super::{GenerationError, GenerationResult, ImageGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
const VISION_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(data: InlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl InlineData {
    /// Split a `data:<mime>;base64,<data>` URL.
    fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime_type, data) = rest.split_once(";base64,")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GenerationResult<Vec<Part>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredentials("GEMINI_API_KEY"))?;

        tracing::debug!("POST {}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .query(&[("key", api_key)])
            .json(request)
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

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Malformed(format!("generateContent response: {}", e)))?;

        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> GenerationResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            }),
        };

        let parts = self.generate_content(IMAGE_MODEL, &request).await?;
        parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(InlineData::to_data_url)
            .ok_or(GenerationError::Empty("image data"))
    }

    async fn analyze_images(&self, images: &[String], context: &str) -> GenerationResult<String> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::text(prompts::image_analysis(context, images.len())));
        for url in images {
            let data = InlineData::from_data_url(url).ok_or_else(|| {
                GenerationError::Malformed("reference image is not a base64 data URL".to_string())
            })?;
            parts.push(Part::image(data));
        }

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: None,
        };

        let parts = self.generate_content(VISION_MODEL, &request).await?;
        let analysis = parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        match analysis.trim() {
            "" => Err(GenerationError::Empty("image analysis")),
            text => Ok(text.to_string()),
        }
    }
}
