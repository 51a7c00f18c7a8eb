//! Timeout and retry-with-backoff for generation calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    DocumentationRequest, GenerationError, GenerationResult, Generator, ImageGenerator,
    MockupRequest, OptionsRequest,
};
use crate::models::{DimensionInput, DimensionOption, Idea, MockupResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, retry: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Run `op` under `policy`, retrying transient failures.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> GenerationResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GenerationResult<T>>,
{
    let mut retry = 0;
    loop {
        let result = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(policy.timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry < policy.max_retries => {
                let delay = policy.backoff(retry);
                tracing::warn!(
                    "{} failed (attempt {}): {}; retrying in {:?}",
                    label,
                    retry + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) => {
                tracing::error!("{} failed: {}", label, e);
                return Err(e);
            }
        }
    }
}

/// Decorator applying a [`RetryPolicy`] to every call of the wrapped gateway.
pub struct Resilient<G: ?Sized> {
    inner: Arc<G>,
    policy: RetryPolicy,
}

impl<G: ?Sized> Resilient<G> {
    pub fn new(inner: Arc<G>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Resilient<G> {
    async fn generate_agenda(&self, initial_idea: &str) -> GenerationResult<Vec<DimensionInput>> {
        with_retry(&self.policy, "generate_agenda", || {
            self.inner.generate_agenda(initial_idea)
        })
        .await
    }

    async fn generate_options(&self, request: &OptionsRequest) -> GenerationResult<Vec<DimensionOption>> {
        with_retry(&self.policy, "generate_options", || {
            self.inner.generate_options(request)
        })
        .await
    }

    async fn generate_ideas(&self, prompt: &str) -> GenerationResult<Vec<Idea>> {
        with_retry(&self.policy, "generate_ideas", || self.inner.generate_ideas(prompt)).await
    }

    async fn generate_mockup(&self, request: &MockupRequest) -> GenerationResult<MockupResult> {
        with_retry(&self.policy, "generate_mockup", || {
            self.inner.generate_mockup(request)
        })
        .await
    }

    async fn generate_documentation(&self, request: &DocumentationRequest) -> GenerationResult<String> {
        with_retry(&self.policy, "generate_documentation", || {
            self.inner.generate_documentation(request)
        })
        .await
    }
}

#[async_trait]
impl<G: ImageGenerator + ?Sized> ImageGenerator for Resilient<G> {
    async fn generate_image(&self, prompt: &str) -> GenerationResult<String> {
        with_retry(&self.policy, "generate_image", || self.inner.generate_image(prompt)).await
    }

    async fn analyze_images(&self, images: &[String], context: &str) -> GenerationResult<String> {
        with_retry(&self.policy, "analyze_images", || {
            self.inner.analyze_images(images, context)
        })
        .await
    }
}
