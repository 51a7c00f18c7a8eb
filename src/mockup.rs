//! HTML mockup generation with generated images.

use futures::future::try_join_all;

use crate::llm::{Generator, ImageGenerator, MockupRequest};
use crate::models::{image_placeholder, CreateMockupInput, MockupResult};
use crate::wizard::{WizardError, WizardResult};

/// Replace each `{{IMAGE_i}}` token in `html` with `images[i]`.
pub fn substitute_images(html: &str, images: &[String]) -> String {
    images
        .iter()
        .enumerate()
        .fold(html.to_string(), |html, (i, url)| {
            html.replace(&image_placeholder(i), url)
        })
}

/// Produce a mockup for `input`.
///
/// Reference images are described by the vision model first. Every image
/// prompt in the generated mockup is resolved concurrently; one failed
/// image fails the whole mockup.
pub async fn generate_mockup(
    generator: &dyn Generator,
    images: &dyn ImageGenerator,
    input: CreateMockupInput,
) -> WizardResult<MockupResult> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(WizardError::validation("Mockup description cannot be empty"));
    }

    let image_analysis = if input.images.is_empty() {
        None
    } else {
        tracing::info!("Analyzing {} reference images", input.images.len());
        Some(images.analyze_images(&input.images, description).await?)
    };

    let request = MockupRequest {
        description: description.to_string(),
        images: input.images,
        image_analysis,
    };

    let mockup = generator.generate_mockup(&request).await?;
    tracing::info!(
        "Generated mockup with {} image prompts",
        mockup.image_prompts.len()
    );

    let urls = try_join_all(
        mockup
            .image_prompts
            .iter()
            .map(|prompt| images.generate_image(prompt)),
    )
    .await?;

    Ok(MockupResult {
        html: substitute_images(&mockup.html, &urls),
        ..mockup
    })
}
