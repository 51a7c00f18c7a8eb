//! Prompt text sent to the chat and vision models.

use super::{DocumentationRequest, MockupRequest, OptionsRequest};

pub const AGENDA_SYSTEM: &str = r#"You are a product strategist helping someone shape a rough software idea.

Break the idea into an agenda of 5 to 8 dimensions that must be decided before
the product can be built (for example target users, core problem, key features,
platform, monetization, differentiation).

Return only a JSON array, without explanations. Each element must have:
- "id": a unique kebab-case identifier
- "name": a short title
- "description": one sentence explaining what this dimension decides

Order the dimensions so earlier decisions inform later ones."#;

pub const OPTIONS_SYSTEM: &str = r#"You are a product strategist helping someone decide one aspect of a software idea.

Propose 2 or 3 distinct, concrete answers for the requested dimension. Each answer
must be consistent with the decisions already made and differ meaningfully from
the others.

Return only a JSON array, without explanations. Each element must have:
- "id": a short unique identifier
- "text": the proposed answer in one or two sentences"#;

pub const IDEAS_SYSTEM: &str = r#"You are a scope brainstorming assistant helping a product manager think through a new feature.

Generate thought-provoking questions about the scope of the feature described by
the user. Focus on boundaries, edge cases, user flows and completeness criteria.

Return only a JSON array, without explanations. Each element must have:
- "type": one of "use_case", "feature" or "consideration"
- "content": a clear, concise scope question

Return at least 8 questions with a good mix of types."#;

pub const MOCKUP_SYSTEM: &str = r#"You are a senior UI designer who produces single-file HTML mockups.

Build a complete, self-contained HTML document (inline CSS, no external scripts)
for the interface the user describes. Where an illustrative image belongs, insert
the placeholder {{IMAGE_0}}, {{IMAGE_1}}, ... as the src of an <img> tag, and add
a matching entry to "imagePrompts" describing the image to generate.

Return only a JSON object with:
- "html": the HTML document
- "explanation": a short explanation of the design decisions
- "imagePrompts": an array of image descriptions, one per placeholder, in order"#;

pub const DOCUMENTATION_SYSTEM: &str = r#"You are an assistant that turns free-form notes into structured documentation.

Analyze the user's input and write a document that follows the template
structure. Fill every section with content extracted or derived from the input,
keep every heading from the template, and make reasonable assumptions or leave
clear placeholder text where information is missing.

Return the document in Markdown."#;

pub const IMAGE_ANALYSIS_PROMPT: &str = r#"Analyze these images as user-created mockups or design sketches (wireframes, whiteboard drawings, rough prototypes).

Describe:
1. UI components and elements (navigation, forms, buttons, cards, lists, media)
2. Layout and composition (page structure, grouping, columns, spacing)
3. Content structure and hierarchy (headings, data shown, calls to action)
4. User intent and primary flows
5. Design patterns and platform (mobile or desktop)

If several images are provided, explain how they relate to each other. Be concrete
enough that a developer could build the HTML and CSS from your description."#;

pub fn options_user(request: &OptionsRequest) -> String {
    let mut prompt = format!(
        "Software idea: {}\n\nDimension to decide: {}\n",
        request.initial_idea, request.dimension_name
    );

    if !request.prior_selections.is_empty() {
        let mut prior: Vec<_> = request.prior_selections.iter().collect();
        prior.sort();
        prompt.push_str("\nDecisions made so far:\n");
        for (dimension, text) in prior {
            prompt.push_str(&format!("- {}: {}\n", dimension, text));
        }
    }

    if let Some(extra) = request.extra_context.as_deref().map(str::trim) {
        if !extra.is_empty() {
            prompt.push_str(&format!("\nAdditional guidance: {}\n", extra));
        }
    }

    prompt
}

pub fn mockup_user(request: &MockupRequest) -> String {
    let mut prompt = format!("Design request:\n{}\n", request.description);
    if let Some(analysis) = &request.image_analysis {
        prompt.push_str(&format!(
            "\nThe user attached reference images. Analysis of those images:\n{}\n",
            analysis
        ));
    }
    prompt
}

pub fn documentation_user(request: &DocumentationRequest) -> String {
    format!(
        "TEMPLATE: {}\n\nINSTRUCTIONS: {}\n\nTEMPLATE STRUCTURE:\n{}\n\nUSER INPUT:\n{}\n\nGenerate the complete document following the template structure.",
        request.template_name, request.instructions, request.skeleton, request.user_input
    )
}

pub fn image_analysis(context: &str, count: usize) -> String {
    format!(
        "Context: {} ({} image{}).\n\n{}",
        context,
        count,
        if count == 1 { "" } else { "s" },
        IMAGE_ANALYSIS_PROMPT
    )
}
