//! Markdown rendering and parsing of wizard artifacts.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::models::{Brief, Idea, IdeaType, ScopeDocument};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("Document has no '# ' title line")]
    MissingTitle,

    #[error("Unknown scope category '{0}'")]
    UnknownCategory(String),

    #[error("Line {line}: item outside of a category")]
    OrphanItem { line: usize },
}

/// Date format used in exported documents, e.g. `March 4, 2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// File name offered for a download: whitespace runs become `_`.
pub fn download_file_name(title: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "document.md".to_string()
    } else {
        format!("{}.md", stem)
    }
}

pub fn scope_to_markdown(document: &ScopeDocument, date: NaiveDate) -> String {
    let mut out = format!("# {}\n", document.title);
    out.push_str(&format!("Date: {}\n\n", format_date(date)));
    out.push_str(&format!("## Overview\n{}\n\n", document.description));
    out.push_str("## Scope Considerations\n\n");

    for (idea_type, items) in &document.categories {
        out.push_str(&format!("### {}\n", idea_type.heading()));
        for item in items {
            out.push_str(&format!("- {}\n", item.content));
        }
        out.push('\n');
    }
    out
}

#[derive(PartialEq)]
enum Section {
    Preamble,
    Overview,
    Considerations,
}

/// Parse a document produced by [`scope_to_markdown`].
///
/// Items get fresh ids; category membership and order are preserved.
pub fn parse_scope_markdown(markdown: &str) -> Result<ScopeDocument, ExportError> {
    let mut title = None;
    let mut overview: Vec<&str> = Vec::new();
    let mut items: Vec<Idea> = Vec::new();
    let mut section = Section::Preamble;
    let mut category: Option<IdeaType> = None;

    for (number, line) in markdown.lines().enumerate() {
        let trimmed = line.trim_end();

        if let Some(heading) = trimmed.strip_prefix("### ") {
            let idea_type = IdeaType::from_heading(heading)
                .ok_or_else(|| ExportError::UnknownCategory(heading.trim().to_string()))?;
            category = Some(idea_type);
            section = Section::Considerations;
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            section = match heading.trim() {
                "Overview" => Section::Overview,
                _ => Section::Considerations,
            };
            category = None;
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            if title.is_none() {
                title = Some(text.trim().to_string());
            }
        } else if section == Section::Overview {
            overview.push(trimmed);
        } else if let Some(content) = trimmed.strip_prefix("- ") {
            let idea_type = category.ok_or(ExportError::OrphanItem { line: number + 1 })?;
            items.push(Idea {
                id: format!("imported-{}", items.len() + 1),
                content: content.trim().to_string(),
                idea_type,
                saved: true,
            });
        }
    }

    let title = title.ok_or(ExportError::MissingTitle)?;
    let description = overview.join("\n").trim().to_string();
    Ok(ScopeDocument::new(title, description, items))
}

pub fn brief_to_markdown(brief: &Brief, date: NaiveDate) -> String {
    let mut out = String::from("# Idea Brief\n");
    out.push_str(&format!("Date: {}\n\n", format_date(date)));
    out.push_str(&format!("## Initial Idea\n{}\n\n", brief.initial_idea));
    out.push_str("## Decisions\n\n");

    for decision in &brief.decisions {
        out.push_str(&format!("### {}\n{}", decision.name, decision.text));
        if decision.is_edited {
            out.push_str(" _(edited)_");
        }
        out.push_str("\n\n");
    }

    out.push_str(&format!("## Master Prompt\n```\n{}\n```\n", brief.master_prompt));
    out
}

fn heading_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^#+\s").expect("heading pattern is valid"))
}

/// Normalise generated Markdown.
///
/// Line endings become `\n`, every heading is preceded by exactly one blank
/// line, section bodies are trimmed, and no more than one blank line
/// appears in a row. Fenced code blocks are left alone.
pub fn sanitize_markdown(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");

    let mut preamble = String::new();
    let mut sections: Vec<(&str, String)> = Vec::new();
    let mut in_fence = false;
    let mut previous_blank = false;

    for line in normalized.split('\n') {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        if !in_fence && heading_line().is_match(line) {
            sections.push((line.trim_end(), String::new()));
            previous_blank = false;
            continue;
        }

        let blank = line.trim().is_empty();
        if blank && previous_blank && !in_fence {
            continue;
        }
        previous_blank = blank;

        let body = match sections.last_mut() {
            Some((_, body)) => body,
            None => &mut preamble,
        };
        body.push_str(line);
        body.push('\n');
    }

    let mut out = preamble.trim().to_string();
    for (heading, body) in sections {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(heading);
        let body = body.trim();
        if !body.is_empty() {
            out.push_str("\n\n");
            out.push_str(body);
        }
    }
    out
}
