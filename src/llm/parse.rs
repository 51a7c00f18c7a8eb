//! Parsing of structured (JSON) model output.
//!
//! Models are asked for bare JSON but regularly wrap it in a Markdown code
//! fence. Parsing is two explicit stages: the whole payload as JSON, then
//! the first fenced block.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("response is not JSON ({reason}) and contains no fenced JSON block")]
    NotJson { reason: String },

    #[error("fenced JSON block could not be parsed: {reason}")]
    InvalidFencedBlock { reason: String },
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```").expect("fence pattern is valid")
    })
}

/// Contents of the first Markdown code fence, if any.
pub fn extract_fenced_block(raw: &str) -> Option<&str> {
    fence_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

pub fn parse_structured_response<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let trimmed = raw.trim();

    let direct_err = match serde_json::from_str::<T>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match extract_fenced_block(trimmed) {
        Some(block) => serde_json::from_str(block).map_err(|e| ParseError::InvalidFencedBlock {
            reason: e.to_string(),
        }),
        None => Err(ParseError::NotJson {
            reason: direct_err.to_string(),
        }),
    }
}

/// A list either returned bare or wrapped in an object such as
/// `{"dimensions": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "dimensions",
            alias = "agenda",
            alias = "options",
            alias = "ideas",
            alias = "questions"
        )]
        items: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

/// Parse a JSON list, accepting either a bare array or a wrapping object.
pub fn parse_listing<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, ParseError> {
    parse_structured_response::<Listing<T>>(raw).map(Listing::into_vec)
}
