//! Idea Shaper: turns a raw product idea into a structured brief.
//!
//! The wizard engines live in [`wizard`]; [`api`] exposes them over HTTP
//! alongside template-driven documentation, scope documents and mockups.

pub mod api;
pub mod config;
pub mod db;
pub mod export;
pub mod llm;
pub mod mockup;
pub mod models;
pub mod wizard;
