//! Domain models for Idea Shaper.
//!
//! # Core Concepts
//!
//! ## Wizard State
//!
//! - [`Dimension`]: One topic of the agenda, with a `todo`/`active`/`done` status.
//! - [`DimensionOption`]: A transient candidate answer for the active dimension.
//! - [`Selection`]: The resolved answer for a completed dimension.
//! - [`WizardView`] / [`Brief`]: Snapshots handed to clients.
//!
//! ## Legacy Scope Flow
//!
//! - [`Idea`]: A generated scope question tagged with an [`IdeaType`].
//! - [`ScopeDocument`]: Included ideas grouped by category.
//!
//! ## Persistent Entities
//!
//! - [`Template`]: Markdown skeleton plus instructions for documentation generation.
//! - [`DocumentHistory`]: Saved generated documents, newest first.

mod dimension;
mod document;
mod idea;
mod mockup;
mod template;
mod wizard;

pub use dimension::*;
pub use document::*;
pub use idea::*;
pub use mockup::*;
pub use template::*;
pub use wizard::*;
