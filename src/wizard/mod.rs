//! The wizard engines.
//!
//! [`Agenda`], [`SelectionStore`] and the derivation functions are plain
//! data structures. [`Wizard`] composes them into the idea-shaping state
//! machine and [`ScopeWizard`] implements the older scope-document flow.
//! The handles in [`session`] share either across async request handlers.

pub mod agenda;
pub mod controller;
pub mod derive;
pub mod error;
pub mod scope;
pub mod selections;
pub mod session;

pub use agenda::{Agenda, MIN_AGENDA_SIZE};
pub use controller::{Ticket, Wizard};
pub use derive::{derive_master_prompt, derive_project_summary};
pub use error::{Operation, WizardError, WizardResult};
pub use scope::{draft_title, ScopeWizard};
pub use selections::SelectionStore;
pub use session::{ScopeHandle, SessionRegistry, WizardHandle, DEFAULT_IDLE_TIMEOUT};
