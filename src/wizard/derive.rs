//! Derivation of the master prompt and project summary.
//!
//! Both are pure functions of the initial idea and the ordered selections
//! and are recomputed in full after every mutation.

use crate::models::{Dimension, Selection};

fn selection_lines(ordered: &[(&Dimension, &Selection)]) -> String {
    ordered
        .iter()
        .map(|(dimension, selection)| {
            format!("{}: {}", dimension.name, selection.selected_option_text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn derive_master_prompt(initial_idea: &str, ordered: &[(&Dimension, &Selection)]) -> String {
    format!(
        "Software Idea: {}\n\nSelections:\n{}",
        initial_idea,
        selection_lines(ordered)
    )
}

pub fn derive_project_summary(initial_idea: &str, ordered: &[(&Dimension, &Selection)]) -> String {
    format!("{}\n\n{}", initial_idea, selection_lines(ordered))
}
