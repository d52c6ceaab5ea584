//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;

use crate::application::{Fact, Output};
use crate::domain::{ContextArena, ContextId};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

fn label(fact: &Fact) -> String {
    if fact.description.is_empty() {
        format!("{}: {}", fact.datum.id, fact.datum.value)
    } else {
        format!("{}: {}", fact.description, fact.datum.value)
    }
}

/// Render an output tree; hidden breakdowns are left out.
pub fn output_tree(output: &Output) -> Tree<String> {
    let leaves: Vec<_> = output
        .items()
        .iter()
        .filter(|item| !item.is_hidden())
        .map(output_tree)
        .collect();
    Tree::new(label(output.fact())).with_leaves(leaves)
}

/// One-line description of a context's dimensions, outermost first.
pub fn describe_context(contexts: &ContextArena, context: ContextId) -> String {
    contexts
        .get_dimensions(context)
        .iter()
        .map(|dimension| dimension.to_string())
        .join(" / ")
}
