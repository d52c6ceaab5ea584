//! Display trees handed to report renderers.

use crate::domain::Datum;

/// A computed value together with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub description: String,
    pub datum: Datum,
}

/// Shape of a computation's output.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Nothing to show in detail (a line without accounts, an empty group).
    Nil(Fact),
    /// A single value.
    Simple(Fact),
    /// A total, optionally preceded by the items adding up to it.
    Total { fact: Fact, items: Vec<Output> },
    /// A nested breakdown; hidden breakdowns are tagged but not displayed.
    Breakdown {
        fact: Fact,
        items: Vec<Output>,
        hidden: bool,
    },
}

impl Output {
    pub fn fact(&self) -> &Fact {
        match self {
            Output::Nil(fact) | Output::Simple(fact) => fact,
            Output::Total { fact, .. } | Output::Breakdown { fact, .. } => fact,
        }
    }

    pub fn items(&self) -> &[Output] {
        match self {
            Output::Nil(_) | Output::Simple(_) => &[],
            Output::Total { items, .. } | Output::Breakdown { items, .. } => items,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Output::Breakdown { hidden: true, .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Output::Nil(_) => "nil",
            Output::Simple(_) => "simple",
            Output::Total { .. } => "total",
            Output::Breakdown { .. } => "breakdown",
        }
    }
}
