//! The computation engine
//!
//! Computations form a forest loaded once from configuration. Evaluating a
//! node recursively evaluates its inline inputs, combines them, and records
//! its own [`Datum`] in the [`ResultSet`] under the node's id. Inputs that
//! reference an earlier node by id read that node's recorded value instead
//! of evaluating it again.

mod loader;
mod metadata;
mod operations;
mod output;

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ContextArena, Datum, ResultSet};
use crate::infrastructure::traits::Ledger;

pub use loader::Loader;
pub use metadata::{Metadata, TemporalMode};
pub use operations::{
    Abs, Apportion, Comparison, ComparisonOp, Constant, Factor, FactorSpec, Group, Line, Round,
    RoundDirection, Sum,
};
pub use output::{Fact, Output};

/// Handle of a node in [`Computations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An input slot of a composite computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Defined in place; evaluated as part of its parent.
    Inline(NodeId),
    /// Defined earlier and referenced by id; its recorded value is reused.
    Reference(NodeId),
}

impl Input {
    pub fn node(self) -> NodeId {
        match self {
            Input::Inline(node) | Input::Reference(node) => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Line(Line),
    Constant(Constant),
    Group(Group),
    Sum(Sum),
    Abs(Abs),
    Apportion(Apportion),
    Round(Round),
    Factor(Factor),
    Comparison(Comparison),
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Line(_) => "line",
            Operation::Constant(_) => "constant",
            Operation::Group(_) => "group",
            Operation::Sum(_) => "sum",
            Operation::Abs(_) => "abs",
            Operation::Apportion(_) => "apportion",
            Operation::Round(_) => "round",
            Operation::Factor(_) => "factor",
            Operation::Comparison(_) => "comparison",
        }
    }

    pub fn inputs(&self) -> Vec<Input> {
        match self {
            Operation::Line(_) | Operation::Constant(_) => Vec::new(),
            Operation::Group(op) => op.inputs.clone(),
            Operation::Sum(op) => op.inputs.clone(),
            Operation::Abs(op) => vec![op.input],
            Operation::Apportion(op) => vec![op.input],
            Operation::Round(op) => vec![op.input],
            Operation::Factor(op) => vec![op.input],
            Operation::Comparison(op) => vec![op.input],
        }
    }

    /// Single-input transforms date their instant facts at the window start.
    fn anchored_at_start(&self) -> bool {
        matches!(
            self,
            Operation::Apportion(_)
                | Operation::Round(_)
                | Operation::Factor(_)
                | Operation::Comparison(_)
        )
    }
}

/// A node of the computation forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Computable {
    pub metadata: Metadata,
    pub operation: Operation,
}

impl Computable {
    pub fn new(metadata: Metadata, operation: Operation) -> Self {
        Self {
            metadata,
            operation,
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Evaluate this node over `eval`'s window and record its datum.
    #[instrument(level = "debug", skip(self, eval), fields(id = %self.metadata.id, kind = self.operation.kind()))]
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        let meta = &self.metadata;
        let value = match &self.operation {
            Operation::Line(op) => op.compute(meta, eval)?,
            Operation::Constant(op) => op.compute(meta, eval)?,
            Operation::Group(op) => op.compute(eval)?,
            Operation::Sum(op) => op.compute(eval)?,
            Operation::Abs(op) => op.compute(eval)?,
            Operation::Apportion(op) => op.compute(eval)?,
            Operation::Round(op) => op.compute(eval)?,
            Operation::Factor(op) => op.compute(meta, eval)?,
            Operation::Comparison(op) => op.compute(eval)?,
        };
        let context = if self.operation.anchored_at_start() {
            meta.get_context_at_start(eval.contexts, eval.start, eval.end)
        } else {
            meta.get_context(eval.contexts, eval.start, eval.end)
        };
        eval.results.set(Datum::money(meta.id.clone(), context, value))?;
        debug!(value, "computed");
        Ok(value)
    }

    /// This node's recorded value with its description.
    pub fn fact(&self, results: &ResultSet) -> ApplicationResult<Fact> {
        Ok(Fact {
            description: self.metadata.description.clone(),
            datum: self.metadata.result(results)?.clone(),
        })
    }

    /// Display tree of this node for an evaluated result set.
    pub fn get_output(
        &self,
        computations: &Computations,
        results: &ResultSet,
    ) -> ApplicationResult<Output> {
        let fact = self.fact(results)?;
        let output = match &self.operation {
            Operation::Line(op) if op.accounts.is_empty() => Output::Nil(fact),
            Operation::Line(_) => Output::Total {
                fact,
                items: Vec::new(),
            },
            Operation::Group(op) if op.inputs.is_empty() => Output::Nil(fact),
            Operation::Group(op) => {
                let items = op
                    .inputs
                    .iter()
                    .map(|input| computations.get(input.node()).get_output(computations, results))
                    .collect::<ApplicationResult<Vec<_>>>()?;
                if op.hide_breakdown {
                    Output::Total {
                        fact: fact.clone(),
                        items: vec![Output::Breakdown {
                            fact,
                            items,
                            hidden: true,
                        }],
                    }
                } else {
                    Output::Breakdown {
                        fact,
                        items,
                        hidden: false,
                    }
                }
            }
            // Flat: each input as a plain value, whatever its own shape.
            Operation::Sum(op) => {
                let items = op
                    .inputs
                    .iter()
                    .map(|input| computations.get(input.node()).fact(results).map(Output::Simple))
                    .collect::<ApplicationResult<Vec<_>>>()?;
                Output::Total { fact, items }
            }
            Operation::Constant(_)
            | Operation::Abs(_)
            | Operation::Apportion(_)
            | Operation::Round(_)
            | Operation::Factor(_)
            | Operation::Comparison(_) => Output::Simple(fact),
        };
        Ok(output)
    }
}

/// Registry of all loaded computations, in load order.
#[derive(Debug, Default)]
pub struct Computations {
    nodes: Vec<Computable>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl Computations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node behind a handle issued by this registry.
    pub fn get(&self, node: NodeId) -> &Computable {
        &self.nodes[node.0]
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&Computable> {
        self.find(id).map(|node| self.get(node))
    }

    /// Top-level nodes in declared order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Computable> {
        self.nodes.iter()
    }

    /// Add a node; ids must be unique across the whole forest.
    pub fn register(&mut self, node: Computable) -> ApplicationResult<NodeId> {
        if self.index.contains_key(node.id()) {
            return Err(ApplicationError::DuplicateId(node.id().to_string()));
        }
        let handle = NodeId(self.nodes.len());
        self.index.insert(node.id().to_string(), handle);
        self.nodes.push(node);
        Ok(handle)
    }

    pub fn add_root(&mut self, node: NodeId) {
        self.roots.push(node);
    }
}

/// Everything one evaluation pass reads and writes.
pub struct Evaluation<'a> {
    pub ledger: &'a dyn Ledger,
    pub contexts: &'a mut ContextArena,
    pub computations: &'a Computations,
    pub results: &'a mut ResultSet,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl<'a> Evaluation<'a> {
    /// Value of an input: inline nodes are evaluated, references are read back.
    pub fn input(&mut self, input: Input) -> ApplicationResult<f64> {
        let computations = self.computations;
        match input {
            Input::Inline(node) => computations.get(node).compute(self),
            Input::Reference(node) => Ok(self.results.value(computations.get(node).id())?),
        }
    }

    pub fn sum(&mut self, inputs: &[Input]) -> ApplicationResult<f64> {
        let mut total = 0.0;
        for &input in inputs {
            total += self.input(input)?;
        }
        Ok(total)
    }

    /// Evaluate every top-level node in declared order.
    pub fn run(&mut self) -> ApplicationResult<()> {
        let computations = self.computations;
        for &root in computations.roots() {
            computations.get(root).compute(self)?;
        }
        Ok(())
    }
}
