//! Builds the computation forest from configuration.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::metadata::Metadata;
use super::operations::{
    Abs, Apportion, Comparison, ComparisonOp, Constant, Factor, FactorSpec, Group, Line, Round,
    RoundDirection, Sum,
};
use super::{Computable, Computations, Input, NodeId, Operation};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{Config, ConfigError, ConfigResult};
use crate::domain::{ContextId, Period};

type LoadFn = fn(&mut Loader, &Config) -> ApplicationResult<Operation>;

/// Kind string to variant loader.
static LOADERS: &[(&str, LoadFn)] = &[
    ("line", load_line),
    ("constant", load_constant),
    ("group", load_group),
    ("sum", load_sum),
    ("abs", load_abs),
    ("apportion", load_apportion),
    ("round", load_round),
    ("factor", load_factor),
    ("comparison", load_comparison),
    ("compare", load_comparison),
];

/// Loads computation definitions into a [`Computations`] registry.
///
/// Definitions are loaded in declared order. An input given as a string is
/// the id of a node loaded earlier; anything else is an inline definition.
pub struct Loader {
    computations: Computations,
    context: ContextId,
}

impl Loader {
    /// All loaded nodes share `context` as their base.
    pub fn new(context: ContextId) -> Self {
        Self {
            computations: Computations::new(),
            context,
        }
    }

    /// Load every entry of the `computations` list as a top-level node.
    #[instrument(level = "debug", skip_all)]
    pub fn load_all(mut self, cfg: &Config) -> ApplicationResult<Computations> {
        for entry in cfg.get_list_or_empty("computations")? {
            let node = self.load(&entry)?;
            self.computations.add_root(node);
        }
        debug!("loaded {} computations", self.computations.len());
        Ok(self.computations)
    }

    /// Load one definition (and its inline inputs) and register it.
    pub fn load(&mut self, cfg: &Config) -> ApplicationResult<NodeId> {
        let kind = cfg.get_string("kind")?;
        let (_, load_fn) = LOADERS
            .iter()
            .find(|(name, _)| *name == kind)
            .ok_or_else(|| ApplicationError::UnknownComputation {
                kind: kind.clone(),
                key: cfg.key().to_string(),
            })?;
        let metadata = Metadata::load(cfg, self.context)?;
        let operation = load_fn(self, cfg)?;
        debug!("{} '{}'", kind, metadata.id);
        self.computations
            .register(Computable::new(metadata, operation))
    }

    fn input(&mut self, cfg: &Config) -> ApplicationResult<Input> {
        match cfg.as_str() {
            Some(id) => self
                .computations
                .find(id)
                .map(Input::Reference)
                .ok_or_else(|| ApplicationError::UnknownReference(id.to_string())),
            None => Ok(Input::Inline(self.load(cfg)?)),
        }
    }

    fn inputs(&mut self, cfg: &Config) -> ApplicationResult<Vec<Input>> {
        cfg.get_list_or_empty("inputs")?
            .iter()
            .map(|entry| self.input(entry))
            .collect()
    }
}

fn parse<T>(cfg: &Config, key: &str) -> ConfigResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    let section = cfg.get_section(key)?;
    section
        .as_string()?
        .parse()
        .map_err(|message| ConfigError::InvalidValue {
            key: section.key().to_string(),
            message,
        })
}

/// Map of ISO date to number, as used by constants and dated factors.
fn float_map(cfg: &Config, key: &str) -> ConfigResult<HashMap<String, f64>> {
    cfg.get_map(key)?
        .into_iter()
        .map(|(date, value)| value.as_float().map(|v| (date, v)))
        .collect()
}

fn load_line(_: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let accounts = cfg
        .get_list_or_empty("accounts")?
        .iter()
        .map(Config::as_string)
        .collect::<ConfigResult<Vec<_>>>()?;
    Ok(Operation::Line(Line {
        accounts,
        reverse: cfg.get_bool_or("reverse", false)?,
    }))
}

fn load_constant(_: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    Ok(Operation::Constant(Constant {
        values: float_map(cfg, "values")?,
    }))
}

fn load_group(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    Ok(Operation::Group(Group {
        inputs: loader.inputs(cfg)?,
        hide_breakdown: cfg.get_bool_or("hide-breakdown", false)?,
    }))
}

fn load_sum(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    Ok(Operation::Sum(Sum {
        inputs: loader.inputs(cfg)?,
    }))
}

fn load_abs(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let input = loader.input(&cfg.get_section("input")?)?;
    Ok(Operation::Abs(Abs { input }))
}

fn load_apportion(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let input = loader.input(&cfg.get_section("input")?)?;
    Ok(Operation::Apportion(Apportion {
        input,
        proportion: Period::load(&cfg.get_section("proportion")?)?,
        whole: Period::load(&cfg.get_section("whole")?)?,
    }))
}

fn load_round(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let input = loader.input(&cfg.get_section("input")?)?;
    let direction = if cfg.contains("direction") {
        parse::<RoundDirection>(cfg, "direction")?
    } else {
        RoundDirection::default()
    };
    Ok(Operation::Round(Round { input, direction }))
}

fn load_factor(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let input = loader.input(&cfg.get_section("input")?)?;
    let section = cfg.get_section("factor")?;
    let factor = if section.is_table() {
        FactorSpec::ByDate(float_map(cfg, "factor")?)
    } else {
        FactorSpec::Scalar(section.as_float()?)
    };
    Ok(Operation::Factor(Factor { input, factor }))
}

fn load_comparison(loader: &mut Loader, cfg: &Config) -> ApplicationResult<Operation> {
    let input = loader.input(&cfg.get_section("input")?)?;
    let false_value = match cfg.get("false-value") {
        Some(value) => value.as_float()?,
        None => 0.0,
    };
    Ok(Operation::Comparison(Comparison {
        input,
        op: parse::<ComparisonOp>(cfg, "comparison")?,
        threshold: cfg.get_float("value")?,
        false_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContextArena;

    fn load(yaml: &str) -> ApplicationResult<Computations> {
        let contexts = ContextArena::new();
        let cfg = Config::from_yaml(yaml).unwrap();
        Loader::new(contexts.root()).load_all(&cfg)
    }

    #[test]
    fn given_nested_definitions_when_load_all_then_registers_children_and_roots() {
        let computations = load(
            r#"
computations:
  - kind: line
    id: sales
    accounts: ["Income:Sales"]
    reverse: true
  - kind: sum
    id: total
    inputs:
      - sales
      - kind: constant
        id: grant
        values:
          "2023-12-31": 50
"#,
        )
        .unwrap();
        assert_eq!(computations.len(), 3);
        assert_eq!(computations.roots().len(), 2);

        let total = computations.by_id("total").unwrap();
        let inputs = total.operation.inputs();
        assert!(matches!(inputs[0], Input::Reference(_)));
        assert!(matches!(inputs[1], Input::Inline(_)));
        assert_eq!(computations.get(inputs[0].node()).id(), "sales");
    }

    #[test]
    fn given_unknown_kind_when_load_then_error_names_kind() {
        let err = load("computations:\n  - kind: median\n    id: m\n").unwrap_err();
        assert!(matches!(err, ApplicationError::UnknownComputation { ref kind, .. } if kind == "median"));
    }

    #[test]
    fn given_forward_reference_when_load_then_unknown_reference() {
        let err = load(
            r#"
computations:
  - kind: sum
    id: total
    inputs: [later]
  - kind: constant
    id: later
    values: {"2023-12-31": 1}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplicationError::UnknownReference(ref id) if id == "later"));
    }

    #[test]
    fn given_duplicate_id_when_load_then_error() {
        let err = load(
            r#"
computations:
  - kind: line
    id: dup
  - kind: line
    id: dup
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplicationError::DuplicateId(ref id) if id == "dup"));
    }

    #[test]
    fn given_transforms_when_load_then_parses_kind_specific_keys() {
        let computations = load(
            r#"
computations:
  - kind: constant
    id: base
    values: {"2023-12-31": 1200}
  - kind: apportion
    id: share
    input: base
    proportion: {start: "2023-01-01", end: "2023-03-31"}
    whole: {start: "2023-01-01", end: "2023-12-31"}
  - kind: round
    id: rounded
    direction: up
    input: share
  - kind: factor
    id: taxed
    input: rounded
    factor: {"2023-12-31": 0.19}
  - kind: compare
    id: positive
    input: taxed
    comparison: ">"
    value: 0
"#,
        )
        .unwrap();

        match &computations.by_id("share").unwrap().operation {
            Operation::Apportion(op) => {
                assert_eq!(op.proportion.days(), 90);
                assert_eq!(op.whole.days(), 365);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &computations.by_id("rounded").unwrap().operation {
            Operation::Round(op) => assert_eq!(op.direction, RoundDirection::Up),
            other => panic!("unexpected {:?}", other),
        }
        match &computations.by_id("taxed").unwrap().operation {
            Operation::Factor(op) => assert!(matches!(op.factor, FactorSpec::ByDate(_))),
            other => panic!("unexpected {:?}", other),
        }
        match &computations.by_id("positive").unwrap().operation {
            Operation::Comparison(op) => {
                assert_eq!(op.op, ComparisonOp::Greater);
                assert_eq!(op.false_value, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn given_bad_direction_when_load_then_invalid_value() {
        let err = load(
            r#"
computations:
  - kind: constant
    id: base
    values: {"2023-12-31": 1}
  - kind: round
    id: r
    input: base
    direction: sideways
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Config(ConfigError::InvalidValue { .. })
        ));
    }
}
