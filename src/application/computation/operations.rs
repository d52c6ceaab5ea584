//! Computation variants and their evaluation rules.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::trace;

use super::metadata::{Metadata, TemporalMode};
use super::{Evaluation, Input};
use crate::application::error_ext::LedgerResultExt;
use crate::application::ApplicationResult;
use crate::domain::{DomainError, Period};

/// Key used for date-indexed value maps.
fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Balance or movement of a set of ledger accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub accounts: Vec<String>,
    pub reverse: bool,
}

impl Line {
    /// Inclusive ledger query window for a mode and evaluation window.
    ///
    /// Balances run from 1970-01-01. An at-start balance is the balance
    /// immediately before `start`, so the window ends the day before.
    /// `None` means the window is empty.
    pub fn query_window(
        mode: TemporalMode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let epoch = NaiveDate::default();
        match mode {
            TemporalMode::AtStart => start.pred_opt().map(|before| (epoch, before)),
            TemporalMode::AtEnd => Some((epoch, end)),
            TemporalMode::InYear => Some((start, end)),
        }
    }

    pub fn compute(&self, meta: &Metadata, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        let Some((from, to)) = Self::query_window(meta.mode, eval.start, eval.end) else {
            return Ok(0.0);
        };
        let mut total = 0.0;
        for name in &self.accounts {
            let account = eval
                .ledger
                .get_account(None, name)
                .with_account_context("get account", name)?;
            let splits = eval
                .ledger
                .get_splits(&account, from, to)
                .with_account_context("get splits", name)?;
            let mut subtotal: f64 = splits.iter().map(|s| s.amount).sum();
            if eval.ledger.is_debit(account.kind) {
                subtotal = -subtotal;
            }
            trace!("{}: {} splits, subtotal {}", name, splits.len(), subtotal);
            total += subtotal;
        }
        if self.reverse {
            total = -total;
        }
        Ok(total)
    }
}

/// Fixed values keyed by the ISO date of the window end.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub values: HashMap<String, f64>,
}

impl Constant {
    pub fn compute(&self, meta: &Metadata, eval: &Evaluation<'_>) -> ApplicationResult<f64> {
        let key = date_key(eval.end);
        match self.values.get(&key) {
            Some(value) => Ok(*value),
            None => Err(DomainError::NoValueForDate {
                id: meta.id.clone(),
                date: key,
            }
            .into()),
        }
    }
}

/// Sum of inputs shown as a breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub inputs: Vec<Input>,
    pub hide_breakdown: bool,
}

impl Group {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        eval.sum(&self.inputs)
    }
}

/// Sum of inputs shown as a flat total.
#[derive(Debug, Clone, PartialEq)]
pub struct Sum {
    pub inputs: Vec<Input>,
}

impl Sum {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        eval.sum(&self.inputs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Abs {
    pub input: Input,
}

impl Abs {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        Ok(eval.input(self.input)?.abs())
    }
}

/// Scales its input by `proportion.days() / whole.days()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Apportion {
    pub input: Input,
    pub proportion: Period,
    pub whole: Period,
}

impl Apportion {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        let value = eval.input(self.input)?;
        Ok(value * self.proportion.days() as f64 / self.whole.days() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundDirection {
    #[default]
    Nearest,
    Down,
    Up,
}

impl RoundDirection {
    /// Nearest rounds halves away from zero.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundDirection::Nearest => value.round(),
            RoundDirection::Down => value.floor(),
            RoundDirection::Up => value.ceil(),
        }
    }
}

impl FromStr for RoundDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(RoundDirection::Nearest),
            "down" => Ok(RoundDirection::Down),
            "up" => Ok(RoundDirection::Up),
            other => Err(format!("unknown rounding direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub input: Input,
    pub direction: RoundDirection,
}

impl Round {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        Ok(self.direction.apply(eval.input(self.input)?))
    }
}

/// Multiplier applied by [`Factor`].
#[derive(Debug, Clone, PartialEq)]
pub enum FactorSpec {
    Scalar(f64),
    /// Multiplier keyed by the ISO date of the window end
    ByDate(HashMap<String, f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub input: Input,
    pub factor: FactorSpec,
}

impl Factor {
    pub fn compute(&self, meta: &Metadata, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        let value = eval.input(self.input)?;
        let factor = match &self.factor {
            FactorSpec::Scalar(f) => *f,
            FactorSpec::ByDate(by_date) => {
                let key = date_key(eval.end);
                *by_date.get(&key).ok_or_else(|| DomainError::NoValueForDate {
                    id: meta.id.clone(),
                    date: key.clone(),
                })?
            }
        };
        Ok(value * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOp {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOp::Less => value < threshold,
            ComparisonOp::LessOrEqual => value <= threshold,
            ComparisonOp::Greater => value > threshold,
            ComparisonOp::GreaterOrEqual => value >= threshold,
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "less" | "<" => Ok(ComparisonOp::Less),
            "less-or-equal" | "<=" => Ok(ComparisonOp::LessOrEqual),
            "greater" | ">" => Ok(ComparisonOp::Greater),
            "greater-or-equal" | ">=" => Ok(ComparisonOp::GreaterOrEqual),
            other => Err(format!("unknown comparison '{}'", other)),
        }
    }
}

/// Passes its input through when the comparison holds, else `false_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub input: Input,
    pub op: ComparisonOp,
    pub threshold: f64,
    pub false_value: f64,
}

impl Comparison {
    pub fn compute(&self, eval: &mut Evaluation<'_>) -> ApplicationResult<f64> {
        let value = eval.input(self.input)?;
        if self.op.holds(value, self.threshold) {
            Ok(value)
        } else {
            Ok(self.false_value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(RoundDirection::Up, 124.0)]
    #[case(RoundDirection::Down, 123.0)]
    #[case(RoundDirection::Nearest, 124.0)]
    fn test_round_directions(#[case] direction: RoundDirection, #[case] expected: f64) {
        assert_eq!(direction.apply(123.6), expected);
    }

    #[test]
    fn test_round_nearest_half_away_from_zero() {
        assert_eq!(RoundDirection::Nearest.apply(2.5), 3.0);
        assert_eq!(RoundDirection::Nearest.apply(-2.5), -3.0);
    }

    #[rstest]
    #[case("less", 50.0, true)]
    #[case("<=", 100.0, true)]
    #[case("greater", 100.0, false)]
    #[case(">=", 100.0, true)]
    fn test_comparison_ops(#[case] op: &str, #[case] value: f64, #[case] expected: bool) {
        let op: ComparisonOp = op.parse().unwrap();
        assert_eq!(op.holds(value, 100.0), expected);
    }

    #[test]
    fn given_unknown_strings_when_parse_then_error() {
        assert!("sideways".parse::<RoundDirection>().is_err());
        assert!("about".parse::<ComparisonOp>().is_err());
    }

    #[test]
    fn given_modes_when_query_window_then_bounds_follow_balance_semantics() {
        let (start, end) = (date(2023, 1, 1), date(2023, 12, 31));
        let epoch = date(1970, 1, 1);
        assert_eq!(
            Line::query_window(TemporalMode::AtStart, start, end),
            Some((epoch, date(2022, 12, 31)))
        );
        assert_eq!(
            Line::query_window(TemporalMode::AtEnd, start, end),
            Some((epoch, end))
        );
        assert_eq!(
            Line::query_window(TemporalMode::InYear, start, end),
            Some((start, end))
        );
        assert_eq!(
            Line::query_window(TemporalMode::AtStart, NaiveDate::MIN, end),
            None
        );
    }
}
