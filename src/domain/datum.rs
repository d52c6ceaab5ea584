//! Typed values tagged with the producing id and their context.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::context::ContextId;

#[derive(Debug, Clone, PartialEq)]
pub enum DatumValue {
    Money(f64),
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl fmt::Display for DatumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatumValue::Money(v) => write!(f, "{:.2}", v),
            DatumValue::Number(v) => write!(f, "{}", v),
            DatumValue::Text(s) => write!(f, "{}", s),
            DatumValue::Bool(b) => write!(f, "{}", b),
            DatumValue::Date(d) => write!(f, "{}", d),
        }
    }
}

/// A single fact before any external tag-name mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub id: String,
    pub context: ContextId,
    pub value: DatumValue,
}

impl Datum {
    pub fn new(id: impl Into<String>, context: ContextId, value: DatumValue) -> Self {
        Self {
            id: id.into(),
            context,
            value,
        }
    }

    pub fn money(id: impl Into<String>, context: ContextId, amount: f64) -> Self {
        Self::new(id, context, DatumValue::Money(amount))
    }

    /// Copy of this datum reported under another id.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Copy of this datum reported in another context.
    pub fn with_context(&self, context: ContextId) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Numeric view of money and number values.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            DatumValue::Money(v) | DatumValue::Number(v) => Some(v),
            _ => None,
        }
    }
}
