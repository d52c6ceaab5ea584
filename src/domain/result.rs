//! Per-evaluation result cache.

use std::collections::HashMap;

use crate::domain::datum::Datum;
use crate::domain::error::{DomainError, DomainResult};

/// Values computed during one evaluation pass, keyed by computation id.
///
/// Every id is written once; iteration follows write order.
#[derive(Debug, Default)]
pub struct ResultSet {
    values: HashMap<String, Datum>,
    order: Vec<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, datum: Datum) -> DomainResult<()> {
        if self.values.contains_key(&datum.id) {
            return Err(DomainError::ResultAlreadyWritten(datum.id));
        }
        self.order.push(datum.id.clone());
        self.values.insert(datum.id.clone(), datum);
        Ok(())
    }

    pub fn get(&self, id: &str) -> DomainResult<&Datum> {
        self.values
            .get(id)
            .ok_or_else(|| DomainError::ResultNotComputed(id.to_string()))
    }

    /// Numeric value of a computed result.
    pub fn value(&self, id: &str) -> DomainResult<f64> {
        self.get(id)?
            .as_f64()
            .ok_or_else(|| DomainError::NotNumeric(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        self.order.iter().filter_map(move |id| self.values.get(id))
    }
}
