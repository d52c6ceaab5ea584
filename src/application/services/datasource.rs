//! Data source service
//!
//! Owns the context tree, the computation forest and one cached result set
//! per evaluated period.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::computation::{Computable, Computations, Evaluation, Loader, Output};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Config;
use crate::domain::{ContextArena, ContextId, Datum, Period, ResultSet};
use crate::infrastructure::traits::Ledger;

/// Scheme used when the report does not name one.
pub const DEFAULT_ENTITY_SCHEME: &str = "http://www.companieshouse.gov.uk/";

/// Entry point for evaluating a report against a ledger.
pub struct DataSource {
    ledger: Arc<dyn Ledger>,
    contexts: ContextArena,
    business: ContextId,
    computations: Computations,
    periods: Vec<Period>,
    cache: HashMap<ContextId, Arc<ResultSet>>,
}

impl DataSource {
    /// Build the business context and load periods and computations.
    ///
    /// Fails when the company number is missing or any computation
    /// definition is invalid.
    #[instrument(level = "debug", skip_all)]
    pub fn new(cfg: &Config, ledger: Arc<dyn Ledger>) -> ApplicationResult<Self> {
        let scheme = cfg.get_string_or("metadata.business.entity-scheme", DEFAULT_ENTITY_SCHEME)?;
        let company = cfg.get_string("metadata.business.company-number")?;

        let mut contexts = ContextArena::new();
        let business = contexts.with_entity(contexts.root(), &scheme, &company);

        let periods = cfg
            .get_list_or_empty("metadata.accounting.periods")?
            .iter()
            .map(Period::load)
            .collect::<Result<Vec<_>, _>>()?;

        let computations = Loader::new(business).load_all(cfg)?;
        info!(
            "data source for {}: {} computations, {} periods",
            company,
            computations.len(),
            periods.len()
        );

        Ok(Self {
            ledger,
            contexts,
            business,
            computations,
            periods,
            cache: HashMap::new(),
        })
    }

    pub fn business_context(&self) -> ContextId {
        self.business
    }

    pub fn contexts(&self) -> &ContextArena {
        &self.contexts
    }

    pub fn computations(&self) -> &Computations {
        &self.computations
    }

    pub fn get_computation(&self, id: &str) -> ApplicationResult<&Computable> {
        self.computations
            .by_id(id)
            .ok_or_else(|| ApplicationError::NoSuchComputation(id.to_string()))
    }

    pub fn get_periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn get_period(&self, name: &str) -> ApplicationResult<&Period> {
        self.periods
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ApplicationError::NoSuchPeriod(name.to_string()))
    }

    /// Evaluate every top-level computation over `period`, once per date range.
    ///
    /// Results are cached by the business context extended with the period,
    /// so periods with equal dates share one result set whatever their names.
    #[instrument(level = "debug", skip(self), fields(period = %period))]
    pub fn perform_computations(&mut self, period: &Period) -> ApplicationResult<Arc<ResultSet>> {
        let key = self.contexts.with_period(self.business, period);
        if let Some(results) = self.cache.get(&key) {
            debug!("cache hit");
            return Ok(Arc::clone(results));
        }
        debug!("cache miss, evaluating");

        let mut results = ResultSet::new();
        Evaluation {
            ledger: self.ledger.as_ref(),
            contexts: &mut self.contexts,
            computations: &self.computations,
            results: &mut results,
            start: period.start,
            end: period.end,
        }
        .run()?;

        let results = Arc::new(results);
        self.cache.insert(key, Arc::clone(&results));
        Ok(results)
    }

    pub fn get_result(&mut self, id: &str, period: &Period) -> ApplicationResult<Datum> {
        let results = self.perform_computations(period)?;
        Ok(results.get(id)?.clone())
    }

    /// Data for `ids`, in the order asked for.
    pub fn get_results<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        period: &Period,
    ) -> ApplicationResult<Vec<Datum>> {
        let results = self.perform_computations(period)?;
        ids.iter()
            .map(|id| Ok(results.get(id.as_ref())?.clone()))
            .collect()
    }

    /// Output tree of one computation for `period`.
    pub fn get_output(&mut self, id: &str, period: &Period) -> ApplicationResult<Output> {
        let results = self.perform_computations(period)?;
        self.get_computation(id)?
            .get_output(&self.computations, &results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountType, DomainError, Split};
    use crate::infrastructure::MemoryLedger;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datasource(yaml: &str) -> DataSource {
        let ledger = MemoryLedger::new().with_account(
            "Income:Sales",
            AccountType::Income,
            vec![Split::new(date(2023, 6, 1), -500.0, "invoice")],
        );
        let cfg = Config::from_yaml(yaml).unwrap();
        DataSource::new(&cfg, Arc::new(ledger)).unwrap()
    }

    const REPORT: &str = r#"
metadata:
  business:
    company-number: "01234567"
  accounting:
    periods:
      - name: fy2023
        start: "2023-01-01"
        end: "2023-12-31"
computations:
  - kind: line
    id: turnover
    period: in-year
    accounts: ["Income:Sales"]
    reverse: true
"#;

    #[test]
    fn given_report_when_new_then_business_context_carries_entity() {
        let ds = datasource(REPORT);
        let entity = ds.contexts().entity(ds.business_context()).unwrap();
        assert_eq!(entity.scheme, DEFAULT_ENTITY_SCHEME);
        assert_eq!(entity.id, "01234567");
        assert_eq!(ds.get_periods().len(), 1);
    }

    #[test]
    fn given_missing_company_number_when_new_then_config_error() {
        let cfg = Config::from_yaml("computations: []\n").unwrap();
        let result = DataSource::new(&cfg, Arc::new(MemoryLedger::new()));
        assert!(matches!(result, Err(ApplicationError::Config(_))));
    }

    #[test]
    fn given_period_when_get_result_then_value_and_period_context() {
        let mut ds = datasource(REPORT);
        let period = ds.get_period("fy2023").unwrap().clone();
        let datum = ds.get_result("turnover", &period).unwrap();
        assert_eq!(datum.as_f64(), Some(500.0));
        let fact_period = ds.contexts().period(datum.context).unwrap();
        assert_eq!((fact_period.start, fact_period.end), (period.start, period.end));
    }

    #[test]
    fn given_unknown_id_when_get_result_then_not_computed() {
        let mut ds = datasource(REPORT);
        let period = ds.get_period("fy2023").unwrap().clone();
        let err = ds.get_result("nope", &period).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::ResultNotComputed(_))
        ));
    }

    #[test]
    fn given_unknown_names_when_lookup_then_errors() {
        let ds = datasource(REPORT);
        assert!(matches!(
            ds.get_period("fy1999"),
            Err(ApplicationError::NoSuchPeriod(_))
        ));
        assert!(matches!(
            ds.get_computation("nope"),
            Err(ApplicationError::NoSuchComputation(_))
        ));
    }
}
