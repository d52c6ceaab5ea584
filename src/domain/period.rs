//! Named, inclusive date ranges.

use std::fmt;

use chrono::NaiveDate;

use crate::config::{Config, ConfigError, ConfigResult};

/// An accounting period. Both `start` and `end` are part of the period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Load a period from a `{name, start, end}` section.
    ///
    /// The name is optional; both dates are mandatory ISO dates and `end`
    /// must not precede `start`.
    pub fn load(cfg: &Config) -> ConfigResult<Self> {
        let name = cfg.get_string_or("name", "")?;
        let start = cfg.get_date("start")?;
        let end = cfg.get_date("end")?;
        if end < start {
            return Err(ConfigError::InvalidValue {
                key: cfg.key().to_string(),
                message: format!("period ends ({}) before it starts ({})", end, start),
            });
        }
        Ok(Self { name, start, end })
    }

    /// Number of days in the period, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{} ({}..{})", self.name, self.start, self.end)
        }
    }
}
