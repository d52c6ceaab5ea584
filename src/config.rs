//! Report configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Report file: YAML, TOML or JSON, chosen by file extension
//! 2. Environment variables: `LEDGERFACTS_*` prefix, `__` as key separator
//!
//! Values are addressed by dotted keys (`metadata.business.company-number`).
//! Every lookup comes in a lenient flavour (returns `None` or a default) and a
//! mandatory flavour that fails with [`ConfigError::NotKnown`].

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use config::{Environment, File, FileFormat, Value, ValueKind};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while reading report configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config value not known: {0}")]
    NotKnown(String),

    #[error("invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("invalid date for '{key}': {value}")]
    InvalidDate { key: String, value: String },

    #[error("cannot load config: {message}")]
    Load { message: String },
}

/// Result type for configuration lookups.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the XDG config directory for ledgerfacts.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ledgerfacts").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path of the default report file.
pub fn default_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("report.yaml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    shellexpand::full(path)
        .map(|s| PathBuf::from(s.as_ref()))
        .unwrap_or_else(|_| PathBuf::from(path))
}

/// A view onto one section of the report configuration tree.
///
/// The root view covers the whole file; `get_section` and `get_list` hand out
/// views onto nested values which remember their dotted path for error
/// messages.
#[derive(Debug, Clone)]
pub struct Config {
    key: String,
    value: Value,
}

impl Config {
    /// Load a report file and apply environment overrides.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let built = config::Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .add_source(Environment::with_prefix("LEDGERFACTS").separator("__"))
            .build()
            .map_err(|e| ConfigError::Load {
                message: format!("{}: {}", path.display(), e),
            })?;
        Self::from_built(built)
    }

    /// Parse configuration from a string, without environment overrides.
    pub fn parse(content: &str, format: FileFormat) -> ConfigResult<Self> {
        let built = config::Config::builder()
            .add_source(File::from_str(content, format))
            .build()
            .map_err(load_err)?;
        Self::from_built(built)
    }

    /// Shorthand for [`Config::parse`] with YAML input.
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        Self::parse(content, FileFormat::Yaml)
    }

    fn from_built(built: config::Config) -> ConfigResult<Self> {
        let value: Value = built.try_deserialize().map_err(load_err)?;
        Ok(Self {
            key: String::new(),
            value,
        })
    }

    /// Dotted path of this section from the root ("" for the root).
    pub fn key(&self) -> &str {
        &self.key
    }

    fn path(&self, key: &str) -> String {
        if self.key.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.key, key)
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let found = key
            .split('.')
            .try_fold(&self.value, |value, part| match &value.kind {
                ValueKind::Table(table) => table.get(part),
                _ => None,
            })?;
        match found.kind {
            ValueKind::Nil => None,
            _ => Some(found),
        }
    }

    fn child(&self, key: String, value: &Value) -> Config {
        Config {
            key,
            value: value.clone(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Optional section view; `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<Config> {
        self.lookup(key).map(|v| self.child(self.path(key), v))
    }

    /// Mandatory section view.
    pub fn get_section(&self, key: &str) -> ConfigResult<Config> {
        self.get(key)
            .ok_or_else(|| ConfigError::NotKnown(self.path(key)))
    }

    pub fn get_opt_string(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get(key).map(|c| c.as_string()).transpose()
    }

    pub fn get_string(&self, key: &str) -> ConfigResult<String> {
        self.get_section(key)?.as_string()
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_opt_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn get_float(&self, key: &str) -> ConfigResult<f64> {
        self.get_section(key)?.as_float()
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> ConfigResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(c) => c.value.clone().into_bool().map_err(|e| c.invalid(e)),
        }
    }

    /// Mandatory ISO date (`YYYY-MM-DD`).
    pub fn get_date(&self, key: &str) -> ConfigResult<NaiveDate> {
        let section = self.get_section(key)?;
        let raw = section.as_string()?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
            key: section.key,
            value: raw,
        })
    }

    /// Mandatory list; each element becomes its own view.
    pub fn get_list(&self, key: &str) -> ConfigResult<Vec<Config>> {
        let section = self.get_section(key)?;
        match &section.value.kind {
            ValueKind::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, v)| section.child(format!("{}[{}]", section.key, i), v))
                .collect()),
            _ => Err(ConfigError::InvalidValue {
                key: section.key.clone(),
                message: "expected a list".to_string(),
            }),
        }
    }

    pub fn get_list_or_empty(&self, key: &str) -> ConfigResult<Vec<Config>> {
        if self.contains(key) {
            self.get_list(key)
        } else {
            Ok(Vec::new())
        }
    }

    /// Mandatory map, entries sorted by key.
    pub fn get_map(&self, key: &str) -> ConfigResult<Vec<(String, Config)>> {
        let section = self.get_section(key)?;
        match &section.value.kind {
            ValueKind::Table(table) => {
                let mut entries: Vec<(String, Config)> = table
                    .iter()
                    .map(|(k, v)| (k.clone(), section.child(section.path(k), v)))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(entries)
            }
            _ => Err(ConfigError::InvalidValue {
                key: section.key.clone(),
                message: "expected a map".to_string(),
            }),
        }
    }

    pub fn get_map_or_empty(&self, key: &str) -> ConfigResult<Vec<(String, Config)>> {
        if self.contains(key) {
            self.get_map(key)
        } else {
            Ok(Vec::new())
        }
    }

    /// Borrow this value as a string if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value.kind {
            ValueKind::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self.value.kind, ValueKind::Table(_))
    }

    pub fn as_string(&self) -> ConfigResult<String> {
        match &self.value.kind {
            ValueKind::Table(_) | ValueKind::Array(_) => Err(ConfigError::InvalidValue {
                key: self.key.clone(),
                message: "expected a scalar".to_string(),
            }),
            _ => self.value.clone().into_string().map_err(|e| self.invalid(e)),
        }
    }

    pub fn as_float(&self) -> ConfigResult<f64> {
        self.value.clone().into_float().map_err(|e| self.invalid(e))
    }

    /// Deserialize this section into a serde type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        self.value
            .clone()
            .try_deserialize()
            .map_err(|e| self.invalid(e))
    }

    fn invalid(&self, e: config::ConfigError) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.key.clone(),
            message: e.to_string(),
        }
    }
}

fn load_err(e: config::ConfigError) -> ConfigError {
    ConfigError::Load {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"
metadata:
  business:
    company-number: "01234567"
  accounting:
    periods:
      - name: "2023"
        start: "2023-01-01"
        end: "2023-12-31"
flags:
  enabled: true
values:
  "2023-12-31": 100
  "2022-12-31": 80.5
"#;

    fn report() -> Config {
        Config::from_yaml(REPORT).expect("parse report")
    }

    #[test]
    fn given_nested_key_when_get_string_then_returns_value() {
        let cfg = report();
        assert_eq!(
            cfg.get_string("metadata.business.company-number").unwrap(),
            "01234567"
        );
    }

    #[test]
    fn given_missing_mandatory_key_when_get_string_then_not_known() {
        let cfg = report();
        let err = cfg.get_string("metadata.business.name").unwrap_err();
        assert!(matches!(err, ConfigError::NotKnown(ref k) if k == "metadata.business.name"));
        assert_eq!(err.to_string(), "config value not known: metadata.business.name");
    }

    #[test]
    fn given_missing_key_when_get_with_default_then_returns_default() {
        let cfg = report();
        assert_eq!(cfg.get_string_or("metadata.title", "Accounts").unwrap(), "Accounts");
        assert!(!cfg.get_bool_or("flags.missing", false).unwrap());
        assert!(cfg.get_bool_or("flags.enabled", false).unwrap());
    }

    #[test]
    fn given_list_of_sections_when_get_list_then_views_carry_indexed_keys() {
        let cfg = report();
        let periods = cfg.get_list("metadata.accounting.periods").unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].key(), "metadata.accounting.periods[0]");
        assert_eq!(
            periods[0].get_date("end").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn given_unparsable_date_when_get_date_then_invalid_date() {
        let cfg = Config::from_yaml("start: not-a-date\n").unwrap();
        let err = cfg.get_date("start").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { .. }));
    }

    #[test]
    fn given_map_when_get_map_then_entries_sorted_and_numeric() {
        let cfg = report();
        let values = cfg.get_map("values").unwrap();
        let keys: Vec<&str> = values.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["2022-12-31", "2023-12-31"]);
        assert_eq!(values[0].1.as_float().unwrap(), 80.5);
        assert_eq!(values[1].1.as_float().unwrap(), 100.0);
    }

    #[test]
    fn given_absent_optional_collections_when_or_empty_then_empty() {
        let cfg = report();
        assert!(cfg.get_list_or_empty("computations").unwrap().is_empty());
        assert!(cfg.get_map_or_empty("segments").unwrap().is_empty());
    }

    #[test]
    fn given_tilde_in_path_when_expand_path_then_expands_to_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path("~/report.yaml");
        assert!(expanded.to_string_lossy().starts_with(&home));
    }
}
