//! Service container for dependency injection
//!
//! Wires a report file and a ledger backend into a [`DataSource`].

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::DataSource;
use crate::config::Config;
use crate::infrastructure::ledger::MemoryLedger;
use crate::infrastructure::traits::Ledger;
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding the loaded report configuration and its ledger.
pub struct ServiceContainer {
    /// Report configuration
    pub config: Arc<Config>,

    /// Ledger backend
    pub ledger: Arc<dyn Ledger>,
}

impl ServiceContainer {
    /// Load a report file and its in-memory ledger.
    pub fn load(path: &Path) -> InfraResult<Self> {
        if !path.is_file() {
            return Err(InfraError::ReportNotFound(path.to_path_buf()));
        }
        debug!("loading report {}", path.display());
        let config = Config::load(path)?;
        let ledger = MemoryLedger::load(&config)?;
        Ok(Self::with_deps(config, Arc::new(ledger)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(config: Config, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
        }
    }

    /// Build a data source over the configured computations.
    pub fn datasource(&self) -> InfraResult<DataSource> {
        Ok(DataSource::new(&self.config, Arc::clone(&self.ledger))?)
    }
}
