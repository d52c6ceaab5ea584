//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::ReportNotFound(_) => crate::exitcode::NOINPUT,
                InfraError::Application(app) => match app {
                    ApplicationError::Config(_)
                    | ApplicationError::UnknownComputation { .. }
                    | ApplicationError::UnknownReference(_)
                    | ApplicationError::DuplicateId(_) => crate::exitcode::CONFIG,
                    ApplicationError::NoSuchComputation(_) | ApplicationError::NoSuchPeriod(_) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::UNAVAILABLE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::domain::DomainError;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case(CliError::Usage("x".into()), crate::exitcode::USAGE)]
    #[case(InfraError::ReportNotFound(PathBuf::from("r.yaml")).into(), crate::exitcode::NOINPUT)]
    #[case(ApplicationError::Config(ConfigError::NotKnown("a".into())).into(), crate::exitcode::CONFIG)]
    #[case(ApplicationError::NoSuchPeriod("fy".into()).into(), crate::exitcode::USAGE)]
    #[case(ApplicationError::Domain(DomainError::ResultNotComputed("x".into())).into(), crate::exitcode::DATAERR)]
    fn test_exit_codes(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }
}
