//! Command dispatch

use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{default_config_path, expand_path};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Compute { period, ids }) => compute(cli, period, ids),
        Some(Commands::Get { period, ids }) => get(cli, period, ids),
        Some(Commands::Periods) => periods(cli),
        Some(Commands::Check) => check(cli),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Report path from `--config`, else the per-user default.
pub fn resolve_config_path(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config {
        Some(path) => Ok(expand_path(path)),
        None => default_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine config directory, use --config".into())),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let path = resolve_config_path(cli)?;
    debug!("report: {}", path.display());
    Ok(ServiceContainer::load(&path)?)
}

#[instrument(skip(cli))]
fn compute(cli: &Cli, period: &str, ids: &[String]) -> CliResult<()> {
    let mut ds = container(cli)?.datasource()?;
    let period = ds.get_period(period)?.clone();
    let ids: Vec<String> = if ids.is_empty() {
        ds.computations()
            .roots()
            .iter()
            .map(|&node| ds.computations().get(node).id().to_string())
            .collect()
    } else {
        ids.to_vec()
    };

    output::header(&period);
    output::detail(&output::describe_context(ds.contexts(), ds.business_context()));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for id in &ids {
        let tree = output::output_tree(&ds.get_output(id, &period)?);
        write!(out, "{}", tree).map_err(|e| InfraError::io("write output", e))?;
    }
    Ok(())
}

#[instrument(skip(cli))]
fn get(cli: &Cli, period: &str, ids: &[String]) -> CliResult<()> {
    let mut ds = container(cli)?.datasource()?;
    let period = ds.get_period(period)?.clone();
    for datum in ds.get_results(ids, &period)? {
        output::info(&format!(
            "{}\t{}\t{}",
            datum.id,
            datum.value,
            output::describe_context(ds.contexts(), datum.context)
        ));
    }
    Ok(())
}

fn periods(cli: &Cli) -> CliResult<()> {
    let ds = container(cli)?.datasource()?;
    if ds.get_periods().is_empty() {
        output::warning("no accounting periods configured");
    }
    for period in ds.get_periods() {
        output::info(&format!("{}\t{} days", period, period.days()));
    }
    Ok(())
}

fn check(cli: &Cli) -> CliResult<()> {
    let ds = container(cli)?.datasource()?;
    output::success(&format!(
        "{} computations ({} top-level), {} periods",
        ds.computations().len(),
        ds.computations().roots().len(),
        ds.get_periods().len()
    ));
    Ok(())
}
