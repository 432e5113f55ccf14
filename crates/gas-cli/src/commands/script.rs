//! `gas script`: print the module that `gas resolve` would hand the runtime.
//!
//! Stdout carries only the script so it can be piped straight into the
//! runtime; per-resource issues go to the log on stderr.

use tracing::{instrument, warn};

use crate::{
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    pipeline,
};

#[instrument(skip_all)]
pub fn execute(config: AppConfig, output: OutputManager) -> CliResult<()> {
    let container = pipeline::container_dir(&config)?;
    let plan = pipeline::build_service(&config).plan(container)?;

    for issue in &plan.issues {
        warn!(resource = %issue.resource(), "{issue}");
    }
    if plan.script.is_empty() {
        output.warning("No resource exports a config; nothing to evaluate")?;
        return Ok(());
    }

    output.data(plan.script.as_str())?;
    Ok(())
}
