//! `gas resolve`: run the whole pipeline and print the typed configs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use gas_core::application::Resolution;
use gas_core::domain::ResolutionIssue;

use crate::{
    cli::{OutputFormat, ResolveArgs, ResolveFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    pipeline,
};

const SPINNER_TICK: Duration = Duration::from_millis(80);

#[instrument(skip_all)]
pub fn execute(args: ResolveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let container = pipeline::container_dir(&config)?.to_path_buf();
    let service = Arc::new(pipeline::build_service(&config));

    let handle = service.resolve_in_background(container.clone());
    let spinner = output.spinner(&format!("Resolving resources in {}", container.display()));
    let outcome = loop {
        if let Some(outcome) = handle.wait_timeout(SPINNER_TICK) {
            break outcome;
        }
        if let Some(spinner) = &spinner {
            spinner.tick();
        }
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let resolution = outcome?;
    info!(configs = resolution.configs.len(), "resolved");

    let format = if output.format() == OutputFormat::Json {
        ResolveFormat::Json
    } else {
        args.format
    };

    match format {
        ResolveFormat::Json => output.print_json(&resolution),
        ResolveFormat::List => {
            for id in resolution.configs.keys() {
                output.data(id.as_str())?;
            }
            report_issues(&resolution.issues, &output)
        }
        ResolveFormat::Table => print_table(&resolution, &output),
    }
}

fn print_table(resolution: &Resolution, output: &OutputManager) -> CliResult<()> {
    if resolution.configs.is_empty() {
        output.info("No resource configs resolved")?;
        return report_issues(&resolution.issues, output);
    }

    let rows: Vec<[String; 4]> = resolution
        .configs
        .iter()
        .map(|(id, config)| {
            let layer = resolution
                .layout
                .layer_of(id)
                .map_or_else(|| "-".to_string(), |layer| layer.to_string());
            [
                id.to_string(),
                config.kind().to_string(),
                config.name().to_string(),
                layer,
            ]
        })
        .collect();

    let headers = ["RESOURCE", "TYPE", "NAME", "LAYER"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    output.header(&format_row(&headers.map(str::to_string), &widths))?;
    for row in &rows {
        output.print(&format_row(row, &widths))?;
    }

    report_issues(&resolution.issues, output)?;
    output.success(&format!("Resolved {} resource configs", rows.len()))?;
    Ok(())
}

fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Print soft issues as warnings after the main output.
pub fn report_issues(issues: &[ResolutionIssue], output: &OutputManager) -> CliResult<()> {
    if issues.is_empty() {
        return Ok(());
    }
    output.print("")?;
    for issue in issues {
        output.warning(&issue.to_string())?;
    }
    output.print(&output.dim(&format!("{} resources skipped", issues.len())))?;
    Ok(())
}
