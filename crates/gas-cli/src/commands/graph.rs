//! `gas graph`: print the dependency layout without evaluating anything.

use tracing::instrument;

use gas_core::domain::{GraphLayout, ResourceId};

use crate::{
    cli::OutputFormat,
    commands::resolve::report_issues,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    pipeline,
};

#[instrument(skip_all)]
pub fn execute(config: AppConfig, output: OutputManager) -> CliResult<()> {
    let container = pipeline::container_dir(&config)?;
    let plan = pipeline::build_service(&config).plan(container)?;

    if output.format() == OutputFormat::Json {
        return output.print_json(&plan.layout);
    }

    if plan.layout.is_empty() {
        output.info(&format!("No resources in {}", container.display()))?;
        return Ok(());
    }

    print_layout(&plan.layout, &output)?;
    report_issues(&plan.issues, &output)?;
    Ok(())
}

fn print_layout(layout: &GraphLayout, output: &OutputManager) -> CliResult<()> {
    output.header(&format!(
        "{} resources in {} layers",
        layout.resource_count(),
        layout.depth()
    ))?;
    for (depth, layer) in layout.layers().iter().enumerate() {
        output.print(&format!("  {} {}", output.dim(&format!("{depth:>2}")), join(layer)))?;
    }

    output.header("Groups")?;
    for group in layout.groups() {
        output.print(&format!("  {}", join(group)))?;
    }

    output.header("Roots")?;
    output.print(&format!("  {}", join(layout.roots())))?;
    Ok(())
}

fn join(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ResourceId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
