//! Wires the configured adapters into a [`ResolveService`].

use std::path::Path;

use tracing::debug;

use gas_adapters::{LocalResourceStore, PetgraphGrapher, ProcessEvaluator, RegexConfigExtractor};
use gas_core::application::ResolveService;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

pub fn build_service(config: &AppConfig) -> ResolveService {
    let evaluator = ProcessEvaluator::new(
        config.evaluator.program.as_str(),
        config.evaluator.args.iter().cloned(),
    )
    .with_timeout(config.evaluator.timeout());

    debug!(
        program = %config.evaluator.program,
        setter_module = %config.resources.setter_module,
        "building resolve service"
    );

    ResolveService::new(
        Box::new(LocalResourceStore::new()),
        Box::new(RegexConfigExtractor::new(
            config.resources.setter_module.as_str(),
        )),
        Box::new(PetgraphGrapher::new()),
        Box::new(evaluator),
    )
}

/// The configured container, if it exists.
pub fn container_dir(config: &AppConfig) -> CliResult<&Path> {
    let dir = config.resources.container_dir.as_path();
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(CliError::ContainerNotFound {
            path: dir.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_container_is_reported_with_its_path() {
        let temp = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.resources.container_dir = temp.path().join("gas");

        match container_dir(&config) {
            Err(CliError::ContainerNotFound { path }) => assert!(path.ends_with("gas")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn existing_container_is_accepted() {
        let temp = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.resources.container_dir = temp.path().to_path_buf();

        assert_eq!(container_dir(&config).unwrap(), temp.path());
    }

    #[test]
    fn empty_container_plans_without_a_runtime() {
        let temp = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.evaluator.program = "gas-test-no-such-runtime".into();

        let plan = build_service(&config).plan(temp.path()).unwrap();

        assert!(plan.script.is_empty());
        assert!(plan.layout.is_empty());
    }
}
