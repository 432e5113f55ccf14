//! Resolve Service - main application orchestrator.
//!
//! This service drives the resolution pipeline:
//! 1. Locate resources and read their manifests
//! 2. Map manifest dependencies to internal edges
//! 3. Lay out the dependency graph
//! 4. Extract each resource's config expression
//! 5. Synthesize the evaluation script
//! 6. Evaluate it in the external runtime
//! 7. Materialize typed configs
//!
//! Steps 1-5 form a [`ResolutionPlan`], which needs no runtime and backs the
//! `graph` and `script` commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ConfigEvaluator, ConfigExtractor, DependencyGrapher, ResourceStore},
    },
    domain::{
        ConfigExpression, ConfigScript, GraphLayout, Materialized, NameToDeps, ResolutionIssue,
        Resource, ResourceId, TypedConfig, index_resources, map_dependencies, materialize,
    },
    error::{GasError, GasResult},
};

/// Everything known about a container before evaluation.
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    pub resources: BTreeMap<ResourceId, Resource>,
    pub dependencies: NameToDeps,
    pub layout: GraphLayout,
    pub expressions: BTreeMap<ResourceId, ConfigExpression>,
    pub script: ConfigScript,
    pub issues: Vec<ResolutionIssue>,
}

/// Final result of one resolution run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub configs: BTreeMap<ResourceId, TypedConfig>,
    pub layout: GraphLayout,
    pub issues: Vec<ResolutionIssue>,
}

/// Main resolution service.
pub struct ResolveService {
    store: Box<dyn ResourceStore>,
    extractor: Box<dyn ConfigExtractor>,
    grapher: Box<dyn DependencyGrapher>,
    evaluator: Box<dyn ConfigEvaluator>,
}

impl ResolveService {
    /// Create a new resolve service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use gas_core::application::ResolveService;
    ///
    /// let service = ResolveService::new(
    ///     store,     // impl ResourceStore
    ///     extractor, // impl ConfigExtractor
    ///     grapher,   // impl DependencyGrapher
    ///     evaluator, // impl ConfigEvaluator
    /// );
    /// ```
    pub fn new(
        store: Box<dyn ResourceStore>,
        extractor: Box<dyn ConfigExtractor>,
        grapher: Box<dyn DependencyGrapher>,
        evaluator: Box<dyn ConfigEvaluator>,
    ) -> Self {
        Self {
            store,
            extractor,
            grapher,
            evaluator,
        }
    }

    /// Run the pipeline up to script synthesis.
    #[instrument(skip_all, fields(container = %container.as_ref().display()))]
    pub fn plan(&self, container: impl AsRef<Path>) -> GasResult<ResolutionPlan> {
        let container = container.as_ref();

        // 1. Locate resources
        let resources = index_resources(self.store.load(container)?)?;
        info!(resources = resources.len(), "Resources located");

        // 2. Map dependencies
        let dependencies = map_dependencies(resources.values())?;

        // 3. Lay out the graph
        let layout = self.grapher.layout(&dependencies)?;
        layout.verify(&dependencies)?;
        debug!(
            depth = layout.depth(),
            groups = layout.groups().len(),
            roots = layout.roots().len(),
            "Dependency graph laid out"
        );

        // 4. Extract config expressions
        let (expressions, issues) = self.extract_all(&resources);

        // 5. Synthesize
        let script =
            ConfigScript::synthesize(self.extractor.setter_module(), &layout, &expressions);
        debug!(configs = expressions.len(), "Script synthesized");

        Ok(ResolutionPlan {
            resources,
            dependencies,
            layout,
            expressions,
            script,
            issues,
        })
    }

    /// Evaluate a plan and materialize typed configs.
    ///
    /// An empty script short-circuits to an empty result without starting the
    /// runtime.
    #[instrument(skip_all, fields(configs = plan.expressions.len()))]
    pub fn evaluate(&self, plan: ResolutionPlan) -> GasResult<Resolution> {
        let ResolutionPlan {
            layout,
            script,
            mut issues,
            ..
        } = plan;

        if script.is_empty() {
            info!("No confirmed configs, skipping evaluation");
            return Ok(Resolution {
                configs: BTreeMap::new(),
                layout,
                issues,
            });
        }

        // 6. Evaluate
        let evaluated = self.evaluator.evaluate(&script)?;
        debug!(entries = evaluated.len(), "Runtime returned configs");

        // 7. Materialize
        let Materialized {
            configs,
            issues: typed_issues,
        } = materialize(evaluated);
        for issue in &typed_issues {
            warn!(resource = %issue.resource(), "{issue}");
        }
        issues.extend(typed_issues);

        info!(
            configs = configs.len(),
            issues = issues.len(),
            "Resolution completed"
        );
        Ok(Resolution {
            configs,
            layout,
            issues,
        })
    }

    /// Run the whole pipeline once.
    pub fn resolve(&self, container: impl AsRef<Path>) -> GasResult<Resolution> {
        let plan = self.plan(container)?;
        self.evaluate(plan)
    }

    /// Run [`resolve`](Self::resolve) on a worker thread.
    ///
    /// The outcome arrives as one message on the returned handle.
    pub fn resolve_in_background(self: Arc<Self>, container: impl Into<PathBuf>) -> ResolveHandle {
        let container = container.into();
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("gas-resolve".into())
            .spawn(move || {
                let outcome = self.resolve(&container);
                // The handle may have been dropped; nothing is left to notify.
                let _ = sender.send(outcome);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn resolve worker");
        }

        ResolveHandle { receiver }
    }

    // ---- Internal Helpers ----

    fn extract_all(
        &self,
        resources: &BTreeMap<ResourceId, Resource>,
    ) -> (BTreeMap<ResourceId, ConfigExpression>, Vec<ResolutionIssue>) {
        let module = self.extractor.setter_module();
        let mut expressions = BTreeMap::new();
        let mut issues = Vec::new();

        for (id, resource) in resources {
            let extraction = self.extractor.extract(&resource.index.source);
            if let Some(issue) = ResolutionIssue::from_extraction(id, &extraction, module) {
                issues.push(issue);
                continue;
            }
            if let Some(expression) = extraction.into_expression() {
                debug!(
                    resource = %id,
                    variable = %expression.variable_name,
                    setter = %expression.function_name,
                    "Config expression found"
                );
                expressions.insert(id.clone(), expression);
            }
        }

        for issue in &issues {
            warn!(resource = %issue.resource(), "{issue}");
        }
        (expressions, issues)
    }
}

/// Pending result of [`ResolveService::resolve_in_background`].
pub struct ResolveHandle {
    receiver: mpsc::Receiver<GasResult<Resolution>>,
}

impl ResolveHandle {
    /// Non-blocking poll. `None` while the worker is still running.
    pub fn try_result(&self) -> Option<GasResult<Resolution>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<GasResult<Resolution>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    pub fn wait(self) -> GasResult<Resolution> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()))
    }
}

fn worker_lost() -> GasError {
    ApplicationError::BackgroundTaskFailed.into()
}
