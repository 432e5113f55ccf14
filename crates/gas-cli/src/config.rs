//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. `--dir` (applied after loading)
//! 2. Environment variables: `GAS__SECTION__KEY`, e.g.
//!    `GAS__EVALUATOR__TIMEOUT_SECS=60`
//! 3. `resourceContainerDirPath` in the project's `gas.config.json`
//! 4. `--config FILE`, or `.gas.toml` in the working directory
//! 5. Global `config.toml` in the platform config directory
//! 6. Built-in defaults (always present)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use gas_core::domain::DEFAULT_SETTER_MODULE;

use crate::cli::global::GlobalArgs;

/// Per-directory config file written by `gas init`.
pub const LOCAL_CONFIG_FILE: &str = ".gas.toml";

/// Project file shared with the JavaScript tooling.
pub const PROJECT_CONFIG_FILE: &str = "gas.config.json";

const ENV_PREFIX: &str = "GAS";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where resources live and how they declare configs.
    pub resources: ResourcesConfig,
    /// External runtime settings.
    pub evaluator: EvaluatorConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub container_dir: PathBuf,
    pub setter_module: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// `0` disables the timeout.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON-lines log file; disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            container_dir: PathBuf::from("./gas"),
            setter_module: DEFAULT_SETTER_MODULE.into(),
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            program: "node".into(),
            args: vec!["--input-type=module".into()],
            timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl EvaluatorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// The subset of `gas.config.json` that gas reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFile {
    resource_container_dir_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration for the current working directory.
    pub fn load(args: &GlobalArgs) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        let global = Self::config_path();

        let mut config = Self::load_from(&cwd, Some(&global), args.config.as_deref())?;
        if let Some(dir) = &args.dir {
            config.resources.container_dir = dir.clone();
        }
        Ok(config)
    }

    /// Layer every source below the CLI flags.
    ///
    /// `explicit` replaces the local `.gas.toml` and must exist.
    pub fn load_from(
        cwd: &Path,
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to encode default config")?,
        );

        if let Some(global) = global {
            builder = builder.add_source(File::from(global).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(cwd.join(LOCAL_CONFIG_FILE)).required(false)),
        };

        if let Some(dir) = read_project_container_dir(cwd)? {
            let overlay = serde_json::json!({ "resources": { "container_dir": dir } });
            builder = builder.add_source(File::from_str(&overlay.to_string(), FileFormat::Json));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.gas.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "gas", "gas")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Path `gas init` writes to.
    pub fn local_path() -> PathBuf {
        PathBuf::from(LOCAL_CONFIG_FILE)
    }
}

fn read_project_container_dir(cwd: &Path) -> anyhow::Result<Option<PathBuf>> {
    let path = cwd.join(PROJECT_CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let project: ProjectFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(project.resource_container_dir_path)
}
