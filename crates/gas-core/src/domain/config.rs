//! Typed resource configs and their materialization from evaluated JSON.
//!
//! # Adding New Resource Types
//!
//! 1. Add the `ResourceKind` variant with its `as_str` and `FromStr` arms
//! 2. Add the matching `TypedConfig` variant and its arm in `from_value`
//! 3. Done. The materializer dispatches through `ResourceKind` only

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, ResolutionIssue, ResourceId};

// ── ResourceKind ─────────────────────────────────────────────────────────────

/// The `type` discriminator of a resource config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    CloudflareKv,
    CloudflareD1,
    CloudflareWorker,
    CloudflareWorkerApi,
    CloudflareWorkerSite,
    CloudflarePages,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::CloudflareKv,
        Self::CloudflareD1,
        Self::CloudflareWorker,
        Self::CloudflareWorkerApi,
        Self::CloudflareWorkerSite,
        Self::CloudflarePages,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CloudflareKv => "cloudflare-kv",
            Self::CloudflareD1 => "cloudflare-d1",
            Self::CloudflareWorker => "cloudflare-worker",
            Self::CloudflareWorkerApi => "cloudflare-worker-api",
            Self::CloudflareWorkerSite => "cloudflare-worker-site",
            Self::CloudflarePages => "cloudflare-pages",
        }
    }

    /// Whether configs of this kind carry `kv`/`db` binding lists.
    pub const fn has_bindings(&self) -> bool {
        !matches!(self, Self::CloudflareKv | Self::CloudflareD1)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownResourceType {
                type_name: s.to_string(),
            })
    }
}

// ── Typed records ────────────────────────────────────────────────────────────

/// A `{ binding }` entry of a worker's `kv` or `db` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub binding: String,
}

/// Config of a storage resource (KV namespace, D1 database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
}

/// Config of a worker-like resource with its storage bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default)]
    pub kv: Vec<Binding>,
    #[serde(default)]
    pub db: Vec<Binding>,
}

/// Closed union of resource configs, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedConfig {
    CloudflareKv(StoreConfig),
    CloudflareD1(StoreConfig),
    CloudflareWorker(WorkerConfig),
    CloudflareWorkerApi(WorkerConfig),
    CloudflareWorkerSite(WorkerConfig),
    CloudflarePages(WorkerConfig),
}

impl TypedConfig {
    /// Decode `value` as a config of `kind`.
    pub fn from_value(kind: ResourceKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ResourceKind::CloudflareKv => Self::CloudflareKv(serde_json::from_value(value)?),
            ResourceKind::CloudflareD1 => Self::CloudflareD1(serde_json::from_value(value)?),
            ResourceKind::CloudflareWorker => {
                Self::CloudflareWorker(serde_json::from_value(value)?)
            }
            ResourceKind::CloudflareWorkerApi => {
                Self::CloudflareWorkerApi(serde_json::from_value(value)?)
            }
            ResourceKind::CloudflareWorkerSite => {
                Self::CloudflareWorkerSite(serde_json::from_value(value)?)
            }
            ResourceKind::CloudflarePages => Self::CloudflarePages(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::CloudflareKv(c) | Self::CloudflareD1(c) => c.kind,
            Self::CloudflareWorker(c)
            | Self::CloudflareWorkerApi(c)
            | Self::CloudflareWorkerSite(c)
            | Self::CloudflarePages(c) => c.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CloudflareKv(c) | Self::CloudflareD1(c) => &c.name,
            Self::CloudflareWorker(c)
            | Self::CloudflareWorkerApi(c)
            | Self::CloudflareWorkerSite(c)
            | Self::CloudflarePages(c) => &c.name,
        }
    }

    pub fn worker(&self) -> Option<&WorkerConfig> {
        match self {
            Self::CloudflareKv(_) | Self::CloudflareD1(_) => None,
            Self::CloudflareWorker(c)
            | Self::CloudflareWorkerApi(c)
            | Self::CloudflareWorkerSite(c)
            | Self::CloudflarePages(c) => Some(c),
        }
    }
}

// ── Evaluation payload ───────────────────────────────────────────────────────

/// Generic id → JSON value map printed by the runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluatedConfigs(BTreeMap<String, Value>);

impl EvaluatedConfigs {
    /// Decode the payload: the last non-blank line of `stdout`, which must be
    /// a JSON object.
    pub fn from_output(stdout: &str) -> Result<Self, DomainError> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| DomainError::MalformedPayload {
                reason: "runtime printed nothing to stdout".into(),
            })?;

        serde_json::from_str::<BTreeMap<String, Value>>(line)
            .map(Self)
            .map_err(|e| DomainError::MalformedPayload {
                reason: format!("{e} in `{}`", truncate(line, 120)),
            })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for EvaluatedConfigs {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for EvaluatedConfigs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

// ── Materialization ──────────────────────────────────────────────────────────

/// Typed configs plus the entries that could not be typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materialized {
    pub configs: BTreeMap<ResourceId, TypedConfig>,
    pub issues: Vec<ResolutionIssue>,
}

/// Dispatch each evaluated entry on its `type`.
///
/// Unknown types and malformed entries are reported as issues and left out.
pub fn materialize(evaluated: EvaluatedConfigs) -> Materialized {
    let mut out = Materialized::default();

    for (key, value) in evaluated.into_inner() {
        let resource = match ResourceId::from_dir_name(&key) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping evaluated entry");
                continue;
            }
        };

        let kind = match value.get("type") {
            Some(Value::String(type_name)) => match type_name.parse::<ResourceKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    out.issues.push(ResolutionIssue::UnknownResourceType {
                        resource,
                        type_name: type_name.clone(),
                    });
                    continue;
                }
            },
            Some(_) => {
                out.issues.push(ResolutionIssue::MalformedConfig {
                    resource,
                    reason: "`type` is not a string".into(),
                });
                continue;
            }
            None => {
                out.issues.push(ResolutionIssue::MalformedConfig {
                    resource,
                    reason: "missing `type`".into(),
                });
                continue;
            }
        };

        match TypedConfig::from_value(kind, value) {
            Ok(config) => {
                out.configs.insert(resource, config);
            }
            Err(e) => out.issues.push(ResolutionIssue::MalformedConfig {
                resource,
                reason: e.to_string(),
            }),
        }
    }

    out
}
