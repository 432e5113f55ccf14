//! Resources: one package directory inside the container directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;

/// Canonical resource identifier.
///
/// Derived from the resource's folder name by replacing `-` with `_` and
/// upper-casing (`core-base-kv` → `CORE_BASE_KV`). Canonicalizing an already
/// canonical identifier returns it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn from_dir_name(name: &str) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidResourceName {
                name: name.to_string(),
                reason: "folder name is empty".into(),
            });
        }
        if trimmed.contains(['"', '\\', '\n']) {
            return Err(DomainError::InvalidResourceName {
                name: name.to_string(),
                reason: "folder name contains a quote, backslash or newline".into(),
            });
        }
        Ok(Self(canonicalize(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn canonicalize(name: &str) -> String {
    name.replace('-', "_").to_uppercase()
}

/// Decoded `package.json` of a resource.
///
/// Only `name` and `dependencies` drive the pipeline; the remaining fields are
/// kept so callers can display them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parse a manifest, naming `path` in the error.
    pub fn from_json(path: &Path, raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// The index source file a resource exports its config from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    pub path: PathBuf,
    pub source: String,
}

/// A located resource with its manifest and index source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub path: PathBuf,
    pub manifest: PackageManifest,
    pub index: IndexFile,
}

impl Resource {
    pub fn package_name(&self) -> &str {
        &self.manifest.name
    }
}

/// Key resources by identifier, rejecting folders that collide after
/// canonicalization.
pub fn index_resources(
    resources: Vec<Resource>,
) -> Result<BTreeMap<ResourceId, Resource>, DomainError> {
    let mut by_id: BTreeMap<ResourceId, Resource> = BTreeMap::new();
    for resource in resources {
        if let Some(existing) = by_id.get(&resource.id) {
            let (first, second) = ordered_paths(&existing.path, &resource.path);
            return Err(DomainError::DuplicateResourceId {
                id: resource.id.to_string(),
                first,
                second,
            });
        }
        by_id.insert(resource.id.clone(), resource);
    }
    Ok(by_id)
}

fn ordered_paths(a: &Path, b: &Path) -> (PathBuf, PathBuf) {
    if a <= b {
        (a.to_path_buf(), b.to_path_buf())
    } else {
        (b.to_path_buf(), a.to_path_buf())
    }
}
