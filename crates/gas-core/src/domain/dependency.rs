//! Manifest dependency names → internal resource edges.

use std::collections::BTreeMap;

use crate::domain::{DomainError, Resource, ResourceId};

/// Adjacency map keyed by dependent: every located resource appears as a key,
/// its value lists the internal resources it depends on (sorted, unique).
pub type NameToDeps = BTreeMap<ResourceId, Vec<ResourceId>>;

/// Reverse index from declared package name to resource identifier.
///
/// Built once per run from the located resources and passed explicitly to the
/// mapping step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    by_package: BTreeMap<String, ResourceId>,
}

impl PackageIndex {
    pub fn build<'a>(
        resources: impl IntoIterator<Item = &'a Resource>,
    ) -> Result<Self, DomainError> {
        let mut by_package: BTreeMap<String, ResourceId> = BTreeMap::new();
        for resource in resources {
            let package = resource.package_name().to_string();
            if let Some(existing) = by_package.get(&package) {
                return Err(DomainError::DuplicatePackageName {
                    package,
                    first: existing.to_string(),
                    second: resource.id.to_string(),
                });
            }
            by_package.insert(package, resource.id.clone());
        }
        Ok(Self { by_package })
    }

    pub fn get(&self, package: &str) -> Option<&ResourceId> {
        self.by_package.get(package)
    }

    pub fn len(&self) -> usize {
        self.by_package.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_package.is_empty()
    }

    /// Internal dependencies of `resource`; external packages are dropped.
    ///
    /// Only `dependencies` count. `devDependencies` never produce edges.
    pub fn internal_dependencies(&self, resource: &Resource) -> Vec<ResourceId> {
        let mut deps: Vec<ResourceId> = resource
            .manifest
            .dependencies
            .keys()
            .filter_map(|package| self.get(package).cloned())
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }
}

/// Build the adjacency map for a set of resources.
pub fn map_dependencies<'a, I>(resources: I) -> Result<NameToDeps, DomainError>
where
    I: IntoIterator<Item = &'a Resource> + Clone,
{
    let index = PackageIndex::build(resources.clone())?;
    Ok(resources
        .into_iter()
        .map(|resource| (resource.id.clone(), index.internal_dependencies(resource)))
        .collect())
}
