//! Result of the dependency graph collaborator.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{DomainError, NameToDeps, ResourceId};

/// Depth layers, groups and roots of an acyclic resource graph.
///
/// Layer 0 holds resources without internal dependencies. A resource in layer
/// `k` has at least one dependency in layer `k - 1` and none in layer `k` or
/// above. Identifiers inside a layer, a group and the root list are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphLayout {
    layers: Vec<Vec<ResourceId>>,
    groups: Vec<Vec<ResourceId>>,
    roots: Vec<ResourceId>,
}

impl GraphLayout {
    pub fn new(
        mut layers: Vec<Vec<ResourceId>>,
        mut groups: Vec<Vec<ResourceId>>,
        mut roots: Vec<ResourceId>,
    ) -> Self {
        layers.retain(|layer| !layer.is_empty());
        for layer in &mut layers {
            layer.sort();
        }
        for group in &mut groups {
            group.sort();
        }
        groups.retain(|group| !group.is_empty());
        groups.sort();
        roots.sort();
        Self {
            layers,
            groups,
            roots,
        }
    }

    pub fn layers(&self) -> &[Vec<ResourceId>] {
        &self.layers
    }

    /// Weakly connected components: resources sharing any relative.
    pub fn groups(&self) -> &[Vec<ResourceId>] {
        &self.groups
    }

    /// Resources nothing else depends on.
    pub fn roots(&self) -> &[ResourceId] {
        &self.roots
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn resource_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Every identifier, dependencies before their dependents.
    pub fn dependencies_first(&self) -> impl Iterator<Item = &ResourceId> {
        self.layers.iter().flatten()
    }

    pub fn layer_of(&self, id: &ResourceId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(id))
    }

    /// Check this layout against the adjacency map it was computed from.
    ///
    /// Every key of `deps` must be placed in exactly one layer, strictly above
    /// each of its dependencies.
    pub fn verify(&self, deps: &NameToDeps) -> Result<(), DomainError> {
        let mut layer_by_id: BTreeMap<&ResourceId, usize> = BTreeMap::new();
        for (index, layer) in self.layers.iter().enumerate() {
            for id in layer {
                if let Some(first) = layer_by_id.insert(id, index) {
                    return Err(DomainError::LayoutViolation {
                        resource: id.to_string(),
                        dependency: format!("<also placed in layer {first}>"),
                    });
                }
            }
        }

        for (resource, dependencies) in deps {
            let Some(&layer) = layer_by_id.get(resource) else {
                return Err(DomainError::LayoutViolation {
                    resource: resource.to_string(),
                    dependency: "<missing from layout>".into(),
                });
            };
            for dependency in dependencies {
                let Some(&dep_layer) = layer_by_id.get(dependency) else {
                    return Err(DomainError::UnknownDependency {
                        resource: resource.to_string(),
                        dependency: dependency.to_string(),
                    });
                };
                if dep_layer >= layer {
                    return Err(DomainError::LayoutViolation {
                        resource: resource.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
