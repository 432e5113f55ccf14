use serde::Serialize;
use thiserror::Error;

use crate::domain::{Extraction, ResourceId};

/// A soft, per-resource problem. The resource is left out of the result and
/// the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    #[error("{resource}: no config setter imported from '{module}'")]
    NoSetterImport { resource: ResourceId, module: String },

    #[error("{resource}: ambiguous config setter, imports {}", .setters.join(", "))]
    AmbiguousSetter {
        resource: ResourceId,
        setters: Vec<String>,
    },

    #[error("{resource}: no exported config calls '{setter}'")]
    NoConfigExport { resource: ResourceId, setter: String },

    #[error("{resource}: unknown resource type '{type_name}'")]
    UnknownResourceType {
        resource: ResourceId,
        type_name: String,
    },

    #[error("{resource}: malformed config: {reason}")]
    MalformedConfig { resource: ResourceId, reason: String },
}

impl ResolutionIssue {
    /// The issue for a non-`Found` extraction outcome.
    pub fn from_extraction(
        resource: &ResourceId,
        extraction: &Extraction,
        module: &str,
    ) -> Option<Self> {
        let resource = resource.clone();
        match extraction {
            Extraction::Found(_) => None,
            Extraction::NoSetterImport => Some(Self::NoSetterImport {
                resource,
                module: module.to_string(),
            }),
            Extraction::AmbiguousSetter { setters } => Some(Self::AmbiguousSetter {
                resource,
                setters: setters.clone(),
            }),
            Extraction::NoConfigExport { setter } => Some(Self::NoConfigExport {
                resource,
                setter: setter.clone(),
            }),
        }
    }

    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::NoSetterImport { resource, .. }
            | Self::AmbiguousSetter { resource, .. }
            | Self::NoConfigExport { resource, .. }
            | Self::UnknownResourceType { resource, .. }
            | Self::MalformedConfig { resource, .. } => resource,
        }
    }
}
