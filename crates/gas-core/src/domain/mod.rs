//! Core domain layer for gas.
//!
//! Pure resolution logic with no I/O: identifiers and manifests, dependency
//! mapping, the layout contract of the dependency graph, comment and literal
//! classification of source text, extraction outcomes, script synthesis and
//! typed config materialization. Filesystem access, config extraction, graph
//! algorithms and the external runtime are reached via ports defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, process, or network calls
//! - **Per-run registries**: package and type registries are built per call
//!   and passed explicitly, never held in statics
//! - **Immutable values**: All domain objects are Clone + PartialEq

pub mod config;
pub mod dependency;
pub mod error;
pub mod extraction;
pub mod issue;
pub mod layout;
pub mod lexer;
pub mod resource;
pub mod script;

pub use config::{
    Binding, EvaluatedConfigs, Materialized, ResourceKind, StoreConfig, TypedConfig,
    WorkerConfig, materialize,
};
pub use dependency::{NameToDeps, PackageIndex, map_dependencies};
pub use error::DomainError;
pub use extraction::{
    ConfigExpression, DEFAULT_SETTER_MODULE, Extraction, strip_const_assertions,
};
pub use issue::ResolutionIssue;
pub use layout::GraphLayout;
pub use lexer::{Lexeme, classify, mask_comments};
pub use resource::{IndexFile, PackageManifest, Resource, ResourceId, index_resources};
pub use script::ConfigScript;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    // ========================================================================
    // Canonicalization
    // ========================================================================

    #[test]
    fn canonicalizes_folder_names() {
        assert_eq!(
            ResourceId::from_dir_name("core-base-kv").unwrap().as_str(),
            "CORE_BASE_KV"
        );
        assert_eq!(ResourceId::from_dir_name("web").unwrap().as_str(), "WEB");
    }

    #[test]
    fn canonicalization_is_deterministic_and_idempotent() {
        let once = ResourceId::from_dir_name("core-Base_kv").unwrap();
        let twice = ResourceId::from_dir_name(once.as_str()).unwrap();

        assert_eq!(once, ResourceId::from_dir_name("core-Base_kv").unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_folder_name_is_rejected() {
        assert!(matches!(
            ResourceId::from_dir_name("  "),
            Err(DomainError::InvalidResourceName { .. })
        ));
    }

    #[test]
    fn colliding_folder_names_are_reported() {
        let resources = vec![
            resource_at("gas/core-kv", "a"),
            resource_at("gas/core_kv", "b"),
        ];

        let err = index_resources(resources).unwrap_err();

        assert_eq!(
            err,
            DomainError::DuplicateResourceId {
                id: "CORE_KV".into(),
                first: PathBuf::from("gas/core-kv"),
                second: PathBuf::from("gas/core_kv"),
            }
        );
    }

    #[test]
    fn case_only_collisions_are_reported() {
        let resources = vec![resource_at("gas/Api", "a"), resource_at("gas/api", "b")];

        assert!(matches!(
            index_resources(resources),
            Err(DomainError::DuplicateResourceId { .. })
        ));
    }

    #[test]
    fn index_resources_orders_by_id() {
        let resources = vec![resource_at("gas/web", "w"), resource_at("gas/api", "a")];

        let by_id = index_resources(resources).unwrap();

        let ids: Vec<_> = by_id.keys().map(ResourceId::as_str).collect();
        assert_eq!(ids, vec!["API", "WEB"]);
    }

    // ========================================================================
    // Manifest
    // ========================================================================

    #[test]
    fn manifest_decodes_all_fields() {
        let raw = r#"{
            "name": "core-base-api",
            "main": "build/index.js",
            "types": "build/index.d.ts",
            "scripts": { "build": "tsc" },
            "dependencies": { "core-base-kv": "workspace:*" },
            "devDependencies": { "typescript": "^5.0.0" }
        }"#;

        let manifest = PackageManifest::from_json(Path::new("package.json"), raw).unwrap();

        assert_eq!(manifest.name, "core-base-api");
        assert_eq!(manifest.main.as_deref(), Some("build/index.js"));
        assert_eq!(manifest.dependencies.len(), 1);
        assert!(manifest.dev_dependencies.contains_key("typescript"));
    }

    #[test]
    fn manifest_dependencies_default_to_empty() {
        let manifest =
            PackageManifest::from_json(Path::new("package.json"), r#"{ "name": "kv" }"#).unwrap();

        assert!(manifest.dependencies.is_empty());
        assert!(manifest.main.is_none());
    }

    #[test]
    fn manifest_errors_name_the_path() {
        let path = Path::new("gas/kv/package.json");

        let err = PackageManifest::from_json(path, r#"{ "dependencies": {} }"#).unwrap_err();

        match &err {
            DomainError::InvalidManifest { path: p, reason } => {
                assert_eq!(p, path);
                assert!(reason.contains("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("gas/kv/package.json"));
    }

    fn resource_at(path: &str, package: &str) -> Resource {
        let path = PathBuf::from(path);
        let dir = path.file_name().unwrap().to_str().unwrap();
        Resource {
            id: ResourceId::from_dir_name(dir).unwrap(),
            manifest: PackageManifest::from_json(
                &path.join("package.json"),
                &format!(r#"{{ "name": "{package}" }}"#),
            )
            .unwrap(),
            index: IndexFile {
                path: path.join("src").join("_core.base.kv.index.ts"),
                source: String::new(),
            },
            path,
        }
    }
}
