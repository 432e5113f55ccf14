//! Filesystem-backed resource store.
//!
//! # Directory layout expected
//!
//! ```text
//! gas/                                  ← container directory
//! ├── core-base-kv/
//! │   ├── package.json                  ← manifest (required)
//! │   └── src/
//! │       └── _core.base.kv.index.ts    ← index source (required)
//! └── core-base-api/
//!     ├── package.json
//!     └── src/
//!         └── _core.base.api.index.ts
//! ```
//!
//! The index file is looked up in `src/` first and then in the resource
//! directory itself. A resource without one fails the whole load.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use gas_core::{
    application::{ApplicationError, ports::ResourceStore},
    domain::{IndexFile, PackageManifest, Resource, ResourceId},
    error::{GasError, GasResult},
};

/// `_<group>.<entity>.<kind>.index.ts`
static INDEX_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^_[^.]+\.[^.]+\.[^.]+\.index\.ts$").expect("index file pattern is valid")
});

const MANIFEST_FILE: &str = "package.json";
const SOURCE_DIR: &str = "src";

/// Production resource store reading from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResourceStore;

impl LocalResourceStore {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self), fields(dir = %dir.display()))]
    fn load_resource(&self, dir: &Path) -> GasResult<Resource> {
        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let id = ResourceId::from_dir_name(&dir_name)?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path)
            .map_err(|e| map_io_error(&manifest_path, e, "read manifest"))?;
        let manifest = PackageManifest::from_json(&manifest_path, &raw)?;

        let Some(index_path) = find_index_file(dir)? else {
            return Err(ApplicationError::FilesystemError {
                path: dir.to_path_buf(),
                reason: "No index file matching _<group>.<entity>.<kind>.index.ts".into(),
            }
            .into());
        };
        let source = fs::read_to_string(&index_path)
            .map_err(|e| map_io_error(&index_path, e, "read index file"))?;
        let index = IndexFile {
            path: index_path,
            source,
        };

        debug!(
            id = %id,
            package = %manifest.name,
            index = %index.path.display(),
            "loaded resource"
        );
        Ok(Resource {
            id,
            path: dir.to_path_buf(),
            manifest,
            index,
        })
    }
}

impl ResourceStore for LocalResourceStore {
    #[instrument(skip(self), fields(container = %container.display()))]
    fn load(&self, container: &Path) -> GasResult<Vec<Resource>> {
        let mut resources = Vec::new();

        for entry in WalkDir::new(container)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(container).to_path_buf();
                map_walk_error(path, e)
            })?;

            let path = entry.path();
            if !path.is_dir() {
                continue; // Only subdirectories are resources.
            }
            resources.push(self.load_resource(path)?);
        }

        debug!(count = resources.len(), "finished loading resources");
        Ok(resources)
    }
}

/// First index file in `src/`, then in `dir`, by file name.
fn find_index_file(dir: &Path) -> GasResult<Option<PathBuf>> {
    for candidate_dir in [dir.join(SOURCE_DIR), dir.to_path_buf()] {
        if !candidate_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&candidate_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| map_walk_error(candidate_dir.clone(), e))?;
            let is_index = entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| INDEX_FILE_NAME.is_match(name));
            if is_index {
                return Ok(Some(entry.into_path()));
            }
        }
    }
    Ok(None)
}

fn map_io_error(path: &Path, e: std::io::Error, operation: &str) -> GasError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

fn map_walk_error(path: PathBuf, e: walkdir::Error) -> GasError {
    let reason = match e.io_error() {
        Some(io) => format!("Failed to list directory: {io}"),
        None => format!("Failed to list directory: {e}"),
    };
    ApplicationError::FilesystemError { path, reason }.into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── helpers ───────────────────────────────────────────────────────────

    const INDEX: (&str, &str) = ("src/_core.base.kv.index.ts", "");

    /// Write a resource directory with a manifest and extra files.
    fn make_resource(container: &Path, dir: &str, manifest: &str, files: &[(&str, &str)]) {
        let root = container.join(dir);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(MANIFEST_FILE), manifest).unwrap();
        for (rel_path, content) in files {
            let full = root.join(rel_path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn missing_container_is_a_filesystem_error() {
        let err = LocalResourceStore::new()
            .load(Path::new("/absolutely/does/not/exist"))
            .unwrap_err();

        match err {
            GasError::Application(ApplicationError::FilesystemError { path, .. }) => {
                assert_eq!(path, PathBuf::from("/absolutely/does/not/exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn skips_files_and_sorts_resources() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# resources").unwrap();
        make_resource(temp.path(), "web", r#"{ "name": "web" }"#, &[INDEX]);
        make_resource(temp.path(), "core-base-kv", r#"{ "name": "core-base-kv" }"#, &[INDEX]);

        let resources = LocalResourceStore::new().load(temp.path()).unwrap();

        let ids: Vec<_> = resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["CORE_BASE_KV", "WEB"]);
    }

    #[test]
    fn empty_container_yields_no_resources() {
        let temp = TempDir::new().unwrap();

        assert!(LocalResourceStore::new().load(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_manifest_names_its_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("kv")).unwrap();

        let err = LocalResourceStore::new().load(temp.path()).unwrap_err();

        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn malformed_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        make_resource(temp.path(), "kv", "{ not json", &[]);

        let err = LocalResourceStore::new().load(temp.path()).unwrap_err();

        assert!(matches!(
            err,
            GasError::Domain(gas_core::domain::DomainError::InvalidManifest { .. })
        ));
    }

    // ── index lookup ──────────────────────────────────────────────────────

    #[test]
    fn reads_index_file_from_src() {
        let temp = TempDir::new().unwrap();
        make_resource(
            temp.path(),
            "core-base-kv",
            r#"{ "name": "core-base-kv" }"#,
            &[
                ("src/_core.base.kv.index.ts", "export const x = 1;"),
                ("src/helpers.ts", "export {}"),
            ],
        );

        let resources = LocalResourceStore::new().load(temp.path()).unwrap();

        let index = &resources[0].index;
        assert!(index.path.ends_with("src/_core.base.kv.index.ts"));
        assert_eq!(index.source, "export const x = 1;");
    }

    #[test]
    fn falls_back_to_resource_root() {
        let temp = TempDir::new().unwrap();
        make_resource(
            temp.path(),
            "kv",
            r#"{ "name": "kv" }"#,
            &[("_core.base.kv.index.ts", "root")],
        );

        let resources = LocalResourceStore::new().load(temp.path()).unwrap();

        assert_eq!(resources[0].index.source, "root");
    }

    #[test]
    fn missing_index_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        make_resource(temp.path(), "core-kv", r#"{ "name": "core-kv" }"#, &[]);
        make_resource(temp.path(), "web", r#"{ "name": "web" }"#, &[INDEX]);

        let err = LocalResourceStore::new().load(temp.path()).unwrap_err();

        match err {
            GasError::Application(ApplicationError::FilesystemError { path, reason }) => {
                assert_eq!(path, temp.path().join("core-kv"));
                assert!(reason.contains("index.ts"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_matching_names_are_not_index_files() {
        let temp = TempDir::new().unwrap();
        make_resource(
            temp.path(),
            "kv",
            r#"{ "name": "kv" }"#,
            &[
                ("src/index.ts", ""),
                ("src/_core.kv.index.ts", ""),
                ("src/_core.base.kv.index.js", ""),
            ],
        );

        let err = LocalResourceStore::new().load(temp.path()).unwrap_err();

        assert!(err.to_string().contains("No index file"));
    }

    #[test]
    fn index_file_pattern() {
        assert!(INDEX_FILE_NAME.is_match("_core.base.kv.index.ts"));
        assert!(INDEX_FILE_NAME.is_match("_a.b.c.index.ts"));
        assert!(!INDEX_FILE_NAME.is_match("core.base.kv.index.ts"));
        assert!(!INDEX_FILE_NAME.is_match("_core.base.kv.index.tsx"));
        assert!(!INDEX_FILE_NAME.is_match("_core.base.kv.extra.index.ts"));
    }
}
