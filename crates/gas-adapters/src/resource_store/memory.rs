//! In-memory resource store for testing.

use std::{
    path::Path,
    sync::{Arc, RwLock},
};

use gas_core::{
    application::{ApplicationError, ports::ResourceStore},
    domain::{IndexFile, PackageManifest, Resource, ResourceId},
    error::GasResult,
};

/// Resource store backed by a list of fixture entries.
///
/// Entries are laid out under whatever container path `load` is called with,
/// so the same store can stand in for any directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    inner: Arc<RwLock<Vec<Entry>>>,
}

#[derive(Debug, Clone)]
struct Entry {
    dir_name: String,
    manifest_json: String,
    index: Option<(String, String)>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource folder with a raw `package.json` and no index file.
    /// Loading fails while such an entry is present.
    pub fn insert(&self, dir_name: &str, manifest_json: &str) -> GasResult<()> {
        self.push(Entry {
            dir_name: dir_name.to_string(),
            manifest_json: manifest_json.to_string(),
            index: None,
        })
    }

    /// Add a resource folder with a raw `package.json` and an index file
    /// under `src/`.
    pub fn insert_with_index(
        &self,
        dir_name: &str,
        manifest_json: &str,
        index_file_name: &str,
        source: &str,
    ) -> GasResult<()> {
        self.push(Entry {
            dir_name: dir_name.to_string(),
            manifest_json: manifest_json.to_string(),
            index: Some((index_file_name.to_string(), source.to_string())),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, entry: Entry) -> GasResult<()> {
        let mut entries = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        entries.push(entry);
        Ok(())
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn load(&self, container: &Path) -> GasResult<Vec<Resource>> {
        let entries = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut sorted: Vec<&Entry> = entries.iter().collect();
        sorted.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));

        sorted
            .into_iter()
            .map(|entry| -> GasResult<Resource> {
                let path = container.join(&entry.dir_name);
                let manifest =
                    PackageManifest::from_json(&path.join("package.json"), &entry.manifest_json)?;
                let Some((file_name, source)) = &entry.index else {
                    return Err(ApplicationError::FilesystemError {
                        path,
                        reason: "No index file matching _<group>.<entity>.<kind>.index.ts".into(),
                    }
                    .into());
                };
                let index = IndexFile {
                    path: path.join("src").join(file_name),
                    source: source.clone(),
                };
                Ok(Resource {
                    id: ResourceId::from_dir_name(&entry.dir_name)?,
                    path,
                    manifest,
                    index,
                })
            })
            .collect()
    }
}
