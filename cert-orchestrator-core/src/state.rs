//! Persisted resource state

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::resource::Urn;

/// What was recorded the last time a resource was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub urn: Urn,
    pub type_token: String,
    pub inputs: serde_json::Value,
    pub outputs: serde_json::Value,
}

/// State storage abstract Trait
///
/// The engine compares a resource's inputs with the stored ones to decide
/// whether the create step has to run again.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, urn: &Urn) -> CoreResult<Option<ResourceState>>;

    /// Insert or replace the state of `state.urn`.
    async fn put(&self, state: ResourceState) -> CoreResult<()>;

    async fn remove(&self, urn: &Urn) -> CoreResult<()>;

    /// Every stored resource, ordered by URN.
    async fn list(&self) -> CoreResult<Vec<ResourceState>>;
}

/// In-memory state store
///
/// Clones share the same map, so a second engine can be pointed at the
/// state left behind by the first.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    resources: Arc<RwLock<HashMap<Urn, ResourceState>>>,
}

impl InMemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, urn: &Urn) -> CoreResult<Option<ResourceState>> {
        Ok(self.resources.read().await.get(urn).cloned())
    }

    async fn put(&self, state: ResourceState) -> CoreResult<()> {
        self.resources
            .write()
            .await
            .insert(state.urn.clone(), state);
        Ok(())
    }

    async fn remove(&self, urn: &Urn) -> CoreResult<()> {
        self.resources.write().await.remove(urn);
        Ok(())
    }

    async fn list(&self) -> CoreResult<Vec<ResourceState>> {
        let mut all: Vec<_> = self.resources.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.urn.cmp(&b.urn));
        Ok(all)
    }
}

const STATE_FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    resources: Vec<ResourceState>,
}

/// State kept in one JSON document on disk.
///
/// The document is read on first access and rewritten (via a temporary file
/// and a rename) after every change.
pub struct JsonFileStateStore {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<Urn, ResourceState>>>,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> CoreResult<BTreeMap<Urn, ResourceState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("State file {} does not exist yet", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(CoreError::StateError(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let document: StateDocument = serde_json::from_str(&content).map_err(|e| {
            CoreError::SerializationError(format!("{}: {e}", self.path.display()))
        })?;
        if document.version != STATE_FILE_VERSION {
            return Err(CoreError::StateError(format!(
                "Unsupported state file version {} in {}",
                document.version,
                self.path.display()
            )));
        }

        Ok(document
            .resources
            .into_iter()
            .map(|r| (r.urn.clone(), r))
            .collect())
    }

    async fn save(&self, resources: &BTreeMap<Urn, ResourceState>) -> CoreResult<()> {
        let document = StateDocument {
            version: STATE_FILE_VERSION,
            resources: resources.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                CoreError::StateError(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| {
            CoreError::StateError(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            CoreError::StateError(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }

    /// Run `f` on the loaded state, then persist it.
    async fn update<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<Urn, ResourceState>) + Send,
    {
        let mut cache = self.cache.write().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        if let Some(resources) = cache.as_mut() {
            f(resources);
            self.save(resources).await?;
        }
        Ok(())
    }

    async fn snapshot(&self) -> CoreResult<BTreeMap<Urn, ResourceState>> {
        if let Some(resources) = self.cache.read().await.as_ref() {
            return Ok(resources.clone());
        }
        let mut cache = self.cache.write().await;
        let resources = match cache.as_ref() {
            Some(resources) => resources.clone(),
            None => {
                let loaded = self.load().await?;
                *cache = Some(loaded.clone());
                loaded
            }
        };
        Ok(resources)
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, urn: &Urn) -> CoreResult<Option<ResourceState>> {
        Ok(self.snapshot().await?.remove(urn))
    }

    async fn put(&self, state: ResourceState) -> CoreResult<()> {
        self.update(move |resources| {
            resources.insert(state.urn.clone(), state);
        })
        .await
    }

    async fn remove(&self, urn: &Urn) -> CoreResult<()> {
        self.update(|resources| {
            resources.remove(urn);
        })
        .await
    }

    async fn list(&self) -> CoreResult<Vec<ResourceState>> {
        Ok(self.snapshot().await?.into_values().collect())
    }
}
