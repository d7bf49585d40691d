//! Per-instance caches for remote listings.
//!
//! Process group listings and parameter-context names are fetched on demand
//! and kept until explicitly invalidated. Both caches are plain values handed
//! to whoever needs them; there is no process-wide instance.

use crate::deploy::DeploymentClient;
use crate::error::RemoteError;
use crate::path::CandidatePath;
use crate::types::InstanceId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Normalized container paths per instance
#[derive(Default)]
pub struct PathCache {
    entries: RwLock<HashMap<InstanceId, Arc<Vec<CandidatePath>>>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instance_id: &str) -> Option<Arc<Vec<CandidatePath>>> {
        self.entries.read().get(instance_id).cloned()
    }

    pub fn insert(&self, instance_id: impl Into<InstanceId>, paths: Vec<CandidatePath>) {
        self.entries.write().insert(instance_id.into(), Arc::new(paths));
    }

    /// Cached paths, fetching and normalizing the instance listing on a miss.
    pub async fn get_or_fetch(
        &self,
        instance_id: &str,
        client: &dyn DeploymentClient,
    ) -> Result<Arc<Vec<CandidatePath>>, RemoteError> {
        if let Some(paths) = self.get(instance_id) {
            return Ok(paths);
        }
        let listings = client.list_process_groups(instance_id).await?;
        let paths: Vec<CandidatePath> = listings.iter().map(|l| l.to_candidate()).collect();
        debug!(instance_id, count = paths.len(), "Cached process group paths");
        let paths = Arc::new(paths);
        self.entries
            .write()
            .insert(instance_id.to_string(), Arc::clone(&paths));
        Ok(paths)
    }

    pub fn invalidate(&self, instance_id: &str) {
        if self.entries.write().remove(instance_id).is_some() {
            debug!(instance_id, "Invalidated process group paths");
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }
}

/// Parameter-context names per instance
#[derive(Default)]
pub struct ParameterContextCache {
    entries: RwLock<HashMap<InstanceId, Arc<Vec<String>>>>,
}

impl ParameterContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instance_id: &str) -> Option<Arc<Vec<String>>> {
        self.entries.read().get(instance_id).cloned()
    }

    pub async fn get_or_fetch(
        &self,
        instance_id: &str,
        client: &dyn DeploymentClient,
    ) -> Result<Arc<Vec<String>>, RemoteError> {
        if let Some(names) = self.get(instance_id) {
            return Ok(names);
        }
        let names = Arc::new(client.list_parameter_contexts(instance_id).await?);
        self.entries
            .write()
            .insert(instance_id.to_string(), Arc::clone(&names));
        Ok(names)
    }

    pub fn invalidate(&self, instance_id: &str) {
        self.entries.write().remove(instance_id);
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }
}
