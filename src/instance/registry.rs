//! Instance registry.
//!
//! Holds the in-memory descriptor set and loads it from the repository port
//! once, on first use. `reload` is the explicit invalidation.

use crate::error::ApiError;
use crate::hierarchy::{FlowRecord, Hierarchy};
use crate::instance::repository::InstanceRepository;
use crate::instance::resolver::{resolve_instance, InstanceDescriptor};
use crate::types::Side;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct InstanceRegistry {
    descriptors: Vec<InstanceDescriptor>,
    repository: Arc<dyn InstanceRepository>,
    loaded: bool,
}

impl InstanceRegistry {
    pub fn with_repository(repository: Arc<dyn InstanceRepository>) -> Self {
        Self {
            descriptors: Vec::new(),
            repository,
            loaded: false,
        }
    }

    /// Load descriptors from the repository if that has not happened yet.
    pub fn ensure_loaded(&mut self) -> Result<(), ApiError> {
        if self.loaded {
            return Ok(());
        }
        self.descriptors.clear();
        for descriptor in self.repository.list()? {
            if let Err(e) = self.register(descriptor) {
                warn!("Skipping instance descriptor: {}", e);
            }
        }
        self.loaded = true;
        debug!(count = self.descriptors.len(), "Loaded instance descriptors");
        Ok(())
    }

    /// Drop the loaded set and read the repository again.
    pub fn reload(&mut self) -> Result<(), ApiError> {
        self.loaded = false;
        self.ensure_loaded()
    }

    /// Add a descriptor; at most one per `(level name, level value)` pair.
    pub fn register(&mut self, descriptor: InstanceDescriptor) -> Result<(), ApiError> {
        if let Some(existing) = resolve_instance(
            &descriptor.hierarchy_level_name,
            &descriptor.hierarchy_level_value,
            &self.descriptors,
        ) {
            return Err(ApiError::ValidationError(format!(
                "Instance {} already serves {}={} (rejected {})",
                existing.id,
                descriptor.hierarchy_level_name,
                descriptor.hierarchy_level_value,
                descriptor.id
            )));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn list(&self) -> &[InstanceDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, instance_id: &str) -> Option<&InstanceDescriptor> {
        self.descriptors.iter().find(|d| d.id == instance_id)
    }

    pub fn resolve(&self, level_name: &str, level_value: &str) -> Option<&InstanceDescriptor> {
        resolve_instance(level_name, level_value, &self.descriptors)
    }

    /// Resolve the instance for one side of a flow from its top-level value.
    pub fn resolve_for_flow(
        &self,
        hierarchy: &Hierarchy,
        flow: &FlowRecord,
        side: Side,
    ) -> Option<&InstanceDescriptor> {
        let top = hierarchy.top()?;
        let value = flow.value(&top.name, side);
        if value.is_empty() {
            return None;
        }
        self.resolve(&top.name, value)
    }
}
