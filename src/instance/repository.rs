//! Instance repository port and the configuration-backed adapter.

use crate::error::ApiError;
use crate::instance::resolver::InstanceDescriptor;

/// Source of instance descriptors
pub trait InstanceRepository: Send + Sync {
    fn list(&self) -> Result<Vec<InstanceDescriptor>, ApiError>;
}

/// Descriptors declared in the loaded configuration
pub struct ConfigInstanceRepository {
    descriptors: Vec<InstanceDescriptor>,
}

impl ConfigInstanceRepository {
    pub fn new(descriptors: Vec<InstanceDescriptor>) -> Self {
        Self { descriptors }
    }
}

impl InstanceRepository for ConfigInstanceRepository {
    fn list(&self) -> Result<Vec<InstanceDescriptor>, ApiError> {
        Ok(self.descriptors.clone())
    }
}
