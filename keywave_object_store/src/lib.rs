//! Object store factory for creating ObjectStore instances from runtime configuration.
//!
//! This module provides the `ObjectStoreFactory` trait that allows components to create
//! `ObjectStore` clients dynamically from a container name and a store configuration.
//!
//! The factory abstracts away the details of how to instantiate the object store, so
//! the ingestion pipeline only ever sees an `Arc<dyn ObjectStore>` handle.

pub mod cloud;
pub mod local;

use std::fmt;
use std::sync::Arc;

use object_store::ObjectStore;
use snafu::Snafu;

pub use cloud::{
    AwsConfiguration, CloudObjectStoreFactory, S3CompatibleConfiguration, StoreConfiguration,
};
pub use local::{LocalFileSystemFactory, TemporaryFileSystemFactory};

/// Name of a container (bucket) in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

#[derive(Debug, Snafu)]
#[snafu(display("invalid container name: {name}"))]
pub struct InvalidContainerName {
    pub name: String,
}

impl ContainerName {
    /// Validate and create a container name.
    ///
    /// Container names follow the common bucket naming rules: lower-case
    /// alphanumeric characters, dashes and dots.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidContainerName> {
        let name = name.into();

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');

        if !valid {
            return Err(InvalidContainerName { name });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Factory trait for creating ObjectStore instances for a container.
#[async_trait::async_trait]
pub trait ObjectStoreFactory: Send + Sync {
    /// Create an ObjectStore instance scoped to the given container.
    async fn create_object_store(
        &self,
        container: &ContainerName,
    ) -> Result<Arc<dyn ObjectStore>, object_store::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_name_accepts_bucket_style_names() {
        for name in ["archive-data", "a", "my.bucket.01"] {
            assert!(ContainerName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_container_name_rejects_invalid_names() {
        for name in ["", "Archive", "has space", "under_score", "slash/name"] {
            assert!(ContainerName::new(name).is_err(), "{name} should be invalid");
        }
    }
}
