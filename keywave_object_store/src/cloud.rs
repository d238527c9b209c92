//! Cloud object store factory implementation.
//!
//! This module provides a `CloudObjectStoreFactory` that creates object store instances
//! for AWS S3 and S3-compatible storage using the official object_store crate builders.

use std::sync::Arc;

use object_store::{Error as ObjectStoreError, ObjectStore, prefix::PrefixStore};
use snafu::Snafu;

use crate::{ContainerName, ObjectStoreFactory};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to create {store_type} object store: {message}"))]
    Creation {
        store_type: &'static str,
        message: String,
        source: ObjectStoreError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Object store configuration.
///
/// Credentials left as `None` fall back to the standard environment
/// variables understood by the object_store builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfiguration {
    /// AWS S3 object store configuration.
    Aws(AwsConfiguration),
    /// S3-compatible storage object store configuration.
    S3Compatible(S3CompatibleConfiguration),
}

/// AWS S3 object store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsConfiguration {
    /// Key prefix applied to every request.
    pub prefix: Option<String>,
    /// `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `AWS_DEFAULT_REGION`
    pub region: Option<String>,
}

/// S3-compatible storage object store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3CompatibleConfiguration {
    /// Key prefix applied to every request.
    pub prefix: Option<String>,
    /// `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `AWS_ENDPOINT`
    pub endpoint: String,
    /// `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// Allow HTTP connections (for MinIO-style deployments).
    pub allow_http: bool,
}

/// Factory for creating cloud object store instances.
///
/// This factory creates object store instances using the official object_store
/// crate builders. It supports AWS S3 and S3-compatible storage providers.
pub struct CloudObjectStoreFactory {
    configuration: StoreConfiguration,
}

impl CloudObjectStoreFactory {
    pub fn new(configuration: StoreConfiguration) -> Self {
        Self { configuration }
    }
}

#[async_trait::async_trait]
impl ObjectStoreFactory for CloudObjectStoreFactory {
    async fn create_object_store(
        &self,
        container: &ContainerName,
    ) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
        let store: Arc<dyn ObjectStore> = match &self.configuration {
            StoreConfiguration::Aws(config) => {
                create_aws_s3_store(config, container).map_err(ObjectStoreError::from)?
            }
            StoreConfiguration::S3Compatible(config) => {
                create_s3_compatible_store(config, container).map_err(ObjectStoreError::from)?
            }
        };

        Ok(store)
    }
}

/// Create AWS S3 object store
fn create_aws_s3_store(
    config: &AwsConfiguration,
    container: &ContainerName,
) -> Result<Arc<dyn ObjectStore>> {
    use object_store::aws::AmazonS3Builder;

    let mut builder = AmazonS3Builder::from_env().with_bucket_name(container.as_str());

    if let Some(access_key_id) = &config.access_key_id {
        builder = builder.with_access_key_id(access_key_id);
    }

    if let Some(secret_access_key) = &config.secret_access_key {
        builder = builder.with_secret_access_key(secret_access_key);
    }

    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }

    let store = builder.build().map_err(|e| Error::Creation {
        store_type: "AWS S3",
        message: "Failed to build AWS S3 object store".to_string(),
        source: e,
    })?;

    let Some(prefix) = &config.prefix else {
        return Ok(Arc::new(store));
    };

    let store = PrefixStore::new(store, prefix.as_str());
    Ok(Arc::new(store))
}

/// Create S3-compatible object store
fn create_s3_compatible_store(
    config: &S3CompatibleConfiguration,
    container: &ContainerName,
) -> Result<Arc<dyn ObjectStore>> {
    use object_store::aws::AmazonS3Builder;

    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(container.as_str())
        .with_endpoint(&config.endpoint)
        .with_allow_http(config.allow_http);

    if let Some(access_key_id) = &config.access_key_id {
        builder = builder.with_access_key_id(access_key_id);
    }

    if let Some(secret_access_key) = &config.secret_access_key {
        builder = builder.with_secret_access_key(secret_access_key);
    }

    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }

    let store = builder.build().map_err(|e| Error::Creation {
        store_type: "S3-compatible",
        message: "Failed to build S3-compatible object store".to_string(),
        source: e,
    })?;

    let Some(prefix) = &config.prefix else {
        return Ok(Arc::new(store));
    };

    let store = PrefixStore::new(store, prefix.as_str());
    Ok(Arc::new(store))
}

impl From<Error> for ObjectStoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Creation { source, .. } => source,
        }
    }
}
