use std::sync::Arc;

use clap::Args;
use keywave_object_store::{
    AwsConfiguration, CloudObjectStoreFactory, ContainerName, ObjectStoreFactory,
    S3CompatibleConfiguration, StoreConfiguration,
};
use keywave_search::{ElasticsearchConfig, ElasticsearchIndex};
use object_store::ObjectStore;
use snafu::ResultExt;

use crate::error::{ContainerSnafu, ObjectStoreSnafu, Result, SearchIndexSnafu};

/// Arguments for configuring the source object store connection.
///
/// Credentials come from the standard environment variables
/// (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`).
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Source container (bucket) name.
    #[arg(long)]
    pub container: String,

    /// Endpoint of an S3-compatible store; AWS S3 is used when omitted.
    #[arg(long)]
    pub store_endpoint: Option<String>,

    /// Region override for the store.
    #[arg(long)]
    pub store_region: Option<String>,

    /// Allow plain-HTTP connections to the store endpoint.
    #[arg(long)]
    pub store_allow_http: bool,
}

impl StoreArgs {
    /// Create the object store client for the configured container.
    pub async fn object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        let container = ContainerName::new(&self.container).context(ContainerSnafu {})?;

        let configuration = match &self.store_endpoint {
            Some(endpoint) => StoreConfiguration::S3Compatible(S3CompatibleConfiguration {
                prefix: None,
                access_key_id: None,
                secret_access_key: None,
                endpoint: endpoint.clone(),
                region: self.store_region.clone(),
                allow_http: self.store_allow_http,
            }),
            None => StoreConfiguration::Aws(AwsConfiguration {
                region: self.store_region.clone(),
                ..Default::default()
            }),
        };

        let factory = CloudObjectStoreFactory::new(configuration);

        factory
            .create_object_store(&container)
            .await
            .context(ObjectStoreSnafu {})
    }
}

/// Arguments for configuring the search service connection.
#[derive(Args, Debug, Clone)]
pub struct SearchServiceArgs {
    /// Base URL of the search service.
    #[arg(long, default_value = "http://127.0.0.1:9200")]
    pub search_url: String,

    /// Username for basic authentication.
    #[arg(long, env = "SEARCH_USERNAME")]
    pub search_username: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "SEARCH_PASSWORD", hide_env_values = true)]
    pub search_password: Option<String>,

    /// Maximum idle connections kept per host.
    #[arg(long, default_value = "32")]
    pub search_pool_size: usize,
}

impl SearchServiceArgs {
    /// Create the search index client.
    pub fn search_index(&self) -> Result<ElasticsearchIndex> {
        ElasticsearchIndex::new(ElasticsearchConfig {
            base_url: self.search_url.clone(),
            username: self.search_username.clone(),
            password: self.search_password.clone(),
            pool_max_idle_per_host: self.search_pool_size,
        })
        .context(SearchIndexSnafu {})
    }
}
