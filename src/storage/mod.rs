pub mod local;
pub mod provider;
pub mod remote;

pub use local::*;
pub use provider::*;
pub use remote::*;

use std::sync::Arc;

use crate::config::{BlobBackend, StorageConfig};

/// Build the blob store selected by configuration.
///
/// Called once at startup; the returned store is shared read-only across all
/// requests.
pub fn build_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.backend {
        BlobBackend::Local => Ok(Arc::new(LocalBlobStore::new(config.local_path.clone()))),
        BlobBackend::Remote => {
            if config.endpoint.is_empty() {
                anyhow::bail!("remote blob backend requires storage.endpoint");
            }
            Ok(Arc::new(RemoteBlobStore::new(
                &config.endpoint,
                &config.project,
                &config.api_key,
            )))
        }
    }
}
