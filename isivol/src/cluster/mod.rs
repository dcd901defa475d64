//! Remote volume service.
//!
//! The driver only needs two questions answered by the storage cluster: does a
//! backing directory exist for this volume, and create one if not.

mod client;

use async_trait::async_trait;
use isivol_shared::errors::IsivolResult;

pub use client::IsilonClient;

/// Cluster-side volume bookkeeping.
#[async_trait]
pub trait VolumeService: Send + Sync {
    /// Whether the backing dataset for `name` exists on the cluster.
    async fn exists(&self, name: &str) -> IsivolResult<bool>;

    /// Create the backing dataset for `name`.
    async fn create(&self, name: &str) -> IsivolResult<()>;
}
