//! Local mount execution.
//!
//! - [`MountExecutor`]: mount/unmount seam used by the driver
//! - [`NfsMounter`]: production executor for NFS exports
//! - [`table`]: kernel mount table parsing for startup recovery

mod nfs;
pub mod table;

use std::path::Path;

use async_trait::async_trait;
use isivol_shared::errors::IsivolResult;

pub use nfs::NfsMounter;

/// Attaches and detaches remote filesystems on local mount points.
#[async_trait]
pub trait MountExecutor: Send + Sync {
    /// Mount `remote` onto `target` with comma-separated `options`.
    async fn mount(&self, remote: &str, target: &Path, options: &str) -> IsivolResult<()>;

    /// Unmount whatever is mounted on `target`.
    async fn unmount(&self, target: &Path) -> IsivolResult<()>;
}
