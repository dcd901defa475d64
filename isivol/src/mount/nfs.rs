//! NFS mount helper.

use std::path::Path;

use async_trait::async_trait;
use isivol_shared::constants::nfs;
use isivol_shared::errors::{IsivolError, IsivolResult};
use tokio::process::Command;

use super::MountExecutor;

/// Mounts NFS exports through `mount(8)` and the `mount.nfs` helper;
/// unmounts with `umount(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NfsMounter;

impl NfsMounter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MountExecutor for NfsMounter {
    async fn mount(&self, remote: &str, target: &Path, options: &str) -> IsivolResult<()> {
        tracing::info!("Mounting nfs: {} → {}", remote, target.display());

        let output = Command::new("mount")
            .arg("-t")
            .arg(nfs::FS_TYPE)
            .arg("-o")
            .arg(options)
            .arg(remote)
            .arg(target)
            .output()
            .await
            .map_err(|e| IsivolError::Mount(format!("failed to run mount: {}", e)))?;

        if !output.status.success() {
            return Err(IsivolError::Mount(format!(
                "mount {} on {} failed ({}): {}",
                remote,
                target.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::info!("Mounted nfs: {} → {}", remote, target.display());
        Ok(())
    }

    async fn unmount(&self, target: &Path) -> IsivolResult<()> {
        tracing::info!("Unmounting {}", target.display());

        let path = target.to_path_buf();
        tokio::task::spawn_blocking(move || nix::mount::umount(path.as_path()))
            .await
            .map_err(|e| IsivolError::Internal(format!("unmount task failed: {}", e)))?
            .map_err(|e| {
                IsivolError::Mount(format!("failed to unmount {}: {}", target.display(), e))
            })?;

        tracing::info!("Unmounted {}", target.display());
        Ok(())
    }
}
