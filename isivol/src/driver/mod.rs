//! Volume lifecycle controller.
//!
//! [`VolumeDriver`] implements the plugin operations (create, mount, unmount,
//! remove, path, plus get/list) on top of the [`VolumeRegistry`], the cluster
//! [`VolumeService`] and a local [`MountExecutor`].
//!
//! **Locking**: every operation that reads or writes the registry holds one
//! driver-wide mutex for its whole duration, including remote and mount calls.
//! Two operations never interleave, even on unrelated volumes.
//!
//! Reference counting at the zero boundary: a volume unmounted by its last
//! consumer keeps a zero-count entry until `remove`, so `remove` still knows to
//! clean its directory. `mount` on such an entry mounts again and replaces it;
//! `unmount` on it fails as not mounted.

mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use isivol_shared::VolumeInfo;
use isivol_shared::errors::{IsivolError, IsivolResult};
use tokio::sync::Mutex;

use crate::cluster::{IsilonClient, VolumeService};
use crate::mount::{MountExecutor, NfsMounter, table};
use crate::runtime::{DriverOptions, VolumeLayout};

pub use registry::{Volume, VolumeRegistry};

pub struct VolumeDriver {
    layout: VolumeLayout,
    mount_options: String,
    cluster: Arc<dyn VolumeService>,
    mounter: Arc<dyn MountExecutor>,
    registry: Mutex<VolumeRegistry>,
}

impl VolumeDriver {
    pub fn new(
        layout: VolumeLayout,
        mount_options: impl Into<String>,
        cluster: Arc<dyn VolumeService>,
        mounter: Arc<dyn MountExecutor>,
    ) -> Self {
        Self {
            layout,
            mount_options: mount_options.into(),
            cluster,
            mounter,
            registry: Mutex::new(VolumeRegistry::new()),
        }
    }

    /// Build a driver talking to the configured cluster and mounting over NFS.
    pub fn from_options(options: &DriverOptions) -> IsivolResult<Self> {
        options.validate()?;
        let cluster = IsilonClient::new(&options.cluster, &options.dataset_prefix)?;
        Ok(Self::new(
            options.layout(),
            options.mount_options.clone(),
            Arc::new(cluster),
            Arc::new(NfsMounter::new()),
        ))
    }

    pub fn layout(&self) -> &VolumeLayout {
        &self.layout
    }

    /// Make sure the cluster has a backing dataset for `name`.
    ///
    /// A volume already known locally is not checked against the cluster.
    pub async fn create(&self, name: &str) -> IsivolResult<()> {
        tracing::info!(volume = %name, "Create");
        VolumeLayout::validate_name(name)?;
        let registry = self.registry.lock().await;
        let mountpoint = self.layout.mountpoint(name);

        if registry.get(&mountpoint).is_some() {
            tracing::debug!(volume = %name, "Volume already registered, skipping cluster check");
            return Ok(());
        }

        let exists = self.cluster.exists(name).await.map_err(|e| {
            tracing::warn!(volume = %name, error = %e, "Failed to check volume existence");
            IsivolError::VolumeCreate
        })?;

        if !exists {
            self.cluster.create(name).await.map_err(|e| {
                tracing::warn!(volume = %name, error = %e, "Failed to create volume on cluster");
                IsivolError::VolumeCreate
            })?;
            tracing::info!(volume = %name, dataset = %self.layout.dataset_path(name), "Created volume on cluster");
        }

        Ok(())
    }

    /// Attach a volume for one consumer and return its mount point.
    ///
    /// Only the first consumer triggers a real mount; later ones share it.
    pub async fn mount(&self, name: &str) -> IsivolResult<PathBuf> {
        tracing::info!(volume = %name, "Mount");
        VolumeLayout::validate_name(name)?;
        let mut registry = self.registry.lock().await;
        let mountpoint = self.layout.mountpoint(name);

        if let Some(volume) = registry.get_mut(&mountpoint) {
            if volume.is_mounted() {
                volume.connections += 1;
                tracing::debug!(
                    volume = %name,
                    connections = volume.connections,
                    "Volume already mounted, sharing"
                );
                return Ok(mountpoint);
            }
        }

        match tokio::fs::symlink_metadata(&mountpoint).await {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(IsivolError::NotADirectory(mountpoint));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::DirBuilder::new()
                    .recursive(true)
                    .mode(0o755)
                    .create(&mountpoint)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        let remote = self.layout.remote_spec(name);
        if let Err(e) = self
            .mounter
            .mount(&remote, &mountpoint, &self.mount_options)
            .await
        {
            tracing::error!(volume = %name, remote = %remote, error = %e, "Failed to mount volume");
            return Err(IsivolError::VolumeMount);
        }

        registry.put(mountpoint.clone(), Volume::mounted(name));
        Ok(mountpoint)
    }

    /// Release one consumer; the last one triggers the real unmount.
    ///
    /// A failed unmount leaves the count untouched so the call can be retried.
    pub async fn unmount(&self, name: &str) -> IsivolResult<()> {
        tracing::info!(volume = %name, "Unmount");
        VolumeLayout::validate_name(name)?;
        let mut registry = self.registry.lock().await;
        let mountpoint = self.layout.mountpoint(name);

        let Some(volume) = registry.get_mut(&mountpoint) else {
            return Err(IsivolError::NotMounted(mountpoint));
        };

        match volume.connections {
            0 => return Err(IsivolError::NotMounted(mountpoint)),
            1 => {
                if let Err(e) = self.mounter.unmount(&mountpoint).await {
                    tracing::error!(volume = %name, error = %e, "Failed to unmount volume");
                    return Err(IsivolError::VolumeUnmount);
                }
            }
            _ => {}
        }

        volume.connections -= 1;
        tracing::debug!(volume = %name, connections = volume.connections, "Released volume");
        Ok(())
    }

    /// Forget a volume and delete its local mount directory.
    ///
    /// Unknown volumes are a no-op. A volume shared by more than one consumer
    /// is refused.
    pub async fn remove(&self, name: &str) -> IsivolResult<()> {
        tracing::info!(volume = %name, "Remove");
        VolumeLayout::validate_name(name)?;
        let mut registry = self.registry.lock().await;
        let mountpoint = self.layout.mountpoint(name);

        let Some(volume) = registry.get(&mountpoint) else {
            tracing::debug!(volume = %name, "Volume not registered, nothing to remove");
            return Ok(());
        };

        if volume.connections > 1 {
            tracing::warn!(
                volume = %name,
                connections = volume.connections,
                "Remove attempted on a volume used by multiple containers"
            );
            return Err(IsivolError::InUse);
        }

        registry.remove(&mountpoint);

        match tokio::fs::remove_dir_all(&mountpoint).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!(
                    volume = %name,
                    mountpoint = %mountpoint.display(),
                    error = %e,
                    "Failed to delete volume directory"
                );
                Err(e.into())
            }
        }
    }

    /// Mount point for `name`. Pure; never consults the registry.
    ///
    /// The name is joined as given and not validated, so a name such as
    /// `../x` yields a path outside the mount directory. Such a path is only
    /// reported: every operation that touches the filesystem or the cluster
    /// rejects the same name with [`IsivolError::InvalidName`].
    pub fn path(&self, name: &str) -> PathBuf {
        self.layout.mountpoint(name)
    }

    pub async fn get(&self, name: &str) -> IsivolResult<VolumeInfo> {
        VolumeLayout::validate_name(name)?;
        let registry = self.registry.lock().await;
        let mountpoint = self.layout.mountpoint(name);

        registry
            .get(&mountpoint)
            .map(|volume| volume.to_info(&mountpoint))
            .ok_or_else(|| IsivolError::NotFound(name.to_string()))
    }

    /// Snapshot of all registered volumes, sorted by name.
    pub async fn list(&self) -> Vec<VolumeInfo> {
        let registry = self.registry.lock().await;
        let mut infos: Vec<VolumeInfo> = registry
            .iter()
            .map(|(mountpoint, volume)| volume.to_info(mountpoint))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Adopt NFS mounts left under the mount directory by a previous run.
    ///
    /// Each adopted volume gets one connection. Returns how many were adopted;
    /// an unreadable mount table adopts nothing.
    pub async fn recover(&self, mount_table: &Path) -> usize {
        let mounts = match table::read_mounts(mount_table).await {
            Ok(mounts) => mounts,
            Err(e) => {
                tracing::warn!(
                    path = %mount_table.display(),
                    error = %e,
                    "Failed to read mount table, skipping recovery"
                );
                return 0;
            }
        };

        let mut registry = self.registry.lock().await;
        let mut adopted = 0;

        for entry in mounts.into_iter().filter(|m| m.is_nfs()) {
            let Some(name) = self.layout.volume_name_of(&entry.target) else {
                continue;
            };
            if registry.get(&entry.target).is_some() {
                continue;
            }
            tracing::info!(volume = %name, source = %entry.source, "Recovered existing mount");
            registry.put(entry.target, Volume::mounted(name));
            adopted += 1;
        }

        tracing::info!(
            mount_dir = %self.layout.mount_dir().display(),
            count = adopted,
            "Recovery complete"
        );
        adopted
    }
}
