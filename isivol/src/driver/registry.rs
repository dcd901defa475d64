//! In-memory volume registry.
//!
//! Maps a local mount point to the volume mounted there. The registry does no
//! locking of its own; it is only reachable through [`super::VolumeDriver`],
//! which keeps it behind the driver-wide mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use isivol_shared::VolumeInfo;

/// One mountable unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    /// Name known to the cluster and to the orchestrator.
    pub name: String,
    /// Consumers currently holding the volume mounted.
    pub connections: usize,
}

impl Volume {
    /// Entry for a volume that was just mounted by its first consumer.
    pub fn mounted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connections: 1,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.connections > 0
    }

    pub fn to_info(&self, mountpoint: &Path) -> VolumeInfo {
        VolumeInfo {
            name: self.name.clone(),
            mountpoint: mountpoint.display().to_string(),
            connections: self.connections,
        }
    }
}

/// Mount point -> volume mapping.
#[derive(Debug, Default)]
pub struct VolumeRegistry {
    volumes: HashMap<PathBuf, Volume>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mountpoint: &Path) -> Option<&Volume> {
        self.volumes.get(mountpoint)
    }

    pub fn get_mut(&mut self, mountpoint: &Path) -> Option<&mut Volume> {
        self.volumes.get_mut(mountpoint)
    }

    /// Insert or replace the entry for a mount point.
    pub fn put(&mut self, mountpoint: PathBuf, volume: Volume) {
        tracing::debug!(
            mountpoint = %mountpoint.display(),
            volume = %volume.name,
            connections = volume.connections,
            "Registering volume"
        );
        self.volumes.insert(mountpoint, volume);
    }

    /// Remove the entry for a mount point; no-op when absent.
    pub fn remove(&mut self, mountpoint: &Path) -> Option<Volume> {
        let removed = self.volumes.remove(mountpoint);
        if removed.is_some() {
            tracing::debug!(mountpoint = %mountpoint.display(), "Removed volume from registry");
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Volume)> {
        self.volumes.iter()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}
