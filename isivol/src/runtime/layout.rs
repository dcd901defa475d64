use std::path::{Component, Path, PathBuf};

use isivol_shared::constants::paths;
use isivol_shared::errors::{IsivolError, IsivolResult};

/// Maps volume names onto local mount points and remote NFS exports.
///
/// Both derivations are pure: the same name always yields the same paths,
/// regardless of whether the volume is mounted.
#[derive(Clone, Debug)]
pub struct VolumeLayout {
    mount_dir: PathBuf,
    /// NFS server, i.e. the cluster address without scheme or port
    export_host: String,
    dataset_prefix: String,
}

impl VolumeLayout {
    pub fn new(
        mount_dir: impl Into<PathBuf>,
        export_host: impl Into<String>,
        dataset_prefix: impl Into<String>,
    ) -> Self {
        let dataset_prefix: String = dataset_prefix.into();
        Self {
            mount_dir: mount_dir.into(),
            export_host: export_host.into(),
            dataset_prefix: dataset_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn mount_dir(&self) -> &Path {
        &self.mount_dir
    }

    /// Local mount point for a volume: `<mount_dir>/<name>`.
    pub fn mountpoint(&self, name: &str) -> PathBuf {
        self.mount_dir.join(name)
    }

    /// Directory of the volume on the cluster: `<dataset_prefix>/<name>`.
    pub fn dataset_path(&self, name: &str) -> String {
        format!("{}/{}", self.dataset_prefix, name)
    }

    /// NFS source handed to `mount`: `<host>:<dataset_prefix>/<name>`.
    pub fn remote_spec(&self, name: &str) -> String {
        format!("{}:{}", self.export_host, self.dataset_path(name))
    }

    /// Inverse of [`Self::mountpoint`] for paths directly under the mount dir.
    pub fn volume_name_of(&self, mountpoint: &Path) -> Option<String> {
        let rest = mountpoint.strip_prefix(&self.mount_dir).ok()?;
        let mut components = rest.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name.to_str().map(str::to_string),
            _ => None,
        }
    }

    /// Reject names that would not map to a distinct direct child of the
    /// mount directory, or that collide with the plugin's lock file.
    pub fn validate_name(name: &str) -> IsivolResult<()> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == name && name != paths::LOCK_FILE => {
                Ok(())
            }
            _ => Err(IsivolError::InvalidName(name.to_string())),
        }
    }
}
