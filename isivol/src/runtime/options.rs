//! Configuration for the Isivol plugin.

use std::path::{Path, PathBuf};

use isivol_shared::constants::{cluster as const_cluster, nfs, paths};
use isivol_shared::errors::{IsivolError, IsivolResult};
use serde::{Deserialize, Serialize};

use super::layout::VolumeLayout;

/// Connection settings for the cluster's REST API.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Cluster host name or IP; also used as the NFS server.
    #[serde(default)]
    pub address: String,

    /// Platform API port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Accept the self-signed certificate clusters ship with.
    ///
    /// Default: true
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Per-request timeout for API calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    const_cluster::DEFAULT_PORT
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    const_cluster::DEFAULT_TIMEOUT_SECS
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            accept_invalid_certs: default_accept_invalid_certs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Plugin-wide options, fixed once the driver is constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverOptions {
    #[serde(default)]
    pub cluster: ClusterOptions,

    /// Local base directory; each volume is mounted at `<mount_dir>/<name>`.
    #[serde(default = "default_mount_dir")]
    pub mount_dir: PathBuf,

    /// Directory on the cluster holding one sub-directory per volume.
    #[serde(default = "default_dataset_prefix")]
    pub dataset_prefix: String,

    /// Options passed to `mount -o`.
    #[serde(default = "default_mount_options")]
    pub mount_options: String,

    /// Unix socket the plugin server listens on.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Directory for rotated log files. Logs go to stderr only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Adopt NFS mounts already present under `mount_dir` at startup.
    ///
    /// Default: false
    #[serde(default)]
    pub recover_mounts: bool,
}

fn default_mount_dir() -> PathBuf {
    PathBuf::from(paths::MOUNT_DIR)
}

fn default_dataset_prefix() -> String {
    paths::DATASET_PREFIX.to_string()
}

fn default_mount_options() -> String {
    nfs::MOUNT_OPTIONS.to_string()
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(paths::PLUGIN_SOCKET)
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            cluster: ClusterOptions::default(),
            mount_dir: default_mount_dir(),
            dataset_prefix: default_dataset_prefix(),
            mount_options: default_mount_options(),
            socket_path: default_socket_path(),
            log_dir: None,
            recover_mounts: false,
        }
    }
}

impl DriverOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> IsivolResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IsivolError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            IsivolError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Check preconditions the driver relies on.
    pub fn validate(&self) -> IsivolResult<()> {
        if !self.mount_dir.is_absolute() {
            return Err(IsivolError::Config(format!(
                "mount_dir must be an absolute path, got: {}",
                self.mount_dir.display()
            )));
        }
        if !self.dataset_prefix.starts_with('/') {
            return Err(IsivolError::Config(format!(
                "dataset_prefix must start with '/', got: {}",
                self.dataset_prefix
            )));
        }
        if self.cluster.address.trim().is_empty() {
            return Err(IsivolError::Config("cluster address is required".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> VolumeLayout {
        VolumeLayout::new(
            self.mount_dir.clone(),
            self.cluster.address.clone(),
            self.dataset_prefix.clone(),
        )
    }
}
