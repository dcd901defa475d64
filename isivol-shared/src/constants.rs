//! Shared constants between the plugin library and the CLI.

/// Local and remote path defaults.
pub mod paths {
    /// Base directory under which volumes are mounted on the host
    pub const MOUNT_DIR: &str = "/var/lib/isilon/volumes";

    /// Dataset directory on the cluster that holds one directory per volume
    pub const DATASET_PREFIX: &str = "/ifs/data/docker/volumes";

    /// Unix socket Docker discovers the plugin through
    pub const PLUGIN_SOCKET: &str = "/run/docker/plugins/isilon.sock";

    /// Kernel mount table consulted during recovery
    pub const MOUNT_TABLE: &str = "/proc/self/mounts";

    /// Lock file held in the mount directory while a plugin is running
    pub const LOCK_FILE: &str = ".lock";
}

/// NFS mount parameters.
pub mod nfs {
    /// Filesystem type passed to `mount -t`
    pub const FS_TYPE: &str = "nfs";

    /// Read-write, ACLs disabled
    pub const MOUNT_OPTIONS: &str = "rw,noacl";
}

/// Cluster namespace API.
pub mod cluster {
    /// Default platform API port
    pub const DEFAULT_PORT: u16 = 8080;

    /// Prefix of the namespace (filesystem) API
    pub const NAMESPACE_PREFIX: &str = "/namespace";

    /// Header selecting the object type on PUT
    pub const TARGET_TYPE_HEADER: &str = "x-isi-ifs-target-type";

    /// Header selecting the access control of new directories
    pub const ACCESS_CONTROL_HEADER: &str = "x-isi-ifs-access-control";

    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Docker volume plugin protocol.
pub mod plugin {
    /// Content type every plugin response carries
    pub const CONTENT_TYPE: &str = "application/vnd.docker.plugins.v1.2+json";

    /// Subsystem advertised during activation
    pub const IMPLEMENTS: &str = "VolumeDriver";

    pub const ACTIVATE: &str = "/Plugin.Activate";
    pub const CREATE: &str = "/VolumeDriver.Create";
    pub const REMOVE: &str = "/VolumeDriver.Remove";
    pub const MOUNT: &str = "/VolumeDriver.Mount";
    pub const UNMOUNT: &str = "/VolumeDriver.Unmount";
    pub const PATH: &str = "/VolumeDriver.Path";
    pub const GET: &str = "/VolumeDriver.Get";
    pub const LIST: &str = "/VolumeDriver.List";
    pub const CAPABILITIES: &str = "/VolumeDriver.Capabilities";
}

/// Environment variables understood by the CLI.
pub mod envs {
    pub const CLUSTER_ADDRESS: &str = "ISIVOL_CLUSTER_ADDRESS";
    pub const CLUSTER_USERNAME: &str = "ISIVOL_CLUSTER_USERNAME";
    pub const CLUSTER_PASSWORD: &str = "ISIVOL_CLUSTER_PASSWORD";
    pub const MOUNT_DIR: &str = "ISIVOL_MOUNT_DIR";
    pub const SOCKET: &str = "ISIVOL_SOCKET";
}
