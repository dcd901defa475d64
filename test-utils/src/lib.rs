//! Test doubles for the driver's collaborators.
//!
//! [`FakeCluster`] and [`FakeMounter`] record every call and can be told to
//! fail; [`DriverFixture`] wires them into a [`VolumeDriver`] rooted in a
//! temporary mount directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use isivol::{MountExecutor, VolumeDriver, VolumeLayout, VolumeService};
use isivol_shared::errors::{IsivolError, IsivolResult};
use parking_lot::Mutex;
use tempfile::TempDir;

pub const CLUSTER_ADDRESS: &str = "10.0.0.5";
pub const DATASET_PREFIX: &str = "/ifs/data/docker/volumes";
pub const MOUNT_OPTIONS: &str = "rw,noacl";

/// In-memory cluster.
#[derive(Default)]
pub struct FakeCluster {
    volumes: Mutex<HashSet<String>>,
    exists_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_exists: AtomicBool,
    fail_create: AtomicBool,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` was provisioned out of band.
    pub fn seed(&self, name: &str) {
        self.volumes.lock().insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.volumes.lock().contains(name)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VolumeService for FakeCluster {
    async fn exists(&self, name: &str) -> IsivolResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(IsivolError::Cluster("connection refused".into()));
        }
        Ok(self.contains(name))
    }

    async fn create(&self, name: &str) -> IsivolResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(IsivolError::Cluster("403 Forbidden".into()));
        }
        self.seed(name);
        Ok(())
    }
}

/// One recorded `mount` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountCall {
    pub remote: String,
    pub target: PathBuf,
    pub options: String,
}

/// Mount executor that records calls instead of touching the kernel.
#[derive(Default)]
pub struct FakeMounter {
    mounts: Mutex<Vec<MountCall>>,
    unmounts: Mutex<Vec<PathBuf>>,
    fail_mount: AtomicBool,
    fail_unmount: AtomicBool,
    delay: Option<Duration>,
}

impl FakeMounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call take `delay`, widening race windows in concurrency tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn mounts(&self) -> Vec<MountCall> {
        self.mounts.lock().clone()
    }

    pub fn unmounts(&self) -> Vec<PathBuf> {
        self.unmounts.lock().clone()
    }

    pub fn fail_mount(&self, fail: bool) {
        self.fail_mount.store(fail, Ordering::SeqCst);
    }

    pub fn fail_unmount(&self, fail: bool) {
        self.fail_unmount.store(fail, Ordering::SeqCst);
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MountExecutor for FakeMounter {
    async fn mount(&self, remote: &str, target: &Path, options: &str) -> IsivolResult<()> {
        if self.fail_mount.load(Ordering::SeqCst) {
            return Err(IsivolError::Mount("mount.nfs: access denied by server".into()));
        }
        // Recorded before the delay, like a kernel mount that already
        // happened while the command is still reporting back.
        self.mounts.lock().push(MountCall {
            remote: remote.to_string(),
            target: target.to_path_buf(),
            options: options.to_string(),
        });
        self.pause().await;
        Ok(())
    }

    async fn unmount(&self, target: &Path) -> IsivolResult<()> {
        if self.fail_unmount.load(Ordering::SeqCst) {
            return Err(IsivolError::Mount("umount: target is busy".into()));
        }
        self.unmounts.lock().push(target.to_path_buf());
        self.pause().await;
        Ok(())
    }
}

/// Driver wired to fakes, with a temporary mount directory.
pub struct DriverFixture {
    pub driver: Arc<VolumeDriver>,
    pub cluster: Arc<FakeCluster>,
    pub mounter: Arc<FakeMounter>,
    pub mount_dir: PathBuf,
    _temp_dir: TempDir, // Dropped after test
}

impl DriverFixture {
    pub fn new() -> Self {
        Self::with_mounter(FakeMounter::new())
    }

    pub fn with_mounter(mounter: FakeMounter) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mount_dir = temp_dir.path().join("volumes");
        let cluster = Arc::new(FakeCluster::new());
        let mounter = Arc::new(mounter);

        let layout = VolumeLayout::new(mount_dir.clone(), CLUSTER_ADDRESS, DATASET_PREFIX);
        let driver = Arc::new(VolumeDriver::new(
            layout,
            MOUNT_OPTIONS,
            cluster.clone(),
            mounter.clone(),
        ));

        Self {
            driver,
            cluster,
            mounter,
            mount_dir,
            _temp_dir: temp_dir,
        }
    }

    pub fn mountpoint(&self, name: &str) -> PathBuf {
        self.mount_dir.join(name)
    }

    pub fn remote_spec(&self, name: &str) -> String {
        format!("{}:{}/{}", CLUSTER_ADDRESS, DATASET_PREFIX, name)
    }
}

impl Default for DriverFixture {
    fn default() -> Self {
        Self::new()
    }
}
