//! Exclusive ownership of a mount directory.
//!
//! The registry assumes every volume mount point under `mount_dir` is its own,
//! so only one plugin process may serve a given directory. Ownership is an
//! advisory `flock` on `<mount_dir>/.lock`, released when [`PluginLock`] is
//! dropped or the process dies.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use isivol_shared::constants::paths;
use isivol_shared::errors::{IsivolError, IsivolResult};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

pub struct PluginLock {
    _flock: Flock<File>,
    path: PathBuf,
}

impl PluginLock {
    /// Take the lock for `mount_dir`, creating the directory if needed.
    ///
    /// Never blocks: a directory already served by another plugin is an error.
    pub fn acquire(mount_dir: &Path) -> IsivolResult<Self> {
        std::fs::create_dir_all(mount_dir).map_err(|e| {
            IsivolError::Config(format!(
                "failed to create mount dir {}: {}",
                mount_dir.display(),
                e
            ))
        })?;

        let path = mount_dir.join(paths::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                IsivolError::Config(format!("failed to open {}: {}", path.display(), e))
            })?;

        let flock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => flock,
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                return Err(IsivolError::Config(format!(
                    "Another isivol plugin is already managing: {}",
                    mount_dir.display()
                )));
            }
            Err((_, errno)) => {
                return Err(IsivolError::Config(format!(
                    "failed to lock {}: {}",
                    path.display(),
                    errno
                )));
            }
        };

        tracing::debug!(lock_path = %path.display(), "Acquired plugin lock");
        Ok(Self {
            _flock: flock,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PluginLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLock").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_file_lives_in_mount_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mount_dir = temp_dir.path().join("var/lib/isilon/volumes");

        let lock = PluginLock::acquire(&mount_dir).unwrap();

        assert!(mount_dir.is_dir());
        assert_eq!(lock.path(), mount_dir.join(".lock"));
        assert!(lock.path().is_file());
    }

    #[test]
    fn test_second_plugin_on_same_dir_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let _held = PluginLock::acquire(temp_dir.path()).unwrap();

        let err = PluginLock::acquire(temp_dir.path()).unwrap_err();
        assert!(matches!(err, IsivolError::Config(_)));
        assert!(err.to_string().contains("already managing"));
    }

    #[test]
    fn test_distinct_mount_dirs_lock_independently() {
        let temp_dir = TempDir::new().unwrap();
        let _a = PluginLock::acquire(&temp_dir.path().join("a")).unwrap();
        let _b = PluginLock::acquire(&temp_dir.path().join("b")).unwrap();
    }

    #[test]
    fn test_dropping_lock_frees_dir_for_next_plugin() {
        let temp_dir = TempDir::new().unwrap();
        drop(PluginLock::acquire(temp_dir.path()).unwrap());

        PluginLock::acquire(temp_dir.path()).unwrap();
    }
}
