//! Integration tests for the volume lifecycle (create, mount, unmount, remove, path).

use isivol::runtime::PluginLock;
use isivol_shared::errors::IsivolError;
use isivol_test_utils::{DriverFixture, MOUNT_OPTIONS, MountCall};

// ============================================================================
// CREATE
// ============================================================================

#[tokio::test]
async fn create_provisions_missing_volume() {
    let fx = DriverFixture::new();

    fx.driver.create("vol1").await.unwrap();

    assert_eq!(fx.cluster.exists_calls(), 1);
    assert_eq!(fx.cluster.create_calls(), 1);
    assert!(fx.cluster.contains("vol1"));
}

#[tokio::test]
async fn create_skips_existing_cluster_volume() {
    let fx = DriverFixture::new();
    fx.cluster.seed("vol1");

    fx.driver.create("vol1").await.unwrap();

    assert_eq!(fx.cluster.exists_calls(), 1);
    assert_eq!(fx.cluster.create_calls(), 0);
}

#[tokio::test]
async fn create_twice_creates_remotely_once() {
    let fx = DriverFixture::new();

    fx.driver.create("vol1").await.unwrap();
    fx.driver.create("vol1").await.unwrap();

    assert_eq!(fx.cluster.create_calls(), 1);
}

#[tokio::test]
async fn create_for_registered_volume_skips_cluster() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();

    fx.driver.create("vol1").await.unwrap();

    assert_eq!(fx.cluster.exists_calls(), 0);
    assert_eq!(fx.cluster.create_calls(), 0);
}

#[tokio::test]
async fn create_maps_existence_failure_to_generic_error() {
    let fx = DriverFixture::new();
    fx.cluster.fail_exists(true);

    let err = fx.driver.create("vol1").await.unwrap_err();

    assert!(matches!(err, IsivolError::VolumeCreate));
    assert_eq!(err.to_string(), "failed to create volume");
    assert_eq!(fx.cluster.create_calls(), 0);
    assert!(fx.driver.list().await.is_empty());
}

#[tokio::test]
async fn create_maps_creation_failure_to_generic_error() {
    let fx = DriverFixture::new();
    fx.cluster.fail_create(true);

    let err = fx.driver.create("vol1").await.unwrap_err();

    assert_eq!(err.to_string(), "failed to create volume");
    assert!(!fx.cluster.contains("vol1"));
}

#[tokio::test]
async fn create_rejects_names_escaping_mount_dir() {
    let fx = DriverFixture::new();

    for name in ["", "..", "a/b", "../etc"] {
        let err = fx.driver.create(name).await.unwrap_err();
        assert!(matches!(err, IsivolError::InvalidName(_)), "{name:?}");
    }
    assert_eq!(fx.cluster.exists_calls(), 0);
}

// ============================================================================
// MOUNT / UNMOUNT
// ============================================================================

#[tokio::test]
async fn mount_refuses_lock_file_name() {
    let fx = DriverFixture::new();
    let _lock = PluginLock::acquire(&fx.mount_dir).unwrap();

    let err = fx.driver.mount(".lock").await.unwrap_err();

    assert!(matches!(err, IsivolError::InvalidName(_)));
    assert!(fx.mounter.mounts().is_empty());
    assert!(fx.mountpoint(".lock").is_file());
}

#[tokio::test]
async fn mount_creates_directory_and_mounts_once() {
    let fx = DriverFixture::new();

    let path = fx.driver.mount("vol1").await.unwrap();

    assert_eq!(path, fx.mountpoint("vol1"));
    assert!(path.is_dir());
    assert_eq!(
        fx.mounter.mounts(),
        vec![MountCall {
            remote: fx.remote_spec("vol1"),
            target: fx.mountpoint("vol1"),
            options: MOUNT_OPTIONS.to_string(),
        }]
    );

    let info = fx.driver.get("vol1").await.unwrap();
    assert_eq!(info.connections, 1);
}

#[tokio::test]
async fn shared_mount_lifecycle() {
    let fx = DriverFixture::new();

    let first = fx.driver.mount("vol1").await.unwrap();
    let second = fx.driver.mount("vol1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fx.mounter.mounts().len(), 1);
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 2);

    fx.driver.unmount("vol1").await.unwrap();
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 1);
    assert!(fx.mounter.unmounts().is_empty());

    fx.driver.unmount("vol1").await.unwrap();
    assert_eq!(fx.mounter.unmounts(), vec![fx.mountpoint("vol1")]);
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 0);
}

#[tokio::test]
async fn mount_reuses_existing_directory() {
    let fx = DriverFixture::new();
    std::fs::create_dir_all(fx.mountpoint("vol1")).unwrap();

    fx.driver.mount("vol1").await.unwrap();

    assert_eq!(fx.mounter.mounts().len(), 1);
}

#[tokio::test]
async fn mount_rejects_regular_file_at_mountpoint() {
    let fx = DriverFixture::new();
    std::fs::create_dir_all(&fx.mount_dir).unwrap();
    std::fs::write(fx.mountpoint("vol2"), b"not a directory").unwrap();

    let err = fx.driver.mount("vol2").await.unwrap_err();

    assert!(matches!(err, IsivolError::NotADirectory(_)));
    assert!(
        err.to_string()
            .contains("already exists and is not a directory")
    );
    assert!(fx.mounter.mounts().is_empty());
    assert!(fx.driver.get("vol2").await.is_err());
}

#[tokio::test]
async fn mount_failure_does_not_register() {
    let fx = DriverFixture::new();
    fx.mounter.fail_mount(true);

    let err = fx.driver.mount("vol1").await.unwrap_err();

    assert_eq!(err.to_string(), "failed to mount volume");
    assert!(fx.driver.list().await.is_empty());

    // A later attempt mounts from scratch.
    fx.mounter.fail_mount(false);
    fx.driver.mount("vol1").await.unwrap();
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 1);
}

#[tokio::test]
async fn mount_after_full_unmount_mounts_again() {
    let fx = DriverFixture::new();

    fx.driver.mount("vol1").await.unwrap();
    fx.driver.unmount("vol1").await.unwrap();
    fx.driver.mount("vol1").await.unwrap();

    assert_eq!(fx.mounter.mounts().len(), 2);
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 1);
}

#[tokio::test]
async fn unmount_unknown_volume_fails() {
    let fx = DriverFixture::new();

    let err = fx.driver.unmount("ghost").await.unwrap_err();

    assert!(matches!(err, IsivolError::NotMounted(_)));
    assert!(err.to_string().starts_with("unable to find volume mounted on"));
}

#[tokio::test]
async fn unmount_more_than_mounted_never_goes_negative() {
    let fx = DriverFixture::new();

    fx.driver.mount("vol1").await.unwrap();
    fx.driver.unmount("vol1").await.unwrap();

    let err = fx.driver.unmount("vol1").await.unwrap_err();
    assert!(matches!(err, IsivolError::NotMounted(_)));
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 0);
    assert_eq!(fx.mounter.unmounts().len(), 1);
}

#[tokio::test]
async fn unmount_failure_keeps_count_for_retry() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();
    fx.mounter.fail_unmount(true);

    let err = fx.driver.unmount("vol1").await.unwrap_err();
    assert_eq!(err.to_string(), "failed to unmount volume");
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 1);

    fx.mounter.fail_unmount(false);
    fx.driver.unmount("vol1").await.unwrap();
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 0);
}

// ============================================================================
// REMOVE
// ============================================================================

#[tokio::test]
async fn remove_unknown_volume_is_noop() {
    let fx = DriverFixture::new();
    fx.driver.remove("ghost").await.unwrap();
}

#[tokio::test]
async fn remove_refuses_shared_volume() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();
    fx.driver.mount("vol1").await.unwrap();

    let err = fx.driver.remove("vol1").await.unwrap_err();

    assert!(matches!(err, IsivolError::InUse));
    assert_eq!(err.to_string(), "volume in use by other containers");
    assert_eq!(fx.driver.get("vol1").await.unwrap().connections, 2);
    assert!(fx.mountpoint("vol1").is_dir());
}

#[tokio::test]
async fn remove_after_unmount_deletes_directory() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();
    fx.driver.unmount("vol1").await.unwrap();
    std::fs::write(fx.mountpoint("vol1").join("leftover"), b"data").unwrap();

    fx.driver.remove("vol1").await.unwrap();

    assert!(!fx.mountpoint("vol1").exists());
    assert!(fx.driver.get("vol1").await.is_err());
    let err = fx.driver.unmount("vol1").await.unwrap_err();
    assert!(matches!(err, IsivolError::NotMounted(_)));
}

#[tokio::test]
async fn remove_with_single_consumer_is_allowed() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();

    fx.driver.remove("vol1").await.unwrap();

    assert!(fx.driver.list().await.is_empty());
    assert!(!fx.mountpoint("vol1").exists());
}

#[tokio::test]
async fn remove_tolerates_missing_directory() {
    let fx = DriverFixture::new();
    fx.driver.mount("vol1").await.unwrap();
    fx.driver.unmount("vol1").await.unwrap();
    std::fs::remove_dir(fx.mountpoint("vol1")).unwrap();

    fx.driver.remove("vol1").await.unwrap();
    assert!(fx.driver.list().await.is_empty());
}

// ============================================================================
// PATH / GET / LIST
// ============================================================================

#[tokio::test]
async fn path_is_pure_and_stable() {
    let fx = DriverFixture::new();

    let before = fx.driver.path("vol1");
    fx.driver.mount("vol1").await.unwrap();
    let during = fx.driver.path("vol1");
    fx.driver.unmount("vol1").await.unwrap();
    fx.driver.remove("vol1").await.unwrap();
    let after = fx.driver.path("vol1");

    assert_eq!(before, fx.mountpoint("vol1"));
    assert_eq!(before, during);
    assert_eq!(during, after);

    let _ = fx.driver.path("never-mounted");
    assert!(fx.driver.list().await.is_empty());
    assert_eq!(fx.cluster.exists_calls(), 0);
}

#[tokio::test]
async fn path_reports_invalid_names_without_acting_on_them() {
    let fx = DriverFixture::new();

    assert_eq!(fx.driver.path("../x"), fx.mount_dir.join("../x"));

    for name in ["../x", "/etc"] {
        let err = fx.driver.mount(name).await.unwrap_err();
        assert!(matches!(err, IsivolError::InvalidName(_)), "{name:?}");
        let err = fx.driver.remove(name).await.unwrap_err();
        assert!(matches!(err, IsivolError::InvalidName(_)), "{name:?}");
    }
    assert!(fx.mounter.mounts().is_empty());
    assert!(!fx.mount_dir.exists());
}

#[tokio::test]
async fn list_is_sorted_snapshot() {
    let fx = DriverFixture::new();
    fx.driver.mount("zeta").await.unwrap();
    fx.driver.mount("alpha").await.unwrap();
    fx.driver.mount("alpha").await.unwrap();

    let list = fx.driver.list().await;

    let names: Vec<_> = list.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["alpha", "zeta"]);
    assert_eq!(list[0].connections, 2);
    assert_eq!(list[0].mountpoint, fx.mountpoint("alpha").display().to_string());
}

#[tokio::test]
async fn get_unknown_volume_is_not_found() {
    let fx = DriverFixture::new();

    let err = fx.driver.get("ghost").await.unwrap_err();
    assert_eq!(err.to_string(), "volume ghost not found");
}
