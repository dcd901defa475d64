//! Startup guards of `isivol::serve`.

use isivol::runtime::PluginLock;
use isivol::{ClusterOptions, DriverOptions};
use isivol_shared::errors::IsivolError;

fn options(dir: &std::path::Path) -> DriverOptions {
    DriverOptions {
        cluster: ClusterOptions {
            address: "10.0.0.5".into(),
            ..Default::default()
        },
        mount_dir: dir.join("volumes"),
        socket_path: dir.join("isilon.sock"),
        ..Default::default()
    }
}

#[tokio::test]
async fn serve_refuses_mount_dir_owned_by_another_plugin() {
    let scratch = tempfile::tempdir().unwrap();
    let options = options(scratch.path());
    let _running = PluginLock::acquire(&options.mount_dir).unwrap();

    let err = isivol::serve(options.clone()).await.unwrap_err();

    assert!(matches!(err, IsivolError::Config(_)));
    assert!(err.to_string().contains("already managing"));
    assert!(!options.socket_path.exists());
}

#[tokio::test]
async fn serve_rejects_invalid_options_before_locking() {
    let scratch = tempfile::tempdir().unwrap();
    let mut options = options(scratch.path());
    options.cluster.address.clear();

    let err = isivol::serve(options.clone()).await.unwrap_err();

    assert!(err.to_string().contains("cluster address is required"));
    assert!(!options.mount_dir.exists());
}
