#![allow(dead_code)]

use assert_cmd::Command;
use std::time::Duration;

use tempfile::TempDir;

pub struct TestContext {
    pub cmd: Command,
    pub dir: TempDir,
}

impl TestContext {
    pub fn new_cmd(&self) -> Command {
        command()
    }

    /// Write a JSON options file into the scratch dir and return its path.
    pub fn write_config(&self, value: serde_json::Value) -> std::path::PathBuf {
        let path = self.dir.path().join("isivol.json");
        std::fs::write(&path, value.to_string()).expect("Failed to write config");
        path
    }
}

fn command() -> Command {
    let bin_path = env!("CARGO_BIN_EXE_isivol");
    let mut cmd = Command::new(bin_path);
    cmd.timeout(Duration::from_secs(30));
    for var in [
        "ISIVOL_CONFIG",
        "ISIVOL_MOUNT_DIR",
        "ISIVOL_CLUSTER_ADDRESS",
        "ISIVOL_CLUSTER_USERNAME",
        "ISIVOL_CLUSTER_PASSWORD",
        "ISIVOL_SOCKET",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn isivol() -> TestContext {
    TestContext {
        cmd: command(),
        dir: TempDir::new().expect("Failed to create temp dir"),
    }
}
