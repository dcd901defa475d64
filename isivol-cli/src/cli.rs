use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use isivol::DriverOptions;
use isivol_shared::constants::envs;

use crate::commands::{path::PathArgs, serve::ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "isivol", version, about = "Docker volume plugin for cluster-backed NFS volumes")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the plugin and serve the Docker plugin socket
    Serve(ServeArgs),
    /// Print the mount point of a volume
    Path(PathArgs),
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// JSON options file; flags and environment override its values
    #[arg(long, global = true, env = "ISIVOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local base directory for volume mount points
    #[arg(long, global = true, env = envs::MOUNT_DIR)]
    pub mount_dir: Option<PathBuf>,

    /// Cluster directory holding one sub-directory per volume
    #[arg(long, global = true)]
    pub dataset_prefix: Option<String>,
}

impl GlobalFlags {
    /// Options from the config file (or defaults), with global overrides applied.
    pub fn load_options(&self) -> anyhow::Result<DriverOptions> {
        let mut options = match &self.config {
            Some(path) => DriverOptions::from_file(path)?,
            None => DriverOptions::default(),
        };

        if let Some(mount_dir) = &self.mount_dir {
            options.mount_dir = mount_dir.clone();
        }
        if let Some(prefix) = &self.dataset_prefix {
            options.dataset_prefix = prefix.clone();
        }
        Ok(options)
    }
}
