use std::path::PathBuf;

use clap::Args;
use isivol_shared::constants::envs;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Cluster host name or IP, also used as the NFS server
    #[arg(long, env = envs::CLUSTER_ADDRESS)]
    pub cluster_address: Option<String>,

    /// Cluster platform API port
    #[arg(long)]
    pub cluster_port: Option<u16>,

    #[arg(long, env = envs::CLUSTER_USERNAME)]
    pub username: Option<String>,

    #[arg(long, env = envs::CLUSTER_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Verify the cluster's TLS certificate instead of accepting any
    #[arg(long)]
    pub verify_tls: bool,

    /// Options passed to `mount -o`
    #[arg(long)]
    pub mount_options: Option<String>,

    /// Unix socket to listen on
    #[arg(long, env = envs::SOCKET)]
    pub socket: Option<PathBuf>,

    /// Also write daily-rotated logs to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Adopt NFS mounts already present under the mount directory
    #[arg(long)]
    pub recover_mounts: bool,
}

pub async fn execute(args: ServeArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut options = global.load_options()?;

    if let Some(address) = args.cluster_address {
        options.cluster.address = address;
    }
    if let Some(port) = args.cluster_port {
        options.cluster.port = port;
    }
    if let Some(username) = args.username {
        options.cluster.username = username;
    }
    if let Some(password) = args.password {
        options.cluster.password = password;
    }
    if args.verify_tls {
        options.cluster.accept_invalid_certs = false;
    }
    if let Some(mount_options) = args.mount_options {
        options.mount_options = mount_options;
    }
    if let Some(socket) = args.socket {
        options.socket_path = socket;
    }
    if args.log_dir.is_some() {
        options.log_dir = args.log_dir;
    }
    if args.recover_mounts {
        options.recover_mounts = true;
    }

    isivol::init_logging(options.log_dir.as_deref())?;
    tracing::debug!(?options, "Resolved plugin options");

    isivol::serve(options).await?;
    Ok(())
}
