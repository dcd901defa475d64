//! Isivol: Docker volume plugin for cluster-backed NFS volumes.
//!
//! Volumes are directories on a storage cluster. `create` provisions the
//! directory through the cluster's REST API, `mount` NFS-mounts it under a
//! local base directory and reference-counts the consumers sharing it,
//! `unmount` and `remove` release it again.
//!
//! | Module | Purpose |
//! |---|---|
//! | [`driver`] | Lifecycle controller and volume registry |
//! | [`cluster`] | Remote volume service trait and REST client |
//! | [`mount`] | Mount executor trait, NFS executor, mount table parsing |
//! | [`server`] | Plugin protocol endpoint on a unix socket |
//! | [`runtime`] | Options, path layout, mount directory lock |

#[cfg(not(target_os = "linux"))]
compile_error!("isivol mounts NFS through the Linux kernel client; build with a Linux target");

use std::path::Path;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

// Keeps the tracing-appender writer thread alive
static LOG_GUARD: OnceLock<Option<tracing_appender::non_blocking::WorkerGuard>> = OnceLock::new();

pub mod cluster;
pub mod driver;
pub mod mount;
pub mod runtime;
pub mod server;
pub mod util;

pub use cluster::{IsilonClient, VolumeService};
pub use driver::VolumeDriver;
pub use mount::{MountExecutor, NfsMounter};
pub use runtime::{ClusterOptions, DriverOptions, VolumeLayout};
pub use server::{PluginServer, serve};

use isivol_shared::errors::{IsivolError, IsivolResult};

/// Initialize tracing.
///
/// Logs go to stderr, and additionally to `<log_dir>/isivol.log` with daily
/// rotation when `log_dir` is given. `RUST_LOG` controls filtering (default
/// `info`). Idempotent: later calls return immediately.
pub fn init_logging(log_dir: Option<&Path>) -> IsivolResult<()> {
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir).map_err(|e| {
            IsivolError::Config(format!(
                "Failed to create logs directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }

    let _ = LOG_GUARD.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        match log_dir {
            Some(dir) => {
                let file_appender = tracing_appender::rolling::daily(dir, "isivol.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                util::register_to_tracing(Some(non_blocking), env_filter);
                Some(guard)
            }
            None => {
                util::register_to_tracing(None, env_filter);
                None
            }
        }
    });

    Ok(())
}
