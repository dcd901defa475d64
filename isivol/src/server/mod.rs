//! Docker volume plugin endpoint.
//!
//! Serves the plugin protocol (JSON over HTTP/1.1) on a unix socket. Each
//! connection gets its own task; all of them share one [`VolumeDriver`], whose
//! lock serializes the lifecycle operations.

mod dispatch;

use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use isivol_shared::constants::{paths, plugin};
use isivol_shared::errors::{IsivolError, IsivolResult};
use tokio::net::UnixListener;
use tracing::{debug, info, warn};

use crate::driver::VolumeDriver;
use crate::runtime::{DriverOptions, PluginLock};

pub use dispatch::dispatch;

/// Plugin socket server.
pub struct PluginServer {
    driver: Arc<VolumeDriver>,
    socket_path: PathBuf,
}

impl PluginServer {
    pub fn new(driver: Arc<VolumeDriver>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            socket_path: socket_path.into(),
        }
    }

    /// Serve until ctrl-c.
    pub async fn run(self) -> IsivolResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves, then remove the socket file.
    pub async fn run_until<F>(self, shutdown: F) -> IsivolResult<()>
    where
        F: Future<Output = ()>,
    {
        let listener = bind(&self.socket_path)?;
        info!("Listening on unix://{}", self.socket_path.display());

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let stream = match accepted {
                        Ok((stream, _)) => stream,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };

                    let driver = Arc::clone(&self.driver);
                    tokio::spawn(async move {
                        let service = service_fn(move |req| handle(Arc::clone(&driver), req));
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            debug!("Connection closed with error: {}", e);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping plugin server");
                    break;
                }
            }
        }

        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            warn!(
                "Failed to remove socket {}: {}",
                self.socket_path.display(),
                e
            );
        }
        Ok(())
    }
}

/// Run the plugin with the given options until ctrl-c.
///
/// Takes the mount directory lock, optionally adopts existing mounts, and
/// serves the plugin socket.
pub async fn serve(options: DriverOptions) -> IsivolResult<()> {
    options.validate()?;
    let lock = PluginLock::acquire(&options.mount_dir)?;

    let driver = Arc::new(VolumeDriver::from_options(&options)?);
    if options.recover_mounts {
        driver.recover(Path::new(paths::MOUNT_TABLE)).await;
    }

    info!(
        cluster = %options.cluster.address,
        mount_dir = %options.mount_dir.display(),
        lock = %lock.path().display(),
        "Starting isivol plugin"
    );
    let result = PluginServer::new(driver, options.socket_path.clone())
        .run()
        .await;
    drop(lock);
    result
}

fn bind(socket_path: &Path) -> IsivolResult<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }

    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    UnixListener::bind(socket_path).map_err(|e| {
        IsivolError::Internal(format!(
            "Failed to bind {}: {}",
            socket_path.display(),
            e
        ))
    })
}

async fn handle(
    driver: Arc<VolumeDriver>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method != Method::POST {
        return Ok(respond(
            StatusCode::METHOD_NOT_ALLOWED,
            error_body(&format!("method {} not allowed", method)),
        ));
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Ok(respond(
                StatusCode::BAD_REQUEST,
                error_body(&format!("failed to read request body: {}", e)),
            ));
        }
    };

    // Detached from the connection so a call runs to completion even if the
    // client disconnects mid-request.
    let call = tokio::spawn(async move { dispatch(&driver, &path, &body).await });
    match call.await {
        Ok((status, payload)) => Ok(respond(status, payload)),
        Err(e) => {
            warn!("Plugin call task failed: {}", e);
            Ok(respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(&format!("plugin call failed: {}", e)),
            ))
        }
    }
}

fn respond(status: StatusCode, payload: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(payload)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(plugin::CONTENT_TYPE));
    response
}

fn error_body(message: &str) -> Vec<u8> {
    serde_json::json!({ "Err": message }).to_string().into_bytes()
}
