//! Endpoint routing, independent of the socket and HTTP machinery.

use hyper::StatusCode;
use isivol_shared::constants::plugin;
use isivol_shared::errors::{IsivolError, IsivolResult};
use isivol_shared::protocol::{
    ActivateResponse, Capabilities, CapabilitiesResponse, GetResponse, ListResponse, Scope,
    VolumeRequest, VolumeResponse,
};

use super::error_body;
use crate::driver::VolumeDriver;

/// Route one plugin call and return the HTTP status and JSON body.
///
/// Lifecycle failures are reported in the body's `Err` field with status 200,
/// as the plugin protocol expects. Only unknown endpoints get a non-200 status.
pub async fn dispatch(driver: &VolumeDriver, path: &str, body: &[u8]) -> (StatusCode, Vec<u8>) {
    let encoded = match path {
        plugin::ACTIVATE => serde_json::to_vec(&ActivateResponse {
            implements: vec![plugin::IMPLEMENTS.to_string()],
        }),
        plugin::CAPABILITIES => serde_json::to_vec(&CapabilitiesResponse {
            capabilities: Capabilities {
                scope: Scope::Local,
            },
        }),
        plugin::LIST => serde_json::to_vec(&ListResponse {
            volumes: driver.list().await,
            err: String::new(),
        }),
        plugin::GET => serde_json::to_vec(&get(driver, body).await),
        plugin::CREATE | plugin::REMOVE | plugin::MOUNT | plugin::UNMOUNT | plugin::PATH => {
            serde_json::to_vec(&lifecycle(driver, path, body).await)
        }
        _ => {
            tracing::warn!(path = %path, "Unknown plugin endpoint");
            return (
                StatusCode::NOT_FOUND,
                error_body(&format!("unknown endpoint {}", path)),
            );
        }
    };

    match encoded {
        Ok(bytes) => (StatusCode::OK, bytes),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(&format!("failed to encode response: {}", e)),
        ),
    }
}

fn parse_request(body: &[u8]) -> IsivolResult<VolumeRequest> {
    Ok(serde_json::from_slice(body)?)
}

async fn lifecycle(driver: &VolumeDriver, endpoint: &str, body: &[u8]) -> VolumeResponse {
    let req = match parse_request(body) {
        Ok(req) => req,
        Err(e) => return VolumeResponse::error(e),
    };

    let result = match endpoint {
        plugin::CREATE => driver.create(&req.name).await.map(|()| VolumeResponse::ok()),
        plugin::REMOVE => driver.remove(&req.name).await.map(|()| VolumeResponse::ok()),
        plugin::MOUNT => driver
            .mount(&req.name)
            .await
            .map(|path| VolumeResponse::mountpoint(path.display().to_string())),
        plugin::UNMOUNT => driver
            .unmount(&req.name)
            .await
            .map(|()| VolumeResponse::ok()),
        plugin::PATH => Ok(VolumeResponse::mountpoint(
            driver.path(&req.name).display().to_string(),
        )),
        other => Err(IsivolError::Protocol(format!(
            "unsupported endpoint {}",
            other
        ))),
    };

    result.unwrap_or_else(|e| {
        tracing::debug!(endpoint = %endpoint, volume = %req.name, error = %e, "Plugin call failed");
        VolumeResponse::error(e)
    })
}

async fn get(driver: &VolumeDriver, body: &[u8]) -> GetResponse {
    let result = match parse_request(body) {
        Ok(req) => driver.get(&req.name).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(info) => GetResponse {
            volume: Some(info),
            err: String::new(),
        },
        Err(e) => GetResponse {
            volume: None,
            err: e.to_string(),
        },
    }
}
