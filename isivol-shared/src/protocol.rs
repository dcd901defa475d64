//! Docker volume plugin wire types.
//!
//! Field names follow the plugin protocol (`Name`, `Mountpoint`, `Err`, ...).
//! Every response carries an `Err` string that is empty on success.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Request body shared by every `VolumeDriver.*` call that names a volume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeRequest {
    pub name: String,

    /// Driver options from `docker volume create -o`; accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opts: Option<HashMap<String, String>>,

    /// Caller-unique mount id sent with Mount/Unmount since protocol v1.13.
    #[serde(default, rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Response for Create, Remove, Mount, Unmount and Path.
///
/// Exactly one of `mountpoint` or `err` is meaningful.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeResponse {
    #[serde(rename = "Mountpoint", default)]
    pub mountpoint: String,

    #[serde(rename = "Err", default)]
    pub err: String,
}

impl VolumeResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn mountpoint(path: impl Into<String>) -> Self {
        Self {
            mountpoint: path.into(),
            err: String::new(),
        }
    }

    pub fn error(err: impl ToString) -> Self {
        Self {
            mountpoint: String::new(),
            err: err.to_string(),
        }
    }

    pub fn is_err(&self) -> bool {
        !self.err.is_empty()
    }
}

/// Snapshot of one registered volume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,

    /// Active consumers; not part of the protocol, reported under `Status`.
    #[serde(rename = "Status", with = "status")]
    pub connections: usize,
}

mod status {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Status {
        connections: usize,
    }

    pub fn serialize<S: Serializer>(connections: &usize, s: S) -> Result<S::Ok, S::Error> {
        Status {
            connections: *connections,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
        Ok(Status::deserialize(d)?.connections)
    }
}

/// `Plugin.Activate` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivateResponse {
    #[serde(rename = "Implements")]
    pub implements: Vec<String>,
}

/// `VolumeDriver.Get` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "Volume", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeInfo>,

    #[serde(rename = "Err", default)]
    pub err: String,
}

/// `VolumeDriver.List` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(rename = "Volumes", default)]
    pub volumes: Vec<VolumeInfo>,

    #[serde(rename = "Err", default)]
    pub err: String,
}

/// Volume scope reported by `VolumeDriver.Capabilities`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(rename = "Scope")]
    pub scope: Scope,
}

/// `VolumeDriver.Capabilities` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    #[serde(rename = "Capabilities")]
    pub capabilities: Capabilities,
}
