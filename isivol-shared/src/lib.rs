//! Isivol shared types.
//!
//! Error types, constants, and the Docker volume plugin wire types used by
//! both the plugin library and the command-line front end.

pub mod constants;
pub mod errors;
pub mod protocol;

pub use errors::{IsivolError, IsivolResult};
pub use protocol::{VolumeInfo, VolumeRequest, VolumeResponse};
