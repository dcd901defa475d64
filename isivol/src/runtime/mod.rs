//! Plugin configuration, path layout, and process-level guards.

pub mod layout;
pub mod lock;
pub mod options;

pub use layout::VolumeLayout;
pub use lock::PluginLock;
pub use options::{ClusterOptions, DriverOptions};
