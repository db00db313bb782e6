//! Configuration loading and management

mod loader;
mod reconcile;
mod types;

pub use loader::ConfigLoader;
pub use reconcile::{reconcile, Reconciliation};
pub use types::{
    HostConfig, ManagerConfig, NetworkConfig, RepositoryEntryConfig, COMPONENTS_DIR,
    POLLING_HOURS_RANGE,
};
