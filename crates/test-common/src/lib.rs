//! Common test utilities shared across all toolpack crates.
//!
//! This crate provides fixtures (PE images, project files, restore output),
//! fakes for the library's ports, and a temporary on-disk layout for driving
//! whole acquires in integration tests.

pub mod config;
pub mod constants;
pub mod env;
pub mod fakes;
pub mod fixtures;

// Re-export the most commonly used items for convenience
pub use config::test_config;
pub use constants::*;
pub use env::{TestEnv, TestService};
pub use fakes::{RecordedCall, ScriptedCommandRunner, StaticRegistryClient};
pub use fixtures::{
    assets_json, catalog_entry, csproj, pe_image, publish_package, write_project,
};

// Re-export commonly used external dependencies for convenience
pub use tempfile::TempDir;
pub use toolpack::{config::AppConfigBuilder, package::AcquireOptions};
