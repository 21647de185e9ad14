//! Toolpack - package acquisition for .NET tools
//!
//! The `toolpack` library resolves a package reference (a registry package id
//! or a local project folder) into a runnable assembly and installs it into a
//! managed packages directory. An install is either complete, marked by a
//! manifest file written last, or it is treated as absent.
//!
//! # Architecture
//!
//! This library follows the Hexagonal Architecture pattern (also known as Ports and Adapters).
//! The acquisition logic is isolated from the network, the external toolchain and the file
//! system through well-defined interfaces (ports).
//!
//! # Main Components
//!
//! - [`package`] - Acquire orchestration, resolvers, and the packages folder
//! - [`registry`] - Registry client port, HTTP adapter, and identity lookup
//! - [`staging`] - Per-acquire staging directories and restore output
//! - [`artifact`] - Entry point detection over build outputs
//! - [`project`] - Project descriptor reading
//! - [`config`] - Application configuration management
//! - [`commands`] - Toolchain command execution abstractions
//! - [`fs`] - File system abstractions
//!
//! # Examples
//!
//! ```no_run
//! use toolpack::{
//!     commands::ProcessCommandRunner,
//!     config::AppConfig,
//!     fs::RealFileSystem,
//!     package::{AcquireOptions, PackageService, PackageServiceImpl},
//!     registry::HttpRegistryClient,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let service = PackageServiceImpl::new(
//!     HttpRegistryClient::new(config.registry_timeout())?,
//!     ProcessCommandRunner::new(config.toolchain(), config.command_timeout()),
//!     RealFileSystem,
//!     config,
//! );
//!
//! let options = AcquireOptions::default().with_source_url("https://api.nuget.org/v3/registration5-semver1");
//! let package = service.acquire("dotnet-example", &options).await?;
//! println!("{}", package.entry_point_path().display());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod commands;
pub mod config;
pub mod fs;
pub mod package;
pub mod project;
pub mod registry;
pub mod staging;
