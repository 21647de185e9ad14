use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Toolpack - acquire .NET tools from a registry or a local project
///
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ClapCli {
    /// Override the packages directory from config
    ///
    #[clap(long, short = 'p', global = true)]
    pub(crate) packages_directory: Option<PathBuf>,

    /// Override the target framework moniker from config
    ///
    #[clap(long, short = 'f', global = true)]
    pub(crate) framework: Option<String>,

    /// Show detailed output
    ///
    #[clap(long, short = 'v', global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    /// Disable colored output
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Subcommand to execute
    ///
    #[clap(subcommand)]
    pub(crate) command: ClapCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ClapCommands {
    /// Install a package from a registry or a local project folder
    Install {
        /// Registry package id, or path to a folder holding a project file
        #[clap(value_name = "SOURCE")]
        package: String,

        /// Exact version to install (registry sources only)
        #[clap(long)]
        version: Option<String>,

        /// Registry URL to query instead of the configured one
        #[clap(long = "source", value_name = "URL")]
        source_url: Option<String>,
    },
}
