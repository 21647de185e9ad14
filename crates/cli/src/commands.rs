pub(crate) mod install;

use toolpack::{
    commands::ProcessCommandRunner,
    config::AppConfig,
    fs::RealFileSystem,
    package::{AcquireOptions, PackageServiceImpl},
    registry::{HttpRegistryClient, RegistryError},
};
use tracing::debug;

use crate::{cli::ClapCommands, terminal_reporter::TerminalReporter};

type CliPackageService = PackageServiceImpl<HttpRegistryClient, ProcessCommandRunner, RealFileSystem>;

/// Primary command dispatcher that routes to the appropriate command handler
pub(crate) async fn dispatch_command(
    command: &ClapCommands,
    config: AppConfig,
    reporter: TerminalReporter,
) -> i32 {
    debug!(?command, "Dispatching command");

    match command {
        ClapCommands::Install {
            package,
            version,
            source_url,
        } => {
            let options = install_options(version.as_deref(), source_url.as_deref());

            let service = match build_service(config) {
                Ok(service) => service,
                Err(e) => {
                    reporter.report_error(e);
                    return 1;
                }
            };

            install::handle_install(&service, package, &options, reporter).await
        }
    }
}

fn install_options(version: Option<&str>, source_url: Option<&str>) -> AcquireOptions {
    let mut options = AcquireOptions::default();
    if let Some(version) = version {
        options = options.with_version(version);
    }
    if let Some(url) = source_url {
        options = options.with_source_url(url);
    }
    options
}

fn build_service(config: AppConfig) -> Result<CliPackageService, RegistryError> {
    let registry = HttpRegistryClient::new(config.registry_timeout())?;
    let runner = ProcessCommandRunner::new(config.toolchain(), config.command_timeout());

    Ok(PackageServiceImpl::new(
        registry,
        runner,
        RealFileSystem,
        config,
    ))
}
