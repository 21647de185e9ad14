use toolpack::package::{AcquireError, AcquireOptions, AcquiredPackage, PackageService};
use tracing::info;

use crate::terminal_reporter::TerminalReporter;

pub(crate) async fn handle_install<S: PackageService>(
    service: &S,
    source: &str,
    options: &AcquireOptions,
    reporter: TerminalReporter,
) -> i32 {
    info!(%source, "Installing package");
    reporter.report_progress(format!("Acquiring {source}"));

    match service.acquire(source, options).await {
        Ok(package) => {
            report_installed(&package, reporter);
            0
        }
        Err(error) => {
            reporter.report_error(&error);
            if let Some(hint) = suggestion(&error) {
                reporter.report_suggestion(hint);
            }
            1
        }
    }
}

fn report_installed(package: &AcquiredPackage, reporter: TerminalReporter) {
    match package.version() {
        Some(version) => reporter.report_success(format!("Installed {} {version}", package.name())),
        None => reporter.report_success(format!("Installed {}", package.name())),
    }
    reporter.report_info(format!("Folder: {}", package.folder().display()));
    reporter.report_info(format!(
        "Entry point: {}",
        package.entry_point_path().display()
    ));
}

fn suggestion(error: &AcquireError) -> Option<String> {
    match error {
        AcquireError::Configuration(_) => Some(
            "Pass --source <URL> or set registry_source_url in config.yaml".to_string(),
        ),
        AcquireError::PackageAlreadyExists { folder, .. } => Some(format!(
            "Remove {} to reinstall",
            folder.display()
        )),
        AcquireError::Compatibility { .. } => {
            Some("Choose another version or pass --framework".to_string())
        }
        AcquireError::Resolution { .. } => {
            Some("Check the package id and the registry URL".to_string())
        }
        _ => None,
    }
}
