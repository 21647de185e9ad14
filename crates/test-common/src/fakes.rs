//! Hand-written port implementations for integration tests.
//!
//! Unlike the `mockall` mocks inside the library, these are usable from other
//! crates and behave like the real toolchain and registry closely enough to
//! drive a whole acquire against a real file system.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use toolpack::{
    commands::{CommandError, CommandOutput, CommandRunner},
    registry::{PackageMetadata, RegistryClient, RegistryError},
};

use crate::fixtures::assets_json;

/// One invocation seen by [`ScriptedCommandRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub subcommand: String,
    pub args: Vec<String>,
}

/// A toolchain stand-in
///
/// - `restore <dir>/restore.csproj ...` writes `obj/project.assets.json`
///   pointing at the configured package folder
/// - `build ... --output <dir>` writes the configured build outputs into
///   `<dir>`
///
/// Clones share the call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommandRunner {
    package_folder: Option<PathBuf>,
    build_outputs: Vec<(String, Vec<u8>)>,
    failing: HashSet<String>,
    restore_delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder that registry restores report in `packageFolders`
    #[must_use]
    pub fn with_package_folder(mut self, package_folder: &Path) -> Self {
        self.package_folder = Some(package_folder.to_path_buf());
        self
    }

    /// File a `build` writes into its output directory
    #[must_use]
    pub fn with_build_output(mut self, file_name: &str, contents: Vec<u8>) -> Self {
        self.build_outputs.push((file_name.to_string(), contents));
        self
    }

    /// Make `subcommand` exit with status 1
    #[must_use]
    pub fn failing(mut self, subcommand: &str) -> Self {
        self.failing.insert(subcommand.to_string());
        self
    }

    /// Pause every restore, widening race windows
    #[must_use]
    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn call_count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.subcommand == subcommand)
            .count()
    }

    fn restore(&self, args: &[String]) -> io::Result<()> {
        let (Some(descriptor), Some(package_folder)) = (args.first(), &self.package_folder) else {
            return Ok(());
        };
        if !descriptor.ends_with("restore.csproj") {
            return Ok(());
        }

        let obj = Path::new(descriptor)
            .parent()
            .map(|staging| staging.join("obj"))
            .ok_or_else(|| io::Error::other("descriptor has no parent"))?;
        fs::create_dir_all(&obj)?;
        fs::write(obj.join("project.assets.json"), assets_json(package_folder))
    }

    fn build(&self, args: &[String]) -> io::Result<()> {
        let Some(output) = args
            .iter()
            .position(|arg| arg == "--output")
            .and_then(|i| args.get(i + 1))
        else {
            return Ok(());
        };

        let output = Path::new(output);
        fs::create_dir_all(output)?;
        for (file_name, contents) in &self.build_outputs {
            fs::write(output.join(file_name), contents)?;
        }

        Ok(())
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn execute(
        &self,
        subcommand: &str,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                subcommand: subcommand.to_string(),
                args: args.to_vec(),
            });

        if subcommand == "restore" && !self.restore_delay.is_zero() {
            tokio::time::sleep(self.restore_delay).await;
        }

        if self.failing.contains(subcommand) {
            return Ok(CommandOutput::failure(1, "scripted failure"));
        }

        let result = match subcommand {
            "restore" => self.restore(args),
            "build" => self.build(args),
            _ => Ok(()),
        };

        result
            .map(|()| CommandOutput::success())
            .map_err(|e| CommandError::Io {
                command: format!("{subcommand} {}", args.join(" ")),
                source: Arc::new(e),
            })
    }
}

/// A registry that always answers from a fixed list of entries
///
/// Like the HTTP adapter it matches ids case-insensitively and hides unlisted
/// entries. Clones share the query counter.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistryClient {
    entries: Vec<PackageMetadata>,
    queries: Arc<AtomicUsize>,
}

impl StaticRegistryClient {
    #[must_use]
    pub fn new(entries: Vec<PackageMetadata>) -> Self {
        Self {
            entries,
            queries: Arc::default(),
        }
    }

    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for StaticRegistryClient {
    async fn find_packages(
        &self,
        _source_url: &str,
        name: &str,
    ) -> Result<Vec<PackageMetadata>, RegistryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.listed && entry.id.eq_ignore_ascii_case(name))
            .cloned()
            .collect())
    }
}
