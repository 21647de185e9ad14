//! Project descriptor reading
//!
//! A folder source is identified by the first `*.csproj` file it contains.
//! The package name comes from the descriptor's `<PackageId>`, falling back
//! to `<AssemblyName>`.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::debug;

use crate::{fs::FileSystem, package::AcquireError};

const DESCRIPTOR_EXTENSION: &str = "csproj";

static PROJECT_ROOT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<Project[\s>/]").ok());
static PACKAGE_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<PackageId>\s*([^<]*?)\s*</PackageId>").ok());
static ASSEMBLY_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<AssemblyName>\s*([^<]*?)\s*</AssemblyName>").ok());

/// Find the project descriptor inside `folder`
///
/// Candidates are sorted by file name so the choice is stable.
///
/// # Errors
///
/// Returns [`AcquireError::MalformedDescriptor`] naming `folder` if it cannot
/// be listed or holds no descriptor.
pub fn find_descriptor<F: FileSystem>(fs: &F, folder: &Path) -> Result<PathBuf, AcquireError> {
    let entries = fs
        .list_directory(folder)
        .map_err(|e| AcquireError::MalformedDescriptor {
            path: folder.to_path_buf(),
            reason: format!("cannot list folder: {e}"),
        })?;

    let mut descriptors: Vec<PathBuf> = entries
        .into_iter()
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
        })
        .filter(|path| !fs.is_directory(path))
        .collect();
    descriptors.sort();

    let descriptor = descriptors
        .into_iter()
        .next()
        .ok_or_else(|| AcquireError::MalformedDescriptor {
            path: folder.to_path_buf(),
            reason: format!("no *.{DESCRIPTOR_EXTENSION} project file found"),
        })?;

    debug!(descriptor = %descriptor.display(), "found project descriptor");
    Ok(descriptor)
}

/// Read the package name declared by `descriptor`
///
/// # Errors
///
/// Returns [`AcquireError::MalformedDescriptor`] if the file cannot be read,
/// has no `<Project>` root, or declares neither a package id nor an assembly
/// name.
pub fn read_package_name<F: FileSystem>(fs: &F, descriptor: &Path) -> Result<String, AcquireError> {
    let malformed = |reason: String| AcquireError::MalformedDescriptor {
        path: descriptor.to_path_buf(),
        reason,
    };

    let contents = fs
        .read_file(descriptor)
        .map_err(|e| malformed(format!("cannot read file: {e}")))?;

    parse_package_name(&contents).map_err(malformed)
}

fn parse_package_name(contents: &str) -> Result<String, String> {
    let (Some(root), Some(package_id), Some(assembly_name)) = (
        PROJECT_ROOT.as_ref(),
        PACKAGE_ID.as_ref(),
        ASSEMBLY_NAME.as_ref(),
    ) else {
        return Err("descriptor patterns failed to compile".to_string());
    };

    if !root.is_match(contents) {
        return Err("missing <Project> root element".to_string());
    }

    [package_id, assembly_name]
        .into_iter()
        .filter_map(|pattern| pattern.captures(contents))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "neither <PackageId> nor <AssemblyName> is declared".to_string())
}
