//! Entry point detection
//!
//! Finds the runnable assembly among build or package outputs by reading PE
//! headers. Candidate files are never loaded or executed.

pub mod pe;

use std::{fs, io, path::Path};

use tracing::{debug, instrument};

use crate::package::AcquireError;

const ASSEMBLY_EXTENSION: &str = "dll";

/// Return the file name of the first top-level `*.dll` in `directory` that
/// declares an entry point
///
/// Files are considered in directory-enumeration order. Files that are not
/// valid managed images are skipped.
///
/// # Errors
///
/// - [`AcquireError::EntryPointNotFound`] naming `directory` if it is missing
///   or no candidate qualifies
/// - [`AcquireError::Io`] if `directory` exists but cannot be listed
#[instrument]
pub fn find_entry_artifact(directory: &Path) -> Result<String, AcquireError> {
    let not_found = || AcquireError::EntryPointNotFound {
        directory: directory.to_path_buf(),
    };

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AcquireError::io(directory)(e)),
    };

    for entry in entries {
        let entry = entry.map_err(AcquireError::io(directory))?;
        let path = entry.path();

        let is_candidate = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ASSEMBLY_EXTENSION));
        if !is_candidate {
            continue;
        }

        let image = match fs::read(&path) {
            Ok(image) => image,
            Err(error) => {
                debug!(path = %path.display(), %error, "skipping unreadable candidate");
                continue;
            }
        };

        match pe::entry_point(&image) {
            Ok(Some(entry_point)) => {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                debug!(%file_name, ?entry_point, "found entry artifact");
                return Ok(file_name);
            }
            Ok(None) => debug!(path = %path.display(), "candidate has no entry point"),
            Err(error) => debug!(path = %path.display(), %error, "skipping unparseable candidate"),
        }
    }

    Err(not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::pe::testing::managed_image;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_finds_entry_assembly() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Library.dll"), managed_image(0)).unwrap();
        fs::write(dir.path().join("Tool.dll"), managed_image(0x0600_0001)).unwrap();
        fs::write(dir.path().join("Tool.deps.json"), "{}").unwrap();

        let entry = find_entry_artifact(dir.path()).unwrap();

        assert_eq!(entry, "Tool.dll");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("TOOL.DLL"), managed_image(0x0600_0001)).unwrap();

        assert_eq!(find_entry_artifact(dir.path()).unwrap(), "TOOL.DLL");
    }

    #[test]
    fn test_skips_garbage_and_nested_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("native.dll"), b"not a pe file").unwrap();
        fs::create_dir(dir.path().join("runtimes")).unwrap();
        fs::write(
            dir.path().join("runtimes/Nested.dll"),
            managed_image(0x0600_0001),
        )
        .unwrap();

        let result = find_entry_artifact(dir.path());

        assert!(matches!(
            result,
            Err(AcquireError::EntryPointNotFound { ref directory }) if directory == dir.path()
        ));
    }

    #[test]
    fn test_only_libraries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("A.dll"), managed_image(0)).unwrap();
        fs::write(dir.path().join("B.dll"), managed_image(0)).unwrap();

        let result = find_entry_artifact(dir.path());

        assert!(matches!(result, Err(AcquireError::EntryPointNotFound { .. })));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let missing: PathBuf = dir.path().join("lib/net8.0");

        let result = find_entry_artifact(&missing);

        assert!(matches!(
            result,
            Err(AcquireError::EntryPointNotFound { ref directory }) if directory == &missing
        ));
    }
}
