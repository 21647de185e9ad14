// Real file system adapter implementation

use std::{
    fs,
    path::{Path, PathBuf},
};

use etcetera::{AppStrategy, AppStrategyArgs, choose_app_strategy};

use super::filesystem::{FileSystem, FileSystemError};

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "TOOLPACK_CONFIG_DIR";

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError> {
        Ok(fs::read_to_string(path)?)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError> {
        let binding = path.to_string_lossy();
        let expanded = shellexpand::tilde(&binding);

        if expanded.starts_with('~') {
            return Err(FileSystemError::HomeDirNotFound);
        }

        Ok(PathBuf::from(expanded.as_ref()))
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, FileSystemError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(path)? {
            paths.push(entry?.path());
        }

        Ok(paths)
    }

    fn config_dir(&self) -> Result<PathBuf, FileSystemError> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        choose_app_strategy(AppStrategyArgs {
            top_level_domain: "dev".to_string(),
            author: "toolpack".to_string(),
            app_name: "toolpack".to_string(),
        })
        .map(|xdg| xdg.config_dir())
        .map_err(|_| FileSystemError::HomeDirNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_path_exists_and_is_directory() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");

        assert!(!fs.path_exists(&file_path));
        File::create(&file_path).unwrap();

        assert!(fs.path_exists(&file_path));
        assert!(!fs.is_directory(&file_path));
        assert!(fs.is_directory(dir.path()));
    }

    #[test]
    fn test_list_directory() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let file1 = dir.path().join("file1.txt");
        let file2 = dir.path().join("file2.txt");
        File::create(&file1).unwrap();
        File::create(&file2).unwrap();

        let paths = fs.list_directory(dir.path()).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&file1));
        assert!(paths.contains(&file2));
    }

    #[test]
    fn test_read_file() {
        let fs = RealFileSystem;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_read.txt");
        fs::write(&file_path, "Hello, world!").unwrap();

        assert_eq!(fs.read_file(&file_path).unwrap(), "Hello, world!");

        let err = fs.read_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, FileSystemError::IoError(_)));
    }

    #[test]
    fn test_expand_path_leaves_absolute_paths_alone() {
        let fs = RealFileSystem;
        let path = Path::new("/opt/toolpack/packages-that-do-not-exist");

        assert_eq!(fs.expand_path(path).unwrap(), path);
    }

    #[test]
    fn test_expand_path_tilde() {
        let fs = RealFileSystem;

        if let Ok(expanded) = fs.expand_path(Path::new("~/.toolpack/packages")) {
            assert!(!expanded.starts_with("~"));
            assert!(expanded.ends_with(".toolpack/packages"));
        }
    }
}
