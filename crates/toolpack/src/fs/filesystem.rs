//! File system abstraction layer
//!
//! A trait-based port for the read-mostly file system work done outside the
//! install pipeline: locating and loading configuration, locating and reading
//! project descriptors, and classifying a package source. Keeping these behind
//! a port lets that logic be tested with [`MockFileSystem`].

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

/// Port for file system operations (Hexagonal Architecture)
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Read a file and return its contents as a string
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file is missing, unreadable or not
    /// valid UTF-8.
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Check if a path exists (file or directory)
    fn path_exists(&self, path: &Path) -> bool;

    /// Check if a path exists and is a directory
    fn is_directory(&self, path: &Path) -> bool;

    /// Expand a leading `~` to the user's home directory
    ///
    /// The path does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::HomeDirNotFound`] if `~` cannot be resolved.
    fn expand_path(&self, path: &Path) -> Result<PathBuf, FileSystemError>;

    /// List the entries of a directory (absolute paths, enumeration order)
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the directory cannot be read.
    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, FileSystemError>;

    /// Get the user's configuration directory for toolpack
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::HomeDirNotFound`] if no home directory can
    /// be determined.
    fn config_dir(&self) -> Result<PathBuf, FileSystemError>;
}

/// Errors that can occur during file system operations
#[derive(Error, Debug, Clone)]
pub enum FileSystemError {
    /// General IO error occurred during file system operation
    #[error("IO error: {0}")]
    IoError(Arc<io::Error>),

    /// Home directory could not be determined
    #[error("Home directory not found")]
    HomeDirNotFound,
}

impl From<io::Error> for FileSystemError {
    fn from(error: io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}

#[cfg(test)]
impl MockFileSystem {
    /// Set up a mock for reading a file with specific content
    pub(crate) fn mock_read_file<P, S>(&mut self, path: P, content: S)
    where
        PathBuf: From<P>,
        S: ToString,
    {
        let path_buf = PathBuf::from(path);
        let content_string = content.to_string();
        self.expect_read_file()
            .with(mockall::predicate::eq(path_buf))
            .returning(move |_| Ok(content_string.clone()));
    }

    /// Set up a mock for a file that cannot be read
    pub(crate) fn mock_read_file_missing<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        self.expect_read_file()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound).into()));
    }

    /// Set up a mock for listing directory contents
    pub(crate) fn mock_list_directory<P>(&mut self, path: P, entries: &[P])
    where
        PathBuf: From<P>,
        P: Clone,
    {
        let dir = PathBuf::from(path);
        let paths: Vec<_> = entries.iter().cloned().map(PathBuf::from).collect();

        self.expect_list_directory()
            .with(mockall::predicate::eq(dir))
            .returning(move |_| Ok(paths.clone()));
    }

    /// Set up a mock for path existence checking
    pub(crate) fn mock_path_exists<P>(&mut self, path: P, exists: bool)
    where
        PathBuf: From<P>,
    {
        self.expect_path_exists()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(move |_| exists);
    }

    /// Set up a mock for getting the configuration directory
    pub(crate) fn mock_config_dir_ok<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        let p = PathBuf::from(path);
        self.expect_config_dir().return_once(|| Ok(p));
    }

    /// Set up a complete mock configuration file scenario
    pub(crate) fn mock_config_file(&mut self, config_dir: &Path, config_yaml: &str) {
        let config_path = config_dir.join("config.yaml");

        self.mock_config_dir_ok(config_dir);
        self.mock_path_exists(&config_path, true);
        self.mock_read_file(&config_path, config_yaml);
        self.mock_path_exists(config_dir.join("config.yml"), false);
    }

    /// Make `expand_path` return its input unchanged
    pub(crate) fn mock_expand_path_identity(&mut self) {
        self.expect_expand_path()
            .returning(|path| Ok(path.to_path_buf()));
    }
}
