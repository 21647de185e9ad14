use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{package::AcquireError, registry::PackageIdentity};

/// Location of the restore's output descriptor, relative to the staging dir
pub const ASSETS_FILE: &str = "obj/project.assets.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetsFile {
    #[serde(default)]
    package_folders: Map<String, Value>,

    #[serde(default)]
    libraries: HashMap<String, Library>,
}

#[derive(Debug, Deserialize)]
struct Library {
    #[serde(default)]
    path: Option<String>,
}

/// What a restore left behind in a staging directory
#[derive(Debug)]
pub struct RestoreOutput {
    package_folder: PathBuf,
    libraries: HashMap<String, Library>,
}

impl RestoreOutput {
    /// Parse `obj/project.assets.json` below `staging`
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::RestoreOutput`] if the file is missing, is not
    /// valid JSON or lists no package folder.
    pub fn read(staging: &Path) -> Result<Self, AcquireError> {
        let path = staging.join(ASSETS_FILE);
        let failure = |reason: String| AcquireError::RestoreOutput {
            path: path.clone(),
            reason,
        };

        let contents = fs::read_to_string(&path).map_err(|e| failure(e.to_string()))?;
        let assets: AssetsFile =
            serde_json::from_str(&contents).map_err(|e| failure(e.to_string()))?;

        // File order is preserved, so this is the first folder the restore listed
        let package_folder = assets
            .package_folders
            .keys()
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| failure("no entries in packageFolders".to_string()))?;

        Ok(Self {
            package_folder,
            libraries: assets.libraries,
        })
    }

    /// Folder the restore extracted packages into
    #[must_use]
    pub fn package_folder(&self) -> &Path {
        &self.package_folder
    }

    /// `<package folder>/<library path>/lib/<target framework>`
    ///
    /// The library path is taken from the assets file when it lists
    /// `<name>/<version>`; otherwise the lower-cased `<name>/<version>` layout
    /// is assumed.
    #[must_use]
    pub fn assemblies_folder(&self, identity: &PackageIdentity, target_framework: &str) -> PathBuf {
        let key = format!("{}/{}", identity.name(), identity.version());

        let library_path = self
            .libraries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
            .and_then(|(_, library)| library.path.clone())
            .unwrap_or_else(|| {
                format!(
                    "{}/{}",
                    identity.name().to_lowercase(),
                    identity.version().to_lowercase()
                )
            });

        self.package_folder
            .join(library_path)
            .join("lib")
            .join(target_framework)
    }
}
