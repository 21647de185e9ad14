//! Files and records that look like real toolchain and registry output.

use std::{
    fs,
    path::{Path, PathBuf},
};

use toolpack::registry::{DependencyGroup, PackageMetadata};

/// Build a minimal PE32 managed image
///
/// With `Some(token)` the CLI header declares that entry point token; with
/// `None` the image is a plain library.
#[must_use]
pub fn pe_image(entry_token: Option<u32>) -> Vec<u8> {
    const PE_OFFSET: usize = 0x80;
    const OPTIONAL: usize = PE_OFFSET + 4 + 20;
    const DIRECTORIES: usize = OPTIONAL + 96;
    const SECTION: usize = OPTIONAL + 224;
    const CLI: usize = 0x208;

    let mut image = vec![0u8; 0x400];
    let mut put = |at: usize, bytes: &[u8]| image[at..at + bytes.len()].copy_from_slice(bytes);

    put(0, b"MZ");
    put(0x3C, &(PE_OFFSET as u32).to_le_bytes());
    put(PE_OFFSET, b"PE\0\0");
    put(PE_OFFSET + 4, &0x14Cu16.to_le_bytes());
    put(PE_OFFSET + 6, &1u16.to_le_bytes());
    put(PE_OFFSET + 20, &224u16.to_le_bytes());
    put(OPTIONAL, &0x10Bu16.to_le_bytes());
    put(DIRECTORIES - 4, &16u32.to_le_bytes());
    put(DIRECTORIES + 14 * 8, &0x2008u32.to_le_bytes());
    put(DIRECTORIES + 14 * 8 + 4, &72u32.to_le_bytes());
    put(SECTION, b".text");
    put(SECTION + 8, &0x100u32.to_le_bytes());
    put(SECTION + 12, &0x2000u32.to_le_bytes());
    put(SECTION + 16, &0x200u32.to_le_bytes());
    put(SECTION + 20, &0x200u32.to_le_bytes());
    put(CLI, &72u32.to_le_bytes());
    put(CLI + 16, &1u32.to_le_bytes());
    put(CLI + 20, &entry_token.unwrap_or(0).to_le_bytes());

    image
}

/// A listed registry entry targeting each of `frameworks`
#[must_use]
pub fn catalog_entry(id: &str, version: &str, frameworks: &[&str]) -> PackageMetadata {
    PackageMetadata {
        id: id.to_string(),
        version: version.to_string(),
        listed: true,
        dependency_groups: frameworks
            .iter()
            .map(|tf| DependencyGroup {
                target_framework: Some((*tf).to_string()),
                dependencies: Vec::new(),
            })
            .collect(),
    }
}

/// SDK-style project declaring the given name elements
#[must_use]
pub fn csproj(package_id: Option<&str>, assembly_name: Option<&str>) -> String {
    let mut properties = String::from("    <OutputType>Exe</OutputType>\n");
    if let Some(id) = package_id {
        properties.push_str(&format!("    <PackageId>{id}</PackageId>\n"));
    }
    if let Some(name) = assembly_name {
        properties.push_str(&format!("    <AssemblyName>{name}</AssemblyName>\n"));
    }

    format!(
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n{properties}  </PropertyGroup>\n</Project>\n"
    )
}

/// Write `<dir>/<file_name>` with `contents` and return its path
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_project(dir: &Path, file_name: &str, contents: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, contents).expect("write project descriptor");
    path
}

/// `project.assets.json` listing `package_folder` first
#[must_use]
pub fn assets_json(package_folder: &Path) -> String {
    let mut folders = serde_json::Map::new();
    folders.insert(
        package_folder.to_string_lossy().into_owned(),
        serde_json::json!({}),
    );

    serde_json::json!({
        "version": 3,
        "targets": {},
        "libraries": {},
        "packageFolders": folders,
    })
    .to_string()
}

/// Lay out a restored package the way the restore does:
/// `<package_folder>/<lower id>/<lower version>/lib/<framework>/<files>`
///
/// # Panics
///
/// Panics if the files cannot be written.
pub fn publish_package(
    package_folder: &Path,
    id: &str,
    version: &str,
    framework: &str,
    files: &[(&str, Vec<u8>)],
) -> PathBuf {
    let lib = package_folder
        .join(id.to_lowercase())
        .join(version.to_lowercase())
        .join("lib")
        .join(framework);
    fs::create_dir_all(&lib).expect("create lib folder");

    for (name, contents) in files {
        let path = lib.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create nested folder");
        }
        fs::write(path, contents).expect("write package file");
    }

    lib
}
