use std::fs;

use test_common::{
    AcquireOptions, MAIN_TOKEN, ScriptedCommandRunner, StaticRegistryClient, TEST_FRAMEWORK,
    TestEnv, csproj, pe_image, write_project,
};
use toolpack::package::{AcquireError, ManifestSource, PackageService, PackagesFolder};

fn project(env: &TestEnv, name: &str, contents: &str) -> std::path::PathBuf {
    let dir = env.sources_dir().join(name);
    fs::create_dir_all(&dir).unwrap();
    write_project(&dir, &format!("{name}.csproj"), contents);
    dir
}

#[tokio::test]
async fn test_acquire_from_folder() {
    let env = TestEnv::new();
    let dir = project(&env, "MyTool", &csproj(Some("Contoso.MyTool"), Some("mytool")));
    let runner = ScriptedCommandRunner::new()
        .with_build_output("mytool.dll", pe_image(Some(MAIN_TOKEN)))
        .with_build_output("mytool.pdb", vec![0; 16]);
    let service = env.service(StaticRegistryClient::default(), runner.clone());

    let package = service
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await
        .unwrap();

    assert_eq!(package.name(), "Contoso.MyTool");
    assert_eq!(package.version(), None);
    assert_eq!(package.entry_point(), "mytool.dll");
    assert_eq!(package.folder(), env.packages_dir().join("Contoso.MyTool"));

    let calls = runner.calls();
    let descriptor = dir.join("MyTool.csproj").to_string_lossy().into_owned();
    let output = package.folder().to_string_lossy().into_owned();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].subcommand, "restore");
    assert_eq!(calls[0].args, vec![descriptor.clone()]);
    assert_eq!(calls[1].subcommand, "build");
    assert_eq!(
        calls[1].args,
        vec![
            descriptor,
            "--configuration".to_string(),
            "Release".to_string(),
            "--output".to_string(),
            output,
        ]
    );

    let manifest = PackagesFolder::new(env.packages_dir())
        .read_manifest("Contoso.MyTool")
        .unwrap()
        .unwrap();
    assert_eq!(manifest.source, ManifestSource::Folder { path: dir });
    assert_eq!(manifest.target_framework, TEST_FRAMEWORK);
}

#[tokio::test]
async fn test_folder_without_descriptor_spawns_nothing() {
    let env = TestEnv::new();
    let dir = env.sources_dir().join("Empty");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Program.cs"), "class P { static void Main() {} }").unwrap();
    let runner = ScriptedCommandRunner::new();
    let service = env.service(StaticRegistryClient::default(), runner.clone());

    let result = service
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(AcquireError::MalformedDescriptor { ref path, .. }) if path == &dir
    ));
    assert!(runner.calls().is_empty());
    assert_eq!(fs::read_dir(env.packages_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_descriptor_without_name_is_malformed() {
    let env = TestEnv::new();
    let dir = project(&env, "Nameless", &csproj(None, None));
    let runner = ScriptedCommandRunner::new();
    let service = env.service(StaticRegistryClient::default(), runner.clone());

    let result = service
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await;

    assert!(matches!(result, Err(AcquireError::MalformedDescriptor { .. })));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_build_failure_leaves_no_marker() {
    let env = TestEnv::new();
    let dir = project(&env, "Broken", &csproj(None, Some("broken")));
    let service = env.service(
        StaticRegistryClient::default(),
        ScriptedCommandRunner::new().failing("build"),
    );

    let result = service
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await;

    assert!(matches!(result, Err(AcquireError::BuildFailed { .. })));
    let packages = PackagesFolder::new(env.packages_dir());
    assert!(packages.package_folder("broken").unwrap().is_dir());
    assert!(!packages.is_installed("broken"));
}

#[tokio::test]
async fn test_rebuild_after_failed_build() {
    let env = TestEnv::new();
    let dir = project(&env, "Flaky", &csproj(None, Some("flaky")));
    let failing = env.service(
        StaticRegistryClient::default(),
        ScriptedCommandRunner::new().failing("build"),
    );
    let _ = failing
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await;

    let working = env.service(
        StaticRegistryClient::default(),
        ScriptedCommandRunner::new().with_build_output("flaky.dll", pe_image(Some(MAIN_TOKEN))),
    );
    let package = working
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await
        .unwrap();

    assert_eq!(package.entry_point(), "flaky.dll");
}

#[tokio::test]
async fn test_build_without_entry_point() {
    let env = TestEnv::new();
    let dir = project(&env, "Lib", &csproj(None, Some("lib")));
    let service = env.service(
        StaticRegistryClient::default(),
        ScriptedCommandRunner::new().with_build_output("lib.dll", pe_image(None)),
    );

    let result = service
        .acquire(&dir.to_string_lossy(), &AcquireOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(AcquireError::EntryPointNotFound { ref directory }) if directory == &env.packages_dir().join("lib")
    ));
}
