//! Common test constants used across multiple test files.

/// Registry URL handed to services under test; never contacted
pub const TEST_SOURCE_URL: &str = "https://registry.test.invalid/v3/registration";

/// Target framework used by test configurations
pub const TEST_FRAMEWORK: &str = "net8.0";

/// Registry id of the default test package
pub const TEST_PACKAGE_ID: &str = "Contoso.Tool";

/// Latest version of the default test package
pub const TEST_VERSION: &str = "1.2.0";

/// File name of the default test package's entry assembly
pub const TEST_ENTRY_ASSEMBLY: &str = "Contoso.Tool.dll";

/// `MethodDef` row 1, the usual `Main` token
pub const MAIN_TOKEN: u32 = 0x0600_0001;
