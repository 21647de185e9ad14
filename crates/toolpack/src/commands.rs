//! Command execution abstractions and implementations

pub mod process;
pub mod runner;

pub use process::ProcessCommandRunner;
pub use runner::{CommandError, CommandOutput, CommandRunner, run};
